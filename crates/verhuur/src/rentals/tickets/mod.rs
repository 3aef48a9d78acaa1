//! Issue and changelog tickets: the open/closed lifecycle.

pub mod domain;

pub use domain::{
    Changelog, ChangelogError, ChangelogId, Issue, IssueError, IssueId, TicketStatus,
};
