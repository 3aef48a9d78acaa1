use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rentals::machine::StatusSet;

/// Identifier wrapper for issue tickets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueId(pub String);

/// Identifier wrapper for changelog entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangelogId(pub String);

/// Two-state lifecycle shared by issues and changelogs.
///
/// Neither state is terminal; tickets flip between open and closed as work is
/// done or reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    Closed,
}

impl TicketStatus {
    const ALL: [Self; 2] = [Self::Open, Self::Closed];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl StatusSet for TicketStatus {
    fn all() -> &'static [Self] {
        &Self::ALL
    }

    fn is_terminal(self) -> bool {
        false
    }
}

/// Error raised when an issue transition repeats its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IssueError {
    #[error("cannot close an issue that is already closed")]
    AlreadyClosed,
    #[error("cannot reopen an issue that is already open")]
    AlreadyOpen,
}

/// Error raised when a changelog transition repeats its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChangelogError {
    #[error("cannot close a changelog that is already closed")]
    AlreadyClosed,
    #[error("cannot reopen a changelog that is already open")]
    AlreadyOpen,
}

/// A maintenance or complaint ticket raised against the venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub summary: String,
    pub reported_by: String,
    pub status: TicketStatus,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Issue {
    /// Register a new issue; issues always start open.
    pub fn open(id: IssueId, summary: String, reported_by: String) -> Self {
        Self {
            id,
            summary,
            reported_by,
            status: TicketStatus::Open,
            closed_at: None,
        }
    }

    /// Close the issue, recording when.
    pub fn close(&mut self, now: DateTime<Utc>) -> Result<(), IssueError> {
        match self.status {
            TicketStatus::Closed => Err(IssueError::AlreadyClosed),
            TicketStatus::Open => {
                self.status = TicketStatus::Closed;
                self.closed_at = Some(now);
                Ok(())
            }
        }
    }

    /// Reopen a closed issue, clearing the close timestamp.
    pub fn reopen(&mut self) -> Result<(), IssueError> {
        match self.status {
            TicketStatus::Open => Err(IssueError::AlreadyOpen),
            TicketStatus::Closed => {
                self.status = TicketStatus::Open;
                self.closed_at = None;
                Ok(())
            }
        }
    }
}

/// A changelog entry tracking work performed on the venue or portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Changelog {
    pub id: ChangelogId,
    pub title: String,
    pub status: TicketStatus,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Changelog {
    /// Register a new changelog entry; entries always start open.
    pub fn open(id: ChangelogId, title: String) -> Self {
        Self {
            id,
            title,
            status: TicketStatus::Open,
            closed_at: None,
        }
    }

    /// Close the entry, recording when.
    pub fn close(&mut self, now: DateTime<Utc>) -> Result<(), ChangelogError> {
        match self.status {
            TicketStatus::Closed => Err(ChangelogError::AlreadyClosed),
            TicketStatus::Open => {
                self.status = TicketStatus::Closed;
                self.closed_at = Some(now);
                Ok(())
            }
        }
    }

    /// Reopen a closed entry, clearing the close timestamp.
    pub fn reopen(&mut self) -> Result<(), ChangelogError> {
        match self.status {
            TicketStatus::Open => Err(ChangelogError::AlreadyOpen),
            TicketStatus::Closed => {
                self.status = TicketStatus::Open;
                self.closed_at = None;
                Ok(())
            }
        }
    }
}
