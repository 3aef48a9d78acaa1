use super::common::*;
use crate::rentals::tickets::{
    Changelog, ChangelogError, ChangelogId, Issue, IssueError, IssueId, TicketStatus,
};

fn sample_issue() -> Issue {
    Issue::open(
        IssueId("issue-test".to_string()),
        "lekkage in de kelder".to_string(),
        "J. Jansen".to_string(),
    )
}

fn sample_changelog() -> Changelog {
    Changelog::open(
        ChangelogId("changelog-test".to_string()),
        "nieuwe sleutelkast".to_string(),
    )
}

#[test]
fn new_issue_starts_open_without_close_timestamp() {
    let issue = sample_issue();
    assert_eq!(issue.status, TicketStatus::Open);
    assert!(issue.closed_at.is_none());
}

#[test]
fn closing_an_issue_records_when() {
    let mut issue = sample_issue();
    issue.close(now()).expect("open issue closes");
    assert_eq!(issue.status, TicketStatus::Closed);
    assert_eq!(issue.closed_at, Some(now()));
}

#[test]
fn reopening_clears_the_close_timestamp() {
    let mut issue = sample_issue();
    issue.close(now()).expect("open issue closes");
    issue.reopen().expect("closed issue reopens");
    assert_eq!(issue.status, TicketStatus::Open);
    assert!(issue.closed_at.is_none());
}

#[test]
fn closing_twice_is_rejected_with_literal_message() {
    let mut issue = sample_issue();
    issue.close(now()).expect("open issue closes");
    let err = issue.close(now()).expect_err("second close must fail");
    assert_eq!(err, IssueError::AlreadyClosed);
    assert_eq!(
        err.to_string(),
        "cannot close an issue that is already closed"
    );
    assert_eq!(issue.status, TicketStatus::Closed);
    assert_eq!(issue.closed_at, Some(now()), "timestamp must survive the rejected close");
}

#[test]
fn reopening_an_open_issue_is_rejected_with_literal_message() {
    let mut issue = sample_issue();
    let err = issue.reopen().expect_err("open issue cannot reopen");
    assert_eq!(err, IssueError::AlreadyOpen);
    assert_eq!(err.to_string(), "cannot reopen an issue that is already open");
    assert_eq!(issue.status, TicketStatus::Open);
}

#[test]
fn changelog_follows_the_same_lifecycle() {
    let mut entry = sample_changelog();
    assert_eq!(entry.status, TicketStatus::Open);

    entry.close(now()).expect("open entry closes");
    assert_eq!(entry.closed_at, Some(now()));

    let err = entry.close(now()).expect_err("second close must fail");
    assert_eq!(err, ChangelogError::AlreadyClosed);
    assert_eq!(
        err.to_string(),
        "cannot close a changelog that is already closed"
    );

    entry.reopen().expect("closed entry reopens");
    assert!(entry.closed_at.is_none());

    let err = entry.reopen().expect_err("open entry cannot reopen");
    assert_eq!(err, ChangelogError::AlreadyOpen);
    assert_eq!(
        err.to_string(),
        "cannot reopen a changelog that is already open"
    );
}
