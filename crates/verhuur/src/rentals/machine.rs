//! Table-driven status transition machinery shared by every rental entity.
//!
//! Each entity declares its status enumeration and a small operation
//! enumeration whose `(sources, target)` pairs form the complete transition
//! table. [`check`] validates one edge against that table and nothing else:
//! authorization happens before the machine is consulted, persistence after.

use std::fmt;

use thiserror::Error;

/// A closed, finite set of states for one entity type.
pub trait StatusSet: Copy + Eq + fmt::Debug + fmt::Display + 'static {
    /// Every member of the enumeration, for exhaustive edge checks.
    fn all() -> &'static [Self];

    /// Whether the state admits no further transitions.
    fn is_terminal(self) -> bool;
}

/// A named transition operation in an entity's graph.
pub trait TransitionOp: Copy + Eq + fmt::Debug + 'static {
    /// The status enumeration this operation acts on.
    type Status: StatusSet;

    /// Every declared operation for the entity type.
    fn all() -> &'static [Self];

    /// The states the operation may be invoked from.
    fn sources(self) -> &'static [Self::Status];

    /// The state the operation moves the entity to.
    fn target(self) -> Self::Status;
}

/// Failure to move an entity along a requested edge.
///
/// Terminal states are reported separately from missing edges so callers can
/// tell "already final" apart from "no such edge", but both leave the entity
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError<S: StatusSet> {
    /// The requested edge does not exist from the current state.
    #[error("transition to {to} is not valid on the current state {from}")]
    NotAllowed { from: S, to: S },
    /// The entity has reached a state with no outgoing edges.
    #[error("{state} is a terminal state and cannot transition to {attempted}")]
    Terminal { state: S, attempted: S },
}

/// Validate one edge of the transition table, returning the target state.
///
/// The caller assigns the returned state together with any side-effect fields
/// in a single mutation so no observable intermediate state exists.
pub fn check<Op: TransitionOp>(
    current: Op::Status,
    op: Op,
) -> Result<Op::Status, TransitionError<Op::Status>> {
    if current.is_terminal() {
        return Err(TransitionError::Terminal {
            state: current,
            attempted: op.target(),
        });
    }
    if !op.sources().contains(&current) {
        return Err(TransitionError::NotAllowed {
            from: current,
            to: op.target(),
        });
    }
    Ok(op.target())
}

/// Whether `(current, op)` is a declared edge of the entity's graph.
///
/// Mirrors [`check`] without constructing the error; used by the exhaustive
/// table tests to iterate every `(state, operation)` pair.
pub fn is_edge<Op: TransitionOp>(current: Op::Status, op: Op) -> bool {
    !current.is_terminal() && op.sources().contains(&current)
}
