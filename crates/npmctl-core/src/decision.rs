// ── Reconciliation decisions ──
//
// The outcome of comparing a desired spec with what the search found.
// Computed before any mutating call, so a dry run and a real run reach
// the same decision and only differ in whether it gets executed.

use npmctl_api::RemoteItem;
use strum::Display;

/// What a reconciler intends to do, with everything needed to do it.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision<P> {
    /// Nothing exists yet; create it from the payload.
    Create(P),
    /// The existing item differs; replace it with the full payload.
    Update { existing: RemoteItem, payload: P },
    /// The existing item already satisfies the spec.
    Noop(RemoteItem),
    /// The item exists but should not.
    Delete(RemoteItem),
    /// The item should not exist and does not.
    AlreadyAbsent,
}

/// Payload-free label of a [`Decision`], for logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionKind {
    Create,
    Update,
    Noop,
    Delete,
    NoOpAlreadyAbsent,
}

impl<P> Decision<P> {
    pub fn kind(&self) -> DecisionKind {
        match self {
            Self::Create(_) => DecisionKind::Create,
            Self::Update { .. } => DecisionKind::Update,
            Self::Noop(_) => DecisionKind::Noop,
            Self::Delete(_) => DecisionKind::Delete,
            Self::AlreadyAbsent => DecisionKind::NoOpAlreadyAbsent,
        }
    }

    /// `true` for decisions that change remote state when executed.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Self::Create(_) | Self::Update { .. } | Self::Delete(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_render_in_screaming_snake_case() {
        assert_eq!(DecisionKind::NoOpAlreadyAbsent.to_string(), "NO_OP_ALREADY_ABSENT");
        assert_eq!(DecisionKind::Create.to_string(), "CREATE");
    }

    #[test]
    fn only_create_update_delete_mutate() {
        assert!(Decision::Create(()).is_mutating());
        assert!(!Decision::<()>::AlreadyAbsent.is_mutating());
    }
}
