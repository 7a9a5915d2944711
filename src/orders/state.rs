//! Order status state machine
//!
//! ```text
//!                ┌──────────────▶ COMPLETED (terminal)
//!  IN_PROGRESS ──┤
//!                └──────────────▶ CANCELLED (terminal)
//! ```
//!
//! Only the business participant moves an order, and only out of
//! `in_progress`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    InProgress,
    Completed,
    Cancelled,
}

/// Why a requested status change was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// Source state is terminal
    Terminal(OrderStatus),
    /// Target equals the current state
    Unchanged(OrderStatus),
}

impl OrderStatus {
    /// Check if this is a terminal state (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Validate a transition `self -> next`
    pub fn transition(self, next: OrderStatus) -> Result<OrderStatus, TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError::Terminal(self));
        }
        if self == next {
            return Err(TransitionError::Unchanged(self));
        }
        Ok(next)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(OrderStatus::InProgress),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_valid_transitions() {
        assert_eq!(
            OrderStatus::InProgress.transition(OrderStatus::Completed),
            Ok(OrderStatus::Completed)
        );
        assert_eq!(
            OrderStatus::InProgress.transition(OrderStatus::Cancelled),
            Ok(OrderStatus::Cancelled)
        );
    }

    #[test]
    fn test_unchanged_is_rejected() {
        assert_eq!(
            OrderStatus::InProgress.transition(OrderStatus::InProgress),
            Err(TransitionError::Unchanged(OrderStatus::InProgress))
        );
    }

    #[test]
    fn test_string_form() {
        for s in [
            OrderStatus::InProgress,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(s.as_str().parse::<OrderStatus>(), Ok(s));
        }
        assert_eq!(
            serde_json::to_string(&OrderStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert!("done".parse::<OrderStatus>().is_err());
    }

    fn any_status() -> impl Strategy<Value = OrderStatus> {
        prop_oneof![
            Just(OrderStatus::InProgress),
            Just(OrderStatus::Completed),
            Just(OrderStatus::Cancelled),
        ]
    }

    proptest! {
        #[test]
        fn prop_terminal_states_never_move(from in any_status(), to in any_status()) {
            let result = from.transition(to);
            if from.is_terminal() {
                prop_assert_eq!(result, Err(TransitionError::Terminal(from)));
            }
        }

        #[test]
        fn prop_accepted_transitions_leave_in_progress(from in any_status(), to in any_status()) {
            if let Ok(next) = from.transition(to) {
                prop_assert_eq!(from, OrderStatus::InProgress);
                prop_assert!(next.is_terminal());
            }
        }
    }
}
