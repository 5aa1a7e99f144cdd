//! Service token (queue ticket) model and its status state machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CitizenSummary, DepartmentSummary};
use crate::validation::ValidationError;

/// Status of a service token.
///
/// ```text
/// Pending ──▶ InProgress ──▶ Completed
///    │  └──────────┼──────────▲
///    └──────────▶ Cancelled ◀─┘
/// ```
///
/// Completed and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TokenStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenStatus::Pending => "Pending",
            TokenStatus::InProgress => "InProgress",
            TokenStatus::Completed => "Completed",
            TokenStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TokenStatus::Completed | TokenStatus::Cancelled)
    }

    /// Whether a status update from `self` to `next` is legal.
    ///
    /// Re-asserting the current non-terminal status is allowed so staff can
    /// amend remarks without moving the token.
    pub fn can_transition_to(self, next: TokenStatus) -> bool {
        use TokenStatus::*;
        match self {
            Pending => true,
            InProgress => next != Pending,
            Completed | Cancelled => false,
        }
    }
}

impl fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenStatus {
    type Err = ValidationError;

    /// Case-insensitive; accepts `In Progress`, `in-progress` and
    /// `in_progress` for [`TokenStatus::InProgress`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "pending" => Ok(TokenStatus::Pending),
            "inprogress" => Ok(TokenStatus::InProgress),
            "completed" => Ok(TokenStatus::Completed),
            "cancelled" | "canceled" => Ok(TokenStatus::Cancelled),
            _ => Err(ValidationError(format!("Unknown token status: {s}"))),
        }
    }
}

/// A stored service token. References are by id only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceToken {
    pub id: Uuid,
    pub token_number: String,
    pub beneficiary_id: Uuid,
    pub department_id: Uuid,
    pub purpose: String,
    pub status: TokenStatus,
    pub remarks: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewServiceToken {
    pub beneficiary_id: Uuid,
    pub department_id: Uuid,
    pub purpose: String,
}

/// A service token with its references expanded to display projections.
///
/// A reference whose target has since been deleted expands to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTokenView {
    pub id: Uuid,
    pub token_number: String,
    pub beneficiary_id: Uuid,
    pub beneficiary: Option<CitizenSummary>,
    pub department_id: Uuid,
    pub department: Option<DepartmentSummary>,
    pub purpose: String,
    pub status: TokenStatus,
    pub remarks: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceTokenView {
    pub fn new(
        token: ServiceToken,
        beneficiary: Option<CitizenSummary>,
        department: Option<DepartmentSummary>,
    ) -> Self {
        Self {
            id: token.id,
            token_number: token.token_number,
            beneficiary_id: token.beneficiary_id,
            beneficiary,
            department_id: token.department_id,
            department,
            purpose: token.purpose,
            status: token.status,
            remarks: token.remarks,
            issued_at: token.issued_at,
            updated_at: token.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TokenStatus::*;
    use super::*;

    #[test]
    fn pending_moves_anywhere() {
        for next in [Pending, InProgress, Completed, Cancelled] {
            assert!(Pending.can_transition_to(next), "Pending -> {next}");
        }
    }

    #[test]
    fn in_progress_cannot_go_back() {
        assert!(!InProgress.can_transition_to(Pending));
        assert!(InProgress.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states_are_final() {
        for from in [Completed, Cancelled] {
            assert!(from.is_terminal());
            for next in [Pending, InProgress, Completed, Cancelled] {
                assert!(!from.can_transition_to(next), "{from} -> {next}");
            }
        }
    }

    #[test]
    fn status_parsing_is_lenient_on_spelling() {
        assert_eq!("In Progress".parse::<TokenStatus>().unwrap(), InProgress);
        assert_eq!("in_progress".parse::<TokenStatus>().unwrap(), InProgress);
        assert_eq!("COMPLETED".parse::<TokenStatus>().unwrap(), Completed);
        assert_eq!("canceled".parse::<TokenStatus>().unwrap(), Cancelled);
        assert!("Done".parse::<TokenStatus>().is_err());
    }

    #[test]
    fn status_serializes_as_label() {
        assert_eq!(serde_json::to_string(&InProgress).unwrap(), "\"InProgress\"");
    }
}
