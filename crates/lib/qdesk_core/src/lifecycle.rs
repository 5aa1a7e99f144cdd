//! Service token lifecycle: number allocation and status transitions.

use chrono::{DateTime, Utc};
use rand::{Rng, rng};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{NewServiceToken, ServiceToken, TokenStatus};
use crate::store::{StoreError, TokenStore};
use crate::uuid::uuidv7;

/// How many fresh token numbers are tried before giving up.
pub const MAX_NUMBER_ATTEMPTS: usize = 5;

/// How many compare-and-set writes a status change tries before giving up.
pub const MAX_TRANSITION_ATTEMPTS: usize = 5;

/// Lifecycle errors.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Cannot move token from {from} to {to}")]
    InvalidTransition { from: TokenStatus, to: TokenStatus },

    #[error("No unique token number after {0} attempts")]
    NumbersExhausted(usize),

    #[error("Token status changed concurrently {0} times, try again")]
    Contended(usize),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Token number for a ticket issued at `now`: `TKN-YYMMDD-NNNN`, the suffix
/// drawn from 1000..=9999.
pub fn token_number(now: DateTime<Utc>) -> String {
    let suffix: u16 = rng().random_range(1000..10000);
    format!("TKN-{}-{suffix}", now.format("%y%m%d"))
}

pub fn check_transition(from: TokenStatus, to: TokenStatus) -> Result<(), LifecycleError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(LifecycleError::InvalidTransition { from, to })
    }
}

/// Create a `Pending` token with a freshly drawn number.
pub async fn issue(
    store: &dyn TokenStore,
    new: NewServiceToken,
) -> Result<ServiceToken, LifecycleError> {
    issue_with(store, new, || token_number(Utc::now())).await
}

/// Like [`issue`], drawing numbers from `next_number`. A number already taken
/// is discarded and another drawn, up to [`MAX_NUMBER_ATTEMPTS`] times.
pub async fn issue_with<F>(
    store: &dyn TokenStore,
    new: NewServiceToken,
    mut next_number: F,
) -> Result<ServiceToken, LifecycleError>
where
    F: FnMut() -> String + Send,
{
    for attempt in 1..=MAX_NUMBER_ATTEMPTS {
        let now = Utc::now();
        let token = ServiceToken {
            id: uuidv7(),
            token_number: next_number(),
            beneficiary_id: new.beneficiary_id,
            department_id: new.department_id,
            purpose: new.purpose.clone(),
            status: TokenStatus::Pending,
            remarks: None,
            issued_at: now,
            updated_at: now,
        };
        match store.insert(&token).await {
            Ok(()) => {
                debug!(token_number = %token.token_number, attempt, "service token issued");
                return Ok(token);
            }
            Err(StoreError::Duplicate(_)) => {
                warn!(token_number = %token.token_number, attempt, "token number taken, drawing another");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(LifecycleError::NumbersExhausted(MAX_NUMBER_ATTEMPTS))
}

/// Move token `id` to `status`, overwriting its remarks.
///
/// Returns `Ok(None)` if the token does not exist. If another writer moves
/// the token between the read and the write, the move is re-checked against
/// the status it now holds and retried, up to [`MAX_TRANSITION_ATTEMPTS`]
/// times.
pub async fn transition(
    store: &dyn TokenStore,
    id: Uuid,
    status: TokenStatus,
    remarks: Option<String>,
) -> Result<Option<ServiceToken>, LifecycleError> {
    for attempt in 1..=MAX_TRANSITION_ATTEMPTS {
        let Some(current) = store.get(id).await? else {
            return Ok(None);
        };
        check_transition(current.status, status)?;

        if let Some(updated) = store
            .update_status(id, current.status, status, remarks.clone(), Utc::now())
            .await?
        {
            return Ok(Some(updated));
        }
        debug!(%id, from = %current.status, to = %status, attempt, "token moved underneath, retrying");
    }
    warn!(%id, to = %status, "token status kept changing, giving up");
    Err(LifecycleError::Contended(MAX_TRANSITION_ATTEMPTS))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::store::{MemoryStore, StoreResult};

    /// Token store where another writer sneaks in ahead of the first status
    /// writes, moving the token to the matching `interloper` status. A
    /// `starved` store loses every write.
    struct RacingStore {
        inner: MemoryStore,
        interloper: Vec<TokenStatus>,
        starved: bool,
        writes: AtomicUsize,
    }

    impl RacingStore {
        fn new(interloper: Vec<TokenStatus>) -> Self {
            Self {
                inner: MemoryStore::default(),
                interloper,
                starved: false,
                writes: AtomicUsize::new(0),
            }
        }

        fn starved() -> Self {
            Self {
                starved: true,
                ..Self::new(Vec::new())
            }
        }
    }

    #[async_trait]
    impl TokenStore for RacingStore {
        async fn insert(&self, token: &ServiceToken) -> StoreResult<()> {
            TokenStore::insert(&self.inner, token).await
        }

        async fn get(&self, id: Uuid) -> StoreResult<Option<ServiceToken>> {
            TokenStore::get(&self.inner, id).await
        }

        async fn find_by_number(&self, token_number: &str) -> StoreResult<Option<ServiceToken>> {
            TokenStore::find_by_number(&self.inner, token_number).await
        }

        async fn update_status(
            &self,
            id: Uuid,
            expected: TokenStatus,
            status: TokenStatus,
            remarks: Option<String>,
            updated_at: DateTime<Utc>,
        ) -> StoreResult<Option<ServiceToken>> {
            let write = self.writes.fetch_add(1, Ordering::SeqCst);
            if self.starved {
                return Ok(None);
            }
            if let Some(&sneaked) = self.interloper.get(write) {
                TokenStore::update_status(&self.inner, id, expected, sneaked, None, updated_at)
                    .await?;
            }
            TokenStore::update_status(&self.inner, id, expected, status, remarks, updated_at).await
        }

        async fn list(&self) -> StoreResult<Vec<ServiceToken>> {
            TokenStore::list(&self.inner).await
        }
    }

    fn request() -> NewServiceToken {
        NewServiceToken {
            beneficiary_id: Uuid::new_v4(),
            department_id: Uuid::new_v4(),
            purpose: "Domicile".into(),
        }
    }

    #[test]
    fn token_number_shape() {
        let now = "2026-03-07T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let number = token_number(now);
        assert!(number.starts_with("TKN-260307-"), "{number}");
        let suffix: u16 = number["TKN-260307-".len()..].parse().unwrap();
        assert!((1000..10000).contains(&suffix));
    }

    #[tokio::test]
    async fn issued_token_is_pending() {
        let store = MemoryStore::default();
        let token = issue(&store, request()).await.unwrap();
        assert_eq!(token.status, TokenStatus::Pending);
        assert_eq!(token.remarks, None);
        assert_eq!(token.issued_at, token.updated_at);
    }

    #[tokio::test]
    async fn collision_draws_a_new_number() {
        let store = MemoryStore::default();
        issue_with(&store, request(), || "TKN-260101-1111".into())
            .await
            .unwrap();

        let mut drawn = vec!["TKN-260101-2222", "TKN-260101-1111"];
        let token = issue_with(&store, request(), || drawn.pop().unwrap().into())
            .await
            .unwrap();
        assert_eq!(token.token_number, "TKN-260101-2222");
    }

    #[tokio::test]
    async fn gives_up_after_bounded_attempts() {
        let store = MemoryStore::default();
        issue_with(&store, request(), || "TKN-260101-1111".into())
            .await
            .unwrap();

        let mut calls = 0;
        let err = issue_with(&store, request(), || {
            calls += 1;
            "TKN-260101-1111".into()
        })
        .await
        .unwrap_err();
        assert!(matches!(err, LifecycleError::NumbersExhausted(MAX_NUMBER_ATTEMPTS)));
        assert_eq!(calls, MAX_NUMBER_ATTEMPTS);
        assert_eq!(TokenStore::list(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn transition_follows_state_machine() {
        let store = MemoryStore::default();
        let token = issue(&store, request()).await.unwrap();

        let moved = transition(&store, token.id, TokenStatus::InProgress, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.status, TokenStatus::InProgress);

        let err = transition(&store, token.id, TokenStatus::Pending, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidTransition {
                from: TokenStatus::InProgress,
                to: TokenStatus::Pending
            }
        ));

        let done = transition(
            &store,
            token.id,
            TokenStatus::Completed,
            Some("Card printed".into()),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(done.remarks.as_deref(), Some("Card printed"));
        assert!(done.updated_at >= token.updated_at);

        assert!(
            transition(&store, token.id, TokenStatus::Cancelled, None)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn transition_of_missing_token_is_none() {
        let store = MemoryStore::default();
        let result = transition(&store, Uuid::new_v4(), TokenStatus::Completed, None)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn lost_race_is_retried_from_the_new_status() {
        let store = RacingStore::new(vec![TokenStatus::InProgress]);
        let token = issue(&store, request()).await.unwrap();

        let done = transition(&store, token.id, TokenStatus::Completed, Some("Done".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(done.status, TokenStatus::Completed);
        assert_eq!(done.remarks.as_deref(), Some("Done"));
        assert_eq!(store.writes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn lost_race_to_a_terminal_status_is_refused() {
        let store = RacingStore::new(vec![TokenStatus::Cancelled]);
        let token = issue(&store, request()).await.unwrap();

        let err = transition(&store, token.id, TokenStatus::InProgress, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidTransition {
                from: TokenStatus::Cancelled,
                to: TokenStatus::InProgress
            }
        ));
    }

    #[tokio::test]
    async fn starved_transition_gives_up() {
        let store = RacingStore::starved();
        let token = issue(&store, request()).await.unwrap();

        let err = transition(&store, token.id, TokenStatus::InProgress, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Contended(MAX_TRANSITION_ATTEMPTS)));
        assert_eq!(store.writes.load(Ordering::SeqCst), MAX_TRANSITION_ATTEMPTS);
    }
}
