use crate::core::aggregator::CatalogAggregator;
use crate::domain::model::CatalogTree;
use crate::domain::ports::CatalogSource;
use crate::utils::error::{CatalogError, ErrorCategory};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AggregateResult {
    Idle,
    Loading,
    Error { kind: ErrorKind, message: String },
    Ready(CatalogTree),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PreconditionMissing,
    FetchFailed,
    Other,
}

impl From<&CatalogError> for ErrorKind {
    fn from(err: &CatalogError) -> Self {
        match err.category() {
            ErrorCategory::Input => ErrorKind::PreconditionMissing,
            ErrorCategory::Network => ErrorKind::FetchFailed,
            _ => ErrorKind::Other,
        }
    }
}

impl AggregateResult {
    /// State view of an aggregation outcome; the outcome itself stays with
    /// the caller.
    pub fn from_outcome(outcome: &crate::utils::error::Result<CatalogTree>) -> Self {
        match outcome {
            Ok(tree) => AggregateResult::Ready(tree.clone()),
            Err(e) => AggregateResult::Error {
                kind: ErrorKind::from(e),
                message: e.user_friendly_message(),
            },
        }
    }

    pub fn tree(&self) -> Option<&CatalogTree> {
        match self {
            AggregateResult::Ready(tree) => Some(tree),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Applied(AggregateResult),
    /// A newer load started while this one was in flight; its result was dropped.
    Superseded { menu_id: Option<String> },
}

/// Holds the current aggregation state for one viewer.
///
/// Every `load` takes a new generation number. Only the completion carrying
/// the latest generation may write the state, so a slow response for an old
/// menu id never replaces a newer tree.
pub struct CatalogSession<S: CatalogSource> {
    aggregator: CatalogAggregator<S>,
    generation: AtomicU64,
    state: Mutex<AggregateResult>,
}

impl<S: CatalogSource> CatalogSession<S> {
    pub fn new(aggregator: CatalogAggregator<S>) -> Self {
        Self {
            aggregator,
            generation: AtomicU64::new(0),
            state: Mutex::new(AggregateResult::Idle),
        }
    }

    pub fn aggregator(&self) -> &CatalogAggregator<S> {
        &self.aggregator
    }

    pub fn state(&self) -> AggregateResult {
        self.lock_state().clone()
    }

    pub async fn load(&self, menu_id: Option<&str>) -> LoadOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.lock_state() = AggregateResult::Loading;
        tracing::debug!("Session load #{} for menu {:?}", generation, menu_id);

        let outcome = self.aggregator.aggregate(menu_id).await;
        if let Err(e) = &outcome {
            tracing::error!("❌ Aggregation for menu {:?} failed: {}", menu_id, e);
        }

        let mut state = self.lock_state();
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(
                "Dropping result of load #{} for menu {:?}, superseded",
                generation,
                menu_id
            );
            return LoadOutcome::Superseded {
                menu_id: menu_id.map(str::to_string),
            };
        }

        let result = AggregateResult::from_outcome(&outcome);
        *state = result.clone();
        LoadOutcome::Applied(result)
    }

    fn lock_state(&self) -> MutexGuard<'_, AggregateResult> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
