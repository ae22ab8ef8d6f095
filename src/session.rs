//! Per-keystroke query sessions with latest-wins delivery.
//!
//! Every call to [`SearchSession::search`] takes a new sequence number. A
//! lookup whose number is no longer the latest when it finishes is reported as
//! superseded and its results are dropped. Shard fetches it started are not
//! aborted; they complete and stay in the index cache.

use crate::engine::SearchIndex;
use crate::error::IndexError;
use crate::search::normalize_query;
use crate::types::DisplayResult;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{RwLock, watch};
use tokio::time::Duration;

/// Lifecycle of one query: `Idle → Pending → Resolved | Superseded`.
///
/// The session status only ever reports the latest query, so it never shows
/// `Superseded`; that state is returned through [`SearchOutcome::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    /// No active query.
    Idle,
    /// A lookup is running.
    Pending,
    /// Results were delivered.
    Resolved,
    /// A newer query was issued before this one finished; its results were dropped.
    Superseded,
}

/// State of the latest query, tagged with its sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryStatus {
    pub seq: u64,
    pub state: QueryState,
}

/// Results handed to the caller for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub seq: u64,
    /// Query text as typed.
    pub query: String,
    /// Normalized form the lookup used.
    pub normalized: String,
    pub results: Arc<[DisplayResult]>,
}

/// Outcome of one [`SearchSession::search`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Resolved(Delivery),
    Superseded { seq: u64 },
}

impl SearchOutcome {
    pub const fn seq(&self) -> u64 {
        match self {
            Self::Resolved(delivery) => delivery.seq,
            Self::Superseded { seq } => *seq,
        }
    }

    pub const fn state(&self) -> QueryState {
        match self {
            Self::Resolved(_) => QueryState::Resolved,
            Self::Superseded { .. } => QueryState::Superseded,
        }
    }

    pub const fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded { .. })
    }

    /// The delivered results, if this query was not superseded.
    pub fn results(&self) -> Option<&[DisplayResult]> {
        match self {
            Self::Resolved(delivery) => Some(&*delivery.results),
            Self::Superseded { .. } => None,
        }
    }
}

/// Drives queries from a search box against one [`SearchIndex`].
#[derive(Debug)]
pub struct SearchSession {
    index: Arc<SearchIndex>,
    sections: RwLock<Vec<String>>,
    debounce: Duration,

    /// Sequence number of the newest query issued
    latest: AtomicU64,

    status: watch::Sender<QueryStatus>,
    delivered: watch::Sender<Option<Delivery>>,
}

impl SearchSession {
    /// Create a session searching the manifest's first section.
    pub fn new(index: Arc<SearchIndex>, debounce: Duration) -> Self {
        let sections = index
            .manifest()
            .default_section()
            .map(|s| vec![s.to_string()])
            .unwrap_or_default();

        Self {
            index,
            sections: RwLock::new(sections),
            debounce,
            latest: AtomicU64::new(0),
            status: watch::Sender::new(QueryStatus {
                seq: 0,
                state: QueryState::Idle,
            }),
            delivered: watch::Sender::new(None),
        }
    }

    pub const fn index(&self) -> &Arc<SearchIndex> {
        &self.index
    }

    /// Restrict later queries to these sections.
    pub async fn set_sections(&self, sections: Vec<String>) -> Result<(), IndexError> {
        self.index.check_sections(&sections)?;
        tracing::debug!("Session sections set to {:?}", sections);
        *self.sections.write().await = sections;
        Ok(())
    }

    pub async fn sections(&self) -> Vec<String> {
        self.sections.read().await.clone()
    }

    /// Current state of the latest query.
    pub fn status(&self) -> QueryStatus {
        *self.status.borrow()
    }

    /// Sequence number of the newest query issued so far.
    pub fn latest_seq(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Watch deliveries. Only latest-wins results are ever published.
    pub fn subscribe(&self) -> watch::Receiver<Option<Delivery>> {
        self.delivered.subscribe()
    }

    /// The most recent delivery, if any.
    pub fn last_delivery(&self) -> Option<Delivery> {
        self.delivered.borrow().clone()
    }

    /// Handle a change of the query text.
    ///
    /// Waits out the debounce delay, looks the query up and delivers the
    /// results unless a newer call has been made in the meantime. An empty
    /// query resolves immediately to no results without touching any shard.
    pub async fn search(&self, raw: &str) -> SearchOutcome {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let normalized = normalize_query(raw);
        self.set_state(seq, QueryState::Pending);

        if normalized.is_empty() {
            return self.deliver(seq, raw, normalized, Vec::new());
        }

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
            if self.is_stale(seq) {
                tracing::trace!("Query #{} superseded during debounce", seq);
                return SearchOutcome::Superseded { seq };
            }
        }

        let sections = self.sections().await;
        let results = self.index.search_normalized(&normalized, &sections).await;
        self.deliver(seq, raw, normalized, results)
    }

    /// Supersede any in-flight query and return to `Idle`.
    pub fn reset(&self) {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_state(seq, QueryState::Idle);
        self.delivered.send_replace(None);
    }

    fn is_stale(&self, seq: u64) -> bool {
        self.latest.load(Ordering::SeqCst) != seq
    }

    /// Publish only if `seq` is still the latest query and nothing newer was delivered.
    fn deliver(
        &self,
        seq: u64,
        raw: &str,
        normalized: String,
        results: Vec<DisplayResult>,
    ) -> SearchOutcome {
        let delivery = Delivery {
            seq,
            query: raw.to_string(),
            normalized,
            results: results.into(),
        };

        let published = self.delivered.send_if_modified(|current| {
            let newer_delivered = current.as_ref().is_some_and(|d| d.seq >= seq);
            if self.is_stale(seq) || newer_delivered {
                return false;
            }
            *current = Some(delivery.clone());
            true
        });

        if published {
            self.set_state(seq, QueryState::Resolved);
            tracing::debug!(
                "Delivered query #{} '{}' ({} results)",
                seq,
                delivery.normalized,
                delivery.results.len()
            );
            SearchOutcome::Resolved(delivery)
        } else {
            tracing::trace!("Dropping results of superseded query #{}", seq);
            SearchOutcome::Superseded { seq }
        }
    }

    /// Record `state` for `seq` unless a newer query already owns the status.
    fn set_state(&self, seq: u64, state: QueryState) {
        self.status.send_if_modified(|status| {
            if status.seq > seq {
                return false;
            }
            *status = QueryStatus { seq, state };
            true
        });
    }
}
