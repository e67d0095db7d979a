use std::collections::BTreeMap;

use foundation::ids::{Id, IdGen};
use foundation::time::Time;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// The id was never issued, or its request already completed.
    UnknownRequest,
    TimedOut,
    Cancelled,
}

impl std::fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExchangeError::UnknownRequest => write!(f, "unknown or already completed request"),
            ExchangeError::TimedOut => write!(f, "request timed out"),
            ExchangeError::Cancelled => write!(f, "request cancelled"),
        }
    }
}

impl std::error::Error for ExchangeError {}

/// A request waiting for its response.
#[derive(Debug, Clone, PartialEq)]
pub struct Pending<Req> {
    pub id: Id,
    pub request: Req,
    pub deadline: Time,
}

/// Request/response channel with correlation ids.
///
/// The requester `submit`s and later `take`s the outcome by id; the
/// responder reads `pending` requests and `respond`s to them. Requests whose
/// deadline passes are completed with [`ExchangeError::TimedOut`] on the next
/// `expire`. Every request completes exactly once.
///
/// Outcomes nobody `take`s are dropped by `expire` once `retention_s` has
/// passed since the request's deadline.
#[derive(Debug)]
pub struct Exchange<Req, Resp> {
    ids: IdGen,
    retention_s: f64,
    pending: BTreeMap<Id, Pending<Req>>,
    completed: BTreeMap<Id, Completed<Resp>>,
}

#[derive(Debug)]
struct Completed<Resp> {
    deadline: Time,
    outcome: Result<Resp, ExchangeError>,
}

pub const DEFAULT_RETENTION_S: f64 = 30.0;

impl<Req, Resp> Default for Exchange<Req, Resp> {
    fn default() -> Self {
        Self {
            ids: IdGen::new(),
            retention_s: DEFAULT_RETENTION_S,
            pending: BTreeMap::new(),
            completed: BTreeMap::new(),
        }
    }
}

impl<Req, Resp> Exchange<Req, Resp> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention_s: f64) -> Self {
        Self {
            retention_s,
            ..Self::default()
        }
    }

    /// Number of outcomes waiting to be taken.
    pub fn completed_len(&self) -> usize {
        self.completed.len()
    }

    pub fn submit(&mut self, request: Req, now: Time, timeout_s: f64) -> Id {
        let id = self.ids.next_id();
        self.pending.insert(
            id,
            Pending {
                id,
                request,
                deadline: now.after(timeout_s),
            },
        );
        id
    }

    /// Pending requests in submission order.
    pub fn pending(&self) -> impl Iterator<Item = &Pending<Req>> + '_ {
        self.pending.values()
    }

    pub fn pending_ids(&self) -> Vec<Id> {
        self.pending.keys().copied().collect()
    }

    pub fn is_pending(&self, id: Id) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn respond(&mut self, id: Id, response: Resp) -> Result<(), ExchangeError> {
        self.complete(id, Ok(response))
    }

    pub fn cancel(&mut self, id: Id) -> Result<(), ExchangeError> {
        self.complete(id, Err(ExchangeError::Cancelled))
    }

    /// Times out every pending request whose deadline is before `now`, and
    /// drops untaken outcomes older than the retention window.
    pub fn expire(&mut self, now: Time) -> Vec<Id> {
        let retention_s = self.retention_s;
        let before = self.completed.len();
        self.completed
            .retain(|_, c| !now.is_past(c.deadline.after(retention_s)));
        let dropped = before - self.completed.len();
        if dropped > 0 {
            tracing::debug!(dropped, "untaken outcomes dropped");
        }

        let expired: Vec<Id> = self
            .pending
            .values()
            .filter(|p| now.is_past(p.deadline))
            .map(|p| p.id)
            .collect();
        for &id in &expired {
            if let Some(p) = self.pending.remove(&id) {
                self.completed.insert(
                    id,
                    Completed {
                        deadline: p.deadline,
                        outcome: Err(ExchangeError::TimedOut),
                    },
                );
            }
            tracing::warn!(request = id.0, "request timed out");
        }
        expired
    }

    /// Removes and returns the outcome of a completed request.
    pub fn take(&mut self, id: Id) -> Option<Result<Resp, ExchangeError>> {
        self.completed.remove(&id).map(|c| c.outcome)
    }

    fn complete(&mut self, id: Id, outcome: Result<Resp, ExchangeError>) -> Result<(), ExchangeError> {
        let pending = self
            .pending
            .remove(&id)
            .ok_or(ExchangeError::UnknownRequest)?;
        self.completed.insert(
            id,
            Completed {
                deadline: pending.deadline,
                outcome,
            },
        );
        Ok(())
    }
}
