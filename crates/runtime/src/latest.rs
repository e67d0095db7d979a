use foundation::ids::{Id, IdGen};

/// Tracks the most recent of a series of superseding requests.
///
/// Completions of older requests are rejected, so a slow response can never
/// overwrite the result of a newer one.
#[derive(Debug, Default, Clone)]
pub struct LatestRequest {
    ids: IdGen,
}

impl LatestRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> Id {
        self.ids.next_id()
    }

    pub fn current(&self) -> Option<Id> {
        self.ids.last()
    }

    pub fn is_current(&self, id: Id) -> bool {
        self.ids.last() == Some(id)
    }

    /// Passes `value` through only if `id` is the latest request.
    pub fn accept<T>(&self, id: Id, value: T) -> Option<T> {
        if self.is_current(id) {
            Some(value)
        } else {
            tracing::debug!(
                stale = id.0,
                current = self.ids.last().map(|c| c.0),
                "dropping stale response"
            );
            None
        }
    }
}
