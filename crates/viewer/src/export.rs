use runtime::Exchange;

use crate::state::ViewerStateMachine;

/// Request for the loaded mesh as text. Correlation id and deadline live on
/// the exchange entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ExportRequest;

pub type ExportExchange = Exchange<ExportRequest, String>;

impl ViewerStateMachine {
    /// Answers every pending export request with the loaded mesh's original
    /// text. Without a mesh the requests stay pending until they expire.
    pub fn serve_exports(&self, exchange: &mut ExportExchange) -> usize {
        let Some(source) = self.source_text() else {
            return 0;
        };
        let mut answered = 0;
        for id in exchange.pending_ids() {
            if exchange.respond(id, source.to_string()).is_ok() {
                answered += 1;
            }
        }
        tracing::debug!(answered, "export requests served");
        answered
    }
}
