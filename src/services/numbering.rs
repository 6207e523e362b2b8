use crate::models::TicketModule;
use crate::repository::{RepositoryResult, SequenceAllocator};
use std::sync::Arc;

/// Issues `{PREFIX}-{NNNN}` ticket numbers from a per-module sequence
#[derive(Clone)]
pub struct TicketNumberAllocator {
    sequences: Arc<dyn SequenceAllocator>,
    width: usize,
}

impl std::fmt::Debug for TicketNumberAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketNumberAllocator")
            .field("width", &self.width)
            .finish()
    }
}

impl TicketNumberAllocator {
    pub fn new(sequences: Arc<dyn SequenceAllocator>, width: usize) -> Self {
        Self { sequences, width }
    }

    pub async fn next(&self, module: &TicketModule) -> RepositoryResult<String> {
        let value = self.sequences.next_value(&module.id).await?;
        Ok(format_ticket_number(&module.prefix, value, self.width))
    }
}

/// Values wider than `width` are printed in full rather than truncated
pub fn format_ticket_number(prefix: &str, value: u64, width: usize) -> String {
    format!("{}-{:0width$}", prefix.to_ascii_uppercase(), value, width = width)
}
