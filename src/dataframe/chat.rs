use anyhow::Result;
use std::sync::Arc;

use crate::dataframe::table::DataTable;
use crate::providers::traits::CompletionProvider;

pub const ANALYST_SYSTEM_PROMPT: &str = "\
You are a data analyst. Answer questions about the provided table precisely \
and concisely, using only the data it contains. When a computed figure is \
requested, show the figure, not the method.";

/// What a table query produced: prose, or a path to a chart image. The
/// wrapper decides which, so callers never inspect the raw reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    Text(String),
    ImagePath(String),
}

/// Binds a parsed table to a chat client and answers natural-language
/// questions about it in a single (non-streamed) round trip.
pub struct TableChat<T: CompletionProvider> {
    table: DataTable,
    provider: Arc<T>,
    sample_rows: usize,
}

impl<T: CompletionProvider> TableChat<T> {
    pub fn new(table: DataTable, provider: T) -> Self {
        Self {
            table,
            provider: Arc::new(provider),
            sample_rows: 20,
        }
    }

    pub async fn ask(&self, query: &str) -> Result<Option<ChatOutcome>> {
        let prompt = self.compose_prompt(query);
        let reply = self.provider.complete(&prompt).await?;
        Ok(classify_reply(&reply))
    }

    fn compose_prompt(&self, query: &str) -> String {
        format!(
            "The table has {} rows and {} columns ({}).\n\
             A sample of the data in CSV form:\n{}\n\n\
             Question: {}\nAnswer:",
            self.table.row_count(),
            self.table.column_count(),
            self.table.headers().join(", "),
            self.table.to_csv_sample(self.sample_rows),
            query
        )
    }
}

/// An empty reply is "no answer"; a reply that is just an image filename is
/// a chart reference; anything else is prose.
fn classify_reply(reply: &str) -> Option<ChatOutcome> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lowered = trimmed.to_lowercase();
    if lowered.ends_with(".png") || lowered.ends_with(".jpg") || lowered.ends_with(".jpeg") {
        return Some(ChatOutcome::ImagePath(trimmed.to_string()));
    }

    Some(ChatOutcome::Text(trimmed.to_string()))
}
