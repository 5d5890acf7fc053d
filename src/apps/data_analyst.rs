use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::path::{Path, PathBuf};

use crate::config::{AnalystConfig, ConfigError};
use crate::dataframe::chat::{ChatOutcome, TableChat, ANALYST_SYSTEM_PROMPT};
use crate::dataframe::table::{DataTable, TableError};
use crate::providers::groq::groq::GroqProvider;
use crate::providers::traits::CompletionProvider;
use crate::ui::{self, Surface, TerminalSurface};

pub const ANALYST_TITLE: &str = "Data analyst powered by Pandas AI";
pub const QUERY_LABEL: &str = "Qué quieres saber?";
const ANALYZING_MESSAGE: &str = "Analizando";
const UPLOAD_PROMPT: &str = "Please upload a CSV file to begin analysis";
const WRONG_TYPE_ERROR: &str = "Please upload a CSV file";
const EMPTY_TABLE_WARNING: &str = "The uploaded file is empty";
const EMPTY_FILE_ERROR: &str = "The uploaded file is empty or invalid";
const PARSE_ERROR: &str = "Error parsing the CSV file. Please check the file format.";
const GENERIC_FILE_ERROR: &str = "An error occurred while processing the file. Please try again.";
const MISSING_KEY_ERROR: &str =
    "GROQ_API_KEY environment variable not set. Please configure your API key.";
const EMPTY_QUERY_WARNING: &str = "Introduce tu consulta";
const NO_RESPONSE_WARNING: &str = "No response generated. Please try a different query.";
const GENERIC_CHAT_ERROR: &str =
    "An error occurred while processing your request. Please try again.";

/// Validates and parses the uploaded file, rendering the first five rows as
/// confirmation. Returns `None` when this submission cannot proceed.
pub fn load_table<S: Surface>(path: &Path, surface: &mut S) -> Option<DataTable> {
    let is_csv = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_lowercase().ends_with(".csv"))
        .unwrap_or(false);
    if !is_csv {
        surface.error(WRONG_TYPE_ERROR);
        return None;
    }

    let table = match DataTable::from_path(path) {
        Ok(table) => table,
        Err(TableError::EmptyData) => {
            surface.error(EMPTY_FILE_ERROR);
            return None;
        }
        Err(TableError::Malformed(e)) => {
            log::error!("CSV parse failure: {}", e);
            surface.error(PARSE_ERROR);
            return None;
        }
        Err(e) => {
            log::error!("Error processing uploaded file: {}", e);
            surface.error(GENERIC_FILE_ERROR);
            return None;
        }
    };

    if table.is_empty() {
        surface.warning(EMPTY_TABLE_WARNING);
        return None;
    }

    surface.text(&table.preview(5));
    Some(table)
}

/// Builds the chat client, or reports why it cannot exist. A `None` here
/// must stop the flow: no query may run without a client.
pub fn initialize_llm<S: Surface>(config: &AnalystConfig, surface: &mut S) -> Option<GroqProvider> {
    match GroqProvider::new(config, ANALYST_SYSTEM_PROMPT.to_string()) {
        Ok(provider) => Some(provider),
        Err(ConfigError::MissingApiKey) => {
            log::error!("GROQ_API_KEY environment variable not set");
            surface.error(MISSING_KEY_ERROR);
            None
        }
        Err(e) => {
            log::error!("Failed to initialize LLM: {}", e);
            surface.error(&format!(
                "Failed to initialize the language model: {}. Please check your API key and connection.",
                e
            ));
            None
        }
    }
}

/// Dispatches one submitted query and renders the outcome.
pub async fn handle_query<T: CompletionProvider, S: Surface>(
    chat: &TableChat<T>,
    query: &str,
    surface: &mut S,
) {
    if query.trim().is_empty() {
        surface.warning(EMPTY_QUERY_WARNING);
        return;
    }

    let spinner = ui::spinner(ANALYZING_MESSAGE);
    let result = chat.ask(query).await;
    spinner.finish_and_clear();

    match result {
        Ok(Some(ChatOutcome::ImagePath(path))) => surface.image(&path),
        Ok(Some(ChatOutcome::Text(text))) => surface.text(&text),
        Ok(None) => surface.warning(NO_RESPONSE_WARNING),
        Err(e) => {
            log::error!("Error during chat processing: {}", e);
            surface.error(GENERIC_CHAT_ERROR);
        }
    }
}

pub async fn run(config: &AnalystConfig, file: Option<PathBuf>) -> Result<()> {
    let mut surface = TerminalSurface::new();
    println!("{}", ANALYST_TITLE.bold());

    let Some(path) = file else {
        surface.info(UPLOAD_PROMPT);
        return Ok(());
    };
    let Some(table) = load_table(&path, &mut surface) else {
        return Ok(());
    };
    let Some(provider) = initialize_llm(config, &mut surface) else {
        return Ok(());
    };
    let chat = TableChat::new(table, provider);

    let mut rl = Editor::<(), DefaultHistory>::new()?;
    loop {
        match rl.readline(&format!("{} ", QUERY_LABEL)) {
            Ok(line) => {
                let input = line.trim();
                if !input.is_empty() {
                    let _ = rl.add_history_entry(input);
                }
                handle_query(&chat, input, &mut surface).await;
                surface.finish();
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_GROQ_API_URL;
    use crate::providers::mock::MockProvider;
    use crate::ui::testing::{RecordingSurface, SurfaceEvent};
    use std::fs;
    use uuid::Uuid;

    struct TempCsv {
        path: PathBuf,
    }

    impl TempCsv {
        fn new(extension: &str, content: &str) -> Self {
            let path =
                std::env::temp_dir().join(format!("analyst-test-{}.{}", Uuid::new_v4(), extension));
            fs::write(&path, content).unwrap();
            Self { path }
        }
    }

    impl Drop for TempCsv {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.path);
        }
    }

    fn config(api_key: Option<&str>) -> AnalystConfig {
        AnalystConfig {
            api_key: api_key.map(str::to_string),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.2,
            api_url: DEFAULT_GROQ_API_URL.to_string(),
        }
    }

    fn chat_with(reply_provider: MockProvider) -> TableChat<MockProvider> {
        let table = DataTable::parse("region,units\nnorth,10\nsouth,25\n").unwrap();
        TableChat::new(table, reply_provider)
    }

    #[test]
    fn non_csv_extension_is_rejected_before_any_read() {
        let mut surface = RecordingSurface::new();
        // path deliberately does not exist; the suffix check must fire first
        let table = load_table(Path::new("/nonexistent/report.txt"), &mut surface);

        assert!(table.is_none());
        assert_eq!(surface.errors(), vec![WRONG_TYPE_ERROR]);
    }

    #[test]
    fn zero_row_csv_warns_and_halts() {
        let file = TempCsv::new("csv", "region,units\n");
        let mut surface = RecordingSurface::new();

        let table = load_table(&file.path, &mut surface);

        assert!(table.is_none());
        assert_eq!(surface.warnings(), vec![EMPTY_TABLE_WARNING]);
    }

    #[test]
    fn blank_file_is_reported_as_empty_or_invalid() {
        let file = TempCsv::new("csv", "   \n");
        let mut surface = RecordingSurface::new();

        assert!(load_table(&file.path, &mut surface).is_none());
        assert_eq!(surface.errors(), vec![EMPTY_FILE_ERROR]);
    }

    #[test]
    fn ragged_csv_is_reported_as_parse_error() {
        let file = TempCsv::new("csv", "a,b\n1,2,3\n");
        let mut surface = RecordingSurface::new();

        assert!(load_table(&file.path, &mut surface).is_none());
        assert_eq!(surface.errors(), vec![PARSE_ERROR]);
    }

    #[test]
    fn valid_csv_previews_exactly_five_rows() {
        let mut content = String::from("id,value\n");
        for i in 1..=8 {
            content.push_str(&format!("{},v{}\n", i, i));
        }
        let file = TempCsv::new("csv", &content);
        let mut surface = RecordingSurface::new();

        let table = load_table(&file.path, &mut surface).expect("table should load");

        assert_eq!(table.row_count(), 8);
        match &surface.events[0] {
            SurfaceEvent::Text(preview) => {
                assert!(preview.contains("v5"));
                assert!(!preview.contains("v6"));
            }
            other => panic!("expected preview text, got {:?}", other),
        }
    }

    #[test]
    fn missing_credential_blocks_client_creation() {
        let mut surface = RecordingSurface::new();

        let provider = initialize_llm(&config(None), &mut surface);

        assert!(provider.is_none());
        assert_eq!(surface.errors(), vec![MISSING_KEY_ERROR]);
    }

    #[test]
    fn present_credential_yields_client_silently() {
        let mut surface = RecordingSurface::new();

        let provider = initialize_llm(&config(Some("gsk-test")), &mut surface);

        assert!(provider.is_some());
        assert!(surface.events.is_empty());
    }

    #[tokio::test]
    async fn empty_query_warns_without_external_call() {
        let provider = MockProvider::with_reply("never");
        let chat = chat_with(provider.clone());
        let mut surface = RecordingSurface::new();

        handle_query(&chat, "   ", &mut surface).await;

        assert_eq!(surface.warnings(), vec![EMPTY_QUERY_WARNING]);
        assert_eq!(provider.total_calls(), 0);
    }

    #[tokio::test]
    async fn image_path_reply_renders_image_region() {
        let chat = chat_with(MockProvider::with_reply("chart.png"));
        let mut surface = RecordingSurface::new();

        handle_query(&chat, "plot units", &mut surface).await;

        assert_eq!(
            surface.events,
            vec![SurfaceEvent::Image("chart.png".to_string())]
        );
    }

    #[tokio::test]
    async fn prose_reply_renders_text_region() {
        let chat = chat_with(MockProvider::with_reply("The mean is 5"));
        let mut surface = RecordingSurface::new();

        handle_query(&chat, "mean of units", &mut surface).await;

        assert_eq!(
            surface.events,
            vec![SurfaceEvent::Text("The mean is 5".to_string())]
        );
    }

    #[tokio::test]
    async fn blank_reply_suggests_rephrasing() {
        let chat = chat_with(MockProvider::with_reply("  "));
        let mut surface = RecordingSurface::new();

        handle_query(&chat, "anything", &mut surface).await;

        assert_eq!(surface.warnings(), vec![NO_RESPONSE_WARNING]);
    }

    #[tokio::test]
    async fn chat_failure_yields_exactly_one_generic_banner() {
        let chat = chat_with(MockProvider::failing());
        let mut surface = RecordingSurface::new();

        handle_query(&chat, "summarize", &mut surface).await;

        assert_eq!(surface.errors(), vec![GENERIC_CHAT_ERROR]);
        assert_eq!(surface.events.len(), 1);
    }
}
