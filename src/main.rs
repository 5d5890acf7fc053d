use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;

use rust_ai_assistant::agent::{assistant_system_prompt, Agent, AgentSettings};
use rust_ai_assistant::apps::docs_assistant::DocsAssistant;
use rust_ai_assistant::apps::{data_analyst, docs_assistant};
use rust_ai_assistant::config::{AnalystConfig, AssistantConfig};
use rust_ai_assistant::database::vector_db::VectorDB;
use rust_ai_assistant::knowledge::{KnowledgeSource, UrlKnowledge};
use rust_ai_assistant::providers::ollama::ollama::OllamaProvider;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask questions about the Agno framework documentation
    Docs,
    /// Ask questions about a CSV dataset
    Data {
        /// Path to the CSV file to analyze
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize colored output
    colored::control::set_override(true);

    // Load environment variables
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    match args.command {
        Command::Docs => run_docs_mode().await,
        Command::Data { file } => run_data_mode(file).await,
    }
}

async fn run_docs_mode() -> anyhow::Result<()> {
    let config = AssistantConfig::from_env();

    let provider =
        OllamaProvider::new(&config, assistant_system_prompt(&AgentSettings::default()));

    let vector_db = VectorDB::connect(&config.qdrant_url).await?;
    let knowledge: Arc<dyn KnowledgeSource> = Arc::new(UrlKnowledge::new(
        vec![config.knowledge_url.clone()],
        vector_db,
        Box::new(provider.clone()),
        config.collection.clone(),
        config.embedding_dimensions as u64,
    ));

    let agent = Agent::new(provider, knowledge);
    docs_assistant::run(DocsAssistant::new(agent)).await
}

async fn run_data_mode(file: Option<PathBuf>) -> anyhow::Result<()> {
    let config = AnalystConfig::from_env();
    data_analyst::run(&config, file).await
}
