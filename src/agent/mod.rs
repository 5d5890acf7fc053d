use anyhow::Result;
use chrono::Local;
use std::sync::Arc;

use crate::knowledge::KnowledgeSource;
use crate::providers::traits::{CompletionProvider, CompletionStream};

const AGENT_NAME: &str = "Agno Assist";

const AGENT_DESCRIPTION: &str = "\
You are AgnoAssist, an advanced AI Agent specializing in Agno: a lightweight \
framework for building multi-modal, reasoning Agents.

Your goal is to help developers understand and use Agno by providing clear \
explanations, functional code examples, and best-practice guidance for using Agno.";

const AGENT_INSTRUCTIONS: &str = "\
Your mission is to provide comprehensive and actionable support for developers \
working with the Agno framework. Follow these steps to deliver high-quality \
assistance:

1. Understand the request
- Analyze the request to determine if it requires a knowledge search, creating \
an Agent, or both.
- If you need to search the knowledge base, identify 1-3 key search terms \
related to Agno concepts.
- When the user asks for an Agent, they mean an Agno Agent.
- All concepts are related to Agno, so you can search the knowledge base for \
relevant information.

2. Iterative knowledge base search
- Gather Agno concepts, illustrative code examples, and specific implementation \
details relevant to the user's request from the documentation excerpts provided.
- Continue until you have sufficient information to comprehensively address the \
query.

3. Code creation
- Create complete, working code examples that users can run, including all \
necessary imports and setup, comprehensive comments, dependency lists, error \
handling, and type hints.

Key topics to cover:
- Agent architecture, levels, and capabilities.
- Knowledge base integration and memory management strategies.
- Tool creation, integration, and usage.
- Supported models and their configuration.
- Common development patterns and best practices within Agno.";

/// Presentation flags folded into the system prompt.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub markdown: bool,
    pub add_datetime_to_instructions: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            markdown: true,
            add_datetime_to_instructions: true,
        }
    }
}

/// System prompt for the documentation assistant's model. Built before the
/// provider so the provider can carry it on every request.
pub fn assistant_system_prompt(settings: &AgentSettings) -> String {
    let mut prompt = format!("{}\n\n{}", AGENT_DESCRIPTION, AGENT_INSTRUCTIONS);
    if settings.add_datetime_to_instructions {
        prompt.push_str(&format!(
            "\n\nThe current date and time is {}.",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
    }
    if settings.markdown {
        prompt.push_str("\nFormat your responses using markdown.");
    }
    prompt
}

/// A conversational entity bound to a model and a knowledge source. Each
/// run grounds the question in retrieved documentation before invoking the
/// model; multi-turn continuity is not exercised, so the user and session
/// identifiers stay unset unless a caller opts in.
pub struct Agent<T: CompletionProvider> {
    name: String,
    provider: Arc<T>,
    knowledge: Arc<dyn KnowledgeSource>,
    user_id: Option<String>,
    session_id: Option<String>,
    search_limit: u64,
}

impl<T: CompletionProvider> Agent<T> {
    pub fn new(provider: T, knowledge: Arc<dyn KnowledgeSource>) -> Self {
        Self {
            name: AGENT_NAME.to_string(),
            provider: Arc::new(provider),
            knowledge,
            user_id: None,
            session_id: None,
            search_limit: 5,
        }
    }

    pub fn with_session(mut self, user_id: Option<String>, session_id: Option<String>) -> Self {
        self.user_id = user_id;
        self.session_id = session_id;
        self
    }

    pub fn knowledge(&self) -> Arc<dyn KnowledgeSource> {
        self.knowledge.clone()
    }

    async fn compose_prompt(&self, question: &str) -> Result<String> {
        let passages = self.knowledge.search(question, self.search_limit).await?;

        let mut prompt = String::new();
        if !passages.is_empty() {
            prompt.push_str("Relevant documentation:\n");
            for (i, passage) in passages.iter().enumerate() {
                prompt.push_str(&format!("{}. {}\n", i + 1, passage));
            }
            prompt.push('\n');
        }
        if let Some(session_id) = &self.session_id {
            prompt.push_str(&format!("Current session: {}\n", session_id));
        }
        if let Some(user_id) = &self.user_id {
            prompt.push_str(&format!("Current user: {}\n", user_id));
        }
        prompt.push_str(&format!("User: {}\nAssistant:", question));
        Ok(prompt)
    }

    pub async fn run(&self, question: &str) -> Result<String> {
        log::debug!("{} answering in blocking mode", self.name);
        let prompt = self.compose_prompt(question).await?;
        self.provider.complete(&prompt).await
    }

    pub async fn run_streamed(&self, question: &str) -> Result<CompletionStream> {
        log::debug!("{} answering in streaming mode", self.name);
        let prompt = self.compose_prompt(question).await?;
        self.provider.complete_streaming(&prompt).await
    }
}
