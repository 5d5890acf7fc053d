use anyhow::Result;
use colored::Colorize;
use futures::StreamExt;
use indicatif::ProgressBar;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::sync::Arc;

use crate::agent::Agent;
use crate::knowledge::KnowledgeSource;
use crate::providers::traits::CompletionProvider;
use crate::ui::{self, Surface, TerminalSurface};

pub const ASSISTANT_TITLE: &str = "Agno assistant";
pub const PROMPT_LABEL: &str = "En qué te puedo ayudar?";
const THINKING_MESSAGE: &str = "Buscando respuestas...";
const GENERIC_ERROR: &str = "An error occurred while processing your request. Please try again.";

/// Interactive shell for the documentation assistant. Every submission
/// re-checks the knowledge source for fresh content, then streams the
/// agent's answer into the markdown region.
pub struct DocsAssistant<T: CompletionProvider> {
    agent: Agent<T>,
    knowledge: Arc<dyn KnowledgeSource>,
    // hardcoded; the blocking branch below stays dormant
    streaming: bool,
}

impl<T: CompletionProvider> DocsAssistant<T> {
    pub fn new(agent: Agent<T>) -> Self {
        let knowledge = agent.knowledge();
        Self {
            agent,
            knowledge,
            streaming: true,
        }
    }

    #[cfg(test)]
    fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Handles one submission. Empty input is a no-op; any failure along
    /// the way is logged and collapses into one generic banner.
    pub async fn answer<S: Surface>(&self, question: &str, surface: &mut S) {
        if question.trim().is_empty() {
            return;
        }

        let spinner = ui::spinner(THINKING_MESSAGE);
        let result = self.try_answer(question, surface, &spinner).await;
        spinner.finish_and_clear();

        if let Err(e) = result {
            log::error!("Error in assistant processing: {}", e);
            surface.error(GENERIC_ERROR);
        }
        surface.finish();
    }

    async fn try_answer<S: Surface>(
        &self,
        question: &str,
        surface: &mut S,
        spinner: &ProgressBar,
    ) -> Result<()> {
        // Always re-check for fresh content rather than trusting a prior
        // load; the reload is non-destructive.
        self.knowledge.load(false).await?;

        if self.streaming {
            let mut stream = self.agent.run_streamed(question).await?;
            let mut response = String::new();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                if response.is_empty() {
                    spinner.finish_and_clear();
                }
                response.push_str(&chunk);
                surface.markdown(&response);
            }
        } else {
            let response = self.agent.run(question).await?;
            spinner.finish_and_clear();
            surface.text(&response);
        }

        Ok(())
    }
}

pub async fn run<T: CompletionProvider>(assistant: DocsAssistant<T>) -> Result<()> {
    let mut surface = TerminalSurface::new();
    println!("{}", ASSISTANT_TITLE.bold());

    let mut rl = Editor::<(), DefaultHistory>::new()?;
    loop {
        match rl.readline(&format!("{} ", PROMPT_LABEL)) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(input);
                assistant.answer(input, &mut surface).await;
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
