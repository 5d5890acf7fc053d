pub mod data_analyst;
pub mod docs_assistant;
