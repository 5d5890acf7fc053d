pub mod chat;
pub mod table;

pub use chat::{ChatOutcome, TableChat};
pub use table::{DataTable, TableError};
