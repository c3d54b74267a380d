pub mod config;
pub mod history;
pub mod level;
pub mod question;

pub use history::{HistoryEntry, HistoryLog};
pub use level::{Level, LevelFilter};
pub use question::{Question, QuestionId, RawQuestion, choice_label, label_index};
