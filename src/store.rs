//! Flat JSON persistence for the question bank and the session history.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::models::{HistoryLog, Question, RawQuestion};

const QUESTIONS_FILE: &str = "soal.json";
const HISTORY_FILE: &str = "history.json";

/// Offered when the bank names no packages.
pub const DEFAULT_PACKAGES: [&str; 5] = ["PK", "PM", "PPU", "PBM", "PU"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Store {
    questions_path: PathBuf,
    history_path: PathBuf,
}

impl Store {
    /// Creates the data directory if needed and seeds an empty history file.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir).map_err(|source| StoreError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;

        let store = Self {
            questions_path: data_dir.join(QUESTIONS_FILE),
            history_path: data_dir.join(HISTORY_FILE),
        };

        if !store.history_path.exists() {
            save_json(&store.history_path, &Vec::<Value>::new())?;
        }

        Ok(store)
    }

    pub fn questions_path(&self) -> &Path {
        &self.questions_path
    }

    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    /// Every valid question in the bank. Entries that fail validation are
    /// skipped.
    pub fn load_questions(&self) -> Vec<Question> {
        let items: Vec<Value> = load_json(&self.questions_path);

        items
            .into_iter()
            .enumerate()
            .filter_map(|(position, item)| {
                let raw: RawQuestion = match serde_json::from_value(item) {
                    Ok(raw) => raw,
                    Err(e) => {
                        tracing::warn!(position, error = %e, "skipping malformed question");
                        return None;
                    }
                };
                match Question::from_raw(raw, position) {
                    Ok(q) => Some(q),
                    Err(e) => {
                        tracing::warn!(position, error = %e, "skipping invalid question");
                        None
                    }
                }
            })
            .collect()
    }

    /// Questions for `package`: exact (case-insensitive) match first, then
    /// substring match, then the whole bank.
    pub fn questions_for_package(&self, package: &str) -> Vec<Question> {
        questions_for_package(self.load_questions(), package)
    }

    /// Package names in the bank, uppercased and sorted; the defaults when
    /// the bank names none.
    pub fn packages(&self) -> Vec<String> {
        list_packages(&self.load_questions())
    }

    /// The history log. Items that do not decode are carried along so a
    /// later save writes them back.
    pub fn load_history(&self) -> HistoryLog {
        HistoryLog::from_values(load_json(&self.history_path))
    }

    pub fn save_history(&self, history: &HistoryLog) -> Result<(), StoreError> {
        let items = history.to_values().map_err(|source| StoreError::Json {
            path: self.history_path.clone(),
            source,
        })?;
        save_json(&self.history_path, &items)
    }
}

pub fn questions_for_package(bank: Vec<Question>, package: &str) -> Vec<Question> {
    let target = package.trim().to_lowercase();
    if target.is_empty() {
        return bank;
    }

    let exact: Vec<Question> = bank
        .iter()
        .filter(|q| q.package.to_lowercase() == target)
        .cloned()
        .collect();
    if !exact.is_empty() {
        return exact;
    }

    let partial: Vec<Question> = bank
        .iter()
        .filter(|q| q.package.to_lowercase().contains(&target))
        .cloned()
        .collect();
    if !partial.is_empty() {
        return partial;
    }

    tracing::info!(package, "no questions tagged for package, using the whole bank");
    bank
}

pub fn list_packages(bank: &[Question]) -> Vec<String> {
    let packages: BTreeSet<String> = bank
        .iter()
        .map(|q| q.package.to_uppercase())
        .filter(|p| !p.is_empty())
        .collect();

    if packages.is_empty() {
        DEFAULT_PACKAGES.iter().map(|p| p.to_string()).collect()
    } else {
        packages.into_iter().collect()
    }
}

/// Reads a JSON array; a missing or corrupt file reads as empty.
fn load_json<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    if !path.exists() {
        return Vec::new();
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read file");
            return Vec::new();
        }
    };

    serde_json::from_str(&contents).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "treating corrupt file as empty");
        Vec::new()
    })
}

fn save_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), StoreError> {
    let contents = serde_json::to_string_pretty(data).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    fs::write(path, contents).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
