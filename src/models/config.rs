use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Directory holding `soal.json` and `history.json`, relative to the
    /// working directory unless absolute.
    pub data_dir: PathBuf,
    pub questions_per_level: usize,
    pub daily_questions: usize,
    pub session_seconds: u32,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            questions_per_level: 8,
            daily_questions: 5,
            session_seconds: 75 * 60,
        }
    }
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("utbk-quiz").join("config.json"))
}

pub fn load_config() -> UserConfig {
    let Some(path) = get_config_path() else {
        tracing::debug!("no config directory on this platform, using defaults");
        return UserConfig::default();
    };
    if !path.exists() {
        return UserConfig::default();
    }

    match fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
            UserConfig::default()
        }),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read config");
            UserConfig::default()
        }
    }
}

pub fn save_config(config: &UserConfig) -> Result<(), std::io::Error> {
    let path = get_config_path().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "could not determine config directory")
    })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: UserConfig = serde_json::from_str(r#"{"daily_questions": 10}"#).unwrap();
        assert_eq!(config.daily_questions, 10);
        assert_eq!(config.questions_per_level, 8);
        assert_eq!(config.session_seconds, 4500);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }
}
