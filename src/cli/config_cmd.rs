use std::path::PathBuf;

use crate::models::config::{self, UserConfig};

pub struct ConfigChanges {
    pub data_dir: Option<PathBuf>,
    pub questions: Option<usize>,
    pub daily: Option<usize>,
    pub minutes: Option<u32>,
}

impl ConfigChanges {
    fn is_empty(&self) -> bool {
        self.data_dir.is_none()
            && self.questions.is_none()
            && self.daily.is_none()
            && self.minutes.is_none()
    }

    fn apply(self, config: &mut UserConfig) {
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(n) = self.questions {
            config.questions_per_level = n;
        }
        if let Some(n) = self.daily {
            config.daily_questions = n;
        }
        if let Some(minutes) = self.minutes {
            config.session_seconds = minutes.saturating_mul(60);
        }
    }
}

pub fn handle_config(changes: ConfigChanges) {
    let mut user_config = config::load_config();

    if changes.is_empty() {
        print_config(&user_config);
        if let Some(path) = config::get_config_path() {
            println!();
            println!("Config file: {}", path.display());
        }
        println!("To change: utbk config --questions 10 --minutes 60");
        return;
    }

    changes.apply(&mut user_config);
    if user_config.questions_per_level == 0 || user_config.daily_questions == 0 {
        eprintln!("Question counts must be at least 1");
        std::process::exit(1);
    }
    if user_config.session_seconds == 0 {
        eprintln!("Session length must be at least 1 minute");
        std::process::exit(1);
    }

    if let Err(e) = config::save_config(&user_config) {
        eprintln!("Failed to save config: {}", e);
        std::process::exit(1);
    }

    println!("Settings updated.");
    print_config(&user_config);
}

fn print_config(config: &UserConfig) {
    println!("Data directory:      {}", config.data_dir.display());
    println!("Questions per level: {}", config.questions_per_level);
    println!("Daily questions:     {}", config.daily_questions);
    println!("Session length:      {} min", config.session_seconds / 60);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_only_given_changes() {
        let mut config = UserConfig::default();
        let changes = ConfigChanges {
            data_dir: None,
            questions: Some(12),
            daily: None,
            minutes: Some(30),
        };
        assert!(!changes.is_empty());

        changes.apply(&mut config);
        assert_eq!(config.questions_per_level, 12);
        assert_eq!(config.daily_questions, 5);
        assert_eq!(config.session_seconds, 1800);
    }
}
