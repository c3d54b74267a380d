use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::level::Level;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question has no choices")]
    NoChoices,
    #[error("question has no correct_answer")]
    MissingAnswer,
    #[error("correct_answer {0:?} does not match any choice")]
    UnresolvedAnswer(String),
    #[error("correct_answer index {index} is out of range for {len} choices")]
    AnswerOutOfRange { index: i64, len: usize },
    #[error("unknown level '{0}'")]
    UnknownLevel(String),
}

/// Question identifier. The bank may store ids as strings or numbers;
/// both are compared by their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct QuestionId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for QuestionId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => QuestionId(s),
            RawId::Number(n) => QuestionId(n.to_string()),
        }
    }
}

impl From<QuestionId> for String {
    fn from(id: QuestionId) -> Self {
        id.0
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        QuestionId(s.to_string())
    }
}

impl QuestionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Correct-answer marker as found in the bank: an index, a letter or the
/// literal text of a choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerKey {
    Index(i64),
    Text(String),
}

/// Question exactly as stored in the bank file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuestion {
    #[serde(default)]
    pub id: Option<QuestionId>,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub choices: Vec<Value>,
    #[serde(default)]
    pub correct_answer: Option<AnswerKey>,
    #[serde(default)]
    pub reading: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// A validated question whose `correct_answer` indexes into `choices`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub id: QuestionId,
    pub package: String,
    pub level: Option<Level>,
    pub question: String,
    pub choices: Vec<String>,
    pub correct_answer: usize,
    pub reading: Option<String>,
    pub explanation: Option<String>,
}

impl Question {
    /// Validates a bank entry. `position` is the entry's index in the bank
    /// and backs the id when the entry has none.
    pub fn from_raw(raw: RawQuestion, position: usize) -> Result<Self, QuestionError> {
        let package = raw.package.unwrap_or_default().trim().to_string();

        let level = match raw.level.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) => Some(s.parse::<Level>()?),
        };

        let choices: Vec<String> = raw
            .choices
            .into_iter()
            .map(|c| match c {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();
        if choices.is_empty() {
            return Err(QuestionError::NoChoices);
        }

        let key = raw.correct_answer.ok_or(QuestionError::MissingAnswer)?;
        let correct_answer = match normalize_answer(&key, &choices) {
            AnswerKey::Index(index) => usize::try_from(index)
                .ok()
                .filter(|i| *i < choices.len())
                .ok_or(QuestionError::AnswerOutOfRange {
                    index,
                    len: choices.len(),
                })?,
            AnswerKey::Text(text) => return Err(QuestionError::UnresolvedAnswer(text)),
        };

        let id = raw.id.unwrap_or_else(|| {
            let prefix = if package.is_empty() { "q" } else { package.as_str() };
            QuestionId(format!("{}-{}", prefix.to_lowercase(), position))
        });

        Ok(Question {
            id,
            package,
            level,
            question: raw.question.unwrap_or_default(),
            choices,
            correct_answer,
            reading: raw.reading.filter(|r| !r.trim().is_empty()),
            explanation: raw.explanation.filter(|e| !e.trim().is_empty()),
        })
    }

    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_answer
    }

    pub fn points(&self) -> u32 {
        self.level.map_or(0, |level| level.daily_points())
    }
}

/// Letter shown next to the choice at `index` ('A' for 0).
pub fn choice_label(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map_or('?', |i| (b'A' + i) as char)
}

/// Inverse of [`choice_label`], case-insensitive.
pub fn label_index(label: char) -> Option<usize> {
    label
        .is_ascii_alphabetic()
        .then(|| (label.to_ascii_uppercase() as u8 - b'A') as usize)
}

/// Resolves `key` to a choice index. Integers are returned untouched, a
/// single letter maps A→0, B→1 when in range, anything else is matched
/// against the choice texts (exact first, then case-insensitive). When no
/// rule applies the key comes back unchanged.
pub fn normalize_answer(key: &AnswerKey, choices: &[String]) -> AnswerKey {
    let text = match key {
        AnswerKey::Index(_) => return key.clone(),
        AnswerKey::Text(text) => text.trim(),
    };

    let mut chars = text.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(index) = label_index(c).filter(|i| *i < choices.len()) {
            return AnswerKey::Index(index as i64);
        }
    }

    if let Some(index) = choices.iter().position(|c| c == text) {
        return AnswerKey::Index(index as i64);
    }

    let lowered = text.to_lowercase();
    if let Some(index) = choices
        .iter()
        .position(|c| c.trim().to_lowercase() == lowered)
    {
        return AnswerKey::Index(index as i64);
    }

    key.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn text(s: &str) -> AnswerKey {
        AnswerKey::Text(s.to_string())
    }

    #[test]
    fn letter_maps_to_index() {
        let c = choices(&["x", "y", "z"]);
        assert_eq!(normalize_answer(&text("B"), &c), AnswerKey::Index(1));
        assert_eq!(normalize_answer(&text(" c "), &c), AnswerKey::Index(2));
    }

    #[test]
    fn letter_out_of_range_falls_back_to_text() {
        let c = choices(&["x", "y", "D"]);
        // 'D' is past the last choice as a letter but matches the text.
        assert_eq!(normalize_answer(&text("D"), &c), AnswerKey::Index(2));

        let c = choices(&["x", "y"]);
        assert_eq!(normalize_answer(&text("E"), &c), text("E"));
    }

    #[test]
    fn integer_is_untouched() {
        let c = choices(&["x"]);
        assert_eq!(normalize_answer(&AnswerKey::Index(7), &c), AnswerKey::Index(7));
    }

    #[test]
    fn numeric_string_matches_choice_text() {
        let c = choices(&["10", "20", "30"]);
        assert_eq!(normalize_answer(&text("20"), &c), AnswerKey::Index(1));
    }

    #[test]
    fn text_match_exact_then_case_insensitive() {
        let c = choices(&["Jakarta", "Bandung ", "Surabaya"]);
        assert_eq!(normalize_answer(&text("Surabaya"), &c), AnswerKey::Index(2));
        assert_eq!(normalize_answer(&text("bandung"), &c), AnswerKey::Index(1));
        assert_eq!(normalize_answer(&text("Medan"), &c), text("Medan"));
    }

    #[test]
    fn from_raw_validates_answer() {
        let raw: RawQuestion = serde_json::from_value(serde_json::json!({
            "id": 12,
            "package": " PU ",
            "level": "Easy",
            "question": "2 + 2 = ?",
            "choices": ["3", 4, "5"],
            "correct_answer": "4",
            "explanation": ""
        }))
        .unwrap();

        let q = Question::from_raw(raw, 0).unwrap();
        assert_eq!(q.id.as_str(), "12");
        assert_eq!(q.package, "PU");
        assert_eq!(q.level, Some(Level::Easy));
        assert_eq!(q.choices, choices(&["3", "4", "5"]));
        assert_eq!(q.correct_answer, 1);
        assert_eq!(q.explanation, None);
    }

    #[test]
    fn from_raw_rejects_bad_entries() {
        let base = RawQuestion {
            choices: vec![Value::from("a"), Value::from("b")],
            ..Default::default()
        };

        let missing = base.clone();
        assert_eq!(
            Question::from_raw(missing, 0).unwrap_err(),
            QuestionError::MissingAnswer
        );

        let out_of_range = RawQuestion {
            correct_answer: Some(AnswerKey::Index(2)),
            ..base.clone()
        };
        assert_eq!(
            Question::from_raw(out_of_range, 0).unwrap_err(),
            QuestionError::AnswerOutOfRange { index: 2, len: 2 }
        );

        let unresolved = RawQuestion {
            correct_answer: Some(text("zzz")),
            ..base.clone()
        };
        assert!(matches!(
            Question::from_raw(unresolved, 0),
            Err(QuestionError::UnresolvedAnswer(_))
        ));

        let bad_level = RawQuestion {
            correct_answer: Some(AnswerKey::Index(0)),
            level: Some("expert".into()),
            ..base
        };
        assert_eq!(
            Question::from_raw(bad_level, 0).unwrap_err(),
            QuestionError::UnknownLevel("expert".into())
        );

        assert_eq!(
            Question::from_raw(RawQuestion::default(), 0).unwrap_err(),
            QuestionError::NoChoices
        );
    }

    #[test]
    fn missing_id_is_positional() {
        let raw = RawQuestion {
            package: Some("PK".into()),
            choices: vec![Value::from("a")],
            correct_answer: Some(AnswerKey::Index(0)),
            ..Default::default()
        };
        assert_eq!(Question::from_raw(raw, 4).unwrap().id.as_str(), "pk-4");
    }

    #[test]
    fn labels_round_trip() {
        assert_eq!(choice_label(0), 'A');
        assert_eq!(choice_label(3), 'D');
        assert_eq!(label_index('d'), Some(3));
        assert_eq!(label_index('1'), None);
    }
}
