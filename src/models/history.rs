use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::question::QuestionId;

/// One finished session as recorded in the history file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub daily: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, deserialize_with = "lenient_ids", skip_serializing_if = "Vec::is_empty")]
    pub all_ids: Vec<QuestionId>,
    /// Fields this version does not know, written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HistoryEntry {
    /// Stamps a new entry with a fresh id and the current UTC time.
    pub fn new(
        score: u32,
        daily: Option<u32>,
        package: &str,
        level: &str,
        all_ids: Vec<QuestionId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            time: Utc::now().to_rfc3339(),
            score: i64::from(score),
            daily: daily.map(i64::from),
            package: Some(package.to_string()),
            level: Some(level.to_string()),
            all_ids,
            extra: Map::new(),
        }
    }

    /// Score shown in listings: daily points for daily sessions.
    pub fn display_score(&self) -> i64 {
        self.daily.unwrap_or(self.score)
    }

    pub fn is_daily(&self) -> bool {
        self.daily.is_some()
    }

    pub fn belongs_to(&self, package: &str) -> bool {
        self.package
            .as_deref()
            .is_some_and(|p| p.trim().eq_ignore_ascii_case(package.trim()))
    }
}

/// The history file as read from disk. Items that do not decode as an
/// entry are kept verbatim at their original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    foreign: Vec<(usize, Value)>,
}

impl HistoryLog {
    pub fn from_values(items: Vec<Value>) -> Self {
        let mut log = Self::default();
        for (position, item) in items.into_iter().enumerate() {
            match HistoryEntry::deserialize(&item) {
                Ok(entry) => log.entries.push(entry),
                Err(e) => {
                    tracing::warn!(position, error = %e, "keeping unreadable history entry as is");
                    log.foreign.push((position, item));
                }
            }
        }
        log
    }

    /// Every item in file order, foreign ones included.
    pub fn to_values(&self) -> Result<Vec<Value>, serde_json::Error> {
        let mut out = Vec::with_capacity(self.entries.len() + self.foreign.len());
        let mut foreign = self.foreign.iter().peekable();
        let mut entries = self.entries.iter();

        loop {
            if let Some((_, item)) = foreign.next_if(|(pos, _)| *pos <= out.len()) {
                out.push(item.clone());
            } else if let Some(entry) = entries.next() {
                out.push(serde_json::to_value(entry)?);
            } else if let Some((_, item)) = foreign.next() {
                out.push(item.clone());
            } else {
                break;
            }
        }
        Ok(out)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Keeps string and numeric ids, drops anything else.
fn lenient_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<QuestionId>, D::Error> {
    let items = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(QuestionId::from(s.as_str())),
            Value::Number(n) => Some(QuestionId::from(n.to_string().as_str())),
            _ => None,
        })
        .collect())
}
