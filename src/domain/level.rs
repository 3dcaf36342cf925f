//! Explanation levels and the per-level content payload.
//!
//! Every published record carries exactly five levels, keyed 1 through 5.
//! `Levels` keeps the raw keys (integers, numeric strings or anything else)
//! so that a malformed source file still deserializes and the Validation
//! Layer can report what is wrong with it.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A checked explanation level in the range 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct LevelNumber(u8);

impl LevelNumber {
    /// Lowest (lay) level
    pub const MIN: LevelNumber = LevelNumber(1);

    /// Highest (expert) level
    pub const MAX: LevelNumber = LevelNumber(5);

    /// All levels in ascending order of sophistication
    pub const ALL: [LevelNumber; 5] = [
        LevelNumber(1),
        LevelNumber(2),
        LevelNumber(3),
        LevelNumber(4),
        LevelNumber(5),
    ];

    /// Create a level number, rejecting anything outside 1..=5
    pub fn new(value: u32) -> Option<Self> {
        if (1..=5).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    /// Raw numeric value
    pub fn get(self) -> u32 {
        self.0 as u32
    }
}

impl TryFrom<u32> for LevelNumber {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("level must be between 1 and 5, got {}", value))
    }
}

impl From<LevelNumber> for u32 {
    fn from(level: LevelNumber) -> Self {
        level.get()
    }
}

impl std::fmt::Display for LevelNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A glossary entry attached to one level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyTerm {
    #[serde(default)]
    pub term: String,

    #[serde(default)]
    pub definition: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
}

impl KeyTerm {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
            pronunciation: None,
        }
    }
}

/// One tier of explanation within a record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelContent {
    /// Declared level; must equal the key it is stored under
    #[serde(default)]
    pub level: u32,

    /// Short summary (required, non-empty)
    #[serde(default)]
    pub summary: String,

    /// Long-form explanation (required, non-empty)
    #[serde(default)]
    pub explanation: String,

    #[serde(default)]
    pub key_terms: Vec<KeyTerm>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub analogies: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,

    /// Clinical notes; a single string in most source files, a list in some
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_notes: Option<TextBlock>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patient_counseling_points: Vec<String>,
}

impl LevelContent {
    /// Create a level with the required fields filled in
    pub fn new(level: LevelNumber, summary: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            level: level.get(),
            summary: summary.into(),
            explanation: explanation.into(),
            ..Default::default()
        }
    }

    /// Add a key term
    pub fn with_key_term(mut self, term: KeyTerm) -> Self {
        self.key_terms.push(term);
        self
    }

    /// Set clinical notes
    pub fn with_clinical_notes(mut self, notes: impl Into<String>) -> Self {
        self.clinical_notes = Some(TextBlock::Single(notes.into()));
        self
    }

    /// True when clinical notes are present and contain non-whitespace text
    pub fn has_clinical_notes(&self) -> bool {
        self.clinical_notes
            .as_ref()
            .map(|notes| notes.lines().any(|l| !l.trim().is_empty()))
            .unwrap_or(false)
    }
}

/// Free text that may be authored either as one string or as a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextBlock {
    Single(String),
    Many(Vec<String>),
}

impl TextBlock {
    /// Iterate over the individual strings
    pub fn lines(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            TextBlock::Single(s) => Box::new(std::iter::once(s.as_str())),
            TextBlock::Many(v) => Box::new(v.iter().map(String::as_str)),
        }
    }
}

/// The five levels of a record, keyed by raw level number.
///
/// Keys that are not numbers at all are kept apart in `malformed`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Levels {
    entries: BTreeMap<u32, LevelContent>,
    malformed: BTreeMap<String, LevelContent>,
}

impl Levels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a level under its own declared number
    pub fn insert(&mut self, content: LevelContent) -> Option<LevelContent> {
        self.entries.insert(content.level, content)
    }

    /// Insert under an explicit key (which may disagree with `content.level`)
    pub fn insert_at(&mut self, key: u32, content: LevelContent) -> Option<LevelContent> {
        self.entries.insert(key, content)
    }

    /// Remove a level
    pub fn remove(&mut self, key: u32) -> Option<LevelContent> {
        self.entries.remove(&key)
    }

    pub fn get(&self, level: LevelNumber) -> Option<&LevelContent> {
        self.entries.get(&level.get())
    }

    /// Iterate over every stored entry, valid keys or not
    pub fn iter(&self) -> impl Iterator<Item = (u32, &LevelContent)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Levels 1..=5 that are not present
    pub fn missing(&self) -> Vec<LevelNumber> {
        LevelNumber::ALL
            .into_iter()
            .filter(|l| !self.entries.contains_key(&l.get()))
            .collect()
    }

    /// Keys that are not numbers, in sorted order
    pub fn malformed_keys(&self) -> Vec<&str> {
        self.malformed.keys().map(String::as_str).collect()
    }

    /// Numeric keys outside 1..=5
    pub fn unexpected(&self) -> Vec<u32> {
        self.entries
            .keys()
            .copied()
            .filter(|k| LevelNumber::new(*k).is_none())
            .collect()
    }

    /// All five levels in order, or `None` if any is missing
    pub fn complete(&self) -> Option<[&LevelContent; 5]> {
        let [a, b, c, d, e] = LevelNumber::ALL;
        Some([
            self.get(a)?,
            self.get(b)?,
            self.get(c)?,
            self.get(d)?,
            self.get(e)?,
        ])
    }

    /// Number of stored entries, malformed keys included
    pub fn len(&self) -> usize {
        self.entries.len() + self.malformed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.malformed.is_empty()
    }
}

impl FromIterator<LevelContent> for Levels {
    fn from_iter<T: IntoIterator<Item = LevelContent>>(iter: T) -> Self {
        let mut levels = Levels::new();
        for content in iter {
            levels.insert(content);
        }
        levels
    }
}

/// A level key as authored: `1`, `"1"`, `-2` or `"one"`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLevelKey {
    Number(u64),
    Signed(i64),
    Text(String),
}

impl Serialize for Levels {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, content) in &self.entries {
            map.serialize_entry(key, content)?;
        }
        for (key, content) in &self.malformed {
            map.serialize_entry(key, content)?;
        }
        map.end()
    }
}

struct LevelsVisitor;

impl<'de> Visitor<'de> for LevelsVisitor {
    type Value = Levels;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of level number to level content")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Levels, A::Error> {
        let mut levels = Levels::new();
        while let Some((key, content)) = access.next_entry::<RawLevelKey, LevelContent>()? {
            let numeric = match &key {
                RawLevelKey::Number(n) => u32::try_from(*n).ok(),
                RawLevelKey::Signed(_) => None,
                RawLevelKey::Text(s) => s.trim().parse::<u32>().ok(),
            };
            match numeric {
                Some(n) => {
                    levels.entries.insert(n, content);
                }
                None => {
                    let text = match key {
                        RawLevelKey::Number(n) => n.to_string(),
                        RawLevelKey::Signed(n) => n.to_string(),
                        RawLevelKey::Text(s) => s,
                    };
                    levels.malformed.insert(text, content);
                }
            }
        }
        Ok(levels)
    }
}

impl<'de> Deserialize<'de> for Levels {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(LevelsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(n: u32) -> LevelContent {
        LevelContent::new(LevelNumber::new(n).unwrap(), "summary", "explanation")
    }

    #[test]
    fn test_level_number_bounds() {
        assert!(LevelNumber::new(0).is_none());
        assert!(LevelNumber::new(6).is_none());
        assert_eq!(LevelNumber::new(3).map(LevelNumber::get), Some(3));
        assert_eq!(LevelNumber::MIN.get(), 1);
        assert_eq!(LevelNumber::MAX.get(), 5);
    }

    #[test]
    fn test_levels_missing_and_unexpected() {
        let mut levels: Levels = [1, 2, 4, 5].into_iter().map(level).collect();
        levels.insert_at(7, level(5));

        assert_eq!(levels.missing(), vec![LevelNumber::new(3).unwrap()]);
        assert_eq!(levels.unexpected(), vec![7]);
        assert!(levels.complete().is_none());
    }

    #[test]
    fn test_levels_complete() {
        let levels: Levels = (1..=5).map(level).collect();
        let all = levels.complete().unwrap();
        assert_eq!(all[4].level, 5);
    }

    #[test]
    fn test_levels_deserialize_with_string_keys() {
        let json = r#"{"1": {"level": 1, "summary": "s", "explanation": "e"},
                       "9": {"level": 9, "summary": "s", "explanation": "e"}}"#;
        let levels: Levels = serde_json::from_str(json).unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels.unexpected(), vec![9]);
    }

    #[test]
    fn test_levels_keep_malformed_keys() {
        let yaml = "'1': {level: 1, summary: s, explanation: e}\none: {level: 2, summary: s, explanation: e}\n-3: {level: 3, summary: s, explanation: e}\n";
        let levels: Levels = serde_yaml::from_str(yaml).unwrap();

        assert!(levels.get(LevelNumber::MIN).is_some());
        assert_eq!(levels.malformed_keys(), vec!["-3", "one"]);
        assert_eq!(levels.len(), 3);

        let json = r#"{"one": {"level": 1, "summary": "s", "explanation": "e"}}"#;
        let levels: Levels = serde_json::from_str(json).unwrap();
        assert_eq!(levels.malformed_keys(), vec!["one"]);
        assert_eq!(levels.missing().len(), 5);
    }

    #[test]
    fn test_clinical_notes_accepts_string_or_list() {
        let single: LevelContent =
            serde_json::from_str(r#"{"level": 3, "clinicalNotes": "watch vitals"}"#).unwrap();
        let many: LevelContent =
            serde_json::from_str(r#"{"level": 3, "clinicalNotes": ["a", "b"]}"#).unwrap();
        let blank: LevelContent =
            serde_json::from_str(r#"{"level": 3, "clinicalNotes": "   "}"#).unwrap();

        assert!(single.has_clinical_notes());
        assert!(many.has_clinical_notes());
        assert!(!blank.has_clinical_notes());
    }
}
