//! Core value types shared across the dialogue model
//!
//! These are the field types Odyssey-engine conversation files carry:
//! resource references into the game's resource system, talk-table indexed
//! localized text, and script calls with their parameter blocks.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum byte length of a resource reference.
pub const MAX_RESREF_LEN: usize = 16;

/// A game resource reference.
///
/// Resource names are ASCII, at most 16 bytes, and case-insensitive; they are
/// stored lowercase. An empty `ResRef` means "no resource".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResRef(String);

impl ResRef {
    /// Create a resource reference, validating length and character set.
    ///
    /// # Errors
    /// Returns an error if the name is longer than 16 bytes or not ASCII.
    pub fn new(name: &str) -> Result<Self> {
        if !name.is_ascii() {
            return Err(Error::ResRefNotAscii {
                value: name.to_string(),
            });
        }
        if name.len() > MAX_RESREF_LEN {
            return Err(Error::ResRefTooLong {
                value: name.to_string(),
            });
        }
        Ok(Self(name.to_ascii_lowercase()))
    }

    /// Create a resource reference from arbitrary input, dropping non-ASCII
    /// characters and truncating to 16 bytes.
    #[must_use]
    pub fn lossy(name: &str) -> Self {
        let cleaned: String = name
            .chars()
            .filter(char::is_ascii)
            .take(MAX_RESREF_LEN)
            .collect();
        Self(cleaned.to_ascii_lowercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this names no resource at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ResRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Language of a localized substring.
///
/// Matches the game's talk-table language identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    French,
    German,
    Italian,
    Spanish,
    Polish,
}

impl Language {
    /// The numeric language identifier used on disk.
    #[must_use]
    pub fn id(self) -> u32 {
        match self {
            Language::English => 0,
            Language::French => 1,
            Language::German => 2,
            Language::Italian => 3,
            Language::Spanish => 4,
            Language::Polish => 5,
        }
    }

    /// Look up a language by its numeric identifier.
    #[must_use]
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(Language::English),
            1 => Some(Language::French),
            2 => Some(Language::German),
            3 => Some(Language::Italian),
            4 => Some(Language::Spanish),
            5 => Some(Language::Polish),
            _ => None,
        }
    }
}

/// Speaker gender of a localized substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    /// The numeric gender identifier used on disk.
    #[must_use]
    pub fn id(self) -> u32 {
        match self {
            Gender::Male => 0,
            Gender::Female => 1,
        }
    }
}

/// Compute the flat substring identifier for a (language, gender) pair.
#[must_use]
pub fn substring_id(language: Language, gender: Gender) -> u32 {
    language.id() * 2 + gender.id()
}

/// Localized, possibly stringref-indexed text.
///
/// Either field may be absent: a line can point at a talk-table entry, carry
/// inline per-language text, or both (the inline text overrides the table for
/// display in the editor).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    /// Index into the game's talk table, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stringref: Option<u32>,
    /// Inline substrings keyed by flat substring id, in insertion order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub substrings: IndexMap<u32, String>,
}

impl LocalizedText {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a text with a single English (male) substring.
    #[must_use]
    pub fn from_english(text: &str) -> Self {
        let mut loc = Self::default();
        loc.set(Language::English, Gender::Male, text);
        loc
    }

    /// Set the substring for a (language, gender) pair.
    pub fn set(&mut self, language: Language, gender: Gender, text: &str) {
        self.substrings
            .insert(substring_id(language, gender), text.to_string());
    }

    /// Get the substring for a (language, gender) pair.
    #[must_use]
    pub fn get(&self, language: Language, gender: Gender) -> Option<&str> {
        self.substrings
            .get(&substring_id(language, gender))
            .map(String::as_str)
    }

    /// Remove the substring for a (language, gender) pair.
    pub fn remove(&mut self, language: Language, gender: Gender) -> Option<String> {
        self.substrings
            .shift_remove(&substring_id(language, gender))
    }

    /// The first stored substring, used as the display fallback when no
    /// talk table is loaded.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.substrings.values().next().map(String::as_str)
    }

    /// Whether neither a stringref nor any substring is present.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.stringref.is_none() && self.substrings.is_empty()
    }

    /// Count words across all stored substrings.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.substrings
            .values()
            .map(|s| s.split_whitespace().count())
            .sum()
    }
}

impl fmt::Display for LocalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.first() {
            f.write_str(text)
        } else if let Some(stringref) = self.stringref {
            write!(f, "[stringref {stringref}]")
        } else {
            Ok(())
        }
    }
}

/// A script attached to a node or link, with its parameter block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptCall {
    /// The script resource to run; empty means no script.
    #[serde(default, skip_serializing_if = "ResRef::is_empty")]
    pub script: ResRef,
    /// The five integer parameters passed to the script.
    #[serde(default)]
    pub params: [i32; 5],
    /// The string parameter passed to the script.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub param_str: String,
}

impl ScriptCall {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a script resource is actually assigned.
    #[must_use]
    pub fn is_set(&self) -> bool {
        !self.script.is_empty()
    }
}

/// A conditional script slot on a link.
///
/// The link fires only if the script returns true (inverted when `negated`
/// is set). Links carry two of these, combined by the link's logic flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionCall {
    /// The conditional script and its parameters.
    #[serde(flatten)]
    pub call: ScriptCall,
    /// Invert the script's result.
    #[serde(default)]
    pub negated: bool,
}

impl ConditionCall {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a conditional script is actually assigned.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.call.is_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resref_lowercases() {
        let r = ResRef::new("NM35AAKREENA").unwrap();
        assert_eq!(r.as_str(), "nm35aakreena");
    }

    #[test]
    fn test_resref_rejects_long_names() {
        assert!(ResRef::new("a_name_well_past_sixteen").is_err());
        assert!(ResRef::new("exactly_16_chars").is_ok());
    }

    #[test]
    fn test_resref_lossy_truncates() {
        let r = ResRef::lossy("A_Name_Well_Past_Sixteen");
        assert_eq!(r.as_str(), "a_name_well_past");
    }

    #[test]
    fn test_substring_ids() {
        assert_eq!(substring_id(Language::English, Gender::Male), 0);
        assert_eq!(substring_id(Language::English, Gender::Female), 1);
        assert_eq!(substring_id(Language::Polish, Gender::Female), 11);
    }

    #[test]
    fn test_localized_text_roundtrip() {
        let mut text = LocalizedText::new();
        text.set(Language::German, Gender::Female, "Hallo");
        assert_eq!(text.get(Language::German, Gender::Female), Some("Hallo"));
        assert_eq!(text.get(Language::German, Gender::Male), None);
        assert_eq!(text.first(), Some("Hallo"));
    }

    #[test]
    fn test_word_count() {
        let mut text = LocalizedText::from_english("You must be lost, little one.");
        assert_eq!(text.word_count(), 6);
        text.set(Language::French, Gender::Male, "Tu dois être perdue.");
        assert_eq!(text.word_count(), 10);
    }
}
