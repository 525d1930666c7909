//! Intention intake: card-count parsing, length validation, and
//! allow-list sanitization of the free-text intention.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum intention length, in characters (not bytes).
pub const MAX_INTENTION_CHARS: usize = 400;

/// Inline formatting tags preserved by intention sanitization. Everything
/// else (tags and all attributes) is stripped.
pub const ALLOWED_INTENTION_TAGS: [&str; 6] = ["b", "i", "em", "strong", "u", "br"];

/// How many cards the user asked to draw.
///
/// Serialized as the form's string values (`"1"` / `"3"` / `"5"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CardCount {
    One,
    Three,
    Five,
}

impl CardCount {
    /// Parse the form value. Anything outside {1,3,5} is a validation error.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.trim() {
            "1" => Ok(CardCount::One),
            "3" => Ok(CardCount::Three),
            "5" => Ok(CardCount::Five),
            other => Err(CoreError::Validation(format!(
                "Invalid card count '{other}': must be 1, 3 or 5"
            ))),
        }
    }

    pub fn as_usize(&self) -> usize {
        match self {
            CardCount::One => 1,
            CardCount::Three => 3,
            CardCount::Five => 5,
        }
    }

    /// Wire/form representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CardCount::One => "1",
            CardCount::Three => "3",
            CardCount::Five => "5",
        }
    }
}

impl TryFrom<String> for CardCount {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CardCount::parse(&value)
    }
}

impl From<CardCount> for String {
    fn from(count: CardCount) -> Self {
        count.as_str().to_string()
    }
}

impl std::fmt::Display for CardCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The intent half of a session binding: what the user submitted on the
/// intake form, sanitized and ready to pair with a card draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredIntent {
    pub intention: String,
    pub card_count: CardCount,
}

/// Validate the raw intention text length.
pub fn validate_intention(intention: &str) -> Result<(), CoreError> {
    let chars = intention.chars().count();
    if chars > MAX_INTENTION_CHARS {
        return Err(CoreError::Validation(format!(
            "Intention too long: {chars} characters (max {MAX_INTENTION_CHARS})"
        )));
    }
    Ok(())
}

/// Strip the intention down to the allow-listed inline tags.
///
/// Idempotent: sanitizing already-sanitized text is a no-op.
pub fn sanitize_intention(intention: &str) -> String {
    let mut builder = ammonia::Builder::default();
    builder.tags(HashSet::from(ALLOWED_INTENTION_TAGS));
    builder.generic_attributes(HashSet::new());
    builder.clean(intention).to_string()
}
