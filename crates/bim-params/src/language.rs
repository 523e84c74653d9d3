//! Host UI languages used for built-in parameter labels

use serde::{Deserialize, Serialize};

/// Language of a built-in parameter label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageType {
    /// English (United States)
    EnglishUsa,
    /// English (United Kingdom)
    EnglishGb,
    /// German
    German,
    /// French
    French,
    /// Spanish
    Spanish,
    /// Italian
    Italian,
    /// Russian
    Russian,
    /// Polish
    Polish,
    /// Czech
    Czech,
    /// Simplified Chinese
    ChineseSimplified,
    /// Japanese
    Japanese,
}

impl LanguageType {
    /// Label language used when none is requested
    pub const DEFAULT: Self = Self::EnglishUsa;
}

impl Default for LanguageType {
    fn default() -> Self {
        Self::DEFAULT
    }
}
