//! Search constraints accepted from a caller

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters a Solana address can contain (Bitcoin base-58 alphabet)
pub const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Longest base-58 rendering of a 32-byte public key
pub const MAX_ADDRESS_LEN: usize = 44;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("Either a prefix or a suffix is required")]
    NoPattern,
    #[error("Count must be a positive integer")]
    InvalidCount,
    #[error("Thread count must be a positive integer")]
    InvalidThreadCount,
    #[error("Word count must be one of 12, 15, 18, 21 or 24 (got {0})")]
    InvalidWordCount(String),
    #[error("Unknown mnemonic language '{0}'")]
    UnknownLanguage(String),
    #[error("Field '{field}' is not a valid number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("Pattern contains invalid character '{0}' (must be base-58)")]
    InvalidCharacter(char),
    #[error("Pattern too long (max {0} characters)")]
    PatternTooLong(usize),
}

/// Number of words in a generated seed phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum WordCount {
    Twelve,
    Fifteen,
    Eighteen,
    TwentyOne,
    TwentyFour,
}

impl WordCount {
    pub fn words(self) -> u32 {
        match self {
            WordCount::Twelve => 12,
            WordCount::Fifteen => 15,
            WordCount::Eighteen => 18,
            WordCount::TwentyOne => 21,
            WordCount::TwentyFour => 24,
        }
    }
}

impl TryFrom<u32> for WordCount {
    type Error = ConstraintError;

    fn try_from(words: u32) -> Result<Self, Self::Error> {
        match words {
            12 => Ok(WordCount::Twelve),
            15 => Ok(WordCount::Fifteen),
            18 => Ok(WordCount::Eighteen),
            21 => Ok(WordCount::TwentyOne),
            24 => Ok(WordCount::TwentyFour),
            other => Err(ConstraintError::InvalidWordCount(other.to_string())),
        }
    }
}

impl From<WordCount> for u32 {
    fn from(count: WordCount) -> Self {
        count.words()
    }
}

impl FromStr for WordCount {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: u32 = s
            .trim()
            .parse()
            .map_err(|_| ConstraintError::InvalidWordCount(s.to_string()))?;
        WordCount::try_from(words)
    }
}

impl fmt::Display for WordCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.words())
    }
}

/// Seed phrase languages understood by `solana-keygen`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MnemonicLanguage {
    English,
    ChineseSimplified,
    ChineseTraditional,
    Japanese,
    Spanish,
    Korean,
    French,
    Italian,
}

impl MnemonicLanguage {
    pub const ALL: [MnemonicLanguage; 8] = [
        MnemonicLanguage::English,
        MnemonicLanguage::ChineseSimplified,
        MnemonicLanguage::ChineseTraditional,
        MnemonicLanguage::Japanese,
        MnemonicLanguage::Spanish,
        MnemonicLanguage::Korean,
        MnemonicLanguage::French,
        MnemonicLanguage::Italian,
    ];

    /// Value passed to `--language`
    pub fn as_str(self) -> &'static str {
        match self {
            MnemonicLanguage::English => "english",
            MnemonicLanguage::ChineseSimplified => "chinese-simplified",
            MnemonicLanguage::ChineseTraditional => "chinese-traditional",
            MnemonicLanguage::Japanese => "japanese",
            MnemonicLanguage::Spanish => "spanish",
            MnemonicLanguage::Korean => "korean",
            MnemonicLanguage::French => "french",
            MnemonicLanguage::Italian => "italian",
        }
    }
}

impl FromStr for MnemonicLanguage {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        MnemonicLanguage::ALL
            .into_iter()
            .find(|lang| lang.as_str() == wanted)
            .ok_or_else(|| ConstraintError::UnknownLanguage(s.to_string()))
    }
}

impl fmt::Display for MnemonicLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which end(s) of the address must match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrindPattern<'a> {
    StartsWith(&'a str),
    EndsWith(&'a str),
    StartsAndEndsWith { prefix: &'a str, suffix: &'a str },
}

/// What the caller wants the grinder to find
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConstraints {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    /// Number of matching keypairs to find
    pub count: u32,
    pub ignore_case: bool,
    pub use_mnemonic: bool,
    pub word_count: Option<WordCount>,
    pub language: Option<MnemonicLanguage>,
    pub threads: Option<u32>,
}

impl Default for SearchConstraints {
    fn default() -> Self {
        Self {
            prefix: None,
            suffix: None,
            count: 1,
            ignore_case: false,
            use_mnemonic: false,
            word_count: None,
            language: None,
            threads: None,
        }
    }
}

impl SearchConstraints {
    /// Search for addresses starting with `value`
    pub fn prefix(value: impl Into<String>) -> Self {
        Self {
            prefix: Some(value.into()),
            ..Default::default()
        }
    }

    /// Search for addresses ending with `value`
    pub fn suffix(value: impl Into<String>) -> Self {
        Self {
            suffix: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn with_suffix(mut self, value: impl Into<String>) -> Self {
        self.suffix = Some(value.into());
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    pub fn with_mnemonic(mut self, word_count: Option<WordCount>, language: Option<MnemonicLanguage>) -> Self {
        self.use_mnemonic = true;
        self.word_count = word_count;
        self.language = language;
        self
    }

    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = Some(threads);
        self
    }

    /// The match the grinder is asked for. Empty strings count as absent.
    pub fn pattern(&self) -> Option<GrindPattern<'_>> {
        let prefix = self.prefix.as_deref().filter(|p| !p.is_empty());
        let suffix = self.suffix.as_deref().filter(|s| !s.is_empty());

        match (prefix, suffix) {
            (Some(prefix), Some(suffix)) => Some(GrindPattern::StartsAndEndsWith { prefix, suffix }),
            (Some(prefix), None) => Some(GrindPattern::StartsWith(prefix)),
            (None, Some(suffix)) => Some(GrindPattern::EndsWith(suffix)),
            (None, None) => None,
        }
    }

    /// Check everything the grinder would otherwise reject or misparse
    pub fn validate(&self) -> Result<(), ConstraintError> {
        let pattern = self.pattern().ok_or(ConstraintError::NoPattern)?;

        if self.count == 0 {
            return Err(ConstraintError::InvalidCount);
        }
        if self.threads == Some(0) {
            return Err(ConstraintError::InvalidThreadCount);
        }

        let (prefix, suffix) = match pattern {
            GrindPattern::StartsWith(p) => (p, ""),
            GrindPattern::EndsWith(s) => ("", s),
            GrindPattern::StartsAndEndsWith { prefix, suffix } => (prefix, suffix),
        };

        if prefix.len() + suffix.len() > MAX_ADDRESS_LEN {
            return Err(ConstraintError::PatternTooLong(MAX_ADDRESS_LEN));
        }

        for c in prefix.chars().chain(suffix.chars()) {
            if !BASE58_ALPHABET.contains(c) {
                return Err(ConstraintError::InvalidCharacter(c));
            }
        }

        Ok(())
    }
}
