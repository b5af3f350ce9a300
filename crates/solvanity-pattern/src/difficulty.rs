//! Difficulty estimation for grind patterns

use crate::constraints::{GrindPattern, SearchConstraints, BASE58_ALPHABET};

/// Expected number of keypairs the grinder must try for one match
pub fn calculate_difficulty(pattern: &GrindPattern<'_>, case_insensitive: bool) -> f64 {
    let alphabet_size = BASE58_ALPHABET.len() as f64;

    let fixed: String = match pattern {
        GrindPattern::StartsWith(p) => p.to_string(),
        GrindPattern::EndsWith(s) => s.to_string(),
        GrindPattern::StartsAndEndsWith { prefix, suffix } => format!("{}{}", prefix, suffix),
    };

    let base_difficulty = alphabet_size.powi(fixed.chars().count() as i32);

    if case_insensitive {
        // Each letter that exists in both cases doubles the hit rate
        let foldable = fixed
            .chars()
            .filter(|c| {
                c.is_ascii_alphabetic()
                    && BASE58_ALPHABET.contains(c.to_ascii_uppercase())
                    && BASE58_ALPHABET.contains(c.to_ascii_lowercase())
            })
            .count();
        base_difficulty / 2.0_f64.powi(foldable as i32)
    } else {
        base_difficulty
    }
}

impl SearchConstraints {
    /// Expected attempts for a single match, or `None` without a pattern
    pub fn difficulty(&self) -> Option<f64> {
        self.pattern()
            .map(|pattern| calculate_difficulty(&pattern, self.ignore_case))
    }
}

/// Format difficulty as human-readable string
pub fn format_difficulty(difficulty: f64) -> String {
    if difficulty >= 1e15 {
        format!("{:.2}P", difficulty / 1e15)
    } else if difficulty >= 1e12 {
        format!("{:.2}T", difficulty / 1e12)
    } else if difficulty >= 1e9 {
        format!("{:.2}G", difficulty / 1e9)
    } else if difficulty >= 1e6 {
        format!("{:.2}M", difficulty / 1e6)
    } else if difficulty >= 1e3 {
        format!("{:.2}K", difficulty / 1e3)
    } else {
        format!("{:.0}", difficulty)
    }
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{:.0}ms", seconds * 1000.0)
    } else if seconds < 60.0 {
        format!("{:.1}s", seconds)
    } else if seconds < 3600.0 {
        format!("{:.1}m", seconds / 60.0)
    } else if seconds < 86400.0 {
        format!("{:.1}h", seconds / 3600.0)
    } else {
        format!("{:.1}d", seconds / 86400.0)
    }
}
