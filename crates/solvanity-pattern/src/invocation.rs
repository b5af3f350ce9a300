//! Translation of search constraints into `solana-keygen grind` arguments

use std::fmt;

use serde::Serialize;

use crate::constraints::{ConstraintError, GrindPattern, SearchConstraints};

/// Subcommand every invocation starts with
pub const GRIND_SUBCOMMAND: &str = "grind";

/// Argument list for one grind run, in the order the tool receives it.
///
/// The program itself is not part of the invocation; it comes from
/// configuration so tests can substitute a fake grinder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    args: Vec<String>,
}

impl Invocation {
    /// Build the argument list, rejecting constraints the tool would choke on.
    pub fn build(constraints: &SearchConstraints) -> Result<Self, ConstraintError> {
        constraints.validate()?;

        let mut args = vec![GRIND_SUBCOMMAND.to_string()];
        let count = constraints.count;

        match constraints.pattern() {
            Some(GrindPattern::StartsAndEndsWith { prefix, suffix }) => {
                args.push("--starts-and-ends-with".to_string());
                args.push(format!("{}:{}:{}", prefix, suffix, count));
            }
            Some(GrindPattern::StartsWith(prefix)) => {
                args.push("--starts-with".to_string());
                args.push(format!("{}:{}", prefix, count));
            }
            Some(GrindPattern::EndsWith(suffix)) => {
                args.push("--ends-with".to_string());
                args.push(format!("{}:{}", suffix, count));
            }
            // validate() already refused this
            None => return Err(ConstraintError::NoPattern),
        }

        if constraints.ignore_case {
            args.push("--ignore-case".to_string());
        }

        if constraints.use_mnemonic {
            args.push("--use-mnemonic".to_string());
            args.push("--no-outfile".to_string());
            if let Some(words) = constraints.word_count {
                args.push("--word-count".to_string());
                args.push(words.to_string());
            }
            if let Some(language) = constraints.language {
                args.push("--language".to_string());
                args.push(language.to_string());
            }
        }

        if let Some(threads) = constraints.threads {
            args.push("--num-threads".to_string());
            args.push(threads.to_string());
        }

        Ok(Self { args })
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn into_args(self) -> Vec<String> {
        self.args
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.args.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{MnemonicLanguage, WordCount};

    fn args_of(constraints: &SearchConstraints) -> Vec<String> {
        Invocation::build(constraints).unwrap().into_args()
    }

    #[test]
    fn test_prefix_only() {
        let args = args_of(&SearchConstraints::prefix("So1").with_count(2));
        assert_eq!(args, vec!["grind", "--starts-with", "So1:2"]);
        assert!(!args.iter().any(|a| a == "--ends-with"));
    }

    #[test]
    fn test_suffix_only() {
        let args = args_of(&SearchConstraints::suffix("dog"));
        assert_eq!(args, vec!["grind", "--ends-with", "dog:1"]);
        assert!(!args.iter().any(|a| a == "--starts-with"));
    }

    #[test]
    fn test_prefix_and_suffix_combined_once() {
        let args = args_of(&SearchConstraints::prefix("ab").with_suffix("yz").with_count(3));
        assert_eq!(args, vec!["grind", "--starts-and-ends-with", "ab:yz:3"]);

        let count_mentions = args.iter().filter(|a| a.contains('3')).count();
        assert_eq!(count_mentions, 1);
        assert!(!args.iter().any(|a| a == "--starts-with" || a == "--ends-with"));
    }

    #[test]
    fn test_flags_in_order() {
        let constraints = SearchConstraints::prefix("cat")
            .case_insensitive()
            .with_mnemonic(Some(WordCount::TwentyFour), Some(MnemonicLanguage::Japanese))
            .with_threads(8);

        assert_eq!(
            args_of(&constraints),
            vec![
                "grind",
                "--starts-with",
                "cat:1",
                "--ignore-case",
                "--use-mnemonic",
                "--no-outfile",
                "--word-count",
                "24",
                "--language",
                "japanese",
                "--num-threads",
                "8",
            ]
        );
    }

    #[test]
    fn test_mnemonic_options_ignored_without_mnemonic() {
        let mut constraints = SearchConstraints::prefix("cat");
        constraints.word_count = Some(WordCount::Twelve);
        constraints.language = Some(MnemonicLanguage::French);

        assert_eq!(args_of(&constraints), vec!["grind", "--starts-with", "cat:1"]);
    }

    #[test]
    fn test_mnemonic_without_optional_fields() {
        let constraints = SearchConstraints::suffix("z").with_mnemonic(None, None);
        assert_eq!(
            args_of(&constraints),
            vec!["grind", "--ends-with", "z:1", "--use-mnemonic", "--no-outfile"]
        );
    }

    #[test]
    fn test_rejects_bad_constraints() {
        assert_eq!(
            Invocation::build(&SearchConstraints::prefix("a").with_count(0)),
            Err(ConstraintError::InvalidCount)
        );
        assert_eq!(
            Invocation::build(&SearchConstraints::default()),
            Err(ConstraintError::NoPattern)
        );
        assert_eq!(
            Invocation::build(&SearchConstraints::suffix("a").with_threads(0)),
            Err(ConstraintError::InvalidThreadCount)
        );
    }

    #[test]
    fn test_display_joins_args() {
        let invocation = Invocation::build(&SearchConstraints::prefix("ab").case_insensitive()).unwrap();
        assert_eq!(invocation.to_string(), "grind --starts-with ab:1 --ignore-case");
    }
}
