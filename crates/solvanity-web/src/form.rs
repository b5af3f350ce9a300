//! Form fields posted by the vanity address page

use serde::Deserialize;
use solvanity_core::{ConstraintError, MnemonicLanguage, SearchConstraints, WordCount};

/// Raw form body. Every field is optional text; empty strings count as absent.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrindForm {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub count: Option<String>,
    pub ignore_case: Option<String>,
    pub use_mnemonic: Option<String>,
    pub word_count: Option<String>,
    pub language: Option<String>,
    pub num_threads: Option<String>,
}

impl GrindForm {
    pub fn into_constraints(self) -> Result<SearchConstraints, ConstraintError> {
        let count = match present(&self.count) {
            Some(value) => parse_positive("count", value, ConstraintError::InvalidCount)?,
            None => 1,
        };
        let threads = present(&self.num_threads)
            .map(|value| parse_positive("numThreads", value, ConstraintError::InvalidThreadCount))
            .transpose()?;
        let word_count = present(&self.word_count)
            .map(str::parse::<WordCount>)
            .transpose()?;
        let language = present(&self.language)
            .map(str::parse::<MnemonicLanguage>)
            .transpose()?;

        Ok(SearchConstraints {
            prefix: present(&self.prefix).map(str::to_string),
            suffix: present(&self.suffix).map(str::to_string),
            count,
            ignore_case: checked(&self.ignore_case),
            use_mnemonic: checked(&self.use_mnemonic),
            word_count,
            language,
            threads,
        })
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

/// HTML checkboxes send "on" when ticked and nothing otherwise
fn checked(field: &Option<String>) -> bool {
    matches!(present(field), Some("on") | Some("true"))
}

fn parse_positive(
    field: &'static str,
    value: &str,
    non_positive: ConstraintError,
) -> Result<u32, ConstraintError> {
    let invalid = || ConstraintError::InvalidNumber {
        field,
        value: value.to_string(),
    };
    let parsed: i64 = value.parse().map_err(|_| invalid())?;
    if parsed <= 0 {
        return Err(non_positive);
    }
    u32::try_from(parsed).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> GrindForm {
        let mut form = GrindForm::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "prefix" => form.prefix = value,
                "suffix" => form.suffix = value,
                "count" => form.count = value,
                "ignoreCase" => form.ignore_case = value,
                "useMnemonic" => form.use_mnemonic = value,
                "wordCount" => form.word_count = value,
                "language" => form.language = value,
                "numThreads" => form.num_threads = value,
                other => panic!("unknown field {}", other),
            }
        }
        form
    }

    #[test]
    fn test_full_form() {
        let constraints = form(&[
            ("prefix", "ab"),
            ("suffix", "yz"),
            ("count", "2"),
            ("ignoreCase", "on"),
            ("useMnemonic", "on"),
            ("wordCount", "24"),
            ("language", "korean"),
            ("numThreads", "10"),
        ])
        .into_constraints()
        .unwrap();

        assert_eq!(
            constraints,
            SearchConstraints::prefix("ab")
                .with_suffix("yz")
                .with_count(2)
                .case_insensitive()
                .with_mnemonic(Some(WordCount::TwentyFour), Some(MnemonicLanguage::Korean))
                .with_threads(10)
        );
    }

    #[test]
    fn test_defaults_and_empty_fields() {
        let constraints = form(&[("prefix", "ab"), ("suffix", ""), ("count", ""), ("numThreads", " ")])
            .into_constraints()
            .unwrap();

        assert_eq!(constraints, SearchConstraints::prefix("ab"));
    }

    #[test]
    fn test_checkbox_values() {
        let constraints = form(&[("suffix", "z"), ("ignoreCase", "off")])
            .into_constraints()
            .unwrap();
        assert!(!constraints.ignore_case);
        assert!(!constraints.use_mnemonic);
    }

    #[test]
    fn test_rejects_non_positive_numbers() {
        assert_eq!(
            form(&[("prefix", "a"), ("count", "0")]).into_constraints(),
            Err(ConstraintError::InvalidCount)
        );
        assert_eq!(
            form(&[("prefix", "a"), ("count", "-3")]).into_constraints(),
            Err(ConstraintError::InvalidCount)
        );
        assert_eq!(
            form(&[("prefix", "a"), ("numThreads", "0")]).into_constraints(),
            Err(ConstraintError::InvalidThreadCount)
        );
        assert!(matches!(
            form(&[("prefix", "a"), ("count", "many")]).into_constraints(),
            Err(ConstraintError::InvalidNumber { field: "count", .. })
        ));
    }

    #[test]
    fn test_rejects_bad_mnemonic_options() {
        assert!(matches!(
            form(&[("prefix", "a"), ("wordCount", "13")]).into_constraints(),
            Err(ConstraintError::InvalidWordCount(_))
        ));
        assert!(matches!(
            form(&[("prefix", "a"), ("language", "latin")]).into_constraints(),
            Err(ConstraintError::UnknownLanguage(_))
        ));
    }
}
