//! Message content validation.
//!
//! Checks run in a fixed order and the first failure wins. Length and
//! denylist checks apply to the trimmed content, counted in characters.

use regex::Regex;

use edgechat_types::config::{DEFAULT_MAX_MESSAGE_LENGTH, LimitsConfig};
use edgechat_types::error::ValidationError;

/// Maximum session title length in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// A denylist pattern failed to compile.
#[derive(Debug, thiserror::Error)]
pub enum ValidatorConfigError {
    #[error("invalid denylist pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Validates user-supplied message content and session titles.
#[derive(Debug, Clone)]
pub struct MessageValidator {
    max_length: usize,
    denylist: Vec<Regex>,
}

impl MessageValidator {
    /// Build a validator. A `max_length` of zero falls back to 2000.
    pub fn new(max_length: usize, denylist: &[String]) -> Result<Self, ValidatorConfigError> {
        let denylist = denylist
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ValidatorConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            max_length: if max_length == 0 {
                DEFAULT_MAX_MESSAGE_LENGTH
            } else {
                max_length
            },
            denylist,
        })
    }

    pub fn from_limits(limits: &LimitsConfig) -> Result<Self, ValidatorConfigError> {
        Self::new(limits.max_message_length, &limits.denylist)
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Validate message content.
    pub fn validate(&self, content: Option<&str>) -> Result<(), ValidationError> {
        let content = match content {
            Some(c) if !c.is_empty() => c,
            _ => return Err(ValidationError::Missing),
        };

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }

        if trimmed.chars().count() > self.max_length {
            return Err(ValidationError::TooLong {
                max: self.max_length,
            });
        }

        if self.denylist.iter().any(|re| re.is_match(trimmed)) {
            return Err(ValidationError::Forbidden);
        }

        Ok(())
    }

    /// Validate an explicit session title.
    pub fn validate_title(&self, title: &str) -> Result<(), ValidationError> {
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(ValidationError::TitleTooLong {
                max: MAX_TITLE_CHARS,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(max: usize) -> MessageValidator {
        MessageValidator::new(max, &LimitsConfig::default().denylist).unwrap()
    }

    #[test]
    fn test_missing_and_empty_content() {
        let v = validator(2000);
        assert_eq!(v.validate(None), Err(ValidationError::Missing));
        assert_eq!(v.validate(Some("")), Err(ValidationError::Missing));
        assert_eq!(v.validate(Some("   \n\t")), Err(ValidationError::Empty));
    }

    #[test]
    fn test_length_boundary() {
        let v = validator(10);
        assert!(v.validate(Some(&"a".repeat(10))).is_ok());
        assert_eq!(
            v.validate(Some(&"a".repeat(11))),
            Err(ValidationError::TooLong { max: 10 })
        );
    }

    #[test]
    fn test_length_is_measured_after_trim() {
        let v = validator(5);
        assert!(v.validate(Some("   hello   ")).is_ok());
    }

    #[test]
    fn test_length_counts_characters() {
        let v = validator(4);
        assert!(v.validate(Some("你好世界")).is_ok());
        assert!(v.validate(Some("你好世界!")).is_err());
    }

    #[test]
    fn test_zero_max_length_falls_back() {
        let v = validator(0);
        assert_eq!(v.max_length(), 2000);
    }

    #[test]
    fn test_denylist_is_case_insensitive_and_word_bounded() {
        let v = validator(2000);
        assert_eq!(v.validate(Some("How do I HACK this?")), Err(ValidationError::Forbidden));
        assert_eq!(v.validate(Some("what is my private key")), Err(ValidationError::Forbidden));
        assert!(v.validate(Some("I love hackathons")).is_ok());
        assert!(v.validate(Some("secretary duties")).is_ok());
    }

    #[test]
    fn test_length_checked_before_denylist() {
        let v = validator(5);
        assert_eq!(
            v.validate(Some("virus virus")),
            Err(ValidationError::TooLong { max: 5 })
        );
    }

    #[test]
    fn test_empty_denylist_allows_everything() {
        let v = MessageValidator::new(100, &[]).unwrap();
        assert!(v.validate(Some("password")).is_ok());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = MessageValidator::new(100, &["(unclosed".to_string()]).unwrap_err();
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn test_title_limit() {
        let v = validator(2000);
        assert!(v.validate_title(&"t".repeat(100)).is_ok());
        assert_eq!(
            v.validate_title(&"t".repeat(101)),
            Err(ValidationError::TitleTooLong { max: 100 })
        );
    }
}
