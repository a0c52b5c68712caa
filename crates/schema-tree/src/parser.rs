//! Schema document loading

use crate::error::ParseResult;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Loads raw schema documents from JSON or YAML text
pub struct SchemaParser;

impl SchemaParser {
    /// Parse a schema document from a string (auto-detects JSON/YAML)
    pub fn parse(content: &str) -> ParseResult<Value> {
        let content = Self::sanitize_large_numbers(content);
        if content.trim_start().starts_with('{') {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    /// Parse a schema document from JSON
    pub fn parse_json(content: &str) -> ParseResult<Value> {
        let content = Self::sanitize_large_numbers(content);
        Ok(serde_json::from_str(&content)?)
    }

    /// Parse a schema document from YAML
    pub fn parse_yaml(content: &str) -> ParseResult<Value> {
        let content = Self::sanitize_large_numbers(content);
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Sanitize large numbers that may cause parsing issues.
    /// Real-world schemas use very large integers for min/max constraints
    /// which can fail 64-bit parsing ("JSON number out of range"); the exact
    /// value doesn't matter for display, so clamp anything over 15 digits.
    fn sanitize_large_numbers(content: &str) -> String {
        let re_large = Regex::new(
            r#"(?m)("?(?:minimum|maximum|exclusiveMinimum|exclusiveMaximum)"?\s*:\s*)(-?\d{16,})"#,
        )
        .unwrap();
        let sanitized = re_large.replace_all(content, |caps: &regex::Captures| {
            let prefix = &caps[1];
            let num_str = &caps[2];
            if num_str.starts_with('-') {
                format!("{}-2147483648", prefix)
            } else {
                format!("{}2147483647", prefix)
            }
        });

        if let std::borrow::Cow::Owned(_) = sanitized {
            debug!("clamped out-of-range numeric constraints");
        }
        sanitized.into_owned()
    }
}
