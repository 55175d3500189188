// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Completion configuration
//!
//! Options that shape candidate text and ranking:
//! - Search path filtering and alias generation for FROM items
//! - Column qualification and `*` expansion order
//! - Columns skipped when expanding `*` inside `INSERT INTO t (...)`
//! - Keyword casing
//! - Function argument list templates
//!
//! ## Example
//!
//! ```rust
//! use sqlcomplete_engine::{CompletionConfig, QualifyColumns};
//!
//! let config = CompletionConfig::from_json(r#"{"qualify_columns": "always"}"#).unwrap();
//! assert_eq!(config.qualify_columns, QualifyColumns::Always);
//! assert!(!config.generate_aliases);
//! ```

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlcomplete_catalog::{ArgListTemplates, StoreOptions};

/// When column candidates get a `ref.` prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualifyColumns {
    Always,
    Never,
    /// Only when more than one table is in scope
    IfMoreThanOneTable,
}

/// Column order used when expanding `*`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AsteriskColumnOrder {
    TableOrder,
    Alphabetic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCasing {
    Upper,
    Lower,
    /// Follow the case of the last typed character
    Auto,
}

/// Completion engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Offer unqualified objects from search path schemas only
    pub search_path_filter: bool,

    /// Append a generated alias to FROM clause items
    pub generate_aliases: bool,

    pub qualify_columns: QualifyColumns,

    pub asterisk_column_order: AsteriskColumnOrder,

    /// Regexes matched against column defaults; matching columns are left
    /// out of `*` expansion in an insert column list
    pub insert_col_skip_patterns: Vec<String>,

    pub keyword_casing: KeywordCasing,

    /// Per-argument template for the inserted call text
    pub call_arg_style: String,

    /// Per-argument template for the displayed call text
    pub call_arg_display_style: String,

    /// Per-argument template for signatures (`CREATE FUNCTION` and friends)
    pub signature_arg_style: String,

    /// Call lists with more arguments than this span several lines
    pub call_arg_oneliner_max: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        let templates = ArgListTemplates::default();
        Self {
            search_path_filter: false,
            generate_aliases: false,
            qualify_columns: QualifyColumns::IfMoreThanOneTable,
            asterisk_column_order: AsteriskColumnOrder::TableOrder,
            insert_col_skip_patterns: vec![r"^now\(\)$".to_string(), r"^nextval\(".to_string()],
            keyword_casing: KeywordCasing::Upper,
            call_arg_style: templates.call,
            call_arg_display_style: templates.call_display,
            signature_arg_style: templates.signature,
            call_arg_oneliner_max: templates.oneliner_max,
        }
    }
}

impl CompletionConfig {
    /// Parse a configuration from JSON; missing keys take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse { reason: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error when a skip pattern is not a valid regex.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.skip_patterns().map(|_| ())
    }

    /// Compile `insert_col_skip_patterns`
    pub fn skip_patterns(&self) -> Result<Vec<Regex>, ConfigError> {
        self.insert_col_skip_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    pub fn arg_templates(&self) -> ArgListTemplates {
        ArgListTemplates {
            call: self.call_arg_style.clone(),
            call_display: self.call_arg_display_style.clone(),
            signature: self.signature_arg_style.clone(),
            oneliner_max: self.call_arg_oneliner_max,
        }
    }

    /// Options for the metadata store owned by an engine with this config
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            search_path_filter: self.search_path_filter,
            arg_templates: self.arg_templates(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Skip pattern that does not compile
    #[error("Invalid skip pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Malformed JSON
    #[error("Invalid configuration: {reason}")]
    Parse { reason: String },

    #[error("Cannot read {path}: {reason}")]
    Io { path: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompletionConfig::default();
        assert!(!config.search_path_filter);
        assert_eq!(config.qualify_columns, QualifyColumns::IfMoreThanOneTable);
        assert_eq!(config.keyword_casing, KeywordCasing::Upper);
        assert_eq!(config.skip_patterns().unwrap().len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_skip_patterns() {
        let patterns = CompletionConfig::default().skip_patterns().unwrap();
        let skipped = |default: &str| patterns.iter().any(|p| p.is_match(default));
        assert!(skipped("now()"));
        assert!(skipped("nextval('users_id_seq'::regclass)"));
        assert!(!skipped("'active'::text"));
    }

    #[test]
    fn test_from_json_partial() {
        let config = CompletionConfig::from_json(
            r#"{"keyword_casing": "lower", "asterisk_column_order": "alphabetic"}"#,
        )
        .unwrap();
        assert_eq!(config.keyword_casing, KeywordCasing::Lower);
        assert_eq!(config.asterisk_column_order, AsteriskColumnOrder::Alphabetic);
        assert_eq!(config.call_arg_oneliner_max, 2);
    }

    #[test]
    fn test_invalid_pattern() {
        let result = CompletionConfig::from_json(r#"{"insert_col_skip_patterns": ["("]}"#);
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn test_invalid_json() {
        let result = CompletionConfig::from_json(r#"{"qualify_columns": "sometimes"}"#);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_store_options() {
        let config = CompletionConfig {
            search_path_filter: true,
            signature_arg_style: "{arg_type}".to_string(),
            ..Default::default()
        };
        let options = config.store_options();
        assert!(options.search_path_filter);
        assert_eq!(options.arg_templates.signature, "{arg_type}");
    }
}
