// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Function argument lists
//!
//! Renders the parenthesized argument list appended to a function candidate.
//! Three styles exist: `call` (what gets inserted, defaults filled in),
//! `call_display` (what the completion menu shows) and `signature` (used after
//! `DROP FUNCTION` and friends).

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::metadata::{FunctionArg, FunctionMetadata};

/// Trailing type cast on a default expression, e.g. `'x'::text` or `'{}'::int[]`
static DEFAULT_CAST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"::[\w\.]+(\[\])?$").expect("valid default cast regex"));

/// Which rendering of an argument list is wanted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgListStyle {
    Call,
    CallDisplay,
    Signature,
}

impl ArgListStyle {
    pub const ALL: [ArgListStyle; 3] = [
        ArgListStyle::Call,
        ArgListStyle::CallDisplay,
        ArgListStyle::Signature,
    ];
}

/// Per-argument templates for each [`ArgListStyle`]
///
/// Templates may use `{arg_name}`, `{arg_name_padded}`, `{arg_type}`,
/// `{arg_default}` and `{arg_num}`. An empty template renders `()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgListTemplates {
    pub call: String,
    pub call_display: String,
    pub signature: String,
    /// A `call` list with more arguments than this is spread over several lines
    pub oneliner_max: usize,
}

impl Default for ArgListTemplates {
    fn default() -> Self {
        Self {
            call: "{arg_name_padded} := {arg_default}".to_string(),
            call_display: "{arg_name}".to_string(),
            signature: "{arg_name} {arg_type}".to_string(),
            oneliner_max: 2,
        }
    }
}

impl ArgListTemplates {
    fn template(&self, style: ArgListStyle) -> &str {
        match style {
            ArgListStyle::Call => &self.call,
            ArgListStyle::CallDisplay => &self.call_display,
            ArgListStyle::Signature => &self.signature,
        }
    }

    /// Render the argument list of `func` in `style`
    ///
    /// A `call` list collapses to `()` when the function takes fewer than two
    /// arguments or is variadic.
    pub fn render(&self, func: &FunctionMetadata, style: ArgListStyle) -> String {
        let template = self.template(style);
        if template.is_empty() {
            return "()".to_string();
        }

        let args = func.args();
        if style == ArgListStyle::Call && (args.len() < 2 || func.has_variadic()) {
            return "()".to_string();
        }

        let multiline = style == ArgListStyle::Call && args.len() > self.oneliner_max;
        let pad_to = if multiline {
            args.iter().map(|a| a.name.chars().count()).max().unwrap_or(0)
        } else {
            0
        };

        let formatted: Vec<String> = args
            .iter()
            .enumerate()
            .map(|(i, arg)| format_arg(template, arg, i + 1, pad_to))
            .filter(|s| !s.is_empty())
            .collect();

        if multiline {
            let body: Vec<String> = formatted.iter().map(|a| format!("\n    {a}")).collect();
            format!("({}\n)", body.join(","))
        } else {
            format!("({})", formatted.join(", "))
        }
    }
}

fn format_arg(template: &str, arg: &FunctionArg, num: usize, pad_to: usize) -> String {
    let default = match &arg.default {
        Some(Some(expression)) => DEFAULT_CAST.replace(expression, "").into_owned(),
        Some(None) => "NULL".to_string(),
        None => String::new(),
    };
    template
        .replace("{arg_name_padded}", &format!("{:<pad_to$}", arg.name))
        .replace("{arg_name}", &arg.name)
        .replace("{arg_type}", &arg.datatype)
        .replace("{arg_default}", &default)
        .replace("{arg_num}", &num.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ArgMode;

    fn two_args() -> FunctionMetadata {
        FunctionMetadata::new("public", "add_user")
            .with_arg("name", "text")
            .with_arg("active", "boolean")
            .with_defaults(vec![Some("true".into())])
            .returns("integer")
    }

    #[test]
    fn test_call_style_fills_defaults() {
        let templates = ArgListTemplates::default();
        assert_eq!(
            templates.render(&two_args(), ArgListStyle::Call),
            "(name := , active := true)"
        );
    }

    #[test]
    fn test_call_style_collapses_short_lists() {
        let templates = ArgListTemplates::default();
        let func = FunctionMetadata::new("public", "lower")
            .with_arg("value", "text")
            .returns("text");
        assert_eq!(templates.render(&func, ArgListStyle::Call), "()");
        assert_eq!(templates.render(&func, ArgListStyle::CallDisplay), "(value)");
    }

    #[test]
    fn test_call_style_collapses_variadic() {
        let templates = ArgListTemplates::default();
        let func = FunctionMetadata::new("pg_catalog", "concat_ws")
            .with_arg("sep", "text")
            .with_arg("values", "any")
            .with_modes(vec![ArgMode::In, ArgMode::Variadic])
            .returns("text");
        assert_eq!(templates.render(&func, ArgListStyle::Call), "()");
    }

    #[test]
    fn test_call_style_multiline() {
        let templates = ArgListTemplates::default();
        let func = FunctionMetadata::new("public", "make_box")
            .with_arg("x", "integer")
            .with_arg("y", "integer")
            .with_arg("width", "integer")
            .with_defaults(vec![Some("10::integer".into())])
            .returns("box");
        assert_eq!(
            templates.render(&func, ArgListStyle::Call),
            "(\n    x     := ,\n    y     := ,\n    width := 10\n)"
        );
    }

    #[test]
    fn test_signature_style() {
        let templates = ArgListTemplates::default();
        assert_eq!(
            templates.render(&two_args(), ArgListStyle::Signature),
            "(name text, active boolean)"
        );
    }

    #[test]
    fn test_null_default_and_array_cast() {
        let templates = ArgListTemplates {
            call_display: "{arg_num}:{arg_default}".to_string(),
            ..Default::default()
        };
        let func = FunctionMetadata::new("public", "f")
            .with_arg("a", "text[]")
            .with_arg("b", "text")
            .with_defaults(vec![Some("'{}'::text[]".into()), None]);
        assert_eq!(
            templates.render(&func, ArgListStyle::CallDisplay),
            "(1:'{}', 2:NULL)"
        );
    }

    #[test]
    fn test_empty_template() {
        let templates = ArgListTemplates {
            signature: String::new(),
            ..Default::default()
        };
        assert_eq!(templates.render(&two_args(), ArgListStyle::Signature), "()");
    }
}
