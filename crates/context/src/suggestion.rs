// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Suggestion requests
//!
//! A classifier turns the text before the cursor into an ordered list of
//! [`Suggestion`]s, each naming one kind of object that may appear next plus
//! the parameters a generator needs to enumerate it.
//!
//! Schema and table names carried here are exact catalog spellings: unquoted
//! identifiers already folded to lower case, quoted ones with the quotes
//! stripped.

use std::fmt;

use serde::Serialize;
use sqlcomplete_catalog::names::normalize_ref;

/// A table, view or set-returning function referenced by the statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableReference {
    pub schema: Option<String>,
    pub name: String,
    pub alias: Option<String>,
    pub is_function: bool,
}

impl TableReference {
    /// Reference to `name` without schema or alias
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            alias: None,
            is_function: false,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Mark the reference as a function call in a FROM clause
    pub fn function(mut self) -> Self {
        self.is_function = true;
        self
    }

    /// How SQL text refers to this relation: the alias, else the name
    /// (quoted when it is not all lower case)
    pub fn ref_name(&self) -> String {
        if let Some(alias) = &self.alias {
            return alias.clone();
        }
        if self.name == self.name.to_lowercase() || self.name.starts_with('"') {
            self.name.clone()
        } else {
            format!("\"{}\"", self.name)
        }
    }

    /// Comparison key of [`ref_name`](Self::ref_name)
    pub fn ref_key(&self) -> String {
        normalize_ref(&self.ref_name())
    }

    /// Whether a typed qualifier denotes this reference
    ///
    /// Matches the alias, the bare name or `schema.name`.
    pub fn is_identified_by(&self, qualifier: &str) -> bool {
        self.alias.as_deref() == Some(qualifier)
            || self.name == qualifier
            || self
                .schema
                .as_ref()
                .is_some_and(|schema| format!("{schema}.{}", self.name) == qualifier)
    }
}

/// How a function is going to be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionUsage {
    /// As a relation in a FROM clause
    From,
    /// Named by signature, as after `DROP FUNCTION`
    Signature,
    /// Name only, no argument list
    Special,
}

/// Extra context for column suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnContext {
    /// Column list of an `INSERT INTO t (...)`
    Insert,
}

/// One kind of object that may appear at the cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Suggestion {
    Table {
        schema: Option<String>,
        table_refs: Vec<TableReference>,
    },
    View {
        schema: Option<String>,
        table_refs: Vec<TableReference>,
    },
    Column {
        table_refs: Vec<TableReference>,
        /// Keep only columns of the last table that also exist in another
        require_last_table: bool,
        context: Option<ColumnContext>,
        /// Columns may be prefixed with their table reference
        qualifiable: bool,
        /// Tables in the statement; more than `table_refs` after `x.`
        tables_in_scope: usize,
    },
    Function {
        schema: Option<String>,
        table_refs: Vec<TableReference>,
        usage: Option<FunctionUsage>,
    },
    Schema {
        /// The schema name is going to be used as a string literal
        quoted: bool,
    },
    Datatype {
        schema: Option<String>,
    },
    Database,
    Keyword {
        last_token: Option<String>,
    },
    Alias {
        aliases: Vec<String>,
    },
    Join {
        table_refs: Vec<TableReference>,
        schema: Option<String>,
    },
    JoinCondition {
        table_refs: Vec<TableReference>,
        parent: Option<TableReference>,
    },
    FromClauseItem {
        schema: Option<String>,
        table_refs: Vec<TableReference>,
    },
}

/// Discriminant of [`Suggestion`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuggestionKind {
    Table,
    View,
    Column,
    Function,
    Schema,
    Datatype,
    Database,
    Keyword,
    Alias,
    Join,
    JoinCondition,
    FromClauseItem,
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SuggestionKind::Table => "table",
            SuggestionKind::View => "view",
            SuggestionKind::Column => "column",
            SuggestionKind::Function => "function",
            SuggestionKind::Schema => "schema",
            SuggestionKind::Datatype => "datatype",
            SuggestionKind::Database => "database",
            SuggestionKind::Keyword => "keyword",
            SuggestionKind::Alias => "alias",
            SuggestionKind::Join => "join",
            SuggestionKind::JoinCondition => "join condition",
            SuggestionKind::FromClauseItem => "from clause item",
        };
        f.write_str(name)
    }
}

impl Suggestion {
    pub fn kind(&self) -> SuggestionKind {
        match self {
            Suggestion::Table { .. } => SuggestionKind::Table,
            Suggestion::View { .. } => SuggestionKind::View,
            Suggestion::Column { .. } => SuggestionKind::Column,
            Suggestion::Function { .. } => SuggestionKind::Function,
            Suggestion::Schema { .. } => SuggestionKind::Schema,
            Suggestion::Datatype { .. } => SuggestionKind::Datatype,
            Suggestion::Database => SuggestionKind::Database,
            Suggestion::Keyword { .. } => SuggestionKind::Keyword,
            Suggestion::Alias { .. } => SuggestionKind::Alias,
            Suggestion::Join { .. } => SuggestionKind::Join,
            Suggestion::JoinCondition { .. } => SuggestionKind::JoinCondition,
            Suggestion::FromClauseItem { .. } => SuggestionKind::FromClauseItem,
        }
    }

    /// Table suggestion, optionally restricted to one schema
    pub fn table(schema: Option<&str>) -> Self {
        Suggestion::Table {
            schema: schema.map(str::to_string),
            table_refs: Vec::new(),
        }
    }

    pub fn view(schema: Option<&str>) -> Self {
        Suggestion::View {
            schema: schema.map(str::to_string),
            table_refs: Vec::new(),
        }
    }

    /// Qualifiable column suggestion over `table_refs`
    pub fn column(table_refs: Vec<TableReference>) -> Self {
        Suggestion::Column {
            tables_in_scope: table_refs.len(),
            table_refs,
            require_last_table: false,
            context: None,
            qualifiable: true,
        }
    }

    pub fn function(schema: Option<&str>, usage: Option<FunctionUsage>) -> Self {
        Suggestion::Function {
            schema: schema.map(str::to_string),
            table_refs: Vec::new(),
            usage,
        }
    }

    pub fn schema() -> Self {
        Suggestion::Schema { quoted: false }
    }

    pub fn keyword(last_token: Option<&str>) -> Self {
        Suggestion::Keyword {
            last_token: last_token.map(str::to_uppercase),
        }
    }

    pub fn datatype(schema: Option<&str>) -> Self {
        Suggestion::Datatype {
            schema: schema.map(str::to_string),
        }
    }

    pub fn from_clause_item(schema: Option<&str>, table_refs: Vec<TableReference>) -> Self {
        Suggestion::FromClauseItem {
            schema: schema.map(str::to_string),
            table_refs,
        }
    }

    pub fn join(table_refs: Vec<TableReference>, schema: Option<&str>) -> Self {
        Suggestion::Join {
            table_refs,
            schema: schema.map(str::to_string),
        }
    }

    pub fn join_condition(table_refs: Vec<TableReference>, parent: Option<TableReference>) -> Self {
        Suggestion::JoinCondition { table_refs, parent }
    }
}
