// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata types for database schema information
//!
//! Payload types stored in the [`MetadataStore`](crate::MetadataStore) and the
//! row types a [`Catalog`](crate::Catalog) returns to populate it.
//!
//! All names carried by row types are *exact* catalog spellings (what
//! `pg_class.relname` holds); the store normalizes them on insertion.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Relation flavour stored by the metadata store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Tables,
    Views,
}

impl RelationKind {
    /// Both relation kinds, tables first
    pub const ALL: [RelationKind; 2] = [RelationKind::Tables, RelationKind::Views];
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::Tables => write!(f, "tables"),
            RelationKind::Views => write!(f, "views"),
        }
    }
}

/// A foreign-key relationship between two columns
///
/// One instance is shared by both endpoint columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKey {
    pub parent_schema: String,
    pub parent_table: String,
    pub parent_column: String,
    pub child_schema: String,
    pub child_table: String,
    pub child_column: String,
}

impl ForeignKey {
    /// Create a foreign key `child_schema.child_table.child_column`
    /// referencing `parent_schema.parent_table.parent_column`
    pub fn new(
        parent: (impl Into<String>, impl Into<String>, impl Into<String>),
        child: (impl Into<String>, impl Into<String>, impl Into<String>),
    ) -> Self {
        Self {
            parent_schema: parent.0.into(),
            parent_table: parent.1.into(),
            parent_column: parent.2.into(),
            child_schema: child.0.into(),
            child_table: child.1.into(),
            child_column: child.2.into(),
        }
    }
}

/// Column information stored per relation
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetadata {
    /// Normalized column name
    pub name: String,
    /// Type name as reported by the catalog (`integer`, `text`, ...)
    pub datatype: String,
    pub has_default: bool,
    /// Default expression text, e.g. `nextval('users_id_seq'::regclass)`
    pub default_expression: Option<String>,
    /// Foreign keys in which this column is either endpoint
    pub foreign_keys: Vec<Arc<ForeignKey>>,
}

impl ColumnMetadata {
    /// Create new column metadata
    pub fn new(name: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            datatype: datatype.into(),
            has_default: false,
            default_expression: None,
            foreign_keys: Vec::new(),
        }
    }

    /// Attach a default expression
    pub fn with_default(mut self, expression: impl Into<String>) -> Self {
        self.has_default = true;
        self.default_expression = Some(expression.into());
        self
    }
}

/// Parameter mode of a function argument (`pg_proc.proargmodes`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArgMode {
    #[serde(rename = "i")]
    In,
    #[serde(rename = "o")]
    Out,
    #[serde(rename = "b")]
    InOut,
    #[serde(rename = "v")]
    Variadic,
    #[serde(rename = "t")]
    Table,
}

impl ArgMode {
    /// Parse a single-character mode code
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'i' => Some(ArgMode::In),
            'o' => Some(ArgMode::Out),
            'b' => Some(ArgMode::InOut),
            'v' => Some(ArgMode::Variadic),
            't' => Some(ArgMode::Table),
            _ => None,
        }
    }

    fn is_input(self) -> bool {
        matches!(self, ArgMode::In | ArgMode::InOut | ArgMode::Variadic)
    }

    fn is_output(self) -> bool {
        matches!(self, ArgMode::Out | ArgMode::InOut | ArgMode::Table)
    }
}

/// An input argument of a function, with its default aligned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionArg {
    pub name: String,
    pub datatype: String,
    /// `Some` when the argument has a default; the inner value is the
    /// default expression (`None` for a `NULL` default)
    pub default: Option<Option<String>>,
}

impl FunctionArg {
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// One overload of a function
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionMetadata {
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub arg_names: Vec<String>,
    #[serde(default)]
    pub arg_types: Vec<String>,
    /// `None` means every argument is an input argument
    #[serde(default)]
    pub arg_modes: Option<Vec<ArgMode>>,
    #[serde(default = "default_return_type")]
    pub return_type: String,
    #[serde(default)]
    pub is_aggregate: bool,
    #[serde(default)]
    pub is_window: bool,
    #[serde(default)]
    pub is_set_returning: bool,
    #[serde(default)]
    pub is_extension: bool,
    /// Defaults for the trailing input arguments, `None` for `NULL`
    #[serde(default)]
    pub arg_defaults: Vec<Option<String>>,
}

fn default_return_type() -> String {
    "void".to_string()
}

impl FunctionMetadata {
    /// Create a function returning `void` with no arguments
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            arg_names: Vec::new(),
            arg_types: Vec::new(),
            arg_modes: None,
            return_type: default_return_type(),
            is_aggregate: false,
            is_window: false,
            is_set_returning: false,
            is_extension: false,
            arg_defaults: Vec::new(),
        }
    }

    /// Add an argument (input mode unless [`with_modes`](Self::with_modes) is used)
    pub fn with_arg(mut self, name: impl Into<String>, datatype: impl Into<String>) -> Self {
        self.arg_names.push(name.into());
        self.arg_types.push(datatype.into());
        self
    }

    /// Set explicit argument modes, one per argument
    pub fn with_modes(mut self, modes: Vec<ArgMode>) -> Self {
        self.arg_modes = Some(modes);
        self
    }

    /// Set defaults for the trailing input arguments
    pub fn with_defaults(mut self, defaults: Vec<Option<String>>) -> Self {
        self.arg_defaults = defaults;
        self
    }

    pub fn returns(mut self, datatype: impl Into<String>) -> Self {
        self.return_type = datatype.into();
        self
    }

    pub fn aggregate(mut self) -> Self {
        self.is_aggregate = true;
        self
    }

    pub fn window(mut self) -> Self {
        self.is_window = true;
        self
    }

    pub fn set_returning(mut self) -> Self {
        self.is_set_returning = true;
        self
    }

    pub fn extension(mut self) -> Self {
        self.is_extension = true;
        self
    }

    fn mode_at(&self, index: usize) -> ArgMode {
        self.arg_modes
            .as_ref()
            .and_then(|modes| modes.get(index).copied())
            .unwrap_or(ArgMode::In)
    }

    fn typed_args(&self) -> impl Iterator<Item = (usize, &str, &str)> {
        self.arg_names
            .iter()
            .zip(self.arg_types.iter())
            .enumerate()
            .map(|(i, (name, datatype))| (i, name.as_str(), datatype.as_str()))
    }

    /// Input arguments (modes `i`, `b`, `v`) with defaults aligned to the
    /// last ones
    pub fn args(&self) -> Vec<FunctionArg> {
        let inputs: Vec<(&str, &str)> = self
            .typed_args()
            .filter(|(i, _, _)| self.mode_at(*i).is_input())
            .map(|(_, name, datatype)| (name, datatype))
            .collect();

        let first_default = inputs.len().saturating_sub(self.arg_defaults.len());
        inputs
            .into_iter()
            .enumerate()
            .map(|(i, (name, datatype))| FunctionArg {
                name: name.to_string(),
                datatype: datatype.to_string(),
                default: (i >= first_default)
                    .then(|| self.arg_defaults.get(i - first_default).cloned().flatten()),
            })
            .collect()
    }

    /// Output columns when the function is used as a relation
    ///
    /// A `void` function yields nothing. Without explicit modes the function
    /// yields one column named after itself; otherwise the `o`, `b` and `t`
    /// arguments are the columns.
    pub fn fields(&self) -> Vec<ColumnMetadata> {
        if self.return_type.eq_ignore_ascii_case("void") {
            return Vec::new();
        }
        if self.arg_modes.is_none() {
            return vec![ColumnMetadata::new(&self.name, &self.return_type)];
        }
        self.typed_args()
            .filter(|(i, _, _)| self.mode_at(*i).is_output())
            .map(|(_, name, datatype)| ColumnMetadata::new(name, datatype))
            .collect()
    }

    /// Whether any argument is variadic
    pub fn has_variadic(&self) -> bool {
        self.arg_modes
            .as_ref()
            .is_some_and(|modes| modes.contains(&ArgMode::Variadic))
    }
}

/// A relation row: `(schema, name)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRow {
    pub schema: String,
    pub name: String,
}

impl RelationRow {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

/// A column row: `(schema, relation, column, datatype, has_default, default)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRow {
    pub schema: String,
    pub relation: String,
    pub column: String,
    pub datatype: String,
    #[serde(default)]
    pub has_default: bool,
    #[serde(default)]
    pub default: Option<String>,
}

impl ColumnRow {
    pub fn new(
        schema: impl Into<String>,
        relation: impl Into<String>,
        column: impl Into<String>,
        datatype: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            relation: relation.into(),
            column: column.into(),
            datatype: datatype.into(),
            has_default: false,
            default: None,
        }
    }

    /// Attach a default expression
    pub fn with_default(mut self, expression: impl Into<String>) -> Self {
        self.has_default = true;
        self.default = Some(expression.into());
        self
    }
}

/// A user-defined datatype row: `(schema, name)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatatypeRow {
    pub schema: String,
    pub name: String,
}

impl DatatypeRow {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_series() -> FunctionMetadata {
        FunctionMetadata::new("pg_catalog", "generate_series")
            .with_arg("start", "integer")
            .with_arg("stop", "integer")
            .with_arg("step", "integer")
            .with_defaults(vec![Some("1".into())])
            .returns("integer")
            .set_returning()
    }

    #[test]
    fn test_args_align_defaults_to_trailing_inputs() {
        let args = make_series().args();
        assert_eq!(args.len(), 3);
        assert!(!args[0].has_default());
        assert!(!args[1].has_default());
        assert_eq!(args[2].default, Some(Some("1".to_string())));
    }

    #[test]
    fn test_args_skip_output_arguments() {
        let func = FunctionMetadata::new("public", "split_name")
            .with_arg("full_name", "text")
            .with_arg("first", "text")
            .with_arg("last", "text")
            .with_modes(vec![ArgMode::In, ArgMode::Out, ArgMode::Out])
            .returns("record");

        let args = func.args();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].name, "full_name");

        let fields: Vec<_> = func.fields().into_iter().map(|c| c.name).collect();
        assert_eq!(fields, vec!["first", "last"]);
    }

    #[test]
    fn test_fields_for_scalar_and_void() {
        let func = FunctionMetadata::new("public", "answer").returns("integer");
        let fields = func.fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "answer");
        assert_eq!(fields[0].datatype, "integer");

        let func = FunctionMetadata::new("public", "do_nothing");
        assert!(func.fields().is_empty());
    }

    #[test]
    fn test_null_default() {
        let func = FunctionMetadata::new("public", "f")
            .with_arg("a", "text")
            .with_defaults(vec![None]);
        assert_eq!(func.args()[0].default, Some(None));
    }

    #[test]
    fn test_has_variadic() {
        assert!(!make_series().has_variadic());
        let func = FunctionMetadata::new("pg_catalog", "concat")
            .with_arg("values", "any")
            .with_modes(vec![ArgMode::Variadic])
            .returns("text");
        assert!(func.has_variadic());
    }

    #[test]
    fn test_function_json_shape() {
        let json = r#"{
            "schema": "public",
            "name": "split_name",
            "arg_names": ["full_name", "first"],
            "arg_types": ["text", "text"],
            "arg_modes": ["i", "o"],
            "return_type": "record"
        }"#;
        let func: FunctionMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(func.arg_modes, Some(vec![ArgMode::In, ArgMode::Out]));
        assert!(!func.is_aggregate);
    }
}
