//! The shape-schema input boundary (`spec.md` §6): the typed record both
//! the JSON and RDF forms deserialize/assemble into before `build_schema`
//! resolves shape-reference names into `ShapeId`s.

use std::collections::HashMap;

use serde::Deserialize;

fn no_bound() -> i32 {
    -1
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetTypeInput {
    Class,
    Node,
    #[default]
    None,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConstraintInput {
    #[serde(default)]
    pub path: String,
    #[serde(default = "no_bound")]
    pub min: i32,
    #[serde(default = "no_bound")]
    pub max: i32,
    #[serde(default)]
    pub datatype: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub shape_ref: Option<String>,
    #[serde(default)]
    pub negated: bool,
    #[serde(default)]
    pub options: Vec<ConstraintInput>,
    #[serde(default)]
    pub raw_query: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShapeSchemaInput {
    pub id: String,
    #[serde(default)]
    pub target_def: Option<String>,
    #[serde(default)]
    pub target_type: TargetTypeInput,
    #[serde(default)]
    pub target_query: Option<String>,
    #[serde(default)]
    pub constraints: Vec<ConstraintInput>,
    /// Informational: the engine derives `referenced_shapes` from each
    /// constraint's own `shape_ref` instead, but the input form carries this
    /// map too so JSON authored against `spec.md` §6 directly validates.
    #[serde(default)]
    pub referenced_shapes: HashMap<String, String>,
    #[serde(default)]
    pub prefixes: Vec<(String, String)>,
    #[serde(default)]
    pub flag_disjunction: bool,
    #[serde(default)]
    pub order_by: bool,
    #[serde(default)]
    pub include_prefixes: bool,
}
