//! Typed model of the `exports` field.
//!
//! The field is a small recursive grammar: a single file, a list of files, a
//! map keyed by sub-paths (`"."`, `"./cli"`) or a map keyed by conditions
//! (`"import"`, `"require"`, ...). One level of nesting in the opposite kind
//! is allowed. Deeper nesting is ambiguous for entry synthesis and is rejected
//! while parsing, so the nested target types below can only hold files.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

use crate::build_map::DescriptorFormat;

/// Invalid `exports` shapes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportsError {
    /// A map nested under `exports[<sub-path>][<condition>]`.
    #[error("Nested sub-path exports are not supported (at {location})")]
    NestedSubPaths { location: String },

    /// A map nested under `exports[<condition>][<sub-path>]`.
    #[error("Nested conditional exports are not supported (at {location})")]
    NestedConditions { location: String },

    /// `null` where a target was expected inside a sub-path map.
    #[error("Expected value in sub-path export (at {location})")]
    MissingSubPathValue { location: String },

    /// `null` where a target was expected inside a conditions map.
    #[error("Expected value in conditional export (at {location})")]
    MissingConditionValue { location: String },

    /// Anything that is neither a file path nor an allowed map.
    #[error("Invalid exports target at {location}: expected a file path, found {found}")]
    InvalidTarget { location: String, found: &'static str },
}

/// A sub-path key such as `"."` or `"./cli"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubPath(String);

impl SubPath {
    /// The package root, `"."`.
    pub fn root() -> Self {
        Self(".".to_string())
    }

    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "."
    }

    /// Name of the synthesized source entry: `index` for the root, the part
    /// after `./` otherwise.
    pub fn entry_name(&self) -> &str {
        if self.is_root() {
            "index"
        } else {
            self.0.strip_prefix("./").unwrap_or(&self.0)
        }
    }
}

impl fmt::Display for SubPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A condition key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    Import,
    Require,
    Other(String),
}

impl Condition {
    pub fn new(key: &str) -> Self {
        match key {
            "import" => Condition::Import,
            "require" => Condition::Require,
            other => Condition::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Condition::Import => "import",
            Condition::Require => "require",
            Condition::Other(name) => name,
        }
    }

    /// Format implied by the condition before the file extension is consulted.
    pub fn format(&self) -> DescriptorFormat {
        match self {
            Condition::Import => DescriptorFormat::Esm,
            Condition::Require => DescriptorFormat::CommonJs,
            Condition::Other(_) => DescriptorFormat::Auto,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a sub-path key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubPathTarget {
    File(String),
    Conditions(IndexMap<Condition, String>),
}

/// Value of a condition key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionTarget {
    File(String),
    SubPaths(IndexMap<SubPath, String>),
}

/// The four shapes of `exports`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exports {
    /// `"exports": "./dist/index.js"`
    Root(String),
    /// `"exports": ["./dist/index.js", "./dist/cli.js"]`
    List(Vec<String>),
    /// `"exports": { ".": ..., "./cli": ... }`
    SubPaths(IndexMap<SubPath, SubPathTarget>),
    /// `"exports": { "import": ..., "require": ... }`
    Conditions(IndexMap<Condition, ConditionTarget>),
}

impl Exports {
    /// Parse the raw field.
    ///
    /// An object is a sub-path map as soon as one of its keys starts with `.`;
    /// otherwise every key is a condition.
    ///
    /// Fallback arrays contribute only their string elements. An array used
    /// as a map value is skipped entirely.
    pub fn parse(value: &Value) -> Result<Self, ExportsError> {
        match value {
            Value::String(file) => Ok(Exports::Root(file.clone())),
            Value::Array(items) => Ok(Exports::List(
                items
                    .iter()
                    .enumerate()
                    .filter_map(|(index, item)| match item {
                        Value::String(file) => Some(file.clone()),
                        _ => {
                            debug!("Skipping non-file target at exports[{index}]");
                            None
                        }
                    })
                    .collect(),
            )),
            Value::Object(map) if map.keys().any(|key| key.starts_with('.')) => {
                parse_sub_paths(map)
            }
            Value::Object(map) => parse_conditions(map),
            other => Err(invalid_target("exports".to_string(), other)),
        }
    }
}

fn parse_sub_paths(map: &Map<String, Value>) -> Result<Exports, ExportsError> {
    let mut sub_paths = IndexMap::with_capacity(map.len());
    for (key, value) in map {
        let location = format!("exports[{key:?}]");
        let target = match value {
            Value::String(file) => SubPathTarget::File(file.clone()),
            Value::Null => return Err(ExportsError::MissingSubPathValue { location }),
            Value::Array(_) => {
                skip_fallback_array(&location);
                continue;
            }
            Value::Object(conditions) => {
                let mut files = IndexMap::with_capacity(conditions.len());
                for (condition, value) in conditions {
                    let location = format!("{location}[{condition:?}]");
                    let file = match value {
                        Value::String(file) => file.clone(),
                        Value::Null => {
                            return Err(ExportsError::MissingConditionValue { location });
                        }
                        Value::Array(_) => {
                            skip_fallback_array(&location);
                            continue;
                        }
                        Value::Object(_) => return Err(ExportsError::NestedSubPaths { location }),
                        other => return Err(invalid_target(location, other)),
                    };
                    files.insert(Condition::new(condition), file);
                }
                SubPathTarget::Conditions(files)
            }
            other => return Err(invalid_target(location, other)),
        };
        sub_paths.insert(SubPath::new(key.as_str()), target);
    }
    Ok(Exports::SubPaths(sub_paths))
}

fn parse_conditions(map: &Map<String, Value>) -> Result<Exports, ExportsError> {
    let mut conditions = IndexMap::with_capacity(map.len());
    for (key, value) in map {
        let location = format!("exports[{key:?}]");
        let target = match value {
            Value::String(file) => ConditionTarget::File(file.clone()),
            Value::Null => return Err(ExportsError::MissingConditionValue { location }),
            Value::Array(_) => {
                skip_fallback_array(&location);
                continue;
            }
            Value::Object(sub_paths) => {
                let mut files = IndexMap::with_capacity(sub_paths.len());
                for (sub_path, value) in sub_paths {
                    let location = format!("{location}[{sub_path:?}]");
                    let file = match value {
                        Value::String(file) => file.clone(),
                        Value::Null => {
                            return Err(ExportsError::MissingSubPathValue { location });
                        }
                        Value::Array(_) => {
                            skip_fallback_array(&location);
                            continue;
                        }
                        Value::Object(_) => {
                            return Err(ExportsError::NestedConditions { location });
                        }
                        other => return Err(invalid_target(location, other)),
                    };
                    files.insert(SubPath::new(sub_path.as_str()), file);
                }
                ConditionTarget::SubPaths(files)
            }
            other => return Err(invalid_target(location, other)),
        };
        conditions.insert(Condition::new(key), target);
    }
    Ok(Exports::Conditions(conditions))
}

fn skip_fallback_array(location: &str) {
    debug!("Skipping fallback array at {location}");
}

fn invalid_target(location: String, value: &Value) -> ExportsError {
    let found = match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    ExportsError::InvalidTarget { location, found }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_root_and_list() {
        assert_eq!(
            Exports::parse(&json!("./dist/index.js")).unwrap(),
            Exports::Root("./dist/index.js".into())
        );
        assert_eq!(
            Exports::parse(&json!(["./a.js", "./b.js"])).unwrap(),
            Exports::List(vec!["./a.js".into(), "./b.js".into()])
        );
    }

    #[test]
    fn test_parse_detects_sub_paths_by_any_dot_key() {
        let exports = Exports::parse(&json!({
            "types": "./dist/index.d.ts",
            "./cli": "./dist/cli.js"
        }))
        .unwrap();

        let Exports::SubPaths(map) = exports else {
            panic!("expected sub-path map");
        };
        let keys: Vec<&str> = map.keys().map(SubPath::as_str).collect();
        assert_eq!(keys, ["types", "./cli"]);
    }

    #[test]
    fn test_parse_preserves_condition_order() {
        let exports = Exports::parse(&json!({
            "require": "./dist/index.cjs",
            "import": "./dist/index.mjs",
            "default": "./dist/index.js"
        }))
        .unwrap();

        let Exports::Conditions(map) = exports else {
            panic!("expected condition map");
        };
        let keys: Vec<Condition> = map.keys().cloned().collect();
        assert_eq!(
            keys,
            [
                Condition::Require,
                Condition::Import,
                Condition::Other("default".into())
            ]
        );
    }

    #[test]
    fn test_sub_path_inside_sub_path_is_rejected() {
        let err = Exports::parse(&json!({ ".": { "import": { ".": "./a.js" } } })).unwrap_err();
        assert!(matches!(err, ExportsError::NestedSubPaths { .. }));
        assert!(err.to_string().contains("Nested sub-path exports are not supported"));
    }

    #[test]
    fn test_condition_inside_condition_is_rejected() {
        let err = Exports::parse(&json!({ "import": { ".": { "node": "./a.js" } } })).unwrap_err();
        assert!(matches!(err, ExportsError::NestedConditions { .. }));
    }

    #[test]
    fn test_null_targets_fail_fast() {
        let err = Exports::parse(&json!({ ".": "./a.js", "./cli": null })).unwrap_err();
        assert_eq!(
            err,
            ExportsError::MissingSubPathValue {
                location: "exports[\"./cli\"]".into()
            }
        );

        let err = Exports::parse(&json!({ "import": null })).unwrap_err();
        assert!(matches!(err, ExportsError::MissingConditionValue { .. }));
    }

    #[test]
    fn test_non_string_targets() {
        let err = Exports::parse(&json!({ ".": 1 })).unwrap_err();
        assert_eq!(
            err,
            ExportsError::InvalidTarget {
                location: "exports[\".\"]".into(),
                found: "a number"
            }
        );
        assert!(Exports::parse(&json!(true)).is_err());
    }

    #[test]
    fn test_list_keeps_only_files() {
        assert_eq!(
            Exports::parse(&json!([{ "import": "./a.mjs" }, "./a.js", 1])).unwrap(),
            Exports::List(vec!["./a.js".into()])
        );
    }

    #[test]
    fn test_array_map_values_are_skipped() {
        let exports = Exports::parse(&json!({
            ".": "./dist/index.js",
            "./cli": ["./dist/cli.mjs", "./dist/cli.js"]
        }))
        .unwrap();
        let Exports::SubPaths(map) = exports else {
            panic!("expected sub-path map");
        };
        let keys: Vec<&str> = map.keys().map(SubPath::as_str).collect();
        assert_eq!(keys, ["."]);

        let exports = Exports::parse(&json!({ "import": { "./cli": ["./dist/cli.mjs"] } })).unwrap();
        let Exports::Conditions(map) = exports else {
            panic!("expected condition map");
        };
        assert_eq!(map[&Condition::Import], ConditionTarget::SubPaths(IndexMap::new()));
    }

    #[test]
    fn test_entry_names() {
        assert_eq!(SubPath::root().entry_name(), "index");
        assert_eq!(SubPath::new("./cli").entry_name(), "cli");
        assert_eq!(SubPath::new("./utils/fs").entry_name(), "utils/fs");
    }
}
