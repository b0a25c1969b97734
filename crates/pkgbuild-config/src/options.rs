//! Options of the bundle executor and named configurations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ConfigError, Result};

/// Build flavour. Release builds fail on bundler warnings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    #[default]
    Release,
    Debug,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Release => "release",
            BuildType::Debug => "debug",
        }
    }

    pub fn is_release(&self) -> bool {
        matches!(self, BuildType::Release)
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "release" => Ok(BuildType::Release),
            "debug" => Ok(BuildType::Debug),
            other => Err(ConfigError::InvalidValue {
                field: "buildType".to_string(),
                hint: format!("expected 'release' or 'debug', found '{other}'"),
            }),
        }
    }
}

/// Options accepted by the bundle executor.
///
/// Field names follow the task runner's camelCase convention in every file
/// format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorOptions {
    /// Remove `<project>/dist` before building.
    #[serde(default)]
    pub clean: bool,

    #[serde(default)]
    pub build_type: BuildType,

    /// Mirror the source tree instead of chunking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_modules: Option<bool>,

    /// Down-level modern syntax for consumers with older toolchains.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_modern_syntax: Option<bool>,

    /// Manifest path relative to the project directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_json_path: Option<PathBuf>,
}

impl ExecutorOptions {
    pub fn new(build_type: BuildType) -> Self {
        Self {
            build_type,
            ..Self::default()
        }
    }

    pub fn clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub fn preserve_modules(mut self, enabled: bool) -> Self {
        self.preserve_modules = Some(enabled);
        self
    }

    pub fn transform_modern_syntax(mut self, enabled: bool) -> Self {
        self.transform_modern_syntax = Some(enabled);
        self
    }

    pub fn package_json_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.package_json_path = Some(path.into());
        self
    }

    pub fn preserves_modules(&self) -> bool {
        self.preserve_modules.unwrap_or(false)
    }

    pub fn transforms_modern_syntax(&self) -> bool {
        self.transform_modern_syntax.unwrap_or(false)
    }
}

/// Base options plus named overrides, as stored on a build target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetOptions {
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub options: Value,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub configurations: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_configuration: Option<String>,
}

impl TargetOptions {
    /// Resolve options for `configuration`, or the default configuration
    /// when `None`.
    pub fn materialize(&self, configuration: Option<&str>) -> Result<ExecutorOptions> {
        let mut options = if self.options.is_null() {
            Value::Object(Map::new())
        } else {
            self.options.clone()
        };
        apply_configuration(
            &mut options,
            &self.configurations,
            configuration.or(self.default_configuration.as_deref()),
        )?;

        serde_json::from_value(options).map_err(|e| ConfigError::InvalidValue {
            field: "options".to_string(),
            hint: e.to_string(),
        })
    }
}

/// Merge the overrides of configuration `name` into `options`.
pub(crate) fn apply_configuration(
    options: &mut Value,
    configurations: &Map<String, Value>,
    name: Option<&str>,
) -> Result<()> {
    let Some(name) = name else {
        return Ok(());
    };

    let overrides = configurations
        .get(name)
        .ok_or_else(|| ConfigError::UnknownConfiguration {
            name: name.to_string(),
            available: configurations
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
        })?;
    merge_values(options, overrides);
    Ok(())
}

/// Deep merge `update` into `target`. Objects merge key by key; anything
/// else replaces.
pub fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_values(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target_slot, _) => {
            *target_slot = update.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = ExecutorOptions::default();
        assert!(!options.clean);
        assert_eq!(options.build_type, BuildType::Release);
        assert!(!options.preserves_modules());
        assert!(!options.transforms_modern_syntax());
    }

    #[test]
    fn test_deserializes_task_runner_options() {
        let options: ExecutorOptions = serde_json::from_value(json!({
            "clean": true,
            "buildType": "debug",
            "preserveModules": true,
            "packageJsonPath": "npm/package.json"
        }))
        .unwrap();

        assert!(options.clean);
        assert_eq!(options.build_type, BuildType::Debug);
        assert!(options.preserves_modules());
        assert_eq!(options.package_json_path, Some(PathBuf::from("npm/package.json")));
    }

    #[test]
    fn test_build_type_from_str() {
        assert_eq!("release".parse::<BuildType>().unwrap(), BuildType::Release);
        assert_eq!("DEBUG".parse::<BuildType>().unwrap(), BuildType::Debug);
        assert!("production".parse::<BuildType>().is_err());
    }

    #[test]
    fn test_materialize_default_configuration() {
        let target: TargetOptions = serde_json::from_value(json!({
            "options": { "clean": true, "buildType": "release", "preserveModules": true },
            "configurations": {
                "development": { "buildType": "debug" },
                "production": { "buildType": "release" }
            },
            "defaultConfiguration": "development"
        }))
        .unwrap();

        let options = target.materialize(None).unwrap();
        assert_eq!(options.build_type, BuildType::Debug);
        assert!(options.clean);
        assert!(options.preserves_modules());

        let options = target.materialize(Some("production")).unwrap();
        assert_eq!(options.build_type, BuildType::Release);
    }

    #[test]
    fn test_materialize_unknown_configuration() {
        let target = TargetOptions {
            options: json!({}),
            configurations: Map::new(),
            default_configuration: None,
        };

        let err = target.materialize(Some("staging")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownConfiguration { .. }));
        assert!(target.materialize(None).is_ok());
    }

    #[test]
    fn test_merge_values_nested() {
        let mut base = json!({ "a": { "b": 1, "c": 2 }, "list": [1, 2] });
        merge_values(&mut base, &json!({ "a": { "c": 3 }, "list": [3] }));
        assert_eq!(base, json!({ "a": { "b": 1, "c": 3 }, "list": [3] }));
    }
}
