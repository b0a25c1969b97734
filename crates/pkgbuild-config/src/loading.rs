//! Layered executor option loading.
//!
//! Priority, lowest first:
//!
//! 1. built-in defaults
//! 2. `pkgbuild.toml` in the project directory
//! 3. the `pkgbuild` field of the project's `package.json`
//! 4. the selected named configuration from either file
//! 5. `PKGBUILD_*` environment variables
//! 6. explicit overrides (CLI flags)

// Option files are read before any runtime exists (CLI startup)
#![allow(clippy::disallowed_methods)]

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use pkgbuild_core::{Manifest, PACKAGE_JSON};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::options::{ExecutorOptions, apply_configuration};

/// Options file looked up in the project directory.
pub const OPTIONS_FILE: &str = "pkgbuild.toml";

/// Manifest field holding options.
pub const MANIFEST_FIELD: &str = "pkgbuild";

/// Prefix of option environment variables.
pub const ENV_PREFIX: &str = "PKGBUILD_";

/// Explicit overrides. `None` leaves the lower layers untouched.
///
/// Deserializes from snake_case keys (`PKGBUILD_BUILD_TYPE` becomes
/// `build_type`) and serializes to the camelCase option names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct OptionOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_type: Option<crate::BuildType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_modules: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform_modern_syntax: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_json_path: Option<PathBuf>,
}

/// Loads [`ExecutorOptions`] for one project.
///
/// # Example
///
/// ```no_run
/// use pkgbuild_config::{OptionOverrides, OptionsLoader};
///
/// let options = OptionsLoader::new("libs/ui")
///     .configuration("production")
///     .overrides(OptionOverrides { clean: Some(true), ..Default::default() })
///     .load()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct OptionsLoader {
    project_dir: PathBuf,
    configuration: Option<String>,
    overrides: OptionOverrides,
    use_env: bool,
}

impl OptionsLoader {
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            project_dir: project_dir.as_ref().to_path_buf(),
            configuration: None,
            overrides: OptionOverrides::default(),
            use_env: true,
        }
    }

    /// Select a named configuration.
    pub fn configuration(mut self, name: impl Into<String>) -> Self {
        self.configuration = Some(name.into());
        self
    }

    pub fn overrides(mut self, overrides: OptionOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Skip the environment layer.
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    pub fn load(&self) -> Result<ExecutorOptions> {
        let mut figment = Figment::new().merge(Serialized::defaults(ExecutorOptions::default()));

        let toml_path = self.project_dir.join(OPTIONS_FILE);
        if toml_path.exists() {
            debug!("Loading options from {}", toml_path.display());
            figment = figment.merge(Toml::file(&toml_path));
        }

        if let Some(field) = self.manifest_field()? {
            debug!("Loading options from {} field", MANIFEST_FIELD);
            figment = figment.merge(Serialized::defaults(field));
        }

        let mut document: Value = figment.extract().map_err(invalid)?;
        let configurations = take_configurations(&mut document)?;
        let selected = self
            .configuration
            .clone()
            .or_else(|| take_default_configuration(&mut document));
        apply_configuration(&mut document, &configurations, selected.as_deref())?;

        let env: OptionOverrides = if self.use_env {
            Figment::from(Env::prefixed(ENV_PREFIX))
                .extract()
                .map_err(invalid)?
        } else {
            OptionOverrides::default()
        };

        Figment::new()
            .merge(Serialized::defaults(document))
            .merge(Serialized::defaults(env))
            .merge(Serialized::defaults(&self.overrides))
            .extract()
            .map_err(invalid)
    }

    fn manifest_field(&self) -> Result<Option<Value>> {
        let path = self.project_dir.join(PACKAGE_JSON);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let mut manifest = Manifest::parse(&path, &content)?;
        Ok(manifest
            .extra
            .remove(MANIFEST_FIELD)
            .filter(|value| !value.is_null()))
    }
}

fn take_configurations(document: &mut Value) -> Result<Map<String, Value>> {
    let Some(object) = document.as_object_mut() else {
        return Ok(Map::new());
    };
    match object.remove("configurations") {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(ConfigError::InvalidValue {
            field: "configurations".to_string(),
            hint: format!("expected a table of named overrides, found {other}"),
        }),
    }
}

fn take_default_configuration(document: &mut Value) -> Option<String> {
    document
        .as_object_mut()?
        .remove("defaultConfiguration")
        .and_then(|value| value.as_str().map(str::to_string))
}

fn invalid(error: figment::Error) -> ConfigError {
    ConfigError::InvalidValue {
        field: "options".to_string(),
        hint: error.to_string(),
    }
}
