use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use cpv_util::errors::{CpvError, CpvResult};

use crate::{CONFIG_FILE, DEFAULT_MANIFEST_FILE};

/// Settings loaded from `cpv.toml` at the repository root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpvConfig {
    #[serde(default = "default_manifest_file", rename = "manifest-file")]
    pub manifest_file: String,

    /// Descriptor extensions to scan, without the leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Glob patterns, relative to the root, for descriptors to leave alone.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub dialect: Dialect,
}

impl Default for CpvConfig {
    fn default() -> Self {
        Self {
            manifest_file: default_manifest_file(),
            extensions: default_extensions(),
            exclude: default_exclude(),
            dialect: Dialect::default(),
        }
    }
}

fn default_manifest_file() -> String {
    DEFAULT_MANIFEST_FILE.to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["csproj".to_string()]
}

fn default_exclude() -> Vec<String> {
    vec!["**/bin/**".to_string(), "**/obj/**".to_string()]
}

/// Tag and attribute names identifying references and centralized entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialect {
    #[serde(rename = "root-tag")]
    pub root_tag: String,
    #[serde(rename = "group-tag")]
    pub group_tag: String,
    #[serde(rename = "reference-tag")]
    pub reference_tag: String,
    #[serde(rename = "version-tag")]
    pub version_tag: String,
    #[serde(rename = "name-attribute")]
    pub name_attribute: String,
    #[serde(rename = "version-attribute")]
    pub version_attribute: String,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            root_tag: "Project".to_string(),
            group_tag: "ItemGroup".to_string(),
            reference_tag: "PackageReference".to_string(),
            version_tag: "PackageVersion".to_string(),
            name_attribute: "Include".to_string(),
            version_attribute: "Version".to_string(),
        }
    }
}

impl CpvConfig {
    /// Load configuration for `root`.
    ///
    /// An explicit path must exist. Without one, `<root>/cpv.toml` is used
    /// when present and defaults otherwise.
    pub fn load(root: &Path, explicit: Option<&Path>) -> CpvResult<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(CpvError::Config {
                        message: format!("config file {} does not exist", path.display()),
                    }
                    .into());
                }
                path.to_path_buf()
            }
            None => {
                let candidate = root.join(CONFIG_FILE);
                if !candidate.is_file() {
                    return Ok(Self::default());
                }
                candidate
            }
        };
        tracing::debug!("Loading configuration from {}", path.display());
        Self::from_path(&path)
    }

    pub fn from_path(path: &Path) -> CpvResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CpvError::Config {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::parse(&content).map_err(Into::into)
    }

    pub fn parse(content: &str) -> Result<Self, CpvError> {
        let config: Self = toml::from_str(content).map_err(|e| CpvError::Config {
            message: format!("failed to parse {CONFIG_FILE}: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), CpvError> {
        if self.manifest_file.trim().is_empty() {
            return Err(CpvError::Config {
                message: "manifest-file must not be empty".to_string(),
            });
        }
        if self.extensions.is_empty() {
            return Err(CpvError::Config {
                message: "extensions must list at least one descriptor extension".to_string(),
            });
        }
        let d = &self.dialect;
        for (key, value) in [
            ("root-tag", &d.root_tag),
            ("group-tag", &d.group_tag),
            ("reference-tag", &d.reference_tag),
            ("version-tag", &d.version_tag),
            ("name-attribute", &d.name_attribute),
            ("version-attribute", &d.version_attribute),
        ] {
            if value.trim().is_empty() {
                return Err(CpvError::Config {
                    message: format!("dialect.{key} must not be empty"),
                });
            }
        }
        Ok(())
    }

    /// Compile `exclude` into a matcher.
    pub fn exclude_set(&self) -> Result<GlobSet, CpvError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude {
            let glob = Glob::new(pattern).map_err(|e| CpvError::Config {
                message: format!("invalid exclude pattern '{pattern}': {e}"),
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| CpvError::Config {
            message: format!("invalid exclude patterns: {e}"),
        })
    }

    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        root.join(&self.manifest_file)
    }
}
