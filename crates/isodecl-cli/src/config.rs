//! `isodecl.toml` configuration.

use isodecl_core::{prefix_rewrite_hook, EntryInput, Options};
use isodecl_fs::{FileSystem, NativeFileSystem};
use isodecl_oxc::ResolverConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "isodecl.toml";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Config file not found at {0}")]
    ConfigNotFound(PathBuf),
}

/// Build configuration.
///
/// Every field has a default, so an empty file is valid. Command-line flags
/// are applied on top of the loaded values.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IsodeclConfig {
    /// Entry modules: a list of paths or glob patterns, or a table of
    /// alias → path.
    #[serde(default)]
    pub entries: EntryInput,

    /// Output name template containing `[name]`.
    #[serde(default = "default_template")]
    pub template: String,

    /// Directory declarations are written to.
    #[serde(default)]
    pub out_dir: Option<PathBuf>,

    /// Base directory for unaliased names instead of the entries' common
    /// ancestor.
    #[serde(default)]
    pub base_dir: Option<String>,

    /// Directory joined in front of the template.
    #[serde(default)]
    pub extra_outdir: Option<String>,

    /// `ts`, `mts` or `cts`.
    #[serde(default = "default_out_ext")]
    pub out_ext: String,

    #[serde(default)]
    pub auto_add_exts: bool,

    #[serde(default)]
    pub source_map: bool,

    #[serde(default)]
    pub ignore_errors: bool,

    #[serde(default)]
    pub patch_cjs_default_export: bool,

    /// Drop declarations tagged `@internal`.
    #[serde(default)]
    pub strip_internal: bool,

    /// Regex patterns of modules to transform.
    #[serde(default)]
    pub include: Vec<String>,

    /// Regex patterns of modules to skip.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Write files; when false the declarations are only printed.
    #[serde(default = "default_true")]
    pub write: bool,

    /// Specifier prefix → replacement, applied before resolution.
    #[serde(default)]
    pub rewrite_imports: BTreeMap<String, String>,

    #[serde(default)]
    pub resolve: ResolveSection,
}

/// `[resolve]` table.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResolveSection {
    /// Specifier prefix → directory, relative to the config's directory.
    #[serde(default)]
    pub alias: BTreeMap<String, String>,

    /// Extra package export conditions.
    #[serde(default)]
    pub conditions: Vec<String>,
}

impl Default for IsodeclConfig {
    fn default() -> Self {
        Self {
            entries: EntryInput::default(),
            template: default_template(),
            out_dir: None,
            base_dir: None,
            extra_outdir: None,
            out_ext: default_out_ext(),
            auto_add_exts: false,
            source_map: false,
            ignore_errors: false,
            patch_cjs_default_export: false,
            strip_internal: false,
            include: Vec::new(),
            exclude: Vec::new(),
            write: true,
            rewrite_imports: BTreeMap::new(),
            resolve: ResolveSection::default(),
        }
    }
}

impl IsodeclConfig {
    /// Load config from a specific path.
    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let path = std::path::absolute(path)?;
        let config_dir = path.parent().unwrap_or_else(|| Path::new("/"));
        let fs = NativeFileSystem::new(config_dir)?;
        Self::load_with_filesystem(&fs, &path).await
    }

    /// Load config through a custom filesystem.
    pub async fn load_with_filesystem(
        fs: &dyn FileSystem,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        if !fs.exists(path).await? {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let contents = fs.read_to_string(path).await?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load `isodecl.toml` from `dir`, or the defaults when there is none.
    pub async fn discover(dir: &Path) -> Result<Self, ConfigError> {
        match Self::load_from(&dir.join(CONFIG_FILE)).await {
            Err(ConfigError::ConfigNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Library options for this configuration.
    pub fn options(&self) -> Options {
        Options {
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            template: self.template.clone(),
            base_dir: self.base_dir.clone(),
            extra_outdir: self.extra_outdir.clone(),
            out_ext: self.out_ext.clone(),
            auto_add_exts: self.auto_add_exts,
            source_map: self.source_map,
            ignore_errors: self.ignore_errors,
            patch_cjs_default_export: self.patch_cjs_default_export,
            rewrite_imports: (!self.rewrite_imports.is_empty())
                .then(|| prefix_rewrite_hook(self.rewrite_imports.clone())),
        }
    }

    /// Resolver settings, with alias directories anchored at `root`.
    pub fn resolver_config(&self, root: &Path) -> ResolverConfig {
        ResolverConfig {
            alias: self
                .resolve
                .alias
                .iter()
                .map(|(prefix, dir)| {
                    (prefix.clone(), root.join(dir).to_string_lossy().into_owned())
                })
                .collect(),
            conditions: self.resolve.conditions.clone(),
        }
    }
}

fn default_template() -> String {
    "[name].js".to_string()
}

fn default_out_ext() -> String {
    "ts".to_string()
}

fn default_true() -> bool {
    true
}
