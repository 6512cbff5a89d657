//! Build options and their validated form.

use crate::error::{Error, Result};
use crate::naming::{DeclarationExtension, NameTemplate};
use crate::paths;
use crate::rewrite::RewritePolicy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Default include pattern: JavaScript and TypeScript modules.
pub const DEFAULT_INCLUDE: &str = r"\.[cm]?[jt]sx?$";

/// Default exclude pattern.
pub const DEFAULT_EXCLUDE: &str = "node_modules";

/// User hook applied to every declaration specifier before resolution.
///
/// Called as `hook(specifier, importer)`; returning `Some` replaces the
/// visible specifier while the original is kept for resolution.
pub type RewriteImportsHook = Arc<dyn Fn(&str, &str) -> Option<String> + Send + Sync>;

/// Build a rewrite hook from a prefix table (`"@/" → "./src/"`).
///
/// The longest matching prefix wins. A prefix matches the whole specifier or
/// a leading path segment run.
pub fn prefix_rewrite_hook(table: BTreeMap<String, String>) -> RewriteImportsHook {
    let mut prefixes: Vec<(String, String)> = table.into_iter().collect();
    prefixes.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));

    Arc::new(move |specifier: &str, _importer: &str| {
        prefixes.iter().find_map(|(prefix, replacement)| {
            let rest = specifier.strip_prefix(prefix.as_str())?;
            if !(rest.is_empty() || prefix.ends_with('/') || rest.starts_with('/')) {
                return None;
            }
            Some(format!("{replacement}{rest}"))
        })
    })
}

/// Include/exclude filter over module paths.
///
/// A path passes when no exclude pattern matches and either no include
/// pattern is configured or one of them matches.
#[derive(Debug, Clone)]
pub struct SourceFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl SourceFilter {
    /// Compile include and exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] for the first pattern that does not
    /// compile.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Whether `id` should be transformed.
    pub fn matches(&self, id: &str) -> bool {
        let id = paths::to_slash(id);
        if self.exclude.iter().any(|re| re.is_match(&id)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|re| re.is_match(&id))
    }
}

impl Default for SourceFilter {
    fn default() -> Self {
        // Both patterns are literals known to compile.
        Self {
            include: compile(&[DEFAULT_INCLUDE]).unwrap_or_default(),
            exclude: compile(&[DEFAULT_EXCLUDE]).unwrap_or_default(),
        }
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern.as_ref()).map_err(|source| Error::InvalidPattern {
                pattern: pattern.as_ref().to_string(),
                source,
            })
        })
        .collect()
}

/// Options controlling one declaration build.
#[derive(Clone)]
pub struct Options {
    /// Regex patterns of modules to transform. Empty means the default.
    pub include: Vec<String>,
    /// Regex patterns of modules to skip. Empty means the default.
    pub exclude: Vec<String>,
    /// Output name template containing `[name]`.
    pub template: String,
    /// Explicit base directory instead of the entries' common ancestor.
    pub base_dir: Option<String>,
    /// Directory joined in front of the template.
    pub extra_outdir: Option<String>,
    /// Declaration extension for templates without a script extension and
    /// for JavaScript sources: `ts`, `mts` or `cts`.
    pub out_ext: String,
    pub auto_add_exts: bool,
    pub source_map: bool,
    pub ignore_errors: bool,
    /// Turn `export default X` into `export = X` in `.d.cts` output.
    pub patch_cjs_default_export: bool,
    pub rewrite_imports: Option<RewriteImportsHook>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            template: "[name].js".to_string(),
            base_dir: None,
            extra_outdir: None,
            out_ext: "ts".to_string(),
            auto_add_exts: false,
            source_map: false,
            ignore_errors: false,
            patch_cjs_default_export: false,
            rewrite_imports: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("template", &self.template)
            .field("base_dir", &self.base_dir)
            .field("extra_outdir", &self.extra_outdir)
            .field("out_ext", &self.out_ext)
            .field("auto_add_exts", &self.auto_add_exts)
            .field("source_map", &self.source_map)
            .field("ignore_errors", &self.ignore_errors)
            .field("patch_cjs_default_export", &self.patch_cjs_default_export)
            .field("rewrite_imports", &self.rewrite_imports.is_some())
            .finish()
    }
}

impl Options {
    /// Validate and compile the options.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a template without `[name]`, an
    /// invalid filter pattern, or an unknown output extension.
    pub fn resolve(self) -> Result<ResolvedOptions> {
        let filter = if self.include.is_empty() && self.exclude.is_empty() {
            SourceFilter::default()
        } else {
            let include = if self.include.is_empty() {
                vec![DEFAULT_INCLUDE.to_string()]
            } else {
                self.include
            };
            let exclude = if self.exclude.is_empty() {
                vec![DEFAULT_EXCLUDE.to_string()]
            } else {
                self.exclude
            };
            SourceFilter::new(include.as_slice(), exclude.as_slice())?
        };

        let mut template = NameTemplate::new(self.template)?;
        if let Some(dir) = self.extra_outdir.as_deref() {
            template = template.with_prefix(dir);
        }

        let out_ext =
            DeclarationExtension::from_out_ext(&self.out_ext).ok_or_else(|| Error::InvalidConfig {
                message: format!(
                    "unknown out_ext {:?}, expected one of ts, mts, cts",
                    self.out_ext
                ),
            })?;

        Ok(ResolvedOptions {
            filter,
            template,
            base_dir: self.base_dir,
            out_ext,
            policy: RewritePolicy {
                auto_add_exts: self.auto_add_exts,
            },
            source_map: self.source_map,
            ignore_errors: self.ignore_errors,
            patch_cjs_default_export: self.patch_cjs_default_export,
            rewrite_imports: self.rewrite_imports,
        })
    }
}

/// Validated options used by a [`BuildSession`](crate::session::BuildSession).
#[derive(Clone)]
pub struct ResolvedOptions {
    pub filter: SourceFilter,
    /// Template with any extra output directory already applied.
    pub template: NameTemplate,
    pub base_dir: Option<String>,
    pub out_ext: DeclarationExtension,
    pub policy: RewritePolicy,
    pub source_map: bool,
    pub ignore_errors: bool,
    pub patch_cjs_default_export: bool,
    pub rewrite_imports: Option<RewriteImportsHook>,
}

impl fmt::Debug for ResolvedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedOptions")
            .field("filter", &self.filter)
            .field("template", &self.template)
            .field("base_dir", &self.base_dir)
            .field("out_ext", &self.out_ext)
            .field("policy", &self.policy)
            .field("source_map", &self.source_map)
            .field("ignore_errors", &self.ignore_errors)
            .field("patch_cjs_default_export", &self.patch_cjs_default_export)
            .field("rewrite_imports", &self.rewrite_imports.is_some())
            .finish()
    }
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        Self {
            filter: SourceFilter::default(),
            template: NameTemplate::default(),
            base_dir: None,
            out_ext: DeclarationExtension::default(),
            policy: RewritePolicy::default(),
            source_map: false,
            ignore_errors: false,
            patch_cjs_default_export: false,
            rewrite_imports: None,
        }
    }
}
