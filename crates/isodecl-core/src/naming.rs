//! Emission names: template substitution and declaration extensions.

use crate::entry::EntryResolution;
use crate::error::{Error, Result};
use crate::paths;

/// Output path template containing a `[name]` placeholder.
///
/// Mirrors a bundler's entry file name pattern, e.g. `[name].js`,
/// `[name]/index.js`, or `types/[name].mjs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    template: String,
}

impl NameTemplate {
    /// The placeholder replaced by a module's logical name.
    pub const PLACEHOLDER: &'static str = "[name]";

    /// Parse a template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTemplate`] if `[name]` is missing.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = paths::to_slash(&template.into());
        if !template.contains(Self::PLACEHOLDER) {
            return Err(Error::InvalidTemplate { template });
        }
        Ok(Self { template })
    }

    /// Prefix the template with a directory (the extra output directory).
    pub fn with_prefix(&self, dir: &str) -> Self {
        if dir.is_empty() {
            return self.clone();
        }
        Self {
            template: paths::join(dir, &self.template),
        }
    }

    /// The raw template.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Replace the placeholder with `logical`.
    pub fn substitute(&self, logical: &str) -> String {
        self.template.replace(Self::PLACEHOLDER, logical)
    }

    /// Extension of the emitted JavaScript named by this template, if the
    /// template carries one (`[name].mjs` → `.mjs`).
    pub fn runtime_extension(&self) -> Option<&'static str> {
        if is_declaration_name(&self.template) {
            return None;
        }
        paths::guess_counterpart_extension(&self.template)
    }
}

impl Default for NameTemplate {
    fn default() -> Self {
        Self {
            template: "[name].js".to_string(),
        }
    }
}

/// Declaration file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeclarationExtension {
    /// `.d.ts`
    #[default]
    Dts,
    /// `.d.mts`
    Dmts,
    /// `.d.cts`
    Dcts,
}

impl DeclarationExtension {
    /// The extension including its leading dot.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationExtension::Dts => ".d.ts",
            DeclarationExtension::Dmts => ".d.mts",
            DeclarationExtension::Dcts => ".d.cts",
        }
    }

    /// Declaration extension for a script extension, keeping the `m`/`c`
    /// module-kind infix.
    pub fn from_script_extension(ext: &str) -> Option<Self> {
        match ext {
            ".ts" | ".tsx" | ".js" | ".jsx" => Some(DeclarationExtension::Dts),
            ".mts" | ".mjs" => Some(DeclarationExtension::Dmts),
            ".cts" | ".cjs" => Some(DeclarationExtension::Dcts),
            _ => None,
        }
    }

    /// Parse a configured output extension such as `ts`, `mts`, `.cjs`.
    pub fn from_out_ext(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.');
        Self::from_script_extension(&format!(".{ext}"))
    }
}

fn is_declaration_name(name: &str) -> bool {
    [".d.ts", ".d.mts", ".d.cts"]
        .iter()
        .any(|ext| name.ends_with(ext))
}

/// Translate `name` to a declaration file name.
///
/// An existing declaration extension is kept, a script extension is
/// replaced (`.cjs` → `.d.cts`), and anything else gets `fallback` appended.
pub fn to_declaration_name(name: &str, fallback: DeclarationExtension) -> String {
    if is_declaration_name(name) {
        return name.to_string();
    }
    let ext = paths::extname(name);
    match DeclarationExtension::from_script_extension(&ext) {
        Some(decl) => format!("{}{}", &name[..name.len() - ext.len()], decl.as_str()),
        None => format!("{name}{}", fallback.as_str()),
    }
}

/// Computes where each module's declaration is emitted.
#[derive(Debug, Clone, Copy)]
pub struct OutputNamer<'a> {
    entries: &'a EntryResolution,
    template: &'a NameTemplate,
    out_ext: DeclarationExtension,
}

impl<'a> OutputNamer<'a> {
    /// Create a namer for one build.
    pub fn new(entries: &'a EntryResolution, template: &'a NameTemplate) -> Self {
        Self {
            entries,
            template,
            out_ext: DeclarationExtension::default(),
        }
    }

    /// Declaration extension used for JavaScript sources when the template
    /// has no script extension.
    pub fn with_out_ext(mut self, out_ext: DeclarationExtension) -> Self {
        self.out_ext = out_ext;
        self
    }

    /// The resolved entries this namer reads aliases from.
    pub fn entries(&self) -> &'a EntryResolution {
        self.entries
    }

    /// The template this namer substitutes into.
    pub fn template(&self) -> &'a NameTemplate {
        self.template
    }

    /// Alias for `key` when present, else its base-relative name.
    pub fn logical_name(&self, key: &str) -> String {
        match self.entries.alias_for(key) {
            Some(alias) => alias.to_string(),
            None => self.entries.base_relative(key),
        }
    }

    /// Template path for `key` with the script extension removed.
    ///
    /// This is the location specifiers point at.
    pub fn emission_stem(&self, key: &str) -> String {
        paths::strip_declarable_extension(&self.template.substitute(&self.logical_name(key)))
    }

    /// Final, template-relative emission path of `source_path`'s declaration.
    pub fn emission_name(&self, source_path: &str) -> String {
        let key = paths::module_key(source_path);
        let name = self.template.substitute(&self.logical_name(&key));
        to_declaration_name(&name, self.declaration_extension(source_path))
    }

    /// Declaration extension derived from the source: `.mts` → `.d.mts`,
    /// `.cts` → `.d.cts`, other TypeScript → `.d.ts`, JavaScript → the
    /// configured output extension.
    pub fn declaration_extension(&self, source_path: &str) -> DeclarationExtension {
        match paths::extname(source_path).as_str() {
            ".ts" | ".tsx" => DeclarationExtension::Dts,
            ".mts" => DeclarationExtension::Dmts,
            ".cts" => DeclarationExtension::Dcts,
            _ => self.out_ext,
        }
    }
}
