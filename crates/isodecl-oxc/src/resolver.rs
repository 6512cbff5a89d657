//! Module resolution with `oxc_resolver`.

use async_trait::async_trait;
use isodecl_core::{paths, ModuleResolver, ResolvedModule};
use oxc_resolver::{AliasValue, ResolveOptions, Resolver};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::task;

/// Extensions tried for extensionless specifiers, TypeScript first.
const EXTENSIONS: &[&str] = &[
    ".ts", ".tsx", ".mts", ".cts", ".d.ts", ".js", ".jsx", ".mjs", ".cjs", ".json",
];

/// Resolver settings.
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    /// Specifier prefix → directory, e.g. `@` → `/project/src`.
    pub alias: BTreeMap<String, String>,
    /// Extra export conditions, tried before `types`, `import`, `require`
    /// and `default`.
    pub conditions: Vec<String>,
}

/// Resolves specifiers like a TypeScript-aware bundler.
///
/// `./a.js` finds `./a.ts`, directories resolve to their `index` module,
/// and anything inside `node_modules` is reported as external.
#[derive(Clone)]
pub struct OxcResolver {
    inner: Arc<Resolver>,
}

impl std::fmt::Debug for OxcResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OxcResolver").finish_non_exhaustive()
    }
}

impl Default for OxcResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl OxcResolver {
    pub fn new(config: ResolverConfig) -> Self {
        let to_strings = |exts: &[&str]| exts.iter().map(|ext| ext.to_string()).collect();

        let mut condition_names = config.conditions;
        condition_names.extend(
            ["types", "import", "require", "default"]
                .into_iter()
                .map(String::from),
        );

        let options = ResolveOptions {
            extensions: to_strings(EXTENSIONS),
            extension_alias: vec![
                (".js".to_string(), to_strings(&[".ts", ".tsx", ".d.ts", ".js"])),
                (".jsx".to_string(), to_strings(&[".tsx", ".jsx"])),
                (".mjs".to_string(), to_strings(&[".mts", ".d.mts", ".mjs"])),
                (".cjs".to_string(), to_strings(&[".cts", ".d.cts", ".cjs"])),
            ],
            alias: config
                .alias
                .into_iter()
                .map(|(prefix, dir)| (prefix, vec![AliasValue::Path(dir)]))
                .collect(),
            condition_names,
            // Keep ids lexical so they match entry paths.
            symlinks: false,
            ..ResolveOptions::default()
        };

        Self {
            inner: Arc::new(Resolver::new(options)),
        }
    }

    /// Resolve synchronously.
    pub fn resolve_sync(&self, specifier: &str, importer: &str) -> Option<ResolvedModule> {
        resolve_with(&self.inner, specifier, importer)
    }
}

fn resolve_with(resolver: &Resolver, specifier: &str, importer: &str) -> Option<ResolvedModule> {
    let dir = Path::new(importer).parent()?;
    match resolver.resolve(dir, specifier) {
        Ok(resolution) => {
            let id = paths::to_slash(&resolution.path().to_string_lossy());
            let external = id.contains("/node_modules/");
            Some(ResolvedModule { id, external })
        }
        Err(err) => {
            tracing::trace!(specifier, importer, error = %err, "unresolved");
            None
        }
    }
}

#[async_trait]
impl ModuleResolver for OxcResolver {
    async fn resolve(&self, specifier: &str, importer: &str) -> Option<ResolvedModule> {
        let resolver = Arc::clone(&self.inner);
        let specifier = specifier.to_string();
        let importer = importer.to_string();
        task::spawn_blocking(move || resolve_with(&resolver, &specifier, &importer))
            .await
            .ok()
            .flatten()
    }
}
