//! One declaration build: transform queue, output registry and emission.

use crate::buffer::DeclarationBuffer;
use crate::emit::{self, EmittedDeclaration};
use crate::error::{Error, Result};
use crate::host::{DeclarationTransformer, ModuleParser, ModuleResolver};
use crate::imports::{collect_imports, type_only_imports, ImportRecord, ModuleStatement};
use crate::naming::OutputNamer;
use crate::options::ResolvedOptions;
use crate::paths;
use crate::rewrite::rewrite;
use isodecl_fs::FileSystem;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;

/// The backend implementations a session drives.
#[derive(Clone)]
pub struct Collaborators {
    pub fs: Arc<dyn FileSystem>,
    pub transformer: Arc<dyn DeclarationTransformer>,
    pub parser: Arc<dyn ModuleParser>,
    pub resolver: Arc<dyn ModuleResolver>,
}

/// Declaration output of one module, before rewriting.
#[derive(Debug, Clone)]
pub struct ModuleOutput {
    pub source_path: String,
    pub buffer: DeclarationBuffer,
    pub records: Vec<ImportRecord>,
    /// Source map `mappings` from the transformer.
    pub map: Option<String>,
}

/// A build session.
///
/// Modules are transformed at most once, keyed by their extension-stripped
/// path; the first module to claim a key wins. Type-only imports of every
/// transformed module are followed through an explicit work queue, since a
/// bundler's runtime graph does not contain them.
pub struct BuildSession {
    host: Collaborators,
    options: ResolvedOptions,
    /// Also follow value imports, standing in for a bundler's module graph.
    follow_value_imports: bool,
    outputs: BTreeMap<String, ModuleOutput>,
    claimed: HashSet<String>,
    queue: VecDeque<String>,
    entries: HashSet<String>,
    warnings: Vec<String>,
}

impl BuildSession {
    pub fn new(host: Collaborators, options: ResolvedOptions) -> Self {
        Self {
            host,
            options,
            follow_value_imports: false,
            outputs: BTreeMap::new(),
            claimed: HashSet::new(),
            queue: VecDeque::new(),
            entries: HashSet::new(),
            warnings: Vec::new(),
        }
    }

    /// Follow every in-scope import, not only type-only ones.
    ///
    /// Hosts without their own module graph (the CLI) enable this.
    pub fn follow_value_imports(mut self, follow: bool) -> Self {
        self.follow_value_imports = follow;
        self
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    /// Downgraded transform errors, in the order they occurred.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Recorded outputs keyed by module key.
    pub fn outputs(&self) -> &BTreeMap<String, ModuleOutput> {
        &self.outputs
    }

    /// Queue an entry module. Entries that cannot be read fail the build.
    pub fn add_entry(&mut self, path: &str) {
        let path = paths::normalize(path);
        self.entries.insert(paths::module_key(&path));
        self.enqueue(path);
    }

    /// Claim `path` and queue it. `false` when already claimed.
    fn enqueue(&mut self, path: String) -> bool {
        if !self.claimed.insert(paths::module_key(&path)) {
            return false;
        }
        self.queue.push_back(path);
        true
    }

    /// Drain the work queue.
    ///
    /// # Errors
    ///
    /// Fails on the first fatal module error: an unreadable entry, a
    /// transform error without `ignore_errors`, or unparsable declaration
    /// text.
    pub async fn run(&mut self) -> Result<()> {
        while let Some(id) = self.queue.pop_front() {
            let key = paths::module_key(&id);
            let code = match self.host.fs.read_to_string(Path::new(&id)).await {
                Ok(code) => code,
                Err(err) if self.entries.contains(&key) => return Err(Error::Io(err)),
                Err(err) => {
                    tracing::debug!(id = %id, error = %err, "skip unreadable dependency");
                    continue;
                }
            };
            self.process(&id, &code).await?;
        }
        Ok(())
    }

    /// Transform one module whose source the host already has, then drain
    /// the dependencies it discovers.
    ///
    /// # Errors
    ///
    /// See [`BuildSession::run`].
    pub async fn transform_module(&mut self, id: &str, code: &str) -> Result<()> {
        let id = paths::normalize(id);
        let key = paths::module_key(&id);
        if self.outputs.contains_key(&key) {
            return Ok(());
        }
        self.claimed.insert(key);
        self.process(&id, code).await?;
        self.run().await
    }

    async fn process(&mut self, id: &str, code: &str) -> Result<()> {
        let key = paths::module_key(id);
        if self.outputs.contains_key(&key) {
            return Ok(());
        }

        let source = match self.host.parser.parse(id, code).await {
            Ok(statements) => Some(statements),
            Err(err) => {
                tracing::debug!(id, error = %err, "cannot parse");
                None
            }
        };

        tracing::debug!(transformer = self.host.transformer.name(), id, "transform");
        let result = self
            .host
            .transformer
            .transform(id, code, self.options.source_map)
            .await;
        if let Some(first) = result.errors.first() {
            if self.options.ignore_errors {
                tracing::warn!(id, error = %first, "declaration transform failed");
                self.warnings.push(format!("{id}: {first}"));
            } else {
                return Err(Error::Transform {
                    id: id.to_string(),
                    message: first.clone(),
                });
            }
        }

        let code = emit::strip_map_url(&result.code);
        let declaration = self.host.parser.parse(id, code).await?;
        let mut buffer = DeclarationBuffer::new(code);
        let mut records = collect_imports(&declaration);
        self.prepare_records(id, &mut buffer, &mut records).await;

        self.outputs.entry(key).or_insert(ModuleOutput {
            source_path: id.to_string(),
            buffer,
            records,
            map: result.map,
        });

        if let Some(statements) = source {
            self.walk_dependencies(id, &statements).await;
        }
        Ok(())
    }

    /// Apply the rewrite hook and attach resolution results to the records.
    async fn prepare_records(
        &self,
        id: &str,
        buffer: &mut DeclarationBuffer,
        records: &mut [ImportRecord],
    ) {
        for record in records.iter_mut() {
            if let Some(hook) = &self.options.rewrite_imports {
                if let Some(replaced) = hook(&record.specifier, id) {
                    if replaced != record.specifier {
                        if buffer.overwrite(record.start, record.end, replaced.as_str()) {
                            record.original =
                                Some(std::mem::replace(&mut record.specifier, replaced));
                        } else {
                            tracing::warn!(
                                id,
                                specifier = %record.specifier,
                                "specifier span rejected, hook result dropped"
                            );
                        }
                    }
                }
            }
            if !record.is_relative() {
                continue;
            }

            let Some(resolved) = self
                .host
                .resolver
                .resolve(record.lookup_specifier(), id)
                .await
            else {
                continue;
            };
            if resolved.external || !self.options.filter.matches(&resolved.id) {
                continue;
            }

            let target = paths::normalize(&resolved.id);
            if self.options.policy.auto_add_exts {
                record.suffix = index_suffix(id, &record.specifier, &target);
            }
            record.resolved = Some(target);
        }
    }

    async fn walk_dependencies(&mut self, id: &str, statements: &[ModuleStatement]) {
        let sources: Vec<String> = if self.follow_value_imports {
            statements
                .iter()
                .filter(|statement| statement.references_module())
                .filter_map(|statement| statement.source.as_ref())
                .map(|source| source.value.clone())
                .collect()
        } else {
            type_only_imports(statements)
                .into_iter()
                .map(|source| source.value.clone())
                .collect()
        };

        for specifier in sources {
            let Some(resolved) = self.host.resolver.resolve(&specifier, id).await else {
                continue;
            };
            if resolved.external || !self.options.filter.matches(&resolved.id) {
                continue;
            }
            let target = paths::normalize(&resolved.id);
            if self.enqueue(target.clone()) {
                tracing::debug!(from = id, id = %target, "transform type import");
            }
        }
    }

    /// Rewrite every output and produce the files to write.
    ///
    /// `out_root` is joined in front of each emission name; pass `""` for
    /// root-relative paths.
    pub fn finish(self, namer: &OutputNamer<'_>, out_root: &str) -> Vec<EmittedDeclaration> {
        let options = self.options;
        self.outputs
            .into_values()
            .map(|mut output| {
                let name = rewrite(
                    &mut output.buffer,
                    &output.records,
                    namer,
                    &output.source_path,
                    options.policy,
                );
                let path = if out_root.is_empty() {
                    name
                } else {
                    paths::join(out_root, &name)
                };

                let mut text = output.buffer.to_string();
                if options.patch_cjs_default_export && path.ends_with(".d.cts") {
                    text = emit::patch_cjs_default_export(&text);
                }

                let map = match (options.source_map, output.map) {
                    (true, Some(mappings)) => {
                        text = emit::append_map_url(&text, &path);
                        Some(emit::generate_dts_map(&mappings, &output.source_path, &path))
                    }
                    _ => None,
                };

                tracing::debug!(path = %path, "emit dts file");
                EmittedDeclaration { path, text, map }
            })
            .collect()
    }
}

/// `/index` when `specifier` names a directory whose `index` module it
/// resolved to.
fn index_suffix(importer: &str, specifier: &str, target: &str) -> Option<String> {
    if paths::has_script_extension(specifier) {
        return None;
    }
    let lexical = paths::module_key(&paths::resolve(&paths::dirname(importer), specifier));
    let target_key = paths::module_key(target);
    (target_key == paths::join(&lexical, "index")).then(|| "/index".to_string())
}
