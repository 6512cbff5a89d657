//! Build orchestration: entry expansion, the declaration session, and
//! writing the results.

use crate::config::IsodeclConfig;
use anyhow::{bail, Context, Result};
use isodecl_core::{
    paths, BuildSession, EmittedDeclaration, EntryInput, EntryResolution, OutputNamer,
};
use isodecl_fs::{FileSystem, NativeFileSystem};
use isodecl_oxc::{collaborators, OxcResolver, OxcTransformer};
use serde::Serialize;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// Outcome of one build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub declarations: Vec<EmittedDeclaration>,
    /// Transform errors downgraded by `ignore_errors`.
    pub warnings: Vec<String>,
    /// Whether the declarations were written to disk.
    pub written: bool,
}

/// Expand glob patterns in a list of entries, relative to `cwd`.
///
/// Alias tables are returned unchanged.
pub fn expand_entries(input: &EntryInput, cwd: &Path) -> Result<EntryInput> {
    let EntryInput::List(list) = input else {
        return Ok(input.clone());
    };

    let mut expanded = Vec::new();
    for entry in list {
        if !entry.contains(['*', '?', '[']) {
            expanded.push(entry.clone());
            continue;
        }

        let pattern = cwd.join(entry);
        let pattern = pattern.to_string_lossy();
        let mut matched: Vec<String> = glob::glob(&pattern)
            .with_context(|| format!("Invalid entry pattern: {entry}"))?
            .filter_map(|path| path.ok())
            .filter(|path| path.is_file())
            .map(|path| paths::to_slash(&path.to_string_lossy()))
            .collect();
        if matched.is_empty() {
            bail!("No files match entry pattern: {entry}");
        }
        matched.sort();
        expanded.extend(matched);
    }
    Ok(EntryInput::List(expanded))
}

/// Run a build for `config` from `cwd`.
///
/// Reads are scoped to `cwd`. In write mode declarations go to
/// `config.out_dir`; otherwise they are only returned.
pub async fn run_build(config: &IsodeclConfig, cwd: &Path) -> Result<BuildReport> {
    if config.entries.is_empty() {
        bail!("No entries given. Pass entry paths or set `entries` in isodecl.toml.");
    }
    let options = config.options().resolve()?;
    let out_dir = match (&config.out_dir, config.write) {
        (Some(dir), _) => cwd.join(dir),
        (None, true) => return Err(isodecl_core::Error::MissingOutDir.into()),
        (None, false) => cwd.to_path_buf(),
    };

    let cwd_slash = paths::to_slash(&cwd.to_string_lossy());
    let input = expand_entries(&config.entries, cwd)?;
    let entries = EntryResolution::resolve(&input, options.base_dir.as_deref(), &cwd_slash);

    let fs = NativeFileSystem::new(cwd)
        .with_context(|| format!("Failed to open project root {}", cwd.display()))?;
    let host = collaborators(
        Arc::new(fs),
        OxcTransformer::new().strip_internal(config.strip_internal),
        OxcResolver::new(config.resolver_config(cwd)),
    );

    let template = options.template.clone();
    let out_ext = options.out_ext;
    let mut session = BuildSession::new(host, options).follow_value_imports(true);
    for entry in &entries.entries {
        session.add_entry(entry);
    }
    session.run().await.context("Declaration build failed")?;
    let warnings = session.warnings().to_vec();

    let namer = OutputNamer::new(&entries, &template).with_out_ext(out_ext);
    let out_root = paths::to_slash(&out_dir.to_string_lossy());
    let declarations = session.finish(&namer, &out_root);

    if config.write {
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;
        let out_fs = NativeFileSystem::new(&out_dir)
            .with_context(|| format!("Failed to open output directory {}", out_dir.display()))?;
        write_declarations(&out_fs, &declarations)
            .await
            .context("Failed to write declarations")?;
    }

    Ok(BuildReport {
        declarations,
        warnings,
        written: config.write,
    })
}

/// Write each declaration and its source map, creating parent directories.
pub async fn write_declarations(
    fs: &dyn FileSystem,
    declarations: &[EmittedDeclaration],
) -> io::Result<()> {
    for declaration in declarations {
        let path = Path::new(&declaration.path);
        if let Some(parent) = path.parent() {
            fs.create_dir_all(parent).await?;
        }
        fs.write(path, &declaration.text).await?;
        if let Some(map) = &declaration.map {
            fs.write(Path::new(&declaration.map_path()), map).await?;
        }
        tracing::debug!(path = %declaration.path, "wrote declaration");
    }
    Ok(())
}
