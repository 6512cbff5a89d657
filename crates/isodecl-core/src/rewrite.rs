//! Relative specifier rewriting inside declaration output.
//!
//! Declarations are emitted under their *emission* names, which can differ
//! from the source layout when entries carry aliases or the template adds a
//! folder per module. Every relative specifier is re-pointed at where its
//! target is actually emitted.

use crate::buffer::DeclarationBuffer;
use crate::imports::ImportRecord;
use crate::naming::OutputNamer;
use crate::paths;

/// Extension handling applied after the body is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewritePolicy {
    /// Give resolved specifiers an explicit runtime extension and translate
    /// TypeScript extensions to their JavaScript counterparts.
    pub auto_add_exts: bool,
}

/// Rewrite the relative specifiers of `source_path`'s declaration in place.
///
/// Returns the module's emission name. Specifiers that already reach their
/// target's emission are left as written.
pub fn rewrite(
    buffer: &mut DeclarationBuffer,
    records: &[ImportRecord],
    namer: &OutputNamer<'_>,
    source_path: &str,
    policy: RewritePolicy,
) -> String {
    let source_path = paths::normalize(source_path);
    let key = paths::module_key(&source_path);
    let emission_name = namer.emission_name(&source_path);

    let emission_dir = paths::dirname(&namer.emission_stem(&key));

    let source_dir = paths::dirname(&source_path);
    for record in records.iter().filter(|record| record.is_relative()) {
        let target = match &record.resolved {
            Some(resolved) => paths::normalize(resolved),
            None => paths::resolve(&source_dir, &record.specifier),
        };
        let target_key = paths::module_key(&target);

        let body = if namer.entries().alias_for(&target_key).is_some()
            || !lands_on_emission(namer, &emission_dir, &source_dir, record, &target_key)
        {
            emission_body(namer, &emission_dir, &target_key, &record.specifier)
        } else {
            match &record.suffix {
                Some(suffix) => format!("{}{suffix}", record.specifier.trim_end_matches('/')),
                None => record.specifier.clone(),
            }
        };

        let body = apply_extension_policy(body, record, namer, policy);
        let rewritten = ensure_relative_prefix(&paths::to_slash(&body));

        if rewritten == record.specifier {
            continue;
        }
        if buffer.overwrite(record.start, record.end, rewritten.as_str()) {
            tracing::trace!(
                from = %record.specifier,
                to = %rewritten,
                module = %source_path,
                "rewrite specifier"
            );
        } else {
            tracing::warn!(
                specifier = %record.specifier,
                start = record.start,
                end = record.end,
                module = %source_path,
                "specifier span rejected, left as written"
            );
        }
    }

    emission_name
}

/// Whether `record`, read from `emission_dir`, still reaches the emission
/// stem of `target_key`.
///
/// A specifier naming a directory counts as reaching that directory's
/// `index` module.
fn lands_on_emission(
    namer: &OutputNamer<'_>,
    emission_dir: &str,
    source_dir: &str,
    record: &ImportRecord,
    target_key: &str,
) -> bool {
    let written = paths::module_key(&paths::resolve(emission_dir, &record.specifier));
    let lexical = paths::module_key(&paths::resolve(source_dir, &record.specifier));
    let reached = if lexical != target_key && paths::join(&lexical, "index") == target_key {
        paths::join(&written, "index")
    } else {
        written
    };
    reached == namer.emission_stem(target_key)
}

/// Path from `emission_dir` to the emission stem of `target_key`.
fn emission_body(
    namer: &OutputNamer<'_>,
    emission_dir: &str,
    target_key: &str,
    specifier: &str,
) -> String {
    let stem = namer.emission_stem(target_key);
    let body = paths::join(
        &paths::relative(emission_dir, &paths::dirname(&stem)),
        &paths::basename(&stem),
    );

    if !paths::has_script_extension(specifier) {
        return body;
    }
    match namer
        .template()
        .runtime_extension()
        .or_else(|| paths::guess_counterpart_extension(specifier))
    {
        Some(ext) => format!("{body}{ext}"),
        None => body,
    }
}

fn apply_extension_policy(
    body: String,
    record: &ImportRecord,
    namer: &OutputNamer<'_>,
    policy: RewritePolicy,
) -> String {
    if !policy.auto_add_exts {
        return body;
    }

    if paths::has_script_extension(&body) {
        return translate_typescript_extension(body);
    }

    let Some(resolved) = &record.resolved else {
        return body;
    };
    match namer
        .template()
        .runtime_extension()
        .or_else(|| paths::guess_counterpart_extension(resolved))
    {
        Some(ext) => format!("{body}{ext}"),
        None => body,
    }
}

/// `./a.ts` → `./a.js`; declaration and JavaScript extensions are kept.
fn translate_typescript_extension(body: String) -> String {
    if [".d.ts", ".d.mts", ".d.cts"]
        .iter()
        .any(|ext| body.ends_with(ext))
    {
        return body;
    }
    let ext = paths::extname(&body);
    if !matches!(ext.as_str(), ".ts" | ".tsx" | ".mts" | ".cts") {
        return body;
    }
    match paths::guess_counterpart_extension(&body) {
        Some(counterpart) => format!("{}{counterpart}", &body[..body.len() - ext.len()]),
        None => body,
    }
}

/// Make a path usable as a relative ECMAScript specifier.
pub fn ensure_relative_prefix(path: &str) -> String {
    match path {
        "" | "." => "./".to_string(),
        ".." => "../".to_string(),
        _ if path.starts_with("./") || path.starts_with("../") => path.to_string(),
        _ => format!("./{path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryInput, EntryResolution};
    use crate::imports::{collect_imports, ModuleStatement, SourceLiteral, StatementKind};
    use crate::naming::NameTemplate;

    /// Build records for every `from "<specifier>"` in `text`.
    fn records_for(text: &str) -> Vec<ImportRecord> {
        let statements: Vec<ModuleStatement> = text
            .match_indices("from \"")
            .map(|(index, needle)| {
                let start = index + needle.len() - 1;
                let len = text[start + 1..].find('"').unwrap();
                ModuleStatement {
                    kind: StatementKind::Import,
                    source: Some(SourceLiteral {
                        value: text[start + 1..start + 1 + len].to_string(),
                        start,
                        end: start + len + 2,
                    }),
                    type_only: true,
                    specifiers: None,
                }
            })
            .collect();
        collect_imports(&statements)
    }

    fn map(pairs: &[(&str, &str)]) -> EntryInput {
        EntryInput::Map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn run(
        entries: &EntryResolution,
        template: &str,
        source_path: &str,
        text: &str,
        policy: RewritePolicy,
        resolve: impl Fn(&str) -> Option<String>,
    ) -> (String, String) {
        let template = NameTemplate::new(template).unwrap();
        let namer = OutputNamer::new(entries, &template);
        let mut records = records_for(text);
        for record in &mut records {
            record.resolved = resolve(&record.specifier);
        }
        let mut buffer = DeclarationBuffer::new(text);
        let name = rewrite(&mut buffer, &records, &namer, source_path, policy);
        (name, buffer.to_string())
    }

    #[test]
    fn test_alias_to_alias_uses_emission_directories() {
        let entries = EntryResolution::resolve(
            &map(&[("a", "src/a/index.ts"), ("b", "src/b/index.ts")]),
            None,
            "/p",
        );
        let text = "import type { B } from \"../b\";\n";

        let (name, out) = run(
            &entries,
            "[name]/index.js",
            "/p/src/a/index.ts",
            text,
            RewritePolicy::default(),
            |_| Some("/p/src/b/index.ts".to_string()),
        );
        assert_eq!(name, "a/index.d.ts");
        assert_eq!(out, "import type { B } from \"../b/index\";\n");

        let (_, out) = run(
            &entries,
            "[name]/index.js",
            "/p/src/a/index.ts",
            text,
            RewritePolicy { auto_add_exts: true },
            |_| Some("/p/src/b/index.ts".to_string()),
        );
        assert_eq!(out, "import type { B } from \"../b/index.js\";\n");
    }

    #[test]
    fn test_cross_entry_hop_ignores_source_depth() {
        let entries = EntryResolution::resolve(
            &map(&[("a", "src/x/a/index.ts"), ("b", "src/y/b/index.ts")]),
            None,
            "/p",
        );
        let text = "import type { B } from \"../../y/b/index\";\n";

        let (_, out) = run(
            &entries,
            "[name]/index.js",
            "/p/src/x/a/index.ts",
            text,
            RewritePolicy::default(),
            |_| None,
        );
        assert_eq!(out, "import type { B } from \"../b/index\";\n");
    }

    #[test]
    fn test_aliased_target_keeps_explicit_extension() {
        let entries = EntryResolution::resolve(
            &map(&[("a", "src/a/index.ts"), ("b", "src/b/index.ts")]),
            None,
            "/p",
        );
        let text = "export * from \"../b/index.ts\";\n";

        let (_, out) = run(
            &entries,
            "[name].mjs",
            "/p/src/a/index.ts",
            text,
            RewritePolicy::default(),
            |_| None,
        );
        assert_eq!(out, "export * from \"./b.mjs\";\n");
    }

    #[test]
    fn test_relocated_importer_offsets_unaliased_target() {
        let entries = EntryResolution::resolve(
            &map(&[("main", "src/app/main.ts"), ("other", "src/lib/other.ts")]),
            None,
            "/p",
        );
        let text = "import type { U } from \"./bar/utils\";\n";

        let (name, out) = run(
            &entries,
            "[name].js",
            "/p/src/app/main.ts",
            text,
            RewritePolicy::default(),
            |_| None,
        );
        assert_eq!(name, "main.d.ts");
        assert_eq!(out, "import type { U } from \"./app/bar/utils\";\n");
    }

    #[test]
    fn test_relocated_importer_with_template_directory() {
        let entries = EntryResolution::resolve(
            &map(&[("index", "src/foo/main.ts"), ("other", "src/lib/other.ts")]),
            None,
            "/p",
        );
        let text = "import type { U } from \"./bar/utils\";\n";

        let (name, out) = run(
            &entries,
            "types/[name].js",
            "/p/src/foo/main.ts",
            text,
            RewritePolicy::default(),
            |_| None,
        );
        assert_eq!(name, "types/index.d.ts");
        assert_eq!(out, "import type { U } from \"./foo/bar/utils\";\n");

        let (name, out) = run(
            &entries,
            "[name]/index.js",
            "/p/src/foo/main.ts",
            text,
            RewritePolicy::default(),
            |_| None,
        );
        assert_eq!(name, "index/index.d.ts");
        assert_eq!(out, "import type { U } from \"../foo/bar/utils/index\";\n");
    }

    #[test]
    fn test_folder_template_points_at_dependency_folder() {
        let entries = EntryResolution::resolve(
            &map(&[("a", "a/index.ts"), ("b", "b/index.ts")]),
            None,
            "/p",
        );
        let template = NameTemplate::new("[name]/index.js").unwrap();
        let namer = OutputNamer::new(&entries, &template);
        assert_eq!(
            namer.emission_name("/p/a/ComponentA/ComponentA.tsx"),
            "a/ComponentA/ComponentA/index.d.ts"
        );

        let text = "export { ComponentA } from \"./ComponentA/ComponentA\";\n";
        let resolve = |_: &str| Some("/p/a/ComponentA/ComponentA.tsx".to_string());

        let (name, out) = run(
            &entries,
            "[name]/index.js",
            "/p/a/index.ts",
            text,
            RewritePolicy::default(),
            resolve,
        );
        assert_eq!(name, "a/index.d.ts");
        assert_eq!(
            out,
            "export { ComponentA } from \"./ComponentA/ComponentA/index\";\n"
        );

        let policy = RewritePolicy { auto_add_exts: true };
        let (_, once) = run(&entries, "[name]/index.js", "/p/a/index.ts", text, policy, resolve);
        assert_eq!(
            once,
            "export { ComponentA } from \"./ComponentA/ComponentA/index.js\";\n"
        );
        let (_, twice) = run(&entries, "[name]/index.js", "/p/a/index.ts", &once, policy, resolve);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_folder_template_from_renamed_entry() {
        let entries = EntryResolution::resolve(
            &map(&[("index", "src/main.ts"), ("other", "src/lib/other.ts")]),
            None,
            "/p",
        );
        let text = "import type { U } from \"./util\";\n";

        let (name, out) = run(
            &entries,
            "[name]/index.js",
            "/p/src/main.ts",
            text,
            RewritePolicy::default(),
            |_| Some("/p/src/util.ts".to_string()),
        );
        assert_eq!(name, "index/index.d.ts");
        assert_eq!(out, "import type { U } from \"../util/index\";\n");
    }

    #[test]
    fn test_trailing_slash_directory_import() {
        let entries = EntryResolution::resolve(
            &EntryInput::List(vec!["src/main.ts".into()]),
            None,
            "/p",
        );
        let text = "import { C } from \"./components/\";\n";
        let template = NameTemplate::new("[name].js").unwrap();
        let namer = OutputNamer::new(&entries, &template);

        let mut records = records_for(text);
        records[0].resolved = Some("/p/src/components/index.ts".to_string());
        records[0].suffix = Some("/index".to_string());

        let mut buffer = DeclarationBuffer::new(text);
        rewrite(
            &mut buffer,
            &records,
            &namer,
            "/p/src/main.ts",
            RewritePolicy { auto_add_exts: true },
        );
        assert_eq!(
            buffer.to_string(),
            "import { C } from \"./components/index.js\";\n"
        );
    }

    #[test]
    fn test_overlapping_records_keep_first_edit() {
        let entries = EntryResolution::resolve(
            &map(&[("main", "src/app/main.ts"), ("other", "src/lib/other.ts")]),
            None,
            "/p",
        );
        let text = "import type { U } from \"./bar/utils\";\n";
        let template = NameTemplate::new("[name].js").unwrap();
        let namer = OutputNamer::new(&entries, &template);

        let mut records = records_for(text);
        let mut overlapping = records[0].clone();
        overlapping.end -= 1;
        records.push(overlapping);

        let mut buffer = DeclarationBuffer::new(text);
        rewrite(
            &mut buffer,
            &records,
            &namer,
            "/p/src/app/main.ts",
            RewritePolicy::default(),
        );
        assert_eq!(
            buffer.to_string(),
            "import type { U } from \"./app/bar/utils\";\n"
        );
    }

    #[test]
    fn test_unrelocated_modules_are_untouched() {
        let entries = EntryResolution::resolve(
            &EntryInput::List(vec!["src/main.ts".into()]),
            None,
            "/p",
        );
        let main = "import { U } from \"./util\";\n";
        let util = "import { H } from \"./deep/helper\";\n";

        let (name, out) = run(
            &entries,
            "[name].d.ts",
            "/p/src/main.ts",
            main,
            RewritePolicy::default(),
            |_| None,
        );
        assert_eq!(name, "main.d.ts");
        assert_eq!(out, main);

        let (name, out) = run(
            &entries,
            "[name].d.ts",
            "/p/src/util.ts",
            util,
            RewritePolicy::default(),
            |_| None,
        );
        assert_eq!(name, "util.d.ts");
        assert_eq!(out, util);
    }

    #[test]
    fn test_auto_add_uses_target_extension() {
        let entries = EntryResolution::resolve(
            &EntryInput::List(vec!["src/main.ts".into()]),
            None,
            "/p",
        );
        let text = "import { U } from \"./util\";\nimport { M } from \"./esm\";\nimport { C } from \"./legacy.cts\";\n";

        let (_, out) = run(
            &entries,
            "[name].d.ts",
            "/p/src/main.ts",
            text,
            RewritePolicy { auto_add_exts: true },
            |specifier| match specifier {
                "./util" => Some("/p/src/util.ts".to_string()),
                "./esm" => Some("/p/src/esm.mts".to_string()),
                "./legacy.cts" => Some("/p/src/legacy.cts".to_string()),
                _ => None,
            },
        );
        assert_eq!(
            out,
            "import { U } from \"./util.js\";\nimport { M } from \"./esm.mjs\";\nimport { C } from \"./legacy.cjs\";\n"
        );
    }

    #[test]
    fn test_unresolved_target_gets_no_extension() {
        let entries = EntryResolution::resolve(
            &EntryInput::List(vec!["src/main.ts".into()]),
            None,
            "/p",
        );
        let text = "import { U } from \"./missing\";\n";

        let (_, out) = run(
            &entries,
            "[name].js",
            "/p/src/main.ts",
            text,
            RewritePolicy { auto_add_exts: true },
            |_| None,
        );
        assert_eq!(out, text);
    }

    #[test]
    fn test_index_suffix_comes_before_extension() {
        let entries = EntryResolution::resolve(
            &EntryInput::List(vec!["src/main.ts".into()]),
            None,
            "/p",
        );
        let text = "import { C } from \"./components\";\n";
        let template = NameTemplate::new("[name].js").unwrap();
        let namer = OutputNamer::new(&entries, &template);

        let mut records = records_for(text);
        records[0].resolved = Some("/p/src/components/index.ts".to_string());
        records[0].suffix = Some("/index".to_string());

        let mut buffer = DeclarationBuffer::new(text);
        rewrite(
            &mut buffer,
            &records,
            &namer,
            "/p/src/main.ts",
            RewritePolicy { auto_add_exts: true },
        );
        assert_eq!(
            buffer.to_string(),
            "import { C } from \"./components/index.js\";\n"
        );
    }

    #[test]
    fn test_package_specifiers_are_ignored() {
        let entries = EntryResolution::resolve(
            &map(&[("main", "src/app/main.ts"), ("other", "src/lib/other.ts")]),
            None,
            "/p",
        );
        let text = "import type { X } from \"some-package\";\n";

        let (_, out) = run(
            &entries,
            "[name].js",
            "/p/src/app/main.ts",
            text,
            RewritePolicy { auto_add_exts: true },
            |_| Some("/p/node_modules/some-package/index.d.ts".to_string()),
        );
        assert_eq!(out, text);
    }

    #[test]
    fn test_rewrite_is_idempotent_for_correct_specifiers() {
        let entries = EntryResolution::resolve(
            &map(&[("a", "src/a/index.ts"), ("b", "src/b/index.ts")]),
            None,
            "/p",
        );
        let text = "import type { B } from \"../b\";\n";
        let resolve = |_: &str| Some("/p/src/b/index.ts".to_string());
        let policy = RewritePolicy { auto_add_exts: true };

        let (_, once) = run(&entries, "[name]/index.js", "/p/src/a/index.ts", text, policy, resolve);
        let (_, twice) = run(&entries, "[name]/index.js", "/p/src/a/index.ts", &once, policy, resolve);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_ensure_relative_prefix() {
        assert_eq!(ensure_relative_prefix("foo"), "./foo");
        assert_eq!(ensure_relative_prefix("./foo"), "./foo");
        assert_eq!(ensure_relative_prefix("../foo"), "../foo");
        assert_eq!(ensure_relative_prefix("."), "./");
        assert_eq!(ensure_relative_prefix(".."), "../");
        assert_eq!(ensure_relative_prefix(".hidden"), "./.hidden");
    }
}
