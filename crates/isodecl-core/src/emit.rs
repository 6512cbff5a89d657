//! Final declaration text: CommonJS patch and declaration source maps.
//!
//! Declaration maps carry the transformer's `mappings` unchanged. Specifier
//! rewrites happen after the transform, so on a line where a specifier
//! changed length the columns after it are off by the difference. Lines and
//! everything before the edit stay exact.

use crate::paths;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// A declaration ready to be written by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmittedDeclaration {
    /// Output path: the emission name joined with the output root.
    pub path: String,
    pub text: String,
    /// Source map JSON, written next to `path` with a `.map` suffix.
    pub map: Option<String>,
}

impl EmittedDeclaration {
    /// Path of the source map file.
    pub fn map_path(&self) -> String {
        format!("{}.map", self.path)
    }
}

static CJS_DEFAULT_EXPORT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"((?:^|[;}])\s*export\s*)(?:\{\s*([\w$]+)\s*as\s+default\s*\}|default\s+([\w$]+))",
    )
    .ok()
});

/// Words that start a declaration rather than name a binding.
const DECLARATION_KEYWORDS: &[&str] = &[
    "abstract",
    "async",
    "class",
    "const",
    "declare",
    "enum",
    "function",
    "interface",
    "let",
    "namespace",
    "type",
    "var",
];

/// Rewrite the first `export default X` or `export { X as default }` into
/// `export = X` so CommonJS consumers see the binding itself.
pub fn patch_cjs_default_export(source: &str) -> String {
    let Some(re) = CJS_DEFAULT_EXPORT.as_ref() else {
        return source.to_string();
    };

    for captures in re.captures_iter(source) {
        let Some(name) = captures.get(2).or_else(|| captures.get(3)) else {
            continue;
        };
        if DECLARATION_KEYWORDS.contains(&name.as_str()) {
            continue;
        }
        let (Some(whole), Some(prefix)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        return format!(
            "{}{}= {}{}",
            &source[..whole.start()],
            prefix.as_str(),
            name.as_str(),
            &source[whole.end()..]
        );
    }
    source.to_string()
}

/// Source map JSON for a declaration at `dts` generated from `source`.
pub fn generate_dts_map(mappings: &str, source: &str, dts: &str) -> String {
    let sources = paths::relative(&paths::dirname(dts), source);
    serde_json::json!({
        "version": 3,
        "file": paths::basename(dts),
        "sourceRoot": "",
        "sources": [sources],
        "names": [],
        "mappings": mappings,
    })
    .to_string()
}

/// Append the `sourceMappingURL` comment pointing at `<dts>.map`.
pub fn append_map_url(code: &str, dts: &str) -> String {
    format!("{code}\n//# sourceMappingURL={}.map", paths::basename(dts))
}

/// Drop a trailing `sourceMappingURL` comment added by a transformer.
pub fn strip_map_url(code: &str) -> &str {
    match code.trim_end_matches('\n').rsplit_once('\n') {
        Some((head, last)) if last.starts_with("//# sourceMappingURL=") => head,
        None if code.starts_with("//# sourceMappingURL=") => "",
        _ => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_default_identifier() {
        let source = "declare const foo: number;\nexport default foo;\n";
        assert_eq!(
            patch_cjs_default_export(source),
            "declare const foo: number;\nexport = foo;\n"
        );
    }

    #[test]
    fn test_patch_named_default() {
        let source = "declare function bar(): void;\nexport { bar as default };\n";
        assert_eq!(
            patch_cjs_default_export(source),
            "declare function bar(): void;\nexport = bar;\n"
        );
    }

    #[test]
    fn test_patch_skips_declarations() {
        let source = "export default function foo(): void;\n";
        assert_eq!(patch_cjs_default_export(source), source);

        let source = "export default class Foo {}\nexport default Foo;";
        assert_eq!(
            patch_cjs_default_export(source),
            "export default class Foo {}\nexport = Foo;"
        );
    }

    #[test]
    fn test_patch_only_first() {
        let source = "export default a;export default b;";
        assert_eq!(patch_cjs_default_export(source), "export = a;export default b;");
    }

    #[test]
    fn test_generate_dts_map() {
        let map = generate_dts_map("AAAA", "/p/src/a.ts", "/p/dist/a.d.ts");
        let value: serde_json::Value = serde_json::from_str(&map).unwrap();
        assert_eq!(value["version"], 3);
        assert_eq!(value["file"], "a.d.ts");
        assert_eq!(value["sourceRoot"], "");
        assert_eq!(value["sources"][0], "../src/a.ts");
        assert_eq!(value["names"].as_array().unwrap().len(), 0);
        assert_eq!(value["mappings"], "AAAA");
    }

    #[test]
    fn test_map_url() {
        assert_eq!(
            append_map_url("export {};", "dist/a.d.ts"),
            "export {};\n//# sourceMappingURL=a.d.ts.map"
        );
        assert_eq!(
            strip_map_url("export {};\n//# sourceMappingURL=a.d.ts.map\n"),
            "export {};"
        );
        assert_eq!(strip_map_url("export {};\n"), "export {};\n");
    }
}
