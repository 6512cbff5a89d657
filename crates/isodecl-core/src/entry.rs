//! Entry resolution: base directory and alias table.

use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared build inputs.
///
/// Deserializes from either a TOML/JSON array (`["src/index.ts"]`) or a table
/// of alias → path (`{ index = "src/main.ts" }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryInput {
    /// Plain list of entry paths. Every module is named by its base-relative
    /// path.
    List(Vec<String>),
    /// Alias name → entry path.
    Map(BTreeMap<String, String>),
}

impl Default for EntryInput {
    fn default() -> Self {
        EntryInput::List(Vec::new())
    }
}

impl EntryInput {
    /// Entry paths as declared.
    pub fn paths(&self) -> Vec<&str> {
        match self {
            EntryInput::List(list) => list.iter().map(String::as_str).collect(),
            EntryInput::Map(map) => map.values().map(String::as_str).collect(),
        }
    }

    /// Whether no entries are declared.
    pub fn is_empty(&self) -> bool {
        match self {
            EntryInput::List(list) => list.is_empty(),
            EntryInput::Map(map) => map.is_empty(),
        }
    }
}

/// Module key → declared alias.
///
/// Keys are absolute, forward-slash paths with their script extension
/// stripped (see [`paths::module_key`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: BTreeMap<String, String>,
}

impl AliasTable {
    /// Alias declared for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.aliases.get(key).map(String::as_str)
    }

    /// Number of aliased entries.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether no entry carries an alias.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Iterate `(key, alias)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Result of resolving the declared entries for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryResolution {
    /// `None` when entries were a plain list.
    pub alias_table: Option<AliasTable>,
    /// Origin for every unaliased output name.
    pub base_dir: String,
    /// Absolute, normalized entry paths (with extensions).
    pub entries: Vec<String>,
}

impl EntryResolution {
    /// Resolve declared entries.
    ///
    /// Relative entry paths and a relative `base_override` are resolved
    /// against `cwd`. Without an override the base directory is the lowest
    /// common ancestor of the entry paths.
    pub fn resolve(input: &EntryInput, base_override: Option<&str>, cwd: &str) -> Self {
        let entries: Vec<String> = input
            .paths()
            .into_iter()
            .map(|path| paths::resolve(cwd, path))
            .collect();

        let base_dir = match base_override {
            Some(base) if !base.is_empty() => paths::resolve(cwd, base),
            _ => paths::lowest_common_ancestor(&entries),
        };
        tracing::debug!(base_dir = %base_dir, "out base");

        let alias_table = match input {
            EntryInput::List(_) => None,
            EntryInput::Map(map) => {
                let aliases = map
                    .iter()
                    .filter_map(|(alias, path)| {
                        let key = paths::module_key(&paths::resolve(cwd, path));
                        let alias = paths::to_slash(alias);
                        // An alias equal to the base-relative name adds nothing.
                        if alias == paths::relative(&base_dir, &key) {
                            None
                        } else {
                            Some((key, alias))
                        }
                    })
                    .collect();
                Some(AliasTable { aliases })
            }
        };

        Self {
            alias_table,
            base_dir,
            entries,
        }
    }

    /// Name of `key` relative to the base directory.
    pub fn base_relative(&self, key: &str) -> String {
        paths::relative(&self.base_dir, key)
    }

    /// Alias that relocates `key`, ignoring aliases equal to its base-relative
    /// name.
    pub fn alias_for(&self, key: &str) -> Option<&str> {
        let alias = self.alias_table.as_ref()?.get(key)?;
        if alias == self.base_relative(key) {
            None
        } else {
            Some(alias)
        }
    }
}
