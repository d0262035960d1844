//! The logical-identifier mapping accumulated over a pass, and the
//! loader-configuration statement generated from it.

use std::path::{Component, Path};

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Insertion-ordered map from original logical module identifier to its
/// hashed replacement.
///
/// Serializes as a plain JSON object in insertion order, so the emitted
/// mapping literal lists modules in the order they were processed.
#[derive(Debug, Clone, Default)]
pub struct PathMap {
    entries: Vec<(String, String)>,
}

impl PathMap {
    pub fn new() -> Self {
        PathMap::default()
    }

    /// Records `from -> to`. Identifiers are unique per pass (each comes
    /// from exactly one renamed file), so no dedup is attempted.
    pub fn insert(&mut self, from: String, to: String) {
        self.entries.push((from, to));
    }

    pub fn get(&self, from: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == from)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str()))
    }
}

impl Serialize for PathMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (from, to) in &self.entries {
            map.serialize_entry(from, to)?;
        }
        map.end()
    }
}

/// Wrapper giving the mapping its wire shape: one `*` key covering every
/// module prefix.
struct StarMap<'a>(&'a PathMap);

impl Serialize for StarMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("*", self.0)?;
        map.end()
    }
}

/// The loader-configuration statement appended to the main config file.
///
/// `namespace`, when non-empty, prefixes the call: a build that loads
/// RequireJS under a namespace configures it through that object.
///
/// ## Examples
///
/// ```rust
/// use cachet_lib::mapping::{mapping_statement, PathMap};
///
/// let mut map = PathMap::new();
/// map.insert("app".to_string(), "app-5017e000".to_string());
///
/// assert_eq!(
///     mapping_statement("", &map),
///     r#"requirejs.config({ map: {"*":{"app":"app-5017e000"}} });"#
/// );
/// assert_eq!(
///     mapping_statement("myApp", &map),
///     r#"myApp.requirejs.config({ map: {"*":{"app":"app-5017e000"}} });"#
/// );
/// ```
pub fn mapping_statement(namespace: &str, map: &PathMap) -> String {
    let prefix = if namespace.is_empty() {
        String::new()
    } else {
        format!("{namespace}.")
    };
    let literal = serde_json::to_string(&StarMap(map))
        .expect("serializing a map of strings cannot fail");
    format!("{prefix}requirejs.config({{ map: {literal} }});")
}

/// Identifier of a module relative to the loader-config directory: the
/// bare stem when the file sits next to the config, otherwise the
/// relative directory plus `/` plus the stem, with `/` separators
/// regardless of platform.
pub fn relative_module_id(base_dir: &Path, file_dir: &Path, stem: &str) -> String {
    let rel = relative_dir(base_dir, file_dir);
    if rel.is_empty() {
        stem.to_string()
    } else {
        format!("{rel}/{stem}")
    }
}

/// Relative path from `base` to `dest`, component-wise. Empty when the
/// directories are equal.
fn relative_dir(base: &Path, dest: &Path) -> String {
    let base: Vec<Component> = normal_components(base);
    let dest: Vec<Component> = normal_components(dest);
    let common = base
        .iter()
        .zip(dest.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = base[common..].iter().map(|_| "..".to_string()).collect();
    parts.extend(
        dest[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}

fn normal_components(path: &Path) -> Vec<Component<'_>> {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
