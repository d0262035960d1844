//! Options model for a fingerprint run.
//!
//! Field names mirror the option names of the host task runner, so an
//! existing options block can be dropped into a JSON file unchanged:
//!
//! ```json
//! {
//!   "algorithm": "md5",
//!   "length": 8,
//!   "separator": "-",
//!   "js": {
//!     "files": ["public/js/**/*.js"],
//!     "requireJsMainConfigFile": "public/js/common.js",
//!     "replaceRequireJsMainConfigFilePaths": ["public/index.html"],
//!     "excludeFiles": ["public/js/vendor.js"]
//!   }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{CachetError, Result};
use crate::hash::Algorithm;

/// Text encoding used when reading files for hashing and rewriting.
///
/// Only UTF-8 is accepted. The option keeps its place in the options file
/// so an unknown encoding fails loudly at parse time instead of deep
/// inside the pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Encoding {
    #[default]
    #[serde(rename = "utf8", alias = "utf-8")]
    Utf8,
}

/// Options for a single fingerprint pass.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Reserved by the host task runner; carried but unused by the pass.
    pub punctuation: String,
    pub algorithm: Algorithm,
    pub encoding: Encoding,
    /// Number of hex characters retained from the digest.
    pub length: usize,
    /// Joins the base name and the hash in renamed files.
    pub separator: String,
    pub js: JsOptions,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            punctuation: ".".to_string(),
            algorithm: Algorithm::Md5,
            encoding: Encoding::Utf8,
            length: 8,
            separator: "-".to_string(),
            js: JsOptions::default(),
        }
    }
}

/// The file-set descriptor nested under the `js` key.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JsOptions {
    /// Glob patterns for the input file set to hash and rename.
    pub files: Vec<String>,

    /// Path to the loader bootstrap file that receives the generated
    /// mapping statement and is re-hashed afterwards.
    #[serde(rename = "requireJsMainConfigFile")]
    pub require_js_main_config_file: String,

    /// Files to scan for stale references to the main config file.
    #[serde(rename = "replaceRequireJsMainConfigFilePaths")]
    pub replace_require_js_main_config_file_paths: Vec<String>,

    /// Paths skipped entirely: no hash, no rename, no mapping entry.
    #[serde(rename = "excludeFiles")]
    pub exclude_files: Vec<String>,

    /// Optional prefix for the generated mapping statement.
    #[serde(rename = "requirejsNamespace")]
    pub requirejs_namespace: String,
}

impl Options {
    /// Reads and parses a JSON options file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|source| CachetError::io(path, source))?;
        serde_json::from_str(&content).map_err(|source| CachetError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Longest suffix a hash rename can add to a file name. Reference
    /// files are scanned for the config path followed by up to this many
    /// non-whitespace characters.
    pub fn max_suffix_len(&self) -> usize {
        self.length + self.separator.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_host_runner_table() {
        let options = Options::default();
        assert_eq!(options.punctuation, ".");
        assert_eq!(options.algorithm, Algorithm::Md5);
        assert_eq!(options.encoding, Encoding::Utf8);
        assert_eq!(options.length, 8);
        assert_eq!(options.separator, "-");
        assert!(options.js.files.is_empty());
        assert!(options.js.require_js_main_config_file.is_empty());
        assert!(options.js.replace_require_js_main_config_file_paths.is_empty());
        assert!(options.js.exclude_files.is_empty());
        assert!(options.js.requirejs_namespace.is_empty());
    }

    #[test]
    fn parses_host_runner_option_names() {
        let options: Options = serde_json::from_str(
            r#"{
                "algorithm": "sha256",
                "length": 10,
                "js": {
                    "files": ["js/**/*.js"],
                    "requireJsMainConfigFile": "js/common.js",
                    "replaceRequireJsMainConfigFilePaths": ["index.html"],
                    "excludeFiles": ["js/vendor.js"],
                    "requirejsNamespace": "myApp"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(options.algorithm, Algorithm::Sha256);
        assert_eq!(options.length, 10);
        assert_eq!(options.separator, "-");
        assert_eq!(options.js.require_js_main_config_file, "js/common.js");
        assert_eq!(options.js.exclude_files, vec!["js/vendor.js"]);
        assert_eq!(options.js.requirejs_namespace, "myApp");
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        let result: std::result::Result<Options, _> =
            serde_json::from_str(r#"{ "encoding": "latin1" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn max_suffix_len_covers_hash_and_separator() {
        let options = Options::default();
        assert_eq!(options.max_suffix_len(), 9);
    }

    #[test]
    fn from_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "length": 6, "separator": "." }}"#).unwrap();

        let options = Options::from_file(file.path()).unwrap();
        assert_eq!(options.length, 6);
        assert_eq!(options.separator, ".");
    }

    #[test]
    fn from_file_missing_path_is_io_error() {
        let err = Options::from_file(Path::new("/nonexistent/cachet.json")).unwrap_err();
        assert!(matches!(err, CachetError::Io { .. }));
    }
}
