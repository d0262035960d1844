//! Build-time asset fingerprinting for RequireJS projects.
//!
//! A single pass over a configured set of JavaScript module files:
//! each file is renamed to carry a hash of its content, its `define(...)`
//! self-declaration is rewritten to the new logical identifier, a path
//! mapping from old to new identifiers is appended to the loader's main
//! config file, that file is re-hashed and renamed in turn, and stale
//! references to it in entry-point files (HTML) are replaced.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use cachet_lib::{run, Options};
//!
//! let options = Options::from_file(Path::new("cachet.json"))?;
//! let summary = run(&options)?;
//! for renamed in &summary.renamed {
//!     println!("{} -> {}", renamed.from.display(), renamed.to.display());
//! }
//! # Ok::<(), cachet_lib::CachetError>(())
//! ```

pub mod config;
pub mod error;
pub mod hash;
pub mod mapping;
pub mod rename;
pub mod rewrite;
pub mod runner;

pub use config::{Encoding, JsOptions, Options};
pub use error::{CachetError, Result};
pub use hash::Algorithm;
pub use mapping::PathMap;
pub use runner::{
    FileFailure, MainConfigOutcome, RenamedFile, RunSummary, preview, run,
};
