//! The single hash-rename-rewrite pass.
//!
//! Strictly sequential: files are processed in file-set order, and every
//! read, write, and rename blocks until it completes. The only state
//! carried across steps is the accumulated [`PathMap`] and the evolving
//! path of the loader's main config file, both owned by the pass.
//!
//! There is no rollback: a filesystem error aborts the run and leaves
//! whatever renames already happened in place.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Options;
use crate::error::{CachetError, Result};
use crate::hash;
use crate::mapping::{self, PathMap};
use crate::rename;
use crate::rewrite;

/// A file relocated to its fingerprinted name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedFile {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// A per-file failure that did not abort the pass.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: CachetError,
}

/// Outcome of mutating and re-hashing the loader's main config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainConfigOutcome {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Everything a caller needs to report on a completed pass.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub renamed: Vec<RenamedFile>,
    /// Files listed in `excludeFiles` and skipped entirely.
    pub skipped: Vec<PathBuf>,
    /// Files that failed without aborting the run (already hashed).
    pub failures: Vec<FileFailure>,
    pub map: PathMap,
    pub main_config: Option<MainConfigOutcome>,
    pub references_updated: Vec<PathBuf>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Executes the fingerprint pass described by `options`.
///
/// 1. Expand the input file set and hash-rename-rewrite each file.
/// 2. Append the accumulated path mapping to the main config file.
/// 3. Re-hash and rename the main config file.
/// 4. Update stale references to it in the configured reference files.
///
/// Filesystem errors abort the run; an already-hashed input is recorded
/// as a per-file failure and the pass continues.
pub fn run(options: &Options) -> Result<RunSummary> {
    HashRun::new(options, false).execute()
}

/// Like [`run`], but leaves the filesystem untouched: every rename and
/// write is reported in the summary as if it had happened.
pub fn preview(options: &Options) -> Result<RunSummary> {
    HashRun::new(options, true).execute()
}

/// State threaded through a single pass.
struct HashRun<'a> {
    options: &'a Options,
    dry_run: bool,
    /// Directory the mapping identifiers are computed relative to.
    base_dir: PathBuf,
    /// Current path of the main config file; tracks the file through
    /// renames so later steps always operate on the on-disk name.
    main_config: String,
    /// Path as configured, before any rename. The final config name and
    /// the reference-file pattern both derive from this.
    main_config_original: String,
    summary: RunSummary,
}

impl<'a> HashRun<'a> {
    fn new(options: &'a Options, dry_run: bool) -> Self {
        let main_config = options.js.require_js_main_config_file.clone();
        let base_dir = Path::new(&main_config)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        HashRun {
            options,
            dry_run,
            base_dir,
            main_config_original: main_config.clone(),
            main_config,
            summary: RunSummary::default(),
        }
    }

    fn execute(mut self) -> Result<RunSummary> {
        let files = expand_files(&self.options.js.files)?;
        info!(count = files.len(), "expanded input file set");

        for file in &files {
            self.process_file(file)?;
        }
        self.append_mapping()?;
        self.update_references()?;
        Ok(self.summary)
    }

    /// Hash, rename, rewrite, and record one input file.
    fn process_file(&mut self, file: &Path) -> Result<()> {
        let options = self.options;

        if options.js.exclude_files.iter().any(|e| Path::new(e) == file) {
            info!(file = %file.display(), "excluded from hashing");
            self.summary.skipped.push(file.to_path_buf());
            return Ok(());
        }

        let digest = hash::hash_file(file, options.algorithm)?;
        let short = &digest[..options.length.min(digest.len())];

        if rename::already_hashed(file, short) {
            warn!(file = %file.display(), hash = short, "file name already hashed");
            self.summary.failures.push(FileFailure {
                path: file.to_path_buf(),
                error: CachetError::AlreadyHashed {
                    path: file.to_path_buf(),
                    hash: short.to_string(),
                },
            });
            return Ok(());
        }

        let new_path = if self.dry_run {
            file.with_file_name(rename::hashed_file_name(file, short, &options.separator))
        } else {
            rename::rename_with_hash(file, short, &options.separator)?
        };
        info!(from = %file.display(), to = %new_path.display(), "renamed");

        let dir = file.parent().unwrap_or_else(|| Path::new(""));
        let from_id = mapping::relative_module_id(&self.base_dir, dir, &stem_of(file));
        let to_id = mapping::relative_module_id(&self.base_dir, dir, &stem_of(&new_path));

        // The self-declared identifier moves in lock-step with the
        // rename so loader id and file name stay consistent.
        let read_path = if self.dry_run { file } else { new_path.as_path() };
        let content = fs::read_to_string(read_path)
            .map_err(|source| CachetError::io(read_path, source))?;
        if let Some(updated) = rewrite::rewrite_declaration(&content, &from_id, &to_id) {
            if !self.dry_run {
                fs::write(&new_path, updated)
                    .map_err(|source| CachetError::io(&new_path, source))?;
            }
            debug!(file = %new_path.display(), from = %from_id, to = %to_id, "updated module self-declaration");
        }

        self.summary.map.insert(from_id, to_id);

        // When the config file is itself one of the inputs, later steps
        // must operate on its renamed path.
        if !self.main_config.is_empty()
            && file.to_string_lossy().contains(self.main_config.as_str())
        {
            self.main_config = new_path.to_string_lossy().into_owned();
        }

        self.summary.renamed.push(RenamedFile {
            from: file.to_path_buf(),
            to: new_path,
        });
        Ok(())
    }

    /// Appends the mapping statement to the main config file, then
    /// re-hashes and renames it so its name reflects the final content.
    fn append_mapping(&mut self) -> Result<()> {
        if self.main_config.is_empty() {
            warn!("no main config file configured; skipping mapping append");
            return Ok(());
        }

        let path = PathBuf::from(&self.main_config);
        // During a preview no rename has happened, so the content still
        // lives at the configured path.
        let disk_path = if self.dry_run {
            PathBuf::from(&self.main_config_original)
        } else {
            path.clone()
        };
        let content = match fs::read_to_string(&disk_path) {
            Ok(content) if !content.is_empty() => content,
            Ok(_) => {
                warn!(file = %disk_path.display(), "main config file is empty; skipping mapping append");
                return Ok(());
            }
            Err(source) => {
                warn!(file = %disk_path.display(), error = %source, "main config file unreadable; skipping mapping append");
                return Ok(());
            }
        };

        let statement =
            mapping::mapping_statement(&self.options.js.requirejs_namespace, &self.summary.map);
        let mutated = format!("{content}\n{statement}");
        if !self.dry_run {
            fs::write(&disk_path, &mutated)
                .map_err(|source| CachetError::io(&disk_path, source))?;
        }
        info!(file = %path.display(), modules = self.summary.map.len(), "appended path mapping");

        // The hash must reflect the content with the mapping appended,
        // and the name derives from the original unhashed base name.
        let digest = hash::hash_content(&mutated, self.options.algorithm);
        let short = &digest[..self.options.length.min(digest.len())];
        let original = Path::new(&self.main_config_original);
        let new_path =
            original.with_file_name(rename::hashed_file_name(original, short, &self.options.separator));
        if !self.dry_run {
            fs::rename(&disk_path, &new_path)
                .map_err(|source| CachetError::io(&disk_path, source))?;
        }
        info!(from = %path.display(), to = %new_path.display(), "renamed main config file");

        self.main_config = new_path.to_string_lossy().into_owned();
        self.summary.main_config = Some(MainConfigOutcome {
            from: path,
            to: new_path,
        });
        Ok(())
    }

    /// Replaces stale references to the main config file in each
    /// configured reference file.
    fn update_references(&mut self) -> Result<()> {
        let options = self.options;
        let max_suffix = options.max_suffix_len();

        // With no rename to point at, a replacement would send
        // references back to the unhashed name.
        if self.main_config == self.main_config_original {
            debug!("main config file was not renamed; leaving references untouched");
            return Ok(());
        }

        for file in &options.js.replace_require_js_main_config_file_paths {
            let path = Path::new(file);
            let content = match fs::read_to_string(path) {
                Ok(content) if !content.is_empty() => content,
                Ok(_) => {
                    warn!(file = %path.display(), "reference file is empty; skipping");
                    continue;
                }
                Err(source) => {
                    warn!(file = %path.display(), error = %source, "reference file unreadable; skipping");
                    continue;
                }
            };

            if let Some(updated) = rewrite::replace_config_reference(
                &content,
                &self.main_config_original,
                &self.main_config,
                max_suffix,
            ) {
                if !self.dry_run {
                    fs::write(path, updated).map_err(|source| CachetError::io(path, source))?;
                }
                info!(file = %path.display(), to = %self.main_config, "updated main config reference");
                self.summary.references_updated.push(path.to_path_buf());
            }
        }
        Ok(())
    }
}

/// Expands the configured glob patterns in pattern order; paths within
/// one pattern come back in the glob crate's sorted order.
fn expand_files(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        for entry in glob::glob(pattern)? {
            files.push(entry?);
        }
    }
    Ok(files)
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
