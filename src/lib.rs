use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};
use serde::Serialize;

pub mod charset;
pub mod comments;
pub mod detect;
pub mod error;
pub mod properties;
pub mod stripper;
pub mod xjc;

pub use crate::charset::Charset;
pub use crate::comments::remove_comments;
pub use crate::detect::{SignatureDetector, XJC_SIGNATURE};
pub use crate::error::{EncodingError, StripError};
pub use crate::properties::{CommentLineFilter, WritePolicy};
pub use crate::stripper::{StripOutcome, Stripper};
pub use crate::xjc::XjcSourceStripper;

use crate::stripper::strip_in_memory;

/// Configuration passed from the CLI layer (main.rs) into the core logic.
#[derive(Debug)]
pub struct Config {
    pub paths: Vec<PathBuf>,
    pub charset: Charset,
    pub follow_symlinks: bool,
    pub no_gitignore: bool,
    pub excludes: Vec<String>,
    /// Write results under this directory instead of in place.
    pub out_dir: Option<PathBuf>,
    /// Report files that would change without writing anything.
    pub check: bool,
    pub json: bool,
    pub write_policy: WritePolicy,
}

/// Result of running one stripper over one file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub stripper: &'static str,
    pub outcome: StripOutcome,
    /// Output bytes differ from input bytes.
    pub changed: bool,
}

pub fn run_with_config(cfg: Config) -> Result<Vec<FileReport>> {
    let exclude_globset = build_exclude_globset(&cfg.excludes)?;

    let out_root = match &cfg.out_dir {
        Some(dir) if !cfg.check => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
            Some(
                dir.canonicalize()
                    .with_context(|| format!("Failed to resolve {}", dir.display()))?,
            )
        }
        _ => None,
    };

    let mut had_error = false;
    let mut reports = Vec::new();
    // Output path -> display path of the file that claimed it.
    let mut claimed: HashMap<PathBuf, String> = HashMap::new();

    for raw_root in &cfg.paths {
        // Canonicalise roots so running from arbitrary working dirs is reliable.
        let canon_root = match raw_root.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Skipping root {:?}: {}", raw_root, e);
                had_error = true;
                continue;
            }
        };

        let mut builder = WalkBuilder::new(&canon_root);
        builder.follow_links(cfg.follow_symlinks);
        builder.current_dir(canon_root.clone());

        if cfg.no_gitignore {
            builder
                .git_ignore(false)
                .git_exclude(false)
                .git_global(false)
                .ignore(false);
        } else {
            builder
                .git_ignore(true)
                .git_exclude(true)
                .git_global(true)
                .ignore(true)
                .require_git(false);
        }

        // Values moved into the 'static filter closure must be owned separately.
        let root_for_filter = canon_root.clone();
        let exclude_globset = exclude_globset.clone();
        let out_for_filter = out_root.clone();

        builder.filter_entry(move |entry: &DirEntry| {
            if entry.depth() == 0 {
                return true;
            }

            // Never re-process our own output.
            if let Some(ref out) = out_for_filter
                && entry.path().starts_with(out)
            {
                return false;
            }

            if let Some(ref gs) = exclude_globset {
                let path = entry.path();
                let rel = path.strip_prefix(&root_for_filter).unwrap_or(path);
                let rel_norm = normalize_for_matching(rel);

                if gs.is_match(&rel_norm) {
                    return false;
                }

                // Also try a trailing slash so `generated/**` prunes the whole subtree.
                if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false)
                    && !rel_norm.ends_with('/')
                {
                    let rel_dir = format!("{rel_norm}/");
                    if gs.is_match(&rel_dir) {
                        return false;
                    }
                }
            }

            true
        });

        for result in builder.build() {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    eprintln!("Walk error: {err}");
                    had_error = true;
                    continue;
                }
            };

            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }

            let path = entry.path();
            let Some(stripper) = select_stripper(path, cfg.charset, cfg.write_policy) else {
                continue;
            };

            let display_path = make_display_path(&canon_root, path);
            let dest = out_root
                .as_ref()
                .map(|out| out.join(relative_to_root(&canon_root, path)));

            if let Some(ref dest) = dest {
                if let Some(first) = claimed.get(dest) {
                    eprintln!(
                        "Error stripping {}: output {} is already written from {}",
                        display_path,
                        dest.display(),
                        first
                    );
                    had_error = true;
                    continue;
                }
                claimed.insert(dest.clone(), display_path.clone());
            }

            match strip_one(stripper.as_ref(), path, dest.as_deref(), cfg.check) {
                Ok((outcome, changed)) => {
                    if let StripOutcome::Filtered { failed_writes, .. } = outcome
                        && failed_writes > 0
                    {
                        eprintln!("Warning: {failed_writes} line(s) of {display_path} could not be written");
                    }
                    reports.push(FileReport {
                        path: display_path,
                        stripper: stripper.name(),
                        outcome,
                        changed,
                    });
                }
                Err(err) => {
                    eprintln!("Error stripping {}: {:#}", display_path, err);
                    had_error = true;
                }
            }
        }
    }

    if cfg.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        let label = if cfg.check { "not reproducible" } else { "stripped" };
        for report in reports.iter().filter(|r| r.changed) {
            println!("{label}: {} ({})", report.path, report.stripper);
        }
    }

    if had_error {
        anyhow::bail!("One or more files could not be stripped. See stderr for details.");
    }

    if cfg.check {
        let dirty = reports.iter().filter(|r| r.changed).count();
        if dirty > 0 {
            anyhow::bail!("{dirty} file(s) would change when stripped.");
        }
    }

    Ok(reports)
}

/// Choose the stripper for `path` by file name, or `None` to leave it alone.
pub fn select_stripper(
    path: &Path,
    charset: Charset,
    policy: WritePolicy,
) -> Option<Box<dyn Stripper>> {
    let file_name = path.file_name()?.to_str()?;

    if file_name == "pom.properties" {
        return Some(Box::new(CommentLineFilter::with_policy(policy)));
    }

    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("java") => {
            Some(Box::new(XjcSourceStripper::new(charset)))
        }
        _ => None,
    }
}

/// Strip one file into memory, then write it unless `check` is set.
///
/// Returns the outcome and whether the bytes changed.
fn strip_one(
    stripper: &dyn Stripper,
    path: &Path,
    dest: Option<&Path>,
    check: bool,
) -> Result<(StripOutcome, bool)> {
    let stripped = strip_in_memory(stripper, path)?;
    let (outcome, changed) = (stripped.outcome, stripped.changed());

    if check {
        return Ok((outcome, changed));
    }

    match dest {
        Some(dest) => {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(dest, &stripped.output).map_err(|e| StripError::io(dest, e))?;
        }
        None if changed => {
            fs::write(path, &stripped.output).map_err(|e| StripError::io(path, e))?;
        }
        None => {}
    }

    Ok((outcome, changed))
}

/// Build a GlobSet from the user–provided `--exclude` patterns.
/// Returns `Ok(None)` if there are no patterns.
fn build_exclude_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();

    for pat in patterns {
        let pat = pat.trim();
        if pat.is_empty() {
            continue;
        }

        let glob =
            Glob::new(pat).with_context(|| format!("Invalid --exclude glob pattern: {pat}"))?;
        builder.add(glob);
    }

    let set = builder
        .build()
        .context("Failed to build exclude glob set")?;

    Ok(Some(set))
}

/// Path of `path` below `root`. A root that is itself a file maps to its file name.
fn relative_to_root(root: &Path, path: &Path) -> PathBuf {
    let rel = path.strip_prefix(root).unwrap_or(path);
    if rel.as_os_str().is_empty() {
        return path.file_name().map(PathBuf::from).unwrap_or_default();
    }
    rel.to_path_buf()
}

/// Produce a display path relative to `root` (stable regardless of current working directory).
pub fn make_display_path(root: &Path, path: &Path) -> String {
    let rel = relative_to_root(root, path);
    if rel.as_os_str().is_empty() {
        return path.to_string_lossy().into_owned();
    }
    normalize_for_matching(&rel)
}

/// Convert paths to a stable, slash-separated form for matching/printing.
fn normalize_for_matching(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
