use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use reprostrip::{Charset, Config, WritePolicy, run_with_config};

/// reprostrip - make generated sources reproducible.
///
/// Walks the given paths and rewrites the files whose content would differ
/// between two builds of the same inputs:
///
///   - Java sources generated by xjc lose their `//` and `/* */` comments
///     (which carry the generation timestamp); `/** */` docs are kept
///   - pom.properties files lose their `#` comment lines
#[derive(Parser, Debug)]
#[command(
    name = "reprostrip",
    author,
    version,
    about = "Strip timestamp comments from generated sources for reproducible builds",
    long_about = r#"Walks the given paths and rewrites generated files into a
deterministic form.

  • *.java files carrying the xjc banner lose // and /* */ comments
    (/** */ documentation comments are kept)
  • pom.properties files lose their # comment lines
  • every other file is left untouched

Typical usage:
  reprostrip target/generated-sources
  reprostrip --check target/generated-sources
  reprostrip -o normalized --charset ISO-8859-1 src
"#
)]
struct Args {
    /// Paths to scan (files or directories). Defaults to current directory.
    #[arg(value_name = "PATH", default_value = ".")]
    paths: Vec<PathBuf>,

    /// Charset of the Java sources, used to decode and to re-encode them.
    ///
    /// One of UTF-8, US-ASCII, ISO-8859-1, UTF-16LE, UTF-16BE.
    #[arg(long = "charset", value_name = "CHARSET", default_value = "UTF-8")]
    charset: Charset,

    /// Follow symbolic links during traversal.
    #[arg(long = "follow-symlinks")]
    follow_symlinks: bool,

    /// Disable reading .gitignore / .ignore / git exclude files.
    #[arg(long = "no-gitignore")]
    no_gitignore: bool,

    /// Additional glob patterns to exclude (files or directories).
    ///
    /// Patterns are evaluated relative to each PATH root, e.g.:
    ///
    ///   reprostrip --exclude 'legacy/**'
    ///
    /// Multiple flags and comma-separated values are both allowed.
    #[arg(
        long = "exclude",
        short = 'E',
        value_name = "GLOB",
        action = ArgAction::Append,
        value_delimiter = ','
    )]
    excludes: Vec<String>,

    /// Write results under DIR (mirroring each root) instead of in place.
    #[arg(long = "out-dir", short = 'o', value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Only report files that would change; exit non-zero if there are any.
    #[arg(long = "check")]
    check: bool,

    /// Print a JSON array with one report per processed file.
    #[arg(long = "json")]
    json: bool,

    /// What to do when writing a kept pom.properties line fails.
    #[arg(long = "on-write-error", value_enum, default_value_t = OnWriteError::Abort)]
    on_write_error: OnWriteError,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OnWriteError {
    /// Stop processing that file.
    Abort,
    /// Count the failed line and keep going.
    Skip,
}

impl From<OnWriteError> for WritePolicy {
    fn from(v: OnWriteError) -> Self {
        match v {
            OnWriteError::Abort => WritePolicy::Abort,
            OnWriteError::Skip => WritePolicy::BestEffort,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let cfg = Config {
        paths: args.paths,
        charset: args.charset,
        follow_symlinks: args.follow_symlinks,
        no_gitignore: args.no_gitignore,
        excludes: args.excludes,
        out_dir: args.out_dir,
        check: args.check,
        json: args.json,
        write_policy: args.on_write_error.into(),
    };

    run_with_config(cfg).map(|_| ())
}
