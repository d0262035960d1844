//! CLI for fingerprinting RequireJS module files.
//!
//! ## Usage
//!
//! ```bash
//! # Run the pass described by an options file
//! cachet cachet.json
//!
//! # Preview without touching the filesystem
//! cachet --dry-run cachet.json
//!
//! # Override options from the command line
//! cachet --algorithm sha256 --length 10 cachet.json
//!
//! # Generate shell completions
//! source <(COMPLETE=bash cachet)
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, ValueHint};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cachet_lib::{Options, RunSummary, preview, run};

/// Rename JS modules with a content hash and keep the RequireJS loader
/// config pointing at them
#[derive(Parser)]
#[command(name = "cachet", version, about, long_about = None)]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// Path to the JSON options file describing the pass
    #[arg(value_name = "CONFIG", value_hint = ValueHint::FilePath)]
    config: PathBuf,

    /// Override the configured hash algorithm (md5, sha1, sha256)
    #[arg(short, long, value_name = "NAME")]
    algorithm: Option<String>,

    /// Override the number of hash characters kept in file names
    #[arg(short, long, value_name = "N")]
    length: Option<usize>,

    /// Override the separator between base name and hash
    #[arg(short, long, value_name = "SEP")]
    separator: Option<String>,

    /// Exclude an additional file from hashing (repeatable)
    #[arg(long = "exclude", value_name = "PATH")]
    exclude: Vec<String>,

    /// Report what would change without touching the filesystem
    #[arg(long)]
    dry_run: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    log_verbosity: u8,
}

const AFTER_HELP: &str = "\
SHELL COMPLETIONS:
  Enable tab completions by adding one line to your shell config:

  Bash (~/.bashrc):
    source <(COMPLETE=bash cachet)

  Zsh (~/.zshrc):
    source <(COMPLETE=zsh cachet)

  Fish (~/.config/fish/config.fish):
    COMPLETE=fish cachet | source

EXAMPLES:
  cachet cachet.json                  # fingerprint the configured file set
  cachet --dry-run cachet.json        # preview only
  cachet -a sha256 -l 10 cachet.json  # longer sha256 fingerprints
";

fn main() -> ExitCode {
    // Check for shell completion generation before parsing args
    if let Ok(shell_name) = std::env::var("COMPLETE") {
        return generate_completions(&shell_name);
    }

    let cli = Cli::parse();
    init_tracing(cli.log_verbosity);
    tracing::info!(config = %cli.config.display(), "cachet starting");

    let mut options = match Options::from_file(&cli.config) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{} {e}", "✘".red());
            return ExitCode::from(2);
        }
    };

    if let Some(ref name) = cli.algorithm {
        options.algorithm = match name.parse() {
            Ok(algorithm) => algorithm,
            Err(e) => {
                eprintln!("{} {e}", "✘".red());
                return ExitCode::from(2);
            }
        };
    }
    if let Some(length) = cli.length {
        options.length = length;
    }
    if let Some(ref separator) = cli.separator {
        options.separator = separator.clone();
    }
    options.js.exclude_files.extend(cli.exclude.iter().cloned());

    let result = if cli.dry_run {
        preview(&options)
    } else {
        run(&options)
    };

    match result {
        Ok(summary) => {
            report(&summary, cli.dry_run);
            if summary.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("{} {e}", "✘".red());
            ExitCode::from(2)
        }
    }
}

/// One status line per rename, skip, update, and failure.
fn report(summary: &RunSummary, dry_run: bool) {
    let verb = if dry_run { "would rename" } else { "renamed to" };

    for skipped in &summary.skipped {
        println!(
            "{} Don't add hash to file: {}",
            "✔".green(),
            skipped.display()
        );
    }
    for renamed in &summary.renamed {
        println!(
            "{} {} {} {}",
            "✔".green(),
            renamed.from.display(),
            verb.dimmed(),
            renamed.to.display()
        );
    }
    if let Some(outcome) = &summary.main_config {
        println!(
            "{} Append RequireJs path mapping {}",
            "✔".green(),
            format!("({} modules)", summary.map.len()).dimmed()
        );
        println!(
            "{} {} {} {}",
            "✔".green(),
            outcome.from.display(),
            verb.dimmed(),
            outcome.to.display()
        );
    }
    for reference in &summary.references_updated {
        println!(
            "{} Update path to hashed main config file {}",
            "✔".green(),
            format!("({})", reference.display()).dimmed()
        );
    }
    for failure in &summary.failures {
        eprintln!("{} {}", "✘".red(), failure.error);
    }
}

/// Initialize tracing subscriber based on verbosity.
fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,cachet_lib=info".to_string(),
            2 => "info,cachet_lib=debug".to_string(),
            _ => "debug,cachet_lib=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(verbose >= 2)
                .with_writer(io::stderr)
                .compact(),
        )
        .init();
}

/// Generate shell completions and exit.
fn generate_completions(shell_name: &str) -> ExitCode {
    let shell = match shell_name.to_lowercase().as_str() {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "powershell" => Shell::PowerShell,
        "elvish" => Shell::Elvish,
        _ => {
            eprintln!(
                "Unknown shell: {shell_name}. Supported: bash, zsh, fish, powershell, elvish"
            );
            return ExitCode::from(2);
        }
    };

    clap_complete::generate(shell, &mut Cli::command(), "cachet", &mut io::stdout());
    ExitCode::SUCCESS
}
