//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Read configuration from this file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable report and JSON logs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ocfl-audit - Consistency and fixity auditor for OCFL repositories
#[derive(Parser, Debug)]
#[command(name = "ocfl-audit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (overrides the default search)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print the report as JSON and log as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Options for the `check` command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// OCFL storage root
    #[arg(long, value_name = "PATH")]
    pub repo: PathBuf,

    /// Identifier namespace looked up in each catalog
    #[arg(long, value_name = "NAME")]
    pub namespace: Option<String>,

    /// Remote access endpoint; enables fetching
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Verify fetched files against the manifest digest
    #[arg(long)]
    pub fixity: bool,

    /// Only fetch files whose physical path matches this regex
    #[arg(long, value_name = "REGEX")]
    pub fetch_filter: Option<String>,

    /// Accepted catalog filename (repeatable, in priority order)
    #[arg(long = "catalog", value_name = "NAME")]
    pub catalogs: Vec<String>,

    /// Directory for downloads
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Maximum concurrent remote fetches
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub concurrency: Option<u64>,

    /// Keep downloads that passed fixity
    #[arg(long)]
    pub keep_downloads: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Audit every object in a repository
    #[command(
        name = "check",
        long_about = "Audit every object in an OCFL repository.\n\n\
            Each object's RO-Crate catalog is read from its head version and every \
            File entity is resolved against the inventory. Files missing from head are \
            looked up in earlier versions to tell drift apart from files that never \
            existed.\n\n\
            With --endpoint, files resolved at head are downloaded from \
            {endpoint}/{identifier}/{path}. With --fixity, downloads are hashed and \
            compared with the manifest digest.",
        after_help = "\
EXIT STATUS:
    0   audit completed, no integrity findings
    2   audit completed with integrity findings
    1   fatal error (repository unreadable, bad arguments or config)

EXAMPLES:
    # Local consistency only
    ocfl-audit check --repo /srv/ocfl

    # Fetch CSV files through the portal and verify them
    ocfl-audit check --repo /srv/ocfl --endpoint https://oni.example.org/ocfl \\
        --fixity --fetch-filter '\\.csv$'

    # Grep for one kind of problem
    ocfl-audit check --repo /srv/ocfl 2>&1 | grep file-drift-detected"
    )]
    Check(CheckArgs),

    /// Show how one logical path resolves in one object
    #[command(
        name = "resolve",
        long_about = "Show how one logical path resolves in one object.\n\n\
            Prints whether the path is in the head version, only in earlier \
            versions, or in none. OBJECT is the object's path relative to the \
            storage root."
    )]
    Resolve {
        /// OCFL storage root
        #[arg(long, value_name = "PATH")]
        repo: PathBuf,

        /// Object path relative to the storage root
        object: String,

        /// Logical path within the object
        logical: String,
    },

    /// Generate shell completion scripts
    #[command(name = "completion")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_check_flags() {
        let cli = Cli::try_parse_from([
            "ocfl-audit",
            "--json",
            "check",
            "--repo",
            "/srv/ocfl",
            "--fixity",
            "--catalog",
            "a.json",
            "--catalog",
            "b.json",
            "--concurrency",
            "2",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Command::Check(args) => {
                assert_eq!(args.repo, PathBuf::from("/srv/ocfl"));
                assert!(args.fixity);
                assert_eq!(args.catalogs, vec!["a.json", "b.json"]);
                assert_eq!(args.concurrency, Some(2));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn zero_concurrency_rejected() {
        let result = Cli::try_parse_from([
            "ocfl-audit",
            "check",
            "--repo",
            "x",
            "--concurrency",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ocfl-audit", "resolve", "--repo", "r", "o", "a.csv", "-q"])
            .unwrap();
        assert!(cli.quiet);
    }
}
