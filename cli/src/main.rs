#![deny(missing_docs)]

//! # goinject CLI
//!
//! Injects metadata written as `//` directives into generated Go sources
//! (typically `*.pb.go` files): struct tags, validators, ORM table names and
//! marker interfaces.

use clap::Parser;
use goinject_core::{Options, DEFAULT_SKIP_PREFIX};
use log::{error, info, LevelFilter};
use std::path::PathBuf;
use std::process;

mod error;
mod inject;

use crate::error::CliResult;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Inject custom tags and declarations into generated Go files")]
struct Cli {
    /// A Go file, or a directory searched recursively for files ending with `--suffix`.
    #[clap(long)]
    input: PathBuf,

    /// File name suffix selected when `--input` is a directory.
    #[clap(long, default_value = ".pb.go")]
    suffix: String,

    /// Tag keys set to "-" on bookkeeping fields (comma separated, e.g. "xml,json").
    #[clap(
        long = "XXX_skip",
        visible_alias = "skip-tokens",
        env = "GOINJECT_SKIP_TOKENS",
        value_delimiter = ','
    )]
    skip_tokens: Vec<String>,

    /// Name prefix of the bookkeeping fields that receive the skip tokens.
    #[clap(long, default_value = DEFAULT_SKIP_PREFIX)]
    skip_prefix: String,

    /// Remove directive comments once they have been applied.
    #[clap(long = "remove_tag_comment", visible_alias = "remove-comments")]
    remove_comments: bool,

    /// Print rewritten sources to stdout instead of writing them back.
    #[clap(long)]
    dry_run: bool,

    /// Write a JSON report of the run to this path.
    #[clap(long)]
    report: Option<PathBuf>,

    /// Log every directive and planned edit.
    #[clap(long, short)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> Options {
        let mut options = Options::default()
            .with_skip_tokens(&self.skip_tokens)
            .with_remove_comments(self.remove_comments);
        options.skip_prefix = self.skip_prefix.clone();
        options
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    if let Err(err) = run(&cli) {
        error!(err:err; "Run failed");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    let options = cli.options();
    let report = inject::run(&cli.input, &cli.suffix, &options, cli.dry_run)?;

    info!(
        files = report.files.len(),
        changed = report.changed();
        "Injection completed"
    );

    if let Some(path) = &cli.report {
        inject::write_report(path, &report)?;
    }
    Ok(())
}
