// CLI for the ddgen/ddpatch pair.
//
// ddgen builds a delta transfer between two package versions; ddpatch
// reconstructs the new package from the old one plus a transfer. Both
// print the resulting artifact path on stdout and diagnostics on stderr.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, ValueHint};

use crate::package::CompressionProfile;
use crate::pipeline::{self, BuildStats, PipelineOptions};
use crate::verify;

// ---------------------------------------------------------------------------
// Argument definitions
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
struct CommonArgs {
    /// Print a summary of the operation to stderr.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Output stats as JSON to stderr.
    #[arg(long = "json")]
    json_output: bool,

    /// Directory receiving the final artifact (default: current directory).
    #[arg(long = "out-dir", value_hint = ValueHint::DirPath)]
    out_dir: Option<PathBuf>,

    /// Keep working directories for inspection.
    #[arg(long)]
    keep: bool,
}

/// Build a delta transfer between two Debian package versions.
#[derive(Parser, Debug)]
#[command(
    name = "ddgen",
    version,
    about = "Debian package minimization tool for low-bandwidth transfers"
)]
struct GenCli {
    /// Old package used as the delta base.
    #[arg(short = 's', long, value_hint = ValueHint::FilePath)]
    source: PathBuf,

    /// New package the delta reconstructs.
    #[arg(short = 't', long, value_hint = ValueHint::FilePath)]
    target: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

/// Reconstruct a package from a source package plus a delta transfer.
#[derive(Parser, Debug)]
#[command(
    name = "ddpatch",
    version,
    about = "Debian package reconstruction from a delta transfer"
)]
struct PatchCli {
    /// Old package the transfer was built against.
    #[arg(short = 's', long, value_hint = ValueHint::FilePath)]
    source: PathBuf,

    /// Transfer container produced by ddgen.
    #[arg(short = 'd', long, value_hint = ValueHint::FilePath)]
    delta: PathBuf,

    /// Run the integrity check on the reconstructed package and report
    /// pass/fail (does not change the exit code).
    #[arg(long)]
    check: bool,

    /// Gzip level for the recomposed control tarball (0-9).
    #[arg(long = "gzip-level", value_parser = clap::value_parser!(u32).range(0..=9))]
    gzip_level: Option<u32>,

    /// xz preset for the recomposed payload tarball (0-9).
    #[arg(long = "xz-level", value_parser = clap::value_parser!(u32).range(0..=9))]
    xz_level: Option<u32>,

    #[command(flatten)]
    common: CommonArgs,
}

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

fn parse_or_exit<T: Parser>() -> T {
    match T::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // Help/version requests are not failures.
            process::exit(if err.use_stderr() { 1 } else { 0 });
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn pipeline_options(common: &CommonArgs, profile: CompressionProfile) -> PipelineOptions {
    PipelineOptions {
        out_dir: common.out_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
        keep_work_dirs: common.keep,
        profile,
    }
}

fn print_build_summary(stats: &BuildStats) {
    let gain = stats.source_size as i64 - stats.transfer_size as i64;
    let rate = stats.transfer_size as f64 / stats.source_size as f64 * 100.0;
    eprintln!("================= SUMMARY STATS ====================");
    eprintln!("\t- Source Size:\t{} bytes", stats.source_size);
    eprintln!("\t- Target Size:\t{} bytes", stats.target_size);
    eprintln!("\t- Ddelta Xfer:\t{} bytes", stats.transfer_size);
    eprintln!("\t- Total gain:\t{gain} bytes");
    eprintln!(
        "\t- Gain rate:\t{}{rate:.2}%",
        if gain > 0 { '+' } else { '-' }
    );
    eprintln!("\t- Time Took:\t{:.2} seconds", stats.elapsed.as_secs_f64());
    eprintln!("====================================================");
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// ddgen entry point: build a transfer container, print its path.
pub fn run_gen() -> ! {
    let cli = parse_or_exit::<GenCli>();
    init_logging(cli.common.verbose);

    let opts = pipeline_options(&cli.common, CompressionProfile::default());
    match pipeline::build(&cli.source, &cli.target, &opts) {
        Ok(outcome) => {
            if cli.common.verbose {
                print_build_summary(&outcome.stats);
            }
            if cli.common.json_output {
                let json = serde_json::json!({
                    "command": "build",
                    "source_size": outcome.stats.source_size,
                    "target_size": outcome.stats.target_size,
                    "transfer_size": outcome.stats.transfer_size,
                    "elapsed_seconds": outcome.stats.elapsed.as_secs_f64(),
                    "transfer": outcome.transfer.display().to_string(),
                });
                eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
            }
            println!("{}", outcome.transfer.display());
            process::exit(0);
        }
        Err(err) => {
            eprintln!("ddgen: {err}");
            process::exit(1);
        }
    }
}

/// ddpatch entry point: reconstruct a package, print its path.
pub fn run_patch() -> ! {
    let cli = parse_or_exit::<PatchCli>();
    init_logging(cli.common.verbose);

    let mut profile = CompressionProfile::default();
    if let Some(level) = cli.gzip_level {
        profile.gzip_level = level;
    }
    if let Some(level) = cli.xz_level {
        profile.xz_level = level;
    }

    let opts = pipeline_options(&cli.common, profile);
    match pipeline::apply(&cli.source, &cli.delta, &opts) {
        Ok(outcome) => {
            let checked = cli.check.then(|| verify::verify(&outcome.package));
            if let Some(ok) = checked {
                eprintln!(
                    "ddpatch: integrity check {}",
                    if ok { "OK" } else { "FAILED" }
                );
            }
            if cli.common.json_output {
                let json = serde_json::json!({
                    "command": "apply",
                    "package": outcome.package.display().to_string(),
                    "renamed": outcome.renamed,
                    "integrity": checked,
                });
                eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
            }
            println!("{}", outcome.package.display());
            process::exit(0);
        }
        Err(err) => {
            eprintln!("ddpatch: {err}");
            process::exit(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
