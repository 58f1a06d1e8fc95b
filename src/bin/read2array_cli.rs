use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;

use read2array_rs::config::{DEFAULT_KMER_LENGTH, DEFAULT_WORKERS};
use read2array_rs::{run, Config, GafMethod, ShortReadPolicy};

/// Convert every read in a directory of per-species FASTA files into
/// Gramian Angular Field images saved as `.npy` arrays.
#[derive(Debug, Parser)]
#[command(name = "read2array-rs", version, about)]
struct Args {
    #[arg(value_name = "INDIR", help = "Directory with one FASTA file per species")]
    indir: PathBuf,

    #[arg(value_name = "OUTDIR", help = "Directory that receives <species>/<species>_read-<i>.npy")]
    outdir: PathBuf,

    #[arg(
        short = 'k',
        long = "kmer-length",
        value_name = "K",
        default_value_t = DEFAULT_KMER_LENGTH,
        help = "Length of the k-mers used to turn a read into numbers"
    )]
    kmer_length: usize,

    #[arg(
        short = 't',
        long = "threads",
        visible_alias = "cpu",
        value_name = "THREADS",
        default_value_t = DEFAULT_WORKERS,
        help = "Number of files processed in parallel"
    )]
    threads: usize,

    #[arg(
        short = 'm',
        long = "method",
        value_enum,
        default_value_t = GafMethod::Summation,
        help = "Gramian Angular Field variant"
    )]
    method: GafMethod,

    #[arg(
        long = "strict-short-reads",
        help = "Fail a file on any read shorter than K instead of skipping it"
    )]
    strict_short_reads: bool,
}

fn spinner(color: &str, msg: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&[
                "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
            ])
            .template(&format!("{{spinner:.{color}}} {{msg}}"))
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    // No steady tick: a background redraw would cut into env_logger lines.
    spinner.set_message(msg);
    spinner
}

fn config_from(args: &Args) -> Config {
    Config::new(&args.indir, &args.outdir)
        .with_kmer_length(args.kmer_length)
        .with_workers(args.threads)
        .with_method(args.method)
        .with_short_reads(if args.strict_short_reads {
            ShortReadPolicy::Error
        } else {
            ShortReadPolicy::Skip
        })
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let start = std::time::Instant::now();

    let config = config_from(&Args::parse());

    let progress = spinner("green", "Converting reads to images...");
    let report = match run(&config) {
        Ok(report) => report,
        Err(e) => {
            progress.abandon_with_message("Aborted.");
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    progress.finish_with_message(format!(
        "Wrote {} images from {} file(s).",
        report.images_written(),
        report.files.len()
    ));

    for failure in &report.failures {
        log::error!("{}: {}", failure.path.display(), failure.error);
    }

    log::info!("images saved in {}", config.output_dir.display());
    log::info!("elapsed time: {:.3?}", start.elapsed());

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        log::error!(
            "{} file(s) failed; rerun them individually once fixed",
            report.failures.len()
        );
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_cpu_alias_and_defaults() {
        let args = Args::try_parse_from(["read2array-rs", "in", "out", "--cpu", "3"]).unwrap();
        let config = config_from(&args);
        assert_eq!(config.workers, 3);
        assert_eq!(config.kmer_length, DEFAULT_KMER_LENGTH);
        assert_eq!(config.short_reads, ShortReadPolicy::Skip);
    }
}
