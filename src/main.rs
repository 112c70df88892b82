use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use leetcard::batch;
use leetcard::config::Settings;
use leetcard::export;
use leetcard::parser::code::is_extraction_failure;
use leetcard::{Diagnostics, Extractor, HttpFetcher, ImageFetcher, Offline, Silent, Traced};

#[derive(Parser)]
#[command(name = "leetcard", about = "Extract flashcard-ready problems from saved LeetCode pages")]
struct Cli {
    /// Settings file (default: ./leetcard.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse every saved page in a directory and write problems.json + media/
    Build {
        /// Directory of saved .html pages
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Log which extraction strategy matched for every page
        #[arg(long)]
        debug: bool,
        /// Skip pages that fail to parse instead of aborting
        #[arg(long)]
        skip_failures: bool,
        /// Only keep inline images; never fetch over the network
        #[arg(long)]
        no_remote_images: bool,
    },
    /// Parse one page with verbose diagnostics and print what was found
    Inspect {
        file: PathBuf,
        /// Only keep inline images; never fetch over the network
        #[arg(long)]
        no_remote_images: bool,
    },
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref()).context("loading settings")?;

    match cli.command {
        Commands::Build {
            input,
            output,
            debug,
            skip_failures,
            no_remote_images,
        } => {
            if let Some(input) = input {
                settings.input_dir = input;
            }
            if let Some(output) = output {
                settings.output_dir = output;
            }
            settings.debug |= debug;
            settings.skip_failures |= skip_failures;
            settings.fetch_remote_images &= !no_remote_images;
            init_tracing(settings.debug);
            info!(settings = ?settings, "Starting build");
            build(&settings)?;
        }
        Commands::Inspect { file, no_remote_images } => {
            settings.fetch_remote_images &= !no_remote_images;
            init_tracing(true);
            inspect(&settings, &file)?;
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}

fn fetcher(settings: &Settings) -> anyhow::Result<Box<dyn ImageFetcher>> {
    if !settings.fetch_remote_images {
        return Ok(Box::new(Offline));
    }
    let http = HttpFetcher::new(settings.fetch_timeout(), &settings.user_agent)
        .context("building HTTP client")?;
    Ok(Box::new(http))
}

fn build(settings: &Settings) -> anyhow::Result<()> {
    let fetcher = fetcher(settings)?;
    let diagnostics: &dyn Diagnostics = if settings.debug { &Traced } else { &Silent };
    let extractor = Extractor::new(fetcher.as_ref(), diagnostics);

    let pages = batch::list_pages(&settings.input_dir)
        .with_context(|| format!("listing {}", settings.input_dir.display()))?;
    if pages.is_empty() {
        println!("No .html pages in {}.", settings.input_dir.display());
        return Ok(());
    }
    println!("Parsing {} pages...", pages.len());

    let pb = if settings.debug {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(pages.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let report = batch::parse_pages(&extractor, &pages, settings.batch_policy(), |_| pb.inc(1));
    pb.finish_and_clear();
    let report = report.context("parsing pages (rerun with --skip-failures to continue past bad pages)")?;

    for skipped in &report.skipped {
        warn!(path = %skipped.path.display(), reason = %skipped.reason, "Skipped page");
    }
    let failed_code = report
        .problems
        .iter()
        .filter(|p| is_extraction_failure(&p.code))
        .count();
    if failed_code > 0 {
        warn!(count = failed_code, "Pages without recoverable code");
    }

    let summary = export::write_output(&report.problems, &settings.output_dir)?;
    println!(
        "Wrote {} problems and {} images to {} ({} skipped).",
        summary.problems,
        summary.images,
        settings.output_dir.display(),
        report.skipped.len()
    );
    Ok(())
}

fn inspect(settings: &Settings, file: &Path) -> anyhow::Result<()> {
    let fetcher = fetcher(settings)?;
    let extractor = Extractor::new(fetcher.as_ref(), &Traced);
    let problem = batch::parse_file(&extractor, file)
        .with_context(|| format!("parsing {}", file.display()))?;

    println!("Title:       {}", problem.title);
    if let Some(at) = problem.captured_at {
        println!("Captured at: {at}");
    }
    println!("Description: {} chars", problem.description.chars().count());
    println!("Images:      {}", problem.images.len());
    for image in &problem.images {
        println!("  {} ({} bytes)", image.filename, image.data.len());
    }
    println!("\n--- Code ---\n{}", problem.code);
    Ok(())
}
