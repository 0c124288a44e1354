use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use colored::Colorize;

use pagediff::pipeline::{load_document, run};
use pagediff::{
    Algorithm, Comparator, ComparisonJob, Error, JsonLoader, Result, Settings, SuppressionMode, WhitespaceMode,
};

/// Highlight word-level differences between a reference document and one or
/// more candidates, page by page.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print the alignment ops of every page
    #[arg(short, long)]
    debug: bool,
    /// Reference document (JSON word dump)
    reference: PathBuf,
    /// Documents compared against the reference
    #[arg(required = true)]
    candidates: Vec<PathBuf>,
    #[arg(short, long, default_value = "comparison_results")]
    output_dir: PathBuf,
    /// JSON settings file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    suppression: Option<SuppressionMode>,
    #[arg(long, value_enum)]
    algorithm: Option<Algorithm>,
    /// Ignore very common words when seeding matches (`--autojunk=false` to turn off)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    autojunk: Option<bool>,
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    lowercase: Option<bool>,
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    strip_punctuation: Option<bool>,
    #[arg(long, value_enum)]
    whitespace: Option<WhitespaceMode>,
    #[arg(long)]
    dpi: Option<u32>,
    /// Highlight opacity in [0, 1]
    #[arg(long)]
    opacity: Option<f32>,
    /// Only write the JSON report
    #[arg(long)]
    no_render: bool,
    /// Worker threads for page comparison and rendering
    #[arg(short, long)]
    jobs: Option<usize>,
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };
        let diff = &mut settings.diff;
        if let Some(suppression) = self.suppression {
            diff.suppression = suppression;
        }
        if let Some(algorithm) = self.algorithm {
            diff.algorithm = algorithm;
        }
        if let Some(whitespace) = self.whitespace {
            diff.normalization.whitespace = whitespace;
        }
        if let Some(autojunk) = self.autojunk {
            diff.autojunk = autojunk;
        }
        if let Some(lowercase) = self.lowercase {
            diff.normalization.lowercase = lowercase;
        }
        if let Some(strip_punctuation) = self.strip_punctuation {
            diff.normalization.strip_punctuation = strip_punctuation;
        }

        let render = &mut settings.render;
        if let Some(dpi) = self.dpi {
            render.dpi = dpi;
        }
        if let Some(opacity) = self.opacity {
            render.opacity = opacity;
        }
        if self.no_render {
            render.enabled = false;
        }
        render.validate()?;
        Ok(settings)
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn print_alignments(job: &ComparisonJob, settings: &Settings) -> Result<()> {
    let loader = JsonLoader;
    let reference = load_document(&loader, &job.reference)?;
    let comparator = Comparator::new(&settings.diff);
    for path in &job.candidates {
        let candidate = load_document(&loader, path)?;
        for (ref_page, cand_page) in reference.pages().iter().zip(candidate.pages()) {
            println!("{}", format!("{} page {}", path.display(), ref_page.index + 1).bold());
            for line in comparator.describe(ref_page.extract_tokens(), cand_page.extract_tokens()) {
                println!("  {}", line);
            }
        }
    }
    Ok(())
}

fn compare(cli: &Cli) -> Result<()> {
    let settings = cli.settings()?;
    if let Some(jobs) = cli.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .map_err(|e| Error::Config(format!("cannot start {} workers: {}", jobs, e)))?;
    }
    let job = ComparisonJob::new(&cli.reference, cli.candidates.clone(), &cli.output_dir)?;
    if cli.debug {
        print_alignments(&job, &settings)?;
    }
    let summary = run(&job, &JsonLoader, &settings)?;
    if summary.skipped_pages > 0 {
        println!(
            "{} {} of {} pages skipped, see the log",
            "warning:".yellow(),
            summary.skipped_pages,
            summary.compared_pages
        );
    }
    println!(
        "Comparison complete: {} flagged words over {} pages. Output saved to: {}",
        summary.flagged_tokens,
        summary.compared_pages,
        summary.report.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);
    match compare(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} [{}] {}", "error:".red().bold(), err.stage(), err);
            ExitCode::FAILURE
        }
    }
}
