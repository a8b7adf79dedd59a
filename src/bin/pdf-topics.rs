//! CLI binary for pdf-topics.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ClassificationConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use pdf_topics::{
    classify_pdf_to_csv, segment_pdf, ClassificationConfig, ClassificationProgressCallback,
    LabelPolicy, PdfTopicsError, ProgressCallback, RunStats, Segmentation,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a bar counting chunks plus one log line per
/// chunk. Chunks arrive one at a time, so a single start time is enough.
struct CliProgressCallback {
    bar: ProgressBar,
    chunk_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    /// Start as a spinner while the PDF is read; `on_run_start` turns it
    /// into a bar once the chunk count is known.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_message("Reading PDF…");
        bar.enable_steady_tick(Duration::from_millis(100));

        Arc::new(Self {
            bar,
            chunk_started: Mutex::new(None),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.chunk_started
            .lock()
            .ok()
            .and_then(|mut started| started.take())
            .map_or(0.0, |t| t.elapsed().as_secs_f64())
    }
}

impl ClassificationProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_chunks: usize) {
        let style = ProgressStyle::with_template(
            "{prefix:.bold} [{bar:40.green/238}] {pos}/{len} chunks  {elapsed}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        self.bar.set_style(style);
        self.bar.set_length(total_chunks as u64);
        self.bar.set_prefix("Classifying");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Classifying {total_chunks} chunks…"))
        ));
    }

    fn on_chunk_start(&self, chunk: usize, _total: usize) {
        if let Ok(mut started) = self.chunk_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("chunk {chunk}"));
    }

    fn on_chunk_complete(&self, chunk: usize, total: usize, label: &str) {
        let elapsed = self.elapsed_secs();
        self.bar.println(format!(
            "  {} Chunk {:>3}/{:<3}  {:<14}  {}",
            green("✓"),
            chunk,
            total,
            label,
            dim(&format!("{elapsed:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_chunk_error(&self, chunk: usize, total: usize, error: &str) {
        let elapsed = self.elapsed_secs();

        // Keep one line per chunk.
        let msg = match error.char_indices().nth(79) {
            Some((cut, _)) => format!("{}\u{2026}", &error[..cut]),
            None => error.to_string(),
        };

        self.bar.println(format!(
            "  {} Chunk {:>3}/{:<3}  {}  {}",
            red("✗"),
            chunk,
            total,
            red(&msg),
            dim(&format!("{elapsed:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total_chunks: usize, classified: usize) {
        let failed = total_chunks.saturating_sub(classified);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} chunks classified",
                green("✔"),
                bold(&classified.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} chunks classified  ({} recorded as Error)",
                if failed == total_chunks {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&classified.to_string()),
                total_chunks,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Classify news.pdf into classified_news.csv
  pdf-topics

  # Explicit paths
  pdf-topics bulletin.pdf -o bulletin_topics.csv

  # Use a specific model
  pdf-topics --provider anthropic --model claude-haiku-4-20250514 news.pdf

  # Show how the document would be chunked (no API key needed)
  pdf-topics --segment-only news.pdf

  # Machine-readable run summary
  pdf-topics --json news.pdf > stats.json

TOPICS:
  Politics, Sports, Economics, Entertainment
  Responses outside this set are recorded as Error unless --accept-any-label
  is given, in which case the model's answer is kept as returned.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to an existing libpdfium
  RUST_LOG                Log filter, overrides -v / -q

SETUP:
  1. Install pdfium:  https://github.com/bblanchon/pdfium-binaries/releases
  2. Set API key:     export OPENAI_API_KEY=sk-...
  3. Classify:        pdf-topics news.pdf -o classified_news.csv
"#;

/// Classify the paragraphs of a PDF by topic using an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-topics",
    version,
    about = "Classify the paragraphs of a PDF by topic using an LLM",
    long_about = "Extract the text of a PDF, split it into paragraph-sized chunks, and label \
each chunk as Politics, Sports, Economics or Entertainment with an LLM. The result is a \
two-column CSV (text, topic). Supports OpenAI, Anthropic, Google Gemini, Azure OpenAI, and \
any OpenAI-compatible endpoint (Ollama, vLLM, LiteLLM, etc.).",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    #[arg(default_value = "news.pdf")]
    input: PathBuf,

    /// CSV file to write. Replaced if it exists; its directory must exist.
    #[arg(short, long, env = "PDF_TOPICS_OUTPUT", default_value = "classified_news.csv")]
    output: PathBuf,

    /// LLM model ID (default: gpt-4o-mini).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "EDGEQUAKE_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF_TOPICS_PASSWORD")]
    password: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "PDF_TOPICS_TEMPERATURE", default_value_t = 0.0)]
    temperature: f32,

    /// Max LLM output tokens per chunk.
    #[arg(long, env = "PDF_TOPICS_MAX_TOKENS", default_value_t = 16)]
    max_tokens: usize,

    /// Per-chunk LLM call timeout in seconds.
    #[arg(long, env = "PDF_TOPICS_API_TIMEOUT")]
    api_timeout: Option<u64>,

    /// Keep the model's answer even when it is not one of the four topics.
    #[arg(long, env = "PDF_TOPICS_ACCEPT_ANY_LABEL")]
    accept_any_label: bool,

    /// Path to a text file containing a custom prompt with {text} (and optionally {labels}).
    #[arg(long, env = "PDF_TOPICS_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,

    /// Print the chunks and statistics only, no classification.
    #[arg(long)]
    segment_only: bool,

    /// Print run statistics as JSON on stdout.
    #[arg(long, env = "PDF_TOPICS_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF_TOPICS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF_TOPICS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF_TOPICS_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.segment_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Segment-only mode ────────────────────────────────────────────────
    if cli.segment_only {
        let segmentation = segment_pdf(&cli.input, cli.password.as_deref())
            .await
            .context("Failed to segment PDF")?;
        return print_segmentation(&cli, &segmentation);
    }

    // ── Build config ─────────────────────────────────────────────────────
    let cli_cb = show_progress.then(CliProgressCallback::new_dynamic);
    let progress_cb: Option<ProgressCallback> = cli_cb
        .clone()
        .map(|cb| cb as Arc<dyn ClassificationProgressCallback>);

    let config = build_config(&cli, progress_cb).await?;

    // ── Run classification ───────────────────────────────────────────────
    let result = classify_pdf_to_csv(&cli.input, &cli.output, &config).await;
    if let (Err(_), Some(cb)) = (&result, &cli_cb) {
        // The run ended before `on_run_complete`; stop the spinner.
        cb.bar.finish_and_clear();
    }

    let stats = match result {
        Ok(stats) => stats,
        Err(e) if e.is_clean_exit() => {
            // Blank or image-only PDF: nothing to classify, nothing written.
            info!("{e}; no output written");
            if !cli.quiet {
                eprintln!("{} {}", cyan("ℹ"), e);
            }
            return Ok(());
        }
        Err(e) => return Err(run_error(e)),
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&cli, &stats, show_progress);
    }

    Ok(())
}

/// Attach a context line matching the stage that failed.
fn run_error(e: PdfTopicsError) -> anyhow::Error {
    let context = match &e {
        PdfTopicsError::Configuration { .. } => "Invalid configuration",
        PdfTopicsError::Extraction(_) => "Failed to read PDF",
        PdfTopicsError::Persistence { .. } => "Failed to write results",
        _ => "Classification failed",
    };
    anyhow::Error::new(e).context(context)
}

fn print_summary(cli: &Cli, stats: &RunStats, show_progress: bool) {
    // The progress callback already printed the ✔/⚠ line.
    if !show_progress {
        eprintln!(
            "Classified {}/{} chunks in {}ms",
            stats.classified, stats.chunks, stats.total_duration_ms
        );
        if stats.failed > 0 {
            eprintln!("  {} chunks recorded as Error", stats.failed);
        }
    }
    eprintln!(
        "{}  {} paragraphs → {} chunks  {}ms  →  {}",
        if stats.failed == 0 {
            green("✔")
        } else {
            cyan("⚠")
        },
        stats.paragraphs,
        stats.chunks,
        stats.total_duration_ms,
        bold(&cli.output.display().to_string()),
    );
    eprintln!(
        "   {}",
        dim(&format!(
            "avg {:.2} words/paragraph, split above {:.2}, windows of {}",
            stats.avg_words, stats.length_threshold, stats.window
        )),
    );
}

fn print_segmentation(cli: &Cli, segmentation: &Segmentation) -> Result<()> {
    if cli.json {
        let json = serde_json::to_string_pretty(segmentation)
            .context("Failed to serialise segmentation")?;
        println!("{json}");
        return Ok(());
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for (idx, chunk) in segmentation.chunks.iter().enumerate() {
        writeln!(handle, "[{}] {}", idx + 1, chunk).context("Failed to write to stdout")?;
    }

    if !cli.quiet {
        eprintln!(
            "File:         {}\n\
             Paragraphs:   {}\n\
             Chunks:       {}\n\
             Avg words:    {:.2}\n\
             Threshold:    {:.2}\n\
             Window:       {}",
            cli.input.display(),
            segmentation.paragraph_count,
            segmentation.chunks.len(),
            segmentation.stats.avg_words,
            segmentation.stats.length_threshold,
            segmentation.stats.window,
        );
    }
    Ok(())
}

/// Map CLI args to `ClassificationConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ClassificationConfig> {
    let mut builder = ClassificationConfig::builder()
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .label_policy(if cli.accept_any_label {
            LabelPolicy::Verbatim
        } else {
            LabelPolicy::ClosedSet
        });

    if let Some(ref path) = cli.prompt_file {
        let template = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt template from {:?}", path))?;
        builder = builder.prompt_template(template);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(secs) = cli.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
