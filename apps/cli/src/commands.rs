//! CLI command definitions, routing, and tracing setup.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use pitchcraft_core::export::{render_markdown, write_markdown};
use pitchcraft_core::{
    GenerateRequest, GenerateResponse, Outcome, Pipeline, PipelineConfig, StageEvent,
    StageObserver,
};
use pitchcraft_providers::{build_capabilities, provider_report};
use pitchcraft_shared::{
    AppConfig, Idea, PitchId, PitchcraftError, expand_home, init_config, load_config,
};
use pitchcraft_storage::PitchStore;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// PitchCraft: turn a startup idea into an investor-ready pitch deck.
#[derive(Parser)]
#[command(
    name = "pitchcraft",
    version,
    about = "Turn a startup idea into a nine-slide pitch deck with market research and review.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate a pitch deck for an idea.
    Generate {
        /// The startup idea, in plain words.
        idea: Option<String>,

        /// Target language code (e.g. `es`, `pt-BR`).
        #[arg(short, long)]
        language: Option<String>,

        /// Print `{ "success": true, "pitch": … }` instead of a summary.
        #[arg(long)]
        json: bool,

        /// Save the pitch to the local database.
        #[arg(long)]
        save: bool,

        /// Owner to save under (defaults to `defaults.owner_id`).
        #[arg(long)]
        owner: Option<String>,
    },

    /// Show a saved pitch.
    Show {
        id: String,

        /// Print the artifact as JSON instead of Markdown.
        #[arg(long)]
        json: bool,
    },

    /// List saved pitches, newest first.
    List {
        #[arg(long)]
        owner: Option<String>,
    },

    /// Export a saved pitch as Markdown.
    Export {
        id: String,

        /// Output file path.
        #[arg(long)]
        out: PathBuf,
    },

    /// Show which provider backs each stage and whether its API key is set.
    Doctor,

    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so `--json`
/// output stays clean.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "pitchcraft=info",
        1 => "pitchcraft=debug",
        _ => "pitchcraft=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            idea,
            language,
            json,
            save,
            owner,
        } => cmd_generate(idea, language, json, save, owner.as_deref()).await,
        Command::Show { id, json } => cmd_show(&id, json).await,
        Command::List { owner } => cmd_list(owner.as_deref()).await,
        Command::Export { id, out } => cmd_export(&id, &out).await,
        Command::Doctor => cmd_doctor(),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

async fn open_store(config: &AppConfig) -> Result<PitchStore> {
    let path = expand_home(&config.defaults.database_path)?;
    Ok(PitchStore::open(&path).await?)
}

fn parse_id(id: &str) -> Result<PitchId> {
    id.parse()
        .map_err(|e| eyre!("invalid pitch id '{id}': {e}"))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn cmd_generate(
    idea: Option<String>,
    language: Option<String>,
    json: bool,
    save: bool,
    owner: Option<&str>,
) -> Result<()> {
    // Reject a blank idea before any provider is built.
    Idea::new(idea.as_deref().unwrap_or(""))?;

    let config = load_config()?;
    let capabilities = build_capabilities(&config)?;
    info!(?capabilities, "providers selected");

    let pipeline = Pipeline::new(capabilities, PipelineConfig::from(&config));
    let observer = CliObserver::new(!json);
    let response = pipeline
        .generate(GenerateRequest { idea, language }, &observer)
        .await?;
    observer.finish();

    let save_to = save.then(|| {
        (
            config.defaults.database_path.as_str(),
            owner.unwrap_or(&config.defaults.owner_id),
        )
    });
    let mut stdout = std::io::stdout();
    emit_and_save(&mut stdout, &response, &observer.events(), json, save_to).await?;
    Ok(())
}

/// Write the pitch to `out`, then save it when `save_to` names a database
/// path and owner. The pitch is always written before the save is tried.
async fn emit_and_save(
    out: &mut impl Write,
    response: &GenerateResponse,
    events: &[StageEvent],
    json: bool,
    save_to: Option<(&str, &str)>,
) -> Result<Option<PitchId>> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(response)?)?;
    } else {
        write_summary(out, response, events)?;
    }
    out.flush()?;

    let Some((database_path, owner)) = save_to else {
        return Ok(None);
    };
    let id = async {
        let store = PitchStore::open(&expand_home(database_path)?).await?;
        Ok::<_, PitchcraftError>(store.save(owner, &response.pitch).await?)
    }
    .await
    .wrap_err_with(|| format!("pitch {} was generated but not saved", response.pitch.id))?;

    if json {
        info!(%id, "pitch saved");
    } else {
        writeln!(out, "  Saved:    {id}\n")?;
    }
    Ok(Some(id))
}

fn write_summary(
    out: &mut impl Write,
    response: &GenerateResponse,
    events: &[StageEvent],
) -> std::io::Result<()> {
    let pitch = &response.pitch;
    writeln!(out)?;
    writeln!(out, "  {}", pitch.idea)?;
    writeln!(out)?;
    writeln!(out, "  {}", pitch.executive_summary)?;
    writeln!(out)?;
    for (i, slide) in pitch.slides.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, slide.title)?;
    }
    writeln!(out)?;
    writeln!(out, "  {:<14} {:<10} {:>8}", "STAGE", "OUTCOME", "ELAPSED")?;
    for event in events {
        writeln!(
            out,
            "  {:<14} {:<10} {:>6}ms",
            event.stage.as_str(),
            event.outcome.as_str(),
            event.elapsed_ms
        )?;
    }
    writeln!(out)?;
    writeln!(out, "  ID:       {}", pitch.id)?;
    writeln!(out, "  Language: {}", pitch.language)?;
    writeln!(out, "  Score:    {:.1} / 10", pitch.analysis.quality.score)?;
    writeln!(
        out,
        "  Time:     {:.1}s",
        pitch.analysis.processing_time_ms as f64 / 1000.0
    )?;
    writeln!(out)
}

async fn cmd_show(id: &str, json: bool) -> Result<()> {
    let id = parse_id(id)?;
    let config = load_config()?;
    let store = open_store(&config).await?;
    let pitch = store
        .get(&id)
        .await?
        .ok_or_else(|| eyre!("no saved pitch with id '{id}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&pitch)?);
    } else {
        print!("{}", render_markdown(&pitch));
    }
    Ok(())
}

async fn cmd_list(owner: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let owner = owner.unwrap_or(&config.defaults.owner_id);
    let store = open_store(&config).await?;
    let pitches = store.list(owner).await?;

    if pitches.is_empty() {
        println!("No saved pitches for '{owner}'.");
        return Ok(());
    }

    println!("{:<36}  {:<16}  {:>5}  {:<5}  IDEA", "ID", "GENERATED", "SCORE", "LANG");
    for pitch in pitches {
        println!(
            "{:<36}  {:<16}  {:>5.1}  {:<5}  {}",
            pitch.id.to_string(),
            pitch.generated_at.format("%Y-%m-%d %H:%M"),
            pitch.quality_score,
            pitch.language,
            pitch.idea
        );
    }
    Ok(())
}

async fn cmd_export(id: &str, out: &Path) -> Result<()> {
    let id = parse_id(id)?;
    let config = load_config()?;
    let store = open_store(&config).await?;
    let pitch = store
        .get(&id)
        .await?
        .ok_or_else(|| eyre!("no saved pitch with id '{id}'"))?;

    let sha256 = write_markdown(out, &pitch)?;
    println!("Exported {} to {}", id, out.display());
    println!("sha256: {sha256}");
    Ok(())
}

fn cmd_doctor() -> Result<()> {
    let config = load_config()?;
    println!("{:<13} {:<11} {:<24} STATUS", "STAGE", "PROVIDER", "KEY");
    for status in provider_report(&config) {
        let key = status.key_env.as_deref().unwrap_or("-");
        let state = if !status.supported {
            "unsupported provider"
        } else if status.is_live() {
            "ready"
        } else if status.key_env.is_some() && !status.key_present {
            "key missing, fallback only"
        } else {
            "disabled"
        };
        println!(
            "{:<13} {:<11} {:<24} {state}",
            status.slot.as_str(),
            status.provider.as_str(),
            key
        );
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI stage observer
// ---------------------------------------------------------------------------

/// Spinner plus a per-stage record for the summary table.
struct CliObserver {
    spinner: Option<ProgressBar>,
    events: Mutex<Vec<StageEvent>>,
}

impl CliObserver {
    fn new(show_spinner: bool) -> Self {
        let spinner = show_spinner.then(|| {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
            spinner.enable_steady_tick(Duration::from_millis(80));
            spinner.set_message("Researching and drafting slides");
            spinner
        });
        Self {
            spinner,
            events: Mutex::new(Vec::new()),
        }
    }

    fn events(&self) -> Vec<StageEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn finish(&self) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_and_clear();
        }
    }
}

impl StageObserver for CliObserver {
    fn stage_finished(&self, event: &StageEvent) {
        if let Some(spinner) = &self.spinner {
            let mark = if event.outcome == Outcome::Success { "✓" } else { "!" };
            spinner.set_message(format!("{mark} {} {}", event.stage, event.outcome));
        }
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use pitchcraft_core::assembler::fallback_artifact;

    fn response() -> GenerateResponse {
        let idea = Idea::new("Solar-powered cold storage for farmers").unwrap();
        GenerateResponse {
            success: true,
            pitch: fallback_artifact(&idea, "en", Duration::from_millis(5)),
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pitchcraft-cli-{}-{name}", PitchId::new()))
    }

    #[tokio::test]
    async fn pitch_is_printed_even_when_save_fails() {
        // A regular file where the database directory should be.
        let blocker = temp_path("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let database = blocker.join("pitches.db");

        let response = response();
        let mut out = Vec::new();
        let result = emit_and_save(
            &mut out,
            &response,
            &[],
            true,
            Some((database.to_str().unwrap(), "local")),
        )
        .await;

        assert!(result.is_err());
        let printed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed["success"], true);
        assert_eq!(printed["pitch"]["id"], response.pitch.id.to_string());

        let _ = std::fs::remove_file(&blocker);
    }

    #[tokio::test]
    async fn saved_id_follows_the_summary() {
        let database = temp_path("pitches.db");
        let response = response();
        let mut out = Vec::new();

        let id = emit_and_save(
            &mut out,
            &response,
            &[],
            false,
            Some((database.to_str().unwrap(), "local")),
        )
        .await
        .unwrap();

        assert_eq!(id, Some(response.pitch.id.clone()));
        let printed = String::from_utf8(out).unwrap();
        let summary_at = printed.find("Solar-powered cold storage for farmers").unwrap();
        let saved_at = printed.find("Saved:").unwrap();
        assert!(summary_at < saved_at);

        let _ = std::fs::remove_file(&database);
    }
}
