// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use vidtrans::app_config::{self, Config, TranslationProvider};
use vidtrans::{Controller, RunOutcome};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    #[value(name = "lmstudio")]
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate subtitles for a media file (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for vidtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args, Debug, Clone)]
struct TranslateArgs {
    /// Audio or video file to subtitle
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output SRT file (default: <input>.<target>.srt next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Spoken language, as a code or display name (e.g. 'zh', 'Chinese')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Subtitle language, as a code or display name (e.g. 'en', 'French')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Whisper model size (tiny, base, small, medium, large-v3)
    #[arg(short, long)]
    whisper_model: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,
}

/// vidtrans - subtitles for spoken media
///
/// Recognizes speech with whisper.cpp and writes SRT subtitles, optionally
/// translated through an LLM provider (Ollama, OpenAI, Anthropic, LM Studio).
#[derive(Parser, Debug)]
#[command(name = "vidtrans")]
#[command(version)]
#[command(about = "Speech-to-subtitle generation with optional translation")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "vidtrans recognizes the speech in an audio or video file and writes SRT subtitles.

EXAMPLES:
    vidtrans talk.mp4                          # Use languages from the config
    vidtrans -s ja -t en talk.mp4              # Japanese speech, English subtitles
    vidtrans -s Chinese -t French talk.mp4     # Recognize, then translate each line
    vidtrans -s es -t es -o out.srt talk.mp4   # Plain transcription
    vidtrans -p openai -m gpt-4o talk.mp4      # Use a specific provider and model
    vidtrans completions bash > vidtrans.bash  # Generate bash completions

ROUTING:
    same source and target   transcription only
    target is English        whisper translates while transcribing
    anything else            transcription, then one LLM call per subtitle line

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    args: TranslateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // The global max level is raised or lowered after the config is read
        metadata.level() <= log::max_level() && metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let (colour, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", colour, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    // Accept every level here; the effective level is set once options are known
    if let Err(e) = CustomLogger::init(LevelFilter::Trace) {
        eprintln!("Failed to initialize logger: {}", e);
    }
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    let result = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "vidtrans", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => run_translate(cli.args).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = load_or_create_config(&options.config_path)?;
    apply_overrides(&mut config, &options);

    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    let controller = Controller::with_config(config)
        .context("Configuration validation failed")?;

    let run = controller.run(options.input.clone(), options.output.clone(), options.force_overwrite);
    let outcome = tokio::select! {
        outcome = run => outcome?,
        _ = tokio::signal::ctrl_c() => {
            // Dropping the run kills the engine and removes its scratch files
            return Err(anyhow!("Interrupted, no subtitles were written"));
        }
    };

    match outcome {
        RunOutcome::Written { path, entries } => info!("Success: {:?} ({} subtitles)", path, entries),
        RunOutcome::Skipped { path } => info!("Nothing to do for {:?}", path),
    }

    Ok(())
}

/// Read the JSON config, writing a default one first when it does not exist
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;
        return Ok(config);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();

    let config_json = serde_json::to_string_pretty(&config)
        .context("Failed to serialize default config to JSON")?;
    std::fs::write(config_path, config_json)
        .context(format!("Failed to write default config to file: {}", config_path))?;

    Ok(config)
}

/// Command line options win over the config file
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        let provider_str = config.translation.provider.to_lowercase_string();
        if let Some(provider_config) = config.translation.available_providers.iter_mut()
            .find(|p| p.provider_type == provider_str) {
            provider_config.model = model.clone();
        } else {
            let mut provider_config = app_config::ProviderConfig::new(config.translation.provider.clone());
            provider_config.model = model.clone();
            config.translation.available_providers.push(provider_config);
        }
    }

    if let Some(whisper_model) = &options.whisper_model {
        config.recognition.model = whisper_model.clone();
        config.recognition.model_path = None;
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}
