mod aspects;
mod error;
mod rate;

use std::default::Default;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{crate_authors, crate_description, crate_version, Parser};
use serde::Deserialize;
use tokio::io::AsyncReadExt;

use sst_machine::{LinearModel, MachineSentiment, NullMachineSentiment};
use sst_text::aspects::AspectDetector;
use sst_text::handler::{SentimentContext, WordsHandler};
use sst_text::lexicon::{LexiconLoader, SentimentDataHolder};

use error::InvalidVarError;

#[derive(Parser)]
#[clap(version = crate_version!(), author = crate_authors!(), about = crate_description!())]
struct Opts {
    #[clap(short, long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: MainCommand,
}

#[derive(Parser)]
enum MainCommand {
    /// Rate the sentiment of documents read from a file or stdin.
    Rate(rate::Opts),

    /// Aggregate sentiment by aspect over a corpus of documents.
    Aspects(aspects::Opts),
}

#[derive(Deserialize, Default)]
struct Config {
    lexicon: Option<LexiconConfig>,
    splitter: Option<SplitterConfig>,
    model: Option<ModelConfig>,
}

#[derive(Deserialize, Default)]
struct LexiconConfig {
    path: Option<PathBuf>,
    name: Option<String>,
}

#[derive(Deserialize, Default)]
struct SplitterConfig {
    workers: Option<usize>,
}

#[derive(Deserialize, Default)]
struct ModelConfig {
    path: Option<PathBuf>,
}

const DEFAULT_CONFIG_PATH: &str = "sentistar.yaml";

const DEFAULT_WORKERS: usize = 4;

const VAR_CONFIG_PATH: &str = "SST_CONFIG";

const VAR_LEXICON_PATH: &str = "SST_LEXICON_PATH";
const VAR_LEXICON_NAME: &str = "SST_LEXICON";
const VAR_WORKERS: &str = "SST_WORKERS";
const VAR_MODEL_PATH: &str = "SST_MODEL";

fn main() -> anyhow::Result<()> {
    #[cfg(feature = "dotenv")] {
        dotenv::dotenv().ok();
    }

    env_logger::init();

    let opts = Opts::parse();

    let config = match opts.config.as_deref() {
        Some(config_path) => load_config(config_path)
            .with_context(|| format!("failed to read config file {}", config_path.to_string_lossy()))?
            .with_context(|| format!("failed to parse config file {}", config_path.to_string_lossy()))?,

        None => match env::var_os(VAR_CONFIG_PATH) {
            Some(config_path) => load_config(config_path.as_ref())
                .with_context(|| format!("failed to read config file {}", config_path.to_string_lossy()))?
                .with_context(|| format!("failed to parse config file {}", config_path.to_string_lossy()))?,

            None => if cfg!(feature = "default-config-file") {
                load_config(DEFAULT_CONFIG_PATH.as_ref())
                    .ok()
                    .map(|res| res
                        .with_context(|| format!("failed to parse config file {}", DEFAULT_CONFIG_PATH)))
                    .transpose()?
                    .unwrap_or_default()
            } else {
                Config::default()
            },
        },
    };

    let settings = Settings::resolve(config)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?
        .block_on(run(opts, settings))
}

async fn run(opts: Opts, settings: Settings) -> anyhow::Result<()> {
    match opts.command {
        MainCommand::Rate(opts) => rate::run(&settings, opts).await,
        MainCommand::Aspects(opts) => aspects::run(&settings, opts).await,
    }
}

fn load_config(path: &Path) -> io::Result<serde_yaml::Result<Config>> {
    fs::read_to_string(path)
        .map(|contents| serde_yaml::from_str(&contents))
}

/// Effective configuration after merging the config file with the
/// environment; environment variables win.
pub(crate) struct Settings {
    pub(crate) workers: usize,
    pub(crate) lexicon_path: Option<PathBuf>,
    pub(crate) lexicon_name: Option<String>,
    pub(crate) model_path: Option<PathBuf>,
}

impl Settings {
    fn resolve(config: Config) -> anyhow::Result<Settings> {
        let lexicon_config = config.lexicon.unwrap_or_default();
        let splitter_config = config.splitter.unwrap_or_default();
        let model_config = config.model.unwrap_or_default();

        let workers = env_var_parse::<usize>(VAR_WORKERS)
            .context("failed to read worker count")?
            .or(splitter_config.workers)
            .unwrap_or(DEFAULT_WORKERS);

        if workers < 1 {
            return Err(anyhow!("worker count must be at least 1"));
        }

        let lexicon_path = env_var(VAR_LEXICON_PATH)
            .context("failed to read lexicon path")?
            .map(PathBuf::from)
            .or(lexicon_config.path);

        let lexicon_name = env_var(VAR_LEXICON_NAME)
            .context("failed to read lexicon name")?
            .or(lexicon_config.name);

        let model_path = env_var(VAR_MODEL_PATH)
            .context("failed to read model path")?
            .map(PathBuf::from)
            .or(model_config.path);

        Ok(Settings {
            workers,
            lexicon_path,
            lexicon_name,
            model_path,
        })
    }
}

/// Builds the immutable handler snapshot shared by every worker task.
/// Lexicon loading and weight adjustment happen here, with exclusive
/// access, before any scoring starts.
pub(crate) fn build_handler(
    settings: &Settings,
    context: SentimentContext,
    adjust: Option<&Path>,
    aspects: Option<Box<dyn AspectDetector>>,
) -> anyhow::Result<Arc<WordsHandler>> {
    let mut lexicon = match settings.lexicon_path.as_deref() {
        Some(path) if path.is_dir() => {
            let mut loader = LexiconLoader::new();
            loader.load(path)
                .with_context(|| format!("failed to load lexicons from {}", path.to_string_lossy()))?;

            let name = settings.lexicon_name.as_deref()
                .ok_or_else(|| anyhow!("a lexicon name is required when loading a lexicon directory"))?;

            loader.get_lexicon(name)
                .with_context(|| format!("failed to select lexicon {}", name))?
                .clone()
        },

        Some(path) => SentimentDataHolder::load(path)
            .with_context(|| format!("failed to load lexicon {}", path.to_string_lossy()))?,

        None => WordsHandler::default_lexicon(),
    };

    if let Some(adjust_path) = adjust {
        let applied = lexicon.adjust_weights(adjust_path)
            .with_context(|| format!("failed to apply weight adjustments from {}", adjust_path.to_string_lossy()))?;
        log::info!("applied {} weight adjustments", applied);
    }

    let mut handler = WordsHandler::new(lexicon, context);
    if let Some(aspects) = aspects {
        handler = handler.with_aspects(aspects);
    }

    Ok(Arc::new(handler))
}

/// The trained model if one is configured, otherwise the null model that
/// defers to the raw lexicon rating.
pub(crate) fn load_model(settings: &Settings) -> anyhow::Result<Arc<dyn MachineSentiment>> {
    match settings.model_path.as_deref() {
        Some(path) => {
            let model = LinearModel::load(path)
                .with_context(|| format!("failed to load model {}", path.to_string_lossy()))?;
            Ok(Arc::new(model))
        },
        None => Ok(Arc::new(NullMachineSentiment)),
    }
}

/// Reads documents to score, one per line, from a file or stdin.
pub(crate) async fn read_documents(file: Option<&Path>) -> anyhow::Result<Vec<String>> {
    let input = match file {
        Some(input_path) =>
            tokio::fs::read_to_string(input_path)
                .await
                .with_context(|| format!("failed to read input file {}", input_path.to_string_lossy()))?,

        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read from stdin")?;
            buf
        },
    };

    Ok(input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

fn env_var(key: &str) -> Result<Option<String>, InvalidVarError> {
    match env::var(key) {
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(bad_str)) => Err(InvalidVarError::invalid_utf8(bad_str)),
    }
}

fn env_var_parse<T>(key: &str) -> Result<Option<T>, InvalidVarError>
where
    T: FromStr,
{
    env_var(key)
        .and_then(|val| val
            .map(|val| val
                .parse::<T>()
                .map_err(|_| InvalidVarError::parse_error(val.into())))
            .transpose())
}
