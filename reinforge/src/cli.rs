//! Command line arguments.
use crate::{
    app::RUN_CONFIG_FILE,
    config::{EnvSection, RunConfig},
};
use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};
use reinforge_env::{ProcessEnvConfig, ScoreThresholdConfig};
use chrono::{Local, NaiveDate};
use std::path::PathBuf;

/// Train a REINFORCE policy that picks transformation actions against a scoring environment
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Train an agent and save checkpoints periodically
    Train(TrainArgs),

    /// Run greedy episodes with a saved checkpoint and print the mean total reward
    Eval(EvalArgs),
}

/// Logging level.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvKind {
    /// Seeded synthetic environment
    Synthetic,
}

#[derive(Args, Debug)]
pub struct LogArgs {
    /// Logging level; `RUST_LOG` is used if not given
    #[arg(short, long, value_enum)]
    pub log: Option<LogLevel>,

    /// Append logs to this file in addition to stderr; defaults to
    /// `logs/reinforge-<YYYY-MM-DD>.log`
    #[arg(long, conflicts_with = "no_logfile")]
    pub logfile: Option<PathBuf>,

    /// Log to stderr only
    #[arg(long)]
    pub no_logfile: bool,
}

/// Log file of a run started on `date`.
pub fn default_logfile(date: NaiveDate) -> PathBuf {
    PathBuf::from("logs").join(format!("reinforge-{}.log", date.format("%Y-%m-%d")))
}

impl LogArgs {
    /// File the logs are appended to, if any.
    pub fn logfile_path(&self) -> Option<PathBuf> {
        match (&self.logfile, self.no_logfile) {
            (_, true) => None,
            (Some(path), false) => Some(path.clone()),
            (None, false) => Some(default_logfile(Local::now().date_naive())),
        }
    }
}

#[derive(Args, Debug)]
pub struct EnvArgs {
    /// Built-in environment
    #[arg(long, value_enum, conflicts_with = "env_cmd")]
    pub env: Option<EnvKind>,

    /// Command line of an environment process speaking the JSON-lines protocol
    #[arg(long)]
    pub env_cmd: Option<String>,
}

impl EnvArgs {
    fn apply(&self, config: &mut RunConfig) -> Result<()> {
        if let Some(cmd) = &self.env_cmd {
            config.env = EnvSection::Process(ProcessEnvConfig::from_command_line(cmd)?);
        } else if let Some(EnvKind::Synthetic) = self.env {
            if !matches!(config.env, EnvSection::Synthetic(_)) {
                config.env = EnvSection::Synthetic(ScoreThresholdConfig::default());
            }
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// YAML file of the run configuration; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub env: EnvArgs,

    /// Discount factor
    #[arg(long)]
    pub rl_gamma: Option<f64>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<i64>,

    /// Number of episodes
    #[arg(long)]
    pub rl_episodes: Option<usize>,

    /// Maximum number of actions applied per episode
    #[arg(long)]
    pub rl_mutations: Option<usize>,

    /// Interval of saving the model in episodes, 0 disables saving
    #[arg(long)]
    pub rl_save_model_interval: Option<usize>,

    /// Directory of checkpoints
    #[arg(long)]
    pub rl_output_directory: Option<PathBuf>,

    #[command(flatten)]
    pub log: LogArgs,

    /// Write per-episode scalars for tensorboard into this directory
    #[arg(long)]
    pub tensorboard: Option<PathBuf>,
}

impl TrainArgs {
    /// Run configuration: defaults, then the YAML file, then flags.
    pub fn run_config(&self) -> Result<RunConfig> {
        let mut config = load_or_default(&self.config)?;
        self.env.apply(&mut config)?;
        if let Some(v) = self.rl_gamma {
            config.agent.discount_factor = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.rl_episodes {
            config.trainer.max_episodes = v;
        }
        if let Some(v) = self.rl_mutations {
            config.trainer.max_steps = v;
        }
        if let Some(v) = self.rl_save_model_interval {
            config.trainer.save_interval = v;
        }
        if let Some(v) = &self.rl_output_directory {
            config.trainer.model_dir = v.to_string_lossy().into_owned();
        }
        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Checkpoint written by `train`
    #[arg(long)]
    pub model: PathBuf,

    /// Number of episodes
    #[arg(long, default_value_t = 10)]
    pub episodes: usize,

    /// YAML file of the run configuration used for training; defaults to the
    /// `run.yaml` saved next to the model, if any
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub env: EnvArgs,

    /// Random seed of the environment
    #[arg(long)]
    pub seed: Option<i64>,

    /// Maximum number of actions applied per episode
    #[arg(long)]
    pub rl_mutations: Option<usize>,

    #[command(flatten)]
    pub log: LogArgs,
}

impl EvalArgs {
    fn config_path(&self) -> Option<PathBuf> {
        if self.config.is_some() {
            return self.config.clone();
        }
        let path = self.model.parent()?.join(RUN_CONFIG_FILE);
        if path.is_file() {
            info!("Use the run configuration saved with the model: {:?}", path);
            Some(path)
        } else {
            None
        }
    }

    /// Run configuration: defaults, then the YAML file, then flags.
    pub fn run_config(&self) -> Result<RunConfig> {
        let mut config = load_or_default(&self.config_path())?;
        self.env.apply(&mut config)?;
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.rl_mutations {
            config.trainer.max_steps = v;
        }
        Ok(config)
    }
}

fn load_or_default(path: &Option<PathBuf>) -> Result<RunConfig> {
    match path {
        Some(path) => RunConfig::load(path),
        None => Ok(RunConfig::default()),
    }
}
