use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use primewalk::state::Dimensions;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "primewalk", version, about = "Pen walks steered by primality, with resumable checkpoints")]
pub struct Cli {
    /// Used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a run, or resume it from its checkpoint
    Run(RunArgs),
    /// List the registered cases
    Cases,
    /// Summarise a checkpoint file
    Inspect {
        #[arg(value_name = "CHECKPOINT")]
        path: PathBuf,
    },
    /// Write the point columns of a checkpoint as JSON, one file per case
    Export {
        #[arg(value_name = "CHECKPOINT")]
        path: PathBuf,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// TOML file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Root directory; the run lives in `<output>/<max>`
    #[arg(long)]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub min: Option<i64>,
    #[arg(long)]
    pub max: Option<i64>,
    #[arg(long)]
    pub checkpoint_interval: Option<u64>,
    #[arg(long, value_delimiter = ',')]
    pub cases: Option<Vec<String>>,
    #[arg(long, default_value_t = false)]
    pub caching: bool,
    #[arg(long, default_value_t = false)]
    pub no_dedup: bool,
    #[arg(long)]
    pub lifetime: Option<u32>,
    /// Walk in three dimensions
    #[arg(long, default_value_t = false)]
    pub spatial: bool,
    /// Ignore any existing checkpoint
    #[arg(long, default_value_t = false)]
    pub fresh: bool,
    /// Newline-delimited list of known primes
    #[arg(long)]
    pub primes: Option<PathBuf>,
    /// Newline-delimited list of known composites
    #[arg(long)]
    pub composites: Option<PathBuf>,
}

impl RunArgs {
    pub fn merge_into_config(self, mut cfg: AppConfig) -> AppConfig {
        if let Some(v) = self.output {
            cfg.output = v;
        }
        if let Some(v) = self.min {
            cfg.run.min = v;
        }
        if let Some(v) = self.max {
            cfg.run.max = v;
        }
        if let Some(v) = self.checkpoint_interval {
            cfg.run.checkpoint_interval = v;
        }
        if let Some(v) = self.cases {
            cfg.run.cases = v;
        }
        if self.caching {
            cfg.run.caching = true;
        }
        if self.no_dedup {
            cfg.run.dedup = false;
        }
        if let Some(v) = self.lifetime {
            cfg.run.lifetime = Some(v);
        }
        if self.spatial {
            cfg.run.dimensions = Dimensions::Spatial;
        }
        if self.fresh {
            cfg.run.resume = false;
        }
        if let Some(v) = self.primes {
            cfg.primes = Some(v);
        }
        if let Some(v) = self.composites {
            cfg.composites = Some(v);
        }
        cfg
    }
}
