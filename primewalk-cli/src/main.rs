use std::fs;

use anyhow::Context;
use clap::Parser;
use log::info;
use primewalk::checkpoint::CheckpointManager;
use primewalk::driver::Driver;
use primewalk::generator::CaseRegistry;
use primewalk::oracle::PrimeOracle;
use primewalk::stats::CaseReport;

mod cli;
mod config;
mod export;
mod seeds;
mod sink;

use cli::{Cli, Commands, RunArgs};
use config::AppConfig;
use sink::CsvSink;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", &cli.log_level);
    }
    env_logger::init();

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Cases => {
            for entry in CaseRegistry::builtin().iter() {
                println!("{:<4} {}", entry.id, entry.title);
            }
            Ok(())
        }
        Commands::Inspect { path } => inspect(&CheckpointManager::new(path)),
        Commands::Export { path, out } => {
            let manager = CheckpointManager::new(path);
            let snapshot =
                manager.load()?.with_context(|| format!("no checkpoint at {}", manager.path().display()))?;
            for written in export::export_snapshot(&snapshot, &out)? {
                info!("wrote {}", written.display());
            }
            Ok(())
        }
    }
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let file_cfg = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let cfg = args.merge_into_config(file_cfg);

    let mut oracle = PrimeOracle::new(cfg.run.caching);
    if let Some(path) = &cfg.primes {
        let added = oracle.seed(seeds::load_seed_file(path)?, true)?;
        info!("seeded {added} primes from {}", path.display());
    }
    if let Some(path) = &cfg.composites {
        let added = oracle.seed(seeds::load_seed_file(path)?, false)?;
        info!("seeded {added} composites from {}", path.display());
    }

    let run_dir = cfg.run_dir();
    fs::create_dir_all(&run_dir).with_context(|| format!("creating run directory {}", run_dir.display()))?;
    let registry = CaseRegistry::builtin();
    let mut driver = Driver::with_oracle(cfg.run.clone(), &registry, oracle, CsvSink::new(cfg.stats_path()))?
        .with_checkpoints(CheckpointManager::new(cfg.checkpoint_path()));
    driver.run()?;
    info!("run directory: {}", run_dir.display());
    Ok(())
}

fn inspect(manager: &CheckpointManager) -> anyhow::Result<()> {
    let snapshot = manager.load()?.with_context(|| format!("no checkpoint at {}", manager.path().display()))?;
    println!("checkpoint: {}", manager.path().display());
    println!("sha256:     {}", faster_hex::hex_string(&snapshot.digest()?));
    println!("cursor:     {} (started at {})", snapshot.cursor, snapshot.start);
    println!("dimensions: {:?}", snapshot.dimensions);
    for track in &snapshot.cases {
        let r = CaseReport::collect(track, snapshot.dimensions);
        let mode = track.store.mode();
        println!(
            "{:<4} iterations={} primes={} ({}%) points={} extent={}x{}x{} dedup={} lifetime={:?}",
            r.case,
            r.iterations,
            r.primes,
            r.percent_primes,
            r.point_count,
            r.extent.x,
            r.extent.y,
            r.extent.z,
            mode.dedup,
            mode.lifetime
        );
    }
    Ok(())
}
