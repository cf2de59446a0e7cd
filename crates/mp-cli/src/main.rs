/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Pipeline launcher: wires configuration, spawns the long-lived loops,
//! and coordinates cooperative shutdown. The process is headless; its
//! operator surface is the log stream and the database.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use mp_analysis::{AnalysisConfig, Dispatcher, Janitor, LocationClassifier, Worker};
use mp_client::ClassifierClient;
use mp_core::settings::FileSource;
use mp_core::{Config, Settings};
use mp_database_postgres::{DatabaseContext, StoreSettingsSource};
use mp_engine::{ClassifierLabeler, Engine, EngineConfig, IssueDetector};
use mp_ingest::{
  Collector, DatasetStream, DatasetTailer, DedupConfig, DedupWriter, IntervalScheduler,
  Normalizer, NormalizerConfig, SchedulerConfig,
};

/// How often the store-backed settings layer is refreshed
const SETTINGS_REFRESH_SECS: u64 = 30;

#[derive(Parser, Debug)]
#[command(name = "mediapulse", about = "Continuous media-monitoring pipeline")]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Run every pipeline loop until interrupted
  Run,
  /// One janitor sweep: return stale processing claims to pending
  Sweep,
}

#[tokio::main]
async fn main() -> Result<()> {
  // Load environment variables
  dotenv().ok();

  let cli = Cli::parse();

  let log_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt().with_env_filter(log_level).init();

  let config = Config::from_env().context("configuration")?;

  let db = DatabaseContext::new(&config.database_url).await.context("database")?;

  match cli.command {
    Commands::Run => run(config, db).await,
    Commands::Sweep => sweep(config, db).await,
  }
}

async fn sweep(config: Config, db: DatabaseContext) -> Result<()> {
  let settings = build_settings(&config, &db).await?;
  let stale_secs = settings.i64_or("processing.timeouts.stale_claim_seconds", 300);
  let janitor = Janitor::new(db.mention_repository(), stale_secs);
  let reset = janitor.sweep().await.context("janitor sweep")?;
  info!("reset {} stale claims", reset);
  Ok(())
}

async fn run(config: Config, db: DatabaseContext) -> Result<()> {
  let store_source = Arc::new(StoreSettingsSource::new());
  let settings = build_settings_with_store(&config, &db, Arc::clone(&store_source)).await?;

  let (shutdown_tx, shutdown_rx) = watch::channel(false);
  let mut tasks = Vec::new();

  // settings refresh loop so store-backed overrides apply without restart
  {
    let state_repo = db.ingest_state_repository();
    let store_source = Arc::clone(&store_source);
    let mut shutdown = shutdown_rx.clone();
    tasks.push(tokio::spawn(async move {
      loop {
        if *shutdown.borrow() {
          break;
        }
        if let Err(e) = store_source.refresh(state_repo.as_ref()).await {
          warn!("settings refresh failed: {}", e);
        }
        tokio::select! {
          _ = tokio::time::sleep(Duration::from_secs(SETTINGS_REFRESH_SECS)) => {}
          _ = shutdown.changed() => {}
        }
      }
    }));
  }

  // ingestion: dedup writer + interval scheduler over the registered
  // collectors (per-platform adapters are linked by deployment builds)
  let writer =
    Arc::new(DedupWriter::new(db.mention_repository(), DedupConfig::from_settings(&settings)));
  let normalizer = Normalizer::new(NormalizerConfig::from_settings(&settings));
  let collectors: Vec<Arc<dyn Collector>> = Vec::new();
  if collectors.is_empty() {
    warn!("no collectors registered; ingestion will be idle");
  }
  let scheduler = Arc::new(IntervalScheduler::new(
    collectors,
    db.ingest_state_repository(),
    Arc::clone(&writer),
    normalizer.clone(),
    SchedulerConfig::from_settings(&settings),
  ));
  {
    let shutdown = shutdown_rx.clone();
    tasks.push(tokio::spawn(async move { scheduler.run(shutdown).await }));
  }

  // one tailer loop per registered long-lived dataset (deployment-linked,
  // same as collectors)
  let datasets: Vec<Arc<dyn DatasetStream>> = Vec::new();
  let tail_interval =
    Duration::from_secs(settings.u64_or("ingestion.tail_interval_seconds", 30));
  for dataset in datasets {
    let tailer = DatasetTailer::new(
      dataset,
      db.ingest_state_repository(),
      Arc::clone(&writer),
      normalizer.clone(),
      tail_interval,
    );
    let shutdown = shutdown_rx.clone();
    tasks.push(tokio::spawn(async move { tailer.run(shutdown).await }));
  }

  // analysis: dispatcher + worker pool + janitor
  let analysis_config = Arc::new(AnalysisConfig::from_settings(&settings));
  let client = Arc::new(ClassifierClient::new(&config).context("classifier client")?);
  let location = match settings.get_raw("processing.location.rules_file") {
    Some(path) => {
      let contents =
        std::fs::read_to_string(&path).with_context(|| format!("location rules {}", path))?;
      Arc::new(LocationClassifier::from_json(&contents).context("location rules")?)
    }
    None => {
      warn!("no location rules configured; location phase will classify nothing");
      Arc::new(LocationClassifier::default())
    }
  };
  let worker = Arc::new(Worker::new(
    Arc::clone(&client),
    db.issue_repository(),
    location,
    Arc::clone(&analysis_config),
    config.embedding_model.clone(),
  ));
  let dispatcher = Arc::new(Dispatcher::new(
    db.mention_repository(),
    db.topic_repository(),
    worker,
    Arc::clone(&analysis_config),
  ));
  {
    let shutdown = shutdown_rx.clone();
    let dispatcher = Arc::clone(&dispatcher);
    tasks.push(tokio::spawn(async move { dispatcher.run(shutdown).await }));
  }

  let janitor = Janitor::new(db.mention_repository(), analysis_config.stale_claim_secs);
  {
    let shutdown = shutdown_rx.clone();
    tasks.push(tokio::spawn(async move { janitor.run(shutdown).await }));
  }

  // issue detection + aggregation engine
  let engine_config = EngineConfig::from_settings(&settings);
  let detector = IssueDetector::new(
    db.issue_repository(),
    Arc::new(ClassifierLabeler::new(Arc::clone(&client))),
    engine_config.detection.clone(),
  );
  let engine = Engine::new(
    db.topic_repository(),
    db.issue_repository(),
    db.aggregate_repository(),
    detector,
    engine_config,
  );
  {
    let shutdown = shutdown_rx.clone();
    tasks.push(tokio::spawn(async move { engine.run(shutdown).await }));
  }

  info!("mediapulse pipeline running; Ctrl-C to stop");
  tokio::signal::ctrl_c().await.context("signal handler")?;
  info!("shutdown requested");
  let _ = shutdown_tx.send(true);

  let grace = settings.u64_or("processing.timeouts.shutdown_grace_seconds", 30);
  let drain = async {
    for task in tasks {
      let _ = task.await;
    }
    dispatcher.drain().await;
  };
  if tokio::time::timeout(Duration::from_secs(grace), drain).await.is_err() {
    warn!("shutdown grace of {}s elapsed, exiting with work in flight", grace);
  }

  let (analyzed, failed) = dispatcher.stats().snapshot();
  let (inserted, updated, rejected) = writer.stats().snapshot();
  info!(
    "final counters: inserted={} updated={} rejected={} analyzed={} failed={}",
    inserted, updated, rejected, analyzed, failed
  );

  Ok(())
}

async fn build_settings(config: &Config, db: &DatabaseContext) -> Result<Settings> {
  let store_source = Arc::new(StoreSettingsSource::new());
  build_settings_with_store(config, db, store_source).await
}

async fn build_settings_with_store(
  config: &Config,
  db: &DatabaseContext,
  store_source: Arc<StoreSettingsSource>,
) -> Result<Settings> {
  let state_repo = db.ingest_state_repository();
  if let Err(e) = store_source.refresh(state_repo.as_ref()).await {
    warn!("initial settings refresh failed: {}", e);
  }

  let file = match &config.settings_file {
    Some(path) => Some(FileSource::from_path(path).with_context(|| format!("settings file {}", path))?),
    None => None,
  };

  Ok(Settings::new(Some(store_source as _), file))
}
