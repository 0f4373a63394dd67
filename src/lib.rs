// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod resource;
pub mod sampler;
pub mod store;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::resource::{FileResource, Resource};
use crate::sampler::Sampler;
use crate::store::{store_for_mode, LastResource, Seed};
use crate::watch::{Notification, WatchController};

/// Environment variable naming the file to watch when no PATH is given.
pub const FILE_ENV_VAR: &str = "SAMPLEWATCH_FILE";

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (+ CLI overrides)
/// - the remembered last file
/// - the watch controller and its notification channel
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = config::resolve(args.config.as_deref(), args.overrides())?;

    let state_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let store = store_for_mode(cfg.store().handle_storage_mode, state_dir);

    let seed = match args.path.clone() {
        Some(path) => Seed::Initial(Some(path)),
        None => Seed::lazy(|| std::env::var_os(FILE_ENV_VAR).map(PathBuf::from)),
    };
    let mut last = LastResource::from_store(store).with_seed(seed);

    if args.forget {
        last.forget()?;
        println!("[samplewatch] forgot the last watched file");
        return Ok(());
    }

    let path = last
        .current()
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("no file given and no previously watched file remembered"))?;

    if args.regions {
        print_regions(&path, &cfg)?;
        last.remember(&path)?;
        return Ok(());
    }

    let (notify_tx, mut notify_rx) = mpsc::channel::<Notification>(64);
    let mut controller = WatchController::new(notify_tx);

    controller
        .start(Arc::new(FileResource::new(&path)), cfg.watch_settings())
        .await
        .with_context(|| format!("starting to watch {}", path.display()))?;
    last.remember(&path)?;

    println!("[samplewatch] watching {}", path.display());

    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    eprintln!("failed to listen for Ctrl+C: {e}");
                }
                info!("Ctrl-C received; stopping");
                break;
            }
            maybe = notify_rx.recv() => {
                let Some(notification) = maybe else {
                    debug!("notification channel closed");
                    break;
                };
                print_notification(&notification);
                if let Notification::Stopped(_) = notification {
                    break;
                }
            }
        }
    }

    controller.stop().await;
    Ok(())
}

fn print_notification(notification: &Notification) {
    match notification {
        Notification::ReadError(cause) => {
            println!("[samplewatch] {}: {cause}", notification.label());
        }
        Notification::Stopped(reason) => {
            println!("[samplewatch] {} ({reason:?})", notification.label());
        }
        _ => println!("[samplewatch] {}", notification.label()),
    }
}

/// `--regions` output: where the sampler would look and how much it covers.
fn print_regions(path: &Path, cfg: &ConfigFile) -> Result<()> {
    let resource = FileResource::new(path);
    let snapshot = resource.snapshot()?;

    let mut sampler = Sampler::new(cfg.sampler_settings());
    sampler.init(&snapshot)?;

    let Some(baseline) = sampler.baseline() else {
        return Ok(());
    };

    println!("samplewatch regions for {}", path.display());
    println!("  size = {} bytes", baseline.size());
    println!(
        "  block_size = {}, sample_count = {}",
        cfg.sampler().block_size,
        cfg.sampler().sample_count
    );
    println!("  coverage = {}", baseline.coverage());
    if baseline.is_exact() {
        println!("  (whole file captured: comparisons are exact)");
    }
    println!();

    println!("regions ({}):", baseline.samples().len());
    for region in baseline.regions() {
        println!("  - {region}");
    }

    Ok(())
}
