use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use spdlog::{info, warn};

use podium::config::{read_config_or_default, ConfigHandle, SiteConfig};
use podium::logger::configure_logger;
use podium::server::server_run;
use podium::service::{ServiceAction, ServiceManager, ServiceSpec};
use podium::watcher::{start_watcher, ConfigWatcher, WatchTargets};

use crate::config::find_config;

mod config;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,

    /// Development mode: no caching, no minification, reload on file changes
    #[arg(short, long)]
    dev: bool,

    /// Manage the background service: install, uninstall, start, stop or restart
    #[arg(short, long)]
    service: Option<ServiceAction>,
}

fn run_service(action: ServiceAction, cfg_path: Option<&Path>) -> Result<()> {
    let mut args = vec![];
    if let Some(cfg_path) = cfg_path {
        let cfg_path = fs::canonicalize(cfg_path).unwrap_or_else(|_| cfg_path.to_path_buf());
        args.push("--config-path".to_string());
        args.push(cfg_path.to_string_lossy().to_string());
    }

    let spec = ServiceSpec::current(args)?;
    let manager = ServiceManager::detect()?;
    manager.run(action, &spec)
        .with_context(|| format!("Service action {:?} failed", action))
}

fn create_folders(config: &SiteConfig) -> Result<()> {
    for dir in config.paths.all() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Could not create folder {}", dir.display()))?;
    }
    Ok(())
}

fn watch(config: &Arc<ConfigHandle>, cfg_path: Option<PathBuf>, dev_mode: bool) -> Option<ConfigWatcher> {
    let targets = if dev_mode {
        let snapshot = config.snapshot();
        WatchTargets {
            cfg_path,
            content_dirs: snapshot.paths.all().iter().map(|dir| dir.to_path_buf()).collect(),
        }
    } else {
        WatchTargets::config_only(cfg_path?)
    };

    match start_watcher(config.clone(), targets) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            warn!("Could not start file watcher, changes need a restart: {}", e);
            None
        }
    }
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let cfg_path = find_config(args.config_path.map(PathBuf::from));

    let config = read_config_or_default(cfg_path.as_deref());
    if let Err(err) = configure_logger(&config, args.dev) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    if let Some(action) = args.service {
        return run_service(action, cfg_path.as_deref());
    }

    create_folders(&config)?;

    info!("Starting Podium =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
    let config = Arc::new(ConfigHandle::new(config));
    let _watcher = watch(&config, cfg_path, args.dev);

    server_run(config, args.dev).await?;
    Ok(())
}
