use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::{env, fs, io};

use serde::Deserialize;
use spdlog::{info, warn};

use crate::util::os_helper::get_name;

pub const CFG_FILE_NAME: &str = "podium.toml";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POSTS_PER_PAGE: usize = 10;
const DEFAULT_FEED_ITEMS: usize = 20;
const DEFAULT_EXCERPT_LENGTH: usize = 200;

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Site {
    pub title: String,
    pub description: String,
    pub author: String,
    pub author_url: String,
    pub url: String,
    pub home_intro: String,
    pub show_quick_links: bool,
}

impl Default for Site {
    fn default() -> Self {
        Site {
            title: "Podium".to_string(),
            description: "A simple and elegant blogging platform".to_string(),
            author: get_name(),
            author_url: String::new(),
            url: String::new(),
            home_intro: String::new(),
            show_quick_links: true,
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Paths {
    pub posts_dir: PathBuf,
    pub pages_dir: PathBuf,
    pub template_dir: PathBuf,
    pub assets_dir: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            posts_dir: PathBuf::from("posts"),
            pages_dir: PathBuf::from("static"),
            template_dir: PathBuf::from("templates"),
            assets_dir: PathBuf::from("assets"),
        }
    }
}

impl Paths {
    /// Folders the server expects to exist before it starts answering requests.
    pub fn all(&self) -> [&Path; 4] {
        [
            self.pages_dir.as_path(),
            self.posts_dir.as_path(),
            self.template_dir.as_path(),
            self.assets_dir.as_path(),
        ]
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Defaults {
    pub posts_per_page: usize,
    pub feed_items: usize,
    pub excerpt_length: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            posts_per_page: DEFAULT_POSTS_PER_PAGE,
            feed_items: DEFAULT_FEED_ITEMS,
            excerpt_length: DEFAULT_EXCERPT_LENGTH,
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Social {
    pub show_links: bool,
    pub twitter: String,
    pub bluesky: String,
    pub linkedin: String,
    pub github: String,
    pub reddit: String,
    pub facebook: String,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Analytics {
    pub umami_script_url: String,
    pub umami_website_id: String,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Log {
    pub level: LogLevel,
    #[serde(default)]
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub site: Site,
    pub server: Server,
    pub paths: Paths,
    pub defaults: Defaults,
    pub social: Social,
    pub analytics: Analytics,
    pub log: Option<Log>,
}

impl SiteConfig {
    /// Replaces zero-valued tunables with their defaults.
    fn normalize(mut self) -> Self {
        if self.defaults.posts_per_page == 0 {
            self.defaults.posts_per_page = DEFAULT_POSTS_PER_PAGE;
        }
        if self.defaults.feed_items == 0 {
            self.defaults.feed_items = DEFAULT_FEED_ITEMS;
        }
        if self.defaults.excerpt_length == 0 {
            self.defaults.excerpt_length = DEFAULT_EXCERPT_LENGTH;
        }
        if self.server.port == 0 {
            self.server.port = DEFAULT_PORT;
        }
        if self.site.url.is_empty() {
            self.site.url = format!("http://localhost:{}", self.server.port);
        }
        self.site.url = self.site.url.trim_end_matches('/').to_string();

        self.paths = Paths {
            posts_dir: parse_path(self.paths.posts_dir),
            pages_dir: parse_path(self.paths.pages_dir),
            template_dir: parse_path(self.paths.template_dir),
            assets_dir: parse_path(self.paths.assets_dir),
        };

        self
    }

    /// Built-in configuration used when no file can be loaded.
    pub fn fallback() -> Self {
        SiteConfig::default().normalize()
    }
}

fn parse_path(path: PathBuf) -> PathBuf {
    let Some(str_path) = path.to_str() else {
        return path;
    };
    if !str_path.starts_with("${exe_dir}") {
        return path;
    }

    let exe_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    match exe_dir {
        Some(exe_dir) => PathBuf::from(str_path.replace("${exe_dir}", &exe_dir.to_string_lossy())),
        None => path,
    }
}

pub fn parse_config(cfg_content: &str) -> io::Result<SiteConfig> {
    match toml::from_str::<SiteConfig>(cfg_content) {
        Ok(cfg) => Ok(cfg.normalize()),
        Err(e) => Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    }
}

pub fn read_config(cfg_path: &Path) -> io::Result<SiteConfig> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}

/// Reads the configuration, falling back to the built-in defaults when the file
/// is missing or invalid.
pub fn read_config_or_default(cfg_path: Option<&Path>) -> SiteConfig {
    let Some(cfg_path) = cfg_path else {
        warn!("No {} found, using defaults", CFG_FILE_NAME);
        return SiteConfig::fallback();
    };

    match read_config(cfg_path) {
        Ok(cfg) => {
            info!("Configuration loaded from {}", cfg_path.display());
            cfg
        }
        Err(e) => {
            warn!("Could not load configuration, using defaults: {}", e);
            SiteConfig::fallback()
        }
    }
}

/// Shared, swappable configuration snapshot.
///
/// Readers clone the inner `Arc` and keep a consistent view for the whole request;
/// a reload replaces the pointer in one step.
pub struct ConfigHandle {
    current: RwLock<Arc<SiteConfig>>,
}

impl ConfigHandle {
    pub fn new(config: SiteConfig) -> Self {
        ConfigHandle {
            current: RwLock::new(Arc::new(config)),
        }
    }

    pub fn snapshot(&self) -> Arc<SiteConfig> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn replace(&self, config: SiteConfig) {
        let config = Arc::new(config);
        match self.current.write() {
            Ok(mut guard) => *guard = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
    }

    /// Re-reads `cfg_path` and swaps it in. The previous snapshot stays active on error.
    pub fn reload_from(&self, cfg_path: &Path) -> io::Result<()> {
        let config = read_config(cfg_path)?;
        self.replace(config);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
[site]
title = "My blog"
description = "Things I write"
author = "Jane"
url = "https://example.com/"

[server]
address = "127.0.0.1"
port = 9000

[defaults]
posts_per_page = 5
feed_items = 0
"##;

    #[test]
    fn test_parse_sample() {
        let cfg = parse_config(SAMPLE).unwrap();
        assert_eq!(cfg.site.title, "My blog");
        assert_eq!(cfg.site.url, "https://example.com");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.defaults.posts_per_page, 5);
        assert_eq!(cfg.defaults.feed_items, 20);
        assert_eq!(cfg.defaults.excerpt_length, 200);
        assert_eq!(cfg.paths.posts_dir, PathBuf::from("posts"));
        assert!(cfg.log.is_none());
    }

    #[test]
    fn test_empty_url_uses_port() {
        let cfg = parse_config("[server]\nport = 8123\n").unwrap();
        assert_eq!(cfg.site.url, "http://localhost:8123");
    }

    #[test]
    fn test_invalid_config() {
        let err = parse_config("[defaults]\nposts_per_page = \"ten\"\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let cfg = read_config_or_default(Some(Path::new("/definitely/not/here/podium.toml")));
        assert_eq!(cfg.site.title, "Podium");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.site.url, "http://localhost:8080");
    }

    #[test]
    fn test_log_section() {
        let cfg = parse_config("[log]\nlevel = \"Debug\"\nlog_to_console = true\n").unwrap();
        let log = cfg.log.unwrap();
        assert_eq!(log.level, LogLevel::Debug);
        assert!(log.log_to_console);
        assert!(log.location.is_none());
    }

    #[test]
    fn test_handle_swaps_snapshot() {
        let handle = ConfigHandle::new(SiteConfig::fallback());
        let before = handle.snapshot();

        let mut updated = SiteConfig::fallback();
        updated.site.title = "Renamed".to_string();
        handle.replace(updated);

        assert_eq!(before.site.title, "Podium");
        assert_eq!(handle.snapshot().site.title, "Renamed");
    }

    #[test]
    fn test_reload_keeps_previous_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_path = dir.path().join(CFG_FILE_NAME);
        fs::write(&cfg_path, "[site]\ntitle = \"First\"\n").unwrap();

        let handle = ConfigHandle::new(read_config(&cfg_path).unwrap());
        fs::write(&cfg_path, "[site\ntitle = ").unwrap();
        assert!(handle.reload_from(&cfg_path).is_err());
        assert_eq!(handle.snapshot().site.title, "First");

        fs::write(&cfg_path, "[site]\ntitle = \"Second\"\n").unwrap();
        handle.reload_from(&cfg_path).unwrap();
        assert_eq!(handle.snapshot().site.title, "Second");
    }
}
