//! Installs and controls Podium as a per-user background service: a systemd
//! user unit on Linux, a launchd agent on macOS.

use std::fmt::Display;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use std::{env, fs, io};

use quick_xml::escape::escape;
use spdlog::{info, warn};

pub const SERVICE_NAME: &str = "podium";
pub const LAUNCHD_LABEL: &str = "com.podium.server";
const DESCRIPTION: &str = "A lightweight web server for hosting markdown-based websites and blogs";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ServiceAction {
    Install,
    Uninstall,
    Start,
    Stop,
    Restart,
}

impl FromStr for ServiceAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "install" => Ok(ServiceAction::Install),
            "uninstall" => Ok(ServiceAction::Uninstall),
            "start" => Ok(ServiceAction::Start),
            "stop" => Ok(ServiceAction::Stop),
            "restart" => Ok(ServiceAction::Restart),
            other => Err(format!("unknown service action: {} (expected install, uninstall, start, stop or restart)", other)),
        }
    }
}

/// What the service runs.
#[derive(Debug, Clone)]
pub struct ServiceSpec {
    pub executable: PathBuf,
    pub working_dir: PathBuf,
    pub args: Vec<String>,
}

impl ServiceSpec {
    /// The running executable, started from the current directory.
    pub fn current(args: Vec<String>) -> io::Result<ServiceSpec> {
        Ok(ServiceSpec {
            executable: env::current_exe()?,
            working_dir: env::current_dir()?,
            args,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceManager {
    Systemd { unit_path: PathBuf },
    Launchd { plist_path: PathBuf },
}

impl ServiceManager {
    pub fn detect() -> io::Result<ServiceManager> {
        if cfg!(target_os = "linux") {
            let Some(config_dir) = dirs::config_dir() else {
                return Err(io::Error::new(ErrorKind::NotFound, "Could not find the user configuration folder"));
            };
            return Ok(ServiceManager::Systemd {
                unit_path: config_dir.join("systemd").join("user").join(format!("{}.service", SERVICE_NAME)),
            });
        }

        if cfg!(target_os = "macos") {
            let Some(home_dir) = dirs::home_dir() else {
                return Err(io::Error::new(ErrorKind::NotFound, "Could not find the home folder"));
            };
            return Ok(ServiceManager::Launchd {
                plist_path: home_dir.join("Library").join("LaunchAgents").join(format!("{}.plist", LAUNCHD_LABEL)),
            });
        }

        Err(io::Error::new(ErrorKind::Unsupported, format!("Service management is not supported on {}", env::consts::OS)))
    }

    pub fn definition_path(&self) -> &Path {
        match self {
            ServiceManager::Systemd { unit_path } => unit_path,
            ServiceManager::Launchd { plist_path } => plist_path,
        }
    }

    pub fn run(&self, action: ServiceAction, spec: &ServiceSpec) -> io::Result<()> {
        match action {
            ServiceAction::Install => self.install(spec),
            ServiceAction::Uninstall => self.uninstall(),
            ServiceAction::Start => self.start(),
            ServiceAction::Stop => self.stop(),
            ServiceAction::Restart => self.restart(),
        }
    }

    fn install(&self, spec: &ServiceSpec) -> io::Result<()> {
        let path = self.definition_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        match self {
            ServiceManager::Systemd { .. } => {
                fs::write(path, systemd_unit(spec))?;
                systemctl(&["daemon-reload"])?;
                systemctl(&["enable", &unit_name()])?;
            }
            ServiceManager::Launchd { .. } => {
                fs::write(path, launchd_plist(spec))?;
            }
        }

        info!("Service installed at {}. Use '--service start' to start it", path.display());
        Ok(())
    }

    fn uninstall(&self) -> io::Result<()> {
        if let Err(e) = self.stop() {
            warn!("Failed to stop service: {}", e);
        }

        let path = self.definition_path();
        if let ServiceManager::Systemd { .. } = self {
            if let Err(e) = systemctl(&["disable", &unit_name()]) {
                warn!("Failed to disable service: {}", e);
            }
        }

        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        if let ServiceManager::Systemd { .. } = self {
            systemctl(&["daemon-reload"])?;
        }

        info!("Service uninstalled");
        Ok(())
    }

    fn start(&self) -> io::Result<()> {
        match self {
            ServiceManager::Systemd { .. } => systemctl(&["start", &unit_name()])?,
            ServiceManager::Launchd { plist_path } => launchctl(&["load", "-w"], plist_path)?,
        }
        info!("Service started");
        Ok(())
    }

    fn stop(&self) -> io::Result<()> {
        match self {
            ServiceManager::Systemd { .. } => systemctl(&["stop", &unit_name()])?,
            ServiceManager::Launchd { plist_path } => launchctl(&["unload"], plist_path)?,
        }
        info!("Service stopped");
        Ok(())
    }

    fn restart(&self) -> io::Result<()> {
        match self {
            ServiceManager::Systemd { .. } => {
                systemctl(&["restart", &unit_name()])?;
                info!("Service restarted");
                Ok(())
            }
            ServiceManager::Launchd { .. } => {
                if let Err(e) = self.stop() {
                    warn!("Failed to stop service: {}", e);
                }
                self.start()
            }
        }
    }
}

fn unit_name() -> String {
    format!("{}.service", SERVICE_NAME)
}

fn run_command<S: AsRef<std::ffi::OsStr> + Display>(program: &str, args: &[S]) -> io::Result<()> {
    let status = Command::new(program).args(args).status()?;
    if status.success() {
        Ok(())
    } else {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        Err(io::Error::new(ErrorKind::Other, format!("{} {} failed with {}", program, args.join(" "), status)))
    }
}

fn systemctl(args: &[&str]) -> io::Result<()> {
    let mut full_args = vec!["--user"];
    full_args.extend_from_slice(args);
    run_command("systemctl", &full_args)
}

fn launchctl(args: &[&str], plist_path: &Path) -> io::Result<()> {
    let plist = plist_path.to_string_lossy();
    let mut full_args: Vec<&str> = args.to_vec();
    full_args.push(&plist);
    run_command("launchctl", &full_args)
}

fn quote_arg(arg: &str) -> String {
    if arg.is_empty() || arg.contains(char::is_whitespace) || arg.contains('"') {
        format!("\"{}\"", arg.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}

pub fn systemd_unit(spec: &ServiceSpec) -> String {
    let mut exec_start = quote_arg(&spec.executable.to_string_lossy());
    for arg in spec.args.iter() {
        exec_start.push(' ');
        exec_start.push_str(&quote_arg(arg));
    }

    format!("[Unit]
Description={}
After=network.target

[Service]
Type=simple
WorkingDirectory={}
ExecStart={}
Restart=on-failure
RestartSec=5

[Install]
WantedBy=default.target
", DESCRIPTION, quote_arg(&spec.working_dir.to_string_lossy()), exec_start)
}

pub fn launchd_plist(spec: &ServiceSpec) -> String {
    let mut program_args = format!("        <string>{}</string>\n", escape(spec.executable.to_string_lossy().as_ref()));
    for arg in spec.args.iter() {
        program_args.push_str(&format!("        <string>{}</string>\n", escape(arg.as_str())));
    }

    format!(r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{}</string>
    <key>ProgramArguments</key>
    <array>
{}    </array>
    <key>WorkingDirectory</key>
    <string>{}</string>
    <key>RunAtLoad</key>
    <true/>
    <key>KeepAlive</key>
    <true/>
</dict>
</plist>
"#, LAUNCHD_LABEL, program_args, escape(spec.working_dir.to_string_lossy().as_ref()))
}
