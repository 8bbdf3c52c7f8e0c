//! External collaborators: system inspection and the desktop shell.
//!
//! The engine only sees the two traits. [`NativeSystem`] and
//! [`ConsoleDesktop`] back the CLI; tests use the in-memory fakes.

use crate::action::KnownFolder;
use crate::config::PaletteConfig;
use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{debug, info};

/// Event name the main window listens on for tool switches
pub const TOOL_SELECTED_EVENT: &str = "palette-tool-selected";

/// A listening socket and its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInfo {
    pub port: u16,
    pub protocol: String,
    pub pid: u32,
    pub process_name: String,
    pub executable_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub memory_kb: u64,
    pub executable_path: Option<String>,
}

/// Ask the main window to show a tool (`None` = overview), optionally pre-filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationRequest {
    pub tool_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefill_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenTarget {
    Folder(KnownFolder),
    Path(String),
}

#[async_trait]
pub trait SystemProbe: Send + Sync {
    async fn scan_ports(&self) -> Result<Vec<PortInfo>, ProviderError>;

    async fn list_processes(&self) -> Result<Vec<ProcessInfo>, ProviderError>;

    async fn kill_process(&self, pid: u32) -> Result<(), ProviderError>;

    /// Terminate whichever process owns `port`.
    async fn kill_port(&self, port: u16) -> Result<(), ProviderError> {
        let ports = self.scan_ports().await?;
        let owner = ports
            .iter()
            .find(|p| p.port == port)
            .ok_or(ProviderError::PortNotFound(port))?;
        self.kill_process(owner.pid).await
    }
}

#[async_trait]
pub trait Desktop: Send + Sync {
    async fn write_clipboard(&self, text: &str) -> Result<(), ProviderError>;

    /// Emit the tool-selected event and bring the main window forward.
    async fn navigate(&self, request: &NavigationRequest) -> Result<(), ProviderError>;

    async fn open(&self, target: &OpenTarget) -> Result<(), ProviderError>;

    async fn public_ip(&self) -> Result<String, ProviderError>;
}

/// Platform directory behind a folder alias.
pub fn resolve_folder(folder: KnownFolder) -> Result<PathBuf, ProviderError> {
    let dir = match folder {
        KnownFolder::Desktop => dirs::desktop_dir(),
        KnownFolder::Downloads => dirs::download_dir(),
        KnownFolder::Documents => dirs::document_dir(),
        KnownFolder::Pictures => dirs::picture_dir(),
        KnownFolder::Music => dirs::audio_dir(),
        KnownFolder::Videos => dirs::video_dir(),
        KnownFolder::Home => dirs::home_dir(),
        KnownFolder::Temp => Some(std::env::temp_dir()),
        KnownFolder::AppData => dirs::data_dir(),
    };
    dir.ok_or(ProviderError::FolderUnavailable(folder.label()))
}

// ============================================================================
// Native system probe
// ============================================================================

/// Process inspection through `sysinfo`, listening sockets through the
/// platform's listener table (`netstat -ano` on Windows, `lsof` elsewhere).
/// Each call takes a fresh snapshot on the blocking pool.
#[derive(Debug, Default)]
pub struct NativeSystem;

/// One row of the listener table before the owner is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Listener {
    port: u16,
    protocol: String,
    pid: u32,
    command: Option<String>,
}

fn extract_port(addr: &str) -> Option<u16> {
    addr.rsplit(':').next()?.parse().ok()
}

/// Keep the first owner of every port, ordered by port.
fn by_port(rows: impl Iterator<Item = Listener>) -> Vec<Listener> {
    let mut table = BTreeMap::new();
    for row in rows {
        table.entry(row.port).or_insert(row);
    }
    table.into_values().collect()
}

/// Rows of `netstat -ano`: `TCP 0.0.0.0:135 0.0.0.0:0 LISTENING 1234`.
#[cfg_attr(not(windows), allow(dead_code))]
fn parse_netstat(output: &str) -> Vec<Listener> {
    by_port(output.lines().filter(|line| line.contains("LISTENING")).filter_map(|line| {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            return None;
        }
        let protocol = match parts[0].to_ascii_uppercase().as_str() {
            "TCP" => "TCP",
            "UDP" => "UDP",
            _ => return None,
        };
        Some(Listener {
            port: extract_port(parts[1])?,
            protocol: protocol.to_string(),
            pid: parts[4].parse().ok()?,
            command: None,
        })
    }))
}

/// Rows of `lsof -nP -iTCP -sTCP:LISTEN`:
/// `node 4242 me 23u IPv6 0x1 0t0 TCP *:3000 (LISTEN)`.
#[cfg_attr(windows, allow(dead_code))]
fn parse_lsof(output: &str) -> Vec<Listener> {
    by_port(output.lines().filter_map(|line| {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let [command, pid, .., protocol, name, state] = parts.as_slice() else {
            return None;
        };
        if *state != "(LISTEN)" {
            return None;
        }
        Some(Listener {
            port: extract_port(name)?,
            protocol: protocol.to_string(),
            pid: pid.parse().ok()?,
            command: Some(command.replace("\\x20", " ")),
        })
    }))
}

fn run_tool(program: &str, args: &[&str]) -> Result<String, ProviderError> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(windows)]
fn listening_sockets() -> Result<Vec<Listener>, ProviderError> {
    Ok(parse_netstat(&run_tool("netstat", &["-ano"])?))
}

// lsof exits non-zero when nothing listens; an empty table is the answer then
#[cfg(not(windows))]
fn listening_sockets() -> Result<Vec<Listener>, ProviderError> {
    Ok(parse_lsof(&run_tool("lsof", &["-nP", "-iTCP", "-sTCP:LISTEN"])?))
}

fn snapshot() -> System {
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);
    system
}

#[async_trait]
impl SystemProbe for NativeSystem {
    async fn scan_ports(&self) -> Result<Vec<PortInfo>, ProviderError> {
        let ports = tokio::task::spawn_blocking(|| -> Result<Vec<PortInfo>, ProviderError> {
            let listeners = listening_sockets()?;
            let system = snapshot();
            let ports = listeners
                .into_iter()
                .map(|listener| {
                    let owner = system.process(Pid::from_u32(listener.pid));
                    PortInfo {
                        port: listener.port,
                        protocol: listener.protocol,
                        pid: listener.pid,
                        process_name: owner
                            .map(|p| p.name().to_string_lossy().into_owned())
                            .or(listener.command)
                            .unwrap_or_else(|| "Unknown".to_string()),
                        executable_path: owner.and_then(|p| p.exe()).map(|p| p.display().to_string()),
                    }
                })
                .collect();
            Ok(ports)
        })
        .await??;

        debug!("Found {} listening ports", ports.len());
        Ok(ports)
    }

    async fn list_processes(&self) -> Result<Vec<ProcessInfo>, ProviderError> {
        let processes = tokio::task::spawn_blocking(|| {
            let system = snapshot();
            system
                .processes()
                .iter()
                .map(|(pid, process)| ProcessInfo {
                    pid: pid.as_u32(),
                    name: process.name().to_string_lossy().into_owned(),
                    memory_kb: process.memory() / 1024,
                    executable_path: process.exe().map(|p| p.display().to_string()),
                })
                .collect::<Vec<_>>()
        })
        .await?;

        debug!("Listed {} processes", processes.len());
        Ok(processes)
    }

    async fn kill_process(&self, pid: u32) -> Result<(), ProviderError> {
        let killed = tokio::task::spawn_blocking(move || {
            let system = snapshot();
            system.process(Pid::from_u32(pid)).is_some_and(|p| p.kill())
        })
        .await?;

        if killed {
            Ok(())
        } else {
            Err(ProviderError::KillFailed(pid))
        }
    }
}

// ============================================================================
// Console desktop
// ============================================================================

#[derive(Debug, Deserialize)]
struct IpReply {
    ip: String,
}

#[derive(Serialize)]
struct EmittedEvent<'a> {
    event: &'a str,
    payload: &'a NavigationRequest,
}

/// Stand-in shell for the CLI: the "clipboard" and navigation events go to
/// stdout, folders open in the platform file manager.
pub struct ConsoleDesktop {
    http: reqwest::Client,
    ip_lookup_url: String,
}

impl ConsoleDesktop {
    pub fn new(config: &PaletteConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("toolkit-palette/", env!("CARGO_PKG_VERSION")))
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            http,
            ip_lookup_url: config.ip_lookup_url.clone(),
        })
    }
}

#[async_trait]
impl Desktop for ConsoleDesktop {
    async fn write_clipboard(&self, text: &str) -> Result<(), ProviderError> {
        println!("{}", text);
        Ok(())
    }

    async fn navigate(&self, request: &NavigationRequest) -> Result<(), ProviderError> {
        let event = EmittedEvent {
            event: TOOL_SELECTED_EVENT,
            payload: request,
        };
        let line = serde_json::to_string(&event).map_err(|e| ProviderError::Other(e.to_string()))?;
        println!("{}", line);
        Ok(())
    }

    async fn open(&self, target: &OpenTarget) -> Result<(), ProviderError> {
        let path = match target {
            OpenTarget::Folder(folder) => resolve_folder(*folder)?,
            OpenTarget::Path(path) => PathBuf::from(path),
        };
        info!("Opening {:?}", path);
        open::that_detached(&path)?;
        Ok(())
    }

    async fn public_ip(&self) -> Result<String, ProviderError> {
        let reply: IpReply = self
            .http
            .get(&self.ip_lookup_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(reply.ip)
    }
}

// ============================================================================
// Test fakes
// ============================================================================

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Probe over fixed data that records kills.
    #[derive(Default)]
    pub struct FakeSystem {
        pub ports: Option<Vec<PortInfo>>,
        pub processes: Vec<ProcessInfo>,
        pub protected: HashSet<u32>,
        pub killed: Mutex<Vec<u32>>,
    }

    impl FakeSystem {
        pub fn with_ports(ports: Vec<PortInfo>) -> Self {
            Self {
                ports: Some(ports),
                ..Default::default()
            }
        }

        pub fn killed(&self) -> Vec<u32> {
            self.killed.lock().unwrap().clone()
        }
    }

    pub fn port(port: u16, pid: u32, name: &str) -> PortInfo {
        PortInfo {
            port,
            protocol: "TCP".to_string(),
            pid,
            process_name: name.to_string(),
            executable_path: None,
        }
    }

    pub fn process(pid: u32, name: &str) -> ProcessInfo {
        ProcessInfo {
            pid,
            name: name.to_string(),
            memory_kb: 1024,
            executable_path: None,
        }
    }

    #[async_trait]
    impl SystemProbe for FakeSystem {
        async fn scan_ports(&self) -> Result<Vec<PortInfo>, ProviderError> {
            self.ports
                .clone()
                .ok_or_else(|| ProviderError::Other("port scanner offline".to_string()))
        }

        async fn list_processes(&self) -> Result<Vec<ProcessInfo>, ProviderError> {
            Ok(self.processes.clone())
        }

        async fn kill_process(&self, pid: u32) -> Result<(), ProviderError> {
            if self.protected.contains(&pid) {
                return Err(ProviderError::KillFailed(pid));
            }
            self.killed.lock().unwrap().push(pid);
            Ok(())
        }
    }

    /// Desktop that records every request.
    #[derive(Default)]
    pub struct FakeDesktop {
        pub ip: Option<String>,
        pub fail_clipboard: bool,
        pub clipboard: Mutex<Vec<String>>,
        pub navigations: Mutex<Vec<NavigationRequest>>,
        pub opened: Mutex<Vec<OpenTarget>>,
    }

    impl FakeDesktop {
        pub fn clipboard(&self) -> Vec<String> {
            self.clipboard.lock().unwrap().clone()
        }

        pub fn navigations(&self) -> Vec<NavigationRequest> {
            self.navigations.lock().unwrap().clone()
        }

        pub fn opened(&self) -> Vec<OpenTarget> {
            self.opened.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Desktop for FakeDesktop {
        async fn write_clipboard(&self, text: &str) -> Result<(), ProviderError> {
            if self.fail_clipboard {
                return Err(ProviderError::Other("clipboard locked".to_string()));
            }
            self.clipboard.lock().unwrap().push(text.to_string());
            Ok(())
        }

        async fn navigate(&self, request: &NavigationRequest) -> Result<(), ProviderError> {
            self.navigations.lock().unwrap().push(request.clone());
            Ok(())
        }

        async fn open(&self, target: &OpenTarget) -> Result<(), ProviderError> {
            self.opened.lock().unwrap().push(target.clone());
            Ok(())
        }

        async fn public_ip(&self) -> Result<String, ProviderError> {
            self.ip.clone().ok_or(ProviderError::Other("offline".to_string()))
        }
    }
}
