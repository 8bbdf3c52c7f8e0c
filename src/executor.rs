use crate::action::{Action, ActionEffect, HashAlgorithm};
use crate::error::ProviderError;
use crate::providers::{Desktop, NavigationRequest, OpenTarget, SystemProbe};
use crate::registry::find_tool;
use chrono::Utc;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Copied instead of an address when the lookup fails
pub const IP_FAILURE_PLACEHOLDER: &str = "Failed to fetch IP";

/// Lowercase hex digest of `input`.
pub fn digest_hex(algorithm: HashAlgorithm, input: &str) -> String {
    let bytes = input.as_bytes();
    let digest: Vec<u8> = match algorithm {
        HashAlgorithm::Sha1 => Sha1::digest(bytes).to_vec(),
        HashAlgorithm::Sha256 => Sha256::digest(bytes).to_vec(),
        HashAlgorithm::Sha384 => Sha384::digest(bytes).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(bytes).to_vec(),
    };
    digest.iter().fold(String::with_capacity(digest.len() * 2), |mut hex, b| {
        let _ = write!(hex, "{:02x}", b);
        hex
    })
}

/// Runs action effects against the external collaborators.
#[derive(Clone)]
pub struct Executor {
    system: Arc<dyn SystemProbe>,
    desktop: Arc<dyn Desktop>,
}

impl Executor {
    pub fn new(system: Arc<dyn SystemProbe>, desktop: Arc<dyn Desktop>) -> Self {
        Self { system, desktop }
    }

    pub fn system(&self) -> &dyn SystemProbe {
        self.system.as_ref()
    }

    pub async fn run(&self, action: &Action) -> Result<(), ProviderError> {
        info!("Executing {} ({})", action.id, action.kind.as_str());

        match &action.effect {
            ActionEffect::Navigate { tool_id, prefill_url } => {
                if let Some(id) = tool_id.as_deref() {
                    find_tool(id).ok_or_else(|| ProviderError::UnknownTool(id.to_string()))?;
                }
                let request = NavigationRequest {
                    tool_id: tool_id.clone(),
                    prefill_url: prefill_url.clone(),
                };
                self.desktop.navigate(&request).await
            }
            ActionEffect::CopyText { text } => self.desktop.write_clipboard(text).await,
            ActionEffect::CopyCurrentTimestamp => {
                let now = Utc::now().timestamp().to_string();
                self.desktop.write_clipboard(&now).await
            }
            ActionEffect::CopyDigest { algorithm, input } => {
                let hex = digest_hex(*algorithm, input);
                self.desktop.write_clipboard(&hex).await
            }
            ActionEffect::KillPort { port } => self.system.kill_port(*port).await,
            ActionEffect::KillMatching { needle } => self.kill_matching(needle).await,
            ActionEffect::LookupPublicIp => {
                let text = match self.desktop.public_ip().await {
                    Ok(ip) => ip,
                    Err(e) => {
                        warn!("Public IP lookup failed: {}", e);
                        IP_FAILURE_PLACEHOLDER.to_string()
                    }
                };
                self.desktop.write_clipboard(&text).await
            }
            ActionEffect::OpenFolder { folder } => self.desktop.open(&OpenTarget::Folder(*folder)).await,
            ActionEffect::OpenPath { path } => self.desktop.open(&OpenTarget::Path(path.clone())).await,
        }
    }

    /// Best effort: a process that refuses to die does not stop the others.
    async fn kill_matching(&self, needle: &str) -> Result<(), ProviderError> {
        let needle = needle.to_lowercase();
        let processes = self.system.list_processes().await?;
        let targets: Vec<_> = processes
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect();

        let mut killed = 0;
        for process in &targets {
            match self.system.kill_process(process.pid).await {
                Ok(()) => killed += 1,
                Err(e) => debug!("Skipping {} (PID {}): {}", process.name, process.pid, e),
            }
        }

        info!("Terminated {}/{} processes matching {:?}", killed, targets.len(), needle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::KnownFolder;
    use crate::intent::MatcherChain;
    use crate::providers::fakes::{port, process, FakeDesktop, FakeSystem};

    fn executor(system: FakeSystem, desktop: FakeDesktop) -> (Executor, Arc<FakeSystem>, Arc<FakeDesktop>) {
        let system = Arc::new(system);
        let desktop = Arc::new(desktop);
        (Executor::new(system.clone(), desktop.clone()), system, desktop)
    }

    fn smart(query: &str) -> Action {
        MatcherChain::standard().smart_actions(query).remove(0)
    }

    #[test]
    fn test_digest_vectors() {
        assert_eq!(digest_hex(HashAlgorithm::Sha1, "abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(
            digest_hex(HashAlgorithm::Sha256, "abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(digest_hex(HashAlgorithm::Sha384, "abc").len(), 96);
        assert_eq!(digest_hex(HashAlgorithm::Sha512, "abc").len(), 128);
    }

    #[tokio::test]
    async fn test_hash_action_copies_digest_at_execution() {
        let (exec, _, desktop) = executor(FakeSystem::default(), FakeDesktop::default());
        exec.run(&smart("sha256 abc")).await.unwrap();
        assert_eq!(
            desktop.clipboard(),
            vec!["ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad".to_string()]
        );
    }

    #[tokio::test]
    async fn test_copy_result() {
        let (exec, _, desktop) = executor(FakeSystem::default(), FakeDesktop::default());
        exec.run(&smart("255 to hex")).await.unwrap();
        assert_eq!(desktop.clipboard(), vec!["0xFF".to_string()]);
    }

    #[tokio::test]
    async fn test_kill_matching_is_best_effort() {
        let mut system = FakeSystem::default();
        system.processes = vec![
            process(10, "chrome"),
            process(11, "Chrome Helper"),
            process(12, "firefox"),
            process(13, "chrome_crashpad"),
        ];
        system.protected.insert(11);
        let (exec, system, _) = executor(system, FakeDesktop::default());

        exec.run(&smart("kill chrome")).await.unwrap();
        assert_eq!(system.killed(), vec![10, 13]);
    }

    #[tokio::test]
    async fn test_kill_port() {
        let (exec, system, _) = executor(FakeSystem::with_ports(vec![port(3000, 77, "node")]), FakeDesktop::default());
        let action = crate::aggregator::port_actions(&port(3000, 77, "node"))[0].clone();
        exec.run(&action).await.unwrap();
        assert_eq!(system.killed(), vec![77]);
    }

    #[tokio::test]
    async fn test_public_ip_and_placeholder() {
        let desktop = FakeDesktop {
            ip: Some("203.0.113.7".to_string()),
            ..Default::default()
        };
        let (exec, _, desktop) = executor(FakeSystem::default(), desktop);
        exec.run(&smart("my ip")).await.unwrap();
        assert_eq!(desktop.clipboard(), vec!["203.0.113.7".to_string()]);

        let (offline, _, desktop) = executor(FakeSystem::default(), FakeDesktop::default());
        offline.run(&smart("ip")).await.unwrap();
        assert_eq!(desktop.clipboard(), vec![IP_FAILURE_PLACEHOLDER.to_string()]);
    }

    #[tokio::test]
    async fn test_navigation_and_open() {
        let (exec, _, desktop) = executor(FakeSystem::default(), FakeDesktop::default());
        exec.run(&smart("qr hello")).await.unwrap();
        exec.run(&smart("open temp")).await.unwrap();
        assert_eq!(
            desktop.navigations(),
            vec![NavigationRequest {
                tool_id: Some("qr-code".to_string()),
                prefill_url: Some("hello".to_string())
            }]
        );
        assert_eq!(desktop.opened(), vec![OpenTarget::Folder(KnownFolder::Temp)]);
    }

    #[tokio::test]
    async fn test_navigation_to_unregistered_tool_fails() {
        let (exec, _, desktop) = executor(FakeSystem::default(), FakeDesktop::default());
        let mut action = crate::aggregator::home_action();
        action.effect = ActionEffect::Navigate {
            tool_id: Some("teleporter".to_string()),
            prefill_url: None,
        };
        assert!(matches!(exec.run(&action).await, Err(ProviderError::UnknownTool(id)) if id == "teleporter"));
        assert!(desktop.navigations().is_empty());

        // home carries no tool id and always navigates
        exec.run(&crate::aggregator::home_action()).await.unwrap();
        assert_eq!(desktop.navigations().len(), 1);
    }

    #[tokio::test]
    async fn test_clipboard_failure_propagates() {
        let desktop = FakeDesktop {
            fail_clipboard: true,
            ..Default::default()
        };
        let (exec, _, _) = executor(FakeSystem::default(), desktop);
        assert!(exec.run(&smart("uuid")).await.is_err());
    }
}
