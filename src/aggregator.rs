//! Builds the unranked candidate snapshot once per palette focus.

use crate::action::{Action, ActionEffect, ActionKind};
use crate::providers::{PortInfo, SystemProbe};
use crate::recent::RecentStore;
use crate::registry::ToolDefinition;
use tracing::{debug, warn};

pub const NAVIGATION_SECTION: &str = "Navigation";
pub const TOOLS_SECTION: &str = "Tools";
pub const PORTS_SECTION: &str = "Active Ports";

/// Tool the "test localhost" port action opens
const REQUEST_TOOL: &str = "api-tester";

/// Tools beyond this position get no accelerator hint
const SHORTCUT_SLOTS: usize = 9;

pub fn home_action() -> Action {
    Action {
        id: "nav-home".to_string(),
        kind: ActionKind::Navigate,
        label: "Home".to_string(),
        description: "Back to tool overview".to_string(),
        icon: "Home".to_string(),
        keywords: ["home", "dashboard", "overview", "all"].map(String::from).to_vec(),
        section: NAVIGATION_SECTION.to_string(),
        shortcut: None,
        result: None,
        effect: ActionEffect::Navigate {
            tool_id: None,
            prefill_url: None,
        },
    }
}

pub fn tool_actions(tools: &[ToolDefinition]) -> Vec<Action> {
    tools
        .iter()
        .enumerate()
        .map(|(i, tool)| {
            let keywords = if tool.keywords.is_empty() {
                vec![tool.name.to_lowercase()]
            } else {
                tool.keywords.iter().map(|k| k.to_string()).collect()
            };
            Action {
                id: format!("nav-{}", tool.id),
                kind: ActionKind::Navigate,
                label: tool.name.to_string(),
                description: tool.description.to_string(),
                icon: tool.icon.to_string(),
                keywords,
                section: TOOLS_SECTION.to_string(),
                shortcut: (i < SHORTCUT_SLOTS).then(|| format!("Ctrl+{}", i + 1)),
                result: None,
                effect: ActionEffect::Navigate {
                    tool_id: Some(tool.id.to_string()),
                    prefill_url: None,
                },
            }
        })
        .collect()
}

/// Kill, test and copy actions for one listening port. Each one is
/// discoverable by the owning process name, the port and the pid.
pub fn port_actions(info: &PortInfo) -> [Action; 3] {
    let port = info.port;
    let url = format!("http://localhost:{}", port);
    let owner = [info.process_name.to_lowercase(), port.to_string(), info.pid.to_string()];
    let port_action = |id: String, kind, label: String, description: String, icon: &str, terms: &[&str], effect| {
        let mut keywords: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
        keywords.extend(owner.iter().cloned());
        Action {
            id,
            kind,
            label,
            description,
            icon: icon.to_string(),
            keywords,
            section: PORTS_SECTION.to_string(),
            shortcut: None,
            result: None,
            effect,
        }
    };

    [
        port_action(
            format!("kill-port-{}", port),
            ActionKind::PortAction,
            format!("Kill port {}", port),
            format!("{} (PID {})", info.process_name, info.pid),
            "Trash2",
            &["kill", "stop", "terminate"],
            ActionEffect::KillPort { port },
        ),
        port_action(
            format!("open-api-{}", port),
            ActionKind::Command,
            format!("Test localhost:{}", port),
            format!("Open in API Tester · {}", info.process_name),
            "Send",
            &["api", "test", "http"],
            ActionEffect::Navigate {
                tool_id: Some(REQUEST_TOOL.to_string()),
                prefill_url: Some(url.clone()),
            },
        ),
        port_action(
            format!("copy-url-{}", port),
            ActionKind::Command,
            format!("Copy localhost:{}", port),
            format!("Copy URL to clipboard · {}", info.process_name),
            "Copy",
            &["copy", "url", "localhost"],
            ActionEffect::CopyText { text: url },
        ),
    ]
}

/// Home, every tool, three actions per listening port, then the recency list.
///
/// A failed port scan only drops the port actions.
pub async fn gather_actions(tools: &[ToolDefinition], probe: &dyn SystemProbe, recent: &RecentStore) -> Vec<Action> {
    let mut actions = vec![home_action()];
    actions.extend(tool_actions(tools));

    match probe.scan_ports().await {
        Ok(ports) => {
            debug!("Port scan found {} listening ports", ports.len());
            actions.extend(ports.iter().flat_map(port_actions));
        }
        Err(e) => warn!("Port scan unavailable, skipping port actions: {}", e),
    }

    actions.extend(recent.actions().iter().cloned());
    debug!("Gathered {} candidate actions", actions.len());
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::fakes::{port, FakeSystem};
    use crate::ranker::filter_actions;
    use crate::registry::builtin_tools;
    use crate::registry::ToolCategory;

    fn ids(actions: &[Action]) -> Vec<&str> {
        actions.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_tool_actions_shortcuts() {
        let actions = tool_actions(builtin_tools());
        assert_eq!(actions.len(), 22);
        assert_eq!(actions[0].id, "nav-ports");
        assert_eq!(actions[0].shortcut.as_deref(), Some("Ctrl+1"));
        assert_eq!(actions[8].shortcut.as_deref(), Some("Ctrl+9"));
        assert_eq!(actions[9].shortcut, None);
    }

    #[test]
    fn test_keyword_fallback_from_name() {
        let bare = [ToolDefinition {
            id: "scratch",
            name: "Scratch Pad",
            description: "",
            icon: "FileText",
            category: ToolCategory::Text,
            keywords: &[],
        }];
        assert_eq!(tool_actions(&bare)[0].keywords, vec!["scratch pad".to_string()]);
    }

    #[test]
    fn test_port_triple_is_discoverable() {
        let [kill, open, copy] = port_actions(&port(3000, 4242, "Node"));
        assert_eq!(kill.id, "kill-port-3000");
        assert_eq!(kill.description, "Node (PID 4242)");
        assert_eq!(open.description, "Open in API Tester · Node");
        assert_eq!(copy.description, "Copy URL to clipboard · Node");
        for action in [&kill, &open, &copy] {
            for term in ["node", "3000", "4242"] {
                assert!(action.keywords.contains(&term.to_string()), "{} lacks {}", action.id, term);
            }
        }
        assert_eq!(
            open.effect,
            ActionEffect::Navigate {
                tool_id: Some("api-tester".to_string()),
                prefill_url: Some("http://localhost:3000".to_string())
            }
        );
        assert_eq!(
            copy.effect,
            ActionEffect::CopyText {
                text: "http://localhost:3000".to_string()
            }
        );
    }

    #[test]
    fn test_port_triple_found_by_pid_and_process() {
        let actions = port_actions(&port(5173, 4242, "vite")).to_vec();
        for query in ["4242", "vite", "5173"] {
            let sections = filter_actions(&actions, query);
            assert_eq!(sections.len(), 1);
            assert_eq!(sections[0].title, PORTS_SECTION);
            assert_eq!(sections[0].actions.len(), 3, "query {:?}", query);
        }
    }

    #[tokio::test]
    async fn test_gather_order() {
        let probe = FakeSystem::with_ports(vec![port(3000, 1, "node"), port(5432, 2, "postgres")]);
        let mut recent = RecentStore::new(10);
        recent.add(&home_action());

        let actions = gather_actions(builtin_tools(), &probe, &recent).await;
        assert_eq!(actions.len(), 1 + 22 + 6 + 1);
        assert_eq!(actions[0].id, "nav-home");
        assert_eq!(actions[23].id, "kill-port-3000");
        assert_eq!(actions[26].id, "kill-port-5432");
        assert_eq!(actions.last().map(|a| a.kind), Some(ActionKind::Recent));
    }

    #[tokio::test]
    async fn test_scan_failure_degrades() {
        let probe = FakeSystem::default();
        let mut recent = RecentStore::new(10);
        recent.add(&tool_actions(builtin_tools())[3]);

        let actions = gather_actions(builtin_tools(), &probe, &recent).await;
        assert_eq!(actions.len(), 1 + 22 + 1);
        assert!(ids(&actions).iter().all(|id| !id.starts_with("kill-port")));
        assert_eq!(actions[23].id, "nav-number-base");
        assert_eq!(actions[23].section, "Recent");
    }
}
