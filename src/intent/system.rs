//! Intents whose effect reaches outside the palette: processes, the network,
//! the file manager and other tools of the main window.

use super::{truncate, IntentMatcher};
use crate::action::{Action, ActionEffect, KnownFolder};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_KILL: Regex = Regex::new(r"^(kill|close|stop|terminate|end|quit)\s+(.+)").unwrap();
    static ref RE_PORT_PHRASE: Regex = Regex::new(r"^port\s+\d+$").unwrap();
    static ref RE_QR: Regex = Regex::new(r"(?i)^qr\s+(.+)").unwrap();
    static ref RE_OPEN: Regex = Regex::new(r"(?i)^open\s+(.+)").unwrap();
    static ref RE_DRIVE: Regex = Regex::new(r"(?i)^[a-z]:").unwrap();
    static ref RE_DATA_CONVERT: Regex = Regex::new(r"^(?:to\s+)?(json|yaml|toml)\s+to\s+(json|yaml|toml)$").unwrap();
}

const QR_TOOL: &str = "qr-code";
const DATA_CONVERTER_TOOL: &str = "data-converter";

/// Longest path shown verbatim in an `open <path>` description.
const PATH_DISPLAY_MAX: usize = 50;

const IP_PHRASES: &[&str] = &[
    "ip",
    "my ip",
    "myip",
    "ip public",
    "public ip",
    "ip address",
    "what is my ip",
    "whatismyip",
];

/// `kill <name>` and friends. Killing a port is left to the port actions.
pub struct KillProcess;

impl IntentMatcher for KillProcess {
    fn name(&self) -> &'static str {
        "kill-process"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        let ql = query.trim().to_lowercase();
        let caps = RE_KILL.captures(&ql)?;
        let target = caps[2].trim();

        if RE_PORT_PHRASE.is_match(target) || target.chars().count() < 2 {
            return None;
        }

        Some(vec![Action::smart_effect(
            format!("smart-kill-{}", target),
            format!("Kill \"{}\"", target),
            format!("Terminate all processes matching \"{}\"", target),
            "Trash2",
            ActionEffect::KillMatching {
                needle: target.to_string(),
            },
        )])
    }
}

pub struct QrCode;

impl IntentMatcher for QrCode {
    fn name(&self) -> &'static str {
        "qr-code"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        let caps = RE_QR.captures(query.trim())?;
        let payload = caps[1].trim();
        if payload.is_empty() {
            return None;
        }

        Some(vec![Action::smart_effect(
            "smart-qr".to_string(),
            "Generate QR Code".to_string(),
            truncate(payload, 50),
            "QrCode",
            ActionEffect::Navigate {
                tool_id: Some(QR_TOOL.to_string()),
                prefill_url: Some(payload.to_string()),
            },
        )])
    }
}

pub struct IpAddress;

impl IntentMatcher for IpAddress {
    fn name(&self) -> &'static str {
        "ip-address"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        let ql = query.trim().to_lowercase();
        if !IP_PHRASES.contains(&ql.as_str()) {
            return None;
        }

        Some(vec![Action::smart_effect(
            "smart-ip-public".to_string(),
            "Public IP Address".to_string(),
            "Fetch & copy your public IP address".to_string(),
            "Globe",
            ActionEffect::LookupPublicIp,
        )])
    }
}

/// `open <folder alias>` or `open <path>`.
pub struct OpenDirectory;

fn looks_like_path(target: &str) -> bool {
    target.contains('\\') || target.contains('/') || RE_DRIVE.is_match(target)
}

fn display_path(path: &str) -> String {
    let count = path.chars().count();
    if count > PATH_DISPLAY_MAX {
        let tail: String = path.chars().skip(count - (PATH_DISPLAY_MAX - 3)).collect();
        format!("...{}", tail)
    } else {
        path.to_string()
    }
}

impl IntentMatcher for OpenDirectory {
    fn name(&self) -> &'static str {
        "open-directory"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        let caps = RE_OPEN.captures(query.trim())?;
        let target = caps[1].trim();

        if let Some(folder) = KnownFolder::from_alias(&target.to_lowercase()) {
            return Some(vec![Action::smart_effect(
                format!("smart-open-{}", folder.alias()),
                format!("Open {}", folder.label()),
                format!("Open {} folder in file explorer", folder.label()),
                "FolderOpen",
                ActionEffect::OpenFolder { folder },
            )]);
        }

        if looks_like_path(target) {
            return Some(vec![Action::smart_effect(
                "smart-open-path".to_string(),
                "Open in Explorer".to_string(),
                display_path(target),
                "FolderOpen",
                ActionEffect::OpenPath {
                    path: target.to_string(),
                },
            )]);
        }

        None
    }
}

/// `json to yaml` style requests jump to the converter tool.
pub struct DataConvert;

impl IntentMatcher for DataConvert {
    fn name(&self) -> &'static str {
        "data-convert"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        let ql = query.trim().to_lowercase();
        let caps = RE_DATA_CONVERT.captures(&ql)?;

        Some(vec![Action::smart_effect(
            "smart-data-convert".to_string(),
            format!("{} → {}", caps[1].to_uppercase(), caps[2].to_uppercase()),
            "Open data converter".to_string(),
            "ArrowLeftRight",
            ActionEffect::Navigate {
                tool_id: Some(DATA_CONVERTER_TOOL.to_string()),
                prefill_url: None,
            },
        )])
    }
}
