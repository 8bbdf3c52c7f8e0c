//! The unit of the palette: a selectable, executable entry.
//!
//! Execution is described by an [`ActionEffect`] value instead of a closure so
//! that actions stay comparable, loggable and persistable. The
//! [`Executor`](crate::executor::Executor) is the only place effects run.

use serde::{Deserialize, Serialize};

/// Section title of intent-matcher results.
pub const INSTANT_SECTION: &str = "Instant";

/// Section title of the recency list.
pub const RECENT_SECTION: &str = "Recent";

/// Determines execution semantics and UI treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Navigate,
    PortAction,
    Command,
    Recent,
    /// Synthesized from free text by an intent matcher.
    Smart,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Navigate => "navigate",
            ActionKind::PortAction => "port-action",
            ActionKind::Command => "command",
            ActionKind::Recent => "recent",
            ActionKind::Smart => "smart",
        }
    }
}

/// Digest algorithms offered by the hash matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "SHA-1",
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }
}

/// Well-known folders reachable with `open <alias>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnownFolder {
    Desktop,
    Downloads,
    Documents,
    Pictures,
    Music,
    Videos,
    Home,
    Temp,
    AppData,
}

impl KnownFolder {
    pub const ALL: [KnownFolder; 9] = [
        KnownFolder::Desktop,
        KnownFolder::Downloads,
        KnownFolder::Documents,
        KnownFolder::Pictures,
        KnownFolder::Music,
        KnownFolder::Videos,
        KnownFolder::Home,
        KnownFolder::Temp,
        KnownFolder::AppData,
    ];

    /// Alias typed after `open`
    pub fn alias(&self) -> &'static str {
        match self {
            KnownFolder::Desktop => "desktop",
            KnownFolder::Downloads => "downloads",
            KnownFolder::Documents => "documents",
            KnownFolder::Pictures => "pictures",
            KnownFolder::Music => "music",
            KnownFolder::Videos => "videos",
            KnownFolder::Home => "home",
            KnownFolder::Temp => "temp",
            KnownFolder::AppData => "appdata",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            KnownFolder::Desktop => "Desktop",
            KnownFolder::Downloads => "Downloads",
            KnownFolder::Documents => "Documents",
            KnownFolder::Pictures => "Pictures",
            KnownFolder::Music => "Music",
            KnownFolder::Videos => "Videos",
            KnownFolder::Home => "Home",
            KnownFolder::Temp => "Temp",
            KnownFolder::AppData => "AppData",
        }
    }

    pub fn from_alias(alias: &str) -> Option<KnownFolder> {
        Self::ALL.into_iter().find(|f| f.alias() == alias)
    }
}

/// What happens when an action is executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "kebab-case")]
pub enum ActionEffect {
    /// Switch the main window to a tool (`None` = home), optionally pre-filled.
    Navigate {
        tool_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prefill_url: Option<String>,
    },
    CopyText { text: String },
    /// Copies the epoch seconds at execution time, not at match time.
    CopyCurrentTimestamp,
    CopyDigest {
        algorithm: HashAlgorithm,
        input: String,
    },
    KillPort { port: u16 },
    /// Best-effort termination of every process whose name contains `needle`.
    KillMatching { needle: String },
    LookupPublicIp,
    OpenFolder { folder: KnownFolder },
    OpenPath { path: String },
}

/// A single selectable, executable palette entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Stable identity, unique within a candidate snapshot
    pub id: String,

    pub kind: ActionKind,

    pub label: String,

    /// Secondary text; for smart actions with a result this is the literal value
    pub description: String,

    /// Symbolic icon name, resolved by [`icon_glyph`]
    pub icon: String,

    /// Extra match surface beyond label and description
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    /// Grouping key; first appearance in ranked output decides section order
    pub section: String,

    /// Display-only accelerator hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,

    /// Computed answer of a smart action; presence means "copies this value"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    pub effect: ActionEffect,
}

impl Action {
    pub fn is_smart(&self) -> bool {
        self.kind == ActionKind::Smart
    }

    /// Smart action whose primary effect is copying `result` to the clipboard.
    pub fn smart_copy(id: &str, label: String, description: String, icon: &str, result: String) -> Self {
        Action {
            id: id.to_string(),
            kind: ActionKind::Smart,
            label,
            description,
            icon: icon.to_string(),
            keywords: Vec::new(),
            section: INSTANT_SECTION.to_string(),
            shortcut: None,
            effect: ActionEffect::CopyText {
                text: result.clone(),
            },
            result: Some(result),
        }
    }

    /// Smart action with a side effect and no literal result.
    pub fn smart_effect(id: String, label: String, description: String, icon: &str, effect: ActionEffect) -> Self {
        Action {
            id,
            kind: ActionKind::Smart,
            label,
            description,
            icon: icon.to_string(),
            keywords: Vec::new(),
            section: INSTANT_SECTION.to_string(),
            shortcut: None,
            result: None,
            effect,
        }
    }
}

/// A named, ordered group of actions shown together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub actions: Vec<Action>,
}

/// Total number of actions across sections.
pub fn flat_count(sections: &[Section]) -> usize {
    sections.iter().map(|s| s.actions.len()).sum()
}

/// Action at a position of the flattened, section-ordered list.
pub fn flat_get(sections: &[Section], index: usize) -> Option<&Action> {
    sections.iter().flat_map(|s| s.actions.iter()).nth(index)
}

/// Resolve a symbolic icon name to a terminal glyph. Unknown names fall back
/// to a bullet.
pub fn icon_glyph(name: &str) -> &'static str {
    match name {
        "Home" => "⌂",
        "Calculator" => "∑",
        "Fingerprint" | "Hash" => "#",
        "Lock" | "KeyRound" => "⚿",
        "Clock" | "Timer" => "◷",
        "Calendar" => "▦",
        "Binary" => "⁰¹",
        "FileCode" | "Code" | "Braces" => "{}",
        "Link" => "⛓",
        "Palette" => "◐",
        "ShieldCheck" => "⛨",
        "Trash2" => "✕",
        "TextCursorInput" | "FileText" | "CaseSensitive" => "¶",
        "QrCode" => "▣",
        "Globe" | "Radio" => "◍",
        "FolderOpen" => "▭",
        "Dice5" => "⚄",
        "ArrowLeftRight" | "GitCompareArrows" => "⇄",
        "Send" => "➤",
        "Copy" => "⧉",
        "Activity" => "∿",
        "Regex" => ".*",
        _ => "•",
    }
}
