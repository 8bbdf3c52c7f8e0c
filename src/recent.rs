use crate::action::{Action, ActionKind, RECENT_SECTION};
use crate::error::PaletteError;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Bounded most-recent-first history of executed actions, deduplicated by id.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentStore {
    max: usize,
    actions: Vec<Action>,
}

impl RecentStore {
    pub fn new(max: usize) -> Self {
        Self {
            max,
            actions: Vec::new(),
        }
    }

    /// Record an execution. The stored copy is re-tagged into the Recent
    /// section and any older entry with the same id is dropped.
    pub fn add(&mut self, action: &Action) {
        let mut entry = action.clone();
        entry.kind = ActionKind::Recent;
        entry.section = RECENT_SECTION.to_string();
        // shortcuts belong to the tool listing
        entry.shortcut = None;

        self.actions.retain(|a| a.id != entry.id);
        self.actions.insert(0, entry);
        self.actions.truncate(self.max);
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Load a persisted list. A missing file is an empty store.
    pub fn load(path: &Path, max: usize) -> Result<Self, PaletteError> {
        let mut store = Self::new(max);
        if !path.exists() {
            debug!("No recent actions at {:?}", path);
            return Ok(store);
        }

        let content = fs::read_to_string(path).map_err(|e| PaletteError::RecentRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut actions: Vec<Action> = serde_json::from_str(&content)?;
        actions.truncate(max);
        store.actions = actions;
        Ok(store)
    }

    /// Like [`RecentStore::load`] but never fails: unreadable history is dropped.
    pub fn load_or_empty(path: &Path, max: usize) -> Self {
        Self::load(path, max).unwrap_or_else(|e| {
            warn!("Ignoring recent actions: {}", e);
            Self::new(max)
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), PaletteError> {
        let write_err = |e| PaletteError::RecentWrite {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(&self.actions)?;
        fs::write(path, json).map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionEffect;

    fn tool(id: &str) -> Action {
        Action {
            id: id.to_string(),
            kind: ActionKind::Navigate,
            label: id.to_uppercase(),
            description: String::new(),
            icon: "Home".to_string(),
            keywords: vec![id.to_string()],
            section: "Tools".to_string(),
            shortcut: Some("Ctrl+1".to_string()),
            result: None,
            effect: ActionEffect::Navigate {
                tool_id: Some(id.to_string()),
                prefill_url: None,
            },
        }
    }

    #[test]
    fn test_add_retags_and_orders() {
        let mut store = RecentStore::new(10);
        store.add(&tool("a"));
        store.add(&tool("b"));
        let ids: Vec<&str> = store.actions().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(store.actions().iter().all(|a| a.kind == ActionKind::Recent));
        assert!(store.actions().iter().all(|a| a.section == RECENT_SECTION));
        assert_eq!(store.actions()[0].shortcut, None);
    }

    #[test]
    fn test_add_dedupes_by_id() {
        let mut store = RecentStore::new(10);
        store.add(&tool("a"));
        store.add(&tool("b"));
        store.add(&tool("a"));
        let ids: Vec<&str> = store.actions().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_bounded() {
        let mut store = RecentStore::new(10);
        for i in 0..15 {
            store.add(&tool(&format!("t{}", i)));
        }
        assert_eq!(store.len(), 10);
        assert_eq!(store.actions()[0].id, "t14");
        assert_eq!(store.actions()[9].id, "t5");
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir()
            .join(format!("tkp-recent-{}", uuid::Uuid::new_v4()))
            .join("recent.json");
        let mut store = RecentStore::new(5);
        store.add(&tool("a"));
        store.add(&tool("b"));
        store.save(&path).unwrap();

        let loaded = RecentStore::load(&path, 5).unwrap();
        assert_eq!(loaded, store);

        let smaller = RecentStore::load(&path, 1).unwrap();
        assert_eq!(smaller.len(), 1);
        assert_eq!(smaller.actions()[0].id, "b");
    }

    #[test]
    fn test_corrupt_file_falls_back_to_empty() {
        let dir = std::env::temp_dir().join(format!("tkp-recent-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("recent.json");
        fs::write(&path, "[oops").unwrap();
        assert!(RecentStore::load(&path, 10).is_err());
        assert!(RecentStore::load_or_empty(&path, 10).is_empty());
    }
}
