//! Palette orchestrator: owns the session state and drives the
//! Idle → Active → Executing → Feedback cycle.
//!
//! Ranking and intent matching are recomputed synchronously on every input
//! change, so the visible sections always reflect the current query. The only
//! asynchronous inputs are the candidate refresh and action execution. The
//! shell shows and hides the window; the palette only asks for it through
//! [`WindowRequest`] values.

use crate::action::{flat_count, flat_get, Action, Section, INSTANT_SECTION};
use crate::aggregator::gather_actions;
use crate::config::PaletteConfig;
use crate::executor::Executor;
use crate::intent::MatcherChain;
use crate::providers::SystemProbe;
use crate::ranker::filter_actions;
use crate::recent::RecentStore;
use crate::registry::ToolDefinition;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteState {
    /// Window hidden or unfocused
    Idle,
    /// Focused and accepting input
    Active,
    /// An action is in flight
    Executing,
    /// Showing the confirmation of a smart action
    Feedback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Copied,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub action_id: String,
    pub kind: FeedbackKind,
    pub deadline: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRequest {
    Hide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// Nothing selected, or input is locked
    Ignored,
    /// Non-smart action ran; the window should hide now
    Hidden,
    /// Smart action ran; the window stays up until the dwell elapses
    Feedback(FeedbackKind),
    /// The effect failed; the window should hide without a confirmation
    Failed,
}

impl ExecuteOutcome {
    pub fn window_request(&self) -> Option<WindowRequest> {
        match self {
            ExecuteOutcome::Hidden | ExecuteOutcome::Failed => Some(WindowRequest::Hide),
            ExecuteOutcome::Ignored | ExecuteOutcome::Feedback(_) => None,
        }
    }
}

pub struct Palette {
    state: PaletteState,
    query: String,
    selection: usize,
    candidates: Vec<Action>,
    sections: Vec<Section>,
    feedback: Option<Feedback>,
    recent: RecentStore,
    chain: MatcherChain,
    tools: &'static [ToolDefinition],
    dwell: Duration,
}

impl Palette {
    pub fn new(config: &PaletteConfig, tools: &'static [ToolDefinition], recent: RecentStore) -> Self {
        Self {
            state: PaletteState::Idle,
            query: String::new(),
            selection: 0,
            candidates: Vec::new(),
            sections: Vec::new(),
            feedback: None,
            recent,
            chain: MatcherChain::standard(),
            tools,
            dwell: config.feedback_dwell(),
        }
    }

    pub fn state(&self) -> PaletteState {
        self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selection(&self) -> usize {
        self.selection
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn candidates(&self) -> &[Action] {
        &self.candidates
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn recent(&self) -> &RecentStore {
        &self.recent
    }

    pub fn result_count(&self) -> usize {
        flat_count(&self.sections)
    }

    pub fn selected_action(&self) -> Option<&Action> {
        flat_get(&self.sections, self.selection)
    }

    fn in_feedback(&self) -> bool {
        self.state == PaletteState::Feedback
    }

    /// Instant section first, then the ranked candidates.
    fn recompute(&mut self) {
        let smart = self.chain.smart_actions(&self.query);
        let mut sections = Vec::with_capacity(4);
        if !smart.is_empty() {
            sections.push(Section {
                title: INSTANT_SECTION.to_string(),
                actions: smart,
            });
        }
        sections.extend(filter_actions(&self.candidates, self.query.trim()));
        self.sections = sections;
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        self.selection = self.selection.min(self.result_count().saturating_sub(1));
    }

    /// Window gained focus: start a fresh session over the current snapshot.
    /// Follow with [`Palette::refresh_candidates`] to rebuild it.
    pub fn on_focus(&mut self) {
        self.state = PaletteState::Active;
        self.query.clear();
        self.selection = 0;
        self.feedback = None;
        self.recompute();
    }

    /// Rebuild the candidate snapshot from the registry, a live scan and the
    /// recency list.
    pub async fn refresh_candidates(&mut self, probe: &dyn SystemProbe) {
        let candidates = gather_actions(self.tools, probe, &self.recent).await;
        self.replace_candidates(candidates);
    }

    /// Land a freshly gathered snapshot. Safe to call at any time; the query
    /// and selection are kept, the selection clamped.
    pub fn replace_candidates(&mut self, candidates: Vec<Action>) {
        debug!("Candidate snapshot replaced ({} actions)", candidates.len());
        self.candidates = candidates;
        self.recompute();
    }

    /// Focus loss hides the window unless a confirmation is showing.
    pub fn on_blur(&mut self) -> Option<WindowRequest> {
        if self.in_feedback() {
            return None;
        }
        self.state = PaletteState::Idle;
        Some(WindowRequest::Hide)
    }

    pub fn on_escape(&mut self) -> WindowRequest {
        self.feedback = None;
        self.state = PaletteState::Idle;
        WindowRequest::Hide
    }

    pub fn on_input(&mut self, query: &str) {
        if self.in_feedback() {
            return;
        }
        self.query = query.to_string();
        self.selection = 0;
        self.feedback = None;
        self.recompute();
    }

    pub fn move_selection(&mut self, direction: Direction) {
        if self.in_feedback() {
            return;
        }
        self.selection = match direction {
            Direction::Up => self.selection.saturating_sub(1),
            Direction::Down => self.selection + 1,
        };
        self.clamp_selection();
    }

    /// Pointer hover over a result row.
    pub fn hover(&mut self, index: usize) {
        if !self.in_feedback() && index < self.result_count() {
            self.selection = index;
        }
    }

    pub async fn execute_selected(&mut self, executor: &Executor) -> ExecuteOutcome {
        self.execute_at(self.selection, executor).await
    }

    /// Execute the action at `index` (Enter or click).
    pub async fn execute_at(&mut self, index: usize, executor: &Executor) -> ExecuteOutcome {
        if self.state != PaletteState::Active {
            return ExecuteOutcome::Ignored;
        }
        let Some(action) = flat_get(&self.sections, index).cloned() else {
            return ExecuteOutcome::Ignored;
        };
        self.selection = index;
        self.state = PaletteState::Executing;

        if let Err(e) = executor.run(&action).await {
            warn!("Action {} failed: {}", action.id, e);
            self.state = PaletteState::Idle;
            return ExecuteOutcome::Failed;
        }

        if !action.is_smart() {
            self.recent.add(&action);
            self.state = PaletteState::Idle;
            return ExecuteOutcome::Hidden;
        }

        let kind = match action.result.as_deref() {
            Some(result) if !result.is_empty() => FeedbackKind::Copied,
            _ => FeedbackKind::Done,
        };
        info!("Smart action {} finished ({:?})", action.id, kind);
        self.feedback = Some(Feedback {
            action_id: action.id,
            kind,
            deadline: Instant::now() + self.dwell,
        });
        self.state = PaletteState::Feedback;
        ExecuteOutcome::Feedback(kind)
    }

    /// End the confirmation once its deadline has passed.
    pub fn poll_feedback(&mut self, now: Instant) -> Option<WindowRequest> {
        let deadline = self.feedback.as_ref()?.deadline;
        if now < deadline {
            return None;
        }
        self.feedback = None;
        self.state = PaletteState::Idle;
        Some(WindowRequest::Hide)
    }

    /// Wait out the confirmation dwell, if one is showing.
    pub async fn settle_feedback(&mut self) -> Option<WindowRequest> {
        let deadline = self.feedback.as_ref()?.deadline;
        tokio::time::sleep_until(deadline).await;
        self.poll_feedback(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionEffect, ActionKind};
    use crate::providers::fakes::{port, FakeDesktop, FakeSystem};
    use crate::registry::builtin_tools;
    use std::sync::Arc;

    fn fixture() -> (Palette, Executor, Arc<FakeDesktop>) {
        let desktop = Arc::new(FakeDesktop::default());
        let executor = Executor::new(Arc::new(FakeSystem::default()), desktop.clone());
        let palette = Palette::new(&PaletteConfig::default(), builtin_tools(), RecentStore::new(10));
        (palette, executor, desktop)
    }

    fn command(id: &str) -> Action {
        Action {
            id: id.to_string(),
            kind: ActionKind::Command,
            label: format!("Copy {}", id),
            description: String::new(),
            icon: "Copy".to_string(),
            keywords: Vec::new(),
            section: "Commands".to_string(),
            shortcut: None,
            result: None,
            effect: ActionEffect::CopyText { text: id.to_string() },
        }
    }

    async fn focused() -> (Palette, Executor, Arc<FakeDesktop>) {
        let (mut palette, executor, desktop) = fixture();
        palette.on_focus();
        palette.refresh_candidates(&FakeSystem::default()).await;
        (palette, executor, desktop)
    }

    #[tokio::test]
    async fn test_focus_builds_directory_view() {
        let (palette, _, _) = focused().await;
        assert_eq!(palette.state(), PaletteState::Active);
        assert_eq!(palette.result_count(), 23);
        assert_eq!(palette.sections()[0].title, "Navigation");
        assert_eq!(palette.selected_action().map(|a| a.id.as_str()), Some("nav-home"));
    }

    #[tokio::test]
    async fn test_instant_section_comes_first() {
        let (mut palette, _, _) = focused().await;
        palette.on_input("uuid");
        assert_eq!(palette.sections()[0].title, INSTANT_SECTION);
        assert_eq!(palette.sections()[1].title, "Tools");
        assert_eq!(palette.sections()[1].actions[0].id, "nav-uuid-generator");
    }

    #[tokio::test]
    async fn test_selection_clamps() {
        let (mut palette, _, _) = focused().await;
        palette.on_input("");
        palette.move_selection(Direction::Up);
        assert_eq!(palette.selection(), 0);
        for _ in 0..100 {
            palette.move_selection(Direction::Down);
        }
        assert_eq!(palette.selection(), 22);
    }

    #[tokio::test]
    async fn test_shrinking_snapshot_clamps_selection() {
        let (mut palette, _, _) = fixture();
        palette.on_focus();
        palette.replace_candidates((0..6).map(|i| command(&format!("c{}", i))).collect());
        for _ in 0..5 {
            palette.move_selection(Direction::Down);
        }
        assert_eq!(palette.selection(), 5);

        palette.replace_candidates((0..3).map(|i| command(&format!("c{}", i))).collect());
        assert_eq!(palette.selection(), 2);

        palette.replace_candidates(Vec::new());
        assert_eq!(palette.selection(), 0);
        assert!(palette.selected_action().is_none());
    }

    #[tokio::test]
    async fn test_input_resets_selection() {
        let (mut palette, _, _) = focused().await;
        palette.move_selection(Direction::Down);
        palette.move_selection(Direction::Down);
        palette.on_input("json");
        assert_eq!(palette.selection(), 0);
    }

    #[tokio::test]
    async fn test_hover_selects_valid_rows_only() {
        let (mut palette, _, _) = focused().await;
        palette.hover(4);
        assert_eq!(palette.selection(), 4);
        palette.hover(999);
        assert_eq!(palette.selection(), 4);
    }

    #[tokio::test]
    async fn test_non_smart_execution_records_recent_and_hides() {
        let (mut palette, executor, desktop) = focused().await;
        palette.on_input("base64");
        let target = palette
            .sections()
            .iter()
            .flat_map(|s| s.actions.iter())
            .position(|a| a.id == "nav-base64")
            .unwrap();

        let outcome = palette.execute_at(target, &executor).await;
        assert_eq!(outcome, ExecuteOutcome::Hidden);
        assert_eq!(outcome.window_request(), Some(WindowRequest::Hide));
        assert_eq!(palette.state(), PaletteState::Idle);
        assert_eq!(palette.recent().actions()[0].id, "nav-base64");
        assert_eq!(desktop.navigations()[0].tool_id.as_deref(), Some("base64"));
    }

    #[tokio::test]
    async fn test_recent_shows_up_next_session() {
        let (mut palette, executor, _) = focused().await;
        palette.on_input("markdown");
        palette.execute_selected(&executor).await;

        palette.on_focus();
        palette.refresh_candidates(&FakeSystem::default()).await;
        let titles: Vec<&str> = palette.sections().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Navigation", "Tools", "Recent"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_smart_execution_enters_feedback() {
        let (mut palette, executor, desktop) = focused().await;
        palette.on_input("= 2+3*4");
        let outcome = palette.execute_selected(&executor).await;

        assert_eq!(outcome, ExecuteOutcome::Feedback(FeedbackKind::Copied));
        assert_eq!(palette.state(), PaletteState::Feedback);
        assert_eq!(palette.feedback().map(|f| f.action_id.as_str()), Some("smart-calc"));
        assert_eq!(desktop.clipboard(), vec!["14".to_string()]);
        // smart actions never enter the recency list
        assert!(palette.recent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_feedback_done_without_result() {
        let (mut palette, executor, _) = focused().await;
        palette.on_input("sha256 hello");
        let outcome = palette.execute_selected(&executor).await;
        assert_eq!(outcome, ExecuteOutcome::Feedback(FeedbackKind::Done));
    }

    #[tokio::test(start_paused = true)]
    async fn test_feedback_survives_blur_until_dwell() {
        let (mut palette, executor, _) = focused().await;
        palette.on_input("uuid");
        palette.execute_selected(&executor).await;
        let started = Instant::now();

        assert_eq!(palette.on_blur(), None);
        assert_eq!(palette.state(), PaletteState::Feedback);

        // input and navigation are locked during the dwell
        palette.on_input("json");
        assert_eq!(palette.query(), "uuid");
        palette.move_selection(Direction::Down);
        assert_eq!(palette.selection(), 0);

        tokio::time::advance(Duration::from_millis(899)).await;
        assert_eq!(palette.poll_feedback(Instant::now()), None);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(palette.poll_feedback(Instant::now()), Some(WindowRequest::Hide));
        assert_eq!(palette.state(), PaletteState::Idle);
        assert!(palette.feedback().is_none());
        assert_eq!(Instant::now() - started, Duration::from_millis(900));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_feedback_waits_for_dwell() {
        let (mut palette, executor, _) = focused().await;
        palette.on_input("rev abc");
        palette.execute_selected(&executor).await;
        let started = Instant::now();

        assert_eq!(palette.settle_feedback().await, Some(WindowRequest::Hide));
        assert!(Instant::now() - started >= Duration::from_millis(900));
        assert_eq!(palette.state(), PaletteState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_escape_cancels_feedback() {
        let (mut palette, executor, _) = focused().await;
        palette.on_input("uuid");
        palette.execute_selected(&executor).await;
        assert_eq!(palette.on_escape(), WindowRequest::Hide);
        assert!(palette.feedback().is_none());
        assert_eq!(palette.state(), PaletteState::Idle);
        assert_eq!(palette.settle_feedback().await, None);
    }

    #[tokio::test]
    async fn test_blur_hides_when_active() {
        let (mut palette, _, _) = focused().await;
        assert_eq!(palette.on_blur(), Some(WindowRequest::Hide));
        assert_eq!(palette.state(), PaletteState::Idle);
    }

    #[tokio::test]
    async fn test_failed_execution_reports_and_hides() {
        let desktop = Arc::new(FakeDesktop {
            fail_clipboard: true,
            ..Default::default()
        });
        let executor = Executor::new(Arc::new(FakeSystem::default()), desktop);
        let (mut palette, _, _) = focused().await;
        palette.on_input("uuid");

        let outcome = palette.execute_selected(&executor).await;
        assert_eq!(outcome, ExecuteOutcome::Failed);
        assert_eq!(outcome.window_request(), Some(WindowRequest::Hide));
        assert!(palette.feedback().is_none());
        assert_eq!(palette.state(), PaletteState::Idle);
    }

    #[tokio::test]
    async fn test_execute_ignored_when_nothing_matches() {
        let (mut palette, executor, _) = focused().await;
        palette.on_input("zzzz qqqq");
        assert_eq!(palette.result_count(), 0);
        assert_eq!(palette.execute_selected(&executor).await, ExecuteOutcome::Ignored);
        assert_eq!(palette.state(), PaletteState::Active);
    }

    #[tokio::test]
    async fn test_port_actions_rank_under_their_section() {
        let (mut palette, _, _) = fixture();
        palette.on_focus();
        palette
            .refresh_candidates(&FakeSystem::with_ports(vec![port(5173, 9, "vite")]))
            .await;
        palette.on_input("vite");
        assert_eq!(palette.sections()[0].title, "Active Ports");
        assert_eq!(palette.sections()[0].actions.len(), 3);

        palette.on_input("9");
        let ports = palette.sections().iter().find(|s| s.title == "Active Ports").unwrap();
        assert_eq!(ports.actions.len(), 3);
    }

    #[tokio::test]
    async fn test_filtering_is_repeatable() {
        let (mut palette, _, _) = focused().await;
        palette.on_input("255 to hex");
        let first = palette.sections().to_vec();
        palette.on_input("255 to hex");
        assert_eq!(palette.sections(), first.as_slice());
    }
}
