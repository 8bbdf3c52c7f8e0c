//! Toolkit Palette - quick-launcher engine for the developer toolkit
//!
//! Ranks a snapshot of navigation, live-system and recent actions against a
//! free-text query and synthesizes "instant" answers (calculations,
//! conversions, generators) from the query itself.
//!
//! # Pipeline
//! - focus: [`aggregator::gather_actions`] builds the candidate snapshot
//! - keystroke: [`ranker::filter_actions`] + [`intent::MatcherChain`]
//! - enter: [`executor::Executor`] runs the selected [`action::ActionEffect`]
//!
//! [`palette::Palette`] owns the session state and ties the steps together.

pub mod action;
pub mod aggregator;
pub mod config;
pub mod error;
pub mod executor;
pub mod intent;
pub mod palette;
pub mod providers;
pub mod ranker;
pub mod recent;
pub mod registry;
pub mod scorer;

pub use action::{Action, ActionEffect, ActionKind, Section};
pub use config::PaletteConfig;
pub use error::{PaletteError, ProviderError};
pub use executor::Executor;
pub use intent::MatcherChain;
pub use palette::{Direction, ExecuteOutcome, FeedbackKind, Palette, PaletteState, WindowRequest};
pub use recent::RecentStore;
