//! Transition engine for multi-party approval workflows.
//!
//! This crate hosts the moving parts that sit on top of the shared
//! vocabulary in `tramita-types` and the persistence traits in
//! `tramita-store`:
//!
//! - [`VariantRegistry`] — validated workflow definitions, looked up by id;
//! - [`TransitionEngine`] — the single `apply` path every state change
//!   goes through, interactive or automated;
//! - [`EffectRegistry`] / [`SideEffect`] — named side effects declared on
//!   transitions, run before commit;
//! - [`CorrectionTracker`] — bounded reviewer/submitter correction rounds;
//! - [`DeadlineScanner`] — lease-guarded sweeps that drive overdue
//!   entities as the system actor;
//! - [`BusinessCalendar`] — business-day arithmetic for deadlines.

#![deny(unsafe_code)]

pub mod calendar;
pub mod correction;
pub mod effects;
pub mod engine;
pub mod registry;
pub mod scanner;

pub use calendar::{BusinessCalendar, WeekdayCalendar};
pub use correction::{CorrectionTracker, TrackerError};
pub use effects::{EffectContext, EffectError, EffectRegistry, SideEffect};
pub use engine::TransitionEngine;
pub use registry::VariantRegistry;
pub use scanner::{DeadlineScanner, ScanReport};
