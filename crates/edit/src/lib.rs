//! Edit coordination for claimdesk form sections.
//!
//! A detail page shows several sibling form sections ("regions"). Only one of
//! them may be in edit mode at a time, and abandoning an edit goes through an
//! unsaved-changes confirmation step (the discard guard). This crate provides
//! the page-scoped registry that arbitrates both.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  mount_region / set_active_component   ┌───────────────┐
//! │ form section │ ─────────────────────────────────────▶ │               │
//! │  (region A)  │ ◀───────────── cancel(skip) ─────────── │  EditContext  │
//! └──────────────┘                                         │  (per page)   │
//! ┌──────────────┐  handle_unsaved_changes(action)         │               │
//! │ page guards  │ ─────────────────────────────────────▶ │               │
//! └──────────────┘                                         └───────┬───────┘
//! ┌──────────────┐  confirm_discard / cancel_discard               │
//! │ confirm view │ ◀───────── confirmation_pending() ──────────────┘
//! └──────────────┘
//! ```
//!
//! The registry is single-threaded. [`EditContext`] is a cheap cloneable
//! handle; every clone refers to the same page state.

mod context;

pub use context::{CancelCallback, CancelRegistration, EditContext, RegionId, WeakEditContext};

/// Observable phase of an edit registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    /// No region is being edited
    Idle,
    /// One region is in edit mode
    Editing,
    /// A discard confirmation is waiting for the user
    ConfirmingDiscard,
}

impl EditPhase {
    /// Short label for status displays
    pub fn label(self) -> &'static str {
        match self {
            EditPhase::Idle => "idle",
            EditPhase::Editing => "editing",
            EditPhase::ConfirmingDiscard => "confirm",
        }
    }
}
