//! Claim detail page application for claimdesk.
//!
//! Wires a [`ClaimPage`] (form sections plus their edit registry) to the
//! terminal: input handling, the discard dialog and rendering.

pub mod app;
pub mod claim;
pub mod event;
pub mod page;
pub mod render;

pub use app::App;
pub use claim::Claim;
pub use page::{ClaimPage, PageCommand, StatusKind};
