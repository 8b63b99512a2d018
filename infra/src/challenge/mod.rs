//! Challenge widget hosts for headless and test environments
//!
//! In the browser the widget and its anchor element belong to the page. These
//! implementations keep the same contracts in memory, so the controller can
//! run against an auth emulator or in integration tests.

pub mod anchor_host;
pub mod preset_widget;

pub use anchor_host::InMemoryAnchorHost;
pub use preset_widget::PresetTokenWidget;
