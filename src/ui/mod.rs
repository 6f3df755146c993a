//! Terminal rendering using ratatui.
//!
//! Each view gets its own module; `common` holds the chrome shared by all
//! of them (header, tabs, status bar, help overlay).

pub mod care;
pub mod common;
pub mod dashboard;
pub mod detail;
pub mod harvest;
pub mod theme;

pub use theme::Theme;
