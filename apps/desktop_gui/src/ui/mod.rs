//! UI layer for the desktop GUI: page model, egui shell, and theme.

pub mod app;
pub mod page;
pub mod theme;

pub use app::EcoSortApp;
