//! UI layer for desktop GUI: app shell and startup paths.

pub mod app;

pub use app::{AppPaths, DesktopGuiApp, StartupConfig};
