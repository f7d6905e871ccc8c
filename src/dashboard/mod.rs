//! Preview window
//!
//! The eframe shell around the preview controller: toolbar, category legend
//! and the zoomable, pannable receipt view.

pub mod app;
pub mod state;
pub mod theme;
pub mod views;

pub use app::run_dashboard;
pub use state::DashboardState;
