//! Dashboard views

pub mod legend;
pub mod preview;
pub mod toolbar;

pub use legend::render_legend;
pub use preview::render_preview;
pub use toolbar::render_toolbar;
