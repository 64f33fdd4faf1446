//! Chart output modules.

pub mod renderer;

pub use renderer::render_charts;
