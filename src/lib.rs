//! Patisserie: a decorative 3D dessert scene
//!
//! An orbit camera circles a bouncing extruded-text title surrounded by
//! randomly scattered dessert models. Layout responds to window width through
//! a three-tier breakpoint table, and every asset loads in the background so
//! the window is interactive immediately.
//!
//! ```no_run
//! let app = patisserie::default();
//! app.run();
//! ```

pub mod app;
pub mod assembler;
pub mod assets;
pub mod gfx;
pub mod responsive;
pub mod scatter;
pub mod text;
pub mod wgpu_utils;

pub use app::PatisserieApp;

/// Creates the application with default settings.
pub fn default() -> PatisserieApp {
    pollster::block_on(PatisserieApp::new())
}
