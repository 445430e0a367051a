//! User Interface module
//!
//! Terminal front-end using ratatui: particle canvas, achievements and input.

pub mod app;

pub use app::App;
