//! Chunk timeline viewer: parse per-schedule chunk timing logs, compare
//! them in a terminal UI, and render the progression plot to PNG.

pub mod action;
pub mod app;
pub mod components;
pub mod config;
pub mod effects;
pub mod export;
pub mod plot;
pub mod timings;
pub mod tui;
pub mod ui;
