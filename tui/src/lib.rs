//! Arcana TUI - Terminal tarot table
//!
//! A full-screen terminal surface over the headless core.
//!
//! # Architecture
//!
//! - **App**: event loop, mode switching, and the two carousels
//! - **Widgets**: card strip painted from projected transforms, scrollable
//!   interpretation pane
//! - **Theme**: palette and the opacity-to-color fade

pub mod app;
pub mod theme;
pub mod widgets;

pub use app::{App, AppSettings, Mode};
