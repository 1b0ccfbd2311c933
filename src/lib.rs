#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod annotation;
pub mod clipboard;
pub mod context_menu;
pub mod core;
pub mod edits;
pub mod events;
pub mod memory_core;
pub mod state;
pub mod ui;
pub mod ui_state;
pub mod window;

pub mod config;
pub mod theme;
pub mod utils;
