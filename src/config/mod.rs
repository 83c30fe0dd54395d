// src/config/mod.rs
//! Configuration system for arcx-clean
//!
//! Optional TOML file with built-in defaults; CLI flags win over both.

pub use app::{from_path, from_toml_str, load, Config, Filter, Kdf};

mod app;
mod defaults;
