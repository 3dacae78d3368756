//! Configuration management for scanplate.
//!
//! Provides XDG-compliant storage for the optional settings file.

mod settings;

pub use settings::{AppSettings, Paths};
