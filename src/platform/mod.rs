//! Platform abstraction layer
//!
//! Hosts the exercise outside a real shooting range application:
//! - Virtual time and one-shot timers
//! - UI context dispatch
//! - In-memory target store

pub mod headless;

pub use headless::{HeadlessHost, PlacedTarget};
