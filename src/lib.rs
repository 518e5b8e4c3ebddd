//! rfwarden — portable wireless anomaly detection engine.
//!
//! The shared core behind every detector on a handheld 2.4 GHz monitor:
//! bounded-memory aggregation of streamed observations (WiFi management
//! frames, BLE advertisements, USB descriptors), threshold-based
//! classification of four attack signatures (deauthentication flood,
//! multi-SSID rogue AP, BLE advertisement spam, malicious USB
//! peripheral), and a stable, queryable result model for a display
//! layer.
//!
//! The crate is platform-free: `no_std`, no allocator, testable on any
//! host with `cargo test`. Platform binaries are thin consumers that
//! provide radio access, a monotonic millisecond tick, and display /
//! settings-storage sinks.
//!
//! Pipeline: capture callback → [`classify`] → [`engine`] (exclusion
//! boundary around the [`store`]) → [`alert`] on the consumer's cadence
//! → [`view`] for the display.

#![cfg_attr(not(test), no_std)]

pub mod alert;
pub mod channel;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod signatures;
pub mod store;
pub mod view;

pub use error::Error;
