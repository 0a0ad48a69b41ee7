//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the radio playback core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Status channel and session event bus
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that other modules depend on.
//! It establishes the logging conventions and the broadcast mechanisms used
//! to publish playback state to observers.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
