//! Arbor Core
//!
//! This crate contains the shared utilities for the Arbor widget engine:
//! hashing collections, geometry, logging setup and profiling hooks.

pub mod alloc;
pub mod config;
pub mod geometry;
pub mod logging;
pub mod math;
pub mod profiling;
