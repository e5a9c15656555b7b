//! Test utilities for Arbor widget trees.
//!
//! This crate provides headless testing infrastructure for `arbor-ui`:
//! a harness that plays the host, a widget built from closures, and a
//! wrapper that records every callback a widget receives.
//!
//! # Overview
//!
//! - [`TestHarness`] - Owns a `RenderRoot` and simulates mouse, keyboard,
//!   window and accessibility input
//! - [`ModularWidget`] - Widget whose callbacks are closures over some state
//! - [`Recorder`] / [`Recording`] - Logs callbacks for later assertions
//!
//! # Example
//!
//! ```rust
//! use arbor_test_utils::{Record, RecordExt, Recording, TestHarness};
//! use arbor_ui::widgets::Label;
//!
//! let recording = Recording::new();
//! let harness = TestHarness::create(Label::new("hi").record(&recording));
//!
//! assert_eq!(recording.next(), Some(Record::RegisterChildren));
//! assert!(recording.updates().contains(&arbor_ui::Update::WidgetAdded));
//! assert!(harness.focused_widget().is_none());
//! ```
//!
//! # Design Philosophy
//!
//! ## 1. No Host
//!
//! Nothing here opens a window. The harness feeds events straight into the
//! render root and buffers its signals.
//!
//! ## 2. Interior Mutability
//!
//! Recordings are shared between the test and the widget inside the arena,
//! so they use `Mutex` and all methods take `&self`.

pub mod harness;
pub mod modular_widget;
pub mod recorder;

pub use harness::{HARNESS_DEFAULT_SIZE, TestHarness};
pub use modular_widget::ModularWidget;
pub use recorder::{Record, RecordExt, Recorder, Recording};
