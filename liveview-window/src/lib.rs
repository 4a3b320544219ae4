//! Windowing utilities for the `liveview` crate.
//!
//! The `liveview` crate maintains live projections of record collections. This crate provides
//! the pieces a virtualized list or grid needs on top of one:
//!
//! - A sliding window: a bounded, repositionable slice of any ordered collection that reports
//!   minimal add/remove deltas on small moves and a reset on large jumps
//! - A controller that owns a projection plus a window and routes source mutations and viewport
//!   updates through both
//!
//! This crate is intentionally framework-agnostic (no rendering bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod window;

#[cfg(test)]
mod tests;

pub use controller::Controller;
pub use window::{SlidingWindow, WindowOptions, WindowRange, WindowState};
