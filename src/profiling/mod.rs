//! Chrome Trace (flame-style) execution profiler.
//!
//! This module provides a **feature-gated, zero-overhead (when disabled)**
//! profiling API for the ECS core. When enabled, it records structured
//! execution spans and emits a **Chrome Trace Event JSON** file that can be
//! inspected using:
//!
//! - `chrome://tracing`
//! - <https://ui.perfetto.dev>
//!
//! ## Feature flag
//!
//! Span recording is only compiled when the `profiling` feature is enabled:
//!
//! ```bash
//! cargo test --features profiling
//! ```
//!
//! When the feature is disabled, all profiling calls compile to no-ops and
//! impose **zero runtime overhead** (no allocations, no atomics, no
//! branches).
//!
//! ## Usage
//!
//! ```no_run
//! use archway::profiling;
//!
//! profiling::init("profile/trace.json");
//!
//! {
//!     let _g = profiling::span("simulation tick");
//!     // run world mutations / iteration
//! }
//!
//! profiling::shutdown();
//! ```
//!
//! ## Design notes
//!
//! - Spans are recorded using RAII guards ([`SpanGuard`])
//! - Events are timestamped using a monotonic clock
//! - Each OS thread is assigned a stable logical thread ID
//! - Output follows the Chrome Trace `"X"` (complete event) specification
//!
//! Structural world operations (spawn, despawn, add, del, iterator
//! construction) carry their own spans.

/// Span recording backend and public entry points.
pub mod profiler;

pub use profiler::{init, shutdown, span, SpanGuard};
