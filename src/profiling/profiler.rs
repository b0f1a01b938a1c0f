//! Chrome Trace ("flame style") span recording.
//!
//! Feature-gated with `--features profiling`.
//!
//! Usage:
//!   archway::profiling::init("profile/trace.json");
//!   {
//!     let _g = archway::profiling::span("World::iter");
//!     // ...
//!   }
//!   archway::profiling::shutdown();

use std::path::Path;

#[cfg(feature = "profiling")]
mod enabled {
    use std::fs::File;
    use std::io::{BufWriter, Write};
    use std::path::Path;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Mutex, OnceLock};
    use std::time::Instant;

    struct Sink {
        out: BufWriter<File>,
        any_event: bool,
    }

    static SINK: OnceLock<Mutex<Option<Sink>>> = OnceLock::new();
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

    std::thread_local! {
        static THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
    }

    fn sink() -> &'static Mutex<Option<Sink>> {
        SINK.get_or_init(|| Mutex::new(None))
    }

    fn now_us() -> u64 {
        EPOCH.get_or_init(Instant::now).elapsed().as_micros() as u64
    }

    /// Opens the trace file and writes the event-array header.
    ///
    /// Re-initialization replaces the previous sink.
    pub fn init(path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let Ok(file) = File::create(path) else { return };
        let mut out = BufWriter::new(file);
        let _ = out.write_all(b"[");

        let mut guard = sink().lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(Sink { out, any_event: false });
        now_us();
    }

    /// RAII guard recording one complete (`ph:"X"`) event on drop.
    #[must_use]
    pub struct SpanGuard {
        name: &'static str,
        start_us: u64,
    }

    /// Starts a span; the span ends when the guard drops.
    pub fn span(name: &'static str) -> SpanGuard {
        SpanGuard { name, start_us: now_us() }
    }

    impl Drop for SpanGuard {
        fn drop(&mut self) {
            let end_us = now_us();
            let tid = THREAD_ID.with(|id| *id);

            let mut guard = sink().lock().unwrap_or_else(|e| e.into_inner());
            let Some(sink) = guard.as_mut() else { return };

            let comma = if sink.any_event { "," } else { "" };
            sink.any_event = true;
            let _ = write!(
                sink.out,
                "{comma}\n{{\"name\":\"{}\",\"ph\":\"X\",\"ts\":{},\"dur\":{},\"pid\":1,\"tid\":{}}}",
                self.name,
                self.start_us,
                end_us - self.start_us,
                tid
            );
        }
    }

    /// Closes the event array and flushes the trace file.
    pub fn shutdown() {
        let mut guard = sink().lock().unwrap_or_else(|e| e.into_inner());
        if let Some(mut sink) = guard.take() {
            let _ = sink.out.write_all(b"\n]\n");
            let _ = sink.out.flush();
        }
    }
}

#[cfg(not(feature = "profiling"))]
mod disabled {
    use std::path::Path;

    /// No-op span guard.
    #[must_use]
    pub struct SpanGuard;

    /// No-op without the `profiling` feature.
    pub fn init(_path: &Path) {}

    /// No-op without the `profiling` feature.
    #[inline(always)]
    pub fn span(_name: &'static str) -> SpanGuard {
        SpanGuard
    }

    /// No-op without the `profiling` feature.
    pub fn shutdown() {}
}

#[cfg(feature = "profiling")]
use enabled as backend;
#[cfg(not(feature = "profiling"))]
use disabled as backend;

pub use backend::SpanGuard;

/// Initializes the profiler, writing trace events to `path`.
pub fn init(path: impl AsRef<Path>) {
    backend::init(path.as_ref());
}

/// Records a named execution span for the lifetime of the returned guard.
#[inline]
pub fn span(name: &'static str) -> SpanGuard {
    backend::span(name)
}

/// Flushes and closes the trace file.
pub fn shutdown() {
    backend::shutdown();
}
