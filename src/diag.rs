//! The two external interfaces the core substrate consumes rather than
//! hard-codes: a diagnostic output sink and a monotonic tick source.
//! Everything in `trit`/`gate`/`tvm`/`lambda` that would otherwise reach
//! for `println!` or a wall-clock call takes one of these instead, so an
//! embedding can redirect output or supply its own notion of time.

use std::io::Write;
use std::time::Instant;

/// A sink for diagnostic output (trace dumps, disassembly, register
/// snapshots). `&mut dyn DiagSink` rather than `println!` everywhere
/// lets an embedding capture output instead of writing to stdout.
pub trait DiagSink {
    fn write(&mut self, bytes: &[u8]);
}

/// The default sink: writes straight to stdout, for anyone who doesn't
/// need to redirect output.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl DiagSink for StdoutSink {
    fn write(&mut self, bytes: &[u8]) {
        let _ = std::io::stdout().write_all(bytes);
    }
}

/// A monotonically increasing tick source, consumed by `RDTSC` and the
/// CLI's cycle-rate reporting.
pub trait TickSource {
    fn ticks(&self) -> u64;
    fn clone_box(&self) -> Box<dyn TickSource>;
}

impl Clone for Box<dyn TickSource> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// The default tick source: nanoseconds since construction, via
/// `std::time::Instant`.
#[derive(Debug)]
pub struct MonotonicTickSource {
    start: Instant,
}

impl MonotonicTickSource {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for MonotonicTickSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for MonotonicTickSource {
    fn ticks(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }

    fn clone_box(&self) -> Box<dyn TickSource> {
        Box::new(MonotonicTickSource { start: self.start })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_tick_source_never_goes_backwards() {
        let source = MonotonicTickSource::new();
        let a = source.ticks();
        let b = source.ticks();
        assert!(b >= a);
    }

    #[derive(Default)]
    struct BufferSink(Vec<u8>);
    impl DiagSink for BufferSink {
        fn write(&mut self, bytes: &[u8]) {
            self.0.extend_from_slice(bytes);
        }
    }

    #[test]
    fn diag_sink_can_be_swapped_for_a_buffer() {
        let mut sink = BufferSink::default();
        sink.write(b"hello");
        assert_eq!(sink.0, b"hello");
    }
}
