//! Observation hooks for a running multiply.
//!
//! A [`TraceSink`] is told when a multiply starts and ends and when each
//! output row starts and ends. Sinks only observe: the multiplier's result is
//! the same whichever sink is attached. Row spans are opened and closed from
//! pool worker threads, so every sink must be `Send + Sync`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// The unit of work a span covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// A whole multiply producing a `rows x cols` result.
    Multiply { rows: usize, cols: usize },
    /// Computation of one output row.
    Row(usize),
}

impl Region {
    pub fn name(&self) -> &'static str {
        match self {
            Region::Multiply { .. } => "multiply",
            Region::Row(_) => "row",
        }
    }
}

/// Receives span lifecycle events from the multiplier.
///
/// `end_span` is called on the thread that called `begin_span` for the same
/// handle. Row spans name the multiply span's handle as their parent, and that
/// handle is borrowed from every worker thread at once.
pub trait TraceSink: Send + Sync {
    /// Token returned by `begin_span` and handed back to `end_span`.
    type Handle: Send + Sync;

    /// Open a span for `region`, nested under `parent` when one is given.
    fn begin_span(&self, region: Region, parent: Option<&Self::Handle>) -> Self::Handle;

    fn end_span(&self, handle: Self::Handle);
}

/// A sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {
    type Handle = ();

    fn begin_span(&self, _region: Region, _parent: Option<&()>) {}

    fn end_span(&self, _handle: ()) {}
}

/// A sink that emits `tracing` spans.
///
/// Whole multiplies are INFO spans, rows are DEBUG spans parented to their
/// multiply. A span is entered when it begins and exited and closed when it
/// ends, so a subscriber configured with span close events sees each region's
/// busy time.
///
/// Row spans are opened on pool worker threads, which do not inherit a
/// thread-local default subscriber. Use [`TracingSink::with_dispatch`] to pin
/// every span to one dispatcher regardless of the thread it is opened on.
#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    dispatch: Option<tracing::Dispatch>,
}

impl TracingSink {
    /// Spans go to whatever dispatcher is current on the opening thread.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spans always go to `dispatch`.
    pub fn with_dispatch(dispatch: tracing::Dispatch) -> Self {
        Self {
            dispatch: Some(dispatch),
        }
    }

    fn open(region: Region, parent: Option<&tracing::Span>) -> tracing::Span {
        // Without an explicit parent, nest under the opening thread's current span.
        let parent = parent.map_or_else(tracing::Span::current, Clone::clone);
        match region {
            Region::Multiply { rows, cols } => {
                tracing::info_span!(parent: &parent, "multiply", rows, cols)
            }
            Region::Row(index) => tracing::debug_span!(parent: &parent, "row", index),
        }
    }
}

impl TraceSink for TracingSink {
    type Handle = tracing::Span;

    fn begin_span(&self, region: Region, parent: Option<&tracing::Span>) -> tracing::Span {
        let span = match &self.dispatch {
            Some(dispatch) => {
                tracing::dispatcher::with_default(dispatch, || Self::open(region, parent))
            }
            None => Self::open(region, parent),
        };
        // `Span::enter` guards are !Send, so enter through the span's own
        // dispatcher and leave the handle a plain `Span`.
        span.with_subscriber(|(id, dispatch)| dispatch.enter(id));
        span
    }

    fn end_span(&self, handle: tracing::Span) {
        handle.with_subscriber(|(id, dispatch)| dispatch.exit(id));
    }
}

/// Whether an event marks the start or the end of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Begin,
    End,
}

/// One event captured by a [`RecordingSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent {
    pub id: u64,
    /// Id of the enclosing span, if any.
    pub parent: Option<u64>,
    pub region: Region,
    pub phase: Phase,
}

/// A sink that keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    next_id: AtomicU64,
    events: Mutex<Vec<TraceEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TraceEvent>> {
        // A poisoned log is still a valid log.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, event: TraceEvent) {
        self.lock().push(event);
    }
}

impl TraceSink for RecordingSink {
    /// The span's `Begin` event.
    type Handle = TraceEvent;

    fn begin_span(&self, region: Region, parent: Option<&TraceEvent>) -> TraceEvent {
        let event = TraceEvent {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            parent: parent.map(|p| p.id),
            region,
            phase: Phase::Begin,
        };
        self.push(event);
        event
    }

    fn end_span(&self, handle: TraceEvent) {
        self.push(TraceEvent {
            phase: Phase::End,
            ..handle
        });
    }
}

impl<S: TraceSink + ?Sized> TraceSink for &S {
    type Handle = S::Handle;

    fn begin_span(&self, region: Region, parent: Option<&S::Handle>) -> S::Handle {
        (**self).begin_span(region, parent)
    }

    fn end_span(&self, handle: S::Handle) {
        (**self).end_span(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_names() {
        assert_eq!(Region::Multiply { rows: 1, cols: 1 }.name(), "multiply");
        assert_eq!(Region::Row(3).name(), "row");
    }

    #[test]
    fn test_recording_sink_pairs_events() {
        let sink = RecordingSink::new();
        let outer = sink.begin_span(Region::Multiply { rows: 2, cols: 2 }, None);
        let inner = sink.begin_span(Region::Row(0), Some(&outer));
        sink.end_span(inner);
        sink.end_span(outer);

        let events = sink.events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].phase, Phase::Begin);
        assert_eq!(events[0].parent, None);
        assert_eq!(events[1].region, Region::Row(0));
        assert_eq!(events[1].parent, Some(events[0].id));
        assert_eq!(events[2].id, events[1].id);
        assert_eq!(events[2].parent, Some(events[0].id));
        assert_eq!(events[3].id, events[0].id);
        assert_eq!(events[3].phase, Phase::End);
    }

    fn touch<S: TraceSink>(sink: S, region: Region) {
        let h = sink.begin_span(region, None);
        sink.end_span(h);
    }

    #[test]
    fn test_sink_by_reference() {
        let sink = RecordingSink::new();
        touch(&sink, Region::Row(7));
        touch(&sink, Region::Row(8));
        let events = sink.events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[2].region, Region::Row(8));
    }

    #[test]
    fn test_tracing_sink_pinned_dispatch() {
        let sink = TracingSink::with_dispatch(tracing::Dispatch::none());
        let outer = sink.begin_span(Region::Multiply { rows: 1, cols: 1 }, None);
        let span = sink.begin_span(Region::Row(0), Some(&outer));
        assert!(span.is_disabled());
        sink.end_span(span);
        sink.end_span(outer);
    }
}
