//! Span table: the typed overlay recorded on top of a parcel's bytes.
//!
//! Spans are kept in a `Vec` sorted by start offset and never overlap.
//! Writes query for conflicting overlaps; reads do a point lookup at
//! the cursor. Parcels are small and short-lived, so binary search over
//! a flat vector is enough.

use skein_core::SpanKind;

/// Byte range and declared type of one written value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Span {
    /// First byte.
    pub(crate) start: usize,
    /// One past the last byte.
    pub(crate) end: usize,
    /// Declared type.
    pub(crate) kind: SpanKind,
}

impl Span {
    pub(crate) fn new(start: usize, end: usize, kind: SpanKind) -> Self {
        debug_assert!(start < end, "empty span [{start},{end})");
        Self { start, end, kind }
    }

    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && self.end > start
    }
}

/// Result of a point lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Lookup {
    /// No span covers the offset.
    Untyped,
    /// A span starts exactly at the offset.
    Start(Span),
    /// The offset falls strictly inside a span.
    Inside(Span),
}

/// Sorted, non-overlapping collection of [`Span`]s.
#[derive(Clone, Debug, Default)]
pub(crate) struct SpanTable {
    spans: Vec<Span>,
}

impl SpanTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of recorded spans.
    pub(crate) fn len(&self) -> usize {
        self.spans.len()
    }

    /// Index of the first span whose end is past `offset`.
    fn first_ending_after(&self, offset: usize) -> usize {
        self.spans.partition_point(|s| s.end <= offset)
    }

    /// Find the span covering `offset`, if any.
    pub(crate) fn lookup(&self, offset: usize) -> Lookup {
        match self.spans.get(self.first_ending_after(offset)) {
            Some(span) if span.start == offset => Lookup::Start(*span),
            Some(span) if span.start < offset => Lookup::Inside(*span),
            _ => Lookup::Untyped,
        }
    }

    /// First span that a write of `[start, end)` would cut.
    ///
    /// A write may replace a span that starts exactly at `start` (any
    /// length) or one lying wholly inside `[start, end)`. Any other
    /// overlap would leave a fragment of a value behind.
    pub(crate) fn conflict(&self, start: usize, end: usize) -> Option<Span> {
        self.spans[self.first_ending_after(start)..]
            .iter()
            .take_while(|s| s.start < end)
            .find(|s| s.start != start && !(s.start >= start && s.end <= end))
            .copied()
    }

    /// Record `span`, dropping every span it overlaps.
    ///
    /// Callers must have checked [`conflict`](Self::conflict) first.
    pub(crate) fn insert(&mut self, span: Span) {
        let lo = self.first_ending_after(span.start);
        let hi = lo
            + self.spans[lo..]
                .iter()
                .take_while(|s| s.overlaps(span.start, span.end))
                .count();
        if hi > lo {
            tracing::trace!(
                start = span.start,
                end = span.end,
                replaced = hi - lo,
                "span replaced"
            );
        }
        self.spans.splice(lo..hi, std::iter::once(span));
    }

    /// Drop every span lying wholly inside `[start, end)`.
    pub(crate) fn remove_within(&mut self, start: usize, end: usize) {
        let lo = self.spans.partition_point(|s| s.start < start);
        let hi = self.spans.partition_point(|s| s.end <= end);
        if lo < hi {
            self.spans.drain(lo..hi);
        }
    }

    /// Drop every span that extends past `limit`.
    pub(crate) fn truncate(&mut self, limit: usize) {
        let keep = self.spans.partition_point(|s| s.end <= limit);
        self.spans.truncate(keep);
    }

    /// Forget all spans.
    pub(crate) fn clear(&mut self) {
        self.spans.clear();
    }
}
