//! Heap reclamation hint
//!
//! Runs before the warmup call so that timing starts from a settled heap.
//! Memory is reclaimed deterministically by ownership, so the default
//! implementation does nothing. Embedders that sit on top of an allocator
//! with deferred frees (arenas, epoch reclamation, pooled buffers) can plug
//! in their own flush here.

/// Best-effort request to settle the heap before a measurement
pub trait HeapReclaimer {
    /// Reclaim what can be reclaimed. Must not fail.
    fn reclaim(&self);
}

/// Reclaimer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReclaimer;

impl HeapReclaimer for NoopReclaimer {
    #[inline]
    fn reclaim(&self) {}
}

impl<R: HeapReclaimer + ?Sized> HeapReclaimer for &R {
    fn reclaim(&self) {
        (**self).reclaim();
    }
}
