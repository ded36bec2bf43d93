use core::future::Future;

/// Monotonic millisecond clock of the cooperative runtime.
///
/// Waiting suspends the current task and releases the executor to other
/// tasks until the deadline has passed.
pub trait TimeDriver {
    type TimerFut: Future<Output = ()> + Unpin;

    /// Milliseconds since boot
    fn now_ms(&self) -> u64;

    fn wait_until(&self, deadline_ms: u64) -> Self::TimerFut;

    fn wait(&self, duration_ms: u64) -> Self::TimerFut {
        self.wait_until(self.now_ms().saturating_add(duration_ms))
    }
}
