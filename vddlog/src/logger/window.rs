/// Fixed ring of readings that yields their mean each time it wraps
pub struct AveragingWindow<const N: usize> {
    data: [u32; N],
    write_at: usize,
}

impl<const N: usize> AveragingWindow<N> {
    const NON_EMPTY: () = assert!(N > 0, "averaging window needs at least one slot");

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;

        Self {
            data: [0; N],
            write_at: 0,
        }
    }

    /// Position the next reading will be written to
    #[inline]
    pub fn cursor(&self) -> usize {
        self.write_at
    }

    /// Stores a reading, returning the truncated mean of the whole window
    /// if this reading completed it
    pub fn push(&mut self, reading: u32) -> Option<u32> {
        self.data[self.write_at] = reading;

        self.write_at += 1;
        if self.write_at == N {
            self.write_at = 0;
            Some(self.mean())
        } else {
            None
        }
    }

    fn mean(&self) -> u32 {
        let sum: u64 = self.data.iter().map(|r| *r as u64).sum();
        (sum / N as u64) as u32
    }
}

impl<const N: usize> Default for AveragingWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}
