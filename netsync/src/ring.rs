//! Fixed-capacity history keyed by frame number.

/// How [`FrameRing::resolve`] found a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<'a, T> {
    /// Nothing has ever been stored.
    Empty,
    /// The frame is older than the window.
    TooOld,
    /// A value was stored for exactly this frame.
    Exact(&'a T),
    /// The nearest usable earlier value, stored at `source`.
    Held { source: u32, value: &'a T },
}

/// A ring of `N` slots indexed by `frame % N`.
///
/// Only frames in `[start_frame, start_frame + N)` are accepted, and only
/// frames in `[start_frame, start_frame + count)` are considered present.
/// Each slot remembers the frame it was written for, so a stale slot left
/// behind by compaction is never mistaken for a live one.
#[derive(Debug, Clone)]
pub struct FrameRing<T, const N: usize> {
    entries: [Option<Entry<T>>; N],
    start_frame: u32,
    count: u32,
    latest: Option<Entry<T>>,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    frame: u32,
    value: T,
}

impl<T: Clone, const N: usize> FrameRing<T, N> {
    /// Slot count.
    pub const CAPACITY: u32 = N as u32;

    /// Creates an empty ring starting at frame zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: std::array::from_fn(|_| None),
            start_frame: 0,
            count: 0,
            latest: None,
        }
    }

    /// Oldest frame in the window.
    #[must_use]
    pub const fn start_frame(&self) -> u32 {
        self.start_frame
    }

    /// Logical length of the window, as a high-water mark above `start_frame`.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Returns `true` if nothing has been stored since creation or the last clear.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.latest.is_none()
    }

    /// The value stored for the highest frame so far, and that frame.
    #[must_use]
    pub fn latest(&self) -> Option<(u32, &T)> {
        self.latest.as_ref().map(|entry| (entry.frame, &entry.value))
    }

    /// Returns `true` if `frame` may be stored.
    #[must_use]
    pub fn accepts(&self, frame: u32) -> bool {
        frame
            .checked_sub(self.start_frame)
            .is_some_and(|offset| offset < Self::CAPACITY)
    }

    /// Stores `value` for `frame`. Returns `false` if the frame is outside the window.
    pub fn store(&mut self, frame: u32, value: T) -> bool {
        if !self.accepts(frame) {
            return false;
        }
        let entry = Entry { frame, value };
        self.entries[Self::slot(frame)] = Some(entry.clone());
        if self.latest.as_ref().map_or(true, |latest| frame >= latest.frame) {
            self.latest = Some(entry);
        }
        self.count = self.count.max(frame - self.start_frame + 1);
        true
    }

    /// Returns the value stored for exactly `frame`, if present.
    #[must_use]
    pub fn get(&self, frame: u32) -> Option<&T> {
        if frame < self.start_frame || frame - self.start_frame >= self.count {
            return None;
        }
        self.entries[Self::slot(frame)]
            .as_ref()
            .filter(|entry| entry.frame == frame)
            .map(|entry| &entry.value)
    }

    /// Returns the latest present value at or before `frame` within the window.
    ///
    /// This performs an O(N) scan.
    #[must_use]
    pub fn latest_at_or_before(&self, frame: u32) -> Option<(u32, &T)> {
        if frame < self.start_frame || self.count == 0 {
            return None;
        }
        let end = self.start_frame + self.count - 1;
        let mut probe = frame.min(end);
        loop {
            if let Some(value) = self.get(probe) {
                return Some((probe, value));
            }
            if probe == self.start_frame {
                return None;
            }
            probe -= 1;
        }
    }

    /// Looks up `frame`, falling back as described on [`Resolved`].
    ///
    /// A gap inside the window resolves to the nearest earlier stored value;
    /// anything past the window (or a gap with nothing before it) resolves to
    /// the value with the highest stored frame, whatever order values arrived in.
    #[must_use]
    pub fn resolve(&self, frame: u32) -> Resolved<'_, T> {
        let Some(latest) = self.latest.as_ref() else {
            return Resolved::Empty;
        };
        if frame < self.start_frame {
            return Resolved::TooOld;
        }
        if frame - self.start_frame < self.count {
            if let Some((source, value)) = self.latest_at_or_before(frame) {
                return if source == frame {
                    Resolved::Exact(value)
                } else {
                    Resolved::Held { source, value }
                };
            }
        }
        Resolved::Held {
            source: latest.frame,
            value: &latest.value,
        }
    }

    /// Slides the window forward once `current` runs more than `N/2` frames
    /// ahead of `start_frame`: the window becomes the `N/4` frames before
    /// `current`. Returns `true` if the ring was compacted.
    pub fn compact(&mut self, current: u32) -> bool {
        if current.saturating_sub(self.start_frame) <= Self::CAPACITY / 2 {
            return false;
        }
        self.start_frame = current - Self::CAPACITY / 4;
        self.count = Self::CAPACITY / 4;
        true
    }

    /// Drops every value and rewinds the window to frame zero.
    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            *entry = None;
        }
        self.start_frame = 0;
        self.count = 0;
        self.latest = None;
    }

    const fn slot(frame: u32) -> usize {
        frame as usize % N
    }
}

impl<T: Clone, const N: usize> Default for FrameRing<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
