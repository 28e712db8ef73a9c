use crate::dash::SegmentDescriptor;

/// Cyclic position over a non-empty media list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaCursor {
    segments: Vec<SegmentDescriptor>,
    position: usize,
}

impl MediaCursor {
    /// `None` for an empty list.
    #[must_use]
    pub fn new(segments: Vec<SegmentDescriptor>) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        Some(Self {
            segments,
            position: 0,
        })
    }

    #[cfg(test)]
    pub(crate) const fn position(&self) -> usize {
        self.position
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns the descriptor at `position mod len` and advances.
    pub fn next_segment(&mut self) -> Option<&SegmentDescriptor> {
        let len = self.segments.len();
        let index = self.position.checked_rem(len)?;
        self.position = index.saturating_add(1).checked_rem(len).unwrap_or(0);
        self.segments.get(index)
    }
}
