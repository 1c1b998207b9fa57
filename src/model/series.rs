use super::frame::ImageFrame;

/// Ordered slices of one series plus the slice currently on screen.
#[derive(Debug, Clone)]
pub struct SeriesStack {
    frames: Vec<ImageFrame>,
    current: usize,
}

impl SeriesStack {
    /// Build a stack ordered by instance number; frames without one keep their
    /// relative order after the numbered ones. Returns `None` for no frames.
    pub fn new(mut frames: Vec<ImageFrame>) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        frames.sort_by_key(|frame| (frame.instance_number().is_none(), frame.instance_number()));
        Some(Self { frames, current: 0 })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[ImageFrame] {
        &self.frames
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &ImageFrame {
        &self.frames[self.current]
    }

    /// Advance one slice. Returns whether the index moved.
    pub fn next_slice(&mut self) -> bool {
        self.select(self.current.saturating_add(1))
    }

    /// Step back one slice. Returns whether the index moved.
    pub fn previous_slice(&mut self) -> bool {
        match self.current.checked_sub(1) {
            Some(index) => self.select(index),
            None => false,
        }
    }

    /// Jump to `index`, clamped to the last slice.
    pub fn select(&mut self, index: usize) -> bool {
        let clamped = index.min(self.frames.len() - 1);
        if clamped == self.current {
            return false;
        }
        self.current = clamped;
        true
    }
}
