//! Linear snapshot history with an undo/redo cursor.

use image::RgbaImage;

/// Full copy of the surface pixels at one point in time.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl Snapshot {
    pub fn capture(pixels: &RgbaImage) -> Self {
        Self {
            width: pixels.width(),
            height: pixels.height(),
            bytes: pixels.as_raw().clone(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    snapshots: Vec<Snapshot>,
    step: Option<usize>,
    limit: usize,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `limit` snapshots, dropping the oldest first. `0` means unbounded.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Cursor into the log; `None` while empty.
    pub fn step(&self) -> Option<usize> {
        self.step
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.step.and_then(|step| self.snapshots.get(step))
    }

    pub fn can_undo(&self) -> bool {
        self.step.is_some_and(|step| step > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.step
            .is_some_and(|step| step + 1 < self.snapshots.len())
    }

    /// Appends `snapshot` after the cursor, discarding any redo branch.
    pub fn push(&mut self, snapshot: Snapshot) {
        let keep = self.step.map_or(0, |step| step + 1);
        let discarded = self.snapshots.len().saturating_sub(keep);
        self.snapshots.truncate(keep);
        self.snapshots.push(snapshot);

        if self.limit > 0 && self.snapshots.len() > self.limit {
            let overflow = self.snapshots.len() - self.limit;
            self.snapshots.drain(..overflow);
        }
        self.step = Some(self.snapshots.len() - 1);
        tracing::debug!(
            step = self.snapshots.len() - 1,
            len = self.snapshots.len(),
            discarded,
            "history snapshot pushed"
        );
    }

    pub fn undo(&mut self) -> Option<&Snapshot> {
        let step = self.step.filter(|step| *step > 0)? - 1;
        self.step = Some(step);
        self.snapshots.get(step)
    }

    pub fn redo(&mut self) -> Option<&Snapshot> {
        let step = self.step? + 1;
        if step >= self.snapshots.len() {
            return None;
        }
        self.step = Some(step);
        self.snapshots.get(step)
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.step = None;
    }
}
