//! Stroke path recording
//!
//! Accumulates the stroke's sample positions over a gesture so the host can
//! draw the painted path. Data only; drawing is the host's concern.

use glam::Vec2;

#[derive(Debug, Default)]
pub struct PathRecorder {
    positions: Vec<Vec2>,
}

impl PathRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the recorded path. Called when a gesture starts.
    pub fn start_recording(&mut self) {
        self.positions.clear();
    }

    pub fn add_position(&mut self, uv: Vec2) {
        self.positions.push(uv);
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_reset() {
        let mut recorder = PathRecorder::new();
        assert!(recorder.is_empty());

        recorder.add_position(Vec2::new(0.1, 0.1));
        recorder.add_position(Vec2::new(0.2, 0.1));
        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.positions()[1], Vec2::new(0.2, 0.1));

        recorder.start_recording();
        assert!(recorder.is_empty());
    }
}
