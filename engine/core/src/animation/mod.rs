//! Animation
//!
//! An [`Animation`] is immutable data: a non-empty list of same-shaped
//! frames and a frame rate. Playback state (current frame, time spent on
//! it, whether it loops) belongs to the widget that plays it, so one
//! animation can be shared by many widgets.

mod playback;

use std::time::Duration;

pub use playback::{AnimationState, Playback};

use crate::error::AnimationError;
use crate::tile::{Size, TileGrid};

/// Frames plus timing
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    frames: Vec<TileGrid>,
    fps: f64,
    frame_time: Duration,
}

impl Animation {
    /// Build an animation played at `fps` frames per second
    ///
    /// # Errors
    ///
    /// - [`AnimationError::Empty`] for an empty frame list
    /// - [`AnimationError::ShapeMismatch`] if any frame differs in size from
    ///   the first
    /// - [`AnimationError::InvalidFrameRate`] unless `fps` is finite and
    ///   positive
    pub fn new(frames: Vec<TileGrid>, fps: f64) -> Result<Self, AnimationError> {
        let Some(first) = frames.first() else {
            return Err(AnimationError::Empty);
        };
        let expected = first.size();
        if let Some((index, frame)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.size() != expected)
        {
            return Err(AnimationError::ShapeMismatch {
                index,
                expected,
                found: frame.size(),
            });
        }
        if !fps.is_finite() || fps <= 0.0 {
            return Err(AnimationError::InvalidFrameRate(fps));
        }
        // whole nanoseconds, so tick sums hit frame boundaries exactly
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let frame_time = Duration::from_nanos((1e9 / fps).round() as u64);
        if frame_time.is_zero() {
            return Err(AnimationError::InvalidFrameRate(fps));
        }

        Ok(Self {
            frames,
            fps,
            frame_time,
        })
    }

    /// All frames in play order
    #[must_use]
    pub fn frames(&self) -> &[TileGrid] {
        &self.frames
    }

    /// One frame, if `index` is in range
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&TileGrid> {
        self.frames.get(index)
    }

    /// Number of frames (at least one)
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`; kept for symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Shape shared by every frame
    #[must_use]
    pub fn size(&self) -> Size {
        self.frames[0].size()
    }

    /// Frames per second
    #[must_use]
    pub const fn fps(&self) -> f64 {
        self.fps
    }

    /// `1 / fps`
    #[must_use]
    pub const fn frame_time(&self) -> Duration {
        self.frame_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{Color, Tile};

    fn frame(h: usize, w: usize, ch: char) -> TileGrid {
        TileGrid::filled(Size::new(h, w), Tile::new(ch, Color::WHITE, Color::BLACK))
    }

    #[test]
    fn test_frame_time() {
        let anim = Animation::new(vec![frame(1, 1, 'a')], 10.0).unwrap();
        assert_eq!(anim.frame_time(), Duration::from_millis(100));
        assert_eq!(anim.len(), 1);
        assert_eq!(anim.size(), Size::new(1, 1));
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert_eq!(Animation::new(vec![], 10.0), Err(AnimationError::Empty));
        assert!(matches!(
            Animation::new(vec![frame(1, 1, 'a'), frame(1, 2, 'b')], 10.0),
            Err(AnimationError::ShapeMismatch { index: 1, .. })
        ));
        for fps in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(Animation::new(vec![frame(1, 1, 'a')], fps).is_err());
        }
    }
}
