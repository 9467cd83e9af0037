//! Animation playback widgets
//!
//! Ticks accumulate into `elapsed`; every full `frame_time` advances the
//! frame index, carrying the remainder forward. Cycling playback wraps to
//! frame 0, non-cycling playback halts on the last frame and ignores ticks
//! until it is restarted.

use std::collections::HashMap;
use std::time::Duration;

use super::Animation;
use crate::backend::DisplayBackend;
use crate::error::{AnimationError, Result, StateError};
use crate::events::Event;
use crate::scene::{Scene, WidgetId, WidgetKind};
use crate::tile::TileGrid;

/// Name under which a single-animation widget stores its animation
const SINGLE: &str = "default";

/// Position within an animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playback {
    index: usize,
    elapsed: Duration,
    cycle: bool,
    running: bool,
}

impl Playback {
    /// Start at frame 0
    #[must_use]
    pub const fn new(cycle: bool) -> Self {
        Self {
            index: 0,
            elapsed: Duration::ZERO,
            cycle,
            running: true,
        }
    }

    /// Current frame index
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Whether playback wraps around
    #[must_use]
    pub const fn cycle(&self) -> bool {
        self.cycle
    }

    /// Whether ticks still advance playback
    #[must_use]
    pub const fn running(&self) -> bool {
        self.running
    }

    /// Add `dt` and step through every frame boundary it crosses
    ///
    /// Returns whether the frame index changed.
    pub fn advance(&mut self, dt: Duration, frame_time: Duration, len: usize) -> bool {
        if !self.running || len == 0 || frame_time.is_zero() {
            return false;
        }
        let start = self.index;
        let mut stepped = false;
        self.elapsed += dt;
        while self.running && self.elapsed >= frame_time {
            self.elapsed -= frame_time;
            stepped = true;
            if self.index + 1 < len {
                self.index += 1;
            } else if self.cycle {
                self.index = 0;
            }
            if !self.cycle && self.index + 1 >= len {
                self.running = false;
                self.elapsed = Duration::ZERO;
            }
        }
        // a one-frame cycling animation steps without changing anything
        stepped && (self.index != start || len > 1)
    }
}

/// Named animations and the playback of the current one
#[derive(Debug, Clone)]
pub struct AnimationState {
    animations: HashMap<String, Animation>,
    current: String,
    playback: Playback,
    emit_updates: bool,
}

impl AnimationState {
    /// Name of the animation being played
    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Playback position
    #[must_use]
    pub const fn playback(&self) -> Playback {
        self.playback
    }

    /// Names of every registered animation, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.animations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn current_animation(&self) -> Option<&Animation> {
        self.animations.get(&self.current)
    }
}

impl<B: DisplayBackend> Scene<B> {
    /// Build an animation played at the configured `animation.default_fps`
    ///
    /// # Errors
    ///
    /// The same as [`Animation::new`].
    pub fn default_animation(&self, frames: Vec<TileGrid>) -> Result<Animation> {
        Ok(Animation::new(frames, self.config().animation.default_fps)?)
    }

    /// Create a widget that plays one animation
    ///
    /// The widget starts on frame 0 and emits
    /// [`Event::ContentUpdated`] whenever the frame changes.
    pub fn create_animation(&mut self, animation: Animation, cycle: bool) -> WidgetId {
        let first = animation.frames()[0].clone();
        let mut animations = HashMap::new();
        animations.insert(SINGLE.to_string(), animation);
        self.spawn(
            first,
            WidgetKind::Animation(AnimationState {
                animations,
                current: SINGLE.to_string(),
                playback: Playback::new(cycle),
                emit_updates: true,
            }),
        )
    }

    /// Create a widget that switches among named animations
    ///
    /// # Errors
    ///
    /// - [`AnimationError::Empty`] if `animations` is empty
    /// - [`AnimationError::ShapeMismatch`] if the animations differ in size
    /// - [`StateError::UnknownAnimation`] if `initial` is not among them
    pub fn create_multi_animation(
        &mut self,
        animations: Vec<(String, Animation)>,
        initial: &str,
        cycle: bool,
    ) -> Result<WidgetId> {
        let Some((_, first)) = animations.first() else {
            return Err(AnimationError::Empty.into());
        };
        let expected = first.size();
        if let Some((index, (_, anim))) = animations
            .iter()
            .enumerate()
            .find(|(_, (_, a))| a.size() != expected)
        {
            return Err(AnimationError::ShapeMismatch {
                index,
                expected,
                found: anim.size(),
            }
            .into());
        }
        let animations: HashMap<String, Animation> = animations.into_iter().collect();
        let Some(start) = animations.get(initial) else {
            return Err(StateError::UnknownAnimation(initial.to_string()).into());
        };
        let first_frame = start.frames()[0].clone();

        Ok(self.spawn(
            first_frame,
            WidgetKind::Animation(AnimationState {
                animations,
                current: initial.to_string(),
                playback: Playback::new(cycle),
                emit_updates: true,
            }),
        ))
    }

    fn animation_state_mut(
        &mut self,
        id: WidgetId,
    ) -> std::result::Result<&mut AnimationState, StateError> {
        match self.widgets.get_mut(&id).map(|w| &mut w.kind) {
            Some(WidgetKind::Animation(state)) => Ok(state),
            _ => Err(StateError::WrongKind {
                id,
                expected: "animation widget",
            }),
        }
    }

    fn animation_state(&self, id: WidgetId) -> std::result::Result<&AnimationState, StateError> {
        match self.widgets.get(&id).map(|w| &w.kind) {
            Some(WidgetKind::Animation(state)) => Ok(state),
            _ => Err(StateError::WrongKind {
                id,
                expected: "animation widget",
            }),
        }
    }

    /// Copy the current frame of `id` into its buffer and report the change
    fn show_current_frame(&mut self, id: WidgetId) -> Result<()> {
        let widget = self.get_mut(id)?;
        if let WidgetKind::Animation(state) = &widget.kind {
            let index = state.playback.index;
            if let Some(frame) = state.current_animation().and_then(|a| a.frame(index)) {
                widget.surface.tiles_mut().copy_from(frame)?;
            }
        }
        self.content_changed(id)
    }

    /// Switch to the animation called `name`, restarting at frame 0
    ///
    /// # Errors
    ///
    /// [`StateError::UnknownAnimation`] if `name` is not registered; the
    /// current playback is untouched.
    pub fn set_animation(&mut self, id: WidgetId, name: &str, cycle: bool) -> Result<()> {
        let state = self.animation_state_mut(id)?;
        if !state.animations.contains_key(name) {
            return Err(StateError::UnknownAnimation(name.to_string()).into());
        }
        state.current = name.to_string();
        state.playback = Playback::new(cycle);
        tracing::debug!(widget = %id, animation = name, cycle, "Animation switched");
        self.show_current_frame(id)
    }

    /// Resume playback; a halted non-cycling animation restarts from frame 0
    ///
    /// # Errors
    ///
    /// [`StateError::WrongKind`] unless `id` is an animation widget.
    pub fn start_animation(&mut self, id: WidgetId) -> Result<()> {
        let state = self.animation_state_mut(id)?;
        let len = state.current_animation().map_or(0, Animation::len);
        let finished = !state.playback.cycle && state.playback.index + 1 >= len;
        if finished {
            state.playback = Playback::new(false);
            return self.show_current_frame(id);
        }
        state.playback.running = true;
        Ok(())
    }

    /// Pause playback on the current frame
    ///
    /// # Errors
    ///
    /// [`StateError::WrongKind`] unless `id` is an animation widget.
    pub fn stop_animation(&mut self, id: WidgetId) -> Result<()> {
        self.animation_state_mut(id)?.playback.running = false;
        Ok(())
    }

    /// Current frame index
    ///
    /// # Errors
    ///
    /// [`StateError::WrongKind`] unless `id` is an animation widget.
    pub fn animation_frame(&self, id: WidgetId) -> Result<usize> {
        Ok(self.animation_state(id)?.playback.index)
    }

    /// Playback state of `id`
    ///
    /// # Errors
    ///
    /// [`StateError::WrongKind`] unless `id` is an animation widget.
    pub fn animation_playback(&self, id: WidgetId) -> Result<Playback> {
        Ok(self.animation_state(id)?.playback)
    }

    /// Turn [`Event::ContentUpdated`] emission on or off
    ///
    /// # Errors
    ///
    /// [`StateError::WrongKind`] unless `id` is an animation widget.
    pub fn set_emit_updates(&mut self, id: WidgetId, emit: bool) -> Result<()> {
        self.animation_state_mut(id)?.emit_updates = emit;
        Ok(())
    }

    pub(crate) fn animation_event(&mut self, id: WidgetId, event: &Event) -> Result<Vec<Event>> {
        let Event::Tick(dt) = event else {
            return Ok(Vec::new());
        };
        let state = self.animation_state_mut(id)?;
        let Some((frame_time, len)) = state
            .current_animation()
            .map(|a| (a.frame_time(), a.len()))
        else {
            return Ok(Vec::new());
        };
        if !state.playback.advance(*dt, frame_time, len) {
            return Ok(Vec::new());
        }
        let emit = state.emit_updates;
        tracing::trace!(widget = %id, frame = state.playback.index, "Animation advanced");

        self.show_current_frame(id)?;
        if emit {
            Ok(vec![Event::ContentUpdated { source: id }])
        } else {
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;
    use crate::error::EngineError;
    use crate::tile::{Color, Pos, Size, Tile, TileGrid};

    fn frames(chars: &str) -> Vec<TileGrid> {
        chars
            .chars()
            .map(|c| TileGrid::filled(Size::new(1, 2), Tile::new(c, Color::WHITE, Color::BLACK)))
            .collect()
    }

    fn scene() -> Scene<HeadlessBackend> {
        Scene::new(HeadlessBackend::new(Size::new(10, 10)))
    }

    fn tick(scene: &mut Scene<HeadlessBackend>, id: WidgetId, ms: u64) -> Vec<Event> {
        scene
            .handle_event(id, &Event::Tick(Duration::from_millis(ms)))
            .unwrap()
    }

    #[test]
    fn test_playback_carries_remainder() {
        let mut playback = Playback::new(true);
        let ft = Duration::from_millis(100);
        assert!(!playback.advance(Duration::from_millis(60), ft, 3));
        assert!(playback.advance(Duration::from_millis(60), ft, 3));
        assert_eq!(playback.index(), 1);
        // 20ms carried over + 80ms reaches the next boundary
        assert!(playback.advance(Duration::from_millis(80), ft, 3));
        assert_eq!(playback.index(), 2);
    }

    #[test]
    fn test_default_animation_uses_configured_fps() {
        let mut config = crate::config::EngineConfig::default();
        config.animation.default_fps = 4.0;
        let mut scene = Scene::with_config(HeadlessBackend::new(Size::new(10, 10)), config);

        let anim = scene.default_animation(frames("ab")).unwrap();
        assert_eq!(anim.frame_time(), Duration::from_millis(250));
        let id = scene.create_animation(anim, true);
        assert!(tick(&mut scene, id, 200).is_empty());
        assert_eq!(tick(&mut scene, id, 50), vec![Event::ContentUpdated { source: id }]);

        let mut config = crate::config::EngineConfig::default();
        config.animation.default_fps = 0.0;
        let scene = Scene::with_config(HeadlessBackend::new(Size::new(10, 10)), config);
        assert!(matches!(
            scene.default_animation(frames("ab")),
            Err(EngineError::Animation(AnimationError::InvalidFrameRate(_)))
        ));
    }

    #[test]
    fn test_cycling_wraps() {
        let mut scene = scene();
        let anim = Animation::new(frames("abc"), 10.0).unwrap();
        let id = scene.create_animation(anim, true);
        let out = tick(&mut scene, id, 350);
        assert_eq!(out, vec![Event::ContentUpdated { source: id }]);
        assert_eq!(scene.animation_frame(id).unwrap(), 0);
        assert_eq!(scene.tiles(id).unwrap().row_text(0), "aa");
    }

    #[test]
    fn test_non_cycling_halts_on_last_frame() {
        let mut scene = scene();
        let anim = Animation::new(frames("abc"), 10.0).unwrap();
        let id = scene.create_animation(anim, false);
        for _ in 0..35 {
            tick(&mut scene, id, 10);
        }
        assert_eq!(scene.animation_frame(id).unwrap(), 2);
        assert!(!scene.animation_playback(id).unwrap().running());
        assert!(tick(&mut scene, id, 1000).is_empty());
        assert_eq!(scene.tiles(id).unwrap().row_text(0), "cc");

        scene.start_animation(id).unwrap();
        assert_eq!(scene.animation_frame(id).unwrap(), 0);
        assert_eq!(scene.tiles(id).unwrap().row_text(0), "aa");
    }

    #[test]
    fn test_multi_animation_switch() {
        let mut scene = scene();
        let walk = Animation::new(frames("wx"), 4.0).unwrap();
        let idle = Animation::new(frames("i"), 1.0).unwrap();
        let id = scene
            .create_multi_animation(
                vec![("walk".to_string(), walk), ("idle".to_string(), idle)],
                "idle",
                true,
            )
            .unwrap();
        assert_eq!(scene.tiles(id).unwrap().row_text(0), "ii");

        tick(&mut scene, id, 250);
        scene.set_animation(id, "walk", false).unwrap();
        assert_eq!(scene.animation_frame(id).unwrap(), 0);
        assert_eq!(scene.tiles(id).unwrap().row_text(0), "ww");

        assert!(matches!(
            scene.set_animation(id, "run", true),
            Err(EngineError::State(StateError::UnknownAnimation(_)))
        ));
        assert_eq!(scene.tiles(id).unwrap().row_text(0), "ww");
    }

    #[test]
    fn test_multi_animation_rejects_mismatched_shapes() {
        let mut scene = scene();
        let small = Animation::new(frames("a"), 1.0).unwrap();
        let big = Animation::new(
            vec![TileGrid::blank(Size::new(2, 2))],
            1.0,
        )
        .unwrap();
        assert!(matches!(
            scene.create_multi_animation(
                vec![("s".to_string(), small), ("b".to_string(), big)],
                "s",
                true
            ),
            Err(EngineError::Animation(AnimationError::ShapeMismatch { .. }))
        ));
    }

    #[test]
    fn test_stop_and_resume() {
        let mut scene = scene();
        let anim = Animation::new(frames("abc"), 10.0).unwrap();
        let id = scene.create_animation(anim, true);
        scene.stop_animation(id).unwrap();
        assert!(tick(&mut scene, id, 500).is_empty());
        scene.start_animation(id).unwrap();
        tick(&mut scene, id, 100);
        assert_eq!(scene.animation_frame(id).unwrap(), 1);
    }

    #[test]
    fn test_top_level_animation_pushes_each_frame() {
        let mut scene = scene();
        let anim = Animation::new(frames("ab"), 10.0).unwrap();
        let id = scene.create_animation(anim, true);
        scene.attach(id, Pos::ORIGIN, 0).unwrap();
        tick(&mut scene, id, 100);
        tick(&mut scene, id, 50);
        tick(&mut scene, id, 50);
        assert_eq!(scene.backend().update_count(id), 2);
    }
}
