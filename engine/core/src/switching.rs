//! Switching Widget
//!
//! Holds a fixed set of named, same-shaped images and shows one of them.
//! Useful for state indicators that flip between a handful of looks.

use std::collections::HashMap;

use crate::backend::DisplayBackend;
use crate::error::{LayoutError, Result, StateError};
use crate::scene::{Scene, WidgetId, WidgetKind};
use crate::tile::TileGrid;

/// Images and the name of the visible one
#[derive(Debug, Clone)]
pub struct SwitchingState {
    images: HashMap<String, TileGrid>,
    current: String,
}

impl SwitchingState {
    /// Name of the image on display
    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }
}

impl<B: DisplayBackend> Scene<B> {
    /// Create a switching widget showing `initial`
    ///
    /// # Errors
    ///
    /// [`LayoutError::ShapeMismatch`] if the images differ in size;
    /// [`StateError::UnknownImage`] if `initial` is not among them.
    pub fn create_switching(
        &mut self,
        images: Vec<(String, TileGrid)>,
        initial: &str,
    ) -> Result<WidgetId> {
        if let Some((_, first)) = images.first() {
            let expected = first.size();
            if let Some((_, odd)) = images.iter().find(|(_, grid)| grid.size() != expected) {
                return Err(LayoutError::ShapeMismatch {
                    expected,
                    found: odd.size(),
                }
                .into());
            }
        }
        let images: HashMap<String, TileGrid> = images.into_iter().collect();
        let Some(start) = images.get(initial).cloned() else {
            return Err(StateError::UnknownImage(initial.to_string()).into());
        };
        Ok(self.spawn(
            start,
            WidgetKind::Switching(SwitchingState {
                images,
                current: initial.to_string(),
            }),
        ))
    }

    /// Show the image called `name`
    ///
    /// # Errors
    ///
    /// [`StateError::UnknownImage`] if `name` is not registered;
    /// [`StateError::WrongKind`] unless `id` is a switching widget.
    pub fn switch_to_image(&mut self, id: WidgetId, name: &str) -> Result<()> {
        let widget = self.get_mut(id)?;
        let WidgetKind::Switching(state) = &mut widget.kind else {
            return Err(StateError::WrongKind {
                id,
                expected: "switching widget",
            }
            .into());
        };
        let Some(image) = state.images.get(name) else {
            return Err(StateError::UnknownImage(name.to_string()).into());
        };
        widget.surface.tiles_mut().copy_from(image)?;
        state.current = name.to_string();
        self.content_changed(id)
    }
}
