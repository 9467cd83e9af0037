//! Property Tests for Layout Compositing
//!
//! # Test Coverage
//!
//! 1. **Bounds**: a child is accepted exactly when its rectangle fits
//! 2. **Paint Order**: later children win wherever children overlap
//! 3. **Idempotence**: recompositing an unchanged layout changes nothing
//! 4. **Viewport Clamp**: a view can only move where it stays inside the backing

use proptest::prelude::*;
use tessera_core::{
    Color, EngineError, HeadlessBackend, LayoutError, Pos, Scene, Size, StateError, Tile,
    TileGrid, WidgetId,
};

// ============================================================================
// Helpers
// ============================================================================

fn scene() -> Scene<HeadlessBackend> {
    Scene::new(HeadlessBackend::new(Size::new(40, 40)))
}

fn filled(size: Size, ch: char) -> TileGrid {
    TileGrid::filled(size, Tile::new(ch, Color::WHITE, Color::BLACK))
}

fn rect() -> impl Strategy<Value = (Pos, Size)> {
    (0usize..8, 0usize..8, 1usize..6, 1usize..6)
        .prop_map(|(row, col, h, w)| (Pos::new(row, col), Size::new(h, w)))
}

fn covers(pos: Pos, size: Size, cell: Pos) -> bool {
    cell.row >= pos.row
        && cell.row < pos.row + size.height
        && cell.col >= pos.col
        && cell.col < pos.col + size.width
}

// ============================================================================
// Bounds Invariant
// ============================================================================

proptest! {
    #[test]
    fn test_add_child_accepts_exactly_fitting_rects(
        layout_h in 1usize..12,
        layout_w in 1usize..12,
        child_h in 1usize..14,
        child_w in 1usize..14,
        row in 0usize..16,
        col in 0usize..16,
    ) {
        let mut scene = scene();
        let layout = scene.create_layout(filled(Size::new(layout_h, layout_w), '.'));
        let child = scene.create_widget(filled(Size::new(child_h, child_w), '#'));

        let fits = row + child_h <= layout_h && col + child_w <= layout_w;
        let result = scene.add_child(layout, child, Pos::new(row, col));

        prop_assert_eq!(result.is_ok(), fits);
        if fits {
            prop_assert_eq!(scene.child_pos(layout, child).unwrap(), Pos::new(row, col));
        } else {
            let structural = matches!(
                result,
                Err(EngineError::Layout(
                    LayoutError::ChildTooLarge { .. } | LayoutError::OutOfBounds { .. }
                ))
            );
            prop_assert!(structural);
            // nothing changed
            prop_assert_eq!(scene.children(layout).unwrap().len(), 1);
            prop_assert!(scene.surface(child).unwrap().parent().is_none());
        }
    }

    #[test]
    fn test_move_child_keeps_bounds(
        (start, size) in rect(),
        row in 0usize..16,
        col in 0usize..16,
    ) {
        let mut scene = scene();
        let layout = scene.create_layout(filled(Size::new(12, 12), '.'));
        let child = scene.create_widget(filled(size, '#'));
        scene.add_child(layout, child, start).unwrap();

        let target = Pos::new(row, col);
        let fits = row + size.height <= 12 && col + size.width <= 12;
        prop_assert_eq!(scene.move_child(layout, child, target).is_ok(), fits);
        let expected = if fits { target } else { start };
        prop_assert_eq!(scene.child_pos(layout, child).unwrap(), expected);
    }
}

// ============================================================================
// Paint Order
// ============================================================================

proptest! {
    #[test]
    fn test_later_children_paint_over_earlier(rects in prop::collection::vec(rect(), 1..5)) {
        let mut scene = scene();
        let layout = scene.create_layout(filled(Size::new(13, 13), '.'));
        let glyphs = ['a', 'b', 'c', 'd', 'e'];
        for ((pos, size), ch) in rects.iter().zip(glyphs) {
            let child = scene.create_widget(filled(*size, ch));
            scene.add_child(layout, child, *pos).unwrap();
        }
        scene.recomposite(layout).unwrap();
        let tiles = scene.tiles(layout).unwrap();

        for row in 0..13 {
            for col in 0..13 {
                let cell = Pos::new(row, col);
                let expected = rects
                    .iter()
                    .zip(glyphs)
                    .filter(|((pos, size), _)| covers(*pos, *size, cell))
                    .map(|(_, ch)| ch)
                    .last()
                    .unwrap_or('.');
                prop_assert_eq!(tiles.get(cell).unwrap().ch, expected);
            }
        }
    }

    #[test]
    fn test_hit_test_matches_paint_order(rects in prop::collection::vec(rect(), 1..5)) {
        let mut scene = scene();
        let layout = scene.create_layout(filled(Size::new(13, 13), '.'));
        let mut children: Vec<WidgetId> = Vec::new();
        for (pos, size) in &rects {
            let child = scene.create_widget(filled(*size, '#'));
            scene.add_child(layout, child, *pos).unwrap();
            children.push(child);
        }
        for row in 0..13 {
            for col in 0..13 {
                let cell = Pos::new(row, col);
                let expected = rects
                    .iter()
                    .zip(&children)
                    .filter(|((pos, size), _)| covers(*pos, *size, cell))
                    .map(|(_, id)| *id)
                    .last();
                prop_assert_eq!(scene.get_child_on_pos(layout, cell, false).unwrap(), expected);
            }
        }
    }
}

// ============================================================================
// Recomposite Idempotence
// ============================================================================

proptest! {
    #[test]
    fn test_recomposite_is_idempotent(rects in prop::collection::vec(rect(), 0..5)) {
        let mut scene = scene();
        let layout = scene.create_layout(filled(Size::new(13, 13), '.'));
        for (pos, size) in &rects {
            let child = scene.create_widget(filled(*size, '*'));
            scene.add_child(layout, child, *pos).unwrap();
        }
        prop_assert!(scene.recomposite(layout).unwrap());
        let first = scene.tiles(layout).unwrap().clone();

        // clean layouts skip the rebuild
        prop_assert!(!scene.recomposite(layout).unwrap());

        scene.mark_needs_redraw(layout).unwrap();
        prop_assert!(scene.recomposite(layout).unwrap());
        prop_assert_eq!(scene.tiles(layout).unwrap(), &first);
    }
}

// ============================================================================
// Viewport Clamp
// ============================================================================

proptest! {
    #[test]
    fn test_scroll_to_stays_inside_backing(
        backing_h in 1usize..20,
        backing_w in 1usize..20,
        view_h in 1usize..20,
        view_w in 1usize..20,
        row in 0usize..24,
        col in 0usize..24,
    ) {
        prop_assume!(view_h <= backing_h && view_w <= backing_w);
        let mut scene = scene();
        let viewport = scene
            .create_viewport(
                filled(Size::new(backing_h, backing_w), '.'),
                Pos::ORIGIN,
                Size::new(view_h, view_w),
            )
            .unwrap();

        let fits = row + view_h <= backing_h && col + view_w <= backing_w;
        let result = scene.scroll_to(viewport, Pos::new(row, col));
        prop_assert_eq!(result.is_ok(), fits);
        if fits {
            prop_assert_eq!(scene.view_pos(viewport).unwrap(), Pos::new(row, col));
        } else {
            let rejected = matches!(
                result,
                Err(EngineError::State(StateError::ScrollOutOfBounds { .. }))
            );
            prop_assert!(rejected);
            prop_assert_eq!(scene.view_pos(viewport).unwrap(), Pos::ORIGIN);
        }
        prop_assert_eq!(scene.size(viewport).unwrap(), Size::new(view_h, view_w));
    }
}
