//! Integration tests for pointer mapping, drag sessions, presets and zoom.

use proptest::prelude::*;
use watermark_oxide::config::{WatermarkConfig, WatermarkPatch};
use watermark_oxide::position::{
    pointer_to_position, DragSession, DragState, PositionPreset, PreviewZoom, SurfaceBounds,
};
use watermark_oxide::store::WatermarkStore;

proptest! {
    #[test]
    fn prop_pointer_always_clamped(
        px in -1.0e6f32..1.0e6,
        py in -1.0e6f32..1.0e6,
        left in -2000.0f32..2000.0,
        top in -2000.0f32..2000.0,
        width in 0.5f32..5000.0,
        height in 0.5f32..5000.0,
    ) {
        let bounds = SurfaceBounds::new(left, top, width, height);
        let p = pointer_to_position((px, py), &bounds).unwrap();
        prop_assert!((0.0..=100.0).contains(&p.x));
        prop_assert!((0.0..=100.0).contains(&p.y));
    }

    #[test]
    fn prop_patch_keeps_config_in_range(
        x in proptest::num::f32::ANY,
        y in proptest::num::f32::ANY,
        opacity in proptest::num::f32::ANY,
        rotation in any::<i32>(),
    ) {
        let mut config = WatermarkConfig::default();
        config.apply(&WatermarkPatch {
            x: Some(x),
            y: Some(y),
            opacity: Some(opacity),
            rotation: Some(rotation),
            ..Default::default()
        });
        prop_assert!((0.0..=100.0).contains(&config.x));
        prop_assert!((0.0..=100.0).contains(&config.y));
        prop_assert!((0.0..=1.0).contains(&config.opacity));
        prop_assert!((-180..=180).contains(&config.rotation));
    }

    #[test]
    fn prop_valid_positions_round_trip(x in 0.0f32..=100.0, y in 0.0f32..=100.0) {
        let mut store = WatermarkStore::new();
        store.set(&WatermarkPatch::position(x, y));
        prop_assert_eq!(store.get().x, x);
        prop_assert_eq!(store.get().y, y);
    }

    #[test]
    fn prop_zoom_keeps_center_fixed(factor in 0.5f32..=3.0) {
        let layout = SurfaceBounds::new(40.0, 20.0, 640.0, 480.0);
        let shown = PreviewZoom::with_factor(factor).display_bounds(&layout);
        let p = pointer_to_position((360.0, 260.0), &shown).unwrap();
        prop_assert!((p.x - 50.0).abs() < 1e-3);
        prop_assert!((p.y - 50.0).abs() < 1e-3);
    }
}

mod mapping_tests {
    use super::*;

    #[test]
    fn test_round_trip_73_12() {
        let mut store = WatermarkStore::new();
        store.set(&WatermarkPatch::position(73.0, 12.0));
        assert_eq!((store.get().x, store.get().y), (73.0, 12.0));
    }

    #[test]
    fn test_overshoot_clamps_to_edges() {
        let bounds = SurfaceBounds::new(0.0, 0.0, 800.0, 600.0);
        let p = pointer_to_position((900.0, -5.0), &bounds).unwrap();
        assert_eq!((p.x, p.y), (100.0, 0.0));
    }

    #[test]
    fn test_zoomed_preview_maps_like_native() {
        // A surface drawn at half size then zoomed 2x covers its layout box
        let layout = SurfaceBounds::new(0.0, 0.0, 400.0, 300.0);
        let half = PreviewZoom::with_factor(0.5).display_bounds(&layout);
        assert_eq!(half, SurfaceBounds::new(100.0, 75.0, 200.0, 150.0));

        let p = pointer_to_position((150.0, 150.0), &half).unwrap();
        assert_eq!((p.x, p.y), (25.0, 50.0));
    }
}

mod drag_tests {
    use super::*;

    fn bounds() -> SurfaceBounds {
        SurfaceBounds::new(10.0, 10.0, 400.0, 200.0)
    }

    #[test]
    fn test_press_moves_and_release_ignores() {
        let mut store = WatermarkStore::new();
        let mut drag = DragSession::new();

        drag.press((110.0, 60.0), &bounds(), &mut store);
        assert_eq!((store.get().x, store.get().y), (25.0, 25.0));

        for (px, py, ex, ey) in [(210.0, 110.0, 50.0, 50.0), (310.0, 160.0, 75.0, 75.0)] {
            drag.move_to((px, py), &bounds(), &mut store);
            assert_eq!((store.get().x, store.get().y), (ex, ey));
        }

        drag.release();
        assert_eq!(drag.state(), DragState::Idle);
        drag.move_to((10.0, 10.0), &bounds(), &mut store);
        assert_eq!((store.get().x, store.get().y), (75.0, 75.0));
    }

    #[test]
    fn test_click_repositions() {
        let mut config = WatermarkConfig::default();
        let mut drag = DragSession::new();
        drag.press((410.0, 210.0), &bounds(), &mut config);
        drag.release();
        assert_eq!((config.x, config.y), (100.0, 100.0));
    }

    #[test]
    fn test_leave_ends_session_and_overshoot_clamps() {
        let mut config = WatermarkConfig::default();
        let mut drag = DragSession::new();
        drag.press((10.0, 10.0), &bounds(), &mut config);
        drag.move_to((-500.0, 900.0), &bounds(), &mut config);
        assert_eq!((config.x, config.y), (0.0, 100.0));

        drag.leave();
        assert!(!drag.is_dragging());
        drag.move_to((210.0, 110.0), &bounds(), &mut config);
        assert_eq!((config.x, config.y), (0.0, 100.0));
    }

    #[test]
    fn test_each_move_notifies_store_listeners() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut store = WatermarkStore::new();
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        store.subscribe(move |_| counter.set(counter.get() + 1));

        let mut drag = DragSession::new();
        drag.press((110.0, 60.0), &bounds(), &mut store);
        drag.move_to((210.0, 60.0), &bounds(), &mut store);
        drag.move_to((210.0, 60.0), &bounds(), &mut store); // no change
        drag.move_to((310.0, 60.0), &bounds(), &mut store);
        assert_eq!(count.get(), 3);
    }
}

mod preset_tests {
    use super::*;

    #[test]
    fn test_every_preset_is_active_after_apply() {
        for preset in PositionPreset::ALL {
            let mut config = WatermarkConfig::default();
            preset.apply(&mut config);
            assert!(preset.is_active(&config));
            assert_eq!(PositionPreset::active_for(&config), Some(preset));
        }
    }

    #[test]
    fn test_preset_via_store() {
        let mut store = WatermarkStore::new();
        PositionPreset::TopRight.apply(&mut store);
        assert_eq!((store.get().x, store.get().y), (90.0, 10.0));
    }
}
