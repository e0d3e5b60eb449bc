//! Framebuffer properties: addressing, bounds policy, fills, inversion and
//! packing hold for arbitrary sizes, coordinates and colors.

use display_sim::{
    BitmapMode, BoundsPolicy, Color, DisplayConfig, DisplayError, DisplaySurface, PixelStore, present,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn arb_color() -> impl Strategy<Value = Color> {
    any::<[u8; 4]>().prop_map(|[r, g, b, a]| Color::rgba(r, g, b, a))
}

/// A size plus one coordinate inside it.
fn arb_size_and_point(max_dim: usize) -> impl Strategy<Value = (usize, usize, usize, usize)> {
    (1..=max_dim, 1..=max_dim).prop_flat_map(|(w, h)| (Just(w), Just(h), 0..w, 0..h))
}

fn cleared_surface(width: usize, height: usize, bounds: BoundsPolicy) -> DisplaySurface {
    let (presenter, _host) = present::spawn_headless(width, height);
    let config = DisplayConfig::new(width, height).with_bounds(bounds);
    let mut surface = DisplaySurface::with_rng(config, presenter, &mut StdRng::seed_from_u64(3))
        .expect("surface fits its target");
    surface.clear(false).unwrap();
    surface
}

fn snapshot(store: &PixelStore) -> Vec<Color> {
    let mut out = Vec::with_capacity(store.width() * store.height());
    for y in 0..store.height() {
        for x in 0..store.width() {
            out.push(store.get(x, y));
        }
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn set_then_get_returns_color((w, h, x, y) in arb_size_and_point(32), c in arb_color()) {
        let mut store = PixelStore::new(w, h);
        store.set(x, y, c);
        prop_assert_eq!(store.get(x, y), c);
    }

    #[test]
    fn ignored_out_of_range_writes_change_nothing(
        x in -64i32..64,
        y in -64i32..64,
        c in arb_color(),
    ) {
        prop_assume!(!(0..8).contains(&x) || !(0..8).contains(&y));
        let mut s = cleared_surface(8, 8, BoundsPolicy::Ignore);
        let before = snapshot(s.pixel_buffer());
        prop_assert!(s.draw_pixel(x, y, c).is_ok());
        prop_assert_eq!(snapshot(s.pixel_buffer()), before);
    }

    #[test]
    fn strict_out_of_range_writes_fail(x in 8i32..1000, y in -1000i32..1000) {
        let mut s = cleared_surface(8, 8, BoundsPolicy::Strict);
        let err = s.draw_pixel(x, y, Color::RED).unwrap_err();
        let is_out_of_bounds = matches!(err, DisplayError::OutOfBounds { .. });
        prop_assert!(is_out_of_bounds);
    }

    #[test]
    fn clear_is_opaque_black(w in 1usize..24, h in 1usize..24, c in arb_color()) {
        let mut store = PixelStore::new(w, h);
        store.fill_all(c);
        store.clear();
        prop_assert!(snapshot(&store).iter().all(|p| *p == Color::BLACK));
    }

    #[test]
    fn full_fill_covers_everything(w in 1usize..24, h in 1usize..24, c in arb_color()) {
        let mut store = PixelStore::new(w, h);
        store.fill(0, 0, w, h, c);
        prop_assert!(snapshot(&store).iter().all(|p| *p == c));
    }

    #[test]
    fn double_inversion_is_identity(x in 0i32..8, y in 0i32..8, c in arb_color()) {
        let mut s = cleared_surface(8, 8, BoundsPolicy::Strict);
        s.draw_pixel(x, y, c).unwrap();
        s.invert_pixel(x, y).unwrap();
        s.invert_pixel(x, y).unwrap();
        prop_assert_eq!(s.get_pixel(x, y), Some(c));
    }

    #[test]
    fn packed_length_is_four_bytes_per_pixel(w in 1usize..40, h in 1usize..40) {
        let mut store = PixelStore::new(w, h);
        prop_assert_eq!(store.to_packed_bytes().len(), w * h * 4);
        let frame = store.pack_frame();
        prop_assert_eq!(frame.bytes.len(), w * h * 4);
        // mirror lost with the frame: rebuilt at nominal size
        prop_assert_eq!(store.to_packed_bytes().len(), w * h * 4);
    }

    #[test]
    fn bad_bitmap_size_is_rejected_without_change(
        width_bytes in 1usize..4,
        rows in 1usize..4,
        len in 0usize..20,
    ) {
        prop_assume!(len != width_bytes * rows);
        let mut s = cleared_surface(16, 16, BoundsPolicy::Ignore);
        let before = snapshot(s.pixel_buffer());
        let bits = vec![0xFF; len];
        let err = s.draw_bitmap(0, 0, width_bytes, rows, &bits, BitmapMode::Pen).unwrap_err();
        let is_size_mismatch = matches!(err, DisplayError::SizeMismatch { .. });
        prop_assert!(is_size_mismatch);
        prop_assert_eq!(snapshot(s.pixel_buffer()), before);
    }
}
