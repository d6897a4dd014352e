#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn rect_approx_eq(a: Rect, b: Rect) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.width, b.width) && approx_eq(a.height, b.height)
}

fn identity() -> HostTransform {
    HostTransform::default()
}

// =============================================================
// compute_sample_rect
// =============================================================

#[test]
fn sample_rect_at_unit_scale_and_zoom_three() {
    let rect = compute_sample_rect(Point::new(100.0, 100.0), &identity(), ManualOffset::default(), 300.0, 3.0);
    assert_eq!(rect, Some(Rect::new(50.0, 50.0, 100.0, 100.0)));
}

#[test]
fn sample_rect_at_zoom_one_spans_full_diameter() {
    let rect = compute_sample_rect(Point::new(100.0, 100.0), &identity(), ManualOffset::default(), 300.0, 1.0)
        .unwrap_or_default();
    assert_eq!(rect.width, 300.0);
    assert_eq!(rect.height, 300.0);
}

#[test]
fn sample_rect_with_pan_zoom_and_manual_offset() {
    let host = HostTransform::new(2.0, 10.0, 20.0);
    let rect = compute_sample_rect(Point::new(110.0, 220.0), &host, ManualOffset::new(5, -5), 300.0, 3.0);
    let expected = Rect::new(70.0, 160.0, 100.0, 100.0);
    assert!(rect.is_some_and(|r| rect_approx_eq(r, expected)), "got {rect:?}");
}

#[test]
fn sample_rect_extent_is_independent_of_host_scale() {
    for scale in [0.25, 0.5, 1.0, 2.0, 7.5] {
        let host = HostTransform::new(scale, -40.0, 13.0);
        let rect = compute_sample_rect(Point::new(300.0, 200.0), &host, ManualOffset::new(3, 9), 240.0, 4.0)
            .unwrap_or_default();
        assert!(approx_eq(rect.width, 60.0), "scale {scale}: width {}", rect.width);
        assert!(approx_eq(rect.height, 60.0), "scale {scale}: height {}", rect.height);
    }
}

#[test]
fn sample_rect_center_round_trips_to_cursor_world_plus_offset() {
    let cases = [
        (HostTransform::new(1.0, 0.0, 0.0), Point::new(100.0, 100.0), ManualOffset::new(0, 0)),
        (HostTransform::new(0.5, 120.0, -80.0), Point::new(640.0, 360.0), ManualOffset::new(-12, 4)),
        (HostTransform::new(3.2, -500.0, 250.0), Point::new(12.5, 999.0), ManualOffset::new(100, -100)),
    ];
    for (host, cursor, offset) in cases {
        let rect = compute_sample_rect(cursor, &host, offset, 300.0, 2.5).unwrap_or_default();
        let center_world = host.canvas_to_world(rect.center()).unwrap_or_default();
        let cursor_world = host.canvas_to_world(cursor).unwrap_or_default();
        let expected = Point::new(cursor_world.x + f64::from(offset.x), cursor_world.y + f64::from(offset.y));
        assert!(point_approx_eq(center_world, expected), "{center_world:?} != {expected:?}");
    }
}

#[test]
fn sample_rect_zero_scale_is_rejected() {
    let host = HostTransform::new(0.0, 10.0, 10.0);
    assert!(compute_sample_rect(Point::new(1.0, 1.0), &host, ManualOffset::default(), 300.0, 3.0).is_none());
}

#[test]
fn sample_rect_nan_scale_is_rejected() {
    let host = HostTransform::new(f64::NAN, 0.0, 0.0);
    assert!(compute_sample_rect(Point::new(1.0, 1.0), &host, ManualOffset::default(), 300.0, 3.0).is_none());
}

#[test]
fn sample_rect_zero_zoom_is_rejected() {
    assert!(compute_sample_rect(Point::new(1.0, 1.0), &identity(), ManualOffset::default(), 300.0, 0.0).is_none());
}

// =============================================================
// HostTransform
// =============================================================

#[test]
fn host_transform_default_is_identity() {
    let host = HostTransform::default();
    assert_eq!(host.scale, 1.0);
    assert_eq!(host.offset, Point::new(0.0, 0.0));
}

#[test]
fn canvas_to_world_applies_offset_then_scale() {
    let host = HostTransform::new(2.0, 20.0, 10.0);
    let world = host.canvas_to_world(Point::new(20.0, 10.0));
    assert_eq!(world, Some(Point::new(0.0, 0.0)));
}

#[test]
fn world_to_canvas_round_trip() {
    let host = HostTransform::new(0.75, 13.7, -42.3);
    let world = Point::new(333.3, -999.9);
    let back = host.canvas_to_world(host.world_to_canvas(world)).unwrap_or_default();
    assert!(point_approx_eq(world, back));
}

// =============================================================
// Rect
// =============================================================

#[test]
fn rect_overlap_interior() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(5.0, 5.0, 10.0, 10.0);
    assert!(a.overlaps(&b));
}

#[test]
fn rect_touching_edge_does_not_overlap() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let right = Rect::new(10.0, 0.0, 10.0, 10.0);
    let below = Rect::new(0.0, 10.0, 10.0, 10.0);
    let corner = Rect::new(10.0, 10.0, 10.0, 10.0);
    assert!(!a.overlaps(&right));
    assert!(!a.overlaps(&below));
    assert!(!a.overlaps(&corner));
}

#[test]
fn rect_overlap_is_symmetric() {
    let rects = [
        Rect::new(0.0, 0.0, 10.0, 10.0),
        Rect::new(5.0, 5.0, 10.0, 10.0),
        Rect::new(10.0, 0.0, 5.0, 5.0),
        Rect::new(-20.0, -20.0, 100.0, 100.0),
        Rect::new(2.0, 2.0, 1.0, 1.0),
        Rect::new(50.0, 50.0, 1.0, 1.0),
    ];
    for a in &rects {
        for b in &rects {
            assert_eq!(a.overlaps(b), b.overlaps(a), "{a:?} vs {b:?}");
        }
    }
}

#[test]
fn rect_contained_overlaps() {
    let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
    let inner = Rect::new(40.0, 40.0, 2.0, 2.0);
    assert!(outer.overlaps(&inner));
    assert!(inner.overlaps(&outer));
}

#[test]
fn rect_overlaps_itself() {
    let a = Rect::new(3.0, 4.0, 5.0, 6.0);
    assert!(a.overlaps(&a));
}

#[test]
fn rect_center_and_edges() {
    let r = Rect::new(10.0, 20.0, 30.0, 40.0);
    assert_eq!(r.right(), 40.0);
    assert_eq!(r.bottom(), 60.0);
    assert_eq!(r.center(), Point::new(25.0, 40.0));
}

#[test]
fn size_is_empty() {
    assert!(Size::new(0.0, 10.0).is_empty());
    assert!(Size::new(10.0, -1.0).is_empty());
    assert!(Size::new(f64::NAN, 1.0).is_empty());
    assert!(!Size::new(1.0, 1.0).is_empty());
}

// =============================================================
// Client → canvas
// =============================================================

#[test]
fn client_to_canvas_scales_by_device_pixel_ratio() {
    let client_rect = Rect::new(100.0, 50.0, 800.0, 600.0);
    let backing = Size::new(1600.0, 1200.0);
    let pt = client_to_canvas(Point::new(150.0, 80.0), &client_rect, backing);
    assert_eq!(pt, Some(Point::new(100.0, 60.0)));
}

#[test]
fn client_to_canvas_zero_rect_is_rejected() {
    let client_rect = Rect::new(0.0, 0.0, 0.0, 600.0);
    assert!(client_to_canvas(Point::new(1.0, 1.0), &client_rect, Size::new(10.0, 10.0)).is_none());
}

#[test]
fn client_rect_to_canvas_scales_size() {
    let client_rect = Rect::new(0.0, 0.0, 500.0, 500.0);
    let rect = client_rect_to_canvas(&Rect::new(10.0, 20.0, 30.0, 40.0), &client_rect, Size::new(1000.0, 1000.0));
    assert_eq!(rect, Some(Rect::new(20.0, 40.0, 60.0, 80.0)));
}

// =============================================================
// TexWindow
// =============================================================

#[test]
fn tex_window_normalizes_against_surface() {
    let window = TexWindow::from_sample(&Rect::new(50.0, 100.0, 100.0, 100.0), Size::new(200.0, 400.0));
    assert_eq!(window, Some(TexWindow { offset: [0.25, 0.25], repeat: [0.5, 0.25] }));
}

#[test]
fn tex_window_empty_surface_is_rejected() {
    assert!(TexWindow::from_sample(&Rect::new(0.0, 0.0, 1.0, 1.0), Size::new(0.0, 0.0)).is_none());
}

// =============================================================
// Placement / glass origin
// =============================================================

#[test]
fn placement_parse_round_trip() {
    for p in Placement::ALL {
        assert_eq!(Placement::parse(p.as_str()), Some(p));
    }
    assert_eq!(Placement::parse("up"), None);
}

#[test]
fn glass_follows_cursor_centered_without_placement() {
    let canvas = Rect::new(0.0, 0.0, 1000.0, 800.0);
    let origin = glass_origin(Placement::None, true, Point::new(400.0, 300.0), &canvas, 200.0);
    assert_eq!(origin, Point::new(300.0, 200.0));
}

#[test]
fn glass_follows_cursor_to_the_east() {
    let canvas = Rect::new(0.0, 0.0, 1000.0, 800.0);
    let origin = glass_origin(Placement::East, true, Point::new(400.0, 300.0), &canvas, 200.0);
    // centre at 400 + 100 + gap, y unchanged
    assert_eq!(origin, Point::new(400.0 + GLASS_GAP_PX, 200.0));
}

#[test]
fn glass_pinned_to_north_west_corner() {
    let canvas = Rect::new(0.0, 0.0, 1000.0, 800.0);
    let origin = glass_origin(Placement::NorthWest, false, Point::new(400.0, 300.0), &canvas, 200.0);
    assert_eq!(origin, Point::new(GLASS_GAP_PX, GLASS_GAP_PX));
}

#[test]
fn glass_pinned_centered_in_canvas() {
    let canvas = Rect::new(100.0, 100.0, 1000.0, 800.0);
    let origin = glass_origin(Placement::None, false, Point::new(0.0, 0.0), &canvas, 200.0);
    assert_eq!(origin, Point::new(500.0, 400.0));
}
