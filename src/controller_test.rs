#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::compositor::WidgetKind;
use crate::config::{ACTIVATION_REQUIRES_ALT, DEBUG_OVERLAY, FILTER, GLASS_DIAMETER, OFFSET_STEP, RESET_KEY, ZOOM_FACTOR};
use crate::geometry::{HostTransform, Size};

// =============================================================
// Helpers
// =============================================================

fn canvas() -> CanvasSnapshot {
    CanvasSnapshot {
        transform: HostTransform::default(),
        backing: Size::new(800.0, 600.0),
        client_rect: Rect::new(0.0, 0.0, 800.0, 600.0),
    }
}

fn key(name: &str) -> Key {
    Key::new(name)
}

fn none() -> Modifiers {
    Modifiers::default()
}

fn alt() -> Modifiers {
    Modifiers { alt: true, ..Modifiers::default() }
}

fn shift() -> Modifiers {
    Modifiers { shift: true, ..Modifiers::default() }
}

/// Core with a known canvas and pointer, still Inactive.
fn core() -> MagnifierCore {
    let mut core = MagnifierCore::new(Config::default());
    core.sync_host(canvas());
    core.on_pointer_move(Point::new(400.0, 300.0));
    core
}

fn active() -> MagnifierCore {
    let mut core = core();
    core.on_key_down(&key("z"), none());
    core
}

fn no_candidates(_: &CanvasSnapshot) -> Vec<Candidate<u32>> {
    Vec::new()
}

fn frame(core: &mut MagnifierCore) -> Option<FramePlan<u32>> {
    core.on_frame(canvas(), no_candidates)
}

// =============================================================
// Activation
// =============================================================

#[test]
fn starts_inactive() {
    let core = MagnifierCore::default();
    assert_eq!(core.state(), GlassState::Inactive);
    assert!(!core.render_pending());
}

#[test]
fn activation_key_shows_glass_and_requests_frame() {
    let mut core = core();
    let actions = core.on_key_down(&key("z"), none());
    assert_eq!(actions, vec![Action::ShowGlass, Action::RequestFrame]);
    assert!(core.is_active());
}

#[test]
fn activation_key_is_case_insensitive() {
    let mut core = core();
    core.on_key_down(&key("Z"), shift());
    assert!(core.is_active());
}

#[test]
fn activation_requiring_alt_ignores_bare_key() {
    let mut core = core();
    core.apply_setting(ACTIVATION_REQUIRES_ALT, &json!(true));
    let actions = core.on_key_down(&key("z"), none());
    assert!(actions.is_empty());
    assert_eq!(core.state(), GlassState::Inactive);

    core.on_key_down(&key("z"), alt());
    assert!(core.is_active());
}

#[test]
fn activation_snaps_sample_to_last_pointer() {
    let mut core = core();
    core.on_pointer_move(Point::new(100.0, 100.0));
    assert_eq!(core.sample(), None);

    core.on_key_down(&key("z"), none());
    assert_eq!(core.sample(), Some(Rect::new(50.0, 50.0, 100.0, 100.0)));
}

#[test]
fn auto_repeat_while_active_is_ignored() {
    let mut core = active();
    assert!(frame(&mut core).is_some());
    assert!(core.on_key_down(&key("z"), none()).is_empty());
    assert!(!core.render_pending());
}

#[test]
fn releasing_activation_key_hides_glass() {
    let mut core = active();
    assert_eq!(core.on_key_up(&key("z")), vec![Action::HideGlass]);
    assert_eq!(core.state(), GlassState::Inactive);
}

#[test]
fn first_qualifying_release_wins() {
    let mut core = core();
    core.apply_setting(ACTIVATION_REQUIRES_ALT, &json!(true));
    core.on_key_down(&key("z"), alt());
    assert!(core.is_active());

    assert_eq!(core.on_key_up(&key("Alt")), vec![Action::HideGlass]);
    assert!(core.on_key_up(&key("z")).is_empty());
}

#[test]
fn releasing_alt_without_alt_binding_keeps_glass() {
    let mut core = active();
    assert!(core.on_key_up(&key("Alt")).is_empty());
    assert!(core.is_active());
}

#[test]
fn blur_deactivates_only_when_active() {
    let mut core = active();
    assert_eq!(core.on_blur(), vec![Action::HideGlass]);
    assert!(core.on_blur().is_empty());
}

// =============================================================
// Frames
// =============================================================

#[test]
fn pointer_moves_between_frames_render_once() {
    let mut core = active();
    assert!(frame(&mut core).is_some());

    let first = core.on_pointer_move(Point::new(410.0, 300.0));
    let second = core.on_pointer_move(Point::new(420.0, 300.0));
    assert_eq!(first, vec![Action::RequestFrame]);
    assert!(second.is_empty());

    let plan = frame(&mut core);
    assert_eq!(plan.map(|p| p.sample), Some(Rect::new(370.0, 250.0, 100.0, 100.0)));
    assert!(frame(&mut core).is_none());
}

#[test]
fn pointer_moves_while_inactive_request_nothing() {
    let mut core = core();
    assert!(core.on_pointer_move(Point::new(10.0, 10.0)).is_empty());
    assert!(frame(&mut core).is_none());
}

#[test]
fn frame_after_deactivation_yields_nothing() {
    let mut core = active();
    core.on_key_up(&key("z"));
    assert!(!core.render_pending());
    assert!(frame(&mut core).is_none());
}

#[test]
fn frame_plan_places_glass_and_overlapping_clones() {
    let mut core = active();
    let plan = core.on_frame(canvas(), |_| {
        vec![
            Candidate { element: 1_u32, kind: WidgetKind::Text, bounds: Rect::new(360.0, 260.0, 50.0, 20.0) },
            Candidate { element: 2_u32, kind: WidgetKind::Image, bounds: Rect::new(0.0, 0.0, 50.0, 50.0) },
        ]
    });
    let Some(plan) = plan else {
        panic!("expected a frame plan");
    };
    assert_eq!(plan.glass_origin, Point::new(250.0, 150.0));
    assert_eq!(plan.diameter, 300.0);
    assert_eq!(plan.clones.len(), 1);
    assert_eq!(plan.clones[0].element, 1);
    assert_eq!((plan.clones[0].left, plan.clones[0].top), (30.0, 30.0));
    assert!(plan.debug.is_none());
}

#[test]
fn candidates_are_not_queried_without_a_plan() {
    let mut core = core();
    let plan: Option<FramePlan<u32>> = core.on_frame(canvas(), |_| panic!("queried while inactive"));
    assert!(plan.is_none());
}

#[test]
fn frame_uses_fresh_host_transform() {
    let mut core = active();
    let zoomed = CanvasSnapshot { transform: HostTransform::new(2.0, 0.0, 0.0), ..canvas() };
    let plan: Option<FramePlan<u32>> = core.on_frame(zoomed, no_candidates);
    assert_eq!(plan.map(|p| p.sample), Some(Rect::new(350.0, 250.0, 100.0, 100.0)));
    assert_eq!(core.sample().map(|s| s.size()), Some(Size::new(100.0, 100.0)));
}

#[test]
fn degenerate_transform_keeps_previous_sample() {
    let mut core = active();
    let before = core.sample();
    core.sync_host(CanvasSnapshot { transform: HostTransform::new(0.0, 0.0, 0.0), ..canvas() });
    assert_eq!(core.sample(), before);
}

#[test]
fn debug_lines_present_when_enabled() {
    let mut core = active();
    core.apply_setting(DEBUG_OVERLAY, &json!(true));
    let plan = frame(&mut core);
    let lines = plan.and_then(|p| p.debug).unwrap_or_default();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("cursor 400.0, 300.0"));
    assert!(lines[4].ends_with("clones 0"));
}

// =============================================================
// Offsets
// =============================================================

#[test]
fn arrow_up_nudges_sample_by_step() {
    let mut core = active();
    let actions = core.on_key_down(&key("ArrowUp"), none());
    assert_eq!(core.manual_offset(), ManualOffset::new(0, -5));
    assert!(actions.contains(&Action::PersistOffsets(ManualOffset::new(0, -5))));
    assert_eq!(core.sample(), Some(Rect::new(350.0, 245.0, 100.0, 100.0)));
}

#[test]
fn shift_multiplies_the_step() {
    let mut core = active();
    core.on_key_down(&key("ArrowUp"), shift());
    assert_eq!(core.manual_offset(), ManualOffset::new(0, -25));
    core.on_key_down(&key("ArrowRight"), none());
    assert_eq!(core.manual_offset(), ManualOffset::new(5, -25));
}

#[test]
fn step_follows_configuration() {
    let mut core = active();
    core.apply_setting(OFFSET_STEP, &json!(12));
    core.on_key_down(&key("ArrowLeft"), none());
    assert_eq!(core.manual_offset(), ManualOffset::new(-12, 0));
}

#[test]
fn arrows_do_nothing_while_inactive() {
    let mut core = core();
    assert!(core.on_key_down(&key("ArrowDown"), none()).is_empty());
    assert_eq!(core.manual_offset(), ManualOffset::default());
}

#[test]
fn reset_zeroes_and_persists_even_when_already_zero() {
    let mut core = active();
    core.on_key_down(&key("ArrowDown"), none());
    let first = core.on_key_down(&key("r"), alt());
    assert!(first.contains(&Action::PersistOffsets(ManualOffset::default())));
    assert_eq!(core.manual_offset(), ManualOffset::default());

    let second = core.on_key_down(&key("r"), alt());
    assert_eq!(second, vec![Action::PersistOffsets(ManualOffset::default())]);
}

#[test]
fn reset_while_inactive_persists_without_frame() {
    let mut core = MagnifierCore::new(Config { manual_offset: ManualOffset::new(7, 7), ..Config::default() });
    core.apply_setting(RESET_KEY, &json!("x"));
    core.apply_setting(crate::config::RESET_REQUIRES_ALT, &json!(false));
    let actions = core.on_key_down(&key("x"), none());
    assert_eq!(actions, vec![Action::PersistOffsets(ManualOffset::default())]);
}

#[test]
fn loaded_offset_applies_to_first_sample() {
    let mut core = MagnifierCore::new(Config { manual_offset: ManualOffset::new(10, 0), ..Config::default() });
    core.sync_host(canvas());
    core.on_pointer_move(Point::new(400.0, 300.0));
    core.on_key_down(&key("z"), none());
    assert_eq!(core.sample(), Some(Rect::new(360.0, 250.0, 100.0, 100.0)));
}

// =============================================================
// Settings
// =============================================================

#[test]
fn zoom_change_resamples_and_restyles() {
    let mut core = active();
    assert!(frame(&mut core).is_some());
    let actions = core.apply_setting(ZOOM_FACTOR, &json!(6.0));
    assert_eq!(actions, vec![Action::Restyle, Action::RequestFrame]);
    assert_eq!(core.sample(), Some(Rect::new(375.0, 275.0, 50.0, 50.0)));
}

#[test]
fn diameter_change_while_inactive_requests_no_frame() {
    let mut core = core();
    assert_eq!(core.apply_setting(GLASS_DIAMETER, &json!(600.0)), vec![Action::Restyle]);
}

#[test]
fn filter_change_is_forwarded() {
    let mut core = active();
    assert!(frame(&mut core).is_some());
    let actions = core.apply_setting(FILTER, &json!("nearest"));
    assert_eq!(actions, vec![Action::SetFilter(FilterMode::Nearest), Action::RequestFrame]);
}

#[test]
fn unchanged_and_invalid_settings_do_nothing() {
    let mut core = active();
    assert!(frame(&mut core).is_some());
    assert!(core.apply_setting(FILTER, &json!("linear")).is_empty());
    assert!(core.apply_setting(FILTER, &json!("bicubic")).is_empty());
    assert!(core.apply_setting("MagnifyGlass.Unknown", &json!(1)).is_empty());
    assert!(!core.render_pending());
}

#[test]
fn skipped_frame_allows_a_new_request() {
    let mut core = active();
    core.skip_frame();
    assert!(!core.render_pending());
    assert_eq!(core.on_pointer_move(Point::new(401.0, 300.0)), vec![Action::RequestFrame]);
}

#[test]
fn failed_frame_is_retried_once_while_active() {
    let mut core = active();
    assert!(frame(&mut core).is_some());
    assert!(!core.render_pending());

    assert_eq!(core.retry_frame(), vec![Action::RequestFrame]);
    assert!(core.render_pending());
    assert!(frame(&mut core).is_some());
}

#[test]
fn unreadable_host_before_taking_the_flag_retries_once() {
    let mut core = active();
    assert!(core.render_pending());
    assert_eq!(core.retry_frame(), vec![Action::RequestFrame]);
    assert!(core.render_pending());
}

#[test]
fn failed_frame_is_not_retried_while_inactive() {
    let mut core = active();
    assert!(frame(&mut core).is_some());
    core.on_key_up(&key("z"));
    assert!(core.retry_frame().is_empty());
    assert!(!core.render_pending());
}
