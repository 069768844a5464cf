#![forbid(unsafe_code)]

//! Touch routing through the overlay and the gesture shield.
//!
//! Run:
//!   cargo test -p coachmark-harness --test touch_routing

use std::cell::Cell;
use std::rc::Rc;

use coachmark::{DismissReason, GestureClaim, GuideController, GuideStep, HitTarget};
use coachmark_core::geometry::{Point, Rect};
use coachmark_harness::{FakeCompanion, FakeHost, FakeNode};

const CARD: Rect = Rect::new(20.0, 100.0, 160.0, 80.0);

struct Screen {
    host: Rc<FakeHost>,
    card: Rc<FakeNode>,
    card_button: Rc<FakeNode>,
    elsewhere: Rc<FakeNode>,
    companion: Rc<FakeCompanion>,
}

fn screen() -> Screen {
    let host = FakeHost::window(400.0, 800.0);
    let card = host.add_element("card", CARD);
    let card_button = host
        .tree()
        .child(card.id(), "card-button", Rect::new(100.0, 20.0, 40.0, 40.0));
    host.tree().set_interactive(card_button.id(), true);
    let elsewhere = host.add_element("elsewhere", Rect::new(20.0, 600.0, 100.0, 40.0));
    let companion = FakeCompanion::new(&host, 200.0, 60.0);
    Screen {
        host,
        card,
        card_button,
        elsewhere,
        companion,
    }
}

fn guide(s: &Screen, forwards: bool, dismisses: bool) -> GuideController {
    GuideController::new(
        &s.host.handle(),
        [GuideStep::new()
            .target(&s.card.element())
            .companion(s.companion.view())
            .forwards_touches_to_target(forwards)
            .dismisses_on_outside_tap(dismisses)],
    )
}

#[test]
fn hidden_guide_passes_everything_through() {
    let s = screen();
    let mut g = guide(&s, true, true);
    assert_eq!(g.hit_test(Point::new(50.0, 120.0)), HitTarget::PassThrough);
    assert_eq!(g.handle_tap(Point::new(300.0, 700.0)), HitTarget::PassThrough);
    assert_eq!(g.claim_gesture(s.elsewhere.id()), GestureClaim::Proceed);
}

#[test]
fn forwarding_step_delivers_touches_to_the_target() {
    let s = screen();
    let mut g = guide(&s, true, false);
    g.show(false);
    assert_eq!(
        g.hit_test(Point::new(50.0, 120.0)),
        HitTarget::Forwarded(s.card.id())
    );
    // Deepest interactive node inside the target wins.
    assert_eq!(
        g.hit_test(Point::new(130.0, 130.0)),
        HitTarget::Forwarded(s.card_button.id())
    );
    assert_eq!(g.handle_tap(Point::new(50.0, 120.0)), HitTarget::Forwarded(s.card.id()));
    assert!(g.is_showing());
}

#[test]
fn non_forwarding_step_swallows_touches_on_the_target() {
    let s = screen();
    let g = {
        let mut g = guide(&s, false, false);
        g.show(false);
        g
    };
    assert_eq!(g.hit_test(Point::new(50.0, 120.0)), HitTarget::Mask);
}

#[test]
fn companion_sits_above_the_mask() {
    let s = screen();
    let mut g = guide(&s, false, true);
    g.show(false);
    // Callout is laid out 8pt below the card, 200 wide: skip on the left half.
    let frame = s.companion.frame().expect("companion attached");
    assert_eq!(frame, Rect::new(20.0, 188.0, 200.0, 60.0));
    assert_eq!(
        g.hit_test(Point::new(30.0, 200.0)),
        HitTarget::Companion(s.companion.skip_button())
    );
    assert_eq!(
        g.handle_tap(Point::new(200.0, 200.0)),
        HitTarget::Companion(s.companion.next_button())
    );
    assert!(g.is_showing());
}

#[test]
fn outside_tap_dismisses_only_when_enabled() {
    let s = screen();
    let reason = Rc::new(Cell::new(None));

    let mut keep = guide(&s, false, false);
    keep.show(false);
    assert_eq!(keep.handle_tap(Point::new(300.0, 700.0)), HitTarget::Mask);
    assert!(keep.is_showing());
    keep.hide();

    let mut g = guide(&s, false, true);
    let sink = Rc::clone(&reason);
    g.set_on_dismiss(move |ctx| sink.set(Some(ctx.reason)));
    g.show(false);
    assert_eq!(g.handle_tap(Point::new(300.0, 700.0)), HitTarget::Mask);
    assert!(!g.is_showing());
    assert_eq!(reason.get(), Some(DismissReason::OutsideTap));
}

#[test]
fn forwarded_tap_never_counts_as_outside() {
    let s = screen();
    let mut g = guide(&s, true, true);
    g.show(false);
    assert_eq!(
        g.handle_tap(Point::new(50.0, 120.0)),
        HitTarget::Forwarded(s.card.id())
    );
    assert!(g.is_showing());
}

#[test]
fn points_outside_the_surface_pass_through() {
    let s = screen();
    let mut g = guide(&s, false, true);
    g.show(false);
    assert_eq!(g.handle_tap(Point::new(500.0, 10.0)), HitTarget::PassThrough);
    assert!(g.is_showing());
}

#[test]
fn shield_blocks_foreign_gestures_while_showing() {
    let s = screen();
    let mut g = guide(&s, true, false);
    assert_eq!(s.host.recognize_gesture(s.elsewhere.id()), GestureClaim::Proceed);

    g.show(false);
    assert!(g.shield().is_active());
    assert_eq!(s.host.recognize_gesture(s.elsewhere.id()), GestureClaim::Blocked);
    assert_eq!(g.claim_gesture(s.elsewhere.id()), GestureClaim::Blocked);
    // Target subtree and overlay content keep their gestures.
    assert_eq!(s.host.recognize_gesture(s.card.id()), GestureClaim::Proceed);
    assert_eq!(s.host.recognize_gesture(s.card_button.id()), GestureClaim::Proceed);
    assert_eq!(
        s.host.recognize_gesture(s.companion.next_button()),
        GestureClaim::Proceed
    );

    g.hide();
    assert!(!g.shield().is_active());
    assert_eq!(s.host.shield_count(), 0);
    assert_eq!(s.host.recognize_gesture(s.elsewhere.id()), GestureClaim::Proceed);
}

#[test]
fn detached_target_is_not_forwarded() {
    let s = screen();
    let mut g = guide(&s, true, false);
    g.show(false);
    s.host.tree().detach(s.card.id());
    assert_eq!(g.hit_test(Point::new(50.0, 120.0)), HitTarget::Mask);
}
