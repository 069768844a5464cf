#![forbid(unsafe_code)]

//! Controller lifecycle: show, step changes, dismissal and plugin ordering.
//!
//! Run:
//!   cargo test -p coachmark-harness --test guide_lifecycle

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use coachmark::{
    DismissContext, DismissReason, GuideConfig, GuideController, GuideEvent, GuideStep, OverlayHost,
    StepChange,
};
use coachmark_core::geometry::Rect;
use coachmark_core::path::Shape;
use coachmark_harness::{FakeCompanion, FakeHost, FakeNode, HostOp, RecordingPlugin};

use GuideEvent::*;

const A_FRAME: Rect = Rect::new(20.0, 100.0, 80.0, 40.0);
const B_FRAME: Rect = Rect::new(200.0, 400.0, 120.0, 60.0);

struct Fixture {
    host: Rc<FakeHost>,
    a: Rc<FakeNode>,
    b: Rc<FakeNode>,
    ca: Rc<FakeCompanion>,
    cb: Rc<FakeCompanion>,
    plugin: Rc<RecordingPlugin>,
}

impl Fixture {
    fn new() -> Self {
        let host = FakeHost::window(400.0, 800.0);
        let a = host.add_element("a", A_FRAME);
        let b = host.add_element("b", B_FRAME);
        let ca = FakeCompanion::new(&host, 200.0, 60.0);
        let cb = FakeCompanion::new(&host, 200.0, 60.0);
        Self {
            host,
            a,
            b,
            ca,
            cb,
            plugin: RecordingPlugin::new(),
        }
    }

    fn steps(&self) -> Vec<GuideStep> {
        vec![
            GuideStep::new()
                .id("a")
                .target(&self.a.element())
                .companion(self.ca.view()),
            GuideStep::new()
                .id("b")
                .target(&self.b.element())
                .companion(self.cb.view()),
        ]
    }

    fn guide(&self) -> GuideController {
        self.guide_with(GuideConfig::default())
    }

    fn guide_with(&self, config: GuideConfig) -> GuideController {
        GuideController::builder()
            .host(&self.host.handle())
            .steps(self.steps())
            .plugin(self.plugin.plugin())
            .config(config)
            .build()
    }
}

fn record_dismissals(guide: &mut GuideController) -> Rc<RefCell<Vec<DismissContext>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    guide.set_on_dismiss(move |ctx| sink.borrow_mut().push(ctx.clone()));
    log
}

#[test]
fn show_without_steps_does_nothing() {
    let host = FakeHost::window(400.0, 800.0);
    let mut guide = GuideController::new(&host.handle(), []);
    assert!(!guide.show(false));
    assert!(!guide.is_showing());
    assert_eq!(guide.current_index(), None);
    assert!(host.ops().is_empty());
}

#[test]
fn show_mounts_overlay_and_first_step() {
    let fx = Fixture::new();
    let mut guide = fx.guide();
    assert!(guide.show(false));

    assert!(guide.is_showing());
    assert_eq!(guide.current_index(), Some(0));
    assert_eq!(fx.host.overlay_count(), 1);
    assert_eq!(fx.host.shield_count(), 1);
    assert!(fx.ca.is_attached());
    assert!(fx.ca.has_actions());
    assert!(!fx.cb.is_attached());

    let container = guide.container().expect("container while showing");
    assert_eq!(fx.host.tree().parent(fx.ca.id()), Some(container));
    assert_eq!(
        fx.plugin.events(),
        vec![GuideWillShow, StepWillShow, StepDidShow, GuideDidShow]
    );

    let cutout = guide.mask().cutout().expect("cut-out committed");
    assert_eq!(cutout.bounds(), Rect::from_size(400.0, 800.0));
    assert_eq!(cutout.holes(), &[Shape::rect(A_FRAME)]);

    let layout = fx.ca.last_layout().expect("companion laid out");
    assert_eq!(layout.anchor, A_FRAME);
    assert_eq!(layout.target, Some(fx.a.id()));
}

#[test]
fn show_is_idempotent_while_showing() {
    let fx = Fixture::new();
    let mut guide = fx.guide();
    assert!(guide.show(false));
    fx.plugin.clear();
    fx.host.clear_ops();
    assert!(guide.show(false));
    assert!(fx.plugin.events().is_empty());
    assert!(fx.host.ops().is_empty());
    assert_eq!(fx.host.overlay_count(), 1);
}

#[test]
fn next_advances_and_reports_step_change() {
    let fx = Fixture::new();
    let mut guide = fx.guide();
    let changes = Rc::new(RefCell::new(Vec::<StepChange>::new()));
    let sink = Rc::clone(&changes);
    guide.set_on_step_change(move |c| sink.borrow_mut().push(c.clone()));

    guide.show(false);
    fx.plugin.clear();
    assert!(fx.ca.tap_next());
    // Nothing happens until the controller pumps.
    assert_eq!(guide.current_index(), Some(0));
    guide.pump();

    assert_eq!(guide.current_index(), Some(1));
    assert_eq!(
        fx.plugin.events_with_index(),
        vec![
            (StepWillHide, 0),
            (StepDidHide, 0),
            (StepWillShow, 1),
            (StepDidShow, 1),
        ]
    );
    assert_eq!(
        *changes.borrow(),
        vec![StepChange {
            index: 1,
            step_id: Some("b".into()),
            total_steps: 2,
        }]
    );
    assert!(!fx.ca.is_attached());
    assert!(!fx.ca.has_actions());
    assert!(fx.cb.is_attached());
    assert_eq!(
        guide.mask().cutout().map(|p| p.holes().to_vec()),
        Some(vec![Shape::rect(B_FRAME)])
    );
}

#[test]
fn next_on_last_step_completes() {
    let fx = Fixture::new();
    let mut guide = fx.guide();
    let dismissals = record_dismissals(&mut guide);
    guide.show(false);
    fx.ca.tap_next();
    guide.pump();
    fx.plugin.clear();
    fx.cb.tap_next();
    guide.pump();

    assert!(!guide.is_showing());
    assert_eq!(guide.current_index(), None);
    assert_eq!(
        *dismissals.borrow(),
        vec![DismissContext {
            reason: DismissReason::Completed,
            step_id: Some("b".into()),
            last_step_index: Some(1),
            total_steps: 2,
        }]
    );
    assert_eq!(
        fx.plugin.events(),
        vec![StepWillHide, GuideWillHide, StepDidHide, GuideDidHide]
    );
    assert_eq!(fx.host.overlay_count(), 0);
    assert_eq!(fx.host.shield_count(), 0);
    assert!(!fx.cb.is_attached());
    assert!(guide.mask().cutout().is_none());
}

#[test]
fn skip_dismisses_from_any_step() {
    let fx = Fixture::new();
    let mut guide = fx.guide();
    let dismissals = record_dismissals(&mut guide);
    guide.show(false);
    fx.ca.tap_skip();
    guide.pump();
    assert!(!guide.is_showing());
    let d = dismissals.borrow();
    assert_eq!(d.len(), 1);
    assert_eq!(d[0].reason, DismissReason::Skipped);
    assert_eq!(d[0].step_id.as_deref(), Some("a"));
    assert_eq!(d[0].last_step_index, Some(0));
}

#[test]
fn requests_from_a_torn_down_step_are_ignored() {
    let fx = Fixture::new();
    let mut guide = fx.guide();
    let dismissals = record_dismissals(&mut guide);
    guide.show(false);
    let stale = fx.ca.actions().expect("actions installed");
    fx.ca.tap_next();
    guide.pump();
    assert_eq!(guide.current_index(), Some(1));

    stale.request_skip();
    stale.request_next();
    guide.pump();
    assert_eq!(guide.current_index(), Some(1));
    assert!(dismissals.borrow().is_empty());
}

#[test]
fn only_the_first_request_in_a_step_wins() {
    let fx = Fixture::new();
    let mut guide = fx.guide();
    let dismissals = record_dismissals(&mut guide);
    guide.show(false);
    fx.ca.tap_next();
    fx.ca.tap_next();
    fx.ca.tap_skip();
    guide.pump();
    assert_eq!(guide.current_index(), Some(1));
    assert!(dismissals.borrow().is_empty());
}

#[test]
fn hide_is_programmatic_and_fires_once() {
    let fx = Fixture::new();
    let mut guide = fx.guide();
    let dismissals = record_dismissals(&mut guide);
    guide.hide();
    assert!(dismissals.borrow().is_empty());

    guide.show(false);
    guide.hide();
    guide.hide();
    let d = dismissals.borrow();
    assert_eq!(d.len(), 1);
    assert_eq!(d[0].reason, DismissReason::Programmatic);
    assert_eq!(fx.host.overlay_count(), 0);
}

#[test]
fn guide_can_be_shown_again_after_dismissal() {
    let fx = Fixture::new();
    let mut guide = fx.guide();
    guide.show(false);
    fx.ca.tap_skip();
    guide.pump();
    assert!(guide.show(false));
    assert_eq!(guide.current_index(), Some(0));
    assert!(fx.ca.has_actions());
    assert_eq!(fx.host.overlay_count(), 1);
    assert_eq!(fx.ca.revocations(), 1);
}

#[test]
fn show_step_before_show_picks_the_starting_step() {
    let fx = Fixture::new();
    let mut guide = fx.guide();
    assert!(!guide.show_step(5));
    assert!(guide.show_step(1));
    assert!(!guide.is_showing());
    assert!(guide.show(false));
    assert_eq!(guide.current_index(), Some(1));
    assert_eq!(fx.plugin.records()[0].event, GuideWillShow);
    assert_eq!(fx.plugin.records()[0].step_index, 1);
    assert!(fx.cb.is_attached());
}

#[test]
fn show_step_on_current_refreshes_in_place() {
    let fx = Fixture::new();
    let mut guide = fx.guide();
    guide.show(false);
    fx.plugin.clear();
    fx.host.clear_ops();
    fx.host.tree().set_frame(fx.a.id(), Rect::new(30.0, 110.0, 80.0, 40.0));

    assert!(guide.show_step(0));
    assert_eq!(
        fx.plugin.events_with_index(),
        vec![(StepWillShow, 0), (StepDidShow, 0)]
    );
    assert!(fx.host.ops().is_empty(), "no teardown: {:?}", fx.host.ops());
    assert!(fx.ca.is_attached());
    assert_eq!(
        guide.mask().cutout().map(|p| p.holes().to_vec()),
        Some(vec![Shape::rect(Rect::new(30.0, 110.0, 80.0, 40.0))])
    );
}

#[test]
fn show_next_step_and_advance() {
    let fx = Fixture::new();
    let mut guide = fx.guide();
    let dismissals = record_dismissals(&mut guide);
    guide.show(false);
    assert!(guide.show_next_step());
    assert_eq!(guide.current_index(), Some(1));
    assert!(!guide.show_next_step());
    assert!(guide.is_showing());
    assert!(!guide.advance());
    assert!(!guide.is_showing());
    assert_eq!(dismissals.borrow()[0].reason, DismissReason::Completed);
}

#[test]
fn animated_show_fades_in_before_did_show() {
    let fx = Fixture::new();
    let mut guide = fx.guide_with(
        GuideConfig::default().animation_duration(Duration::from_millis(200)),
    );
    assert!(guide.show(true));
    assert_eq!(guide.overlay_opacity(), 0.0);
    assert_eq!(fx.plugin.count(GuideDidShow), 0);

    guide.tick(Duration::from_millis(100));
    let mid = guide.overlay_opacity();
    assert!(mid > 0.0 && mid < 1.0, "mid-fade opacity {mid}");
    assert_eq!(fx.plugin.count(GuideDidShow), 0);

    guide.tick(Duration::from_millis(150));
    assert_eq!(guide.overlay_opacity(), 1.0);
    assert_eq!(fx.plugin.count(GuideDidShow), 1);
    assert_eq!(fx.plugin.events().last(), Some(&GuideDidShow));

    guide.tick(Duration::from_millis(100));
    assert_eq!(fx.plugin.count(GuideDidShow), 1);
}

#[test]
fn animated_show_with_zero_duration_is_immediate() {
    let fx = Fixture::new();
    let mut guide = fx.guide_with(GuideConfig::default().animation_duration(Duration::ZERO));
    guide.show(true);
    assert_eq!(guide.overlay_opacity(), 1.0);
    assert_eq!(fx.plugin.count(GuideDidShow), 1);
}

#[test]
fn dismiss_during_fade_never_reports_did_show() {
    let fx = Fixture::new();
    let mut guide = fx.guide();
    guide.show(true);
    guide.hide();
    guide.tick(Duration::from_secs(1));
    assert_eq!(fx.plugin.count(GuideDidShow), 0);
    assert_eq!(fx.plugin.count(GuideDidHide), 1);
}

#[test]
fn dropping_a_showing_controller_tears_down_silently() {
    let fx = Fixture::new();
    let mut guide = fx.guide();
    let dismissals = record_dismissals(&mut guide);
    guide.show(false);
    drop(guide);
    assert_eq!(fx.host.overlay_count(), 0);
    assert_eq!(fx.host.shield_count(), 0);
    assert!(!fx.ca.is_attached());
    assert!(dismissals.borrow().is_empty());
    assert_eq!(fx.plugin.events().last(), Some(&GuideDidHide));
}

#[test]
fn host_ops_follow_the_lifecycle() {
    let fx = Fixture::new();
    let mut guide = fx.guide();
    guide.show(false);
    let container = guide.container().expect("showing");
    fx.ca.tap_skip();
    guide.pump();
    assert_eq!(
        fx.host.ops(),
        vec![
            HostOp::Mount(container),
            HostOp::InstallShield,
            HostOp::AttachCompanion {
                container,
                companion: fx.ca.id(),
            },
            HostOp::RemoveShield,
            HostOp::DetachCompanion(fx.ca.id()),
            HostOp::Unmount(container),
        ]
    );
}

#[test]
fn resolver_supplies_the_host() {
    let fx = Fixture::new();
    let host = Rc::clone(&fx.host);
    let mut guide = GuideController::builder()
        .resolver(move || Some(host.handle()))
        .steps(fx.steps())
        .build();
    assert!(guide.show(false));
    assert_eq!(fx.host.overlay_count(), 1);
}

#[test]
fn show_fails_without_any_host() {
    let fx = Fixture::new();
    let mut guide = GuideController::builder()
        .resolver(|| -> Option<Rc<dyn OverlayHost>> { None })
        .steps(fx.steps())
        .build();
    assert_eq!(guide.step_count(), 2);
    assert!(!guide.show(false));
    assert!(!guide.is_showing());
}

#[test]
fn explicit_host_is_held_weakly() {
    let other = FakeHost::window(400.0, 800.0);
    let companion = FakeCompanion::new(&other, 200.0, 60.0);
    let fallback = Rc::clone(&other);
    let mut guide = {
        let temporary = FakeHost::window(100.0, 100.0);
        GuideController::builder()
            .host(&temporary.handle())
            .resolver(move || Some(fallback.handle()))
            .step(GuideStep::new().companion(companion.view()))
            .build()
    };
    // The explicit host is gone; the resolver takes over.
    assert!(guide.show(false));
    assert_eq!(other.overlay_count(), 1);
    assert_eq!(guide.mask().bounds(), Rect::from_size(400.0, 800.0));
}

#[test]
fn plugins_register_once_and_see_context() {
    let fx = Fixture::new();
    let mut guide = fx.guide();
    assert!(!guide.add_plugin(fx.plugin.plugin()));
    assert_eq!(guide.plugin_count(), 1);
    guide.show(false);
    let container = guide.container().expect("showing");
    let first = &fx.plugin.records()[0];
    assert_eq!(first.container, container);
    assert_eq!(first.target, Some(fx.a.id()));
    assert_eq!(first.total_steps, 2);
    assert_eq!(first.step_id.as_deref(), Some("a"));
}

#[test]
fn removed_plugin_stops_receiving_events() {
    let fx = Fixture::new();
    let mut guide = fx.guide();
    let other = RecordingPlugin::new();
    assert!(guide.add_plugin(other.plugin()));
    guide.show(false);
    assert_eq!(fx.plugin.count(StepDidShow), 1);

    assert!(guide.remove_plugin(&fx.plugin.plugin()));
    assert!(!guide.remove_plugin(&fx.plugin.plugin()));
    assert_eq!(guide.plugin_count(), 1);
    fx.plugin.clear();
    other.clear();

    fx.ca.tap_next();
    guide.pump();
    assert_eq!(guide.current_index(), Some(1));
    assert!(fx.plugin.events().is_empty());
    assert_eq!(
        other.events(),
        vec![StepWillHide, StepDidHide, StepWillShow, StepDidShow]
    );

    guide.hide();
    assert!(fx.plugin.events().is_empty());
    assert_eq!(other.count(GuideDidHide), 1);
}

#[test]
fn step_added_while_showing_is_reachable() {
    let fx = Fixture::new();
    let mut guide = fx.guide();
    guide.show(false);
    let extra = fx.host.add_element("c", Rect::new(0.0, 0.0, 10.0, 10.0));
    assert!(guide.add_step(GuideStep::new().id("c").target(&extra.element())));
    assert_eq!(guide.step_count(), 3);
    assert!(guide.show_step(2));
    assert_eq!(guide.current_index(), Some(2));
}
