#![forbid(unsafe_code)]

//! Auto-completers driving dismissal.
//!
//! Run:
//!   cargo test -p coachmark-harness --test completers

use std::cell::RefCell;
use std::rc::Rc;

use coachmark::{
    AutoCompleter, CompletionTrigger, ControlEventCompleter, DismissContext, DismissReason,
    GuideController, GuideStep,
};
use coachmark_core::event::ControlEvents;
use coachmark_core::geometry::Rect;
use coachmark_harness::{FakeCompanion, FakeControl, FakeHost};

/// Completer that hands its trigger to the test.
#[derive(Clone, Default)]
struct Manual {
    trigger: Rc<RefCell<Option<CompletionTrigger>>>,
    enabled: Rc<RefCell<u32>>,
    disabled: Rc<RefCell<u32>>,
}

impl Manual {
    fn fire(&self) {
        if let Some(t) = self.trigger.borrow().as_ref() {
            t.trigger();
        }
    }
}

impl AutoCompleter for Manual {
    fn enable(&mut self, trigger: CompletionTrigger) {
        *self.enabled.borrow_mut() += 1;
        *self.trigger.borrow_mut() = Some(trigger);
    }

    fn disable(&mut self) {
        *self.disabled.borrow_mut() += 1;
    }
}

fn dismissals(guide: &mut GuideController) -> Rc<RefCell<Vec<DismissContext>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    guide.set_on_dismiss(move |ctx| sink.borrow_mut().push(ctx.clone()));
    log
}

#[test]
fn control_event_completes_the_guide() {
    let host = FakeHost::window(400.0, 800.0);
    let button = FakeControl::new(&host, "save", Rect::new(20.0, 700.0, 120.0, 44.0));
    let completer = ControlEventCompleter::new(&button.control(), ControlEvents::TOUCH_UP_INSIDE);
    let mut guide = GuideController::new(
        &host.handle(),
        [GuideStep::new()
            .id("save")
            .target(&button.element())
            .forwards_touches_to_target(true)
            .completer(completer)],
    );
    let log = dismissals(&mut guide);
    assert_eq!(button.listener_count(), 0);

    guide.show(false);
    assert_eq!(button.listener_count(), 1);
    button.emit(ControlEvents::TOUCH_DOWN);
    guide.pump();
    assert!(guide.is_showing());

    button.emit(ControlEvents::TOUCH_UP_INSIDE);
    guide.pump();
    assert!(!guide.is_showing());
    assert_eq!(button.listener_count(), 0);

    // The completer is stopped; further events change nothing.
    button.emit(ControlEvents::TOUCH_UP_INSIDE);
    guide.pump();
    assert!(!guide.is_showing());
    assert_eq!(host.overlay_count(), 0);

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].reason, DismissReason::CompleterTriggered);
    assert_eq!(log[0].step_id.as_deref(), Some("save"));
}

#[test]
fn completer_is_disabled_when_its_step_hides() {
    let host = FakeHost::window(400.0, 800.0);
    let button = FakeControl::new(&host, "save", Rect::new(20.0, 700.0, 120.0, 44.0));
    let companion = FakeCompanion::new(&host, 200.0, 60.0);
    let second = host.add_element("second", Rect::new(20.0, 100.0, 80.0, 40.0));
    let mut guide = GuideController::new(
        &host.handle(),
        [
            GuideStep::new()
                .target(&button.element())
                .companion(companion.view())
                .completer(ControlEventCompleter::new(
                    &button.control(),
                    ControlEvents::ALL_TOUCH,
                )),
            GuideStep::new().target(&second.element()),
        ],
    );
    let log = dismissals(&mut guide);
    guide.show(false);
    companion.tap_next();
    guide.pump();
    assert_eq!(guide.current_index(), Some(1));
    assert_eq!(button.listener_count(), 0);

    button.emit(ControlEvents::TOUCH_UP_INSIDE);
    guide.pump();
    assert!(guide.is_showing());
    assert!(log.borrow().is_empty());
}

#[test]
fn trigger_fires_at_most_once() {
    let host = FakeHost::window(400.0, 800.0);
    let target = host.add_element("t", Rect::new(20.0, 100.0, 80.0, 40.0));
    let manual = Manual::default();
    let mut guide = GuideController::new(
        &host.handle(),
        [GuideStep::new()
            .target(&target.element())
            .completer(manual.clone())],
    );
    let log = dismissals(&mut guide);
    guide.show(false);
    assert_eq!(*manual.enabled.borrow(), 1);
    manual.fire();
    manual.fire();
    guide.pump();
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(*manual.disabled.borrow(), 1);

    // Shown again, the step gets a fresh trigger.
    guide.show(false);
    assert_eq!(*manual.enabled.borrow(), 2);
    manual.fire();
    guide.pump();
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn stale_trigger_is_ignored_after_step_change() {
    let host = FakeHost::window(400.0, 800.0);
    let a = host.add_element("a", Rect::new(20.0, 100.0, 80.0, 40.0));
    let b = host.add_element("b", Rect::new(20.0, 300.0, 80.0, 40.0));
    let manual = Manual::default();
    let mut guide = GuideController::new(
        &host.handle(),
        [
            GuideStep::new().target(&a.element()).completer(manual.clone()),
            GuideStep::new().target(&b.element()),
        ],
    );
    let log = dismissals(&mut guide);
    guide.show(false);
    assert!(guide.show_next_step());
    manual.fire();
    guide.pump();
    assert_eq!(guide.current_index(), Some(1));
    assert!(log.borrow().is_empty());
}

#[test]
fn completer_and_next_in_the_same_turn() {
    let host = FakeHost::window(400.0, 800.0);
    let a = host.add_element("a", Rect::new(20.0, 100.0, 80.0, 40.0));
    let b = host.add_element("b", Rect::new(20.0, 300.0, 80.0, 40.0));
    let companion = FakeCompanion::new(&host, 200.0, 60.0);
    let manual = Manual::default();
    let mut guide = GuideController::new(
        &host.handle(),
        [
            GuideStep::new()
                .target(&a.element())
                .companion(companion.view())
                .completer(manual.clone()),
            GuideStep::new().target(&b.element()),
        ],
    );
    let log = dismissals(&mut guide);
    guide.show(false);
    manual.fire();
    companion.tap_next();
    guide.pump();
    assert!(!guide.is_showing());
    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].reason, DismissReason::CompleterTriggered);
}
