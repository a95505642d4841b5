use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Cancellable handle for a recurring countdown registration. Single-owner:
/// the session controller holds at most one live handle and must cancel it
/// before scheduling a replacement, otherwise two countdowns would tick the
/// same session. Dropping the handle cancels it.
pub struct TimerHandle {
    active: Rc<Cell<bool>>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.active.set(false);
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.active.set(false);
    }
}

/// The one scheduling primitive the core needs from its environment: a
/// 1-second recurring callback. The presentation layer adapts whatever event
/// loop it runs on; tests drive [`ManualScheduler`] by hand.
pub trait TickScheduler {
    fn every_second(&self, tick: Box<dyn FnMut()>) -> TimerHandle;
}

struct Registration {
    active: Rc<Cell<bool>>,
    tick: Box<dyn FnMut()>,
}

/// Scheduler with a hand crank. `fire()` stands in for one second of wall
/// clock and invokes every live registration.
#[derive(Default)]
pub struct ManualScheduler {
    registrations: Rc<RefCell<Vec<Registration>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one tick to every live registration. Callbacks are run
    /// outside the registry borrow, so a tick may cancel its own handle or
    /// schedule new work.
    pub fn fire(&self) {
        let mut current: Vec<Registration> =
            self.registrations.borrow_mut().drain(..).collect();
        for registration in current.iter_mut() {
            if registration.active.get() {
                (registration.tick)();
            }
        }
        current.retain(|r| r.active.get());
        // registrations added by the callbacks land behind the survivors
        let mut registry = self.registrations.borrow_mut();
        let added: Vec<Registration> = registry.drain(..).collect();
        *registry = current;
        registry.extend(added);
    }

    pub fn live_count(&self) -> usize {
        self.registrations
            .borrow()
            .iter()
            .filter(|r| r.active.get())
            .count()
    }
}

impl TickScheduler for ManualScheduler {
    fn every_second(&self, tick: Box<dyn FnMut()>) -> TimerHandle {
        let active = Rc::new(Cell::new(true));
        self.registrations.borrow_mut().push(Registration {
            active: Rc::clone(&active),
            tick,
        });
        TimerHandle { active }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_reaches_live_registrations() {
        let scheduler = ManualScheduler::new();
        let count = Rc::new(Cell::new(0));

        let count_ref = count.clone();
        let handle = scheduler.every_second(Box::new(move || {
            count_ref.set(count_ref.get() + 1);
        }));

        scheduler.fire();
        scheduler.fire();
        assert_eq!(count.get(), 2);
        assert!(handle.is_active());
    }

    #[test]
    fn test_cancelled_handle_stops_ticking() {
        let scheduler = ManualScheduler::new();
        let count = Rc::new(Cell::new(0));

        let count_ref = count.clone();
        let handle = scheduler.every_second(Box::new(move || {
            count_ref.set(count_ref.get() + 1);
        }));

        scheduler.fire();
        handle.cancel();
        scheduler.fire();
        assert_eq!(count.get(), 1);
        assert_eq!(scheduler.live_count(), 0);
    }

    #[test]
    fn test_dropping_the_handle_cancels() {
        let scheduler = ManualScheduler::new();
        let count = Rc::new(Cell::new(0));

        let count_ref = count.clone();
        let handle = scheduler.every_second(Box::new(move || {
            count_ref.set(count_ref.get() + 1);
        }));
        drop(handle);

        scheduler.fire();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_tick_may_cancel_its_own_handle() {
        let scheduler = ManualScheduler::new();
        let shared: Rc<RefCell<Option<TimerHandle>>> = Rc::new(RefCell::new(None));

        let shared_ref = shared.clone();
        let count = Rc::new(Cell::new(0));
        let count_ref = count.clone();
        let handle = scheduler.every_second(Box::new(move || {
            count_ref.set(count_ref.get() + 1);
            if let Some(h) = shared_ref.borrow().as_ref() {
                h.cancel();
            }
        }));
        *shared.borrow_mut() = Some(handle);

        scheduler.fire();
        scheduler.fire();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_tick_may_schedule_a_replacement() {
        let scheduler = Rc::new(ManualScheduler::new());
        let count = Rc::new(Cell::new(0));

        let scheduler_ref = Rc::clone(&scheduler);
        let count_ref = count.clone();
        let keeper: Rc<RefCell<Vec<TimerHandle>>> = Rc::new(RefCell::new(Vec::new()));
        let keeper_ref = keeper.clone();
        let handle = scheduler.every_second(Box::new(move || {
            let count_inner = count_ref.clone();
            let replacement = scheduler_ref.every_second(Box::new(move || {
                count_inner.set(count_inner.get() + 10);
            }));
            keeper_ref.borrow_mut().push(replacement);
        }));

        scheduler.fire();
        handle.cancel();
        scheduler.fire();
        assert_eq!(count.get(), 10);
    }
}
