//! Watching the update units and driving the indicator.
//!
//! The [`Watcher`] follows the state of two systemd units, the timer scheduling updates and the
//! service running them. The indicator is shown, and pulses, only while the timer is enabled and
//! the service is running.
//!
//! It doesn't talk to D-Bus itself. Unit tasks from [`daemons::systemd`] send it [`UnitEvent`]s
//! through a channel, everything running on the main context.
//!
//! [`daemons::systemd`]: crate::daemons::systemd

mod decision;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::mpsc;

pub use self::decision::{decide, timer_enabled, Activity, VisibilityDecision};
use crate::daemons::{self, systemd};
use crate::pulse::PulseAnimator;

/// Something that can display the update indicator.
pub trait Indicator {
    fn show(&self);
    fn hide(&self);
    /// Set the opacity (0 to 255), transitioning to it over `transition`.
    fn set_opacity(&self, opacity: u8, transition: Duration);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    Timer,
    Service,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnitEvent {
    /// The unit proxy is ready, with the value of its watched property.
    Ready { unit: Unit, value: Option<String> },
    /// The unit proxy could not be created. No other event follows.
    Failed { unit: Unit },
    /// The watched property changed.
    Changed { unit: Unit, value: Option<String> },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Ready,
    Failed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnitState {
    pub connection: ConnectionState,
    pub last_known: Option<String>,
}

impl UnitState {
    /// The last known value, if the unit is ready.
    fn value(&self) -> Option<&str> {
        match self.connection {
            ConnectionState::Ready => self.last_known.as_deref(),
            ConnectionState::Connecting | ConnectionState::Failed => None,
        }
    }
}

pub struct Watcher {
    timer: UnitState,
    service: UnitState,
    visible: bool,
    torn_down: bool,
    indicator: Rc<dyn Indicator>,
    pulse: PulseAnimator,
}

impl Watcher {
    /// Create a watcher with both units connecting. The indicator starts hidden.
    pub fn new(indicator: Rc<dyn Indicator>) -> Self {
        indicator.hide();
        Self {
            timer: UnitState::default(),
            service: UnitState::default(),
            visible: false,
            torn_down: false,
            pulse: PulseAnimator::new(Rc::clone(&indicator)),
            indicator,
        }
    }

    pub fn unit(&self, unit: Unit) -> &UnitState {
        match unit {
            Unit::Timer => &self.timer,
            Unit::Service => &self.service,
        }
    }

    fn unit_mut(&mut self, unit: Unit) -> &mut UnitState {
        match unit {
            Unit::Timer => &mut self.timer,
            Unit::Service => &mut self.service,
        }
    }

    #[cfg(test)]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[cfg(test)]
    pub fn is_animating(&self) -> bool {
        self.pulse.is_running()
    }

    #[cfg(test)]
    pub fn pulse_opacity(&self) -> u8 {
        self.pulse.state().opacity()
    }

    #[cfg(test)]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Whether the timer is ready and enabled.
    pub fn timer_enabled(&self) -> bool {
        timer_enabled(self.timer.value())
    }

    /// What the service is doing, [`Activity::Inactive`] if it isn't ready.
    pub fn activity(&self) -> Activity {
        Activity::classify(self.service.value())
    }

    pub fn handle(&mut self, event: UnitEvent) {
        if self.torn_down {
            debug!(?event, "Ignoring event after teardown");
            return;
        }

        match event {
            UnitEvent::Ready { unit, value } => self.on_ready(unit, value),
            UnitEvent::Failed { unit } => self.on_failed(unit),
            UnitEvent::Changed { unit, value } => self.on_changed(unit, value),
        }
    }

    fn on_ready(&mut self, unit: Unit, value: Option<String>) {
        let state = self.unit_mut(unit);
        if state.connection != ConnectionState::Connecting {
            warn!(?unit, connection = ?state.connection, "Unit ready twice, ignoring");
            return;
        }

        state.connection = ConnectionState::Ready;
        self.refresh(unit, value);
        self.evaluate();
    }

    fn on_failed(&mut self, unit: Unit) {
        let state = self.unit_mut(unit);
        state.connection = ConnectionState::Failed;
        state.last_known = None;

        info!(?unit, "Unit unavailable, keeping the indicator hidden");
        self.apply(VisibilityDecision::HIDDEN);
    }

    fn on_changed(&mut self, unit: Unit, value: Option<String>) {
        let connection = self.unit(unit).connection;
        if connection != ConnectionState::Ready {
            debug!(?unit, ?connection, "Ignoring change of a unit that isn't ready");
            return;
        }

        self.refresh(unit, value);

        if unit == Unit::Timer && !self.timer_enabled() {
            // Whatever the service says, it may be stale.
            info!("Timer is disabled, hiding indicator");
            self.apply(VisibilityDecision::HIDDEN);
            return;
        }

        self.evaluate();
    }

    fn refresh(&mut self, unit: Unit, value: Option<String>) {
        if value.is_none() {
            info!(?unit, "Watched property not available");
        }
        self.unit_mut(unit).last_known = value;

        match unit {
            Unit::Timer => info!(
                state = ?self.timer.last_known,
                enabled = self.timer_enabled(),
                "Timer state"
            ),
            Unit::Service => info!(
                state = ?self.service.last_known,
                activity = ?self.activity(),
                "Service state"
            ),
        }
    }

    /// Decide from the latest unit states and apply the result.
    pub fn evaluate(&mut self) -> VisibilityDecision {
        let decision = decide(self.timer_enabled(), self.service.value());
        self.apply(decision);
        decision
    }

    fn apply(&mut self, decision: VisibilityDecision) {
        match (self.visible, decision.visible) {
            (false, true) => {
                info!("Update running, showing indicator");
                self.indicator.show();
            }
            (true, false) => {
                info!("No update running, hiding indicator");
                self.indicator.hide();
            }
            _ => (),
        }
        self.visible = decision.visible;

        if decision.animating {
            self.pulse.start();
        } else {
            self.pulse.stop();
        }
    }

    /// Stop animating and ignore any further event.
    pub fn teardown(&mut self) {
        self.pulse.stop();
        self.torn_down = true;
    }
}

/// A running [`Watcher`] along with the tasks feeding it.
pub struct WatcherHandle {
    watcher: Rc<RefCell<Watcher>>,
    tasks: Vec<glib::JoinHandle<()>>,
}

/// Start watching the update units on the thread-default main context.
pub fn spawn(indicator: Rc<dyn Indicator>) -> WatcherHandle {
    let (sender, receiver) = mpsc::unbounded_channel();

    // Both units connect independently, each one reporting as soon as it's ready.
    let conn = daemons::system_connection().cloned();
    let tasks = [&systemd::TIMER, &systemd::SERVICE]
        .into_iter()
        .map(|watch| {
            let task = systemd::watch_unit(conn.clone(), watch, sender.clone());
            glib::spawn_future_local(task)
        })
        .collect();

    WatcherHandle::new(indicator, receiver, tasks)
}

impl WatcherHandle {
    fn new(
        indicator: Rc<dyn Indicator>,
        events: mpsc::UnboundedReceiver<UnitEvent>,
        mut tasks: Vec<glib::JoinHandle<()>>,
    ) -> Self {
        let watcher = Rc::new(RefCell::new(Watcher::new(indicator)));
        tasks.push(glib::spawn_future_local(pump(events, Rc::clone(&watcher))));

        Self { watcher, tasks }
    }

    #[cfg(test)]
    pub fn watcher(&self) -> &Rc<RefCell<Watcher>> {
        &self.watcher
    }

    /// Stop everything. Dropping the unit tasks drops their subscriptions and proxies.
    pub fn teardown(self) {
        info!("Tearing down watcher");
        self.watcher.borrow_mut().teardown();
        for task in self.tasks {
            task.abort();
        }
    }
}

async fn pump(mut events: mpsc::UnboundedReceiver<UnitEvent>, watcher: Rc<RefCell<Watcher>>) {
    while let Some(event) = events.recv().await {
        watcher.borrow_mut().handle(event);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::time::Duration;

    use super::Indicator;

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Call {
        Show,
        Hide,
        SetOpacity(u8, Duration),
    }

    /// An [`Indicator`] remembering what it was asked to do.
    #[derive(Debug, Default)]
    pub struct RecordingIndicator {
        calls: RefCell<Vec<Call>>,
    }

    impl RecordingIndicator {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        pub fn clear(&self) {
            self.calls.borrow_mut().clear();
        }
    }

    impl Indicator for RecordingIndicator {
        fn show(&self) {
            self.calls.borrow_mut().push(Call::Show);
        }

        fn hide(&self) {
            self.calls.borrow_mut().push(Call::Hide);
        }

        fn set_opacity(&self, opacity: u8, transition: Duration) {
            self.calls
                .borrow_mut()
                .push(Call::SetOpacity(opacity, transition));
        }
    }

    /// Run `f` with a fresh main context as the thread-default one.
    pub fn with_main_context<R>(f: impl FnOnce() -> R) -> R {
        let context = glib::MainContext::new();
        context
            .with_thread_default(f)
            .expect("fresh main context is free")
    }
}
