//! Opacity pulse of the indicator icon.
//!
//! The pulse is a triangle wave: the opacity goes down by [`OPACITY_STEP`] each tick until it
//! reaches [`MIN_OPACITY`], then back up until [`MAX_OPACITY`], and so on. Each value is handed
//! to the [`Indicator`] along with the tick interval so it can transition smoothly to it.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use futures_util::StreamExt;

use crate::watcher::Indicator;

pub const TICK_INTERVAL: Duration = Duration::from_millis(80);
pub const OPACITY_STEP: i16 = 8;
pub const MIN_OPACITY: u8 = 100;
pub const MAX_OPACITY: u8 = 255;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    fn sign(self) -> i16 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PulseState {
    opacity: u8,
    direction: Direction,
}

impl Default for PulseState {
    /// Fully opaque, going up. The first step overshoots, so the pulse really starts going down
    /// from [`MAX_OPACITY`].
    fn default() -> Self {
        Self {
            opacity: MAX_OPACITY,
            direction: Direction::Up,
        }
    }
}

impl PulseState {
    pub fn opacity(&self) -> u8 {
        self.opacity
    }

    #[cfg(test)]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Advance by one tick and return the new opacity.
    pub fn step(&mut self) -> u8 {
        let next = i16::from(self.opacity) + self.direction.sign() * OPACITY_STEP;

        if next <= i16::from(MIN_OPACITY) {
            self.direction = Direction::Up;
            self.opacity = MIN_OPACITY;
        } else if next >= i16::from(MAX_OPACITY) {
            self.direction = Direction::Down;
            self.opacity = MAX_OPACITY;
        } else {
            // In (MIN_OPACITY, MAX_OPACITY) here.
            self.opacity = next as u8;
        }

        self.opacity
    }
}

/// Drives a [`PulseState`] on the main context and applies it to an [`Indicator`].
pub struct PulseAnimator {
    context: glib::MainContext,
    indicator: Rc<dyn Indicator>,
    state: Rc<Cell<PulseState>>,
    ticker: Option<glib::JoinHandle<()>>,
}

impl PulseAnimator {
    /// Create an animator ticking on the thread-default main context.
    pub fn new(indicator: Rc<dyn Indicator>) -> Self {
        Self {
            context: glib::MainContext::ref_thread_default(),
            indicator,
            state: Rc::default(),
            ticker: None,
        }
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    #[cfg(test)]
    pub fn state(&self) -> PulseState {
        self.state.get()
    }

    /// Start pulsing. Does nothing if already running, the current phase is kept.
    pub fn start(&mut self) {
        if self.ticker.is_some() {
            return;
        }

        debug!("Starting icon pulse");
        self.state.set(PulseState::default());

        let state = Rc::clone(&self.state);
        let indicator = Rc::clone(&self.indicator);
        let ticker = self.context.spawn_local(async move {
            let mut ticks = async_io::Timer::interval(TICK_INTERVAL);
            while ticks.next().await.is_some() {
                let mut pulse = state.get();
                let opacity = pulse.step();
                state.set(pulse);
                indicator.set_opacity(opacity, TICK_INTERVAL);
            }
        });
        self.ticker = Some(ticker);
    }

    /// Stop pulsing and go back to full opacity. Does nothing if not running.
    ///
    /// Once this returns, no more ticks happen.
    pub fn stop(&mut self) {
        let Some(ticker) = self.ticker.take() else {
            return;
        };

        debug!(opacity = self.state.get().opacity(), "Stopping icon pulse");
        ticker.abort();
        self.state.set(PulseState::default());
        self.indicator.set_opacity(MAX_OPACITY, Duration::ZERO);
    }
}

impl Drop for PulseAnimator {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}
