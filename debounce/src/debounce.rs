/*
 * Copyright (c) 2021 The ZMK Contributors
 * Copyright (c) Merlin04
 *
 * SPDX-License-Identifier: MIT
 */

use bitfield::bitfield;

use crate::config::{DebounceConfig, Policy};
use crate::log;

const DEBOUNCE_COUNTER_BITS: u32 = 14;

/// Highest value the integrator counter can hold.
pub const COUNTER_MAX: u16 = (1 << DEBOUNCE_COUNTER_BITS) - 1;

bitfield! {
    /// Debounce state of a single switch.
    ///
    /// Starts released with an empty counter. Only [`DebounceState::update`]
    /// changes it.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct DebounceState(u16);
    /// Debounced state of the switch.
    pub pressed, _: 0;
    /// Whether the last update flipped `pressed`.
    pub changed, _: 1;
    pub u16, counter, _: 15, 2;
    _, set_pressed: 0;
    _, set_changed: 1;
    u16, _, set_counter: 15, 2;
}

impl core::fmt::Debug for DebounceState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DebounceState")
            .field("pressed", &self.pressed())
            .field("changed", &self.changed())
            .field("counter", &self.counter())
            .finish()
    }
}

impl DebounceState {
    pub const fn new() -> Self {
        Self(0)
    }

    /// Forget everything, e.g. after the switch was reconnected.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn increment_counter(&mut self, elapsed_ms: u32) {
        let headroom = COUNTER_MAX - self.counter();
        if elapsed_ms > u32::from(headroom) {
            self.set_counter(COUNTER_MAX);
        } else {
            self.set_counter(self.counter() + elapsed_ms as u16);
        }
    }

    fn decrement_counter(&mut self, elapsed_ms: u32) {
        if u32::from(self.counter()) < elapsed_ms {
            self.set_counter(0);
        } else {
            self.set_counter(self.counter() - elapsed_ms as u16);
        }
    }

    // Accumulate disagreement, then reset the counter once it reaches the
    // threshold. Returns whether it did.
    fn integrate(&mut self, elapsed_ms: u32, threshold: u32) -> bool {
        self.increment_counter(elapsed_ms);
        if u32::from(self.counter()) < threshold {
            return false;
        }
        self.set_counter(0);
        true
    }

    fn flip(&mut self) {
        let pressed = !self.pressed();
        self.set_pressed(pressed);
        self.set_changed(true);
        log::trace!("debounce flip: pressed={=bool}", pressed);
    }

    /// Debounces one switch.
    /// `active`: Is the switch currently pressed?
    /// `elapsed_ms`: Time elapsed since the previous update of this switch.
    /// `config`: Debounce settings.
    pub fn update(&mut self, active: bool, elapsed_ms: u32, config: &DebounceConfig) {
        // This uses a variation of the integrator debouncing described at
        // https://www.kennethkuhn.com/electronics/debounce.c
        // Every update where "active" does not match the current state, we increment
        // a counter, otherwise we decrement it. When the counter reaches a
        // threshold, the state flips and we reset the counter.
        self.set_changed(false);

        if self.pressed() == active {
            self.decrement_counter(elapsed_ms);
            return;
        }

        let flip = match config.policy() {
            Policy::Deferred => self.integrate(elapsed_ms, config.flip_threshold(self.pressed())),
            // An empty counter means the disagreement just started: flip now
            // and keep the seed, so that flipping back takes the sum of both
            // delays.
            Policy::Eager if self.counter() == 0 => {
                self.set_counter(config.eager_seed(self.pressed()));
                true
            }
            Policy::Eager => self.integrate(elapsed_ms, config.eager_threshold()),
        };

        if flip {
            self.flip();
        }
    }

    /// Returns whether the switch is either latched as pressed or it is potentially
    /// pressed but the debouncer has not yet made a decision. If this returns true,
    /// the kscan driver should continue to poll quickly.
    pub fn is_active(&self) -> bool {
        self.pressed() || self.counter() > 0
    }
}

/// Debounces one switch, see [`DebounceState::update`].
pub fn update(state: &mut DebounceState, active: bool, elapsed_ms: u32, config: &DebounceConfig) {
    state.update(active, elapsed_ms, config);
}

/// See [`DebounceState::is_active`].
pub fn is_active(state: &DebounceState) -> bool {
    state.is_active()
}

/// Debounced state of the switch.
pub fn is_pressed(state: &DebounceState) -> bool {
    state.pressed()
}

/// Whether the last update flipped the debounced state.
pub fn get_changed(state: &DebounceState) -> bool {
    state.changed()
}
