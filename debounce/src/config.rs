/*
 * Copyright (c) 2021 The ZMK Contributors
 * Copyright (c) Merlin04
 *
 * SPDX-License-Identifier: MIT
 */

//! Timing configuration shared by the switches.

use crate::debounce::COUNTER_MAX;

const DEFAULT_PRESS_MS: u16 = 5;
const DEFAULT_RELEASE_MS: u16 = 5;

/// When the debounced state is allowed to flip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Policy {
    /// Flip once the input disagreed for the whole delay of the target
    /// direction.
    Deferred,
    /// Flip on the first disagreement, then require the sum of both delays
    /// before flipping again.
    Eager,
}

impl Default for Policy {
    fn default() -> Self {
        if cfg!(feature = "eager") {
            Policy::Eager
        } else {
            Policy::Deferred
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    PressDelayTooLong(u16),
    ReleaseDelayTooLong(u16),
    CombinedDelayTooLong(u32),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            ConfigError::PressDelayTooLong(ms) => {
                write!(f, "Press delay of {ms} ms exceeds {COUNTER_MAX} ms")
            }
            ConfigError::ReleaseDelayTooLong(ms) => {
                write!(f, "Release delay of {ms} ms exceeds {COUNTER_MAX} ms")
            }
            ConfigError::CombinedDelayTooLong(ms) => {
                write!(f, "Combined eager delay of {ms} ms exceeds {COUNTER_MAX} ms")
            }
        }
    }
}

impl core::error::Error for ConfigError {}

/// Debounce delays and policy.
///
/// Delays are in the same unit as the elapsed time passed to
/// [`DebounceState::update`](crate::DebounceState::update), usually
/// milliseconds. Zero disables debouncing in that direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceConfig {
    press_ms: u16,
    release_ms: u16,
    policy: Policy,
}

impl DebounceConfig {
    /// Report presses right away, filter only the release.
    ///
    /// See <https://zmk.dev/docs/features/debouncing>.
    pub const INSTANT_ACTIVATE: Self = Self {
        press_ms: 0,
        release_ms: 1,
        policy: Policy::Deferred,
    };

    /// Both delays must fit the counter. With the eager policy the counter
    /// has to reach their sum, so the sum must fit too.
    pub const fn new(press_ms: u16, release_ms: u16, policy: Policy) -> Result<Self, ConfigError> {
        if press_ms > COUNTER_MAX {
            return Err(ConfigError::PressDelayTooLong(press_ms));
        }
        if release_ms > COUNTER_MAX {
            return Err(ConfigError::ReleaseDelayTooLong(release_ms));
        }
        if matches!(policy, Policy::Eager) {
            let combined = press_ms as u32 + release_ms as u32;
            if combined > COUNTER_MAX as u32 {
                return Err(ConfigError::CombinedDelayTooLong(combined));
            }
        }
        Ok(Self {
            press_ms,
            release_ms,
            policy,
        })
    }

    pub const fn press_ms(&self) -> u16 {
        self.press_ms
    }

    pub const fn release_ms(&self) -> u16 {
        self.release_ms
    }

    pub const fn policy(&self) -> Policy {
        self.policy
    }

    // Deferred: the delay needed to move away from the current state.
    pub(crate) fn flip_threshold(&self, pressed: bool) -> u32 {
        let threshold = if pressed {
            self.release_ms
        } else {
            self.press_ms
        };
        u32::from(threshold)
    }

    // Eager: the counter is seeded with the current direction's delay, not
    // the target's. The flip after it needs both. Never above COUNTER_MAX,
    // `new` bounds both delays.
    pub(crate) fn eager_seed(&self, pressed: bool) -> u16 {
        if pressed {
            self.press_ms
        } else {
            self.release_ms
        }
    }

    pub(crate) fn eager_threshold(&self) -> u32 {
        u32::from(self.press_ms) + u32::from(self.release_ms)
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            press_ms: DEFAULT_PRESS_MS,
            release_ms: DEFAULT_RELEASE_MS,
            policy: Policy::default(),
        }
    }
}
