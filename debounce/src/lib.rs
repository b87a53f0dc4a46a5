/*
 * Copyright (c) 2021 The ZMK Contributors
 * Copyright (c) Merlin04
 *
 * SPDX-License-Identifier: MIT
 */

//! Integrator debouncing of binary key switches.
//!
//! Meant to be called from a kscan loop once per scan for every switch. The
//! only time source is the elapsed time passed in by the caller:
//!
//! ```text
//!   [ kscan loop ] --(active, elapsed_ms)--> [ DebounceState::update ]
//!         A                                          |
//!         +----(pressed, changed, is_active)---------+
//! ```
//!
//! Two policies are available. Deferred waits for the input to settle
//! before flipping, eager flips on the first disagreement and then waits
//! before it allows flipping back. The `eager` feature makes the latter the
//! default.

#![cfg_attr(not(test), no_std)]

mod config;
mod debounce;
mod log;
mod matrix;

pub use config::{ConfigError, DebounceConfig, Policy};
pub use debounce::{get_changed, is_active, is_pressed, update, DebounceState, COUNTER_MAX};
pub use matrix::{DebounceMatrix, KeyChange, MatrixError};
