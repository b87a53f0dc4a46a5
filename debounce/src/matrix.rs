/*
 * Copyright (c) 2021 The ZMK Contributors
 * Copyright (c) Merlin04
 *
 * SPDX-License-Identifier: MIT
 */

//! Debounce states of a whole scanned key matrix.
//!
//! Switches are indexed by the driven output line first and the sensed input
//! line second. Each switch is debounced on its own.

use crate::config::DebounceConfig;
use crate::debounce::DebounceState;
use crate::log;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MatrixError {
    OutOfRange { output: usize, input: usize },
}

impl core::fmt::Display for MatrixError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            MatrixError::OutOfRange { output, input } => {
                write!(f, "No switch at output {output}, input {input}")
            }
        }
    }
}

impl core::error::Error for MatrixError {}

/// A switch whose debounced state flipped during the last scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyChange {
    pub output: usize,
    pub input: usize,
    pub pressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceMatrix<const OUTPUTS: usize, const INPUTS: usize> {
    switches: [[DebounceState; INPUTS]; OUTPUTS],
}

impl<const OUTPUTS: usize, const INPUTS: usize> Default for DebounceMatrix<OUTPUTS, INPUTS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const OUTPUTS: usize, const INPUTS: usize> DebounceMatrix<OUTPUTS, INPUTS> {
    pub const fn new() -> Self {
        Self {
            switches: [[DebounceState::new(); INPUTS]; OUTPUTS],
        }
    }

    pub fn state(&self, output: usize, input: usize) -> Result<&DebounceState, MatrixError> {
        self.switches
            .get(output)
            .and_then(|inputs| inputs.get(input))
            .ok_or(MatrixError::OutOfRange { output, input })
    }

    fn state_mut(&mut self, output: usize, input: usize) -> Result<&mut DebounceState, MatrixError> {
        self.switches
            .get_mut(output)
            .and_then(|inputs| inputs.get_mut(input))
            .ok_or(MatrixError::OutOfRange { output, input })
    }

    /// Debounce a single switch. Returns whether its state flipped.
    pub fn update(
        &mut self,
        output: usize,
        input: usize,
        active: bool,
        elapsed_ms: u32,
        config: &DebounceConfig,
    ) -> Result<bool, MatrixError> {
        let state = self.state_mut(output, input).inspect_err(|_| {
            log::warning!("No switch at output={=usize} input={=usize}", output, input);
        })?;
        state.update(active, elapsed_ms, config);
        Ok(state.changed())
    }

    /// Read and debounce every switch, output by output.
    ///
    /// `read` is called once per switch with its output and input index and
    /// must return whether the switch is currently closed. Returns how many
    /// switches flipped.
    pub fn scan<F>(&mut self, elapsed_ms: u32, config: &DebounceConfig, mut read: F) -> usize
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut changed = 0;
        for (output, inputs) in self.switches.iter_mut().enumerate() {
            for (input, state) in inputs.iter_mut().enumerate() {
                state.update(read(output, input), elapsed_ms, config);
                if state.changed() {
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Switches that flipped on their last update.
    pub fn changes(&self) -> impl Iterator<Item = KeyChange> + '_ {
        self.switches.iter().enumerate().flat_map(|(output, inputs)| {
            inputs
                .iter()
                .enumerate()
                .filter(|(_, state)| state.changed())
                .map(move |(input, state)| KeyChange {
                    output,
                    input,
                    pressed: state.pressed(),
                })
        })
    }

    /// At least one key is pressed or the debouncer has not yet decided if
    /// it is pressed. Poll quickly until this turns false.
    pub fn is_active(&self) -> bool {
        self.switches.iter().flatten().any(DebounceState::is_active)
    }

    pub fn reset(&mut self) {
        self.switches.iter_mut().flatten().for_each(DebounceState::reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::Policy;

    type Matrix = DebounceMatrix<3, 4>;

    fn config() -> DebounceConfig {
        DebounceConfig::new(2, 2, Policy::Deferred).unwrap()
    }

    #[test]
    fn new_matrix_is_idle() {
        let matrix = Matrix::new();
        assert!(!matrix.is_active());
        assert_eq!(matrix.changes().count(), 0);
        assert_eq!(matrix, Matrix::default());
    }

    #[test]
    fn when_a_switch_is_held_it_is_reported_once() {
        let config = config();
        let mut matrix = Matrix::new();
        let closed = |output, input| (output, input) == (1, 2);

        assert_eq!(matrix.scan(1, &config, closed), 0);
        assert!(matrix.is_active());
        assert_eq!(matrix.scan(1, &config, closed), 1);
        assert_eq!(
            matrix.changes().collect::<Vec<_>>(),
            vec![KeyChange {
                output: 1,
                input: 2,
                pressed: true
            }]
        );

        assert_eq!(matrix.scan(1, &config, closed), 0);
        assert_eq!(matrix.changes().count(), 0);
        assert!(matrix.is_active());
    }

    #[test]
    fn when_a_switch_is_released_the_matrix_goes_idle() {
        let config = config();
        let mut matrix = Matrix::new();
        matrix.scan(2, &config, |output, input| output == 0 && input == 3);
        assert!(matrix.state(0, 3).unwrap().pressed());

        assert_eq!(matrix.scan(2, &config, |_, _| false), 1);
        let change = matrix.changes().next().unwrap();
        assert_eq!(
            change,
            KeyChange {
                output: 0,
                input: 3,
                pressed: false
            }
        );
        assert!(!matrix.is_active());
    }

    #[test]
    fn switches_are_debounced_independently() {
        let config = config();
        let mut matrix = Matrix::new();
        assert_eq!(matrix.update(0, 0, true, 1, &config), Ok(false));
        assert_eq!(matrix.update(2, 1, true, 2, &config), Ok(true));
        assert_eq!(matrix.state(0, 0).unwrap().counter(), 1);
        assert!(!matrix.state(0, 0).unwrap().pressed());
        assert!(matrix.state(2, 1).unwrap().pressed());
    }

    #[test]
    fn when_coordinates_are_out_of_range_it_fails() {
        let config = config();
        let mut matrix = Matrix::new();
        assert_eq!(
            matrix.update(3, 0, true, 1, &config),
            Err(MatrixError::OutOfRange { output: 3, input: 0 })
        );
        assert_eq!(
            matrix.state(0, 4),
            Err(MatrixError::OutOfRange { output: 0, input: 4 })
        );
        assert!(!matrix.is_active());
    }

    #[test]
    fn when_update_is_out_of_range_no_switch_is_touched() {
        let config = config();
        let mut matrix = Matrix::new();
        let error = matrix.update(0, 9, true, 5, &config).unwrap_err();
        assert_eq!(std::format!("{error}"), "No switch at output 0, input 9");
        assert_eq!(matrix, Matrix::new());
    }

    #[test]
    fn reset_clears_every_switch() {
        let config = config();
        let mut matrix = Matrix::new();
        matrix.scan(5, &config, |_, _| true);
        assert_eq!(matrix.changes().count(), 12);
        matrix.reset();
        assert!(!matrix.is_active());
        assert_eq!(matrix.changes().count(), 0);
    }
}
