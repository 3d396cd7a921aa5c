// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! The narrow hardware contracts the broker drives.
//!
//! Each trait covers exactly the operations the protocol handlers need;
//! everything else about the underlying drivers stays on the platform side.
//! A platform wires concrete implementations into the broker through
//! [`Platform`].


use crate::{
    catalog::{ClockId, RailId, ResetId},
    policy::AccessPolicy,
};

/// Opaque failure reported by a hardware driver call.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DriverError;

/// Clock tree operations.
pub trait ClockDriver {
    /// Ungates the clock.
    fn enable(&self, clock_id: ClockId);

    /// Gates the clock.
    fn disable(&self, clock_id: ClockId);

    /// Current rate of the clock in hertz.
    fn rate(&self, clock_id: ClockId) -> u64;

    /// Moves the platform to the operating point requested in kilohertz.
    fn set_operating_point(&self, khz: u32) -> Result<(), DriverError>;
}

/// Reset controller operations.
pub trait ResetDriver {
    /// Asserts the line, waiting at most `timeout_us` for it to latch.
    fn assert(&self, reset_id: ResetId, timeout_us: u32) -> Result<(), DriverError>;

    /// Deasserts the line, waiting at most `timeout_us` for it to release.
    fn deassert(&self, reset_id: ResetId, timeout_us: u32) -> Result<(), DriverError>;

    /// Asserts the line without waiting for it to latch.
    fn set(&self, reset_id: ResetId);

    /// Deasserts the line without waiting for it to release.
    fn release(&self, reset_id: ResetId);

    /// Drives the co-processor hold-boot level.
    fn set_hold_boot(&self, asserted: bool);
}

/// Power-controller operations for the fixed rails.
pub trait RailDriver {
    /// The rail's level in millivolts. Fixed by the silicon, not settable.
    fn millivolts(&self, rail: RailId) -> u16;

    /// Whether the rail is currently powered.
    fn is_enabled(&self, rail: RailId) -> bool;

    /// Powers the rail on or off.
    fn set_enabled(&self, rail: RailId, enable: bool);
}

/// PMIC regulator operations, keyed by the driver's regulator name.
///
/// The broker holds the implementation behind a lock of its own and takes it
/// for the duration of each read-modify-write sequence, so implementations
/// see at most one call sequence at a time from this crate.
pub trait PmicDriver {
    /// The regulator's settable levels in millivolts, ascending.
    fn levels_mv(&self, regulator: &str) -> &[u16];

    /// Current level of the regulator in millivolts.
    fn voltage_mv(&self, regulator: &str) -> u16;

    /// Programs the regulator level in millivolts.
    fn set_voltage_mv(&self, regulator: &str, mv: u16) -> Result<(), DriverError>;

    /// Whether the regulator output is enabled.
    fn is_enabled(&self, regulator: &str) -> bool;

    /// Enables the regulator output.
    fn enable(&self, regulator: &str) -> Result<(), DriverError>;

    /// Disables the regulator output.
    fn disable(&self, regulator: &str) -> Result<(), DriverError>;
}

/// The capability bundle a platform wires into the broker.
pub trait Platform {
    /// Access-policy oracle implementation.
    type Policy: AccessPolicy;

    /// Clock tree driver implementation.
    type Clocks: ClockDriver;

    /// Reset controller driver implementation.
    type Resets: ResetDriver;

    /// Power-controller rail driver implementation.
    type Rails: RailDriver;

    /// PMIC regulator driver implementation.
    type Pmic: PmicDriver;
}
