// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! The access-policy oracle gating every agent request.

use crate::catalog::{ClockId, ResetId};

/// Decides whether the currently connected non-secure agent may touch a
/// given resource.
///
/// Verdicts can depend on mutable system security state, such as which
/// resources secure boot assigned to the non-secure world, so the broker
/// re-evaluates the policy on every request and never caches an answer.
/// Implementations must be side-effect free and callable without any
/// prerequisite locking.
pub trait AccessPolicy {
    /// Returns whether the agent may read or alter the given clock.
    fn can_access_clock(&self, clock_id: ClockId) -> bool;

    /// Returns whether the agent may read or alter the given reset line.
    fn can_access_reset(&self, reset_id: ResetId) -> bool;

    /// Returns whether the agent may read or alter the PMIC regulator known
    /// to the regulator driver under `regulator`.
    fn can_access_regulator(&self, regulator: &str) -> bool;
}
