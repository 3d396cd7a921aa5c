// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Reset domain protocol handlers.

use crate::{
    broker::Broker,
    catalog::AgentId,
    platform::{Platform, ResetDriver},
    policy::AccessPolicy,
    scmi::{ScmiError, ScmiResult},
};
use log::debug;

/// Wall-clock budget for each step of an autonomous reset cycle.
const TOGGLE_TIMEOUT_US: u32 = 1000;

impl<P: Platform> Broker<P> {
    /// Number of reset lines exposed to the agent.
    pub fn reset_count(&self, agent: AgentId) -> usize {
        self.catalog.reset_count(agent)
    }

    /// Name of a reset line.
    ///
    /// A line the policy currently refuses the agent reports as
    /// nonexistent, not merely inaccessible.
    pub fn reset_name(&self, agent: AgentId, scmi_id: u32) -> ScmiResult<&'static str> {
        let reset = self.catalog.reset(agent, scmi_id).ok_or(ScmiError::NotFound)?;
        if !self.policy.can_access_reset(reset.reset_id) {
            return Err(ScmiError::NotFound);
        }

        Ok(reset.name)
    }

    /// Cycles a reset line: assert, then deassert.
    ///
    /// Only the context-loss variant is implemented; a `state` requesting
    /// preserved context is refused, as is cycling the hold-boot line.
    /// Either step exceeding its deadline reports a hardware error and is
    /// not retried.
    pub fn reset_autonomous(&self, agent: AgentId, scmi_id: u32, state: u32) -> ScmiResult<()> {
        let reset = self.catalog.reset(agent, scmi_id).ok_or(ScmiError::NotFound)?;
        if !self.policy.can_access_reset(reset.reset_id) {
            return Err(ScmiError::Denied);
        }
        if reset.hold_boot {
            return Err(ScmiError::NotSupported);
        }
        if state != 0 {
            return Err(ScmiError::NotSupported);
        }

        debug!("SCMI reset {scmi_id} cycle");

        self.resets
            .assert(reset.reset_id, TOGGLE_TIMEOUT_US)
            .map_err(|_| ScmiError::HardwareError)?;
        self.resets
            .deassert(reset.reset_id, TOGGLE_TIMEOUT_US)
            .map_err(|_| ScmiError::HardwareError)?;

        Ok(())
    }

    /// Explicitly asserts or releases a reset line.
    ///
    /// The hold-boot line is a level: the request drives the hold level
    /// through its dedicated control instead of pulsing the reset signal.
    pub fn reset_set_state(&self, agent: AgentId, scmi_id: u32, assert: bool) -> ScmiResult<()> {
        let reset = self.catalog.reset(agent, scmi_id).ok_or(ScmiError::NotFound)?;
        if !self.policy.can_access_reset(reset.reset_id) {
            return Err(ScmiError::Denied);
        }

        if reset.hold_boot {
            debug!(
                "SCMI hold boot {}",
                if assert { "set" } else { "release" }
            );
            self.resets.set_hold_boot(assert);
            return Ok(());
        }

        if assert {
            debug!("SCMI reset {scmi_id} set");
            self.resets.set(reset.reset_id);
        } else {
            debug!("SCMI reset {scmi_id} release");
            self.resets.release(reset.reset_id);
        }

        Ok(())
    }
}
