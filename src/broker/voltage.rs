// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Voltage domain protocol handlers and the two-backend dispatch.
//!
//! A domain is served either by a fixed rail on the power controller or by
//! a programmable PMIC regulator; both answer the same four operations.
//! Dispatch is a match on the descriptor's backend tag, so a new backend
//! kind is a new variant and a new arm, checked exhaustively at compile
//! time.

use crate::{
    broker::Broker,
    catalog::{AgentId, RailId, VoltdBackend},
    platform::{Platform, PmicDriver, RailDriver},
    policy::AccessPolicy,
    scmi::{LevelPage, ScmiError, ScmiResult, VoltdConfig},
};
use log::{debug, trace};

/// Levels travel as microvolts on the wire; the drivers speak millivolts.
const UV_PER_MV: i64 = 1000;

impl<P: Platform> Broker<P> {
    /// Number of voltage domains exposed to the agent.
    pub fn voltd_count(&self, agent: AgentId) -> usize {
        self.catalog.voltd_count(agent)
    }

    /// Name of a voltage domain.
    ///
    /// Names are visible regardless of policy; only level and state
    /// operations are gated.
    pub fn voltd_name(&self, agent: AgentId, scmi_id: u32) -> ScmiResult<&'static str> {
        let voltd = self.catalog.voltd(agent, scmi_id).ok_or(ScmiError::NotFound)?;

        Ok(voltd.name)
    }

    /// Copies one page of the domain's settable levels, ascending in
    /// microvolts, into `levels_uv`.
    ///
    /// The page starts at `start_index` into the full list and is truncated
    /// to the caller's capacity; the returned [`LevelPage`] reports both
    /// what was written and what remains.
    pub fn voltd_levels(
        &self,
        agent: AgentId,
        scmi_id: u32,
        start_index: usize,
        levels_uv: &mut [i64],
    ) -> ScmiResult<LevelPage> {
        let voltd = self.catalog.voltd(agent, scmi_id).ok_or(ScmiError::NotFound)?;

        match voltd.backend {
            VoltdBackend::Rail(rail) => self.rail_levels(rail, start_index, levels_uv),
            VoltdBackend::Pmic(regulator) => self.pmic_levels(regulator, start_index, levels_uv),
        }
    }

    /// Current level of a voltage domain in microvolts.
    ///
    /// Reports 0 for an unknown handle or a policy-denied regulator; an
    /// agent cannot tell those apart from a zero-volt reading, by design.
    pub fn voltd_level(&self, agent: AgentId, scmi_id: u32) -> i64 {
        let Some(voltd) = self.catalog.voltd(agent, scmi_id) else {
            return 0;
        };

        match voltd.backend {
            VoltdBackend::Rail(rail) => i64::from(self.rails.millivolts(rail)) * UV_PER_MV,
            VoltdBackend::Pmic(regulator) => self.pmic_level(regulator),
        }
    }

    /// Requests a voltage domain level in microvolts.
    pub fn voltd_set_level(&self, agent: AgentId, scmi_id: u32, level_uv: i64) -> ScmiResult<()> {
        let voltd = self.catalog.voltd(agent, scmi_id).ok_or(ScmiError::NotFound)?;

        match voltd.backend {
            VoltdBackend::Rail(rail) => self.rail_set_level(rail, level_uv),
            VoltdBackend::Pmic(regulator) => self.pmic_set_level(regulator, level_uv),
        }
    }

    /// Current operating mode of a voltage domain.
    pub fn voltd_config(&self, agent: AgentId, scmi_id: u32) -> ScmiResult<VoltdConfig> {
        let voltd = self.catalog.voltd(agent, scmi_id).ok_or(ScmiError::NotFound)?;

        let config = match voltd.backend {
            VoltdBackend::Rail(rail) => self.rail_config(rail),
            VoltdBackend::Pmic(regulator) => self.pmic_config(regulator),
        };

        Ok(config)
    }

    /// Requests a voltage domain operating mode.
    ///
    /// Only the architectural ON and OFF words are accepted.
    pub fn voltd_set_config(&self, agent: AgentId, scmi_id: u32, config: u32) -> ScmiResult<()> {
        let voltd = self.catalog.voltd(agent, scmi_id).ok_or(ScmiError::NotFound)?;
        let config =
            VoltdConfig::try_from(config).map_err(|_| ScmiError::InvalidParameters)?;
        let enable = config == VoltdConfig::On;

        match voltd.backend {
            VoltdBackend::Rail(rail) => {
                debug!(
                    "{} rail {} (was {})",
                    if enable { "Enable" } else { "Disable" },
                    voltd.name,
                    if self.rails.is_enabled(rail) { "on" } else { "off" }
                );
                self.rails.set_enabled(rail, enable);
                Ok(())
            }
            VoltdBackend::Pmic(regulator) => self.pmic_set_config(regulator, enable),
        }
    }

    // Fixed rails: the level is an attribute of the silicon, not a knob,
    // and rails are always visible to their agent.

    fn rail_levels(
        &self,
        rail: RailId,
        start_index: usize,
        levels_uv: &mut [i64],
    ) -> ScmiResult<LevelPage> {
        if start_index != 0 {
            return Err(ScmiError::InvalidParameters);
        }
        let Some(slot) = levels_uv.first_mut() else {
            return Err(ScmiError::GenericError);
        };

        *slot = i64::from(self.rails.millivolts(rail)) * UV_PER_MV;

        Ok(LevelPage {
            returned: 1,
            remaining: 0,
        })
    }

    fn rail_set_level(&self, rail: RailId, level_uv: i64) -> ScmiResult<()> {
        if level_uv != i64::from(self.rails.millivolts(rail)) * UV_PER_MV {
            return Err(ScmiError::InvalidParameters);
        }

        Ok(())
    }

    fn rail_config(&self, rail: RailId) -> VoltdConfig {
        if self.rails.is_enabled(rail) {
            VoltdConfig::On
        } else {
            VoltdConfig::Off
        }
    }

    // PMIC regulators: policy-gated, and every driver sequence runs under
    // the regulator bus lock.

    fn pmic_levels(
        &self,
        regulator: &'static str,
        start_index: usize,
        levels_uv: &mut [i64],
    ) -> ScmiResult<LevelPage> {
        if !self.policy.can_access_regulator(regulator) {
            return Err(ScmiError::Denied);
        }

        let pmic = self.pmic.lock();
        let levels_mv = pmic.levels_mv(regulator);

        let remaining = levels_mv
            .len()
            .checked_sub(start_index)
            .ok_or(ScmiError::GenericError)?;
        let returned = remaining.min(levels_uv.len());

        trace!(
            "{} levels: start {start_index} capacity {} output {returned}",
            levels_mv.len(),
            levels_uv.len()
        );

        for (slot, mv) in levels_uv
            .iter_mut()
            .zip(&levels_mv[start_index..start_index + returned])
        {
            *slot = i64::from(*mv) * UV_PER_MV;
        }

        Ok(LevelPage {
            returned,
            remaining: remaining - returned,
        })
    }

    fn pmic_level(&self, regulator: &'static str) -> i64 {
        if !self.policy.can_access_regulator(regulator) {
            return 0;
        }

        let pmic = self.pmic.lock();
        i64::from(pmic.voltage_mv(regulator)) * UV_PER_MV
    }

    fn pmic_set_level(&self, regulator: &'static str, level_uv: i64) -> ScmiResult<()> {
        if !self.policy.can_access_regulator(regulator) {
            return Err(ScmiError::Denied);
        }
        if level_uv < 0 || level_uv > i64::from(u16::MAX) * UV_PER_MV {
            return Err(ScmiError::InvalidParameters);
        }
        let level_mv = (level_uv / UV_PER_MV) as u16;

        debug!("Set regulator {regulator} level to {level_mv}mV");

        let pmic = self.pmic.lock();
        pmic.set_voltage_mv(regulator, level_mv)
            .map_err(|_| ScmiError::GenericError)
    }

    fn pmic_config(&self, regulator: &'static str) -> VoltdConfig {
        // A denied read must look like a switched-off domain.
        if !self.policy.can_access_regulator(regulator) {
            return VoltdConfig::Off;
        }

        let pmic = self.pmic.lock();
        if pmic.is_enabled(regulator) {
            VoltdConfig::On
        } else {
            VoltdConfig::Off
        }
    }

    fn pmic_set_config(&self, regulator: &'static str, enable: bool) -> ScmiResult<()> {
        if !self.policy.can_access_regulator(regulator) {
            return Err(ScmiError::Denied);
        }

        let pmic = self.pmic.lock();

        debug!(
            "{} regulator {regulator} (was {})",
            if enable { "Enable" } else { "Disable" },
            if pmic.is_enabled(regulator) { "on" } else { "off" }
        );

        let result = if enable {
            pmic.enable(regulator)
        } else {
            pmic.disable(regulator)
        };
        result.map_err(|_| ScmiError::GenericError)
    }
}
