// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Per-agent resource tables and the built-once lookup arena.
//!
//! The position of a descriptor in its table is the SCMI handle the agent
//! addresses it with; tables are supplied as static configuration and never
//! change after the catalog is built. The only mutable state is the cached
//! agent-visible clock enable bit, which the broker owns.

use crate::scmi::{CLOCK_NAME_MAX, ProtocolId, RESET_NAME_MAX, VOLTD_NAME_MAX};
use arrayvec::ArrayVec;
use core::sync::atomic::{AtomicBool, Ordering};

/// Upper bound on the number of agents one catalog can serve.
pub const MAX_AGENT_COUNT: usize = 4;

/// Upper bound on the number of clocks exposed to one agent.
pub const MAX_CLOCKS_PER_AGENT: usize = 32;

/// Identifies a non-secure agent. Agents are densely numbered from zero.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AgentId(pub u32);

/// Identifier of a clock in the platform clock tree driver.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ClockId(pub u32);

/// Identifier of a reset line in the platform reset controller driver.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ResetId(pub u32);

/// Identifier of a fixed rail in the power controller driver.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RailId(pub u32);

/// How an exposed clock answers rate queries and rate-set requests.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RateControl {
    /// The rate is whatever the clock tree currently provides; a set
    /// request only succeeds as a confirmation of that rate.
    ReadOnly,
    /// Rate requests select a platform operating point (the CPU clock).
    OperatingPoint,
}

/// One clock exposed to an agent.
#[derive(Debug)]
pub struct ClockDesc {
    /// Identifier in the clock tree driver.
    pub clock_id: ClockId,
    /// Name exposed to the agent.
    pub name: &'static str,
    /// Agent-visible state the clock must start in.
    pub enabled_at_boot: bool,
    /// How rate queries and rate-set requests behave.
    pub rate_control: RateControl,
}

impl ClockDesc {
    /// Describes a clock with a read-only rate.
    pub const fn new(clock_id: ClockId, name: &'static str, enabled_at_boot: bool) -> Self {
        Self {
            clock_id,
            name,
            enabled_at_boot,
            rate_control: RateControl::ReadOnly,
        }
    }

    /// Describes a clock whose rate requests drive the operating-point
    /// selector.
    pub const fn with_operating_point(
        clock_id: ClockId,
        name: &'static str,
        enabled_at_boot: bool,
    ) -> Self {
        Self {
            clock_id,
            name,
            enabled_at_boot,
            rate_control: RateControl::OperatingPoint,
        }
    }
}

/// One reset line exposed to an agent.
#[derive(Debug)]
pub struct ResetDesc {
    /// Identifier in the reset controller driver.
    pub reset_id: ResetId,
    /// Name exposed to the agent.
    pub name: &'static str,
    /// The line is a level holding a co-processor in reset: explicit set
    /// and release are its only legal operations.
    pub hold_boot: bool,
}

impl ResetDesc {
    /// Describes an ordinary reset line.
    pub const fn new(reset_id: ResetId, name: &'static str) -> Self {
        Self {
            reset_id,
            name,
            hold_boot: false,
        }
    }

    /// Describes the co-processor hold-boot line.
    pub const fn new_hold_boot(reset_id: ResetId, name: &'static str) -> Self {
        Self {
            reset_id,
            name,
            hold_boot: true,
        }
    }
}

/// Which subsystem implements a voltage domain's operations.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VoltdBackend {
    /// A fixed rail on the power controller; its level is not a control
    /// knob.
    Rail(RailId),
    /// A programmable PMIC regulator, identified by its driver name.
    Pmic(&'static str),
}

/// One voltage domain exposed to an agent.
#[derive(Debug)]
pub struct VoltdDesc {
    /// Name exposed to the agent.
    pub name: &'static str,
    /// The subsystem serving this domain.
    pub backend: VoltdBackend,
}

impl VoltdDesc {
    /// Describes a voltage domain.
    pub const fn new(name: &'static str, backend: VoltdBackend) -> Self {
        Self { name, backend }
    }
}

/// The resources one agent sees, each table in SCMI handle order.
#[derive(Debug)]
pub struct AgentResources {
    /// Clocks, indexed by clock handle.
    pub clocks: &'static [ClockDesc],
    /// Reset lines, indexed by reset domain handle.
    pub resets: &'static [ResetDesc],
    /// Voltage domains, indexed by domain handle.
    pub voltds: &'static [VoltdDesc],
}

impl AgentResources {
    /// An agent exposing no resources of any kind.
    pub const EMPTY: Self = Self {
        clocks: &[],
        resets: &[],
        voltds: &[],
    };
}

/// Configuration faults detected while building the catalog.
///
/// Any of these aborts initialization; none can occur at runtime.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CatalogError {
    /// A name is empty or not strictly shorter than its protocol's limit.
    BadName {
        /// Agent owning the offending table.
        agent: AgentId,
        /// Protocol of the offending table.
        protocol: ProtocolId,
        /// Handle of the offending entry.
        scmi_id: u32,
    },
    /// Two entries of one agent-protocol table share a name.
    DuplicateName {
        /// Agent owning the offending table.
        agent: AgentId,
        /// Protocol of the offending table.
        protocol: ProtocolId,
        /// Handle of the second entry wearing the name.
        scmi_id: u32,
    },
    /// A table exceeds the fixed catalog capacity.
    Overflow,
}

/// The built-once resource arena.
#[derive(Debug)]
pub struct Catalog {
    agents: &'static [AgentResources],
    clock_flags: ArrayVec<ArrayVec<AtomicBool, MAX_CLOCKS_PER_AGENT>, MAX_AGENT_COUNT>,
}

impl Catalog {
    /// Builds and validates the catalog.
    ///
    /// Every name must be non-empty, strictly shorter than its protocol's
    /// size limit and unique within its table. A violation fails
    /// construction and is expected to be treated as fatal by the caller;
    /// names are never truncated to fit.
    pub fn new(agents: &'static [AgentResources]) -> Result<Self, CatalogError> {
        if agents.len() > MAX_AGENT_COUNT {
            return Err(CatalogError::Overflow);
        }

        let mut clock_flags = ArrayVec::new();
        for (agent_index, resources) in agents.iter().enumerate() {
            let agent = AgentId(agent_index as u32);

            validate_names(
                agent,
                ProtocolId::Clock,
                resources.clocks.iter().map(|clock| clock.name),
                CLOCK_NAME_MAX,
            )?;
            validate_names(
                agent,
                ProtocolId::ResetDomain,
                resources.resets.iter().map(|reset| reset.name),
                RESET_NAME_MAX,
            )?;
            validate_names(
                agent,
                ProtocolId::VoltageDomain,
                resources.voltds.iter().map(|voltd| voltd.name),
                VOLTD_NAME_MAX,
            )?;

            if resources.clocks.len() > MAX_CLOCKS_PER_AGENT {
                return Err(CatalogError::Overflow);
            }
            let mut flags = ArrayVec::new();
            for clock in resources.clocks {
                flags.push(AtomicBool::new(clock.enabled_at_boot));
            }
            clock_flags.push(flags);
        }

        Ok(Self {
            agents,
            clock_flags,
        })
    }

    fn resources(&self, agent: AgentId) -> Option<&'static AgentResources> {
        self.agents.get(agent.0 as usize)
    }

    /// Number of clocks exposed to the agent; 0 for an unknown agent.
    pub fn clock_count(&self, agent: AgentId) -> usize {
        self.resources(agent).map_or(0, |r| r.clocks.len())
    }

    /// Number of reset lines exposed to the agent; 0 for an unknown agent.
    pub fn reset_count(&self, agent: AgentId) -> usize {
        self.resources(agent).map_or(0, |r| r.resets.len())
    }

    /// Number of voltage domains exposed to the agent; 0 for an unknown
    /// agent.
    pub fn voltd_count(&self, agent: AgentId) -> usize {
        self.resources(agent).map_or(0, |r| r.voltds.len())
    }

    /// Looks up the clock the agent addresses as `scmi_id`.
    pub fn clock(&self, agent: AgentId, scmi_id: u32) -> Option<&'static ClockDesc> {
        self.resources(agent)?.clocks.get(scmi_id as usize)
    }

    /// Looks up the reset line the agent addresses as `scmi_id`.
    pub fn reset(&self, agent: AgentId, scmi_id: u32) -> Option<&'static ResetDesc> {
        self.resources(agent)?.resets.get(scmi_id as usize)
    }

    /// Looks up the voltage domain the agent addresses as `scmi_id`.
    pub fn voltd(&self, agent: AgentId, scmi_id: u32) -> Option<&'static VoltdDesc> {
        self.resources(agent)?.voltds.get(scmi_id as usize)
    }

    /// Cached agent-visible state of a clock; false for an unknown handle.
    pub(crate) fn clock_enabled(&self, agent: AgentId, scmi_id: u32) -> bool {
        self.clock_flag(agent, scmi_id)
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Updates the cached agent-visible state of a clock.
    pub(crate) fn set_clock_enabled(&self, agent: AgentId, scmi_id: u32, enabled: bool) {
        if let Some(flag) = self.clock_flag(agent, scmi_id) {
            flag.store(enabled, Ordering::Relaxed);
        }
    }

    fn clock_flag(&self, agent: AgentId, scmi_id: u32) -> Option<&AtomicBool> {
        self.clock_flags.get(agent.0 as usize)?.get(scmi_id as usize)
    }

    /// Number of protocols for which at least one agent exposes resources.
    ///
    /// Cross-checked against the advertised protocol list in debug builds.
    pub(crate) fn served_protocol_count(&self) -> usize {
        let clocks = self.agents.iter().any(|r| !r.clocks.is_empty());
        let resets = self.agents.iter().any(|r| !r.resets.is_empty());
        let voltds = self.agents.iter().any(|r| !r.voltds.is_empty());

        usize::from(clocks) + usize::from(resets) + usize::from(voltds)
    }
}

fn validate_names(
    agent: AgentId,
    protocol: ProtocolId,
    names: impl Iterator<Item = &'static str> + Clone,
    limit: usize,
) -> Result<(), CatalogError> {
    for (index, name) in names.clone().enumerate() {
        let scmi_id = index as u32;
        if name.is_empty() || name.len() >= limit {
            return Err(CatalogError::BadName {
                agent,
                protocol,
                scmi_id,
            });
        }
        if names.clone().take(index).any(|earlier| earlier == name) {
            return Err(CatalogError::DuplicateName {
                agent,
                protocol,
                scmi_id,
            });
        }
    }
    Ok(())
}
