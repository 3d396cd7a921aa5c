// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! The resource broker serving decoded SCMI requests.

mod clock;
mod reset;
mod voltage;

use crate::{
    catalog::{AgentId, AgentResources, Catalog, CatalogError},
    platform::{ClockDriver, Platform},
    policy::AccessPolicy,
    scmi::ProtocolId,
};
use log::info;
use spin::mutex::SpinMutex;

/// Identification string reported for the base-protocol vendor query.
pub const VENDOR: &str = "RF-A";

/// Identification string reported for the base-protocol sub-vendor query.
pub const SUB_VENDOR: &str = "";

/// Protocols this broker serves, advertised identically to every agent.
///
/// The list is static; which resources an agent actually sees under each
/// protocol comes from its catalog partition.
const PROTOCOL_LIST: &[ProtocolId] = &[
    ProtocolId::Clock,
    ProtocolId::ResetDomain,
    ProtocolId::VoltageDomain,
];

/// One agent's transport binding.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AgentChannel {
    /// Name the agent is advertised under.
    pub agent_name: &'static str,
    /// Physical base address of the agent's shared-memory slot.
    pub shm_base: usize,
    /// Size in bytes of the agent's shared-memory slot.
    pub shm_size: usize,
}

/// The secure-side resource broker.
///
/// One instance serves every configured agent. The transport decodes each
/// message and calls the method matching the operation; every call runs to
/// completion before the next, and every answer is one of the SCMI status
/// words plus its payload.
pub struct Broker<P: Platform> {
    policy: P::Policy,
    clocks: P::Clocks,
    resets: P::Resets,
    rails: P::Rails,
    /// The one shared mutable hardware resource. Each regulator sequence
    /// takes the lock and drops it on every exit path.
    pmic: SpinMutex<P::Pmic>,
    catalog: Catalog,
    channels: &'static [AgentChannel],
}

impl<P: Platform> Broker<P> {
    /// Builds the broker from its static tables and platform capabilities.
    ///
    /// Validates the resource tables (a [`CatalogError`] is a configuration
    /// fault the caller should treat as fatal) and synchronizes
    /// boot-enabled clocks with their advertised initial state before the
    /// first request can observe them.
    pub fn new(
        agents: &'static [AgentResources],
        channels: &'static [AgentChannel],
        policy: P::Policy,
        clocks: P::Clocks,
        resets: P::Resets,
        rails: P::Rails,
        pmic: P::Pmic,
    ) -> Result<Self, CatalogError> {
        let catalog = Catalog::new(agents)?;

        for resources in agents {
            for clock in resources.clocks {
                if clock.enabled_at_boot && policy.can_access_clock(clock.clock_id) {
                    clocks.enable(clock.clock_id);
                }
            }
        }

        info!("SCMI broker serving {} agents", channels.len());

        Ok(Self {
            policy,
            clocks,
            resets,
            rails,
            pmic: SpinMutex::new(pmic),
            catalog,
            channels,
        })
    }

    /// Number of configured agents.
    pub fn agent_count(&self) -> usize {
        self.channels.len()
    }

    /// The transport binding of an agent.
    ///
    /// `agent` must be below [`agent_count`](Self::agent_count); the
    /// transport validates ids before decoding, so an out-of-range id here
    /// is a caller bug, not an agent-visible error.
    pub fn channel(&self, agent: AgentId) -> &AgentChannel {
        &self.channels[agent.0 as usize]
    }

    /// The protocols served, independent of the requesting agent.
    ///
    /// The advertised list and the configured tables must agree; debug
    /// builds verify that each listed protocol has resources somewhere.
    pub fn protocol_list(&self) -> &'static [ProtocolId] {
        debug_assert_eq!(PROTOCOL_LIST.len(), self.catalog.served_protocol_count());

        PROTOCOL_LIST
    }

    /// Number of protocols served.
    pub fn protocol_count(&self) -> usize {
        self.protocol_list().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{ClockDesc, ClockId, RailId, ResetDesc, ResetId, VoltdBackend, VoltdDesc},
        platform::test::{TEST_CHANNELS, TestFixture},
    };

    static CLOCKS: [ClockDesc; 2] = [
        ClockDesc::new(ClockId(0), "ck_hse", true),
        ClockDesc::new(ClockId(1), "rng1_k", false),
    ];
    static RESETS: [ResetDesc; 1] = [ResetDesc::new(ResetId(0), "usart1")];
    static VOLTDS: [VoltdDesc; 1] = [VoltdDesc::new("reg11", VoltdBackend::Rail(RailId(0)))];

    static AGENTS: [AgentResources; 2] = [
        AgentResources {
            clocks: &CLOCKS,
            resets: &RESETS,
            voltds: &VOLTDS,
        },
        AgentResources {
            clocks: &CLOCKS,
            resets: &[],
            voltds: &[],
        },
    ];

    #[test]
    fn advertises_the_static_protocol_list() {
        let fixture = TestFixture::default();
        let broker = fixture.broker(&AGENTS);

        assert_eq!(broker.protocol_count(), 3);
        assert_eq!(
            broker.protocol_list(),
            &[
                ProtocolId::Clock,
                ProtocolId::ResetDomain,
                ProtocolId::VoltageDomain,
            ]
        );
    }

    #[test]
    fn channels_map_agents_to_their_slots() {
        let fixture = TestFixture::default();
        let broker = fixture.broker(&AGENTS);

        assert_eq!(broker.agent_count(), 2);
        assert_eq!(broker.channel(AgentId(0)).agent_name, "test-agent-0");
        assert_eq!(broker.channel(AgentId(1)).shm_base, 0x2fff_f200);
        assert_eq!(
            broker.channel(AgentId(0)).shm_size,
            TEST_CHANNELS[0].shm_size
        );
    }

    #[test]
    fn boot_sync_enables_accessible_boot_clocks_only() {
        let fixture = TestFixture::default();
        let _broker = fixture.broker(&AGENTS);

        // ck_hse is boot-enabled in both agents' tables; rng1_k is not.
        assert_eq!(fixture.clocks.enable_calls(), 2);
        assert_eq!(fixture.clocks.disable_calls(), 0);
    }

    #[test]
    fn boot_sync_respects_the_policy() {
        let fixture = TestFixture::default();
        fixture.policy.deny_clock(ClockId(0));
        let _broker = fixture.broker(&AGENTS);

        assert_eq!(fixture.clocks.enable_calls(), 0);
    }
}
