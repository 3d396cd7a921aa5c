// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Clock protocol handlers.

use crate::{
    broker::Broker,
    catalog::{AgentId, RateControl},
    platform::{ClockDriver, Platform},
    policy::AccessPolicy,
    scmi::{RateStepRange, ScmiError, ScmiResult},
};
use log::debug;

impl<P: Platform> Broker<P> {
    /// Number of clocks exposed to the agent.
    pub fn clock_count(&self, agent: AgentId) -> usize {
        self.catalog.clock_count(agent)
    }

    /// Name of a clock.
    ///
    /// A clock the policy currently refuses the agent reports as
    /// nonexistent, not merely inaccessible.
    pub fn clock_name(&self, agent: AgentId, scmi_id: u32) -> ScmiResult<&'static str> {
        let clock = self.catalog.clock(agent, scmi_id).ok_or(ScmiError::NotFound)?;
        if !self.policy.can_access_clock(clock.clock_id) {
            return Err(ScmiError::NotFound);
        }

        Ok(clock.name)
    }

    /// Enumeration of discrete clock rates.
    ///
    /// Not exposed on this platform; agents learn the settable range from
    /// [`clock_rate_range`](Self::clock_rate_range) instead.
    pub fn clock_discrete_rates(
        &self,
        _agent: AgentId,
        _scmi_id: u32,
        _start_index: usize,
        _rates_hz: &mut [u64],
    ) -> ScmiResult<usize> {
        Err(ScmiError::NotSupported)
    }

    /// The settable rate range of a clock, as a min/max/step triplet.
    pub fn clock_rate_range(&self, agent: AgentId, scmi_id: u32) -> ScmiResult<RateStepRange> {
        let clock = self.catalog.clock(agent, scmi_id).ok_or(ScmiError::NotFound)?;
        if !self.policy.can_access_clock(clock.clock_id) {
            return Err(ScmiError::Denied);
        }

        let range = match clock.rate_control {
            // Advertise an open range; rate-set requests reject whatever the
            // operating-point table cannot honor.
            RateControl::OperatingPoint => RateStepRange {
                min_hz: 0,
                max_hz: u32::MAX.into(),
                step_hz: 1,
            },
            RateControl::ReadOnly => {
                let rate_hz = self.clocks.rate(clock.clock_id);
                RateStepRange {
                    min_hz: rate_hz,
                    max_hz: rate_hz,
                    step_hz: 0,
                }
            }
        };

        Ok(range)
    }

    /// Current rate of a clock in hertz.
    ///
    /// Reports 0 for an unknown handle or a policy-denied clock; an agent
    /// cannot tell those apart from a stopped clock, by design.
    pub fn clock_rate(&self, agent: AgentId, scmi_id: u32) -> u64 {
        let Some(clock) = self.catalog.clock(agent, scmi_id) else {
            return 0;
        };
        if !self.policy.can_access_clock(clock.clock_id) {
            return 0;
        }

        self.clocks.rate(clock.clock_id)
    }

    /// Requests a clock rate in hertz.
    ///
    /// For the operating-point clock this selects the nearest platform
    /// operating point, in kilohertz granularity; for every other clock the
    /// request only succeeds as a confirmation of the current rate.
    pub fn clock_set_rate(&self, agent: AgentId, scmi_id: u32, rate_hz: u64) -> ScmiResult<()> {
        let clock = self.catalog.clock(agent, scmi_id).ok_or(ScmiError::NotFound)?;
        if !self.policy.can_access_clock(clock.clock_id) {
            return Err(ScmiError::Denied);
        }

        match clock.rate_control {
            RateControl::OperatingPoint => {
                let khz =
                    u32::try_from(rate_hz / 1000).map_err(|_| ScmiError::InvalidParameters)?;
                self.clocks
                    .set_operating_point(khz)
                    .map_err(|_| ScmiError::InvalidParameters)?;
            }
            RateControl::ReadOnly => {
                if rate_hz != self.clocks.rate(clock.clock_id) {
                    return Err(ScmiError::InvalidParameters);
                }
            }
        }

        Ok(())
    }

    /// Agent-visible state of a clock.
    ///
    /// Reads the broker's cached enable bit, never the hardware. Reports
    /// disabled for an unknown handle or a policy-denied clock.
    pub fn clock_state(&self, agent: AgentId, scmi_id: u32) -> bool {
        let Some(clock) = self.catalog.clock(agent, scmi_id) else {
            return false;
        };
        if !self.policy.can_access_clock(clock.clock_id) {
            return false;
        }

        self.catalog.clock_enabled(agent, scmi_id)
    }

    /// Enables or disables a clock on behalf of the agent.
    ///
    /// Only a real transition touches the hardware: repeating the current
    /// state is a successful no-op, so the underlying gate is toggled at
    /// most once however often an agent repeats itself.
    pub fn clock_set_state(&self, agent: AgentId, scmi_id: u32, enable: bool) -> ScmiResult<()> {
        let clock = self.catalog.clock(agent, scmi_id).ok_or(ScmiError::NotFound)?;
        if !self.policy.can_access_clock(clock.clock_id) {
            return Err(ScmiError::Denied);
        }

        if enable != self.catalog.clock_enabled(agent, scmi_id) {
            if enable {
                debug!("SCMI clock {scmi_id} enable");
                self.clocks.enable(clock.clock_id);
            } else {
                debug!("SCMI clock {scmi_id} disable");
                self.clocks.disable(clock.clock_id);
            }
            self.catalog.set_clock_enabled(agent, scmi_id, enable);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{AgentResources, ClockDesc, ClockId},
        platform::test::TestFixture,
    };

    const CK_HSE: ClockId = ClockId(3);
    const CK_MPU: ClockId = ClockId(8);
    const CK_RNG: ClockId = ClockId(19);

    const HSE_HZ: u64 = 24_000_000;

    static CLOCKS: [ClockDesc; 3] = [
        ClockDesc::new(CK_HSE, "ck_hse", true),
        ClockDesc::with_operating_point(CK_MPU, "ck_mpu", true),
        ClockDesc::new(CK_RNG, "rng1_k", false),
    ];

    static AGENTS: [AgentResources; 1] = [AgentResources {
        clocks: &CLOCKS,
        resets: &[],
        voltds: &[],
    }];

    /// Fixture with rates loaded; two boot-sync enable calls are on the
    /// clock counter before any test request runs.
    fn fixture() -> (TestFixture, usize) {
        let fixture = TestFixture::default();
        fixture.clocks.set_rate(CK_HSE, HSE_HZ);
        fixture.clocks.set_rate(CK_MPU, 650_000_000);
        (fixture, 2)
    }

    #[test]
    fn out_of_range_handles_are_not_found() {
        let (fixture, _) = fixture();
        let broker = fixture.broker(&AGENTS);

        assert_eq!(broker.clock_count(AgentId(0)), 3);
        assert_eq!(broker.clock_name(AgentId(0), 3), Err(ScmiError::NotFound));
        assert_eq!(
            broker.clock_set_state(AgentId(0), 3, true),
            Err(ScmiError::NotFound)
        );
        // Unknown agents expose no clocks at all.
        assert_eq!(broker.clock_count(AgentId(7)), 0);
        assert_eq!(broker.clock_name(AgentId(7), 0), Err(ScmiError::NotFound));
    }

    #[test]
    fn denied_clocks_report_as_nonexistent_by_name() {
        let (fixture, _) = fixture();
        let broker = fixture.broker(&AGENTS);

        assert_eq!(broker.clock_name(AgentId(0), 2), Ok("rng1_k"));
        fixture.policy.deny_clock(CK_RNG);
        assert_eq!(broker.clock_name(AgentId(0), 2), Err(ScmiError::NotFound));
    }

    #[test]
    fn set_state_is_idempotent() {
        let (fixture, boot_calls) = fixture();
        let broker = fixture.broker(&AGENTS);

        assert_eq!(broker.clock_set_state(AgentId(0), 2, true), Ok(()));
        assert_eq!(broker.clock_set_state(AgentId(0), 2, true), Ok(()));
        assert_eq!(fixture.clocks.enable_calls(), boot_calls + 1);
        assert!(broker.clock_state(AgentId(0), 2));

        assert_eq!(broker.clock_set_state(AgentId(0), 2, false), Ok(()));
        assert_eq!(broker.clock_set_state(AgentId(0), 2, false), Ok(()));
        assert_eq!(fixture.clocks.disable_calls(), 1);
        assert!(!broker.clock_state(AgentId(0), 2));
    }

    #[test]
    fn denied_set_state_has_no_side_effect() {
        let (fixture, boot_calls) = fixture();
        let broker = fixture.broker(&AGENTS);

        fixture.policy.deny_clock(CK_RNG);
        assert_eq!(
            broker.clock_set_state(AgentId(0), 2, true),
            Err(ScmiError::Denied)
        );
        assert_eq!(fixture.clocks.enable_calls(), boot_calls);

        // The cached state did not move either: visible once re-allowed.
        fixture.policy.allow_clock(CK_RNG);
        assert!(!broker.clock_state(AgentId(0), 2));
    }

    #[test]
    fn rate_range_is_open_only_for_the_operating_point_clock() {
        let (fixture, _) = fixture();
        let broker = fixture.broker(&AGENTS);

        assert_eq!(
            broker.clock_rate_range(AgentId(0), 1),
            Ok(RateStepRange {
                min_hz: 0,
                max_hz: u32::MAX.into(),
                step_hz: 1,
            })
        );
        assert_eq!(
            broker.clock_rate_range(AgentId(0), 0),
            Ok(RateStepRange {
                min_hz: HSE_HZ,
                max_hz: HSE_HZ,
                step_hz: 0,
            })
        );

        fixture.policy.deny_clock(CK_HSE);
        assert_eq!(
            broker.clock_rate_range(AgentId(0), 0),
            Err(ScmiError::Denied)
        );
    }

    #[test]
    fn discrete_rate_enumeration_is_refused() {
        let (fixture, _) = fixture();
        let broker = fixture.broker(&AGENTS);

        let mut rates = [0; 4];
        assert_eq!(
            broker.clock_discrete_rates(AgentId(0), 0, 0, &mut rates),
            Err(ScmiError::NotSupported)
        );
    }

    #[test]
    fn set_rate_confirms_or_rejects_on_read_only_clocks() {
        let (fixture, _) = fixture();
        let broker = fixture.broker(&AGENTS);

        assert_eq!(broker.clock_set_rate(AgentId(0), 0, HSE_HZ), Ok(()));
        assert_eq!(
            broker.clock_set_rate(AgentId(0), 0, HSE_HZ + 1),
            Err(ScmiError::InvalidParameters)
        );
        assert!(fixture.clocks.opp_requests().is_empty());
    }

    #[test]
    fn set_rate_selects_an_operating_point_for_the_cpu_clock() {
        let (fixture, _) = fixture();
        let broker = fixture.broker(&AGENTS);

        assert_eq!(broker.clock_set_rate(AgentId(0), 1, 800_000_000), Ok(()));
        assert_eq!(fixture.clocks.opp_requests(), [800_000]);

        fixture.clocks.refuse_operating_points();
        assert_eq!(
            broker.clock_set_rate(AgentId(0), 1, 123_000_000),
            Err(ScmiError::InvalidParameters)
        );
    }

    #[test]
    fn denied_set_rate_never_reaches_the_selector() {
        let (fixture, _) = fixture();
        let broker = fixture.broker(&AGENTS);

        fixture.policy.deny_clock(CK_MPU);
        assert_eq!(
            broker.clock_set_rate(AgentId(0), 1, 800_000_000),
            Err(ScmiError::Denied)
        );
        assert!(fixture.clocks.opp_requests().is_empty());
    }

    #[test]
    fn denied_rate_reads_use_the_zero_sentinel() {
        let (fixture, _) = fixture();
        let broker = fixture.broker(&AGENTS);

        assert_eq!(broker.clock_rate(AgentId(0), 0), HSE_HZ);
        fixture.policy.deny_clock(CK_HSE);
        assert_eq!(broker.clock_rate(AgentId(0), 0), 0);
        assert!(!broker.clock_state(AgentId(0), 0));
    }
}
