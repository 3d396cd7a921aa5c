// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Types and constants from the SCMI specification shared by all protocols.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Status word reported to the agent when a command completes successfully.
pub const SCMI_SUCCESS: i32 = 0;

/// Clock names must be strictly shorter than this, so the transport can
/// always NUL-terminate them in its fixed-size reply field.
pub const CLOCK_NAME_MAX: usize = 16;

/// Size limit for reset domain names, with the same terminator rule.
pub const RESET_NAME_MAX: usize = 16;

/// Size limit for voltage domain names, with the same terminator rule.
pub const VOLTD_NAME_MAX: usize = 16;

/// Failure statuses a broker operation can report to the agent.
///
/// The discriminants are the architectural SCMI status words, so a status
/// for the transport's reply header is a plain conversion away.
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive)]
#[repr(i32)]
pub enum ScmiError {
    /// The operation is intentionally not implemented for this resource.
    NotSupported = -1,
    /// A parameter is outside the legal domain for the resource.
    InvalidParameters = -2,
    /// The access policy refuses the requesting agent this resource.
    Denied = -3,
    /// The handle does not name a resource of the requesting agent.
    NotFound = -4,
    /// Internal failure with no more precise status.
    GenericError = -8,
    /// The underlying hardware operation failed or timed out.
    HardwareError = -9,
}

/// Outcome of one decoded SCMI operation.
pub type ScmiResult<T> = Result<T, ScmiError>;

/// Folds an operation outcome into the status word for the reply header.
pub fn status_word<T>(result: &ScmiResult<T>) -> i32 {
    match result {
        Ok(_) => SCMI_SUCCESS,
        Err(error) => (*error).into(),
    }
}

/// Identifiers of the SCMI protocols this broker knows about.
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ProtocolId {
    /// Base protocol; discovery and identification, served by the transport.
    Base = 0x10,
    /// Clock management protocol.
    Clock = 0x14,
    /// Reset domain management protocol.
    ResetDomain = 0x16,
    /// Voltage domain management protocol.
    VoltageDomain = 0x17,
}

/// Architectural operating modes of a voltage domain.
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum VoltdConfig {
    /// The domain is switched off.
    Off = 0x0,
    /// The domain is powered and regulating.
    On = 0x7,
}

/// A clock rate range answered to a "rates by step" description query.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RateStepRange {
    /// Lowest settable rate in hertz.
    pub min_hz: u64,
    /// Highest settable rate in hertz.
    pub max_hz: u64,
    /// Distance between two settable rates; 0 for a single-point range.
    pub step_hz: u64,
}

/// One page of a voltage domain's level list.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LevelPage {
    /// Number of levels written to the caller's buffer.
    pub returned: usize,
    /// Number of levels left in the list after this page.
    pub remaining: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_words_match_the_architecture() {
        assert_eq!(status_word(&Ok(0u32)), SCMI_SUCCESS);
        assert_eq!(status_word::<u32>(&Err(ScmiError::NotSupported)), -1);
        assert_eq!(status_word::<u32>(&Err(ScmiError::Denied)), -3);
        assert_eq!(status_word::<u32>(&Err(ScmiError::HardwareError)), -9);
    }

    #[test]
    fn voltd_config_accepts_only_architectural_modes() {
        assert_eq!(VoltdConfig::try_from(0x0), Ok(VoltdConfig::Off));
        assert_eq!(VoltdConfig::try_from(0x7), Ok(VoltdConfig::On));
        assert!(VoltdConfig::try_from(0x1).is_err());
        assert_eq!(u32::from(VoltdConfig::On), 0x7);
    }

    #[test]
    fn protocol_ids_round_trip() {
        assert_eq!(u8::from(ProtocolId::Clock), 0x14);
        assert_eq!(ProtocolId::try_from(0x16), Ok(ProtocolId::ResetDomain));
        assert!(ProtocolId::try_from(0x11).is_err());
    }
}
