/// Detector thresholds — defaults, valid ranges, and the persisted
/// settings blob.
///
/// The core treats thresholds as plain integers with documented valid
/// ranges and rejects out-of-range writes at this boundary; wrap-around
/// UI behavior belongs to the external settings layer. The blob format
/// is flat JSON so `serde_json_core` can round-trip it without an
/// allocator.
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Deauth+disassoc frames per cycle before a source alerts.
pub const DEAUTH_DEFAULT: u32 = 10;
pub const DEAUTH_RANGE: (u32, u32) = (1, 1000);

/// Distinct ESSIDs from one BSSID before it alerts.
pub const SSID_COUNT_DEFAULT: u32 = 5;
pub const SSID_COUNT_RANGE: (u32, u32) = (2, 100);

/// BLE adverts per cycle from one address before it alerts.
pub const BLE_ADVERTS_DEFAULT: u32 = 20;
pub const BLE_ADVERTS_RANGE: (u32, u32) = (1, 1000);

/// Per-detector alert thresholds. An alert raises when the metric
/// strictly exceeds its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub deauth_per_cycle: u32,
    pub ssid_count: u32,
    pub ble_adverts_per_cycle: u32,
}

impl Thresholds {
    pub const fn new() -> Self {
        Self {
            deauth_per_cycle: DEAUTH_DEFAULT,
            ssid_count: SSID_COUNT_DEFAULT,
            ble_adverts_per_cycle: BLE_ADVERTS_DEFAULT,
        }
    }

    pub fn set_deauth_per_cycle(&mut self, v: u32) -> Result<(), Error> {
        self.deauth_per_cycle = checked(v, DEAUTH_RANGE)?;
        Ok(())
    }

    pub fn set_ssid_count(&mut self, v: u32) -> Result<(), Error> {
        self.ssid_count = checked(v, SSID_COUNT_RANGE)?;
        Ok(())
    }

    pub fn set_ble_adverts_per_cycle(&mut self, v: u32) -> Result<(), Error> {
        self.ble_adverts_per_cycle = checked(v, BLE_ADVERTS_RANGE)?;
        Ok(())
    }

    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<(), Error> {
        checked(self.deauth_per_cycle, DEAUTH_RANGE)?;
        checked(self.ssid_count, SSID_COUNT_RANGE)?;
        checked(self.ble_adverts_per_cycle, BLE_ADVERTS_RANGE)?;
        Ok(())
    }

    /// Parse a persisted settings blob. A blob that does not parse or
    /// carries an out-of-range value is rejected whole; the previous
    /// runtime values stay in effect.
    pub fn from_json(blob: &[u8]) -> Result<Self, Error> {
        let (parsed, _rest) = serde_json_core::from_slice::<Thresholds>(blob)
            .map_err(|_| Error::ConfigOutOfRange)?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Serialize for the external settings store. Returns the number of
    /// bytes written, or `None` if the buffer is too small.
    pub fn to_json(&self, buf: &mut [u8]) -> Option<usize> {
        serde_json_core::to_slice(self, buf).ok()
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new()
    }
}

fn checked(v: u32, (lo, hi): (u32, u32)) -> Result<u32, Error> {
    if v < lo || v > hi {
        return Err(Error::ConfigOutOfRange);
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_within_their_own_ranges() {
        Thresholds::new().validate().unwrap();
    }

    #[test]
    fn ssid_count_accepts_documented_bounds() {
        let mut t = Thresholds::new();
        t.set_ssid_count(2).unwrap();
        t.set_ssid_count(100).unwrap();
        assert_eq!(t.ssid_count, 100);
    }

    #[test]
    fn ssid_count_rejects_out_of_range_without_mutating() {
        let mut t = Thresholds::new();
        assert_eq!(t.set_ssid_count(1), Err(Error::ConfigOutOfRange));
        assert_eq!(t.set_ssid_count(101), Err(Error::ConfigOutOfRange));
        assert_eq!(t.ssid_count, SSID_COUNT_DEFAULT);
    }

    #[test]
    fn deauth_threshold_rejects_zero() {
        let mut t = Thresholds::new();
        assert_eq!(t.set_deauth_per_cycle(0), Err(Error::ConfigOutOfRange));
    }

    #[test]
    fn json_round_trip_preserves_values() {
        let mut t = Thresholds::new();
        t.set_ssid_count(7).unwrap();
        let mut buf = [0u8; 128];
        let len = t.to_json(&mut buf).unwrap();
        let parsed = Thresholds::from_json(&buf[..len]).unwrap();
        assert_eq!(parsed, t);
    }

    #[test]
    fn blob_with_out_of_range_value_is_rejected_whole() {
        let blob = br#"{"deauth_per_cycle":10,"ssid_count":500,"ble_adverts_per_cycle":20}"#;
        assert_eq!(Thresholds::from_json(blob), Err(Error::ConfigOutOfRange));
    }

    #[test]
    fn garbage_blob_is_rejected() {
        assert_eq!(
            Thresholds::from_json(b"not json"),
            Err(Error::ConfigOutOfRange)
        );
    }
}
