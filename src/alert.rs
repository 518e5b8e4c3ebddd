/// Threshold alerting engine.
///
/// Alerts are level-triggered and recomputed fresh on every evaluation:
/// a key alerts while its current-cycle metric strictly exceeds the
/// threshold and clears by absence once the metric drops back at or
/// below it. Nothing is sticky. Ordering follows insertion order of the
/// underlying tables (deauth sources, then access points, then BLE
/// devices, then USB); the facade does not re-sort.
use heapless::Vec;
use serde::Serialize;

use crate::config::Thresholds;
use crate::event::Mac;
use crate::store::{Store, MAX_BLE_DEVICES, MAX_DEAUTH_SOURCES, MAX_TRACKED_APS};

/// Upper bound on simultaneous alerts: every table entry plus USB.
pub const MAX_ALERTS: usize = MAX_DEAUTH_SOURCES + MAX_TRACKED_APS + MAX_BLE_DEVICES + 1;

pub type AlertVec = Vec<Alert, MAX_ALERTS>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Deauth/disassoc frame rate over threshold for one source.
    DeauthFlood,
    /// One BSSID advertising more ESSIDs than the threshold.
    MultiSsid,
    /// BLE advertisement rate over threshold for one address.
    BleSpam,
    /// The profiled USB device matched the malicious-peripheral checks.
    UsbSuspect,
}

/// One raised alert. `key` is the offending MAC (all-zero for USB);
/// `metric` is the value that crossed the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub key: Mac,
    pub metric: u32,
}

/// Evaluate current store contents against the thresholds.
///
/// Also refreshes the derived `spam_suspect` flags on BLE records so
/// the facade's detail view agrees with the alert set.
pub fn evaluate(store: &mut Store, cfg: &Thresholds) -> AlertVec {
    let mut alerts = AlertVec::new();

    for rec in store.deauth_records() {
        if rec.frames > cfg.deauth_per_cycle {
            let _ = alerts.push(Alert {
                kind: AlertKind::DeauthFlood,
                key: rec.source,
                metric: rec.frames,
            });
        }
    }

    for rec in store.ap_records() {
        let count = rec.essids.len() as u32;
        if count > cfg.ssid_count {
            let _ = alerts.push(Alert {
                kind: AlertKind::MultiSsid,
                key: rec.bssid,
                metric: count,
            });
        }
    }

    for rec in store.ble_records_mut() {
        rec.spam_suspect = rec.cycle_adverts > cfg.ble_adverts_per_cycle;
        if rec.spam_suspect {
            let _ = alerts.push(Alert {
                kind: AlertKind::BleSpam,
                key: rec.address,
                metric: rec.cycle_adverts,
            });
        }
    }

    if let Some(profile) = store.usb_profile() {
        if profile.suspicious {
            let _ = alerts.push(Alert {
                kind: AlertKind::UsbSuspect,
                key: [0; 6],
                metric: profile.interface_classes.len() as u32,
            });
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, NameString, Rssi, Ticks};

    fn mac(last: u8) -> Mac {
        [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, last]
    }

    fn deauth_n(store: &mut Store, source: Mac, n: u32) {
        for i in 0..n {
            store.ingest(Event::Deauth {
                source,
                channel: 6,
                rssi: -50,
                tick: i as Ticks,
            });
        }
    }

    fn sighting(store: &mut Store, bssid: Mac, name: &str, rssi: Rssi, tick: Ticks) {
        store.ingest(Event::SsidSighting {
            bssid,
            essid: NameString::try_from(name).unwrap(),
            rssi,
            tick,
        });
    }

    fn thresholds(deauth: u32, ssid: u32, ble: u32) -> Thresholds {
        Thresholds {
            deauth_per_cycle: deauth,
            ssid_count: ssid,
            ble_adverts_per_cycle: ble,
        }
    }

    // ── Level triggering ────────────────────────────────────────────

    #[test]
    fn count_at_threshold_does_not_alert() {
        let mut store = Store::new();
        deauth_n(&mut store, mac(1), 5);
        assert!(evaluate(&mut store, &thresholds(5, 5, 5)).is_empty());
    }

    #[test]
    fn count_strictly_over_threshold_alerts() {
        let mut store = Store::new();
        deauth_n(&mut store, mac(1), 6);
        let alerts = evaluate(&mut store, &thresholds(5, 5, 5));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::DeauthFlood);
        assert_eq!(alerts[0].key, mac(1));
        assert_eq!(alerts[0].metric, 6);
    }

    #[test]
    fn alert_clears_after_cycle_reset_with_no_new_events() {
        let mut store = Store::new();
        let cfg = thresholds(5, 5, 5);
        deauth_n(&mut store, mac(1), 6);
        assert_eq!(evaluate(&mut store, &cfg).len(), 1);
        store.begin_cycle(100);
        assert!(evaluate(&mut store, &cfg).is_empty());
    }

    #[test]
    fn ble_spam_alert_raises_and_clears() {
        let mut store = Store::new();
        let cfg = thresholds(10, 5, 3);
        for i in 0..4 {
            store.ingest(Event::BleAdvert {
                address: mac(9),
                name: None,
                rssi: -70,
                tick: i,
            });
        }
        let alerts = evaluate(&mut store, &cfg);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::BleSpam);
        assert!(store.ble_records()[0].spam_suspect);

        store.begin_cycle(100);
        assert!(evaluate(&mut store, &cfg).is_empty());
        assert!(!store.ble_records()[0].spam_suspect);
    }

    #[test]
    fn multi_ssid_alert_counts_distinct_essids() {
        let mut store = Store::new();
        let cfg = thresholds(10, 2, 10);
        sighting(&mut store, mac(2), "a", -40, 1);
        sighting(&mut store, mac(2), "b", -41, 2);
        assert!(evaluate(&mut store, &cfg).is_empty()); // 2 is not > 2
        sighting(&mut store, mac(2), "c", -42, 3);
        let alerts = evaluate(&mut store, &cfg);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::MultiSsid);
        assert_eq!(alerts[0].metric, 3);
    }

    #[test]
    fn duplicate_essid_does_not_advance_toward_threshold() {
        let mut store = Store::new();
        let cfg = thresholds(10, 2, 10);
        for i in 0..5 {
            sighting(&mut store, mac(2), "same", -40, i);
        }
        assert!(evaluate(&mut store, &cfg).is_empty());
    }

    // ── Multiple simultaneous alerts ────────────────────────────────

    #[test]
    fn simultaneous_alerts_follow_table_insertion_order() {
        let mut store = Store::new();
        let cfg = thresholds(2, 2, 2);
        deauth_n(&mut store, mac(1), 3);
        for name in ["a", "b", "c"] {
            sighting(&mut store, mac(2), name, -40, 1);
        }
        store.ingest(crate::classify::classify_usb(0x16C0, 0x0483, 0x00, &[0x03]));

        let alerts = evaluate(&mut store, &cfg);
        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].kind, AlertKind::DeauthFlood);
        assert_eq!(alerts[1].kind, AlertKind::MultiSsid);
        assert_eq!(alerts[2].kind, AlertKind::UsbSuspect);
    }

    #[test]
    fn two_deauth_sources_both_alert() {
        let mut store = Store::new();
        let cfg = thresholds(2, 5, 5);
        deauth_n(&mut store, mac(1), 3);
        deauth_n(&mut store, mac(2), 4);
        let alerts = evaluate(&mut store, &cfg);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].key, mac(1));
        assert_eq!(alerts[1].key, mac(2));
    }

    #[test]
    fn benign_usb_device_never_alerts() {
        let mut store = Store::new();
        store.ingest(crate::classify::classify_usb(0x046D, 0xC31C, 0x00, &[0x03]));
        assert!(evaluate(&mut store, &Thresholds::new()).is_empty());
    }

    #[test]
    fn usb_disconnect_clears_usb_alert() {
        let mut store = Store::new();
        store.ingest(crate::classify::classify_usb(0x16C0, 0x0483, 0x00, &[0x03]));
        assert_eq!(evaluate(&mut store, &Thresholds::new()).len(), 1);
        store.usb_disconnected();
        assert!(evaluate(&mut store, &Thresholds::new()).is_empty());
    }
}
