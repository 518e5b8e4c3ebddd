/// Result facade — read-only, navigable views over the store for the
/// display layer.
///
/// Stateless with respect to cursor position: the consumer owns
/// selection and drill-down state, this module only answers "what
/// exists right now" and "has it changed". Entries never reorder on
/// ingest-driven updates (tables append new keys and mutate existing
/// ones in place), so a cursor index stays valid for whatever was not
/// evicted.
use heapless::Vec;
use serde::Serialize;

use crate::alert::MAX_ALERTS;
use crate::config::Thresholds;
use crate::error::Error;
use crate::event::{Mac, Rssi};
use crate::store::{ApRecord, BleRecord, DeauthRecord, Store, UsbProfile};

/// Upper bound on list rows: every table entry plus USB.
pub const MAX_LIST: usize = MAX_ALERTS;

pub type ListVec = Vec<ListEntry, MAX_LIST>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    DeauthSource,
    AccessPoint,
    BleDevice,
    UsbDevice,
}

/// One row of the flat list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    pub kind: EntryKind,
    /// Offending MAC; all-zero for the USB row.
    pub key: Mac,
    /// The summary metric for this kind: frames, distinct ESSIDs,
    /// cycle adverts, or interface classes.
    pub metric: u32,
    pub rssi: Rssi,
    pub alerting: bool,
}

/// A drill-down key. Typed per detector so a MAC seen on both radios
/// is unambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    DeauthSource(Mac),
    AccessPoint(Mac),
    BleDevice(Mac),
    UsbDevice,
}

/// The full record behind one list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    Deauth(DeauthRecord),
    Ap(ApRecord),
    Ble(BleRecord),
    Usb(UsbProfile),
}

/// Ordered snapshot of all tracked keys, deauth sources first, then
/// access points, BLE devices, and the USB slot.
pub fn list_view(store: &Store, cfg: &Thresholds) -> ListVec {
    let mut rows = ListVec::new();

    for rec in store.deauth_records() {
        let _ = rows.push(ListEntry {
            kind: EntryKind::DeauthSource,
            key: rec.source,
            metric: rec.frames,
            rssi: rec.avg_rssi(),
            alerting: rec.frames > cfg.deauth_per_cycle,
        });
    }
    for rec in store.ap_records() {
        let count = rec.essids.len() as u32;
        let _ = rows.push(ListEntry {
            kind: EntryKind::AccessPoint,
            key: rec.bssid,
            metric: count,
            rssi: rec.last_rssi,
            alerting: count > cfg.ssid_count,
        });
    }
    for rec in store.ble_records() {
        let _ = rows.push(ListEntry {
            kind: EntryKind::BleDevice,
            key: rec.address,
            metric: rec.cycle_adverts,
            rssi: rec.last_rssi,
            alerting: rec.cycle_adverts > cfg.ble_adverts_per_cycle,
        });
    }
    if let Some(profile) = store.usb_profile() {
        let _ = rows.push(ListEntry {
            kind: EntryKind::UsbDevice,
            key: [0; 6],
            metric: profile.interface_classes.len() as u32,
            rssi: 0,
            alerting: profile.suspicious,
        });
    }

    rows
}

/// Look up the full record for a key. `Err(NotFound)` means the entry
/// was evicted since the caller last saw it: refetch the list, do not
/// alarm.
pub fn detail_view(store: &Store, key: &Key) -> Result<Detail, Error> {
    match key {
        Key::DeauthSource(mac) => store
            .deauth_records()
            .iter()
            .find(|r| r.source == *mac)
            .cloned()
            .map(Detail::Deauth),
        Key::AccessPoint(mac) => store
            .ap_records()
            .iter()
            .find(|r| r.bssid == *mac)
            .cloned()
            .map(Detail::Ap),
        Key::BleDevice(mac) => store
            .ble_records()
            .iter()
            .find(|r| r.address == *mac)
            .cloned()
            .map(Detail::Ble),
        Key::UsbDevice => store.usb_profile().cloned().map(Detail::Usb),
    }
    .ok_or(Error::NotFound)
}

/// Serialize a value as one NDJSON line for companion export. Returns
/// bytes written including the trailing newline, or `None` if the
/// buffer is too small.
pub fn to_json_line<T: Serialize>(value: &T, buf: &mut [u8]) -> Option<usize> {
    match serde_json_core::to_slice(value, buf) {
        Ok(len) if len < buf.len() => {
            buf[len] = b'\n';
            Some(len + 1)
        }
        _ => None,
    }
}
