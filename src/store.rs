/// Aggregation store — bounded keyed tables folding events into
/// per-entity statistics.
///
/// Every table has a fixed capacity and resolves overflow by evicting
/// the least-recently-updated entry, never by rejecting the new
/// observation. Entries are appended in first-seen order and mutated in
/// place, so the list the facade exposes stays index-stable for
/// everything that is not evicted.
///
/// `ingest` is pure state mutation in bounded time: no I/O, no
/// allocation, no blocking. It assumes exclusive access for the
/// duration of the call; the engine provides that exclusion.
use heapless::Vec;

use crate::event::{Event, Mac, NameString, Rssi, Ticks, MAX_USB_INTERFACES};
use crate::signatures;

/// Capacity of the deauth-source table.
pub const MAX_DEAUTH_SOURCES: usize = 16;

/// Capacity of the access-point (BSSID) table.
pub const MAX_TRACKED_APS: usize = 16;

/// Distinct ESSIDs tracked per BSSID.
pub const MAX_ESSIDS_PER_AP: usize = 8;

/// Capacity of the BLE device table.
pub const MAX_BLE_DEVICES: usize = 16;

/// Per-source deauthentication statistics for the current cycle.
///
/// Deauth and disassoc frames fold into the same record. The whole
/// table resets at each cycle boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeauthRecord {
    pub source: Mac,
    /// Deauth + disassoc frames since the cycle began.
    pub frames: u32,
    /// Incremental integer mean; a running sum would wrap at high
    /// packet rates.
    avg_rssi: i32,
    samples: u32,
    pub first_seen: Ticks,
    pub last_seen: Ticks,
}

impl DeauthRecord {
    fn new(source: Mac, tick: Ticks) -> Self {
        Self {
            source,
            frames: 0,
            avg_rssi: 0,
            samples: 0,
            first_seen: tick,
            last_seen: tick,
        }
    }

    /// Fold one RSSI sample: `avg += (sample - avg) / n`. Stays within
    /// the true min/max of the samples for any count.
    fn fold(&mut self, rssi: Rssi, tick: Ticks) {
        self.frames = self.frames.saturating_add(1);
        self.samples = self.samples.saturating_add(1);
        self.avg_rssi += (rssi as i32 - self.avg_rssi) / self.samples as i32;
        self.last_seen = self.last_seen.max(tick);
    }

    pub fn avg_rssi(&self) -> Rssi {
        self.avg_rssi as Rssi
    }
}

/// An ESSID advertised by a BSSID, with its most recent RSSI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EssidEntry {
    pub essid: NameString,
    pub rssi: Rssi,
}

/// Per-BSSID record of advertised ESSIDs, in first-seen order.
///
/// Survives cycle boundaries so a persistent rogue AP stays visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApRecord {
    pub bssid: Mac,
    pub essids: Vec<EssidEntry, MAX_ESSIDS_PER_AP>,
    pub last_rssi: Rssi,
    pub first_seen: Ticks,
    pub last_seen: Ticks,
}

/// Per-address BLE advertisement statistics.
///
/// Identity survives cycle boundaries; the per-cycle count that drives
/// the spam alert does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BleRecord {
    pub address: Mac,
    /// Adverts since the cycle began (drives the spam threshold).
    pub cycle_adverts: u32,
    /// Adverts since the record was created.
    pub total_adverts: u32,
    pub name: Option<NameString>,
    pub last_rssi: Rssi,
    pub first_seen: Ticks,
    pub last_seen: Ticks,
    /// Derived by the alerting engine on each evaluation.
    pub spam_suspect: bool,
}

/// The single currently-profiled USB device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbProfile {
    pub vendor_id: u16,
    pub product_id: u16,
    pub device_class: u8,
    pub interface_classes: Vec<u8, MAX_USB_INTERFACES>,
    pub suspicious: bool,
    pub reason: Option<&'static str>,
}

/// Bounded aggregation of all detector state.
#[derive(Debug)]
pub struct Store {
    deauth: Vec<DeauthRecord, MAX_DEAUTH_SOURCES>,
    aps: Vec<ApRecord, MAX_TRACKED_APS>,
    ble: Vec<BleRecord, MAX_BLE_DEVICES>,
    usb: Option<UsbProfile>,
    /// Change sequence for redraw suppression. Bumped on every mutation.
    seq: u32,
    /// Entries evicted to make room, across all tables.
    evictions: u32,
    cycle_started: Ticks,
}

impl Store {
    pub const fn new() -> Self {
        Self {
            deauth: Vec::new(),
            aps: Vec::new(),
            ble: Vec::new(),
            usb: None,
            seq: 0,
            evictions: 0,
            cycle_started: 0,
        }
    }

    pub fn deauth_records(&self) -> &[DeauthRecord] {
        &self.deauth
    }

    pub fn ap_records(&self) -> &[ApRecord] {
        &self.aps
    }

    pub fn ble_records(&self) -> &[BleRecord] {
        &self.ble
    }

    pub(crate) fn ble_records_mut(&mut self) -> &mut [BleRecord] {
        &mut self.ble
    }

    pub fn usb_profile(&self) -> Option<&UsbProfile> {
        self.usb.as_ref()
    }

    /// Current change token. Compare against a stored token with
    /// [`Store::changed_since`] to skip redundant redraws.
    pub fn snapshot_token(&self) -> u32 {
        self.seq
    }

    pub fn changed_since(&self, token: u32) -> bool {
        self.seq != token
    }

    /// Total entries evicted to satisfy table capacities.
    pub fn evictions(&self) -> u32 {
        self.evictions
    }

    pub fn cycle_started(&self) -> Ticks {
        self.cycle_started
    }

    fn touch(&mut self) {
        self.seq = self.seq.wrapping_add(1);
    }

    /// Fold one event into the tables.
    pub fn ingest(&mut self, event: Event) {
        match event {
            Event::Deauth { source, rssi, tick, .. }
            | Event::Disassoc { source, rssi, tick, .. } => {
                self.ingest_deauth(source, rssi, tick);
            }
            Event::SsidSighting { bssid, essid, rssi, tick } => {
                self.ingest_sighting(bssid, essid, rssi, tick);
            }
            Event::BleAdvert { address, name, rssi, tick } => {
                self.ingest_ble(address, name, rssi, tick);
            }
            Event::UsbDescriptor {
                vendor_id,
                product_id,
                device_class,
                interface_classes,
            } => {
                self.ingest_usb(vendor_id, product_id, device_class, interface_classes);
            }
        }
        self.touch();
    }

    fn ingest_deauth(&mut self, source: Mac, rssi: Rssi, tick: Ticks) {
        if let Some(rec) = self.deauth.iter_mut().find(|r| r.source == source) {
            rec.fold(rssi, tick);
            return;
        }
        if self.deauth.is_full() {
            evict_lru(&mut self.deauth, |r| r.last_seen, &mut self.evictions);
        }
        let mut rec = DeauthRecord::new(source, tick);
        rec.fold(rssi, tick);
        let _ = self.deauth.push(rec);
    }

    fn ingest_sighting(&mut self, bssid: Mac, essid: NameString, rssi: Rssi, tick: Ticks) {
        if let Some(rec) = self.aps.iter_mut().find(|r| r.bssid == bssid) {
            rec.last_rssi = rssi;
            rec.last_seen = rec.last_seen.max(tick);
            // Exact, case-sensitive match updates in place; a new ESSID
            // appends while under the per-record cap.
            if let Some(entry) = rec.essids.iter_mut().find(|e| e.essid == essid) {
                entry.rssi = rssi;
            } else if rec.essids.push(EssidEntry { essid, rssi }).is_err() {
                log::debug!("essid cap reached for ap, sighting folded into record only");
            }
            return;
        }
        if self.aps.is_full() {
            evict_lru(&mut self.aps, |r| r.last_seen, &mut self.evictions);
        }
        let mut essids = Vec::new();
        let _ = essids.push(EssidEntry { essid, rssi });
        let _ = self.aps.push(ApRecord {
            bssid,
            essids,
            last_rssi: rssi,
            first_seen: tick,
            last_seen: tick,
        });
    }

    fn ingest_ble(&mut self, address: Mac, name: Option<NameString>, rssi: Rssi, tick: Ticks) {
        if let Some(rec) = self.ble.iter_mut().find(|r| r.address == address) {
            rec.cycle_adverts = rec.cycle_adverts.saturating_add(1);
            rec.total_adverts = rec.total_adverts.saturating_add(1);
            rec.last_rssi = rssi;
            rec.last_seen = rec.last_seen.max(tick);
            if name.is_some() {
                rec.name = name;
            }
            return;
        }
        if self.ble.is_full() {
            evict_lru(&mut self.ble, |r| r.last_seen, &mut self.evictions);
        }
        let _ = self.ble.push(BleRecord {
            address,
            cycle_adverts: 1,
            total_adverts: 1,
            name,
            last_rssi: rssi,
            first_seen: tick,
            last_seen: tick,
            spam_suspect: false,
        });
    }

    fn ingest_usb(
        &mut self,
        vendor_id: u16,
        product_id: u16,
        device_class: u8,
        interface_classes: Vec<u8, MAX_USB_INTERFACES>,
    ) {
        let reason =
            signatures::assess_usb(vendor_id, product_id, device_class, &interface_classes);
        // Single-device assumption: a new descriptor replaces the
        // profile wholesale.
        self.usb = Some(UsbProfile {
            vendor_id,
            product_id,
            device_class,
            interface_classes,
            suspicious: reason.is_some(),
            reason,
        });
    }

    /// The profiled USB device was unplugged.
    pub fn usb_disconnected(&mut self) {
        if self.usb.take().is_some() {
            self.touch();
        }
    }

    /// Cycle boundary: clear per-cycle counters, keep identity tables.
    ///
    /// The deauth table resets wholesale; AP and BLE records survive so
    /// persistent threats remain visible, but BLE per-cycle counts zero
    /// out so rate alerts can clear.
    pub fn begin_cycle(&mut self, now: Ticks) {
        let mut changed = !self.deauth.is_empty();
        if changed {
            log::debug!("cycle reset: clearing {} deauth sources", self.deauth.len());
        }
        self.deauth.clear();
        for rec in self.ble.iter_mut() {
            if rec.cycle_adverts != 0 {
                rec.cycle_adverts = 0;
                changed = true;
            }
        }
        self.cycle_started = now;
        if changed {
            self.touch();
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove the least-recently-updated record to make room. Relative
/// order of the survivors is preserved.
fn evict_lru<T, const N: usize>(
    table: &mut Vec<T, N>,
    last_seen: impl Fn(&T) -> Ticks,
    evictions: &mut u32,
) {
    let mut oldest = 0;
    for (i, rec) in table.iter().enumerate() {
        if last_seen(rec) < last_seen(&table[oldest]) {
            oldest = i;
        }
    }
    table.remove(oldest);
    *evictions = evictions.saturating_add(1);
    log::debug!("capacity eviction of least-recently-updated entry");
}
