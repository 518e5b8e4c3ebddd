/// Classifier — maps raw observations to typed [`Event`]s.
///
/// WiFi frames go through the `ieee80211` crate for typed beacon /
/// probe-response parsing (SSID extraction), with a raw header fallback
/// for deauthentication and disassociation frames. Malformed input is
/// never an error: anything that does not decode cleanly yields `None`
/// and is dropped silently (the engine counts drops diagnostically).
///
/// Safe to call from ISR context: no allocation, no blocking.
use heapless::Vec;

use ieee80211::match_frames;
use ieee80211::mgmt_frame::{BeaconFrame, ProbeResponseFrame};

use crate::event::{Event, Mac, NameString, Rssi, Ticks, MAX_USB_INTERFACES};

/// 802.11 frame control byte for a deauthentication frame
/// (subtype 12, type management, version 0).
pub const FRAME_CTRL_DEAUTH: u8 = 0xC0;

/// 802.11 frame control byte for a disassociation frame (subtype 10).
pub const FRAME_CTRL_DISASSOC: u8 = 0xA0;

/// Minimum bytes to reach Address 2 in a management header:
/// 2 (frame ctrl) + 2 (duration) + 6 (addr1) + 6 (addr2).
const MIN_MGMT_HEADER: usize = 16;

/// Classify a raw 802.11 frame.
///
/// Beacons and probe responses become [`Event::SsidSighting`] (both
/// advertise an ESSID, so both feed rogue-AP detection). Frames the
/// typed parser rejects fall through to a raw header parse that maps
/// the frame control byte to deauth/disassoc; everything else is
/// ignored.
pub fn classify_wifi(frame: &[u8], rssi: Rssi, channel: u8, tick: Ticks) -> Option<Event> {
    let result = match_frames! {
        frame,
        beacon = BeaconFrame<'_> => {
            sighting(&beacon.header.transmitter_address.0, beacon.body.ssid().unwrap_or(""), rssi, tick)
        }
        probe_resp = ProbeResponseFrame<'_> => {
            sighting(&probe_resp.header.transmitter_address.0, probe_resp.body.ssid().unwrap_or(""), rssi, tick)
        }
    };

    match result {
        Ok(event) => event,
        Err(_) => {
            if frame.len() < MIN_MGMT_HEADER {
                return None;
            }
            // Address 2 (transmitter) at offset 10 in any management frame.
            let source: Mac = frame[10..16].try_into().ok()?;
            match frame[0] {
                FRAME_CTRL_DEAUTH => Some(Event::Deauth {
                    source,
                    channel,
                    rssi,
                    tick,
                }),
                FRAME_CTRL_DISASSOC => Some(Event::Disassoc {
                    source,
                    channel,
                    rssi,
                    tick,
                }),
                _ => None,
            }
        }
    }
}

/// Build an SSID sighting. Hidden SSIDs (zero-length) carry nothing a
/// rogue-AP detector can key on and are dropped.
fn sighting(bssid: &Mac, essid: &str, rssi: Rssi, tick: Ticks) -> Option<Event> {
    if essid.is_empty() {
        return None;
    }
    let mut name = NameString::new();
    if name.push_str(essid).is_err() {
        return None; // longer than the 802.11 SSID limit
    }
    Some(Event::SsidSighting {
        bssid: *bssid,
        essid: name,
        rssi,
        tick,
    })
}

/// Classify a BLE advertisement report.
///
/// Walks the AD structures extracting the local name (types 0x08/0x09).
/// AD structure format: [length] [type] [data...]. Truncated or
/// non-UTF-8 names are simply absent; the advertisement itself is
/// always a valid event.
pub fn classify_ble(address: &Mac, rssi: Rssi, ad_data: &[u8], tick: Ticks) -> Event {
    let mut name: Option<NameString> = None;

    let mut pos = 0;
    while pos < ad_data.len() {
        let len = ad_data[pos] as usize;
        if len == 0 || pos + 1 + len > ad_data.len() {
            break;
        }
        let ad_type = ad_data[pos + 1];
        let data = &ad_data[pos + 2..pos + 1 + len];

        // Shortened or complete local name
        if ad_type == 0x08 || ad_type == 0x09 {
            if let Ok(s) = core::str::from_utf8(data) {
                let mut n = NameString::new();
                if n.push_str(s).is_ok() {
                    name = Some(n);
                }
            }
        }

        pos += 1 + len;
    }

    Event::BleAdvert {
        address: *address,
        name,
        rssi,
        tick,
    }
}

/// Classify a USB device descriptor.
///
/// Interface classes get set semantics: duplicates collapse, and
/// classes beyond the tracking cap are dropped.
pub fn classify_usb(
    vendor_id: u16,
    product_id: u16,
    device_class: u8,
    interfaces: &[u8],
) -> Event {
    let mut classes: Vec<u8, MAX_USB_INTERFACES> = Vec::new();
    for &class in interfaces {
        if !classes.contains(&class) {
            let _ = classes.push(class);
        }
    }
    Event::UsbDescriptor {
        vendor_id,
        product_id,
        device_class,
        interface_classes: classes,
    }
}
