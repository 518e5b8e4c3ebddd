/// Shared event model for all detectors.
///
/// Every capture source (WiFi sniffer, BLE scanner, USB enumerator) is
/// reduced to one tagged `Event` union so a single store/alerting
/// pipeline can serve all four detectors.
use heapless::{String, Vec};

/// A raw 6-byte MAC address (BSSID, frame transmitter, or BLE address).
pub type Mac = [u8; 6];

/// Received signal strength in dBm. Closer to 0 = stronger.
pub type Rssi = i8;

/// Coarse monotonic milliseconds, supplied by the platform tick source.
pub type Ticks = u64;

/// Maximum ESSID / BLE name length in bytes (802.11 caps SSIDs at 32).
pub type NameString = String<32>;

/// Formatted MAC address string ("AA:BB:CC:DD:EE:FF").
pub type MacString = String<18>;

/// Maximum distinct interface classes tracked for one USB device.
pub const MAX_USB_INTERFACES: usize = 8;

/// A classified observation, ready for the aggregation store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// 802.11 deauthentication frame.
    Deauth {
        source: Mac,
        channel: u8,
        rssi: Rssi,
        tick: Ticks,
    },
    /// 802.11 disassociation frame. Folded into the same per-source
    /// statistics as deauthentication.
    Disassoc {
        source: Mac,
        channel: u8,
        rssi: Rssi,
        tick: Ticks,
    },
    /// A beacon or probe response advertising an ESSID.
    SsidSighting {
        bssid: Mac,
        essid: NameString,
        rssi: Rssi,
        tick: Ticks,
    },
    /// A BLE advertisement report.
    BleAdvert {
        address: Mac,
        name: Option<NameString>,
        rssi: Rssi,
        tick: Ticks,
    },
    /// An enumerated USB device descriptor.
    UsbDescriptor {
        vendor_id: u16,
        product_id: u16,
        device_class: u8,
        /// Distinct interface classes, set semantics.
        interface_classes: Vec<u8, MAX_USB_INTERFACES>,
    },
}

/// Format a 6-byte MAC address into "AA:BB:CC:DD:EE:FF".
pub fn format_mac(mac: &Mac, buf: &mut MacString) {
    use core::fmt::Write;
    let _ = write!(
        buf,
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    );
}
