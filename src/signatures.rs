/// Compiled-in USB signature data for malicious-peripheral detection.
///
/// Keystroke-injection tools almost always enumerate as a generic HID
/// keyboard built on a hobbyist development board, so the VID/PID table
/// below lists boards commonly reflashed as injection payload carriers.
/// A match alone is not conclusive; `assess_usb` combines it with the
/// interface-class shape of the device.

/// USB interface class: Human Interface Device (keyboards, mice).
pub const USB_CLASS_HID: u8 = 0x03;

/// USB interface class: mass storage.
pub const USB_CLASS_MASS_STORAGE: u8 = 0x08;

/// Device class 0x00: class defined per interface (composite devices).
pub const USB_CLASS_PER_INTERFACE: u8 = 0x00;

/// Known (vendor_id, product_id) pairs of boards commonly used as
/// keystroke-injection platforms.
pub static USB_INJECTION_IDS: &[(u16, u16, &str)] = &[
    // === PJRC Teensy (classic Rubber-Ducky-style payload carrier) ===
    (0x16C0, 0x0483, "Teensy dev board"),
    (0x16C0, 0x0487, "Teensy HID"),
    // === Digispark / ATtiny85 ===
    (0x16D0, 0x0753, "Digispark ATtiny85"),
    // === Arduino ATmega32u4 boards (native USB HID) ===
    (0x2341, 0x8036, "Arduino Leonardo"),
    (0x2341, 0x8037, "Arduino Micro"),
    // === SparkFun Pro Micro (WHID / Cactus-style injectors) ===
    (0x1B4F, 0x9205, "SparkFun Pro Micro"),
    (0x1B4F, 0x9206, "SparkFun Pro Micro"),
    // === Adafruit ItsyBitsy 32u4 ===
    (0x239A, 0x800C, "Adafruit ItsyBitsy"),
];

/// Look up a VID/PID pair in the injection-tool table.
pub fn lookup_usb_id(vendor_id: u16, product_id: u16) -> Option<&'static str> {
    USB_INJECTION_IDS
        .iter()
        .find(|&&(vid, pid, _)| vid == vendor_id && pid == product_id)
        .map(|&(_, _, name)| name)
}

/// Assess a USB device descriptor for malicious-peripheral traits.
///
/// Returns a reason string when the device looks suspicious, `None`
/// when it looks benign. The heuristics, in table order:
/// - VID/PID matches a known injection-tool board;
/// - a composite device exposing HID alongside mass storage (a flash
///   drive has no business typing).
pub fn assess_usb(
    vendor_id: u16,
    product_id: u16,
    device_class: u8,
    interface_classes: &[u8],
) -> Option<&'static str> {
    if let Some(name) = lookup_usb_id(vendor_id, product_id) {
        return Some(name);
    }

    let has_hid =
        device_class == USB_CLASS_HID || interface_classes.contains(&USB_CLASS_HID);
    let has_storage = device_class == USB_CLASS_MASS_STORAGE
        || interface_classes.contains(&USB_CLASS_MASS_STORAGE);
    if has_hid && has_storage {
        return Some("HID + mass storage composite");
    }

    None
}
