//! Key name tables.
//!
//! Keyboard codes are the Win32 virtual-key values, since profile files in the
//! wild already use those names. Gamepad masks are the XInput `wButtons` bits
//! plus two synthetic bits for the analog triggers.

/// Keyboard or mouse virtual-key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualKey(pub u16);

impl VirtualKey {
    pub const SHIFT: Self = Self(0x10);
    pub const CONTROL: Self = Self(0x11);
    pub const PAGE_UP: Self = Self(0x21);
    pub const PAGE_DOWN: Self = Self(0x22);
    pub const END: Self = Self(0x23);
    pub const HOME: Self = Self(0x24);
    pub const INSERT: Self = Self(0x2D);
    pub const DELETE: Self = Self(0x2E);
    pub const F3: Self = Self(0x72);
    pub const F4: Self = Self(0x73);
    pub const F5: Self = Self(0x74);
    pub const F6: Self = Self(0x75);
    pub const F7: Self = Self(0x76);
    pub const F8: Self = Self(0x77);
    pub const F9: Self = Self(0x78);
    pub const F10: Self = Self(0x79);
    pub const F11: Self = Self(0x7A);
    pub const F12: Self = Self(0x7B);
    pub const OEM_PLUS: Self = Self(0xBB);
    pub const OEM_MINUS: Self = Self(0xBD);
    pub const LBRACKET: Self = Self(0xDB);
    pub const RBRACKET: Self = Self(0xDD);
}

/// Gamepad button bitmasks, as `u32` so the synthetic trigger bits fit.
#[derive(Debug)]
pub enum GamepadButton {}

impl GamepadButton {
    pub const DPAD_UP: u32 = 0x0001;
    pub const DPAD_DOWN: u32 = 0x0002;
    pub const DPAD_LEFT: u32 = 0x0004;
    pub const DPAD_RIGHT: u32 = 0x0008;
    pub const START: u32 = 0x0010;
    pub const BACK: u32 = 0x0020;
    pub const LEFT_THUMB: u32 = 0x0040;
    pub const RIGHT_THUMB: u32 = 0x0080;
    pub const LEFT_SHOULDER: u32 = 0x0100;
    pub const RIGHT_SHOULDER: u32 = 0x0200;
    pub const GUIDE: u32 = 0x0400;
    pub const A: u32 = 0x1000;
    pub const B: u32 = 0x2000;
    pub const X: u32 = 0x4000;
    pub const Y: u32 = 0x8000;
    /// Synthetic: left trigger past [`TRIGGER_THRESHOLD`]
    pub const LEFT_TRIGGER: u32 = 0x1_0000;
    /// Synthetic: right trigger past [`TRIGGER_THRESHOLD`]
    pub const RIGHT_TRIGGER: u32 = 0x2_0000;
}

/// Trigger value (0..=255) above which a trigger counts as a pressed button.
pub const TRIGGER_THRESHOLD: u8 = 30;

static VIRTUAL_KEYS: &[(&str, u16)] = &[
    ("VK_LMOUSE", 0x01),
    ("VK_RMOUSE", 0x02),
    ("VK_MMOUSE", 0x04),
    ("VK_MOUSE4", 0x05),
    ("VK_MOUSE5", 0x06),
    ("VK_BACKSPACE", 0x08),
    ("VK_TAB", 0x09),
    ("VK_SHIFT", 0x10),
    ("VK_CONTROL", 0x11),
    ("VK_MENU", 0x12),
    ("VK_PAUSE", 0x13),
    ("VK_CAPS", 0x14),
    ("VK_ESCAPE", 0x1B),
    ("VK_SPACE", 0x20),
    ("VK_PGUP", 0x21),
    ("VK_PGDWN", 0x22),
    ("VK_END", 0x23),
    ("VK_HOME", 0x24),
    ("VK_LEFT", 0x25),
    ("VK_UP", 0x26),
    ("VK_RIGHT", 0x27),
    ("VK_DOWN", 0x28),
    ("VK_SNAPSHOT", 0x2C),
    ("VK_INSERT", 0x2D),
    ("VK_DELETE", 0x2E),
    ("VK_NUMPAD0", 0x60),
    ("VK_NUMPAD1", 0x61),
    ("VK_NUMPAD2", 0x62),
    ("VK_NUMPAD3", 0x63),
    ("VK_NUMPAD4", 0x64),
    ("VK_NUMPAD5", 0x65),
    ("VK_NUMPAD6", 0x66),
    ("VK_NUMPAD7", 0x67),
    ("VK_NUMPAD8", 0x68),
    ("VK_NUMPAD9", 0x69),
    ("VK_MULTIPLY", 0x6A),
    ("VK_ADD", 0x6B),
    ("VK_SUBTRACT", 0x6D),
    ("VK_DECIMAL", 0x6E),
    ("VK_DIVIDE", 0x6F),
    ("VK_F1", 0x70),
    ("VK_F2", 0x71),
    ("VK_F3", 0x72),
    ("VK_F4", 0x73),
    ("VK_F5", 0x74),
    ("VK_F6", 0x75),
    ("VK_F7", 0x76),
    ("VK_F8", 0x77),
    ("VK_F9", 0x78),
    ("VK_F10", 0x79),
    ("VK_F11", 0x7A),
    ("VK_F12", 0x7B),
    ("VK_F13", 0x7C),
    ("VK_F14", 0x7D),
    ("VK_F15", 0x7E),
    ("VK_F16", 0x7F),
    ("VK_F17", 0x80),
    ("VK_F18", 0x81),
    ("VK_F19", 0x82),
    ("VK_F20", 0x83),
    ("VK_F21", 0x84),
    ("VK_F22", 0x85),
    ("VK_F23", 0x86),
    ("VK_F24", 0x87),
    ("VK_OEM_PLUS", 0xBB),
    ("VK_OEM_MINUS", 0xBD),
    ("VK_LBRACKET", 0xDB),
    ("VK_RBRACKET", 0xDD),
];

static GAMEPAD_BUTTONS: &[(&str, u32)] = &[
    ("XINPUT_GAMEPAD_A", GamepadButton::A),
    ("XINPUT_GAMEPAD_B", GamepadButton::B),
    ("XINPUT_GAMEPAD_X", GamepadButton::X),
    ("XINPUT_GAMEPAD_Y", GamepadButton::Y),
    ("XINPUT_GAMEPAD_RIGHT_SHOULDER", GamepadButton::RIGHT_SHOULDER),
    ("XINPUT_GAMEPAD_LEFT_SHOULDER", GamepadButton::LEFT_SHOULDER),
    ("XINPUT_GAMEPAD_LEFT_TRIGGER", GamepadButton::LEFT_TRIGGER),
    ("XINPUT_GAMEPAD_RIGHT_TRIGGER", GamepadButton::RIGHT_TRIGGER),
    ("XINPUT_GAMEPAD_DPAD_UP", GamepadButton::DPAD_UP),
    ("XINPUT_GAMEPAD_DPAD_DOWN", GamepadButton::DPAD_DOWN),
    ("XINPUT_GAMEPAD_DPAD_LEFT", GamepadButton::DPAD_LEFT),
    ("XINPUT_GAMEPAD_DPAD_RIGHT", GamepadButton::DPAD_RIGHT),
    ("XINPUT_GAMEPAD_START", GamepadButton::START),
    ("XINPUT_GAMEPAD_BACK", GamepadButton::BACK),
    ("XINPUT_GAMEPAD_GUIDE", GamepadButton::GUIDE),
    ("XINPUT_GAMEPAD_LEFT_THUMB", GamepadButton::LEFT_THUMB),
    ("XINPUT_GAMEPAD_RIGHT_THUMB", GamepadButton::RIGHT_THUMB),
];

/// Look up a keyboard/mouse key by name.
///
/// Besides the fixed table, `VK_A`..`VK_Z` and `VK_0`..`VK_9` map to their
/// ASCII codes.
pub fn virtual_key(name: &str) -> Option<VirtualKey> {
    if let Some((_, code)) = VIRTUAL_KEYS.iter().find(|(n, _)| *n == name) {
        return Some(VirtualKey(*code));
    }
    let rest = name.strip_prefix("VK_")?;
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_uppercase() || c.is_ascii_digit() => {
            Some(VirtualKey(u16::from(c as u8)))
        }
        _ => None,
    }
}

/// Look up a single gamepad button by name.
pub fn gamepad_button(name: &str) -> Option<u32> {
    GAMEPAD_BUTTONS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, mask)| *mask)
}

/// Reverse lookup used when writing a profile back out.
pub fn virtual_key_name(key: VirtualKey) -> Option<&'static str> {
    VIRTUAL_KEYS
        .iter()
        .find(|(_, code)| *code == key.0)
        .map(|(name, _)| *name)
}
