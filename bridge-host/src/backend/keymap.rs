//! Key name translation tables for each platform.
//!
//! Names are the ones listed in [`switch_core::KEY_NAMES`].

/// Linux input event key code (`KEY_*` from `input-event-codes.h`).
#[cfg(any(target_os = "linux", test))]
pub fn linux_key_code(name: &str) -> Option<u16> {
    let code = match name {
        "escape" => 1,
        "1" => 2,
        "2" => 3,
        "3" => 4,
        "4" => 5,
        "5" => 6,
        "6" => 7,
        "7" => 8,
        "8" => 9,
        "9" => 10,
        "0" => 11,
        "backspace" => 14,
        "tab" => 15,
        "q" => 16,
        "w" => 17,
        "e" => 18,
        "r" => 19,
        "t" => 20,
        "y" => 21,
        "u" => 22,
        "i" => 23,
        "o" => 24,
        "p" => 25,
        "enter" => 28,
        "ctrl" => 29,
        "a" => 30,
        "s" => 31,
        "d" => 32,
        "f" => 33,
        "g" => 34,
        "h" => 35,
        "j" => 36,
        "k" => 37,
        "l" => 38,
        "shift" => 42,
        "z" => 44,
        "x" => 45,
        "c" => 46,
        "v" => 47,
        "b" => 48,
        "n" => 49,
        "m" => 50,
        "alt" => 56,
        "space" => 57,
        "f1" => 59,
        "f2" => 60,
        "f3" => 61,
        "f4" => 62,
        "f5" => 63,
        "f6" => 64,
        "f7" => 65,
        "f8" => 66,
        "f9" => 67,
        "f10" => 68,
        "num7" => 71,
        "num8" => 72,
        "num9" => 73,
        "num4" => 75,
        "num5" => 76,
        "num6" => 77,
        "num1" => 79,
        "num2" => 80,
        "num3" => 81,
        "num0" => 82,
        "f11" => 87,
        "f12" => 88,
        "up" => 103,
        "left" => 105,
        "right" => 106,
        "down" => 108,
        "delete" => 111,
        _ => return None,
    };
    Some(code)
}

/// Windows virtual-key code.
#[cfg(any(windows, test))]
pub fn windows_vk_code(name: &str) -> Option<u16> {
    let bytes = name.as_bytes();
    if bytes.len() == 1 && (bytes[0].is_ascii_lowercase() || bytes[0].is_ascii_digit()) {
        // VK codes for letters and digits are their uppercase ASCII.
        return Some(u16::from(bytes[0].to_ascii_uppercase()));
    }
    if let Some(digit) = name.strip_prefix("num").and_then(single_digit) {
        return Some(0x60 + digit);
    }
    if let Some(n) = name.strip_prefix('f').and_then(|n| n.parse::<u16>().ok()) {
        return (1..=12).contains(&n).then(|| 0x6F + n);
    }
    let code = match name {
        "space" => 0x20,
        "enter" => 0x0D,
        "escape" => 0x1B,
        "tab" => 0x09,
        "backspace" => 0x08,
        "delete" => 0x2E,
        "up" => 0x26,
        "down" => 0x28,
        "left" => 0x25,
        "right" => 0x27,
        "shift" => 0x10,
        "ctrl" => 0x11,
        "alt" => 0x12,
        _ => return None,
    };
    Some(code)
}

/// macOS virtual key code (`kVK_*` from `Events.h`).
#[cfg(any(target_os = "macos", test))]
pub fn macos_key_code(name: &str) -> Option<u16> {
    let code = match name {
        "a" => 0x00,
        "s" => 0x01,
        "d" => 0x02,
        "f" => 0x03,
        "h" => 0x04,
        "g" => 0x05,
        "z" => 0x06,
        "x" => 0x07,
        "c" => 0x08,
        "v" => 0x09,
        "b" => 0x0B,
        "q" => 0x0C,
        "w" => 0x0D,
        "e" => 0x0E,
        "r" => 0x0F,
        "y" => 0x10,
        "t" => 0x11,
        "1" => 0x12,
        "2" => 0x13,
        "3" => 0x14,
        "4" => 0x15,
        "6" => 0x16,
        "5" => 0x17,
        "9" => 0x19,
        "7" => 0x1A,
        "8" => 0x1C,
        "0" => 0x1D,
        "o" => 0x1F,
        "u" => 0x20,
        "i" => 0x22,
        "p" => 0x23,
        "enter" => 0x24,
        "l" => 0x25,
        "j" => 0x26,
        "k" => 0x28,
        "n" => 0x2D,
        "m" => 0x2E,
        "tab" => 0x30,
        "space" => 0x31,
        "backspace" => 0x33,
        "escape" => 0x35,
        "shift" => 0x38,
        "alt" => 0x3A,
        "ctrl" => 0x3B,
        "num0" => 0x52,
        "num1" => 0x53,
        "num2" => 0x54,
        "num3" => 0x55,
        "num4" => 0x56,
        "num5" => 0x57,
        "num6" => 0x58,
        "num7" => 0x59,
        "num8" => 0x5B,
        "num9" => 0x5C,
        "f5" => 0x60,
        "f6" => 0x61,
        "f7" => 0x62,
        "f3" => 0x63,
        "f8" => 0x64,
        "f9" => 0x65,
        "f11" => 0x67,
        "f10" => 0x6D,
        "f12" => 0x6F,
        "delete" => 0x75,
        "f4" => 0x76,
        "f2" => 0x78,
        "f1" => 0x7A,
        "left" => 0x7B,
        "right" => 0x7C,
        "down" => 0x7D,
        "up" => 0x7E,
        _ => return None,
    };
    Some(code)
}

#[cfg(any(windows, test))]
fn single_digit(s: &str) -> Option<u16> {
    match s.as_bytes() {
        [d @ b'0'..=b'9'] => Some(u16::from(d - b'0')),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use switch_core::KEY_NAMES;

    fn assert_complete_and_unique(table: fn(&str) -> Option<u16>) {
        let mut seen = HashSet::new();
        for name in KEY_NAMES {
            let code = table(name).unwrap_or_else(|| panic!("`{name}` has no code"));
            assert!(seen.insert(code), "`{name}` reuses code {code:#x}");
        }
        assert_eq!(table("numlock"), None);
        assert_eq!(table(""), None);
    }

    #[test]
    fn test_linux_table() {
        assert_complete_and_unique(linux_key_code);
        assert_eq!(linux_key_code("k"), Some(37));
        assert_eq!(linux_key_code("up"), Some(103));
    }

    #[test]
    fn test_windows_table() {
        assert_complete_and_unique(windows_vk_code);
        assert_eq!(windows_vk_code("k"), Some(0x4B));
        assert_eq!(windows_vk_code("7"), Some(0x37));
        assert_eq!(windows_vk_code("num3"), Some(0x63));
        assert_eq!(windows_vk_code("f1"), Some(0x70));
        assert_eq!(windows_vk_code("f12"), Some(0x7B));
        assert_eq!(windows_vk_code("f13"), None);
        assert_eq!(windows_vk_code("K"), None);
    }

    #[test]
    fn test_macos_table() {
        assert_complete_and_unique(macos_key_code);
        assert_eq!(macos_key_code("a"), Some(0x00));
        assert_eq!(macos_key_code("up"), Some(0x7E));
    }
}
