//! Simulated product data for the GizmoTron 5000 support desk.
//!
//! All data in this module is hardcoded and fictional. It stands in for the
//! warranty database and knowledge base a real deployment would query.

use std::fmt;

/// Shape every serial number follows, shown to users when one is missing or
/// malformed.
pub const SERIAL_FORMAT: &str = "GZ5K-XXXXXX";

const SERIAL_PREFIX: &str = "GZ5K-";
const SERIAL_SUFFIX_LEN: usize = 6;

// ── Knowledge base (mock) ─────────────────────────────────────────────────────

pub const TROUBLESHOOTING_STEPS: [&str; 4] = [
    "1. Unplug the GizmoTron 5000 and wait for 60 seconds.",
    "2. Plug it back in and wait for the status light to turn solid blue.",
    "3. Ensure your phone's Bluetooth is enabled and you are within 10 feet (3 meters).",
    "4. Try saying 'Hey Gizmo, reboot yourself'.",
];

// ── Warranty database (mock) ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarrantyStatus {
    Active,
    Expired,
}

impl fmt::Display for WarrantyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarrantyStatus::Active => f.write_str("Active"),
            WarrantyStatus::Expired => f.write_str("Expired"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarrantyEntry {
    pub serial_number: &'static str,
    pub status: WarrantyStatus,
    /// ISO date.
    pub expires: &'static str,
}

const WARRANTIES: [WarrantyEntry; 3] = [
    WarrantyEntry {
        serial_number: "GZ5K-112358",
        status: WarrantyStatus::Active,
        expires: "2026-08-15",
    },
    WarrantyEntry {
        serial_number: "GZ5K-132134",
        status: WarrantyStatus::Expired,
        expires: "2024-03-20",
    },
    WarrantyEntry {
        serial_number: "GZ5K-213455",
        status: WarrantyStatus::Active,
        expires: "2025-11-01",
    },
];

/// Look up the warranty for an already-normalized serial number.
pub fn lookup_warranty(serial_number: &str) -> Option<&'static WarrantyEntry> {
    WARRANTIES.iter().find(|w| w.serial_number == serial_number)
}

/// Trim and upper-case a user-supplied serial number.
pub fn normalize_serial(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// True if `serial` (normalized) is `GZ5K-` followed by six ASCII
/// alphanumerics.
pub fn is_valid_serial(serial: &str) -> bool {
    serial
        .strip_prefix(SERIAL_PREFIX)
        .is_some_and(|rest| {
            rest.len() == SERIAL_SUFFIX_LEN && rest.chars().all(|c| c.is_ascii_alphanumeric())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_serials_resolve() {
        let entry = lookup_warranty("GZ5K-132134").unwrap();
        assert_eq!(entry.status, WarrantyStatus::Expired);
        assert_eq!(entry.expires, "2024-03-20");
        assert!(lookup_warranty("GZ5K-000000").is_none());
    }

    #[test]
    fn test_serial_format() {
        assert!(is_valid_serial("GZ5K-112358"));
        assert!(is_valid_serial(&normalize_serial(" gz5k-abc123 ")));
        assert!(!is_valid_serial("GZ5K-1123"));
        assert!(!is_valid_serial("GZ5K-1123589"));
        assert!(!is_valid_serial("XX5K-112358"));
        assert!(!is_valid_serial("GZ5K-11 358"));
    }
}
