//! Supported baud rate table
//!
//! The fixed set of line rates the monitor accepts, matching the classic
//! termios B-constants. Anything outside this table is rejected before it
//! reaches the device.

/// All accepted baud rates, ascending
pub const SUPPORTED_BAUDS: [u32; 26] = [
    50, 75, 110, 134, 150, 200, 300, 600, 1200, 1800, 2400, 4800, 9600, 19200, 38400, 57600,
    115_200, 230_400, 460_800, 500_000, 576_000, 921_600, 1_000_000, 1_152_000, 1_500_000,
    2_000_000,
];

/// Default line rate applied at startup
pub const DEFAULT_BAUD: u32 = 115_200;

/// Whether `rate` is a member of the supported set
pub fn is_supported(rate: u32) -> bool {
    SUPPORTED_BAUDS.contains(&rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_entry_is_supported() {
        for rate in SUPPORTED_BAUDS {
            assert!(is_supported(rate), "{} should be supported", rate);
        }
    }

    #[test]
    fn test_rates_outside_the_table_are_rejected() {
        for rate in [0, 1, 51, 100, 9601, 128_000, 3_000_000, u32::MAX] {
            assert!(!is_supported(rate), "{} should be rejected", rate);
        }
    }

    #[test]
    fn test_default_is_supported() {
        assert!(is_supported(DEFAULT_BAUD));
    }

    #[test]
    fn test_table_is_ascending_and_distinct() {
        for pair in SUPPORTED_BAUDS.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
