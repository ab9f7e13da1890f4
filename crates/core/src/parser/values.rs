use chrono::{DateTime, Utc};
use std::str::FromStr;

/// `A, B,,C ` -> `["A", "B", "C"]`
pub fn phase_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

pub fn integer<T: FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

/// RFC 3339 with any offset, normalized to UTC.
pub fn timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn lists_skip_empty_entries() {
        let phases: Vec<_> = phase_list("LLVM_INIT, MEMORY_MANAGER,, ").collect();
        assert_eq!(phases, vec!["LLVM_INIT", "MEMORY_MANAGER"]);
    }

    #[test]
    fn integers() {
        assert_eq!(integer::<i64>("-3"), Some(-3));
        assert_eq!(integer::<u32>("-3"), None);
        assert_eq!(integer::<i64>("high"), None);
    }

    #[test]
    fn timestamps_normalize_offsets() {
        let expected = Utc.with_ymd_and_hms(2025, 10, 15, 14, 30, 0).unwrap();
        assert_eq!(timestamp("2025-10-15T14:30:00Z"), Some(expected));
        assert_eq!(timestamp("2025-10-15T16:30:00+02:00"), Some(expected));
        assert_eq!(timestamp("yesterday"), None);
    }
}
