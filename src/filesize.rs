use thiserror::Error;

pub const TERABYTE: u64 = 1 << 40;
pub const GIGABYTE: u64 = 1 << 30;
pub const MEGABYTE: u64 = 1 << 20;
pub const KILOBYTE: u64 = 1 << 10;

const UNITS: [(u64, &str); 4] = [
    (TERABYTE, "tb"),
    (GIGABYTE, "gb"),
    (MEGABYTE, "mb"),
    (KILOBYTE, "kb"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SizeError {
    #[error("unrecognized size unit: {0:?}")]
    InvalidUnit(String),
    #[error("invalid number in size: {0:?}")]
    InvalidNumber(String),
    #[error("size overflows the representable range: {0:?}")]
    Overflow(String),
    #[error("malformed size string: {0:?}")]
    Malformed(String),
}

fn unit_bytes(suffix: &str) -> Option<u64> {
    match suffix {
        "tb" | "tib" => Some(TERABYTE),
        "gb" | "gib" => Some(GIGABYTE),
        "mb" | "mib" => Some(MEGABYTE),
        "kb" | "kib" => Some(KILOBYTE),
        "b" | "bytes" => Some(1),
        _ => None,
    }
}

/// Parse a human-readable size string into a byte count.
///
/// Units are case-insensitive and use binary (base-1024) multipliers.
/// A single string may chain several number/unit components, which are
/// summed: `"5mb10kb"` is 5 MiB plus 10 KiB. Fractions are floored to
/// whole bytes: `"5.4mb"` is 5 MiB plus `floor(0.4 * MiB)`.
pub fn parse(text: &str) -> Result<u64, SizeError> {
    let text = text.trim().to_ascii_lowercase();
    if text.is_empty() {
        return Err(SizeError::InvalidNumber(text));
    }
    let raw = text.as_bytes();
    let mut total: u64 = 0;
    let mut pos = 0;
    while pos < raw.len() {
        let num_start = pos;
        while pos < raw.len() && (raw[pos].is_ascii_digit() || raw[pos] == b'.') {
            pos += 1;
        }
        if pos == num_start {
            // No numeric prefix: bad number at the start, trailing junk later.
            return Err(if num_start == 0 {
                SizeError::InvalidNumber(text.clone())
            } else {
                SizeError::Malformed(text.clone())
            });
        }
        let number = &text[num_start..pos];

        let suffix_start = pos;
        while pos < raw.len() && raw[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        if pos == suffix_start {
            return Err(SizeError::Malformed(text.clone()));
        }
        let suffix = &text[suffix_start..pos];
        let unit = unit_bytes(suffix).ok_or_else(|| SizeError::InvalidUnit(suffix.to_string()))?;

        let component = component_bytes(number, unit, &text)?;
        total = total
            .checked_add(component)
            .ok_or_else(|| SizeError::Overflow(text.clone()))?;
    }
    Ok(total)
}

fn component_bytes(number: &str, unit: u64, original: &str) -> Result<u64, SizeError> {
    if number.contains('.') {
        let value: f64 = number
            .parse()
            .map_err(|_| SizeError::InvalidNumber(number.to_string()))?;
        let bytes = (value * unit as f64).floor();
        if bytes > u64::MAX as f64 {
            return Err(SizeError::Overflow(original.to_string()));
        }
        Ok(bytes as u64)
    } else {
        let value: u64 = number
            .parse()
            .map_err(|_| SizeError::InvalidNumber(number.to_string()))?;
        value
            .checked_mul(unit)
            .ok_or_else(|| SizeError::Overflow(original.to_string()))
    }
}

/// Format a byte count compactly, greedily taking the largest units first:
/// 5 MiB + 10 KiB becomes `"5mb10kb"`. Zero formats as `"0b"`.
pub fn format(bytes: u64) -> String {
    let mut out = String::new();
    let mut remainder = bytes;
    for (unit, suffix) in UNITS {
        let value = remainder / unit;
        if value > 0 {
            out.push_str(&format!("{value}{suffix}"));
            remainder %= unit;
        }
    }
    if remainder > 0 || out.is_empty() {
        out.push_str(&format!("{remainder}b"));
    }
    out
}

/// Format a byte count as a three-decimal fraction of the largest unit it
/// fills, e.g. `"5.500mb"`. Values under 1 KiB stay whole bytes.
pub fn format_fraction(bytes: u64) -> String {
    for (unit, suffix) in UNITS {
        if bytes >= unit {
            return format!("{:.3}{}", bytes as f64 / unit as f64, suffix);
        }
    }
    format!("{bytes}b")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_bytes() {
        assert_eq!(parse("5b"), Ok(5));
        assert_eq!(parse("5bytes"), Ok(5));
        assert_eq!(parse("0b"), Ok(0));
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse("5kb"), Ok(5 * KILOBYTE));
        assert_eq!(parse("5mb"), Ok(5 * MEGABYTE));
        assert_eq!(parse("5gb"), Ok(5 * GIGABYTE));
        assert_eq!(parse("5tb"), Ok(5 * TERABYTE));
        assert_eq!(parse("5mib"), Ok(5 * MEGABYTE));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(parse("5MiB"), Ok(5 * MEGABYTE));
        assert_eq!(parse("5MB"), Ok(5 * MEGABYTE));
    }

    #[test]
    fn test_parse_fraction_floors() {
        let expected = 5 * MEGABYTE + (0.4 * MEGABYTE as f64).floor() as u64;
        assert_eq!(parse("5.4mb"), Ok(expected));
    }

    #[test]
    fn test_parse_composite() {
        assert_eq!(parse("5mb10kb"), Ok(5 * MEGABYTE + 10 * KILOBYTE));
        assert_eq!(parse("1tb1gb1mb1kb1b"), Ok(TERABYTE + GIGABYTE + MEGABYTE + KILOBYTE + 1));
    }

    #[test]
    fn test_parse_rejects_unknown_unit() {
        assert_eq!(parse("5zb"), Err(SizeError::InvalidUnit("zb".into())));
    }

    #[test]
    fn test_parse_rejects_missing_number() {
        assert!(matches!(parse("mb"), Err(SizeError::InvalidNumber(_))));
        assert!(matches!(parse(""), Err(SizeError::InvalidNumber(_))));
        assert!(matches!(parse("5.4.2mb"), Err(SizeError::InvalidNumber(_))));
    }

    #[test]
    fn test_parse_rejects_trailing_number() {
        assert!(matches!(parse("5mb10"), Err(SizeError::Malformed(_))));
    }

    #[test]
    fn test_parse_overflow() {
        assert!(matches!(parse("20000000tb"), Err(SizeError::Overflow(_))));
    }

    #[test]
    fn test_format_boundaries() {
        assert_eq!(format(0), "0b");
        assert_eq!(format(5), "5b");
        assert_eq!(format(MEGABYTE), "1mb");
        assert_eq!(format(5 * MEGABYTE), "5mb");
        assert_eq!(format(5 * MEGABYTE + 10 * KILOBYTE), "5mb10kb");
    }

    #[test]
    fn test_format_parse_round_trip() {
        for n in [
            0,
            1,
            1023,
            KILOBYTE,
            KILOBYTE + 1,
            5 * MEGABYTE + 10 * KILOBYTE,
            3 * TERABYTE + 2 * GIGABYTE + 1,
        ] {
            assert_eq!(parse(&format(n)), Ok(n), "round trip failed for {n}");
        }
    }

    #[test]
    fn test_format_fraction() {
        assert_eq!(format_fraction(5 * MEGABYTE), "5.000mb");
        assert_eq!(format_fraction(5 * MEGABYTE + 512 * KILOBYTE), "5.500mb");
        assert_eq!(format_fraction(500), "500b");
        assert_eq!(format_fraction(2 * GIGABYTE), "2.000gb");
    }
}
