//! Numeric program data: `[+|-]digits[.digits][E[+|-]digits][ ][unit]`.

use thiserror::Error;

/// A parsed numeric argument with its optional unit suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericValue {
    pub magnitude: f64,
    pub unit: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumericError {
    #[error("no numeric mantissa in {0:?}")]
    NoMantissa(String),
    #[error("value out of representable range")]
    NotFinite,
}

/// Parse one content token into a magnitude and unit.
pub fn parse_numeric(token: &str) -> Result<NumericValue, NumericError> {
    let s = token.trim();
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }
    if digits == 0 {
        return Err(NumericError::NoMantissa(s.to_string()));
    }

    // An exponent only counts when digits follow; otherwise the letter starts a unit.
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    let magnitude: f64 = s[..i]
        .parse()
        .map_err(|_| NumericError::NoMantissa(s.to_string()))?;
    if !magnitude.is_finite() {
        return Err(NumericError::NotFinite);
    }

    let rest = s[i..].trim();
    let unit = (!rest.is_empty()).then(|| rest.to_string());
    Ok(NumericValue { magnitude, unit })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(token: &str) -> (f64, Option<String>) {
        let v = parse_numeric(token).unwrap();
        (v.magnitude, v.unit)
    }

    fn unit(u: &str) -> Option<String> {
        Some(u.to_string())
    }

    #[test]
    fn plain_integers_and_decimals() {
        assert_eq!(ok("300"), (300.0, None));
        assert_eq!(ok("+12.5"), (12.5, None));
        assert_eq!(ok("-5"), (-5.0, None));
        assert_eq!(ok(".5"), (0.5, None));
        assert_eq!(ok("7."), (7.0, None));
    }

    #[test]
    fn unit_suffixes() {
        assert_eq!(ok("300C"), (300.0, unit("C")));
        assert_eq!(ok("300F"), (300.0, unit("F")));
        assert_eq!(ok("300 C"), (300.0, unit("C")));
        assert_eq!(ok("1.5KC"), (1.5, unit("KC")));
    }

    #[test]
    fn exponent_needs_digits() {
        assert_eq!(ok("2.5E2"), (250.0, None));
        assert_eq!(ok("1e-1C"), (0.1, unit("C")));
        assert_eq!(ok("5E"), (5.0, unit("E")));
        assert_eq!(ok("5E+"), (5.0, unit("E+")));
    }

    #[test]
    fn rejects_missing_mantissa() {
        assert!(matches!(parse_numeric("C"), Err(NumericError::NoMantissa(_))));
        assert!(matches!(parse_numeric("-"), Err(NumericError::NoMantissa(_))));
        assert!(matches!(parse_numeric(""), Err(NumericError::NoMantissa(_))));
        assert!(matches!(parse_numeric("."), Err(NumericError::NoMantissa(_))));
    }

    #[test]
    fn rejects_overflow() {
        assert_eq!(parse_numeric("1e999"), Err(NumericError::NotFinite));
    }
}
