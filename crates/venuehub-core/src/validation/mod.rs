//! Field validators shared by request DTOs
//!
//! Each function follows the `validator` custom-function signature so it can
//! be referenced from `#[validate(custom(function = "..."))]`.

use std::borrow::Cow;
use validator::ValidationError;

pub const MAX_SLUG_LENGTH: usize = 64;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Lowercase alphanumerics separated by single hyphens.
pub fn validate_slug(value: &str) -> Result<(), ValidationError> {
    let well_formed = value.split('-').all(|part| {
        !part.is_empty()
            && part
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
    });
    if value.is_empty() || value.len() > MAX_SLUG_LENGTH || !well_formed {
        return Err(invalid(
            "slug",
            "Slug must contain only lowercase letters, digits and single hyphens",
        ));
    }
    Ok(())
}

/// `#RRGGBB`
pub fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    let bytes = value.as_bytes();
    if bytes.len() != 7 || bytes[0] != b'#' || !bytes[1..].iter().all(u8::is_ascii_hexdigit) {
        return Err(invalid("hex_color", "Color must be in #RRGGBB format"));
    }
    Ok(())
}

/// 24-hour `HH:MM`
pub fn validate_clock_time(value: &str) -> Result<(), ValidationError> {
    if clock_minutes(value).is_none() {
        return Err(invalid("clock_time", "Time must be in HH:MM (24h) format"));
    }
    Ok(())
}

/// ISO-4217 style three-letter uppercase code.
pub fn validate_currency_code(value: &str) -> Result<(), ValidationError> {
    if value.len() != 3 || !value.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(invalid(
            "currency",
            "Currency must be a three-letter uppercase code",
        ));
    }
    Ok(())
}

/// Parse `HH:MM` into minutes since midnight.
pub fn clock_minutes(value: &str) -> Option<u32> {
    let (h, m) = value.split_once(':')?;
    let digits = h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit());
    if h.len() != 2 || m.len() != 2 || !digits {
        return None;
    }
    let (hours, minutes) = (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?);
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Build a case-insensitive `ILIKE` pattern, escaping wildcard characters.
pub fn like_pattern(search: &str) -> String {
    let escaped = search
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_rules() {
        assert!(validate_slug("green-turf-arena").is_ok());
        assert!(validate_slug("arena42").is_ok());
        assert!(validate_slug("Green").is_err());
        assert!(validate_slug("double--hyphen").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("").is_err());
        assert!(validate_slug(&"a".repeat(65)).is_err());
    }

    #[test]
    fn color_rules() {
        assert!(validate_hex_color("#1A2b3C").is_ok());
        assert!(validate_hex_color("1A2B3C").is_err());
        assert!(validate_hex_color("#FFF").is_err());
    }

    #[test]
    fn clock_time_parsing() {
        assert_eq!(clock_minutes("00:00"), Some(0));
        assert_eq!(clock_minutes("18:30"), Some(18 * 60 + 30));
        assert_eq!(clock_minutes("24:00"), None);
        assert_eq!(clock_minutes("7:00"), None);
        assert!(validate_clock_time("23:59").is_ok());
    }

    #[test]
    fn currency_rules() {
        assert!(validate_currency_code("INR").is_ok());
        assert!(validate_currency_code("inr").is_err());
        assert!(validate_currency_code("EURO").is_err());
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("turf"), "%turf%");
        assert_eq!(like_pattern(" 50%_off "), "%50\\%\\_off%");
    }
}
