//! Validation helpers and parsing utilities for configuration values.

use std::net::IpAddr;

use giftshop_telemetry::LogFormat;

use crate::error::{ConfigError, ConfigResult};

/// Parse a TCP port, rejecting zero and out-of-range values.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not a usable port.
pub fn parse_port(field: &'static str, value: &str) -> ConfigResult<u16> {
    let port = value
        .trim()
        .parse::<u16>()
        .map_err(|_| invalid(field, "not_a_port", value))?;
    if port == 0 {
        return Err(invalid(field, "zero", value));
    }
    Ok(port)
}

/// Parse an IP address to bind the HTTP server to.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not an IP address.
pub fn parse_bind_addr(field: &'static str, value: &str) -> ConfigResult<IpAddr> {
    value
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| invalid(field, "not_an_ip_address", value))
}

/// Parse a log format name.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for names other than `json`/`pretty`.
pub fn parse_log_format(field: &'static str, value: &str) -> ConfigResult<LogFormat> {
    value
        .parse::<LogFormat>()
        .map_err(|_| invalid(field, "unknown_log_format", value))
}

/// Reduce a phone number to its digits.
///
/// Spaces, dashes, dots, parentheses and a leading `+` are accepted as
/// decoration; anything else is rejected.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value contains other
/// characters or no digits at all.
pub fn normalize_whatsapp_number(field: &'static str, value: &str) -> ConfigResult<String> {
    let trimmed = value.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let mut digits = String::with_capacity(body.len());
    for ch in body.chars() {
        match ch {
            '0'..='9' => digits.push(ch),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return Err(invalid(field, "invalid_characters", value)),
        }
    }
    if digits.is_empty() {
        return Err(invalid(field, "no_digits", value));
    }
    Ok(digits)
}

fn invalid(field: &'static str, reason: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidField {
        field,
        reason,
        value: Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_port_accepts_valid_range() -> ConfigResult<()> {
        assert_eq!(parse_port("PORT", "3000")?, 3000);
        assert_eq!(parse_port("PORT", " 65535 ")?, 65_535);
        Ok(())
    }

    #[test]
    fn parse_port_rejects_zero_and_garbage() {
        assert!(matches!(
            parse_port("PORT", "0"),
            Err(ConfigError::InvalidField { reason: "zero", .. })
        ));
        assert!(matches!(
            parse_port("PORT", "70000"),
            Err(ConfigError::InvalidField {
                reason: "not_a_port",
                ..
            })
        ));
        assert!(parse_port("PORT", "http").is_err());
    }

    #[test]
    fn parse_bind_addr_handles_v4_and_v6() -> ConfigResult<()> {
        assert!(parse_bind_addr("GIFTSHOP_BIND_ADDR", "127.0.0.1")?.is_loopback());
        assert!(parse_bind_addr("GIFTSHOP_BIND_ADDR", "::1")?.is_loopback());
        assert!(parse_bind_addr("GIFTSHOP_BIND_ADDR", "localhost").is_err());
        Ok(())
    }

    #[test]
    fn whatsapp_numbers_are_reduced_to_digits() -> ConfigResult<()> {
        assert_eq!(
            normalize_whatsapp_number("whatsapp_number", "+234 801-234 5678")?,
            "2348012345678"
        );
        assert_eq!(
            normalize_whatsapp_number("whatsapp_number", "(234) 801.234")?,
            "234801234"
        );
        Ok(())
    }

    #[test]
    fn whatsapp_numbers_reject_letters_and_empty() {
        assert!(matches!(
            normalize_whatsapp_number("whatsapp_number", "234XXXXXXXXXX"),
            Err(ConfigError::InvalidField {
                reason: "invalid_characters",
                ..
            })
        ));
        assert!(matches!(
            normalize_whatsapp_number("whatsapp_number", "+ -"),
            Err(ConfigError::InvalidField {
                reason: "no_digits",
                ..
            })
        ));
    }

    #[test]
    fn parse_log_format_maps_names() -> ConfigResult<()> {
        assert_eq!(parse_log_format("GIFTSHOP_LOG_FORMAT", "json")?, LogFormat::Json);
        assert!(parse_log_format("GIFTSHOP_LOG_FORMAT", "yaml").is_err());
        Ok(())
    }
}
