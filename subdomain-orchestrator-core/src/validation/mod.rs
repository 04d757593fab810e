//! Name and address validation.
//!
//! Pure functions; every failure is a [`CoreError::ValidationError`] carrying a
//! stable, user-facing message.

mod reserved;

pub use reserved::is_reserved;

use crate::error::{CoreError, CoreResult};

pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 63;

/// Ports below 1024 that may still be targeted.
pub const ALLOWED_PRIVILEGED_PORTS: [u16; 2] = [80, 443];

/// Trim and lowercase user input before any check.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// DNS label rules: 3-63 characters of `[a-z0-9-]`, alphanumeric at both ends.
pub fn validate_name(name: &str) -> CoreResult<()> {
    let len = name.chars().count();
    if len < MIN_NAME_LEN {
        return Err(invalid(format!(
            "Subdomain name must be at least {MIN_NAME_LEN} characters"
        )));
    }
    if len > MAX_NAME_LEN {
        return Err(invalid(format!(
            "Subdomain name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }

    let label_char = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    let edges_ok = name.starts_with(label_char) && name.ends_with(label_char);
    let body_ok = name.chars().all(|c| label_char(c) || c == '-');
    if !(edges_ok && body_ok) {
        return Err(invalid(
            "Subdomain name must start and end with alphanumeric characters, \
             and contain only lowercase letters, numbers, and hyphens",
        ));
    }
    Ok(())
}

/// Rejects reserved names with the claim-time message.
pub fn ensure_not_reserved(name: &str) -> CoreResult<()> {
    if is_reserved(name) {
        return Err(invalid(format!(
            "Subdomain '{name}' is reserved and cannot be claimed"
        )));
    }
    Ok(())
}

/// Dotted-quad IPv4: four groups of 1-3 digits, each 0-255.
///
/// IPv6 and every other syntax is reported as a format error.
pub fn validate_ipv4(s: &str) -> CoreResult<()> {
    let octets: Vec<&str> = s.split('.').collect();
    let well_formed = octets.len() == 4
        && octets
            .iter()
            .all(|o| (1..=3).contains(&o.len()) && o.bytes().all(|b| b.is_ascii_digit()));
    if !well_formed {
        return Err(invalid("Invalid IP address format"));
    }

    if !octets.iter().all(|o| o.parse::<u16>().is_ok_and(|v| v <= 255)) {
        return Err(invalid("Invalid IP address: octets must be 0-255"));
    }
    Ok(())
}

/// `1..=65535`; below 1024 only 80 and 443 are accepted.
pub fn validate_port(port: u32) -> CoreResult<u16> {
    let port = match u16::try_from(port) {
        Ok(p) if p != 0 => p,
        _ => return Err(invalid("Port must be between 1 and 65535")),
    };
    if port < 1024 && !ALLOWED_PRIVILEGED_PORTS.contains(&port) {
        return Err(invalid(format!(
            "Privileged port {port} is not allowed (only 80 and 443 are permitted below 1024)"
        )));
    }
    Ok(port)
}

fn invalid(msg: impl Into<String>) -> CoreError {
    CoreError::ValidationError(msg.into())
}
