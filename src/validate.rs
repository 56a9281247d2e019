use crate::error::{Error, Result};

/// Check `value` against the closed set `valid`.
pub fn validate<S: AsRef<str>>(parameter: &str, value: &str, valid: &[S]) -> Result<()> {
    if valid.iter().any(|v| v.as_ref() == value) {
        return Ok(());
    }
    Err(unrecognized(parameter, value, valid))
}

pub fn unrecognized<S: AsRef<str>>(parameter: &str, value: &str, valid: &[S]) -> Error {
    let expected = valid
        .iter()
        .map(|v| format!("'{}'", v.as_ref()))
        .collect::<Vec<_>>()
        .join(", ");
    Error::InvalidArgument {
        parameter: parameter.to_string(),
        value: value.to_string(),
        expected: format!("[{expected}]"),
    }
}

/// Unit of a relative date offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetUnit {
    Days,
    Weeks,
    Years,
}

/// A relative offset such as `3d`, `1w` or `2y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset {
    pub amount: u64,
    pub unit: OffsetUnit,
}

impl Offset {
    /// SQLite date modifier that moves a point in time back by this offset.
    /// Weeks are normalized to days.
    pub fn modifier(self) -> String {
        match self.unit {
            OffsetUnit::Days => format!("-{} days", self.amount),
            OffsetUnit::Weeks => format!("-{} days", self.amount.saturating_mul(7)),
            OffsetUnit::Years => format!("-{} years", self.amount),
        }
    }
}

/// Parse an offset of the form `<non-negative integer><d|w|y>`.
pub fn parse_offset(parameter: &str, value: &str) -> Result<Offset> {
    let invalid = || Error::InvalidArgument {
        parameter: parameter.to_string(),
        value: value.to_string(),
        expected: "of the form 'X[d/w/y]' where X is a non-negative integer followed by \
                   'd', 'w', or 'y' that indicates days, weeks, or years"
            .to_string(),
    };

    let (digits, unit) = match value.char_indices().last() {
        Some((idx, 'd')) => (&value[..idx], OffsetUnit::Days),
        Some((idx, 'w')) => (&value[..idx], OffsetUnit::Weeks),
        Some((idx, 'y')) => (&value[..idx], OffsetUnit::Years),
        _ => return Err(invalid()),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let amount = digits.parse::<u64>().map_err(|_| invalid())?;
    Ok(Offset { amount, unit })
}

/// Validate an optional offset without keeping the parsed value.
pub fn validate_offset(parameter: &str, value: Option<&str>) -> Result<()> {
    if let Some(v) = value {
        parse_offset(parameter, v)?;
    }
    Ok(())
}
