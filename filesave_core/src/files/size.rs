//! Size expressions such as `"256MB"`, `"1.2GB"` or `"500 b"`.

use lazy_static::lazy_static;
use regex::Regex;

use super::validation::UploadError;

lazy_static! {
    static ref SIZE_EXPRESSION: Regex =
        Regex::new(r"(?i)^([0-9]+)(\.[0-9]+)?\s*(B|KB|MB|GB|TB)$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
    Terabytes,
}

impl SizeUnit {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "B" => Some(Self::Bytes),
            "KB" => Some(Self::Kilobytes),
            "MB" => Some(Self::Megabytes),
            "GB" => Some(Self::Gigabytes),
            "TB" => Some(Self::Terabytes),
            _ => None,
        }
    }

    pub fn multiplier(self) -> u64 {
        1024u64.pow(self as u32)
    }
}

/// Converts a size expression into a byte count, `floor(value * 1024^unit)`.
///
/// Zero is a valid result; a `"0B"` limit rejects every non-empty file.
pub fn size_to_bytes(input: &str) -> Result<u64, UploadError> {
    let malformed = || UploadError::MalformedSizeExpression {
        size: input.to_string(),
    };

    let captures = SIZE_EXPRESSION.captures(input).ok_or_else(malformed)?;

    let unit_token = &captures[3];
    let unit = SizeUnit::from_token(unit_token).ok_or_else(|| UploadError::UnknownSizeUnit {
        unit: unit_token.to_ascii_uppercase(),
    })?;

    let fraction = captures.get(2).map_or("", |m| m.as_str());
    let value: f64 = format!("{}{}", &captures[1], fraction)
        .parse()
        .map_err(|_| malformed())?;

    Ok((value * unit.multiplier() as f64).floor() as u64)
}
