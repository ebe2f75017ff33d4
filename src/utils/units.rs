use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static BYTE_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)(.*)$").expect("valid byte size pattern"));

const IEC_UNITS: [&str; 6] = ["KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ByteSizeError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid integer: {0}")]
    InvalidInteger(String),

    #[error("Overflow: {0}")]
    Overflow(String),
}

fn multiplier(suffix: &str) -> Option<i64> {
    let value = match suffix {
        "" | "B" | " bytes" => 1,
        "kB" => 1_000,
        "MB" => 1_000_i64.pow(2),
        "GB" => 1_000_i64.pow(3),
        "TB" => 1_000_i64.pow(4),
        "PB" => 1_000_i64.pow(5),
        "EB" => 1_000_i64.pow(6),
        "KiB" => 1 << 10,
        "MiB" => 1 << 20,
        "GiB" => 1 << 30,
        "TiB" => 1 << 40,
        "PiB" => 1 << 50,
        "EiB" => 1 << 60,
        _ => return None,
    };
    Some(value)
}

/// 將 "10GB"、"512MiB" 這類字串轉換為位元組數。空字串視為 0。
pub fn parse_byte_size(input: &str) -> Result<i64, ByteSizeError> {
    if input.is_empty() {
        return Ok(0);
    }

    let caps = BYTE_SIZE_RE
        .captures(input)
        .ok_or_else(|| ByteSizeError::InvalidValue(input.to_string()))?;

    let value: i64 = caps[1]
        .parse()
        .map_err(|_| ByteSizeError::InvalidInteger(input.to_string()))?;

    let multiplier =
        multiplier(&caps[2]).ok_or_else(|| ByteSizeError::InvalidValue(input.to_string()))?;

    value
        .checked_mul(multiplier)
        .ok_or_else(|| ByteSizeError::Overflow(input.to_string()))
}

/// Render a byte count with binary units, e.g. `1536` -> `"1.5KiB"`.
pub fn format_byte_size_iec(input: i64, precision: usize) -> String {
    if input < 1024 {
        return format!("{}B", input);
    }

    let mut value = input as f64;
    for unit in IEC_UNITS {
        value /= 1024.0;
        if value < 1024.0 {
            return format!("{:.*}{}", precision, value, unit);
        }
    }

    format!("{:.*}EiB", precision, value)
}
