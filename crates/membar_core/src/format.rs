//! Human-readable byte counts
//!
//! Scaling is done in exact integer fixed-point so no binary-float error
//! leaks into the rounded output.

use crate::error::FormatError;

/// Unit suffixes indexed by power of 1024.
pub const SIZE_SUFFIXES: [&str; 9] = ["bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

pub const DEFAULT_DECIMAL_PLACES: u32 = 1;

/// Larger values are clamped; `u64::MAX * 10^18` still fits in a `u128`.
pub const MAX_DECIMAL_PLACES: u32 = 18;

/// Formats a signed byte count, e.g. `1536` -> `"1.5 KB"`.
///
/// A value whose rounded mantissa would reach 1000 moves to the next unit,
/// so `1_023_949` renders as `"1.0 MB"` rather than `"1000.0 KB"`.
///
/// `decimal_places` above [`MAX_DECIMAL_PLACES`] is clamped to it. The
/// `Err` case only arises for byte counts wider than an `i64`, so this never
/// fails for any input it accepts.
pub fn format_size(value: i64, decimal_places: u32) -> Result<String, FormatError> {
    let text = format_unsigned(value.unsigned_abs() as u128, decimal_places)?;
    if value < 0 {
        Ok(format!("-{text}"))
    } else {
        Ok(text)
    }
}

/// Like [`format_size`], falling back to the raw byte count on error.
/// The fallback is unreachable for `i64` input.
pub fn format_size_lossy(value: i64, decimal_places: u32) -> String {
    format_size(value, decimal_places).unwrap_or_else(|err| {
        tracing::debug!(value, error = %err, "falling back to raw byte count");
        format!("{value} {}", SIZE_SUFFIXES[0])
    })
}

pub(crate) fn format_unsigned(bytes: u128, decimal_places: u32) -> Result<String, FormatError> {
    let decimal_places = decimal_places.min(MAX_DECIMAL_PLACES);
    let scale = 10u128.pow(decimal_places);

    if bytes == 0 {
        return Ok(format!("{} {}", render_fixed(0, scale, decimal_places), SIZE_SUFFIXES[0]));
    }

    // mag is 0 for bytes, 1 for KB, 2 for MB, etc.
    let mut magnitude = (127 - bytes.leading_zeros() as usize) / 10;
    let overflow = |magnitude| FormatError::MagnitudeOverflow {
        bytes,
        magnitude,
        largest: SIZE_SUFFIXES[SIZE_SUFFIXES.len() - 1],
    };
    let numerator = bytes.checked_mul(scale).ok_or_else(|| overflow(magnitude))?;

    let mut scaled = round_div(numerator, 1u128 << (10 * magnitude));
    if scaled >= 1000 * scale {
        magnitude += 1;
        if magnitude * 10 >= 128 {
            return Err(overflow(magnitude));
        }
        scaled = round_div(numerator, 1u128 << (10 * magnitude));
    }

    let suffix = SIZE_SUFFIXES.get(magnitude).ok_or_else(|| overflow(magnitude))?;
    Ok(format!("{} {}", render_fixed(scaled, scale, decimal_places), suffix))
}

/// Integer division rounding half away from zero; `divisor` is a power of two.
fn round_div(numerator: u128, divisor: u128) -> u128 {
    numerator / divisor + u128::from(numerator % divisor >= divisor - divisor / 2)
}

fn render_fixed(scaled: u128, scale: u128, decimal_places: u32) -> String {
    let whole = group_thousands(scaled / scale);
    if decimal_places == 0 {
        whole
    } else {
        format!("{whole}.{:0width$}", scaled % scale, width = decimal_places as usize)
    }
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
