//! Human readable size and duration parsing
//!
//! Sizes use binary prefixes (`4g` is 4 * 1024^3) and durations are a run of
//! number + unit pairs such as `1h30m`.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

/// One binary gigabyte in bytes.
pub const GIGABYTE: f64 = 1024.0 * 1024.0 * 1024.0;

static SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d+\.\d*|\.\d+|\d+)\s*([kmgt]?)b?\s*$").expect("size pattern is valid")
});

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*(\d+)\s*([wdhms]?)\s*(.*)$").expect("duration pattern is valid")
});

/// Parse a human readable size like `"4g"` into bytes (`4 * 1024^3`).
///
/// Accepts a decimal number, an optional `k`/`m`/`g`/`t` prefix (any case)
/// and an optional trailing `b`.
pub fn parse_size(text: &str) -> Result<f64> {
    let caps = SIZE_RE.captures(text).ok_or_else(|| {
        Error::parse(
            "size",
            text,
            "size should be a number followed by optional si prefix",
        )
    })?;
    let value: f64 = caps[1]
        .parse()
        .map_err(|e: std::num::ParseFloatError| Error::parse("size", text, e.to_string()))?;
    let exponent = match caps[2].to_ascii_lowercase().as_str() {
        "k" => 1,
        "m" => 2,
        "g" => 3,
        "t" => 4,
        _ => 0,
    };
    Ok(value * 1024f64.powi(exponent))
}

/// Parse a human readable duration like `"1h30m"` into seconds.
///
/// A lone number without a unit means seconds, but only when it is the whole
/// string: `"1h 30"` is rejected because the trailing part has no unit.
pub fn parse_duration(text: &str) -> Result<u64> {
    let mut total: u64 = 0;
    let mut got_anything = false;
    let mut rest = text;

    while !rest.is_empty() {
        let caps = DURATION_RE.captures(rest).ok_or_else(|| {
            Error::parse(
                "duration",
                text,
                "time should be a number followed by optional unit",
            )
        })?;
        let tail = caps.get(3).map_or("", |m| m.as_str());
        let multiplier = match caps[2].to_ascii_lowercase().as_str() {
            "w" => 7 * 24 * 60 * 60,
            "d" => 24 * 60 * 60,
            "h" => 60 * 60,
            "m" => 60,
            "s" => 1,
            _ => {
                if !tail.is_empty() {
                    return Err(Error::parse("duration", text, "trailing data"));
                }
                if got_anything {
                    return Err(Error::parse(
                        "duration",
                        text,
                        "multipart time must specify all units",
                    ));
                }
                1
            }
        };
        let value: u64 = caps[1]
            .parse()
            .map_err(|e: std::num::ParseIntError| Error::parse("duration", text, e.to_string()))?;
        total = value
            .checked_mul(multiplier)
            .and_then(|seconds| total.checked_add(seconds))
            .ok_or_else(|| Error::parse("duration", text, "duration overflows"))?;
        got_anything = true;
        rest = tail;
    }

    if !got_anything {
        return Err(Error::parse("duration", text, "no time could be parsed"));
    }
    Ok(total)
}
