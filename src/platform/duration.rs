//! Millisecond amounts for `advance` steps in scripts and `exec --step advance:<amount>`.
//!
//! Accepted forms: a bare millisecond count (`"250"`), or a number with one of
//! the units `ms`, `s`, `m`, `h`. Seconds and larger units may carry a
//! fraction (`"1.5s"`); anything finer than a millisecond is dropped.

use crate::{HarnessError, HarnessResult};

/// Longest suffix first so `ms` is never read as `m` + `s`.
const UNITS: [(&str, u64); 4] = [("ms", 1), ("s", 1_000), ("m", 60_000), ("h", 3_600_000)];

pub fn parse_duration_ms(input: &str) -> HarnessResult<u64> {
    let amount = input.trim();
    let bad = |why: &str| HarnessError::InvalidArgument(format!("advance amount {input:?}: {why}"));
    if amount.is_empty() {
        return Err(bad("empty"));
    }
    if let Ok(ms) = amount.parse::<u64>() {
        return Ok(ms);
    }

    let (number, scale) = UNITS
        .iter()
        .find_map(|(unit, scale)| amount.strip_suffix(unit).map(|n| (n.trim_end(), *scale)))
        .ok_or_else(|| bad("expected milliseconds or a unit of ms, s, m or h"))?;
    if number.is_empty() {
        return Err(bad("missing number before the unit"));
    }
    scaled(number, scale).ok_or_else(|| bad("not a non-negative number, or too large"))
}

fn scaled(number: &str, scale: u64) -> Option<u64> {
    let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut ms = whole.checked_mul(scale)?;
    let mut place = scale;
    for digit in frac.bytes() {
        place /= 10;
        ms = ms.checked_add(u64::from(digit - b'0') * place)?;
    }
    Some(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_and_bare_milliseconds() {
        assert_eq!(parse_duration_ms("250ms").expect("ms"), 250);
        assert_eq!(parse_duration_ms("250").expect("bare"), 250);
        assert_eq!(parse_duration_ms(" 30s ").expect("s"), 30_000);
        assert_eq!(parse_duration_ms("5m").expect("m"), 300_000);
        assert_eq!(parse_duration_ms("2h").expect("h"), 7_200_000);
    }

    #[test]
    fn fractions_scale_to_whole_milliseconds() {
        assert_eq!(parse_duration_ms("1.5s").expect("1.5s"), 1_500);
        assert_eq!(parse_duration_ms("0.25m").expect("0.25m"), 15_000);
        assert_eq!(parse_duration_ms(".7s").expect(".7s"), 700);
        assert_eq!(parse_duration_ms("2.9ms").expect("2.9ms"), 2);
    }

    #[test]
    fn malformed_amounts_name_the_input() {
        for bad in ["", "ms", "soon", "3d", "-5s", ".s", "1.2.3s", "99999999999999999999h"] {
            let err = parse_duration_ms(bad).expect_err(bad);
            assert!(err.to_string().contains("advance amount"), "{bad}: {err}");
        }
    }
}
