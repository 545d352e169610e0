//! en-US number formatting for calculator output.

const COMPACT_TIERS: [(f64, &str); 5] = [
    (1.0, ""),
    (1e3, "K"),
    (1e6, "M"),
    (1e9, "B"),
    (1e12, "T"),
];

/// USD with 2 to 4 fraction digits: `$15.60`, `$0.0016`, `-$3.25`.
pub fn fmt_currency(value: f64) -> String {
    if !value.is_finite() {
        return non_finite(value, "$");
    }
    let (sign, digits) = fixed_parts(value, 2, 4);
    format!("{}${}", sign, digits)
}

/// Compact notation with at most one fraction digit: `39M`, `1.5K`, `999`.
pub fn fmt_compact(value: f64) -> String {
    if !value.is_finite() {
        return non_finite(value, "");
    }

    let abs = value.abs();
    let mut tier = COMPACT_TIERS
        .iter()
        .rposition(|(divisor, _)| abs >= *divisor)
        .unwrap_or(0);

    let mut scaled = round_to(abs / COMPACT_TIERS[tier].0, 1);
    // 999,999 rounds up to 1000K, which reads as 1M
    if scaled >= 1000.0 && tier + 1 < COMPACT_TIERS.len() {
        tier += 1;
        scaled = round_to(abs / COMPACT_TIERS[tier].0, 1);
    }

    let signed = if value < 0.0 { -scaled } else { scaled };
    let (sign, digits) = fixed_parts(signed, 0, 1);
    format!("{}{}{}", sign, digits, COMPACT_TIERS[tier].1)
}

/// Grouped number with at most two fraction digits: `60,000`, `0.55`.
pub fn fmt_num_exact(value: f64) -> String {
    if !value.is_finite() {
        return non_finite(value, "");
    }
    let (sign, digits) = fixed_parts(value, 0, 2);
    format!("{}{}", sign, digits)
}

pub fn fmt_num_with_commas(value: f64) -> String {
    fmt_num_exact(value)
}

/// Token counts: `3.9k`, `39.0M`, below a thousand as a plain number.
pub fn fmt_tokens(value: f64) -> String {
    if !value.is_finite() {
        non_finite(value, "")
    } else if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1000.0 {
        format!("{:.1}k", value / 1000.0)
    } else {
        let (sign, digits) = fixed_parts(value, 0, 3);
        format!("{}{}", sign, digits)
    }
}

/// Whole-percent ROI with a leading `+` when positive.
pub fn fmt_roi(roi: f64) -> String {
    let prefix = if roi > 0.0 { "+" } else { "" };
    format!("{}{:.0}%", prefix, roi.round())
}

pub fn fmt_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

fn round_to(value: f64, fraction_digits: i32) -> f64 {
    let factor = 10f64.powi(fraction_digits);
    (value * factor).round() / factor
}

/// Sign and grouped digits for `value` rounded to `max_fraction` places,
/// with trailing zeros trimmed down to `min_fraction`.
fn fixed_parts(value: f64, min_fraction: usize, max_fraction: usize) -> (&'static str, String) {
    let rendered = round_half_away(value.abs(), max_fraction);
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (rendered.as_str(), ""),
    };

    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < min_fraction {
        frac.push('0');
    }

    let is_zero = int_part.bytes().all(|b| b == b'0') && frac.bytes().all(|b| b == b'0');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    let grouped = group_thousands(int_part);
    if frac.is_empty() {
        (sign, grouped)
    } else {
        (sign, format!("{}.{}", grouped, frac))
    }
}

/// Rounds the shortest round-trip decimal of a non-negative `value` to
/// `fraction_digits` places, ties away from zero.
fn round_half_away(value: f64, fraction_digits: usize) -> String {
    let shortest = value.to_string();
    let (int_part, frac_part) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(fraction_digits))
        .collect();

    if frac_part.as_bytes().get(fraction_digits).map_or(false, |d| *d >= b'5') {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - fraction_digits;
    let int_digits: String = digits[..split].iter().map(|&b| char::from(b)).collect();
    if fraction_digits == 0 {
        return int_digits;
    }
    let frac_digits: String = digits[split..].iter().map(|&b| char::from(b)).collect();
    format!("{}.{}", int_digits, frac_digits)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn non_finite(value: f64, prefix: &str) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value > 0.0 {
        format!("{}∞", prefix)
    } else {
        format!("-{}∞", prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency() {
        assert_eq!(fmt_currency(15.600000000000001), "$15.60");
        assert_eq!(fmt_currency(12.0), "$12.00");
        assert_eq!(fmt_currency(0.00156), "$0.0016");
        assert_eq!(fmt_currency(0.0012), "$0.0012");
        assert_eq!(fmt_currency(1_234_567.891), "$1,234,567.891");
        assert_eq!(fmt_currency(-78.5), "-$78.50");
        assert_eq!(fmt_currency(-0.00001), "$0.00");
        assert_eq!(fmt_currency(f64::NAN), "NaN");
        // Ties round away from zero
        assert_eq!(fmt_currency(0.03125), "$0.0313");
        assert_eq!(fmt_currency(-0.03125), "-$0.0313");
        assert_eq!(fmt_currency(9.99995), "$10.00");
    }

    #[test]
    fn test_compact() {
        assert_eq!(fmt_compact(999.0), "999");
        assert_eq!(fmt_compact(12.34), "12.3");
        assert_eq!(fmt_compact(1000.0), "1K");
        assert_eq!(fmt_compact(1500.0), "1.5K");
        assert_eq!(fmt_compact(60_000.0), "60K");
        assert_eq!(fmt_compact(39_000_000.0), "39M");
        assert_eq!(fmt_compact(999_999.0), "1M");
        assert_eq!(fmt_compact(2_460_000_000.0), "2.5B");
        assert_eq!(fmt_compact(-1500.0), "-1.5K");
    }

    #[test]
    fn test_exact_numbers() {
        assert_eq!(fmt_num_exact(60_000.0), "60,000");
        assert_eq!(fmt_num_exact(0.552), "0.55");
        assert_eq!(fmt_num_with_commas(1_000_000.5), "1,000,000.5");
        assert_eq!(fmt_num_exact(-1234.0), "-1,234");
        assert_eq!(fmt_num_exact(0.125), "0.13");
        assert_eq!(fmt_num_exact(2.5), "2.5");
        assert_eq!(fmt_num_exact(999.995), "1,000");
    }

    #[test]
    fn test_tokens() {
        assert_eq!(fmt_tokens(3900.0), "3.9k");
        assert_eq!(fmt_tokens(10_000.0), "10.0k");
        assert_eq!(fmt_tokens(39_000_000.0), "39.0M");
        assert_eq!(fmt_tokens(650.0), "650");
        assert_eq!(fmt_tokens(f64::INFINITY), "∞");
        assert_eq!(fmt_tokens(f64::NAN), "NaN");
    }

    #[test]
    fn test_roi() {
        assert_eq!(fmt_roi(76.923), "+77%");
        assert_eq!(fmt_roi(0.0), "0%");
        assert_eq!(fmt_roi(-12.4), "-12%");
        assert_eq!(fmt_percent(92.0), "92.0%");
    }
}
