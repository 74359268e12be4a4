//! Number formatting shared by the tables, cards and calculator.

pub const CURRENCY: &str = "RWF";

/// Inserts `,` between every group of three digits.
pub fn group_digits(digits: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut result = String::with_capacity(chars.len() + chars.len() / 3);
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result
}

/// Grouped number with at most `max_fraction_digits` decimals, trailing
/// zeros dropped: `1234.5 -> "1,234.5"`, `200000.0 -> "200,000"`.
/// Exact ties round up.
pub fn grouped(value: f64, max_fraction_digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = round_half_up(value.abs(), max_fraction_digits);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };
    let mut out = String::new();
    if value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        out.push('-');
    }
    out.push_str(&group_digits(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// `abs` to `digits` decimals. `format!` rounds the exact binary value, which
/// settles everything except a true tie.
fn round_half_up(abs: f64, digits: usize) -> String {
    let wider = format!("{:.*}", digits + 1, abs);
    // At most `digits + 1` binary fraction bits means `wider` is exact.
    let exact = (abs * 2f64.powi(digits as i32 + 1)).fract() == 0.0;
    if !(exact && wider.ends_with('5')) {
        return format!("{:.*}", digits, abs);
    }
    let kept = wider[..wider.len() - 1].trim_end_matches('.');
    let mut bumped: Vec<u8> = kept.bytes().collect();
    let mut carry = true;
    for b in bumped.iter_mut().rev() {
        match *b {
            b'.' => continue,
            b'9' => *b = b'0',
            _ => {
                *b += 1;
                carry = false;
                break;
            }
        }
    }
    if carry {
        bumped.insert(0, b'1');
    }
    String::from_utf8(bumped).unwrap_or_else(|_| format!("{:.*}", digits, abs))
}

#[inline]
pub fn volume(volume: u64) -> String {
    group_digits(&volume.to_string())
}

#[inline]
pub fn fixed2(value: f64) -> String {
    format!("{:.2}", value)
}

/// Percent change with an explicit `+` for non-negative values.
pub fn signed_percent(change: f64) -> String {
    if change >= 0.0 {
        format!("+{:.2}%", change.abs())
    } else {
        format!("{:.2}%", change)
    }
}
