//! Simple-interest return calculator.

use super::format::{grouped, CURRENCY};

/// Raw text of the three calculator fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculatorInputs {
    pub amount: String,
    pub duration: String,
    pub rate: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Returns {
    pub total_interest: f64,
    pub total_return: f64,
    pub months: f64,
    pub monthly_income: f64,
}

/// What the three output labels show.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnsText {
    pub interest: String,
    pub monthly: String,
    pub total: String,
}

/// Reads the longest numeric prefix of `text`. Anything unusable is 0.
pub fn parse_input(text: &str) -> f64 {
    numeric_prefix(text.trim())
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .unwrap_or(0.0)
}

/// `[+-] digits [. digits] [e [+-] digits]`, with at least one mantissa
/// digit. An exponent marker without digits is left out.
fn numeric_prefix(text: &str) -> &str {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return "";
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    &text[..end]
}

/// `amount` in RWF, `duration` in years, `rate` in annual percent.
pub fn compute(amount: f64, duration: f64, rate: f64) -> Returns {
    let total_interest = amount * (rate / 100.0) * duration;
    let months = duration * 12.0;
    let monthly_income = if months > 0.0 {
        total_interest / months
    } else {
        0.0
    };
    Returns {
        total_interest,
        total_return: amount + total_interest,
        months,
        monthly_income,
    }
}

fn money(value: f64, max_fraction_digits: usize) -> String {
    format!("{} {}", grouped(value, max_fraction_digits), CURRENCY)
}

impl Returns {
    pub fn formatted(&self) -> ReturnsText {
        ReturnsText {
            interest: money(self.total_interest, 3),
            monthly: money(self.monthly_income, 0),
            total: money(self.total_return, 3),
        }
    }
}

impl CalculatorInputs {
    pub fn returns(&self) -> Returns {
        compute(
            parse_input(&self.amount),
            parse_input(&self.duration),
            parse_input(&self.rate),
        )
    }
}
