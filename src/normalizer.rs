use chrono::NaiveDate;
use regex::Regex;

use crate::error::HarvestError;
use crate::model::SalaryPeriod;

/// Pure text-to-structured-value conversion for the raw employment-terms
/// field. No I/O; the regex is compiled once per run.
pub struct SalaryNormalizer {
    amount_regex: Regex,
    exchange_rate: f64,
}

impl SalaryNormalizer {
    pub fn new(exchange_rate: f64) -> Self {
        SalaryNormalizer {
            // Dollar sign, digits, optional decimal point and thousands comma.
            amount_regex: Regex::new(r"\$\d+\.?,?\d*").unwrap(),
            exchange_rate,
        }
    }

    /// Every dollar-amount substring, in order of appearance.
    pub fn extract_pay_amounts<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.amount_regex.find_iter(text).map(|m| m.as_str()).collect()
    }

    /// Integer USD value of each amount, truncated. Digits after a decimal
    /// point are dropped; thousands separators are stripped.
    pub fn convert_to_usd(&self, text: &str) -> Vec<i64> {
        self.extract_pay_amounts(text)
            .into_iter()
            .map(|raw| {
                let mut digits = String::new();
                for ch in raw.chars() {
                    if ch.is_ascii_digit() {
                        digits.push(ch);
                    }
                    if ch == '.' {
                        break;
                    }
                }
                // The regex guarantees at least one digit.
                let hkd: i64 = digits.parse().unwrap_or(0);
                (hkd as f64 / self.exchange_rate) as i64
            })
            .collect()
    }

    /// `"$low - $high"` from the first two amounts in document order, or
    /// `"$amount"` when only one is present. Zero amounts reject the
    /// listing rather than inserting junk.
    pub fn format_pay_range(&self, text: &str) -> Result<String, HarvestError> {
        let amounts = self.convert_to_usd(text);
        match amounts.as_slice() {
            [] => Err(HarvestError::MalformedSalary(text.trim().to_string())),
            [single] => Ok(format!("${single}")),
            [low, high, ..] => Ok(format!("${low} - ${high}")),
        }
    }

    /// The site only ever writes the literal phrase "per month" for monthly
    /// salaries; anything else is day-rated.
    pub fn classify_pay_period(&self, text: &str) -> SalaryPeriod {
        if text.contains("per month") {
            SalaryPeriod::PerMonth
        } else {
            SalaryPeriod::PerDay
        }
    }
}

/// Strict `DD/MM/YYYY` -> `YYYY-MM-DD`.
pub fn reformat_posting_date(raw: &str) -> Result<String, HarvestError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%d/%m/%Y")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .map_err(|_| HarvestError::DateFormat(trimmed.to_string()))
}
