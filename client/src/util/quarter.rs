//! Fiscal quarter labels used by the scorecard overview.
//!
//! Accepted forms (case-insensitive, separators optional): `Q3 2025`,
//! `Q3-2025`, `2025-Q3`, `2025 Q3`, `2025Q3`. Display is always `Q3 2025`.

#[cfg(test)]
#[path = "quarter_test.rs"]
mod quarter_test;

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuarterParseError {
    #[error("empty quarter label")]
    Empty,
    #[error("unrecognized quarter label: {0}")]
    Format(String),
    #[error("quarter must be between 1 and 4, got {0}")]
    OutOfRange(u8),
}

/// Calendar quarter. Orders by year, then quarter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quarter {
    year: i32,
    quarter: u8,
}

impl Quarter {
    pub fn new(year: i32, quarter: u8) -> Option<Self> {
        (1..=4).contains(&quarter).then_some(Self { year, quarter })
    }

    /// Quarter containing `month` (1..=12).
    pub fn from_month(year: i32, month: u32) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        let quarter = u8::try_from((month - 1) / 3 + 1).ok()?;
        Self::new(year, quarter)
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn quarter(self) -> u8 {
        self.quarter
    }

    /// Months covered, first to last.
    pub fn months(self) -> RangeInclusive<u32> {
        let first = u32::from(self.quarter - 1) * 3 + 1;
        first..=first + 2
    }

    #[must_use]
    pub fn next(self) -> Self {
        if self.quarter == 4 {
            Self { year: self.year + 1, quarter: 1 }
        } else {
            Self { year: self.year, quarter: self.quarter + 1 }
        }
    }

    #[must_use]
    pub fn prev(self) -> Self {
        if self.quarter == 1 {
            Self { year: self.year - 1, quarter: 4 }
        } else {
            Self { year: self.year, quarter: self.quarter - 1 }
        }
    }

    /// Compact form used in query strings (`2025-Q3`).
    pub fn query_value(self) -> String {
        format!("{}-Q{}", self.year, self.quarter)
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{} {}", self.quarter, self.year)
    }
}

impl FromStr for Quarter {
    type Err = QuarterParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '/' | '_'))
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if compact.is_empty() {
            return Err(QuarterParseError::Empty);
        }
        let format_err = || QuarterParseError::Format(raw.trim().to_owned());

        // Q<d><yyyy> or <yyyy>Q<d>
        let (quarter_digit, year_digits) = if let Some(rest) = compact.strip_prefix('Q') {
            let mut chars = rest.chars();
            let digit = chars.next().ok_or_else(format_err)?;
            (digit, chars.as_str().to_owned())
        } else {
            let (year, rest) = compact.split_once('Q').ok_or_else(format_err)?;
            let mut chars = rest.chars();
            let digit = chars.next().ok_or_else(format_err)?;
            if chars.next().is_some() {
                return Err(format_err());
            }
            (digit, year.to_owned())
        };

        if year_digits.len() != 4 || !year_digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(format_err());
        }
        let quarter = quarter_digit
            .to_digit(10)
            .and_then(|d| u8::try_from(d).ok())
            .ok_or_else(format_err)?;
        let year: i32 = year_digits.parse().map_err(|_| format_err())?;
        Self::new(year, quarter).ok_or(QuarterParseError::OutOfRange(quarter))
    }
}
