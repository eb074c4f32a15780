// ⚠️ Classification Errors
// Everything that can go wrong between a raw (date, hour) input and a label

use thiserror::Error;

/// Errors raised while validating a birth date / hour before classification.
///
/// The pillar, balance and scoring stages are total over validated input, so
/// every variant here is an input problem the caller can report back.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClassifyError {
    /// Not of the form `[-]YYYY-MM-DD`.
    #[error("Malformed date '{input}': expected YYYY-MM-DD")]
    MalformedDate { input: String },

    /// Year outside the range the calendar layer can represent.
    #[error("Year {year} is out of the supported range [{min}, {max}]")]
    YearOutOfRange { year: i64, min: i32, max: i32 },

    #[error("Month {month} is out of range [1, 12]")]
    MonthOutOfRange { month: u32 },

    /// Day does not exist in that month (leap years included).
    #[error("Day {day} does not exist in {year:04}-{month:02}")]
    DayOutOfRange { year: i32, month: u32, day: u32 },

    /// Hour value that is not a whole number (`"noon"`, `7.5`).
    #[error("Malformed hour '{input}': expected a whole number 0-23")]
    MalformedHour { input: String },

    #[error("Hour {hour} is out of range [0, 23]")]
    HourOutOfRange { hour: i64 },
}

impl ClassifyError {
    /// Short machine-friendly tag, used in batch reports and API payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedDate { .. } => "malformed_date",
            Self::YearOutOfRange { .. } => "year_out_of_range",
            Self::MonthOutOfRange { .. } => "month_out_of_range",
            Self::DayOutOfRange { .. } => "day_out_of_range",
            Self::MalformedHour { .. } => "malformed_hour",
            Self::HourOutOfRange { .. } => "hour_out_of_range",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_values() {
        let err = ClassifyError::DayOutOfRange { year: 2023, month: 2, day: 29 };
        assert_eq!(err.to_string(), "Day 29 does not exist in 2023-02");

        let err = ClassifyError::HourOutOfRange { hour: 24 };
        assert!(err.to_string().contains("24"));
    }

    #[test]
    fn test_kinds_are_distinct() {
        let errors = vec![
            ClassifyError::MalformedDate { input: "x".to_string() },
            ClassifyError::YearOutOfRange { year: 1_000_000, min: -1, max: 1 },
            ClassifyError::MonthOutOfRange { month: 13 },
            ClassifyError::DayOutOfRange { year: 2000, month: 4, day: 31 },
            ClassifyError::MalformedHour { input: "noon".to_string() },
            ClassifyError::HourOutOfRange { hour: -1 },
        ];

        let kinds: std::collections::HashSet<_> = errors.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds.len(), errors.len());
        assert_eq!(errors[5].kind(), "malformed_hour");
    }
}
