// ✅ Input Validation - Birth date & hour
// Raw strings/integers are checked here; everything downstream assumes valid input

use crate::day_number::day_number;
use crate::error::ClassifyError;
use chrono::{Datelike, NaiveDate};
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// BIRTH DATE
// ============================================================================

/// A validated proleptic Gregorian date.
///
/// Parsed from strict ISO `YYYY-MM-DD`; years before 1 use astronomical
/// numbering with a leading minus (`-0069-01-01` is 70 BCE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BirthDate(NaiveDate);

impl BirthDate {
    /// Build from components, rejecting impossible months and days.
    pub fn from_ymd(year: i64, month: u32, day: u32) -> Result<Self, ClassifyError> {
        if !(1..=12).contains(&month) {
            return Err(ClassifyError::MonthOutOfRange { month });
        }

        let (min, max) = (NaiveDate::MIN.year(), NaiveDate::MAX.year());
        if year < min as i64 || year > max as i64 {
            return Err(ClassifyError::YearOutOfRange { year, min, max });
        }
        let year = year as i32;

        NaiveDate::from_ymd_opt(year, month, day)
            .map(BirthDate)
            .ok_or(ClassifyError::DayOutOfRange { year, month, day })
    }

    /// Parse `[-]YYYY-MM-DD` (surrounding whitespace ignored).
    pub fn parse(input: &str) -> Result<Self, ClassifyError> {
        let malformed = || ClassifyError::MalformedDate {
            input: input.to_string(),
        };

        let trimmed = input.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let mut parts = body.split('-');
        let (y, m, d) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(y), Some(m), Some(d), None) => (y, m, d),
            _ => return Err(malformed()),
        };

        let all_digits = [y, m, d]
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));
        if !all_digits || y.len() < 4 || m.len() != 2 || d.len() != 2 {
            return Err(malformed());
        }

        let year: i64 = y.parse().map_err(|_| malformed())?;
        let month: u32 = m.parse().map_err(|_| malformed())?;
        let day: u32 = d.parse().map_err(|_| malformed())?;

        Self::from_ymd(if negative { -year } else { year }, month, day)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Julian Day Number of this date.
    pub fn day_number(&self) -> i64 {
        day_number(self.year() as i64, self.month() as i64, self.day() as i64)
    }
}

impl FromStr for BirthDate {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year = self.year();
        if year < 0 {
            write!(f, "-{:04}-{:02}-{:02}", -year, self.month(), self.day())
        } else {
            write!(f, "{:04}-{:02}-{:02}", year, self.month(), self.day())
        }
    }
}

impl Serialize for BirthDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// BIRTH HOUR
// ============================================================================

/// Hour of birth, 0-23 local clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BirthHour(u8);

impl BirthHour {
    pub fn new(hour: i64) -> Result<Self, ClassifyError> {
        if (0..=23).contains(&hour) {
            Ok(BirthHour(hour as u8))
        } else {
            Err(ClassifyError::HourOutOfRange { hour })
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// Validate an optional raw hour.
pub fn parse_hour(hour: Option<i64>) -> Result<Option<BirthHour>, ClassifyError> {
    hour.map(BirthHour::new).transpose()
}

/// Read an hour written as text. Only whole numbers are accepted; the
/// 0-23 range is checked later by [`BirthHour::new`].
pub fn parse_hour_text(text: &str) -> Result<i64, ClassifyError> {
    text.trim().parse().map_err(|_| ClassifyError::MalformedHour {
        input: text.to_string(),
    })
}

// ============================================================================
// RAW HOUR (roster files)
// ============================================================================

/// Birth hour as it appears in a roster file.
///
/// Deserializing never fails on the value itself, so one bad cell cannot
/// abort a whole roster load. Anything that is not a whole number is kept
/// verbatim and rejected when the record is classified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawHour {
    Whole(i64),
    Other(String),
}

impl RawHour {
    pub fn value(&self) -> Result<i64, ClassifyError> {
        match self {
            RawHour::Whole(hour) => Ok(*hour),
            RawHour::Other(text) => parse_hour_text(text),
        }
    }
}

impl From<i64> for RawHour {
    fn from(hour: i64) -> Self {
        RawHour::Whole(hour)
    }
}

impl Serialize for RawHour {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RawHour::Whole(hour) => serializer.serialize_i64(*hour),
            RawHour::Other(text) => serializer.serialize_str(text),
        }
    }
}

struct RawHourVisitor;

impl<'de> Visitor<'de> for RawHourVisitor {
    type Value = RawHour;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a birth hour")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<RawHour, E> {
        Ok(RawHour::Other(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RawHour, E> {
        Ok(RawHour::Whole(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RawHour, E> {
        Ok(i64::try_from(v).map_or_else(|_| RawHour::Other(v.to_string()), RawHour::Whole))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<RawHour, E> {
        Ok(RawHour::Other(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RawHour, E> {
        Ok(match parse_hour_text(v) {
            Ok(hour) => RawHour::Whole(hour),
            Err(_) => RawHour::Other(v.to_string()),
        })
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawHour, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(RawHour::Other("[..]".to_string()))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawHour, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(RawHour::Other("{..}".to_string()))
    }
}

impl<'de> Deserialize<'de> for RawHour {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawHourVisitor)
    }
}
