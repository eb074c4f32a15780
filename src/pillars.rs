// 🏛️ Four-Pillars Builder
// Birth date (+ optional hour) → year / month / day / hour stem-branch pairs

use crate::input::{BirthDate, BirthHour};
use crate::tables::{
    Branch, Element, Stem, HOUR_STEM_OFFSET, MONTH_STEM_OFFSET, SOLAR_TERM_BOUNDARIES,
};
use serde::Serialize;
use std::fmt;

// ============================================================================
// PILLAR
// ============================================================================

/// One (stem, branch) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Pillar {
    pub stem: Stem,
    pub branch: Branch,
}

impl Pillar {
    pub fn new(stem: Stem, branch: Branch) -> Self {
        Pillar { stem, branch }
    }

    /// Elements of the stem and branch halves.
    pub fn elements(&self) -> (Element, Element) {
        (self.stem.element(), self.branch.element())
    }

    /// Romanized name, e.g. "Jia-Zi".
    pub fn name(&self) -> String {
        format!("{}-{}", self.stem.name(), self.branch.name())
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem.hanja(), self.branch.hanja())
    }
}

/// The four pillars of a birth moment. `hour` is present only when an hour
/// was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FourPillars {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    pub hour: Option<Pillar>,
}

impl FourPillars {
    /// Zodiac animal of the year branch.
    pub fn zodiac_animal(&self) -> &'static str {
        self.year.branch.animal()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Year used by the year pillar: it turns over at the start of February
/// (Lichun), not on January 1.
pub fn astronomical_year(year: i64, month: u32, day: u32) -> i64 {
    if month < 2 || (month == 2 && day < 4) {
        year - 1
    } else {
        year
    }
}

/// Index (0-11) of the solar month containing (month, day).
pub fn solar_month_index(month: u32, day: u32) -> usize {
    let date = (month, day);

    (0..SOLAR_TERM_BOUNDARIES.len())
        .find(|&i| {
            let start = SOLAR_TERM_BOUNDARIES[i];
            let end = SOLAR_TERM_BOUNDARIES[(i + 1) % SOLAR_TERM_BOUNDARIES.len()];

            if start <= end {
                date >= start && date < end
            } else {
                // Interval wraps over the year end
                date >= start || date < end
            }
        })
        // The boundaries partition the calendar year
        .unwrap_or(0)
}

pub fn year_pillar(astro_year: i64) -> Pillar {
    Pillar::new(
        Stem::from_cycle(astro_year.rem_euclid(10) + 6),
        Branch::from_cycle(astro_year.rem_euclid(12) + 8),
    )
}

pub fn month_pillar(year_stem: Stem, solar_month: usize) -> Pillar {
    let sm = solar_month as i64;
    let offset = MONTH_STEM_OFFSET[year_stem.index() % 5];

    Pillar::new(Stem::from_cycle(offset + sm), Branch::from_cycle(sm + 2))
}

/// Day pillar from a Julian Day Number.
pub fn day_pillar(day_number: i64) -> Pillar {
    let di = (day_number + 9).rem_euclid(60);
    Pillar::new(Stem::from_cycle(di % 10), Branch::from_cycle(di % 12))
}

/// Hour pillar. Each branch covers two clock hours starting at 23:00.
pub fn hour_pillar(day_stem: Stem, hour: BirthHour) -> Pillar {
    let branch = ((hour.value() as i64 + 1) % 24) / 2;
    let offset = HOUR_STEM_OFFSET[day_stem.index() % 5];

    Pillar::new(Stem::from_cycle(offset + branch), Branch::from_cycle(branch))
}

/// Build the four pillars for a validated birth date and optional hour.
pub fn build_pillars(date: &BirthDate, hour: Option<BirthHour>) -> FourPillars {
    let (month, day) = (date.month(), date.day());

    let year = year_pillar(astronomical_year(date.year() as i64, month, day));
    let month_p = month_pillar(year.stem, solar_month_index(month, day));
    let day_p = day_pillar(date.day_number());
    let hour_p = hour.map(|h| hour_pillar(day_p.stem, h));

    FourPillars {
        year,
        month: month_p,
        day: day_p,
        hour: hour_p,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> BirthDate {
        BirthDate::parse(s).unwrap()
    }

    #[test]
    fn test_astronomical_year_turns_at_lichun() {
        assert_eq!(astronomical_year(2000, 1, 1), 1999);
        assert_eq!(astronomical_year(2000, 2, 3), 1999);
        assert_eq!(astronomical_year(2000, 2, 4), 2000);
        assert_eq!(astronomical_year(2000, 12, 31), 2000);
    }

    #[test]
    fn test_solar_month_boundaries() {
        assert_eq!(solar_month_index(2, 4), 0);
        assert_eq!(solar_month_index(3, 5), 0);
        assert_eq!(solar_month_index(3, 6), 1);
        assert_eq!(solar_month_index(12, 6), 9);
        assert_eq!(solar_month_index(12, 7), 10);
        assert_eq!(solar_month_index(12, 31), 10);
        assert_eq!(solar_month_index(1, 1), 10);
        assert_eq!(solar_month_index(1, 4), 10);
        assert_eq!(solar_month_index(1, 5), 11);
        assert_eq!(solar_month_index(2, 3), 11);
    }

    #[test]
    fn test_every_day_has_a_solar_month() {
        let mut seen = [false; 12];
        for month in 1..=12u32 {
            for day in 1..=31u32 {
                seen[solar_month_index(month, day)] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_reference_date_pillars() {
        // 2000-01-01: astro year 1999, solar month 10, JDN index 14
        let pillars = build_pillars(&date("2000-01-01"), None);

        assert_eq!(pillars.year, Pillar::new(Stem::Ji, Branch::Mao));
        assert_eq!(pillars.month, Pillar::new(Stem::Bing, Branch::Zi));
        assert_eq!(pillars.day, Pillar::new(Stem::Wu, Branch::Yin));
        assert_eq!(pillars.hour, None);
        assert_eq!(pillars.year.to_string(), "己卯");
        assert_eq!(pillars.zodiac_animal(), "Rabbit");
    }

    #[test]
    fn test_hour_pillar_only_when_supplied() {
        let d = date("2000-01-01");
        assert!(build_pillars(&d, None).hour.is_none());

        let hour = BirthHour::new(0).unwrap();
        let pillars = build_pillars(&d, Some(hour));
        // Day stem Wu (group 4) starts hours at Ren
        assert_eq!(pillars.hour, Some(Pillar::new(Stem::Ren, Branch::Zi)));
    }

    #[test]
    fn test_hour_branch_windows() {
        let stem = Stem::Jia;
        let branch_of = |h: i64| hour_pillar(stem, BirthHour::new(h).unwrap()).branch;

        assert_eq!(branch_of(23), Branch::Zi);
        assert_eq!(branch_of(0), Branch::Zi);
        assert_eq!(branch_of(1), Branch::Chou);
        assert_eq!(branch_of(2), Branch::Chou);
        assert_eq!(branch_of(11), Branch::Wu);
        assert_eq!(branch_of(12), Branch::Wu);
        assert_eq!(branch_of(22), Branch::Hai);
    }

    #[test]
    fn test_year_pillar_cycles_every_sixty_years() {
        for year in [1900i64, 1984, 2000, 2024] {
            assert_eq!(year_pillar(year), year_pillar(year + 60));
            assert_eq!(year_pillar(year), year_pillar(year - 60));
        }
        // 1984 opens a cycle
        assert_eq!(year_pillar(1984), Pillar::new(Stem::Jia, Branch::Zi));
    }

    #[test]
    fn test_negative_years_stay_on_cycle() {
        // -70 and 1970 are 34 cycles apart
        let ancient = build_pillars(&date("-0069-01-01"), None);
        let modern = build_pillars(&date("1971-01-01"), None);

        assert_eq!(ancient.year, modern.year);
        assert_eq!(ancient.year, Pillar::new(Stem::Geng, Branch::Xu));
        assert_eq!(ancient.month.branch, modern.month.branch);

        assert_eq!(year_pillar(0), Pillar::new(Stem::Geng, Branch::Shen));
        assert_eq!(year_pillar(-1), Pillar::new(Stem::Ji, Branch::Wei));
        assert_eq!(year_pillar(-60), year_pillar(0));
    }

    #[test]
    fn test_day_pillar_advances_one_step_per_day() {
        let a = day_pillar(2_451_545);
        let b = day_pillar(2_451_546);
        assert_eq!((a.stem.index() + 1) % 10, b.stem.index());
        assert_eq!((a.branch.index() + 1) % 12, b.branch.index());
        assert_eq!(day_pillar(2_451_545), day_pillar(2_451_545 + 60));
    }
}
