// 🔢 Day-Number Converter
// Proleptic Gregorian date → Julian Day Number (Fliegel–Van Flandern)

/// Julian Day Number of a proleptic Gregorian date.
///
/// Integer-only; every division is a floor division so the result stays
/// continuous across year 0 and into negative (astronomical) years.
pub fn day_number(year: i64, month: i64, day: i64) -> i64 {
    let a = (14 - month).div_euclid(12);
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;

    day + (153 * m + 2).div_euclid(5) + 365 * y + y.div_euclid(4) - y.div_euclid(100)
        + y.div_euclid(400)
        - 32045
}
