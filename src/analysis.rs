// 🔎 Single-record entry point
// "YYYY-MM-DD" + optional hour → label, or the full intermediate state behind it

use crate::balance::{aggregate, normalize, raw_weights, ElementBalance, ElementWeights};
use crate::constitution::{classify, ConstitutionLabel, ConstitutionScore};
use crate::error::ClassifyError;
use crate::input::{parse_hour, BirthDate, BirthHour};
use crate::pillars::{build_pillars, FourPillars};
use crate::tables::Element;
use serde::Serialize;

/// Everything computed for one birth moment, from pillars to label.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub birth_date: BirthDate,
    pub birth_hour: Option<BirthHour>,
    pub pillars: FourPillars,
    pub zodiac_animal: &'static str,
    pub weights: ElementWeights,
    pub balance: ElementBalance,
    pub scores: ConstitutionScore,
    pub label: ConstitutionLabel,
    pub dominant_element: Element,
    pub weakest_element: Element,
}

/// Run the pipeline on already-validated input.
pub fn analyze_validated(date: BirthDate, hour: Option<BirthHour>) -> Analysis {
    let pillars = build_pillars(&date, hour);
    let weights = raw_weights(&pillars);
    let balance = normalize(&weights);
    let scores = ConstitutionScore::from_balance(&balance);

    Analysis {
        birth_date: date,
        birth_hour: hour,
        zodiac_animal: pillars.zodiac_animal(),
        pillars,
        weights,
        balance,
        label: scores.winner(),
        scores,
        dominant_element: balance.dominant(),
        weakest_element: balance.weakest(),
    }
}

/// Validate and analyze a raw date string and optional hour.
pub fn analyze(date: &str, hour: Option<i64>) -> Result<Analysis, ClassifyError> {
    let date = BirthDate::parse(date)?;
    let hour = parse_hour(hour)?;
    Ok(analyze_validated(date, hour))
}

/// Validate and classify a raw date string and optional hour.
///
/// `Err` means the input could not be classified; `Ok` always holds exactly
/// one of the four labels.
pub fn classify_birth(date: &str, hour: Option<i64>) -> Result<ConstitutionLabel, ClassifyError> {
    let date = BirthDate::parse(date)?;
    let hour = parse_hour(hour)?;
    Ok(classify(&aggregate(&build_pillars(&date, hour))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worked_example() {
        let analysis = analyze("2000-01-01", None).unwrap();

        assert_eq!(analysis.balance.as_array(), [34, 16, 34, 0, 16]);
        assert!((analysis.scores.alpha - 50.0).abs() < 1e-9);
        assert!((analysis.scores.beta - 73.8).abs() < 1e-9);
        assert!((analysis.scores.gamma - 45.6).abs() < 1e-9);
        assert!((analysis.scores.delta - 16.0).abs() < 1e-9);
        assert_eq!(analysis.label, ConstitutionLabel::Beta);
        assert_eq!(analysis.dominant_element, Element::Wood);
        assert_eq!(analysis.weakest_element, Element::Metal);
        assert_eq!(analysis.zodiac_animal, "Rabbit");

        assert_eq!(classify_birth("2000-01-01", None).unwrap(), ConstitutionLabel::Beta);
    }

    #[test]
    fn test_with_hour() {
        let analysis = analyze("2000-01-01", Some(0)).unwrap();
        assert!(analysis.pillars.hour.is_some());
        assert_eq!(analysis.balance.as_array(), [27, 13, 27, 0, 33]);
        assert_eq!(analysis.label, ConstitutionLabel::Beta);
    }

    #[test]
    fn test_deterministic() {
        for (date, hour) in [("1994-09-12", None), ("1988-02-16", Some(14)), ("-0069-01-01", None)] {
            let first = analyze(date, hour).unwrap();
            for _ in 0..3 {
                let again = analyze(date, hour).unwrap();
                assert_eq!(again.label, first.label);
                assert_eq!(again.balance, first.balance);
            }
            assert_eq!(classify_birth(date, hour).unwrap(), first.label);
        }
    }

    #[test]
    fn test_known_labels() {
        let cases = [
            ("2000-01-01", None, ConstitutionLabel::Beta),
            ("2000-01-01", Some(0), ConstitutionLabel::Beta),
            ("1994-09-12", None, ConstitutionLabel::Delta),
            ("1994-09-12", Some(17), ConstitutionLabel::Gamma),
            ("1993-05-16", None, ConstitutionLabel::Alpha),
            ("1397-05-15", None, ConstitutionLabel::Beta),
            ("1990-09-05", None, ConstitutionLabel::Alpha),
            ("1990-09-05", Some(17), ConstitutionLabel::Delta),
            ("1988-02-16", None, ConstitutionLabel::Gamma),
            // Day before Lichun still counts toward the previous year
            ("2004-02-03", None, ConstitutionLabel::Delta),
            ("2004-02-03", Some(17), ConstitutionLabel::Gamma),
        ];

        for (date, hour, expected) in cases {
            assert_eq!(classify_birth(date, hour), Ok(expected), "{} {:?}", date, hour);
        }
    }

    #[test]
    fn test_invalid_input_is_distinguishable() {
        let err = classify_birth("2000-02-30", None).unwrap_err();
        assert_eq!(err.kind(), "day_out_of_range");

        let err = classify_birth("2000-01-01", Some(24)).unwrap_err();
        assert_eq!(err, ClassifyError::HourOutOfRange { hour: 24 });

        assert!(classify_birth("not a date", None).is_err());
    }

    #[test]
    fn test_analysis_serializes() {
        let json = serde_json::to_value(analyze("2000-01-01", Some(5)).unwrap()).unwrap();

        assert_eq!(json["birth_date"], "2000-01-01");
        assert_eq!(json["birth_hour"], 5);
        assert_eq!(json["label"], "Beta");
        assert_eq!(json["pillars"]["year"]["stem"], "Ji");
        assert_eq!(json["pillars"]["year"]["branch"], "Mao");
        assert!(json["pillars"]["hour"].is_object());
        assert_eq!(json["balance"].as_object().unwrap().len(), 5);
    }
}
