// ⚖️ Elemental Aggregator
// Four pillars → weighted element totals → integer percentages summing to 100

use crate::pillars::{FourPillars, Pillar};
use crate::tables::{Element, ALL_ELEMENTS};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

// ============================================================================
// PILLAR WEIGHTS
// ============================================================================

pub const YEAR_WEIGHT: f64 = 1.0;
pub const MONTH_WEIGHT: f64 = 1.2;
/// The day pillar is the most individual signal and weighs the most.
pub const DAY_WEIGHT: f64 = 1.5;
pub const HOUR_WEIGHT: f64 = 1.0;

// ============================================================================
// RAW WEIGHTS
// ============================================================================

/// Un-normalized weighted totals per element (table order).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementWeights([f64; 5]);

impl ElementWeights {
    /// Add `weight` to both halves of a pillar.
    fn add_pillar(&mut self, pillar: &Pillar, weight: f64) {
        let (stem_element, branch_element) = pillar.elements();
        self.0[stem_element.index()] += weight;
        self.0[branch_element.index()] += weight;
    }

    pub fn get(&self, element: Element) -> f64 {
        self.0[element.index()]
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn as_array(&self) -> [f64; 5] {
        self.0
    }
}

impl Serialize for ElementWeights {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_per_element(serializer, |e| self.get(e))
    }
}

/// Weighted element totals of a set of pillars, before normalization.
pub fn raw_weights(pillars: &FourPillars) -> ElementWeights {
    let mut weights = ElementWeights::default();

    weights.add_pillar(&pillars.year, YEAR_WEIGHT);
    weights.add_pillar(&pillars.month, MONTH_WEIGHT);
    weights.add_pillar(&pillars.day, DAY_WEIGHT);
    if let Some(hour) = &pillars.hour {
        weights.add_pillar(hour, HOUR_WEIGHT);
    }

    weights
}

// ============================================================================
// ELEMENT BALANCE
// ============================================================================

/// Integer element percentages. Always sums to exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementBalance([u32; 5]);

impl ElementBalance {
    /// Build from explicit percentages (Wood, Fire, Earth, Metal, Water).
    /// Rejects anything that does not sum to 100.
    pub fn from_percentages(values: [u32; 5]) -> Result<Self, BalanceError> {
        let sum: u32 = values.iter().sum();
        if sum != 100 {
            return Err(BalanceError { sum });
        }
        Ok(ElementBalance(values))
    }

    pub fn get(&self, element: Element) -> u32 {
        self.0[element.index()]
    }

    pub fn as_array(&self) -> [u32; 5] {
        self.0
    }

    /// Element with the highest share; ties go to the earlier element.
    pub fn dominant(&self) -> Element {
        ALL_ELEMENTS
            .iter()
            .copied()
            .fold(Element::Wood, |best, e| if self.get(e) > self.get(best) { e } else { best })
    }

    /// Element with the lowest share; ties go to the earlier element.
    pub fn weakest(&self) -> Element {
        ALL_ELEMENTS
            .iter()
            .copied()
            .fold(Element::Wood, |best, e| if self.get(e) < self.get(best) { e } else { best })
    }
}

impl Serialize for ElementBalance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_per_element(serializer, |e| self.get(e))
    }
}

/// Percentages that do not add up to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Element percentages sum to {sum}, expected 100")]
pub struct BalanceError {
    pub sum: u32,
}

/// Normalize raw totals to integer percentages summing to exactly 100.
///
/// Each share is rounded half away from zero; any rounding drift is then
/// absorbed by the largest share (first one on ties).
pub fn normalize(weights: &ElementWeights) -> ElementBalance {
    let total = weights.total();
    let raw = weights.as_array();

    let mut n = [0i64; 5];
    if total > 0.0 {
        for (slot, value) in n.iter_mut().zip(raw.iter()) {
            *slot = (value / total * 100.0).round() as i64;
        }
    }

    let sum: i64 = n.iter().sum();
    if sum != 100 {
        let mut max_index = 0;
        for i in 1..n.len() {
            if n[i] > n[max_index] {
                max_index = i;
            }
        }
        n[max_index] += 100 - sum;
    }

    // Drift is at most a couple of points and the max share is >= 20
    ElementBalance(n.map(|v| v.max(0) as u32))
}

/// Aggregate pillars into a normalized element balance.
pub fn aggregate(pillars: &FourPillars) -> ElementBalance {
    normalize(&raw_weights(pillars))
}

fn serialize_per_element<S, T, F>(serializer: S, value: F) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
    F: Fn(Element) -> T,
{
    let mut map = serializer.serialize_map(Some(ALL_ELEMENTS.len()))?;
    for element in ALL_ELEMENTS {
        map.serialize_entry(&element.name().to_lowercase(), &value(element))?;
    }
    map.end()
}
