// 📚 Batch Registry Builder
// Precompute id → label for a whole roster so later lookups are plain map reads
//
// Records are independent: each one is classified on its own (optionally on the
// rayon pool) and the results are merged once every record is done. A record
// that fails validation never aborts the batch; it gets the fallback label.

use crate::analysis::classify_birth;
use crate::config::ClassifierConfig;
use crate::constitution::{ConstitutionLabel, ALL_LABELS};
use crate::error::ClassifyError;
use crate::input::RawHour;
use rayon::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

// ============================================================================
// INPUT RECORD
// ============================================================================

/// One roster entry: who, and when they were born.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthRecord {
    pub id: String,

    /// `YYYY-MM-DD`, validated at classification time
    pub birth_date: String,

    /// 0-23, absent when unknown. Kept raw until classification.
    #[serde(default)]
    pub birth_hour: Option<RawHour>,
}

impl BirthRecord {
    pub fn new(id: impl Into<String>, birth_date: impl Into<String>) -> Self {
        BirthRecord {
            id: id.into(),
            birth_date: birth_date.into(),
            birth_hour: None,
        }
    }

    /// Builder pattern: add birth hour
    pub fn with_hour(mut self, hour: i64) -> Self {
        self.birth_hour = Some(RawHour::Whole(hour));
        self
    }
}

/// Classify one record. Fallback substitution is the caller's job.
pub fn classify_record(record: &BirthRecord) -> Result<ConstitutionLabel, ClassifyError> {
    let hour = record.birth_hour.as_ref().map(RawHour::value).transpose()?;
    classify_birth(&record.birth_date, hour)
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Read-only id → label table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: HashMap<String, ConstitutionLabel>,
}

impl Registry {
    pub fn get(&self, id: &str) -> Option<ConstitutionLabel> {
        self.entries.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by id.
    pub fn sorted(&self) -> BTreeMap<&str, ConstitutionLabel> {
        self.entries.iter().map(|(id, label)| (id.as_str(), *label)).collect()
    }

    /// Number of ids per label; every label is present, possibly with 0.
    pub fn label_counts(&self) -> BTreeMap<ConstitutionLabel, usize> {
        let mut counts: BTreeMap<ConstitutionLabel, usize> =
            ALL_LABELS.iter().map(|l| (*l, 0)).collect();
        for label in self.entries.values() {
            *counts.entry(*label).or_insert(0) += 1;
        }
        counts
    }

    /// SHA-256 over the sorted `id=label` lines. Equal registries always
    /// produce equal digests, whatever order they were built in.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for (id, label) in self.sorted() {
            hasher.update(format!("{}={}\n", id, label.name()));
        }
        format!("{:x}", hasher.finalize())
    }
}

impl FromIterator<(String, ConstitutionLabel)> for Registry {
    fn from_iter<I: IntoIterator<Item = (String, ConstitutionLabel)>>(iter: I) -> Self {
        Registry {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Registry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.sorted().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Registry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = HashMap::<String, ConstitutionLabel>::deserialize(deserializer)?;
        Ok(Registry { entries })
    }
}

// ============================================================================
// BUILD REPORT
// ============================================================================

/// A record that was replaced with the fallback label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackEntry {
    pub id: String,
    pub kind: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistryReport {
    pub total_records: usize,
    pub classified_count: usize,
    pub fallback_label: ConstitutionLabel,
    pub fallbacks: Vec<FallbackEntry>,
    pub duplicate_ids: usize,
    pub label_counts: BTreeMap<ConstitutionLabel, usize>,
    pub digest: String,
}

impl RegistryReport {
    pub fn summary(&self) -> String {
        let counts = self
            .label_counts
            .iter()
            .map(|(label, count)| format!("{}={}", label, count))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Records: {}, Classified: {}, Fallback ({}): {}, Duplicate ids: {} | {}",
            self.total_records,
            self.classified_count,
            self.fallback_label,
            self.fallbacks.len(),
            self.duplicate_ids,
            counts
        )
    }

    pub fn has_fallbacks(&self) -> bool {
        !self.fallbacks.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct RegistryBuild {
    pub registry: Registry,
    pub report: RegistryReport,
}

// ============================================================================
// BUILDER
// ============================================================================

/// Build the registry with the default configuration.
pub fn build_registry(records: &[BirthRecord]) -> Registry {
    build_registry_with(records, &ClassifierConfig::default()).registry
}

/// Build the registry and a report of what happened along the way.
pub fn build_registry_with(records: &[BirthRecord], config: &ClassifierConfig) -> RegistryBuild {
    let (unique, duplicate_ids) = dedupe(records, config.skip_duplicate_ids);

    let results: Vec<(&BirthRecord, Result<ConstitutionLabel, ClassifyError>)> = if config.parallel {
        unique.par_iter().map(|r| (*r, classify_record(r))).collect()
    } else {
        unique.iter().map(|r| (*r, classify_record(r))).collect()
    };

    let mut entries = HashMap::with_capacity(results.len());
    let mut fallbacks = Vec::new();

    for (record, result) in results {
        let label = match result {
            Ok(label) => {
                debug!(id = %record.id, label = %label, "classified");
                label
            }
            Err(e) => {
                warn!(
                    id = %record.id,
                    birth_date = %record.birth_date,
                    reason = %e,
                    "classification failed, using fallback label"
                );
                fallbacks.push(FallbackEntry {
                    id: record.id.clone(),
                    kind: e.kind(),
                    reason: e.to_string(),
                });
                config.fallback_label
            }
        };
        entries.insert(record.id.clone(), label);
    }

    let registry = Registry { entries };
    let report = RegistryReport {
        total_records: records.len(),
        classified_count: registry.len() - fallbacks.len(),
        fallback_label: config.fallback_label,
        fallbacks,
        duplicate_ids,
        label_counts: registry.label_counts(),
        digest: registry.digest(),
    };

    info!("registry built: {}", report.summary());

    RegistryBuild { registry, report }
}

/// Collapse repeated ids. Returns the surviving records (in first-seen order)
/// and how many repeats were dropped.
fn dedupe(records: &[BirthRecord], keep_first: bool) -> (Vec<&BirthRecord>, usize) {
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    let mut unique: Vec<&BirthRecord> = Vec::with_capacity(records.len());
    let mut duplicates = 0;

    for record in records {
        match positions.get(record.id.as_str()) {
            Some(&pos) => {
                duplicates += 1;
                warn!(id = %record.id, keep_first, "duplicate id in batch");
                if !keep_first {
                    unique[pos] = record;
                }
            }
            None => {
                positions.insert(record.id.as_str(), unique.len());
                unique.push(record);
            }
        }
    }

    (unique, duplicates)
}
