// 📂 Record & Registry Files
// CSV / JSON rosters in, CSV / JSON registries out

use crate::constitution::ConstitutionLabel;
use crate::registry::{BirthRecord, Registry};
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// FORMAT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataFormat {
    Json,
    Csv,
}

impl DataFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(DataFormat::Json),
            "csv" => Some(DataFormat::Csv),
            _ => None,
        }
    }

    fn resolve(path: &Path, explicit: Option<DataFormat>) -> Result<Self> {
        explicit
            .or_else(|| Self::from_path(path))
            .ok_or_else(|| anyhow!("Cannot tell the format of {:?}; use a .json or .csv file", path))
    }
}

impl FromStr for DataFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(DataFormat::Json),
            "csv" => Ok(DataFormat::Csv),
            other => bail!("Unknown format '{}': expected json or csv", other),
        }
    }
}

// ============================================================================
// ROSTER INPUT
// ============================================================================

/// Load records from a CSV file with columns `id,birth_date,birth_hour`.
/// An empty `birth_hour` cell means the hour is unknown; a cell that is not a
/// whole number is kept and fails that record at classification time.
pub fn load_records_csv(csv_path: &Path) -> Result<Vec<BirthRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file: {:?}", csv_path))?;

    let mut records = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let record: BirthRecord = result
            .with_context(|| format!("Failed to deserialize record on data line {}", line + 1))?;
        records.push(record);
    }

    Ok(records)
}

/// Load records from a JSON array of `{id, birth_date, birth_hour?}` objects.
pub fn load_records_json(json_path: &Path) -> Result<Vec<BirthRecord>> {
    let content = fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read records file: {:?}", json_path))?;

    serde_json::from_str(&content).context("Failed to parse records JSON")
}

pub fn load_records(path: &Path, format: Option<DataFormat>) -> Result<Vec<BirthRecord>> {
    match DataFormat::resolve(path, format)? {
        DataFormat::Json => load_records_json(path),
        DataFormat::Csv => load_records_csv(path),
    }
}

// ============================================================================
// REGISTRY OUTPUT
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct RegistryRow {
    id: String,
    label: ConstitutionLabel,
    code: char,
}

/// Write the registry as a JSON object keyed by id (sorted).
pub fn write_registry_json(path: &Path, registry: &Registry) -> Result<()> {
    let json = serde_json::to_string_pretty(registry)?;
    fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write registry file: {:?}", path))
}

/// Write the registry as CSV rows `id,label,code` sorted by id.
pub fn write_registry_csv(path: &Path, registry: &Registry) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {:?}", path))?;

    for (id, label) in registry.sorted() {
        wtr.serialize(RegistryRow {
            id: id.to_string(),
            label,
            code: label.code(),
        })?;
    }
    wtr.flush()?;

    Ok(())
}

pub fn write_registry(path: &Path, registry: &Registry, format: Option<DataFormat>) -> Result<()> {
    match DataFormat::resolve(path, format)? {
        DataFormat::Json => write_registry_json(path, registry),
        DataFormat::Csv => write_registry_csv(path, registry),
    }
}

/// Read a registry previously written by [`write_registry`].
pub fn load_registry(path: &Path, format: Option<DataFormat>) -> Result<Registry> {
    match DataFormat::resolve(path, format)? {
        DataFormat::Json => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read registry file: {:?}", path))?;
            serde_json::from_str(&content).context("Failed to parse registry JSON")
        }
        DataFormat::Csv => {
            let mut rdr = csv::Reader::from_path(path)
                .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
            let mut entries = Vec::new();
            for result in rdr.deserialize() {
                let row: RegistryRow = result.context("Failed to deserialize registry row")?;
                entries.push((row.id, row.label));
            }
            Ok(entries.into_iter().collect())
        }
    }
}
