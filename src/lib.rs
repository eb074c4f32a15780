// Saju Constitution - Core Library
// Birth date (+ optional hour) → four pillars → element balance → constitution label
// Exposes all modules for use in the CLI, the API server, benches and tests

pub mod tables;         // Stems, branches, solar terms, offset tables
pub mod day_number;     // Gregorian → Julian Day Number
pub mod error;
pub mod input;          // Date / hour validation
pub mod pillars;        // Four-pillars builder
pub mod balance;        // Elemental aggregator + normalization
pub mod constitution;   // Scorer
pub mod analysis;       // Single-record entry point
pub mod config;
pub mod registry;       // Batch registry builder
pub mod records;        // CSV / JSON files
pub mod store;          // SQLite registry table

// Re-export commonly used types
pub use tables::{
    Branch, Element, Stem,
    ALL_BRANCHES, ALL_ELEMENTS, ALL_STEMS,
    HOUR_STEM_OFFSET, MONTH_STEM_OFFSET, SOLAR_TERM_BOUNDARIES,
};
pub use day_number::day_number;
pub use error::ClassifyError;
pub use input::{BirthDate, BirthHour, RawHour};
pub use pillars::{build_pillars, FourPillars, Pillar};
pub use balance::{aggregate, normalize, raw_weights, ElementBalance, ElementWeights};
pub use constitution::{classify, ConstitutionLabel, ConstitutionScore, ALL_LABELS};
pub use analysis::{analyze, classify_birth, Analysis};
pub use config::ClassifierConfig;
pub use registry::{
    build_registry, build_registry_with, classify_record,
    BirthRecord, FallbackEntry, Registry, RegistryBuild, RegistryReport,
};
pub use records::{load_records, write_registry, DataFormat};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
