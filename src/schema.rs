//! Column names, file names, and the static EC assignment table.
//!
//! Single source of truth for every string the loaders and exporters match
//! against. The input data is Korean, so several constants are too.

// ---------------------------------------------------------------------------
// Environment sensor logs (one CSV per school)
// ---------------------------------------------------------------------------

pub mod env {
    pub const TIME: &str = "time";
    pub const TEMPERATURE: &str = "temperature";
    pub const HUMIDITY: &str = "humidity";
    pub const PH: &str = "ph";
    pub const EC: &str = "ec";

    pub const REQUIRED: [&str; 5] = [TIME, TEMPERATURE, HUMIDITY, PH, EC];

    /// Filename suffix stripped to obtain the school id:
    /// `송도고_환경데이터.csv` → `송도고`.
    pub const FILE_SUFFIX: &str = "_환경데이터";
}

// ---------------------------------------------------------------------------
// Growth-results workbook (one sheet per school)
// ---------------------------------------------------------------------------

pub mod growth {
    pub const FRESH_WEIGHT_G: &str = "생중량(g)";
    pub const LEAF_COUNT: &str = "잎 수(장)";
    pub const SHOOT_LENGTH_MM: &str = "지상부 길이(mm)";

    pub const REQUIRED: [&str; 3] = [FRESH_WEIGHT_G, LEAF_COUNT, SHOOT_LENGTH_MM];

    /// Logical workbook name, resolved NFC/NFD-insensitively on disk.
    pub const WORKBOOK_FILE: &str = "4개교_생육결과데이터.xlsx";
}

// ---------------------------------------------------------------------------
// Columns added by the pipeline
// ---------------------------------------------------------------------------

/// Tag column added to every loaded row: which school it came from.
pub const SCHOOL_COLUMN: &str = "school";

/// Derived column in growth exports: the school's target EC. Never stored on
/// records; always re-derived through [`target_ec_for`].
pub const EC_COLUMN: &str = "EC";

// ---------------------------------------------------------------------------
// Export file names
// ---------------------------------------------------------------------------

pub mod export {
    pub const ENV_FILE: &str = "환경데이터_전체.xlsx";
    pub const GROWTH_FILE: &str = "생육결과_전체.xlsx";
}

// ---------------------------------------------------------------------------
// EC assignment table
// ---------------------------------------------------------------------------

/// Target EC (mS/cm) assigned to each trial school, ascending by EC.
/// Fixed for the lifetime of the process; changing the trial design means
/// redeploying.
pub const EC_TARGETS: [(&str, f64); 4] = [
    ("송도고", 1.0),
    ("하늘고", 2.0),
    ("아라고", 4.0),
    ("동산고", 8.0),
];

/// Target EC for a school, `None` when the school is not part of the trial
/// table (its growth rows then carry no EC level).
pub fn target_ec_for(school: &str) -> Option<f64> {
    EC_TARGETS
        .iter()
        .find(|(name, _)| *name == school)
        .map(|(_, ec)| *ec)
}

/// Trial schools assigned the given EC level (each level has exactly one in
/// the current design, but nothing downstream assumes that).
pub fn schools_at_ec(ec: f64) -> Vec<&'static str> {
    EC_TARGETS
        .iter()
        .filter(|(_, target)| target.total_cmp(&ec).is_eq())
        .map(|(name, _)| *name)
        .collect()
}
