use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell in an unrecognized column
// ---------------------------------------------------------------------------

/// A dynamically-typed spreadsheet cell. The columns the pipeline knows about
/// are decoded into typed record fields; everything else is carried along as
/// `CellValue` so exports can reproduce the source tables in full.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Interpret a raw CSV field, narrowest type first.
    pub fn guess(s: &str) -> Self {
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// EnvironmentRecord – one sensor-log row
// ---------------------------------------------------------------------------

/// One row of a school's environment log. `school` always equals the file
/// the row was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentRecord {
    pub school: String,
    /// Raw timestamp text; charts plot rows by ordinal and show this label.
    pub time: String,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    /// Measured EC, compared against the school's target EC.
    pub ec: f64,
    /// Unrecognized source columns, preserved for export.
    pub extra: BTreeMap<String, CellValue>,
}

impl EnvironmentRecord {
    /// Cell for a source column name, typed fields first, then `extra`.
    pub fn value_for(&self, column: &str) -> Option<CellValue> {
        match column {
            crate::schema::env::TIME => Some(CellValue::String(self.time.clone())),
            crate::schema::env::TEMPERATURE => Some(CellValue::Float(self.temperature)),
            crate::schema::env::HUMIDITY => Some(CellValue::Float(self.humidity)),
            crate::schema::env::PH => Some(CellValue::Float(self.ph)),
            crate::schema::env::EC => Some(CellValue::Float(self.ec)),
            other => self.extra.get(other).cloned(),
        }
    }
}

// ---------------------------------------------------------------------------
// GrowthRecord – one harvested plant
// ---------------------------------------------------------------------------

/// One harvested plant from the growth workbook. `school` always equals the
/// sheet the row was read from. The plant's EC level is *not* stored: it is
/// re-derived from [`crate::schema::target_ec_for`] wherever needed, so the
/// assignment table can never drift from the records.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthRecord {
    pub school: String,
    pub fresh_weight_g: f64,
    pub leaf_count: u32,
    pub shoot_length_mm: f64,
    /// Unrecognized source columns, preserved for export.
    pub extra: BTreeMap<String, CellValue>,
}

impl GrowthRecord {
    /// Target EC of this plant's school, when the school is in the trial.
    pub fn target_ec(&self) -> Option<f64> {
        crate::schema::target_ec_for(&self.school)
    }

    /// Cell for a source column name, typed fields first, then `extra`.
    pub fn value_for(&self, column: &str) -> Option<CellValue> {
        match column {
            crate::schema::growth::FRESH_WEIGHT_G => {
                Some(CellValue::Float(self.fresh_weight_g))
            }
            crate::schema::growth::LEAF_COUNT => {
                Some(CellValue::Integer(self.leaf_count as i64))
            }
            crate::schema::growth::SHOOT_LENGTH_MM => {
                Some(CellValue::Float(self.shoot_length_mm))
            }
            other => self.extra.get(other).cloned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tables and the loaded snapshot
// ---------------------------------------------------------------------------

/// One school's environment log with its source header order.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentTable {
    /// Column names as they appeared in the CSV header.
    pub columns: Vec<String>,
    pub records: Vec<EnvironmentRecord>,
}

/// One school's growth results with its source header order.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthTable {
    /// Column names as they appeared in the sheet's header row.
    pub columns: Vec<String>,
    pub records: Vec<GrowthRecord>,
}

/// Union of table columns, keeping the order each column was first seen in.
/// Concatenated views (raw tables, exports) lay their cells out with this.
pub fn union_columns<'a>(tables: impl Iterator<Item = &'a Vec<String>>) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for table_columns in tables {
        for column in table_columns {
            if !columns.iter().any(|c| c == column) {
                columns.push(column.clone());
            }
        }
    }
    columns
}

/// school → environment table. `BTreeMap` keeps every downstream iteration
/// in lexicographic school order.
pub type EnvironmentData = BTreeMap<String, EnvironmentTable>;

/// school → growth table.
pub type GrowthData = BTreeMap<String, GrowthTable>;

/// The complete loaded dataset. Built once per load and read-only
/// afterwards; views and the aggregator borrow it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub environment: EnvironmentData,
    pub growth: GrowthData,
}

impl Snapshot {
    /// All environment rows across schools, mapping order.
    pub fn env_records(&self) -> impl Iterator<Item = &EnvironmentRecord> {
        self.environment.values().flat_map(|t| t.records.iter())
    }

    /// All growth rows across schools, mapping order.
    pub fn growth_records(&self) -> impl Iterator<Item = &GrowthRecord> {
        self.growth.values().flat_map(|t| t.records.iter())
    }

    pub fn env_row_count(&self) -> usize {
        self.environment.values().map(|t| t.records.len()).sum()
    }

    pub fn growth_row_count(&self) -> usize {
        self.growth.values().map(|t| t.records.len()).sum()
    }

    /// Every school named by either dataset.
    pub fn schools(&self) -> BTreeSet<String> {
        self.environment
            .keys()
            .chain(self.growth.keys())
            .cloned()
            .collect()
    }
}
