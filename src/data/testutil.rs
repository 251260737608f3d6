//! In-memory fixture builders shared by the data-layer tests.

use std::collections::BTreeMap;

use super::model::{
    EnvironmentRecord, EnvironmentTable, GrowthRecord, GrowthTable, Snapshot,
};
use crate::schema;

/// Environment table from `(temperature, humidity, ph, ec)` rows; timestamps
/// are synthesized hourly.
pub fn env_table(school: &str, rows: &[(f64, f64, f64, f64)]) -> EnvironmentTable {
    EnvironmentTable {
        columns: schema::env::REQUIRED.iter().map(|c| c.to_string()).collect(),
        records: rows
            .iter()
            .enumerate()
            .map(|(i, &(temperature, humidity, ph, ec))| EnvironmentRecord {
                school: school.to_string(),
                time: format!("2024-11-04 {:02}:00", 9 + i),
                temperature,
                humidity,
                ph,
                ec,
                extra: BTreeMap::new(),
            })
            .collect(),
    }
}

/// Growth table with the given fresh weights; leaf count and shoot length
/// take fixed filler values.
pub fn growth_table(school: &str, weights: &[f64]) -> GrowthTable {
    GrowthTable {
        columns: schema::growth::REQUIRED.iter().map(|c| c.to_string()).collect(),
        records: weights
            .iter()
            .map(|&fresh_weight_g| GrowthRecord {
                school: school.to_string(),
                fresh_weight_g,
                leaf_count: 5,
                shoot_length_mm: 50.0,
                extra: BTreeMap::new(),
            })
            .collect(),
    }
}

pub fn snapshot_of(
    environment: Vec<(&str, EnvironmentTable)>,
    growth: Vec<(&str, GrowthTable)>,
) -> Snapshot {
    Snapshot {
        environment: environment
            .into_iter()
            .map(|(school, table)| (school.to_string(), table))
            .collect(),
        growth: growth
            .into_iter()
            .map(|(school, table)| (school.to_string(), table))
            .collect(),
    }
}
