use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::model::Snapshot;
use crate::schema;

// ---------------------------------------------------------------------------
// Summary – everything the views read, computed once per load
// ---------------------------------------------------------------------------

/// Per-school means over the environment log, paired with the target EC.
#[derive(Debug, Clone, PartialEq)]
pub struct SchoolEnvMeans {
    pub school: String,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    /// Mean *measured* EC, to set against `target_ec`.
    pub ec: f64,
    pub target_ec: Option<f64>,
    pub samples: usize,
}

/// Growth outcomes per EC level (the experiment's independent variable).
#[derive(Debug, Clone, PartialEq)]
pub struct EcGroupStats {
    pub ec: f64,
    pub mean_fresh_weight_g: f64,
    pub mean_leaf_count: f64,
    pub mean_shoot_length_mm: f64,
    pub plants: usize,
}

/// Box-plot statistics for one school's fresh weights. Whiskers sit on the
/// most extreme samples within 1.5×IQR of the quartiles; everything beyond
/// is an outlier.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSpread {
    pub school: String,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
    pub samples: usize,
}

/// All aggregation outputs. Pure function of the snapshot, cached by the app
/// state; every contained order is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Display order: trial schools ascending by target EC, then any
    /// remaining school lexicographically.
    pub schools: Vec<String>,
    pub env_means: Vec<SchoolEnvMeans>,
    /// Ascending by EC level.
    pub ec_groups: Vec<EcGroupStats>,
    pub best_ec: Option<f64>,
    pub weight_spreads: Vec<WeightSpread>,
    pub plants_per_school: BTreeMap<String, usize>,
    pub total_plants: usize,
    /// Pooled over every environment row of every school.
    pub mean_temperature: Option<f64>,
    pub mean_humidity: Option<f64>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Compute every statistic the views show. Empty inputs produce empty
/// vectors and `None` scalars, never a panic.
pub fn summarize(snapshot: &Snapshot) -> Summary {
    let schools = display_order(snapshot);
    let ec_groups = ec_group_stats(snapshot);
    let best = best_ec(&ec_groups);
    let (mean_temperature, mean_humidity) = pooled_env_means(snapshot);

    let plants_per_school: BTreeMap<String, usize> = snapshot
        .growth
        .iter()
        .map(|(school, table)| (school.clone(), table.records.len()))
        .collect();

    Summary {
        env_means: school_env_means(snapshot, &schools),
        ec_groups,
        best_ec: best,
        weight_spreads: weight_spreads(snapshot, &schools),
        plants_per_school,
        total_plants: snapshot.growth_row_count(),
        mean_temperature,
        mean_humidity,
        schools,
    }
}

/// Trial schools ascending by target EC, then unknown schools by name.
fn display_order(snapshot: &Snapshot) -> Vec<String> {
    let mut schools: Vec<String> = snapshot.schools().into_iter().collect();
    schools.sort_by(|a, b| {
        match (schema::target_ec_for(a), schema::target_ec_for(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cmp(b),
        }
    });
    schools
}

/// One row per school with at least one environment record; a school whose
/// log is empty has no defined means and is omitted.
fn school_env_means(snapshot: &Snapshot, order: &[String]) -> Vec<SchoolEnvMeans> {
    let mut rows = Vec::new();
    for school in order {
        let Some(table) = snapshot.environment.get(school) else {
            continue;
        };
        let n = table.records.len();
        if n == 0 {
            continue;
        }

        let (mut temperature, mut humidity, mut ph, mut ec) = (0.0, 0.0, 0.0, 0.0);
        for record in &table.records {
            temperature += record.temperature;
            humidity += record.humidity;
            ph += record.ph;
            ec += record.ec;
        }
        let n_f = n as f64;
        rows.push(SchoolEnvMeans {
            school: school.clone(),
            temperature: temperature / n_f,
            humidity: humidity / n_f,
            ph: ph / n_f,
            ec: ec / n_f,
            target_ec: schema::target_ec_for(school),
            samples: n,
        });
    }
    rows
}

/// Group growth records by their school's *target EC* (not by school name).
/// Records of schools outside the EC table carry no level and are skipped
/// here; they still count in the per-school outputs.
fn ec_group_stats(snapshot: &Snapshot) -> Vec<EcGroupStats> {
    #[derive(Default)]
    struct Acc {
        weight: f64,
        leaves: f64,
        shoots: f64,
        n: usize,
    }

    let mut groups: Vec<(f64, Acc)> = Vec::new();
    for record in snapshot.growth_records() {
        let Some(ec) = record.target_ec() else {
            continue;
        };
        let idx = match groups.iter().position(|(k, _)| k.total_cmp(&ec).is_eq()) {
            Some(i) => i,
            None => {
                groups.push((ec, Acc::default()));
                groups.len() - 1
            }
        };
        let acc = &mut groups[idx].1;
        acc.weight += record.fresh_weight_g;
        acc.leaves += record.leaf_count as f64;
        acc.shoots += record.shoot_length_mm;
        acc.n += 1;
    }

    groups.sort_by(|a, b| a.0.total_cmp(&b.0));
    groups
        .into_iter()
        .map(|(ec, acc)| {
            let n_f = acc.n as f64;
            EcGroupStats {
                ec,
                mean_fresh_weight_g: acc.weight / n_f,
                mean_leaf_count: acc.leaves / n_f,
                mean_shoot_length_mm: acc.shoots / n_f,
                plants: acc.n,
            }
        })
        .collect()
}

/// The EC level with the highest mean fresh weight. Ties resolve to the
/// *lowest* such level, independent of input order; empty input is `None`.
pub fn best_ec(groups: &[EcGroupStats]) -> Option<f64> {
    let mut best: Option<&EcGroupStats> = None;
    for group in groups {
        best = match best {
            None => Some(group),
            Some(current) => {
                match group
                    .mean_fresh_weight_g
                    .total_cmp(&current.mean_fresh_weight_g)
                {
                    Ordering::Greater => Some(group),
                    Ordering::Equal if group.ec < current.ec => Some(group),
                    _ => Some(current),
                }
            }
        };
    }
    best.map(|g| g.ec)
}

fn weight_spreads(snapshot: &Snapshot, order: &[String]) -> Vec<WeightSpread> {
    order
        .iter()
        .filter_map(|school| {
            let table = snapshot.growth.get(school)?;
            let weights: Vec<f64> = table.records.iter().map(|r| r.fresh_weight_g).collect();
            weight_spread(school, weights)
        })
        .collect()
}

fn weight_spread(school: &str, mut values: Vec<f64>) -> Option<WeightSpread> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let q1 = quantile(&values, 0.25);
    let median = quantile(&values, 0.5);
    let q3 = quantile(&values, 0.75);
    let iqr = q3 - q1;
    let low_fence = q1 - 1.5 * iqr;
    let high_fence = q3 + 1.5 * iqr;

    // The most extreme samples still inside the fences. Some sample always
    // qualifies (the quartiles themselves lie between the fences).
    let lower_whisker = values
        .iter()
        .copied()
        .find(|v| *v >= low_fence)
        .unwrap_or(q1);
    let upper_whisker = values
        .iter()
        .rev()
        .copied()
        .find(|v| *v <= high_fence)
        .unwrap_or(q3);
    let outliers: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| *v < lower_whisker || *v > upper_whisker)
        .collect();

    Some(WeightSpread {
        school: school.to_string(),
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
        samples: values.len(),
    })
}

/// Linear-interpolation quantile on a sorted, non-empty sample (the
/// convention most stats tooling defaults to).
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

fn pooled_env_means(snapshot: &Snapshot) -> (Option<f64>, Option<f64>) {
    let (mut temperature, mut humidity, mut n) = (0.0, 0.0, 0usize);
    for record in snapshot.env_records() {
        temperature += record.temperature;
        humidity += record.humidity;
        n += 1;
    }
    if n == 0 {
        (None, None)
    } else {
        (Some(temperature / n as f64), Some(humidity / n as f64))
    }
}
