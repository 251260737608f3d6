use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};

use super::error::LoadError;
use super::model::{
    CellValue, EnvironmentData, EnvironmentRecord, EnvironmentTable, GrowthData, GrowthRecord,
    GrowthTable, Snapshot,
};
use super::resolver::{self, nfc};
use crate::schema;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load everything the dashboard needs from one data directory.
///
/// Fail-fast: if either dataset is unavailable or undecodable the whole load
/// fails and no snapshot exists. The views only ever see the joined pair.
pub fn load_snapshot(dir: &Path) -> Result<Snapshot> {
    let environment = load_environment_data(dir)?;
    let growth = load_growth_data(dir)?;
    Ok(Snapshot {
        environment,
        growth,
    })
}

// ---------------------------------------------------------------------------
// Environment logs: one CSV per school
// ---------------------------------------------------------------------------

/// Read every `*.csv` in `dir` (extension matched case-insensitively) as one
/// school's sensor log. The school id is the NFC-normalized filename stem
/// with the trailing `_환경데이터` token stripped; without the token the full
/// stem is used. Zero eligible files is [`LoadError::MissingEnvironmentData`].
pub fn load_environment_data(dir: &Path) -> Result<EnvironmentData> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("reading data directory {}", dir.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    // Sorted so table discovery (and with it column-union order downstream)
    // never depends on the storage backend's listing order.
    paths.sort();

    let mut data = EnvironmentData::new();
    for path in paths {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if ext != "csv" {
            continue;
        }

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let school = school_from_stem(stem);
        let table = read_environment_csv(&path, &school)
            .with_context(|| format!("loading environment log {}", path.display()))?;
        data.insert(school, table);
    }

    if data.is_empty() {
        return Err(LoadError::MissingEnvironmentData {
            dir: dir.to_path_buf(),
        }
        .into());
    }
    Ok(data)
}

/// `송도고_환경데이터` → `송도고`; a stem without the suffix stays whole.
fn school_from_stem(stem: &str) -> String {
    let stem = nfc(stem);
    match stem.strip_suffix(schema::env::FILE_SUFFIX) {
        Some(school) => school.to_string(),
        None => stem,
    }
}

fn read_environment_csv(path: &Path, school: &str) -> Result<EnvironmentTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV header")?
        .iter()
        .map(nfc)
        .collect();

    let mut typed = [0usize; schema::env::REQUIRED.len()];
    for (slot, name) in typed.iter_mut().zip(schema::env::REQUIRED) {
        *slot = columns
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("CSV missing '{name}' column"))?;
    }
    let [time_idx, temperature_idx, humidity_idx, ph_idx, ec_idx] = typed;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let number = |idx: usize, col: &str| -> Result<f64> {
            let raw = record.get(idx).unwrap_or("");
            raw.trim()
                .parse::<f64>()
                .with_context(|| format!("row {row_no}, {col}: '{raw}' is not a number"))
        };

        let mut extra = BTreeMap::new();
        for (col_idx, value) in record.iter().enumerate() {
            if typed.contains(&col_idx) {
                continue;
            }
            if let Some(col_name) = columns.get(col_idx) {
                extra.insert(col_name.clone(), CellValue::guess(value));
            }
        }

        records.push(EnvironmentRecord {
            school: school.to_string(),
            time: record.get(time_idx).unwrap_or("").to_string(),
            temperature: number(temperature_idx, schema::env::TEMPERATURE)?,
            humidity: number(humidity_idx, schema::env::HUMIDITY)?,
            ph: number(ph_idx, schema::env::PH)?,
            ec: number(ec_idx, schema::env::EC)?,
            extra,
        });
    }

    Ok(EnvironmentTable { columns, records })
}

// ---------------------------------------------------------------------------
// Growth results: one workbook, one sheet per school
// ---------------------------------------------------------------------------

/// Locate the growth workbook through the NFC/NFD-insensitive resolver and
/// read every sheet as one school's table (sheet name = school id). A
/// missing workbook is [`LoadError::MissingGrowthWorkbook`].
pub fn load_growth_data(dir: &Path) -> Result<GrowthData> {
    let workbook_path = resolver::find_file_by_name(dir, schema::growth::WORKBOOK_FILE)
        .with_context(|| format!("scanning {}", dir.display()))?
        .ok_or_else(|| LoadError::MissingGrowthWorkbook {
            name: schema::growth::WORKBOOK_FILE.to_string(),
            dir: dir.to_path_buf(),
        })?;

    let mut workbook: Xlsx<_> = open_workbook(&workbook_path)
        .with_context(|| format!("opening workbook {}", workbook_path.display()))?;

    let sheet_names = workbook.sheet_names().to_owned();

    let mut data = GrowthData::new();
    for sheet in sheet_names {
        let range = workbook
            .worksheet_range(&sheet)
            .with_context(|| format!("reading sheet '{sheet}'"))?;
        let school = nfc(&sheet);
        let table =
            parse_growth_sheet(&range, &school).with_context(|| format!("sheet '{sheet}'"))?;
        data.insert(school, table);
    }
    Ok(data)
}

fn parse_growth_sheet(range: &Range<Data>, school: &str) -> Result<GrowthTable> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(GrowthTable {
            columns: Vec::new(),
            records: Vec::new(),
        });
    };
    let columns: Vec<String> = header.iter().map(|c| nfc(cell_text(c).trim())).collect();

    let mut typed = [0usize; schema::growth::REQUIRED.len()];
    for (slot, name) in typed.iter_mut().zip(schema::growth::REQUIRED) {
        *slot = columns
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("sheet missing '{name}' column"))?;
    }
    let [weight_idx, leaf_idx, shoot_idx] = typed;

    let mut records = Vec::new();
    for (row_no, row) in rows.enumerate() {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            // padding rows some spreadsheet tools leave behind
            continue;
        }

        let mut extra = BTreeMap::new();
        for (col_idx, value) in row.iter().enumerate() {
            if typed.contains(&col_idx) {
                continue;
            }
            if let Some(col_name) = columns.get(col_idx) {
                extra.insert(col_name.clone(), cell_value(value));
            }
        }

        records.push(GrowthRecord {
            school: school.to_string(),
            fresh_weight_g: cell_f64(row.get(weight_idx))
                .with_context(|| format!("row {row_no}, {}", schema::growth::FRESH_WEIGHT_G))?,
            leaf_count: cell_u32(row.get(leaf_idx))
                .with_context(|| format!("row {row_no}, {}", schema::growth::LEAF_COUNT))?,
            shoot_length_mm: cell_f64(row.get(shoot_idx))
                .with_context(|| format!("row {row_no}, {}", schema::growth::SHOOT_LENGTH_MM))?,
            extra,
        });
    }

    Ok(GrowthTable { columns, records })
}

// -- Cell coercions --

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell_f64(cell: Option<&Data>) -> Result<f64> {
    match cell {
        Some(Data::Float(f)) => Ok(*f),
        Some(Data::Int(i)) => Ok(*i as f64),
        Some(Data::String(s)) => s
            .trim()
            .parse::<f64>()
            .with_context(|| format!("'{s}' is not a number")),
        None | Some(Data::Empty) => bail!("empty cell"),
        Some(other) => bail!("'{other}' is not a number"),
    }
}

fn cell_u32(cell: Option<&Data>) -> Result<u32> {
    let v = cell_f64(cell)?;
    if v < 0.0 || v > u32::MAX as f64 || v.fract() != 0.0 {
        bail!("'{v}' is not a non-negative integer");
    }
    Ok(v as u32)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => CellValue::String(s.clone()),
        other => CellValue::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use std::fs;
    use unicode_normalization::UnicodeNormalization;

    const ENV_HEADER: &str = "time,temperature,humidity,ph,ec";

    fn write_env_csv(dir: &Path, file_name: &str, rows: &[&str]) {
        let mut body = String::from(ENV_HEADER);
        for row in rows {
            body.push('\n');
            body.push_str(row);
        }
        fs::write(dir.join(file_name), body).unwrap();
    }

    /// Two-sheet workbook in the shape of the real growth data.
    fn write_growth_workbook(path: &Path) {
        let mut workbook = Workbook::new();

        let sheet = workbook.add_worksheet();
        sheet.set_name("송도고").unwrap();
        sheet.write_string(0, 0, "개체번호").unwrap();
        sheet.write_string(0, 1, schema::growth::FRESH_WEIGHT_G).unwrap();
        sheet.write_string(0, 2, schema::growth::LEAF_COUNT).unwrap();
        sheet.write_string(0, 3, schema::growth::SHOOT_LENGTH_MM).unwrap();
        sheet.write_number(1, 0, 1).unwrap();
        sheet.write_number(1, 1, 10.5).unwrap();
        sheet.write_number(1, 2, 6).unwrap();
        sheet.write_number(1, 3, 81.0).unwrap();
        sheet.write_number(2, 0, 2).unwrap();
        sheet.write_number(2, 1, 12.0).unwrap();
        sheet.write_number(2, 2, 8).unwrap();
        sheet.write_number(2, 3, 95.5).unwrap();

        let sheet = workbook.add_worksheet();
        sheet.set_name("하늘고").unwrap();
        sheet.write_string(0, 0, schema::growth::FRESH_WEIGHT_G).unwrap();
        sheet.write_string(0, 1, schema::growth::LEAF_COUNT).unwrap();
        sheet.write_string(0, 2, schema::growth::SHOOT_LENGTH_MM).unwrap();
        sheet.write_number(1, 0, 20.25).unwrap();
        sheet.write_number(1, 1, 11).unwrap();
        sheet.write_number(1, 2, 120.0).unwrap();

        workbook.save(path).unwrap();
    }

    #[test]
    fn loads_environment_csvs_per_school() {
        let dir = tempfile::tempdir().unwrap();
        write_env_csv(
            dir.path(),
            "송도고_환경데이터.csv",
            &["2024-11-04 09:00,21.5,64.2,5.8,1.1", "2024-11-04 10:00,22.0,63.0,5.9,0.9"],
        );
        write_env_csv(dir.path(), "하늘고_환경데이터.csv", &["2024-11-04 09:00,20.1,70.0,6.0,2.2"]);
        fs::write(dir.path().join("readme.txt"), "not data").unwrap();

        let data = load_environment_data(dir.path()).unwrap();
        assert_eq!(
            data.keys().cloned().collect::<Vec<_>>(),
            vec!["송도고".to_string(), "하늘고".to_string()]
        );

        let songdo = &data["송도고"];
        assert_eq!(songdo.records.len(), 2);
        assert_eq!(songdo.columns, vec!["time", "temperature", "humidity", "ph", "ec"]);

        let first = &songdo.records[0];
        assert_eq!(first.school, "송도고");
        assert_eq!(first.time, "2024-11-04 09:00");
        assert_eq!(first.temperature, 21.5);
        assert_eq!(first.humidity, 64.2);
        assert_eq!(first.ph, 5.8);
        assert_eq!(first.ec, 1.1);
        assert!(first.extra.is_empty());
    }

    #[test]
    fn env_school_without_suffix_uses_full_stem() {
        let dir = tempfile::tempdir().unwrap();
        write_env_csv(dir.path(), "온실로그.csv", &["1,20.0,60.0,6.0,1.5"]);

        let data = load_environment_data(dir.path()).unwrap();
        assert!(data.contains_key("온실로그"));
    }

    #[test]
    fn env_extension_matching_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        write_env_csv(dir.path(), "아라고_환경데이터.CSV", &["1,20.0,60.0,6.0,4.1"]);

        let data = load_environment_data(dir.path()).unwrap();
        assert!(data.contains_key("아라고"));
    }

    #[test]
    fn env_decomposed_filename_yields_composed_school_id() {
        let dir = tempfile::tempdir().unwrap();
        let decomposed: String = "송도고_환경데이터.csv".nfd().collect();
        write_env_csv(dir.path(), &decomposed, &["1,20.0,60.0,6.0,1.0"]);

        let data = load_environment_data(dir.path()).unwrap();
        assert!(data.contains_key("송도고"));
        assert_eq!(schema::target_ec_for(data.keys().next().unwrap()), Some(1.0));
    }

    #[test]
    fn env_loader_fails_without_csvs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let err = load_environment_data(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::MissingEnvironmentData { .. })
        ));
    }

    #[test]
    fn env_unknown_columns_are_preserved() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("동산고_환경데이터.csv"),
            "time,temperature,humidity,ph,ec,비고\n1,20.0,60.0,6.0,8.2,정상",
        )
        .unwrap();

        let data = load_environment_data(dir.path()).unwrap();
        let table = &data["동산고"];
        assert_eq!(table.columns.last().map(String::as_str), Some("비고"));
        assert_eq!(
            table.records[0].extra.get("비고"),
            Some(&CellValue::String("정상".to_string()))
        );
    }

    #[test]
    fn env_bad_number_fails_with_location() {
        let dir = tempfile::tempdir().unwrap();
        write_env_csv(dir.path(), "송도고_환경데이터.csv", &["1,abc,60.0,6.0,1.0"]);

        let err = load_environment_data(dir.path()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("temperature"), "unexpected error: {message}");
        assert!(message.contains("abc"), "unexpected error: {message}");
    }

    #[test]
    fn growth_workbook_loaded_per_sheet() {
        let dir = tempfile::tempdir().unwrap();
        write_growth_workbook(&dir.path().join(schema::growth::WORKBOOK_FILE));

        let data = load_growth_data(dir.path()).unwrap();
        assert_eq!(
            data.keys().cloned().collect::<Vec<_>>(),
            vec!["송도고".to_string(), "하늘고".to_string()]
        );

        let songdo = &data["송도고"];
        assert_eq!(songdo.records.len(), 2);
        assert_eq!(songdo.records[0].school, "송도고");
        assert_eq!(songdo.records[0].fresh_weight_g, 10.5);
        assert_eq!(songdo.records[0].leaf_count, 6);
        assert_eq!(songdo.records[0].shoot_length_mm, 81.0);
        assert_eq!(
            songdo.records[0].extra.get("개체번호"),
            Some(&CellValue::Float(1.0))
        );

        let haneul = &data["하늘고"];
        assert_eq!(haneul.records.len(), 1);
        assert_eq!(haneul.records[0].fresh_weight_g, 20.25);
        assert_eq!(haneul.records[0].leaf_count, 11);
    }

    #[test]
    fn growth_workbook_found_under_decomposed_name() {
        let dir = tempfile::tempdir().unwrap();
        let decomposed: String = schema::growth::WORKBOOK_FILE.nfd().collect();
        write_growth_workbook(&dir.path().join(decomposed));

        let data = load_growth_data(dir.path()).unwrap();
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn growth_missing_workbook_is_fatal() {
        let dir = tempfile::tempdir().unwrap();

        let err = load_growth_data(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::MissingGrowthWorkbook { .. })
        ));
    }

    #[test]
    fn growth_missing_required_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("송도고").unwrap();
        sheet.write_string(0, 0, schema::growth::LEAF_COUNT).unwrap();
        sheet.write_string(0, 1, schema::growth::SHOOT_LENGTH_MM).unwrap();
        sheet.write_number(1, 0, 5).unwrap();
        sheet.write_number(1, 1, 70.0).unwrap();
        workbook.save(dir.path().join(schema::growth::WORKBOOK_FILE)).unwrap();

        let err = load_growth_data(dir.path()).unwrap_err();
        let message = format!("{err:#}");
        assert!(
            message.contains(schema::growth::FRESH_WEIGHT_G),
            "unexpected error: {message}"
        );
    }

    #[test]
    fn growth_blank_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("아라고").unwrap();
        sheet.write_string(0, 0, schema::growth::FRESH_WEIGHT_G).unwrap();
        sheet.write_string(0, 1, schema::growth::LEAF_COUNT).unwrap();
        sheet.write_string(0, 2, schema::growth::SHOOT_LENGTH_MM).unwrap();
        sheet.write_number(1, 0, 9.0).unwrap();
        sheet.write_number(1, 1, 5).unwrap();
        sheet.write_number(1, 2, 60.0).unwrap();
        // row 2 left entirely blank
        sheet.write_number(3, 0, 11.0).unwrap();
        sheet.write_number(3, 1, 6).unwrap();
        sheet.write_number(3, 2, 72.0).unwrap();
        workbook.save(dir.path().join(schema::growth::WORKBOOK_FILE)).unwrap();

        let data = load_growth_data(dir.path()).unwrap();
        assert_eq!(data["아라고"].records.len(), 2);
    }

    #[test]
    fn loading_twice_yields_equal_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        write_env_csv(dir.path(), "송도고_환경데이터.csv", &["1,21.0,60.0,5.8,1.1"]);
        write_env_csv(dir.path(), "하늘고_환경데이터.csv", &["1,20.0,70.0,6.1,2.0"]);
        write_growth_workbook(&dir.path().join(schema::growth::WORKBOOK_FILE));

        let first = load_snapshot(dir.path()).unwrap();
        let second = load_snapshot(dir.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            crate::data::analysis::summarize(&first),
            crate::data::analysis::summarize(&second)
        );
    }

    #[test]
    fn snapshot_requires_both_datasets() {
        let dir = tempfile::tempdir().unwrap();
        write_env_csv(dir.path(), "송도고_환경데이터.csv", &["1,20.0,60.0,6.0,1.0"]);

        // Environment alone is not enough.
        let err = load_snapshot(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::MissingGrowthWorkbook { .. })
        ));

        write_growth_workbook(&dir.path().join(schema::growth::WORKBOOK_FILE));
        let snapshot = load_snapshot(dir.path()).unwrap();
        assert_eq!(snapshot.env_row_count(), 1);
        assert_eq!(snapshot.growth_row_count(), 3);
    }
}
