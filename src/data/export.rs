use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

use super::model::{union_columns, CellValue, EnvironmentData, GrowthData};
use crate::schema;

// ---------------------------------------------------------------------------
// Concatenated XLSX exports
// ---------------------------------------------------------------------------

/// Write every school's environment log into one worksheet. Columns are the
/// union of the per-school tables' columns in first-seen order, followed by
/// a `school` tag column; rows keep per-table order, tables in mapping order.
pub fn export_environment_xlsx(data: &EnvironmentData, path: &Path) -> Result<()> {
    let columns = union_columns(data.values().map(|table| &table.columns));

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    write_header(sheet, &columns, &[schema::SCHOOL_COLUMN])?;

    let school_col = columns.len() as u16;
    let mut row: u32 = 1;
    for table in data.values() {
        for record in &table.records {
            for (col, name) in columns.iter().enumerate() {
                write_cell(sheet, row, col as u16, record.value_for(name))?;
            }
            sheet.write_string(row, school_col, &record.school)?;
            row += 1;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("saving {}", path.display()))
}

/// Same layout for growth records, plus a derived `EC` column after the
/// `school` tag. The EC cell stays blank for schools outside the trial table.
pub fn export_growth_xlsx(data: &GrowthData, path: &Path) -> Result<()> {
    let columns = union_columns(data.values().map(|table| &table.columns));

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    write_header(sheet, &columns, &[schema::SCHOOL_COLUMN, schema::EC_COLUMN])?;

    let school_col = columns.len() as u16;
    let mut row: u32 = 1;
    for table in data.values() {
        for record in &table.records {
            for (col, name) in columns.iter().enumerate() {
                write_cell(sheet, row, col as u16, record.value_for(name))?;
            }
            sheet.write_string(row, school_col, &record.school)?;
            if let Some(ec) = record.target_ec() {
                sheet.write_number(row, school_col + 1, ec)?;
            }
            row += 1;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("saving {}", path.display()))
}

fn write_header(
    sheet: &mut Worksheet,
    columns: &[String],
    appended: &[&str],
) -> Result<(), XlsxError> {
    for (col, name) in columns.iter().enumerate() {
        sheet.write_string(0, col as u16, name)?;
    }
    for (offset, name) in appended.iter().enumerate() {
        sheet.write_string(0, (columns.len() + offset) as u16, *name)?;
    }
    Ok(())
}

/// A missing or null value leaves the cell blank, which re-reads as empty.
fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<CellValue>,
) -> Result<(), XlsxError> {
    match value {
        Some(CellValue::String(s)) => {
            sheet.write_string(row, col, s)?;
        }
        Some(CellValue::Integer(i)) => {
            sheet.write_number(row, col, i as f64)?;
        }
        Some(CellValue::Float(f)) => {
            sheet.write_number(row, col, f)?;
        }
        Some(CellValue::Bool(b)) => {
            sheet.write_boolean(row, col, b)?;
        }
        Some(CellValue::Null) | None => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;
    use crate::data::testutil::{env_table, growth_table, snapshot_of};
    use calamine::{open_workbook, Data, Range, Reader, Xlsx};

    fn read_first_sheet(path: &Path) -> Range<Data> {
        let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
        let name = workbook.sheet_names().first().cloned().unwrap();
        workbook.worksheet_range(&name).unwrap()
    }

    fn header_row(range: &Range<Data>) -> Vec<String> {
        range
            .rows()
            .next()
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    #[test]
    fn environment_export_round_trips() {
        let snapshot = snapshot_of(
            vec![
                ("송도고", env_table("송도고", &[(21.5, 64.0, 5.8, 1.1), (22.0, 63.0, 5.9, 0.9)])),
                ("하늘고", env_table("하늘고", &[(20.0, 70.0, 6.2, 2.1)])),
            ],
            vec![],
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(schema::export::ENV_FILE);
        export_environment_xlsx(&snapshot.environment, &path).unwrap();

        let range = read_first_sheet(&path);
        assert_eq!(
            header_row(&range),
            vec!["time", "temperature", "humidity", "ph", "ec", "school"]
        );
        // One header row plus three data rows, tables in mapping order.
        assert_eq!(range.rows().count(), 4);
        assert_eq!(range.get_value((1, 5)), Some(&Data::String("송도고".into())));
        assert_eq!(range.get_value((3, 5)), Some(&Data::String("하늘고".into())));
        assert_eq!(range.get_value((1, 1)), Some(&Data::Float(21.5)));
        assert_eq!(range.get_value((3, 3)), Some(&Data::Float(6.2)));
    }

    #[test]
    fn growth_export_adds_school_and_derived_ec() {
        let snapshot = snapshot_of(
            vec![],
            vec![
                ("하늘고", growth_table("하늘고", &[20.25])),
                ("제주고", growth_table("제주고", &[5.0])),
            ],
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(schema::export::GROWTH_FILE);
        export_growth_xlsx(&snapshot.growth, &path).unwrap();

        let range = read_first_sheet(&path);
        assert_eq!(
            header_row(&range),
            vec!["생중량(g)", "잎 수(장)", "지상부 길이(mm)", "school", "EC"]
        );
        // Mapping order is lexicographic: 제주고 before 하늘고.
        assert_eq!(range.get_value((1, 3)), Some(&Data::String("제주고".into())));
        assert_eq!(range.get_value((1, 4)), Some(&Data::Empty));
        assert_eq!(range.get_value((2, 3)), Some(&Data::String("하늘고".into())));
        assert_eq!(range.get_value((2, 4)), Some(&Data::Float(2.0)));
        assert_eq!(range.get_value((2, 0)), Some(&Data::Float(20.25)));
    }

    #[test]
    fn union_keeps_first_seen_column_order() {
        let mut first = growth_table("동산고", &[1.0]);
        first.columns.push("개체번호".to_string());
        first.records[0]
            .extra
            .insert("개체번호".to_string(), CellValue::Integer(7));
        let mut second = growth_table("송도고", &[2.0]);
        second.columns.push("비고".to_string());
        second.records[0]
            .extra
            .insert("비고".to_string(), CellValue::String("재측정".to_string()));

        let snapshot = snapshot_of(vec![], vec![("동산고", first), ("송도고", second)]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(schema::export::GROWTH_FILE);
        export_growth_xlsx(&snapshot.growth, &path).unwrap();

        let range = read_first_sheet(&path);
        assert_eq!(
            header_row(&range),
            vec![
                "생중량(g)",
                "잎 수(장)",
                "지상부 길이(mm)",
                "개체번호",
                "비고",
                "school",
                "EC"
            ]
        );
        // 동산고's row has no 비고 value, 송도고's row no 개체번호.
        assert_eq!(range.get_value((1, 3)), Some(&Data::Float(7.0)));
        assert_eq!(range.get_value((1, 4)), Some(&Data::Empty));
        assert_eq!(range.get_value((2, 3)), Some(&Data::Empty));
        assert_eq!(range.get_value((2, 4)), Some(&Data::String("재측정".into())));
    }

    #[test]
    fn exports_of_reloaded_data_match_source_rows() {
        let snapshot = snapshot_of(
            vec![("아라고", env_table("아라고", &[(19.5, 55.0, 6.1, 4.2)]))],
            vec![],
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(schema::export::ENV_FILE);
        export_environment_xlsx(&snapshot.environment, &path).unwrap();

        let range = read_first_sheet(&path);
        let record = &snapshot.environment["아라고"].records[0];
        assert_eq!(range.get_value((1, 0)), Some(&Data::String(record.time.clone().into())));
        assert_eq!(range.get_value((1, 1)), Some(&Data::Float(record.temperature)));
        assert_eq!(range.get_value((1, 2)), Some(&Data::Float(record.humidity)));
        assert_eq!(range.get_value((1, 3)), Some(&Data::Float(record.ph)));
        assert_eq!(range.get_value((1, 4)), Some(&Data::Float(record.ec)));
    }
}
