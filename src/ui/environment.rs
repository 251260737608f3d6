use eframe::egui::{self, Color32, ScrollArea, Ui};
use egui_plot::{HLine, Line, LineStyle, Plot, PlotPoints};

use crate::data::model::{union_columns, EnvironmentTable};
use crate::schema;
use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// Environment tab
// ---------------------------------------------------------------------------

pub fn view(ui: &mut Ui, state: &mut AppState) {
    let (Some(snapshot), Some(summary)) = (&state.snapshot, &state.summary) else {
        charts::empty_hint(ui);
        return;
    };
    let mut export_clicked = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("학교별 환경 평균 비교");
            ui.add_space(4.0);

            let per_school = |value: fn(&crate::data::analysis::SchoolEnvMeans) -> f64| {
                summary
                    .env_means
                    .iter()
                    .map(|m| (m.school.clone(), value(m), state.colors.color_for(&m.school)))
                    .collect::<Vec<_>>()
            };

            ui.columns(2, |cols: &mut [Ui]| {
                cols[0].strong("평균 온도 (℃)");
                charts::school_bar_chart(&mut cols[0], "env_temp", 200.0, &per_school(|m| m.temperature));
                cols[1].strong("평균 습도 (%)");
                charts::school_bar_chart(&mut cols[1], "env_hum", 200.0, &per_school(|m| m.humidity));
            });
            ui.columns(2, |cols: &mut [Ui]| {
                cols[0].strong("평균 pH");
                charts::school_bar_chart(&mut cols[0], "env_ph", 200.0, &per_school(|m| m.ph));

                cols[1].strong("목표 EC vs 실측 EC (mS/cm)");
                let ec_pairs: Vec<(String, f64, Option<f64>)> = summary
                    .env_means
                    .iter()
                    .map(|m| (m.school.clone(), m.ec, m.target_ec))
                    .collect();
                charts::grouped_school_bar_chart(
                    &mut cols[1],
                    "env_ec",
                    200.0,
                    &ec_pairs,
                    "실측 EC",
                    "목표 EC",
                );
            });
            let counts: Vec<String> = summary
                .env_means
                .iter()
                .map(|m| format!("{} {}행", m.school, m.samples))
                .collect();
            ui.weak(format!("표본 수: {}", counts.join(", ")));

            ui.add_space(12.0);
            ui.heading("환경 변화 시계열");
            match &state.selected_school {
                None => {
                    ui.label("왼쪽에서 학교를 선택하면 시계열이 표시됩니다.");
                }
                Some(school) => match snapshot.environment.get(school) {
                    Some(table) => {
                        time_series(ui, school, table, state.colors.color_for(school));
                    }
                    None => {
                        ui.label(format!("{school}의 환경 데이터가 없습니다."));
                    }
                },
            }

            ui.add_space(12.0);
            egui::CollapsingHeader::new("환경 데이터 원본")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    if ui.button("XLSX 내보내기").clicked() {
                        export_clicked = true;
                    }
                    let mut columns =
                        union_columns(snapshot.environment.values().map(|t| &t.columns));
                    columns.push(schema::SCHOOL_COLUMN.to_string());

                    let rows: Vec<Vec<String>> = snapshot
                        .env_records()
                        .map(|record| {
                            let mut cells: Vec<String> = columns[..columns.len() - 1]
                                .iter()
                                .map(|col| {
                                    record
                                        .value_for(col)
                                        .map(|v| v.to_string())
                                        .unwrap_or_default()
                                })
                                .collect();
                            cells.push(record.school.clone());
                            cells
                        })
                        .collect();
                    charts::raw_table(ui, "env_raw", &columns, &rows);
                });
        });

    if export_clicked {
        panels::export_environment(state);
    }
}

/// Temperature, humidity, and EC over the log's row order, EC with a dashed
/// line at the school's target.
fn time_series(ui: &mut Ui, school: &str, table: &EnvironmentTable, color: Color32) {
    let times: Vec<String> = table.records.iter().map(|r| r.time.clone()).collect();

    let temperatures = table.records.iter().map(|r| r.temperature);
    series_plot(ui, "ts_temp", "온도 (℃)", &times, color, None, temperatures);

    let humidities = table.records.iter().map(|r| r.humidity);
    series_plot(ui, "ts_hum", "습도 (%)", &times, color, None, humidities);

    let target = schema::target_ec_for(school);
    let ecs = table.records.iter().map(|r| r.ec);
    series_plot(ui, "ts_ec", "EC (mS/cm)", &times, color, target, ecs);
}

fn series_plot(
    ui: &mut Ui,
    id: &str,
    title: &str,
    times: &[String],
    color: Color32,
    target: Option<f64>,
    values: impl Iterator<Item = f64>,
) {
    ui.strong(title);
    let points: PlotPoints = values.enumerate().map(|(i, v)| [i as f64, v]).collect();
    let labels = times.to_vec();
    let name = title.to_string();

    Plot::new(id)
        .height(170.0)
        .x_axis_formatter(move |mark, _range| charts::ordinal_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            if let Some(t) = target {
                plot_ui.hline(
                    HLine::new(t)
                        .color(Color32::GRAY)
                        .style(LineStyle::Dashed { length: 8.0 })
                        .name("목표 EC"),
                );
            }
            plot_ui.line(Line::new(points).color(color).width(1.5).name(&name));
        });
}
