use eframe::egui::{self, Color32, ScrollArea, Stroke, Ui};
use egui_plot::{BoxElem, BoxPlot, BoxSpread, Corner, Legend, Plot, Points};

use crate::color::SchoolColors;
use crate::data::analysis::Summary;
use crate::data::model::{union_columns, GrowthRecord, Snapshot};
use crate::schema;
use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// Growth tab
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
            ui.heading("EC별 생육 결과 비교");
            ui.add_space(4.0);
            ui.horizontal(|ui: &mut Ui| {
                charts::metric_card(
                    ui,
                    "최적 EC (평균 생중량 기준)",
                    &best_ec_text(summary),
                );
            });
            ui.add_space(8.0);

            let by_ec = |value: fn(&crate::data::analysis::EcGroupStats) -> f64| {
                summary
                    .ec_groups
                    .iter()
                    .map(|g| (g.ec, value(g)))
                    .collect::<Vec<_>>()
            };

            ui.columns(2, |cols: &mut [Ui]| {
                cols[0].strong("평균 생중량 (g)");
                charts::ec_bar_chart(
                    &mut cols[0],
                    "growth_weight",
                    200.0,
                    &by_ec(|g| g.mean_fresh_weight_g),
                    Color32::from_rgb(0x2c, 0xa0, 0x2c),
                );
                cols[1].strong("평균 잎 수 (장)");
                charts::ec_bar_chart(
                    &mut cols[1],
                    "growth_leaves",
                    200.0,
                    &by_ec(|g| g.mean_leaf_count),
                    Color32::from_rgb(0x1f, 0x77, 0xb4),
                );
            });
            ui.columns(2, |cols: &mut [Ui]| {
                cols[0].strong("평균 지상부 길이 (mm)");
                charts::ec_bar_chart(
                    &mut cols[0],
                    "growth_shoot",
                    200.0,
                    &by_ec(|g| g.mean_shoot_length_mm),
                    Color32::from_rgb(0xff, 0x7f, 0x0e),
                );
                cols[1].strong("개체수");
                charts::ec_bar_chart(
                    &mut cols[1],
                    "growth_count",
                    200.0,
                    &by_ec(|g| g.plants as f64),
                    Color32::GRAY,
                );
            });

            ui.add_space(12.0);
            ui.heading("학교별 생중량 분포");
            weight_box_plot(ui, summary, &state.colors);

            ui.add_space(12.0);
            ui.heading("상관관계 분석");
            ui.columns(2, |cols: &mut [Ui]| {
                scatter_plot(
                    &mut cols[0],
                    "scatter_leaves",
                    "잎 수(장)",
                    snapshot,
                    summary,
                    &state.colors,
                    |r| r.leaf_count as f64,
                );
                scatter_plot(
                    &mut cols[1],
                    "scatter_shoot",
                    "지상부 길이(mm)",
                    snapshot,
                    summary,
                    &state.colors,
                    |r| r.shoot_length_mm,
                );
            });

            ui.add_space(12.0);
            egui::CollapsingHeader::new("생육 데이터 원본")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    if ui.button("XLSX 내보내기").clicked() {
                        export_clicked = true;
                    }
                    let mut columns =
                        union_columns(snapshot.growth.values().map(|t| &t.columns));
                    let source_cols = columns.len();
                    columns.push(schema::SCHOOL_COLUMN.to_string());
                    columns.push(schema::EC_COLUMN.to_string());

                    let rows: Vec<Vec<String>> = snapshot
                        .growth_records()
                        .map(|record| {
                            let mut cells: Vec<String> = columns[..source_cols]
                                .iter()
                                .map(|col| {
                                    record
                                        .value_for(col)
                                        .map(|v| v.to_string())
                                        .unwrap_or_default()
                                })
                                .collect();
                            cells.push(record.school.clone());
                            cells.push(
                                record
                                    .target_ec()
                                    .map(|ec| format!("{ec:.1}"))
                                    .unwrap_or_default(),
                            );
                            cells
                        })
                        .collect();
                    charts::raw_table(ui, "growth_raw", &columns, &rows);
                });
        });

    if export_clicked {
        panels::export_growth(state);
    }
}

fn best_ec_text(summary: &Summary) -> String {
    match summary.best_ec {
        Some(ec) => format!("{ec:.1} mS/cm"),
        None => "-".to_string(),
    }
}

/// One box per school in display order, outliers drawn as dots in the same
/// colour.
fn weight_box_plot(ui: &mut Ui, summary: &Summary, colors: &SchoolColors) {
    let mut elems = Vec::new();
    let mut outliers: Vec<(Color32, Vec<[f64; 2]>, String)> = Vec::new();

    for (i, spread) in summary.weight_spreads.iter().enumerate() {
        let color = colors.color_for(&spread.school);
        elems.push(
            BoxElem::new(
                i as f64,
                BoxSpread::new(
                    spread.lower_whisker,
                    spread.q1,
                    spread.median,
                    spread.q3,
                    spread.upper_whisker,
                ),
            )
            .name(format!("{} (n={})", spread.school, spread.samples))
            .fill(color.gamma_multiply(0.3))
            .stroke(Stroke::new(1.5, color))
            .box_width(0.5)
            .whisker_width(0.35),
        );

        if !spread.outliers.is_empty() {
            let points: Vec<[f64; 2]> =
                spread.outliers.iter().map(|&w| [i as f64, w]).collect();
            outliers.push((color, points, spread.school.clone()));
        }
    }
    let labels: Vec<String> = summary
        .weight_spreads
        .iter()
        .map(|s| s.school.clone())
        .collect();

    Plot::new("weight_box")
        .height(260.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(move |mark, _range| charts::ordinal_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(elems));
            for (color, points, school) in outliers {
                plot_ui.points(Points::new(points).color(color).radius(2.5).name(&school));
            }
        });
}

/// Fresh weight against another growth metric, coloured by school.
fn scatter_plot(
    ui: &mut Ui,
    id: &str,
    x_label: &str,
    snapshot: &Snapshot,
    summary: &Summary,
    colors: &SchoolColors,
    x_of: fn(&GrowthRecord) -> f64,
) {
    ui.strong(format!("{x_label} vs 생중량(g)"));
    Plot::new(id)
        .height(240.0)
        .legend(Legend::default().position(Corner::RightTop))
        .x_axis_label(x_label)
        .y_axis_label("생중량(g)")
        .show(ui, |plot_ui| {
            for school in &summary.schools {
                let Some(table) = snapshot.growth.get(school) else {
                    continue;
                };
                if table.records.is_empty() {
                    continue;
                }
                let points: Vec<[f64; 2]> = table
                    .records
                    .iter()
                    .map(|r| [x_of(r), r.fresh_weight_g])
                    .collect();
                plot_ui.points(
                    Points::new(points)
                        .color(colors.color_for(school))
                        .radius(2.5)
                        .name(school),
                );
            }
        });
}
