use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Corner, Legend, Plot};
use egui_extras::{Column, TableBuilder};

// ---------------------------------------------------------------------------
// Shared widgets: metric cards, bar charts, raw tables
// ---------------------------------------------------------------------------

/// Small framed label/value pair, the dashboard's headline numbers.
pub fn metric_card(ui: &mut Ui, label: &str, value: &str) {
    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::symmetric(14, 10))
        .show(ui, |ui: &mut Ui| {
            ui.vertical(|ui: &mut Ui| {
                ui.label(RichText::new(label).small().weak());
                ui.label(RichText::new(value).heading());
            });
        });
}

/// Hint shown by every view while no snapshot is loaded.
pub fn empty_hint(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("데이터 폴더를 열어 주세요  (파일 → 데이터 폴더 열기…)");
    });
}

/// Bar chart with one bar per school at ordinal x positions; the axis shows
/// school names instead of numbers.
pub fn school_bar_chart(ui: &mut Ui, id: &str, height: f32, entries: &[(String, f64, Color32)]) {
    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, (school, value, color))| {
            Bar::new(i as f64, *value).name(school).fill(*color).width(0.6)
        })
        .collect();
    let labels: Vec<String> = entries.iter().map(|(school, _, _)| school.clone()).collect();

    Plot::new(id)
        .height(height)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(move |mark, _range| ordinal_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// Grouped per-school bars: measured value beside the target, where a target
/// exists. Used for the measured-vs-target EC comparison.
pub fn grouped_school_bar_chart(
    ui: &mut Ui,
    id: &str,
    height: f32,
    entries: &[(String, f64, Option<f64>)],
    measured_name: &str,
    target_name: &str,
) {
    let measured: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, (school, value, _))| {
            Bar::new(i as f64 - 0.18, *value)
                .name(school)
                .fill(Color32::from_rgb(0x1f, 0x77, 0xb4))
                .width(0.32)
        })
        .collect();
    let targets: Vec<Bar> = entries
        .iter()
        .enumerate()
        .filter_map(|(i, (school, _, target))| {
            target.map(|t| {
                Bar::new(i as f64 + 0.18, t)
                    .name(school)
                    .fill(Color32::GRAY)
                    .width(0.32)
            })
        })
        .collect();
    let labels: Vec<String> = entries.iter().map(|(school, _, _)| school.clone()).collect();

    Plot::new(id)
        .height(height)
        .legend(Legend::default().position(Corner::RightTop))
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(move |mark, _range| ordinal_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(measured).name(measured_name));
            plot_ui.bar_chart(BarChart::new(targets).name(target_name));
        });
}

/// Bar chart keyed by EC level, bars at their numeric position so the dose
/// spacing (1, 2, 4, 8 mS/cm) stays visible.
pub fn ec_bar_chart(ui: &mut Ui, id: &str, height: f32, entries: &[(f64, f64)], color: Color32) {
    let bars: Vec<Bar> = entries
        .iter()
        .map(|&(ec, value)| Bar::new(ec, value).fill(color).width(0.55))
        .collect();

    Plot::new(id)
        .height(height)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// Label for ordinal marks: the entry at that index, nothing between.
pub(crate) fn ordinal_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 0.2 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Striped virtualized table over pre-rendered cell text.
pub fn raw_table(ui: &mut Ui, id: &str, columns: &[String], rows: &[Vec<String>]) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .max_scroll_height(320.0)
            .columns(Column::auto().resizable(true), columns.len())
            .header(20.0, |mut header| {
                for column in columns {
                    header.col(|ui| {
                        ui.strong(column);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, rows.len(), |mut row| {
                    let cells = &rows[row.index()];
                    for cell in cells {
                        row.col(|ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
    });
}
