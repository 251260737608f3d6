use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::schema;
use crate::state::AppState;
use crate::ui::charts;

// ---------------------------------------------------------------------------
// Overview tab
// ---------------------------------------------------------------------------

pub fn view(ui: &mut Ui, state: &mut AppState) {
    let Some(summary) = &state.summary else {
        charts::empty_hint(ui);
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("연구 배경 및 목적");
            ui.add_space(4.0);
            ui.label(
                "본 연구는 극지식물의 생육에 영향을 미치는 EC(전기전도도) 농도의 \
                 최적 조건을 도출하기 위해 4개 학교에서 수행된 실험 데이터를 분석한다. \
                 각 학교는 서로 다른 EC 농도의 양액으로 같은 작물을 재배하였다.",
            );
            ui.add_space(12.0);

            egui::Grid::new("school_overview")
                .striped(true)
                .spacing([24.0, 6.0])
                .show(ui, |ui: &mut Ui| {
                    ui.strong("학교명");
                    ui.strong("EC 목표");
                    ui.strong("개체수");
                    ui.strong("색상");
                    ui.end_row();

                    for school in &summary.schools {
                        ui.label(school);
                        match schema::target_ec_for(school) {
                            Some(ec) => ui.label(format!("{ec:.1}")),
                            None => ui.label("-"),
                        };
                        let count = summary
                            .plants_per_school
                            .get(school)
                            .copied()
                            .unwrap_or(0);
                        ui.label(count.to_string());
                        ui.label(
                            RichText::new("■").color(state.colors.color_for(school)),
                        );
                        ui.end_row();
                    }
                });

            ui.add_space(16.0);
            ui.columns(4, |cols: &mut [Ui]| {
                charts::metric_card(&mut cols[0], "총 개체수", &summary.total_plants.to_string());
                charts::metric_card(
                    &mut cols[1],
                    "평균 온도",
                    &match summary.mean_temperature {
                        Some(v) => format!("{v:.1} ℃"),
                        None => "-".to_string(),
                    },
                );
                charts::metric_card(
                    &mut cols[2],
                    "평균 습도",
                    &match summary.mean_humidity {
                        Some(v) => format!("{v:.1} %"),
                        None => "-".to_string(),
                    },
                );
                charts::metric_card(&mut cols[3], "최적 EC", &best_ec_label(summary.best_ec));
            });
        });
}

/// `2.0 (하늘고)` when the level maps back to trial schools, plain number
/// otherwise, `-` while there is no growth data.
fn best_ec_label(best_ec: Option<f64>) -> String {
    let Some(ec) = best_ec else {
        return "-".to_string();
    };
    let schools = schema::schools_at_ec(ec);
    if schools.is_empty() {
        format!("{ec:.1}")
    } else {
        format!("{ec:.1} ({})", schools.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_ec_label_names_the_school() {
        assert_eq!(best_ec_label(Some(2.0)), "2.0 (하늘고)");
        assert_eq!(best_ec_label(Some(3.0)), "3.0");
        assert_eq!(best_ec_label(None), "-");
    }
}
