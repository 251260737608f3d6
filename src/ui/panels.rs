use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::{export, loader};
use crate::schema;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("파일", |ui: &mut Ui| {
            if ui.button("데이터 폴더 열기…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            let reload = ui.add_enabled(
                state.data_dir.is_some(),
                egui::Button::new("다시 불러오기"),
            );
            if reload.clicked() {
                if let Some(dir) = state.data_dir.clone() {
                    load_data_dir(state, dir);
                }
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(snapshot) = &state.snapshot {
            ui.label(format!(
                "환경 {}행, 생육 {}행",
                snapshot.env_row_count(),
                snapshot.growth_row_count()
            ));
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – school selector and EC legend
// ---------------------------------------------------------------------------

/// Render the school selector. The choice only filters the environment
/// time-series; every aggregate view keeps showing all schools.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("학교 선택");
    ui.separator();

    let Some(summary) = &state.summary else {
        ui.label("데이터가 없습니다.");
        return;
    };
    let schools = summary.schools.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if ui
                .radio(state.selected_school.is_none(), "전체")
                .clicked()
            {
                state.selected_school = None;
            }
            for school in &schools {
                let selected = state.selected_school.as_deref() == Some(school);
                let text =
                    RichText::new(school).color(state.colors.color_for(school));
                if ui.radio(selected, text).clicked() {
                    state.selected_school = Some(school.clone());
                }
            }

            ui.add_space(8.0);
            ui.separator();
            ui.strong("EC 목표 (mS/cm)");
            for (school, color) in state.colors.legend_entries() {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label(RichText::new("■").color(*color));
                    match schema::target_ec_for(school) {
                        Some(ec) => ui.label(format!("{school}  EC {ec:.1}")),
                        None => ui.label(format!("{school}  (대상 외)")),
                    };
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Data loading
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let mut dialog = rfd::FileDialog::new().set_title("데이터 폴더 선택");
    if let Some(dir) = &state.data_dir {
        dialog = dialog.set_directory(dir);
    }
    if let Some(dir) = dialog.pick_folder() {
        load_data_dir(state, dir);
    }
}

/// Load a directory into the state. Fail-fast: on any error the previous
/// snapshot is dropped too, so the views never mix old and new data.
pub fn load_data_dir(state: &mut AppState, dir: PathBuf) {
    match loader::load_snapshot(&dir) {
        Ok(snapshot) => {
            log::info!(
                "loaded {} environment rows and {} growth rows from {}",
                snapshot.env_row_count(),
                snapshot.growth_row_count(),
                dir.display()
            );
            state.set_snapshot(dir, snapshot);
        }
        Err(e) => {
            log::error!("failed to load {}: {e:#}", dir.display());
            state.fail_load(dir, format!("오류: {e:#}"));
        }
    }
}

// ---------------------------------------------------------------------------
// XLSX export
// ---------------------------------------------------------------------------

pub fn export_environment(state: &mut AppState) {
    let Some(snapshot) = &state.snapshot else {
        return;
    };
    let Some(path) = save_dialog("환경 데이터 내보내기", schema::export::ENV_FILE) else {
        return;
    };
    match export::export_environment_xlsx(&snapshot.environment, &path) {
        Ok(()) => log::info!("exported environment data to {}", path.display()),
        Err(e) => {
            log::error!("environment export failed: {e:#}");
            state.status_message = Some(format!("내보내기 오류: {e:#}"));
        }
    }
}

pub fn export_growth(state: &mut AppState) {
    let Some(snapshot) = &state.snapshot else {
        return;
    };
    let Some(path) = save_dialog("생육 결과 내보내기", schema::export::GROWTH_FILE) else {
        return;
    };
    match export::export_growth_xlsx(&snapshot.growth, &path) {
        Ok(()) => log::info!("exported growth data to {}", path.display()),
        Err(e) => {
            log::error!("growth export failed: {e:#}");
            state.status_message = Some(format!("내보내기 오류: {e:#}"));
        }
    }
}

fn save_dialog(title: &str, file_name: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .set_file_name(file_name)
        .add_filter("Excel", &["xlsx"])
        .save_file()
}
