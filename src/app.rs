use std::path::PathBuf;

use eframe::egui;

use crate::fonts;
use crate::state::{AppState, Prefs, Tab};
use crate::ui::{environment, growth, overview, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct GrowLabApp {
    pub state: AppState,
}

impl GrowLabApp {
    /// Build the app and load the startup data directory: a command-line
    /// argument wins, then the directory remembered from the last run, then
    /// `./data`.
    pub fn new(cc: &eframe::CreationContext<'_>, cli_dir: Option<PathBuf>) -> Self {
        fonts::install_korean_fallback(&cc.egui_ctx);

        let prefs: Prefs = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let dir = cli_dir
            .or(prefs.data_dir)
            .unwrap_or_else(|| PathBuf::from("data"));

        let mut state = AppState::default();
        panels::load_data_dir(&mut state, dir);
        Self { state }
    }
}

impl eframe::App for GrowLabApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: school selector ----
        egui::SidePanel::left("school_panel")
            .default_width(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: active tab ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                for tab in Tab::ALL {
                    let label = ui.selectable_label(self.state.tab == tab, tab.label());
                    if label.clicked() {
                        self.state.tab = tab;
                    }
                }
            });
            ui.separator();

            match self.state.tab {
                Tab::Overview => overview::view(ui, &mut self.state),
                Tab::Environment => environment::view(ui, &mut self.state),
                Tab::Growth => growth::view(ui, &mut self.state),
            }
        });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let prefs = Prefs {
            data_dir: self.state.data_dir.clone(),
        };
        eframe::set_value(storage, eframe::APP_KEY, &prefs);
    }
}
