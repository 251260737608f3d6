use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::color::SchoolColors;
use crate::data::analysis::{self, Summary};
use crate::data::model::Snapshot;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Environment,
    Growth,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Overview, Tab::Environment, Tab::Growth];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "실험 개요",
            Tab::Environment => "환경 데이터",
            Tab::Growth => "생육 결과",
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Directory the current snapshot was loaded from (kept on a failed
    /// reload so the user can retry).
    pub data_dir: Option<PathBuf>,

    /// Loaded data (None until a load succeeds; cleared when one fails).
    pub snapshot: Option<Snapshot>,

    /// Aggregates over `snapshot`, computed once per load.
    pub summary: Option<Summary>,

    /// Colour per school in display order.
    pub colors: SchoolColors,

    /// School filter for the time-series view; `None` means all schools.
    pub selected_school: Option<String>,

    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            data_dir: None,
            snapshot: None,
            summary: None,
            colors: SchoolColors::default(),
            selected_school: None,
            tab: Tab::Overview,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a freshly loaded snapshot: compute its summary, refresh the
    /// colour mapping, and drop a school selection that no longer exists.
    pub fn set_snapshot(&mut self, dir: PathBuf, snapshot: Snapshot) {
        let summary = analysis::summarize(&snapshot);
        self.colors = SchoolColors::new(&summary.schools);

        if let Some(school) = &self.selected_school {
            if !summary.schools.contains(school) {
                self.selected_school = None;
            }
        }

        self.data_dir = Some(dir);
        self.snapshot = Some(snapshot);
        self.summary = Some(summary);
        self.status_message = None;
    }

    /// A failed load leaves no data behind; the views fall back to the
    /// open-a-folder hint and the top bar shows the message.
    pub fn fail_load(&mut self, dir: PathBuf, message: String) {
        self.data_dir = Some(dir);
        self.snapshot = None;
        self.summary = None;
        self.status_message = Some(message);
    }
}

// ---------------------------------------------------------------------------
// Persisted preferences
// ---------------------------------------------------------------------------

/// What survives a restart (via eframe's storage): the last data directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Prefs {
    pub data_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil::{growth_table, snapshot_of};

    #[test]
    fn set_snapshot_caches_summary_and_colors() {
        let mut state = AppState::default();
        state.set_snapshot(
            PathBuf::from("data"),
            snapshot_of(vec![], vec![("하늘고", growth_table("하늘고", &[10.0]))]),
        );

        assert!(state.snapshot.is_some());
        let summary = state.summary.as_ref().unwrap();
        assert_eq!(summary.schools, vec!["하늘고".to_string()]);
        assert_eq!(state.colors.legend_entries().len(), 1);
        assert_eq!(state.data_dir, Some(PathBuf::from("data")));
    }

    #[test]
    fn vanished_school_selection_is_dropped() {
        let mut state = AppState::default();
        state.selected_school = Some("송도고".to_string());
        state.set_snapshot(
            PathBuf::from("data"),
            snapshot_of(vec![], vec![("하늘고", growth_table("하늘고", &[10.0]))]),
        );
        assert_eq!(state.selected_school, None);

        state.selected_school = Some("하늘고".to_string());
        state.set_snapshot(
            PathBuf::from("data"),
            snapshot_of(vec![], vec![("하늘고", growth_table("하늘고", &[12.0]))]),
        );
        assert_eq!(state.selected_school, Some("하늘고".to_string()));
    }

    #[test]
    fn failed_load_clears_previous_data() {
        let mut state = AppState::default();
        state.set_snapshot(
            PathBuf::from("data"),
            snapshot_of(vec![], vec![("하늘고", growth_table("하늘고", &[10.0]))]),
        );

        state.fail_load(PathBuf::from("elsewhere"), "오류".to_string());
        assert!(state.snapshot.is_none());
        assert!(state.summary.is_none());
        assert_eq!(state.data_dir, Some(PathBuf::from("elsewhere")));
        assert!(state.status_message.is_some());
    }
}
