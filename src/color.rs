use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// School colours
// ---------------------------------------------------------------------------

/// Fixed chart colours for the four trial schools, matching the study's
/// printed report figures.
pub const TRIAL_COLORS: [(&str, Color32); 4] = [
    ("송도고", Color32::from_rgb(0x1f, 0x77, 0xb4)),
    ("하늘고", Color32::from_rgb(0x2c, 0xa0, 0x2c)),
    ("아라고", Color32::from_rgb(0xff, 0x7f, 0x0e)),
    ("동산고", Color32::from_rgb(0xd6, 0x27, 0x28)),
];

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: school → Color32
// ---------------------------------------------------------------------------

/// Colour per school, in display order. Trial schools keep their fixed hue;
/// any other school in the data gets a generated one.
#[derive(Debug, Clone, Default)]
pub struct SchoolColors {
    mapping: Vec<(String, Color32)>,
}

impl SchoolColors {
    pub fn new(schools: &[String]) -> Self {
        let extras = schools.iter().filter(|s| fixed_color(s).is_none()).count();
        let mut palette = generate_palette(extras).into_iter();

        let mapping = schools
            .iter()
            .map(|school| {
                let color = fixed_color(school)
                    .or_else(|| palette.next())
                    .unwrap_or(Color32::GRAY);
                (school.clone(), color)
            })
            .collect();
        SchoolColors { mapping }
    }

    pub fn color_for(&self, school: &str) -> Color32 {
        self.mapping
            .iter()
            .find(|(name, _)| name == school)
            .map(|(_, color)| *color)
            .unwrap_or(Color32::GRAY)
    }

    /// Legend entries (school → colour) in display order.
    pub fn legend_entries(&self) -> &[(String, Color32)] {
        &self.mapping
    }
}

fn fixed_color(school: &str) -> Option<Color32> {
    TRIAL_COLORS
        .iter()
        .find(|(name, _)| *name == school)
        .map(|(_, color)| *color)
}
