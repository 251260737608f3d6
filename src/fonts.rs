use std::sync::Arc;

use eframe::egui;

// ---------------------------------------------------------------------------
// Korean font fallback
// ---------------------------------------------------------------------------

/// Well-known system font paths, tried in order. The glyph rasterizer only
/// handles TrueType outlines, so CFF-flavoured OpenType files are not listed.
const FONT_CANDIDATES: &[&str] = &[
    "C:\\Windows\\Fonts\\malgun.ttf",
    "/System/Library/Fonts/AppleSDGothicNeo.ttc",
    "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansKR-Regular.ttf",
];

/// Register the first available system font that covers Hangul as a fallback
/// for both font families. The dataset is Korean throughout; without this the
/// default egui fonts draw every label as boxes.
pub fn install_korean_fallback(ctx: &egui::Context) {
    for path in FONT_CANDIDATES {
        let Ok(bytes) = std::fs::read(path) else {
            continue;
        };

        let mut fonts = egui::FontDefinitions::default();
        fonts
            .font_data
            .insert("korean".to_owned(), Arc::new(egui::FontData::from_owned(bytes)));
        for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
            if let Some(list) = fonts.families.get_mut(&family) {
                list.push("korean".to_owned());
            }
        }
        ctx.set_fonts(fonts);

        log::info!("installed Korean fallback font from {path}");
        return;
    }
    log::warn!("no Korean system font found; Hangul labels will not render");
}
