use std::path::Path;
use std::sync::Arc;

use eframe::egui::{self, FontData, FontDefinitions, FontFamily};

/// System fonts tried, in order, when no font is configured.  The built-in
/// egui fonts have no CJK glyphs.
const CJK_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/System/Library/Fonts/ヒラギノ角ゴシック W3.ttc",
    "/System/Library/Fonts/Hiragino Sans GB.ttc",
    "C:\\Windows\\Fonts\\meiryo.ttc",
    "C:\\Windows\\Fonts\\msgothic.ttc",
];

/// Append a CJK-capable font as a fallback to both font families.
///
/// `configured` wins over the system candidates.  Returns whether a font
/// was installed; without one, Japanese labels render as boxes.
pub fn install_cjk_font(ctx: &egui::Context, configured: Option<&str>) -> bool {
    let candidates = configured.into_iter().chain(CJK_FONT_CANDIDATES.iter().copied());

    for candidate in candidates {
        let path = Path::new(candidate);
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::debug!("Font {} unavailable: {e}", path.display());
                continue;
            }
        };

        let mut fonts = FontDefinitions::default();
        fonts
            .font_data
            .insert("cjk".to_owned(), Arc::new(FontData::from_owned(bytes)));
        for family in [FontFamily::Proportional, FontFamily::Monospace] {
            fonts.families.entry(family).or_default().push("cjk".to_owned());
        }
        ctx.set_fonts(fonts);
        log::info!("Installed CJK font from {}", path.display());
        return true;
    }

    log::warn!("No CJK font found; set \"font_path\" in the configuration");
    false
}
