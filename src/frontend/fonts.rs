//! Font setup
//!
//! egui's bundled fonts have no Hangul glyphs. A CJK font is loaded from the
//! configured path or from well-known system locations and appended as a
//! fallback to both families, so Latin text keeps the default look.

use egui::{FontData, FontDefinitions, FontFamily};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const CJK_FONT_NAME: &str = "cjk-fallback";

/// System fonts tried in order when none is configured
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "C:\\Windows\\Fonts\\malgun.ttf",
    "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
    "/usr/share/fonts/nanum/NanumGothic.ttf",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/System/Library/Fonts/AppleSDGothicNeo.ttc",
];

/// First readable font among the configured path and the system candidates
pub fn find_cjk_font(configured: Option<&Path>) -> Option<(PathBuf, Vec<u8>)> {
    let candidates = configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from));

    for path in candidates {
        match std::fs::read(&path) {
            Ok(bytes) => return Some((path, bytes)),
            Err(e) => tracing::trace!("Font {:?} unavailable: {}", path, e),
        }
    }
    None
}

/// Font definitions with `bytes` appended as a fallback
pub fn definitions_with_fallback(bytes: Vec<u8>) -> FontDefinitions {
    let mut fonts = FontDefinitions::default();
    fonts.font_data.insert(
        CJK_FONT_NAME.to_owned(),
        Arc::new(FontData::from_owned(bytes)),
    );
    for family in [FontFamily::Proportional, FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push(CJK_FONT_NAME.to_owned());
    }
    fonts
}

/// Install fonts and text scale on `ctx`
pub fn install(ctx: &egui::Context, configured: Option<&Path>, font_scale: f32) {
    match find_cjk_font(configured) {
        Some((path, bytes)) => {
            tracing::info!("Using {:?} for Hangul text", path);
            ctx.set_fonts(definitions_with_fallback(bytes));
        }
        None => {
            tracing::warn!("No CJK font found; Korean labels may not render");
        }
    }

    if (font_scale - 1.0).abs() > f32::EPSILON {
        let mut style = (*ctx.style()).clone();
        style.text_styles.iter_mut().for_each(|(_, font_id)| {
            font_id.size *= font_scale;
        });
        ctx.set_style(style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_font_is_preferred() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.ttf");
        std::fs::write(&path, b"not really a font").unwrap();

        let (found, bytes) = find_cjk_font(Some(&path)).unwrap();
        assert_eq!(found, path);
        assert_eq!(bytes, b"not really a font");
    }

    #[test]
    fn test_fallback_is_appended_last() {
        let fonts = definitions_with_fallback(vec![0u8; 4]);
        assert!(fonts.font_data.contains_key(CJK_FONT_NAME));

        let proportional = &fonts.families[&FontFamily::Proportional];
        assert_eq!(proportional.last().map(String::as_str), Some(CJK_FONT_NAME));
        assert!(proportional.len() > 1);
    }
}
