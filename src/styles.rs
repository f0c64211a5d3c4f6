//! Cell formatting as a patch over the stored style.
//!
//! A [`StylePatch`] names only the attributes a caller wants changed;
//! applying it mutates exactly those attributes on the cell's existing
//! style, so previously set formatting survives (merge, not replace).

use crate::error::{ExcelError, Result};
use std::str::FromStr;
use umya_spreadsheet::structs::{HorizontalAlignmentValues, VerticalAlignmentValues};
use umya_spreadsheet::{PatternValues, Style};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StylePatch {
    pub bold: Option<bool>,
    pub wrap_text: Option<bool>,
    pub horizontal: Option<String>,
    pub vertical: Option<String>,
    pub number_format: Option<String>,
    pub fill_hex: Option<String>,
}

impl StylePatch {
    pub fn is_empty(&self) -> bool {
        self.bold.is_none()
            && self.wrap_text.is_none()
            && self.horizontal.is_none()
            && self.vertical.is_none()
            && self.number_format.is_none()
            && self.fill_hex.is_none()
    }

    /// Validate and canonicalize the patch before it touches any cell, so
    /// a bad color rejects the whole call instead of half a range.
    pub fn normalized(mut self) -> Result<Self> {
        if let Some(raw) = self.fill_hex.take() {
            self.fill_hex = Some(normalize_fill_hex(&raw)?);
        }
        Ok(self)
    }

    pub fn apply(&self, style: &mut Style) {
        if let Some(bold) = self.bold {
            style.get_font_mut().set_bold(bold);
        }

        if self.wrap_text.is_some() || self.horizontal.is_some() || self.vertical.is_some() {
            let alignment = style.get_alignment_mut();
            if let Some(wrap) = self.wrap_text {
                alignment.set_wrap_text(wrap);
            }
            if let Some(horizontal) = &self.horizontal {
                if let Ok(value) = HorizontalAlignmentValues::from_str(horizontal) {
                    alignment.set_horizontal(value);
                }
            }
            if let Some(vertical) = &self.vertical {
                if let Ok(value) = VerticalAlignmentValues::from_str(vertical) {
                    alignment.set_vertical(value);
                }
            }
        }

        if let Some(format) = &self.number_format {
            style.get_number_format_mut().set_format_code(format.clone());
        }

        if let Some(hex) = &self.fill_hex {
            let pattern = style.get_fill_mut().get_pattern_fill_mut();
            pattern.set_pattern_type(PatternValues::Solid);
            pattern.get_foreground_color_mut().set_argb(hex.clone());
        }
    }
}

/// Canonical fill color: 6 hex digits, uppercase, no leading `#`.
pub fn normalize_fill_hex(raw: &str) -> Result<String> {
    let color = raw.trim().trim_start_matches('#');
    if color.len() != 6 || !color.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ExcelError::InvalidColor {
            value: raw.to_string(),
        });
    }
    Ok(color.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_hex_normalizes_case_and_hash() {
        assert_eq!(normalize_fill_hex("EAF2FF").expect("hex"), "EAF2FF");
        assert_eq!(normalize_fill_hex("#eaf2ff").expect("hex"), "EAF2FF");
        assert_eq!(normalize_fill_hex("  #AbCdEf ").expect("hex"), "ABCDEF");
    }

    #[test]
    fn fill_hex_rejects_bad_input() {
        assert!(normalize_fill_hex("bad").is_err());
        assert!(normalize_fill_hex("EAF2FF00").is_err());
        assert!(normalize_fill_hex("GGGGGG").is_err());
        assert!(normalize_fill_hex("").is_err());
    }

    #[test]
    fn apply_merges_over_existing_attributes() {
        let mut style = Style::default();
        StylePatch {
            bold: Some(true),
            number_format: Some("0.00".to_string()),
            ..StylePatch::default()
        }
        .apply(&mut style);

        // a later patch naming only wrap_text must not clear bold
        StylePatch {
            wrap_text: Some(true),
            ..StylePatch::default()
        }
        .apply(&mut style);

        assert!(*style.get_font().expect("font").get_bold());
        assert!(*style.get_alignment().expect("alignment").get_wrap_text());
        assert_eq!(
            style.get_number_format().expect("format").get_format_code(),
            "0.00"
        );
    }

    #[test]
    fn apply_sets_solid_fill() {
        let mut style = Style::default();
        StylePatch {
            fill_hex: Some("EAF2FF".to_string()),
            ..StylePatch::default()
        }
        .apply(&mut style);

        let pattern = style
            .get_fill()
            .expect("fill")
            .get_pattern_fill()
            .expect("pattern");
        assert_eq!(pattern.get_pattern_type(), &PatternValues::Solid);
        assert_eq!(
            pattern
                .get_foreground_color()
                .expect("color")
                .get_argb(),
            "EAF2FF"
        );
    }

    #[test]
    fn normalized_rejects_invalid_color_up_front() {
        let patch = StylePatch {
            fill_hex: Some("bad".to_string()),
            ..StylePatch::default()
        };
        assert!(patch.normalized().is_err());
    }
}
