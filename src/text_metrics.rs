use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Rendered width of `text` in px. Falls back to per-character estimates
/// when no matching system font can be loaded.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> f32 {
    if text.is_empty() || font_size <= 0.0 {
        return 0.0;
    }
    let measured = TEXT_MEASURER
        .lock()
        .ok()
        .and_then(|mut guard| guard.measure(text, font_size, font_family));
    measured.unwrap_or_else(|| estimate_text_width(text, font_size))
}

pub fn estimate_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(|ch| fallback_advance(ch) * font_size).sum()
}

/// Advance in em for characters without font data. Names in this domain
/// are often CJK, which is full width.
fn fallback_advance(ch: char) -> f32 {
    match ch {
        '\n' => 0.0,
        ' ' => 0.3,
        'A'..='Z' => 0.65,
        '0'..='9' => 0.56,
        '\u{1100}'..='\u{115F}'
        | '\u{2E80}'..='\u{A4CF}'
        | '\u{AC00}'..='\u{D7A3}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FE30}'..='\u{FE4F}'
        | '\u{FF00}'..='\u{FF60}'
        | '\u{FFE0}'..='\u{FFE6}' => 1.0,
        _ => 0.56,
    }
}

/// Splits `text` on newlines and wraps every line to `max_width` px.
pub fn wrap_text(text: &str, max_width: f32, font_size: f32, font_family: &str) -> Vec<String> {
    let measure = |line: &str| measure_text_width(line, font_size, font_family);
    text.split('\n')
        .flat_map(|line| wrap_line_with(line, max_width, &measure))
        .collect()
}

/// Greedy wrap that prefers the last space and otherwise breaks between
/// characters, so unspaced CJK names still fit.
pub fn wrap_line_with(line: &str, max_width: f32, measure: &dyn Fn(&str) -> f32) -> Vec<String> {
    if max_width <= 0.0 || measure(line) <= max_width {
        return vec![line.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut last_space: Option<usize> = None;
    for ch in line.chars() {
        current.push(ch);
        if ch == ' ' {
            last_space = Some(current.len() - 1);
            continue;
        }
        if current.chars().count() > 1 && measure(&current) > max_width {
            match last_space.take() {
                Some(idx) => {
                    let rest = current.split_off(idx + 1);
                    lines.push(current.trim_end().to_string());
                    current = rest;
                }
                None => {
                    current.pop();
                    lines.push(current);
                    current = ch.to_string();
                }
            }
        }
    }
    let tail = current.trim_end();
    if !tail.is_empty() || lines.is_empty() {
        lines.push(tail.to_string());
    }
    lines
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let family_key = normalize_family_key(font_family);
        if !self.cache.contains_key(&family_key) {
            let face = self.load_face(&family_key);
            self.cache.insert(family_key.clone(), face);
        }
        let face = self.cache.get_mut(&family_key)?.as_mut()?;
        Some(face.measure_width(text, font_size))
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let mut names: Vec<&str> = Vec::new();
        let mut generic = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            match raw.to_ascii_lowercase().as_str() {
                "" => {}
                "serif" => generic.push(Family::Serif),
                "monospace" | "ui-monospace" => generic.push(Family::Monospace),
                "sans-serif" | "system-ui" | "-apple-system" | "blinkmacsystemfont" => {
                    generic.push(Family::SansSerif)
                }
                _ => names.push(raw),
            }
        }
        let mut families: Vec<Family<'_>> = names.into_iter().map(Family::Name).collect();
        families.extend(generic);
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut loaded = None;
        self.db.with_face_data(id, |data, index| {
            if let Ok(face) = Face::parse(data, index) {
                loaded = Some(FontFace {
                    data: data.to_vec(),
                    index,
                    units_per_em: face.units_per_em().max(1),
                    advances: HashMap::new(),
                });
            }
        });
        loaded
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    /// Horizontal advance per character in font units; `None` when the
    /// face has no glyph for it.
    advances: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn measure_width(&mut self, text: &str, font_size: f32) -> f32 {
        let missing: Vec<char> = text
            .chars()
            .filter(|ch| !self.advances.contains_key(ch))
            .collect();
        if !missing.is_empty() {
            let face = Face::parse(&self.data, self.index).ok();
            for ch in missing {
                let advance = face.as_ref().and_then(|face| {
                    let glyph = face.glyph_index(ch)?;
                    face.glyph_hor_advance(glyph)
                });
                self.advances.insert(ch, advance);
            }
        }

        let scale = font_size / self.units_per_em as f32;
        text.chars()
            .map(|ch| match self.advances.get(&ch).copied().flatten() {
                Some(advance) if advance > 0 => advance as f32 * scale,
                _ => fallback_advance(ch) * font_size,
            })
            .sum()
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_per_char(text: &str) -> f32 {
        text.chars().count() as f32 * 10.0
    }

    #[test]
    fn short_lines_are_untouched() {
        assert_eq!(wrap_line_with("Ann", 50.0, &ten_per_char), vec!["Ann"]);
        assert_eq!(wrap_line_with("", 50.0, &ten_per_char), vec![""]);
    }

    #[test]
    fn wraps_at_spaces_then_characters() {
        assert_eq!(
            wrap_line_with("Anna Maria Svensson", 50.0, &ten_per_char),
            vec!["Anna", "Maria", "Svens", "son"]
        );
    }

    #[test]
    fn wraps_unspaced_cjk_names() {
        assert_eq!(wrap_line_with("山田太郎", 25.0, &ten_per_char), vec!["山田", "太郎"]);
    }

    #[test]
    fn estimate_treats_cjk_as_full_width() {
        assert_eq!(estimate_text_width("山田", 14.0), 28.0);
        assert!(estimate_text_width("ab", 14.0) < 28.0);
    }
}
