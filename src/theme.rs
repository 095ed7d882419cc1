use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationColors {
    pub fill: String,
    pub border: String,
}

impl GenerationColors {
    fn new(fill: &str, border: &str) -> Self {
        Self {
            fill: fill.to_string(),
            border: border.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub background: String,
    /// Colour buckets by generation; entry 0 is generation 1.
    pub generation_colors: Vec<GenerationColors>,
    pub default_fill: String,
    pub default_border: String,
    pub birthday_fill: String,
    pub birthday_border: String,
    pub junction_color: String,
    pub spouse_edge_color: String,
    pub parent_edge_color: String,
    pub edge_width: f32,
    pub border_width: f32,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "-apple-system, BlinkMacSystemFont, \"Segoe UI\", \"Hiragino Sans\", Meiryo, sans-serif".to_string(),
            font_size: 14.0,
            text_color: "#2c3e50".to_string(),
            background: "#FFFFFF".to_string(),
            generation_colors: vec![
                GenerationColors::new("#fff5e6", "#ffa500"),
                GenerationColors::new("#e6f3ff", "#4a90e2"),
                GenerationColors::new("#f0f8f0", "#5cb85c"),
                GenerationColors::new("#fff0f5", "#ff69b4"),
            ],
            default_fill: "#ffffff".to_string(),
            default_border: "#dee2e6".to_string(),
            birthday_fill: "#ffe5e5".to_string(),
            birthday_border: "#e74c3c".to_string(),
            junction_color: "#7f8c8d".to_string(),
            spouse_edge_color: "#764ba2".to_string(),
            parent_edge_color: "#7f8c8d".to_string(),
            edge_width: 3.0,
            border_width: 2.0,
        }
    }

    /// Print friendly greys; birthdays keep a darker border so they still
    /// stand out on paper.
    pub fn monochrome() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, sans-serif".to_string(),
            font_size: 14.0,
            text_color: "#1C2430".to_string(),
            background: "#FFFFFF".to_string(),
            generation_colors: vec![
                GenerationColors::new("#F4F4F4", "#5A5A5A"),
                GenerationColors::new("#F9F9F9", "#7A7A7A"),
                GenerationColors::new("#FFFFFF", "#9A9A9A"),
            ],
            default_fill: "#FFFFFF".to_string(),
            default_border: "#BBBBBB".to_string(),
            birthday_fill: "#EAEAEA".to_string(),
            birthday_border: "#111111".to_string(),
            junction_color: "#555555".to_string(),
            spouse_edge_color: "#333333".to_string(),
            parent_edge_color: "#777777".to_string(),
            edge_width: 2.0,
            border_width: 1.5,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" | "default" => Some(Self::classic()),
            "monochrome" | "mono" | "print" => Some(Self::monochrome()),
            _ => None,
        }
    }

    /// Bucket index into `generation_colors`, if the generation has one.
    pub fn generation_bucket(&self, generation: u32) -> Option<usize> {
        let idx = (generation as usize).checked_sub(1)?;
        (idx < self.generation_colors.len()).then_some(idx)
    }

    /// Fill and border for a person box. A birthday overrides the bucket.
    pub fn person_colors(&self, generation: u32, birthday: bool) -> (String, String) {
        if birthday {
            return (self.birthday_fill.clone(), self.birthday_border.clone());
        }
        match self.generation_bucket(generation) {
            Some(idx) => {
                let colors = &self.generation_colors[idx];
                (colors.fill.clone(), colors.border.clone())
            }
            None => (self.default_fill.clone(), self.default_border.clone()),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generations_past_palette_use_default_colors() {
        let theme = Theme::classic();
        assert_eq!(theme.generation_bucket(1), Some(0));
        assert_eq!(theme.generation_bucket(4), Some(3));
        assert_eq!(theme.generation_bucket(5), None);
        assert_eq!(theme.generation_bucket(0), None);
        assert_eq!(
            theme.person_colors(7, false),
            ("#ffffff".to_string(), "#dee2e6".to_string())
        );
    }

    #[test]
    fn birthday_overrides_generation_colors() {
        let theme = Theme::classic();
        let (fill, border) = theme.person_colors(2, true);
        assert_eq!(fill, "#ffe5e5");
        assert_eq!(border, "#e74c3c");
    }
}
