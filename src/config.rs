use crate::dates::is_valid_date_format;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Vertical distance between generation rows.
    pub row_spacing: f32,
    /// Horizontal distance between members of one family group.
    pub unit_spacing: f32,
    /// Gap between neighbouring family groups on a row.
    pub group_spacing: f32,
    /// y of the generation 1 row.
    pub top_offset: f32,
    /// Cap on overlap-shift rounds per family group.
    pub max_shift_iterations: usize,
    pub node_width: f32,
    pub node_height: f32,
    pub junction_size: f32,
    /// Spread applied to both axes by the breadth-first fallback ranking.
    pub fallback_spacing_factor: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_spacing: 200.0,
            unit_spacing: 220.0,
            group_spacing: 50.0,
            top_offset: 100.0,
            max_shift_iterations: 100,
            node_width: 180.0,
            node_height: 100.0,
            junction_size: 8.0,
            fallback_spacing_factor: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Adds an age line under the birth date.
    pub show_age: bool,
    /// chrono format string for the birth date line.
    pub date_format: String,
    pub years_suffix: String,
    pub months_suffix: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            show_age: false,
            date_format: "%Y-%m-%d".to_string(),
            years_suffix: "y".to_string(),
            months_suffix: "m".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
    /// Margin kept around the content when fitting the viewBox.
    pub fit_padding: f32,
    pub text_max_width: f32,
    pub label_line_height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
            fit_padding: 50.0,
            text_max_width: 160.0,
            label_line_height: 1.35,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub label: LabelConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            label: LabelConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    text_color: Option<String>,
    background: Option<String>,
    generation_colors: Option<Vec<crate::theme::GenerationColors>>,
    default_fill: Option<String>,
    default_border: Option<String>,
    birthday_fill: Option<String>,
    birthday_border: Option<String>,
    junction_color: Option<String>,
    spouse_edge_color: Option<String>,
    parent_edge_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    row_spacing: Option<f32>,
    unit_spacing: Option<f32>,
    group_spacing: Option<f32>,
    top_offset: Option<f32>,
    max_shift_iterations: Option<usize>,
    node_width: Option<f32>,
    node_height: Option<f32>,
    junction_size: Option<f32>,
    fallback_spacing_factor: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelConfigFile {
    show_age: Option<bool>,
    date_format: Option<String>,
    years_suffix: Option<String>,
    months_suffix: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    background: Option<String>,
    fit_padding: Option<f32>,
    text_max_width: Option<f32>,
    label_line_height: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    label: Option<LabelConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme {theme_name:?}; use classic or monochrome"))?;
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        let theme = &mut config.theme;
        if let Some(v) = vars.font_family {
            theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            theme.text_color = v;
        }
        if let Some(v) = vars.background {
            theme.background = v.clone();
            config.render.background = v;
        }
        if let Some(v) = vars.generation_colors {
            theme.generation_colors = v;
        }
        if let Some(v) = vars.default_fill {
            theme.default_fill = v;
        }
        if let Some(v) = vars.default_border {
            theme.default_border = v;
        }
        if let Some(v) = vars.birthday_fill {
            theme.birthday_fill = v;
        }
        if let Some(v) = vars.birthday_border {
            theme.birthday_border = v;
        }
        if let Some(v) = vars.junction_color {
            theme.junction_color = v;
        }
        if let Some(v) = vars.spouse_edge_color {
            theme.spouse_edge_color = v;
        }
        if let Some(v) = vars.parent_edge_color {
            theme.parent_edge_color = v;
        }
    }

    if let Some(layout) = parsed.layout {
        let cfg = &mut config.layout;
        if let Some(v) = layout.row_spacing {
            cfg.row_spacing = v;
        }
        if let Some(v) = layout.unit_spacing {
            cfg.unit_spacing = v;
        }
        if let Some(v) = layout.group_spacing {
            cfg.group_spacing = v;
        }
        if let Some(v) = layout.top_offset {
            cfg.top_offset = v;
        }
        if let Some(v) = layout.max_shift_iterations {
            cfg.max_shift_iterations = v;
        }
        if let Some(v) = layout.node_width {
            cfg.node_width = v;
        }
        if let Some(v) = layout.node_height {
            cfg.node_height = v;
        }
        if let Some(v) = layout.junction_size {
            cfg.junction_size = v;
        }
        if let Some(v) = layout.fallback_spacing_factor {
            cfg.fallback_spacing_factor = v;
        }
    }

    if let Some(label) = parsed.label {
        let cfg = &mut config.label;
        if let Some(v) = label.show_age {
            cfg.show_age = v;
        }
        if let Some(v) = label.date_format {
            cfg.date_format = v;
        }
        if let Some(v) = label.years_suffix {
            cfg.years_suffix = v;
        }
        if let Some(v) = label.months_suffix {
            cfg.months_suffix = v;
        }
    }

    if let Some(render) = parsed.render {
        let cfg = &mut config.render;
        if let Some(v) = render.width {
            cfg.width = v;
        }
        if let Some(v) = render.height {
            cfg.height = v;
        }
        if let Some(v) = render.background {
            cfg.background = v;
        }
        if let Some(v) = render.fit_padding {
            cfg.fit_padding = v;
        }
        if let Some(v) = render.text_max_width {
            cfg.text_max_width = v;
        }
        if let Some(v) = render.label_line_height {
            cfg.label_line_height = v;
        }
    }

    validate_layout(&config.layout)?;
    if !is_valid_date_format(&config.label.date_format) {
        anyhow::bail!(
            "label.dateFormat {:?} is not a valid chrono format",
            config.label.date_format
        );
    }
    Ok(config)
}

fn validate_layout(layout: &LayoutConfig) -> anyhow::Result<()> {
    let spacings = [
        ("rowSpacing", layout.row_spacing),
        ("unitSpacing", layout.unit_spacing),
        ("groupSpacing", layout.group_spacing),
        ("fallbackSpacingFactor", layout.fallback_spacing_factor),
    ];
    for (name, value) in spacings {
        if !value.is_finite() || value < 0.0 {
            anyhow::bail!("layout.{name} must be a finite, non-negative number (got {value})");
        }
    }
    Ok(())
}
