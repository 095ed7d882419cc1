use family_tree_layout::dates::parse_birth_date;
use family_tree_layout::layout_dump::layout_to_json;
use family_tree_layout::{RenderOptions, layout_family, parse_family, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FamilyTreeRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    show_age: Option<bool>,
    /// `YYYY-MM-DD`; the host passes its local date since wasm has no clock.
    today: Option<String>,
}

fn build_render_options(options: FamilyTreeRenderOptions) -> Result<RenderOptions, String> {
    let mut render_options = if options.theme.as_deref() == Some("monochrome") {
        RenderOptions::monochrome()
    } else {
        RenderOptions::classic()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    if let Some(width) = options.width {
        render_options.render.width = width;
    }
    if let Some(height) = options.height {
        render_options.render.height = height;
    }
    if let Some(show_age) = options.show_age {
        render_options.label.show_age = show_age;
    }
    if let Some(raw) = options.today {
        let today = parse_birth_date(&raw).ok_or_else(|| format!("today {raw:?} is not a YYYY-MM-DD date"))?;
        render_options.today = Some(today);
    }

    Ok(render_options)
}

fn parse_options(options_json: Option<String>) -> Result<RenderOptions, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<FamilyTreeRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        FamilyTreeRenderOptions::default()
    };
    build_render_options(options).map_err(|error| JsValue::from_str(&error))
}

#[wasm_bindgen]
pub fn render_family_tree_svg(family_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let render_options = parse_options(options_json)?;
    render_with_options(family_json, &render_options).map_err(|error| JsValue::from_str(&error.to_string()))
}

/// Positioned nodes and edges as JSON, for hosts that draw the graph
/// themselves with preset positions.
#[wasm_bindgen]
pub fn layout_family_tree_json(family_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let render_options = parse_options(options_json)?;
    let snapshot = parse_family(family_json).map_err(|error| JsValue::from_str(&error.to_string()))?;
    let layout = layout_family(&snapshot, &render_options).map_err(|error| JsValue::from_str(&error.to_string()))?;
    layout_to_json(&layout).map_err(|error| JsValue::from_str(&error.to_string()))
}

#[cfg(test)]
mod tests {
    use family_tree_layout::render_with_options;

    use crate::{FamilyTreeRenderOptions, build_render_options};

    #[test]
    fn renders_couple_with_child() {
        let family = r#"[
            {"id": 1, "name": "Ann", "birthDate": "1950-01-01", "spouseId": 2, "childrenIds": [3]},
            {"id": 2, "name": "Bob", "birthDate": "1951-01-01", "spouseId": 1, "childrenIds": [3]},
            {"id": 3, "name": "Cid", "birthDate": "1980-01-01", "parentIds": [1, 2]}
        ]"#;

        let options = build_render_options(FamilyTreeRenderOptions::default()).expect("defaults are valid");
        let svg = render_with_options(family, &options).expect("family should render");

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Ann"));
        assert!(svg.contains("class=\"junction\""));
    }

    #[test]
    fn today_option_enables_ages() {
        let options = build_render_options(FamilyTreeRenderOptions {
            show_age: Some(true),
            today: Some("2020-01-01".to_string()),
            ..FamilyTreeRenderOptions::default()
        })
        .expect("valid options");
        assert!(options.label.show_age);
        assert!(options.today.is_some());

        let bad = build_render_options(FamilyTreeRenderOptions {
            today: Some("soon".to_string()),
            ..FamilyTreeRenderOptions::default()
        });
        assert!(bad.is_err());
    }
}
