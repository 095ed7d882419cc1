#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dates;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LabelConfig, LayoutConfig, RenderConfig, load_config, parse_config};
pub use error::{CyclicRelationshipError, FamilyTreeError, InputValidationError, RenderBackendError};
pub use ir::{FamilySnapshot, Person, PersonId};
pub use layout::{FamilyGraph, FamilyLayout, LabelContext, Ranking, compute_layout};
pub use parser::parse_family;
pub use render::{RenderBackend, SvgBackend, render_svg};
pub use theme::Theme;

use chrono::NaiveDate;
use layout::apply_breadth_first_ranking;

/// Everything a render needs besides the family itself.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub label: LabelConfig,
    pub render: RenderConfig,
    /// Reference date for ages and birthday highlights. `None` keeps the
    /// output independent of the wall clock.
    pub today: Option<NaiveDate>,
}

impl RenderOptions {
    pub fn classic() -> Self {
        Self::from_config(Config::default(), None)
    }

    pub fn monochrome() -> Self {
        let theme = Theme::monochrome();
        let mut options = Self::classic();
        options.render.background = theme.background.clone();
        options.theme = theme;
        options
    }

    pub fn from_config(config: Config, today: Option<NaiveDate>) -> Self {
        Self {
            theme: config.theme,
            layout: config.layout,
            label: config.label,
            render: config.render,
            today,
        }
    }

    pub fn with_today(mut self, today: Option<NaiveDate>) -> Self {
        self.today = today;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::classic()
    }
}

/// Ranks, assembles and places `snapshot`. Degraded placements are logged
/// and still returned.
pub fn layout_family(
    snapshot: &FamilySnapshot,
    options: &RenderOptions,
) -> Result<FamilyLayout, FamilyTreeError> {
    let labels = LabelContext::new(&options.label, options.today);
    let layout = compute_layout(snapshot, &options.layout, &options.theme, &labels)?;
    if !layout.diagnostics.fully_resolved() {
        for group in &layout.diagnostics.unresolved {
            tracing::warn!(
                generation = group.generation,
                members = ?group.members,
                x = group.x,
                "family group still overlaps a neighbour after the shift limit"
            );
        }
    }
    tracing::debug!(
        people = snapshot.len(),
        nodes = layout.graph.nodes.len(),
        edges = layout.graph.edges.len(),
        "family layout computed"
    );
    Ok(layout)
}

/// Lays out `snapshot` and hands the graph to `backend`.
///
/// If the backend reports that it cannot draw the generational layout, the
/// graph is re-ranked breadth first and rendered once more; a second
/// failure is returned to the caller.
pub fn render_with_backend<B: RenderBackend>(
    snapshot: &FamilySnapshot,
    options: &RenderOptions,
    backend: &mut B,
) -> Result<B::Output, FamilyTreeError> {
    let mut layout = layout_family(snapshot, options)?;
    match backend.render(&layout.graph) {
        Ok(output) => Ok(output),
        Err(RenderBackendError::LayoutModeUnavailable { mode, reason }) => {
            tracing::warn!(?mode, %reason, "falling back to breadth-first ranking");
            apply_breadth_first_ranking(&mut layout.graph, snapshot, &options.layout);
            Ok(backend.render(&layout.graph)?)
        }
        Err(err) => Err(err.into()),
    }
}

/// Parses family JSON and renders it to an SVG string.
pub fn render_with_options(input: &str, options: &RenderOptions) -> Result<String, FamilyTreeError> {
    let snapshot = parse_family(input)?;
    let mut backend = SvgBackend::new(&options.theme, &options.layout, &options.render);
    render_with_backend(&snapshot, options, &mut backend)
}

pub fn render(input: &str) -> Result<String, FamilyTreeError> {
    render_with_options(input, &RenderOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_with_default_options() {
        let svg = render(
            r#"[{"id": 1, "name": "Solo", "birthDate": "1990-06-01"}]"#,
        )
        .expect("render");
        assert!(svg.contains("Solo"));
        assert!(svg.contains("1990-06-01"));
    }

    #[test]
    fn today_controls_age_and_birthday() {
        let input = r#"[{"id": 1, "name": "Solo", "birthDate": "1990-06-01"}]"#;
        let mut options = RenderOptions::default()
            .with_today(NaiveDate::from_ymd_opt(2024, 6, 1));
        options.label.show_age = true;
        let svg = render_with_options(input, &options).expect("render");
        assert!(svg.contains("34y"));
        assert!(svg.contains("person birthday"));
        assert!(svg.contains(&options.theme.birthday_fill));
    }

    #[test]
    fn input_errors_surface_as_validation_errors() {
        let err = render("{\"not\": \"a list\"}").unwrap_err();
        assert!(matches!(err, FamilyTreeError::InputValidation(_)));
    }
}
