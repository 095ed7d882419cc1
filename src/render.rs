use crate::config::{LayoutConfig, RenderConfig};
use crate::error::RenderBackendError;
use crate::layout::{EdgeKind, FamilyGraph, GraphNode, NodeKind};
use crate::text_metrics::wrap_text;
use crate::theme::Theme;
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

/// Anything that can turn a positioned family graph into output.
///
/// A backend that cannot draw the graph's [`crate::layout::Ranking`] returns
/// [`RenderBackendError::LayoutModeUnavailable`]; the pipeline then re-ranks
/// breadth first and tries once more.
pub trait RenderBackend {
    type Output;

    fn render(&mut self, graph: &FamilyGraph) -> Result<Self::Output, RenderBackendError>;
}

/// Produces a standalone SVG document.
#[derive(Debug, Clone)]
pub struct SvgBackend<'a> {
    pub theme: &'a Theme,
    pub layout: &'a LayoutConfig,
    pub render: &'a RenderConfig,
}

impl<'a> SvgBackend<'a> {
    pub fn new(theme: &'a Theme, layout: &'a LayoutConfig, render: &'a RenderConfig) -> Self {
        Self {
            theme,
            layout,
            render,
        }
    }
}

impl RenderBackend for SvgBackend<'_> {
    type Output = String;

    fn render(&mut self, graph: &FamilyGraph) -> Result<String, RenderBackendError> {
        if let Some(node) = graph
            .nodes
            .iter()
            .find(|node| !node.position.x.is_finite() || !node.position.y.is_finite())
        {
            return Err(RenderBackendError::LayoutModeUnavailable {
                mode: graph.ranking,
                reason: format!("node {} has no finite position", node.id),
            });
        }
        if self.render.width <= 0.0 || self.render.height <= 0.0 {
            return Err(RenderBackendError::Svg(format!(
                "viewport {}x{} is empty",
                self.render.width, self.render.height
            )));
        }
        Ok(render_svg(graph, self.theme, self.layout, self.render))
    }
}

/// Draws edges first, then person boxes and junction dots, and fits the
/// viewBox around everything with `fit_padding` on each side.
pub fn render_svg(
    graph: &FamilyGraph,
    theme: &Theme,
    layout: &LayoutConfig,
    render: &RenderConfig,
) -> String {
    let mut svg = String::new();
    let (vb_x, vb_y, vb_w, vb_h) = fitted_view_box(graph, layout, render);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"{vb_x:.2} {vb_y:.2} {vb_w:.2} {vb_h:.2}\">",
        render.width, render.height,
    ));
    svg.push_str(&format!(
        "<rect x=\"{vb_x:.2}\" y=\"{vb_y:.2}\" width=\"{vb_w:.2}\" height=\"{vb_h:.2}\" fill=\"{}\"/>",
        render.background
    ));

    let positions: HashMap<&str, &GraphNode> = graph
        .nodes
        .iter()
        .map(|node| (node.id.as_str(), node))
        .collect();

    for edge in &graph.edges {
        let (Some(from), Some(to)) = (
            positions.get(edge.source.as_str()),
            positions.get(edge.target.as_str()),
        ) else {
            continue;
        };
        let (class, stroke) = match edge.kind {
            EdgeKind::Spouse => ("spouse", &theme.spouse_edge_color),
            EdgeKind::Parent => ("parent", &theme.parent_edge_color),
        };
        svg.push_str(&format!(
            "<line class=\"edge {class}\" data-id=\"{}\" x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{stroke}\" stroke-width=\"{}\"/>",
            escape_xml(&edge.id),
            from.position.x,
            from.position.y,
            to.position.x,
            to.position.y,
            theme.edge_width,
        ));
    }

    for node in &graph.nodes {
        match node.kind {
            NodeKind::Person => svg.push_str(&person_svg(node, theme, layout, render)),
            NodeKind::Junction => {
                svg.push_str(&format!(
                    "<circle class=\"junction\" data-id=\"{}\" cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"/>",
                    escape_xml(&node.id),
                    node.position.x,
                    node.position.y,
                    layout.junction_size / 2.0,
                    node.style.fill,
                ));
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

fn fitted_view_box(
    graph: &FamilyGraph,
    layout: &LayoutConfig,
    render: &RenderConfig,
) -> (f32, f32, f32, f32) {
    let mut extent: Option<(f32, f32, f32, f32)> = None;
    for node in &graph.nodes {
        let (half_w, half_h) = match node.kind {
            NodeKind::Person => (layout.node_width / 2.0, layout.node_height / 2.0),
            NodeKind::Junction => (layout.junction_size / 2.0, layout.junction_size / 2.0),
        };
        let (x, y) = (node.position.x, node.position.y);
        let bounds = (x - half_w, y - half_h, x + half_w, y + half_h);
        extent = Some(match extent {
            None => bounds,
            Some((min_x, min_y, max_x, max_y)) => (
                min_x.min(bounds.0),
                min_y.min(bounds.1),
                max_x.max(bounds.2),
                max_y.max(bounds.3),
            ),
        });
    }
    match extent {
        Some((min_x, min_y, max_x, max_y)) => {
            let pad = render.fit_padding;
            (
                min_x - pad,
                min_y - pad,
                max_x - min_x + pad * 2.0,
                max_y - min_y + pad * 2.0,
            )
        }
        None => (0.0, 0.0, render.width.max(1.0), render.height.max(1.0)),
    }
}

fn person_svg(node: &GraphNode, theme: &Theme, layout: &LayoutConfig, render: &RenderConfig) -> String {
    let x = node.position.x - layout.node_width / 2.0;
    let y = node.position.y - layout.node_height / 2.0;
    let class = if node.style.birthday { "person birthday" } else { "person" };
    let mut out = format!("<g class=\"{class}\" data-id=\"{}\">", escape_xml(&node.id));
    out.push_str(&format!(
        "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"10\" ry=\"10\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
        layout.node_width,
        layout.node_height,
        node.style.fill,
        node.style.border,
        theme.border_width,
    ));
    let lines = wrap_text(
        &node.label,
        render.text_max_width,
        theme.font_size,
        &theme.font_family,
    );
    out.push_str(&text_block_svg(
        node.position.x,
        node.position.y,
        &lines,
        theme,
        render.label_line_height,
    ));
    out.push_str("</g>");
    out
}

fn text_block_svg(x: f32, y: f32, lines: &[String], theme: &Theme, line_height: f32) -> String {
    let step = theme.font_size * line_height;
    let total_height = lines.len() as f32 * step;
    let start_y = y - total_height / 2.0 + theme.font_size;
    let mut text = format!(
        "<text x=\"{x:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.text_color
    );
    for (idx, line) in lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { step };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

/// Rasterizes an SVG document at the configured viewport size.
#[cfg(feature = "png")]
pub fn render_png(svg: &str, render_cfg: &RenderConfig, theme: &Theme) -> Result<Vec<u8>, RenderBackendError> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches('"').trim_matches('\'').to_string())
        .unwrap_or_default();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|err| RenderBackendError::Svg(err.to_string()))?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| RenderBackendError::Png("failed to allocate pixmap".to_string()))?;
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap.as_mut());
    pixmap
        .encode_png()
        .map_err(|err| RenderBackendError::Png(err.to_string()))
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let bytes = render_png(svg, render_cfg, theme)?;
    std::fs::write(output, bytes)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig, _theme: &Theme) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
