use crate::ir::PersonId;
use crate::layout::{FamilyLayout, UnresolvedGroup};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub ranking: String,
    pub fully_resolved: bool,
    pub unresolved: Vec<UnresolvedGroup>,
    /// Node centres as (min x, min y, max x, max y).
    pub bounds: Option<[f32; 4]>,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub kind: String,
    pub person_id: Option<PersonId>,
    pub generation: u32,
    pub x: f32,
    pub y: f32,
    pub label_lines: Vec<String>,
    pub fill: String,
    pub border: String,
    pub birthday: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub id: String,
    pub kind: String,
    pub source: String,
    pub target: String,
}

impl LayoutDump {
    pub fn from_layout(layout: &FamilyLayout) -> Self {
        let graph = &layout.graph;
        let nodes = graph
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                kind: format!("{:?}", node.kind),
                person_id: node.person_id,
                generation: node.generation,
                x: node.position.x,
                y: node.position.y,
                label_lines: if node.label.is_empty() {
                    Vec::new()
                } else {
                    node.label.lines().map(str::to_string).collect()
                },
                fill: node.style.fill.clone(),
                border: node.style.border.clone(),
                birthday: node.style.birthday,
            })
            .collect();

        let edges = graph
            .edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                kind: format!("{:?}", edge.kind),
                source: edge.source.clone(),
                target: edge.target.clone(),
            })
            .collect();

        LayoutDump {
            ranking: format!("{:?}", graph.ranking),
            fully_resolved: layout.diagnostics.fully_resolved(),
            unresolved: layout.diagnostics.unresolved.clone(),
            bounds: graph
                .bounds()
                .map(|(min_x, min_y, max_x, max_y)| [min_x, min_y, max_x, max_y]),
            nodes,
            edges,
        }
    }
}

pub fn layout_to_json(layout: &FamilyLayout) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&LayoutDump::from_layout(layout))
}

/// Writes the dump to `path`, or to stdout when no path is given.
pub fn write_layout_dump(path: Option<&Path>, layout: &FamilyLayout) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &dump)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}
