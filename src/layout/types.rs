use serde::Serialize;

use crate::ir::PersonId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Person,
    Junction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Spouse,
    Parent,
}

/// How node positions were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Ranking {
    /// Generation rows with parent-centred family groups.
    Generational,
    /// Breadth-first levels from the root ancestors.
    BreadthFirst,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    pub fill: String,
    pub border: String,
    /// Palette bucket the fill came from; `None` for default colours.
    pub bucket: Option<usize>,
    pub birthday: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub person_id: Option<PersonId>,
    pub generation: u32,
    pub position: Point,
    pub style: NodeStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub id: String,
    pub kind: EdgeKind,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub ranking: Ranking,
}

impl FamilyGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn junctions(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes
            .iter()
            .filter(|node| node.kind == NodeKind::Junction)
    }

    /// (min x, min y, max x, max y) over node centres.
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let mut iter = self.nodes.iter().map(|node| node.position);
        let first = iter.next()?;
        Some(iter.fold(
            (first.x, first.y, first.x, first.y),
            |(min_x, min_y, max_x, max_y), p| {
                (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
            },
        ))
    }
}

/// Horizontal interval a placed family group occupies on its row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRect {
    pub left: f32,
    pub right: f32,
}

impl PlacementRect {
    pub fn new(left: f32, width: f32) -> Self {
        Self {
            left,
            right: left + width,
        }
    }

    pub fn overlaps(&self, left: f32, width: f32) -> bool {
        left < self.right && left + width > self.left
    }
}

/// A family group whose overlap resolution hit the iteration cap.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedGroup {
    pub generation: u32,
    pub members: Vec<PersonId>,
    pub x: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDiagnostics {
    pub unresolved: Vec<UnresolvedGroup>,
}

impl LayoutDiagnostics {
    /// False when at least one family group was accepted while still
    /// overlapping a neighbour.
    pub fn fully_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FamilyLayout {
    pub graph: FamilyGraph,
    pub diagnostics: LayoutDiagnostics,
}

pub fn person_node_id(id: PersonId) -> String {
    format!("person_{id}")
}

/// Junction ids are keyed by the unordered spouse pair.
pub fn junction_node_id(a: PersonId, b: PersonId) -> String {
    format!("junction_{}_{}", a.min(b), a.max(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn junction_id_ignores_pair_order() {
        assert_eq!(junction_node_id(12, 4), "junction_4_12");
        assert_eq!(junction_node_id(4, 12), "junction_4_12");
    }

    #[test]
    fn touching_rects_do_not_overlap() {
        let rect = PlacementRect::new(0.0, 220.0);
        assert!(!rect.overlaps(220.0, 100.0));
        assert!(!rect.overlaps(-100.0, 100.0));
        assert!(rect.overlaps(219.0, 100.0));
        assert!(rect.overlaps(-50.0, 400.0));
    }
}
