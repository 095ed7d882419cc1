use std::collections::{HashMap, VecDeque};

use crate::config::LayoutConfig;
use crate::ir::FamilySnapshot;

use super::types::{FamilyGraph, NodeKind, Point, Ranking};

/// Re-ranks `family` breadth first from the root ancestors.
///
/// Roots are person nodes whose record lists no parents, in node order.
/// Levels come from first discovery along edge direction; anything the
/// roots cannot reach seeds another pass. Each level is centred on x = 0.
pub fn apply_breadth_first_ranking(
    family: &mut FamilyGraph,
    snapshot: &FamilySnapshot,
    config: &LayoutConfig,
) {
    let index: HashMap<&str, usize> = family
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.as_str(), idx))
        .collect();
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); family.nodes.len()];
    for edge in &family.edges {
        if let (Some(&from), Some(&to)) = (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
            outgoing[from].push(to);
        }
    }

    let roots: Vec<usize> = family
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| {
            node.kind == NodeKind::Person
                && node
                    .person_id
                    .and_then(|id| snapshot.get(id))
                    .is_some_and(|person| !person.has_parents())
        })
        .map(|(idx, _)| idx)
        .collect();

    let mut depth: Vec<Option<usize>> = vec![None; family.nodes.len()];
    let mut levels: Vec<Vec<usize>> = Vec::new();
    let seeds = roots.into_iter().chain(0..family.nodes.len());
    for seed in seeds {
        if depth[seed].is_some() {
            continue;
        }
        depth[seed] = Some(0);
        let mut queue = VecDeque::from([seed]);
        while let Some(current) = queue.pop_front() {
            let level = depth[current].unwrap_or(0);
            if levels.len() <= level {
                levels.resize_with(level + 1, Vec::new);
            }
            levels[level].push(current);
            for &next in &outgoing[current] {
                if depth[next].is_none() {
                    depth[next] = Some(level + 1);
                    queue.push_back(next);
                }
            }
        }
    }

    let spacing_x = config.unit_spacing * config.fallback_spacing_factor;
    let spacing_y = config.row_spacing * config.fallback_spacing_factor;
    for (level, members) in levels.iter().enumerate() {
        let y = config.top_offset + level as f32 * spacing_y;
        let half_span = (members.len() as f32 - 1.0) / 2.0;
        for (slot, &idx) in members.iter().enumerate() {
            family.nodes[idx].position = Point {
                x: (slot as f32 - half_span) * spacing_x,
                y,
            };
        }
    }
    family.ranking = Ranking::BreadthFirst;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelConfig;
    use crate::layout::{LabelContext, compute_layout};
    use crate::parser::parse_family;
    use crate::theme::Theme;

    #[test]
    fn levels_follow_edges_from_roots() {
        let snapshot = parse_family(
            r#"[
                {"id": 3, "name": "Kid", "birthDate": "2001-01-01", "parentIds": [1, 2]},
                {"id": 1, "name": "Ann", "birthDate": "1970-01-01", "spouseId": 2, "childrenIds": [3]},
                {"id": 2, "name": "Bob", "birthDate": "1969-01-01", "spouseId": 1, "childrenIds": [3]}
            ]"#,
        )
        .expect("input");
        let config = LayoutConfig::default();
        let labels = LabelConfig::default();
        let mut layout = compute_layout(
            &snapshot,
            &config,
            &Theme::classic(),
            &LabelContext::new(&labels, None),
        )
        .expect("layout");
        apply_breadth_first_ranking(&mut layout.graph, &snapshot, &config);

        let graph = &layout.graph;
        assert_eq!(graph.ranking, Ranking::BreadthFirst);
        let y = |id: &str| graph.node(id).map(|n| n.position.y).unwrap_or(f32::NAN);
        assert_eq!(y("person_1"), 100.0);
        assert_eq!(y("person_2"), 100.0);
        assert_eq!(y("junction_1_2"), 400.0);
        assert_eq!(y("person_3"), 700.0);
        let x1 = graph.node("person_1").map(|n| n.position.x).unwrap_or_default();
        let x2 = graph.node("person_2").map(|n| n.position.x).unwrap_or_default();
        assert_eq!(x1, -165.0);
        assert_eq!(x2, 165.0);
    }
}
