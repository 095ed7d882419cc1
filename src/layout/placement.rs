use std::collections::{BTreeMap, HashMap};

use crate::config::LayoutConfig;
use crate::ir::PersonId;

use super::family::{FamilyGroup, ParentKey, build_family_groups};
use super::person_graph::PersonGraph;
use super::types::{
    FamilyGraph, LayoutDiagnostics, NodeKind, PlacementRect, Point, UnresolvedGroup,
    junction_node_id, person_node_id,
};

/// Writes generation-row positions into every node of `family`.
///
/// Rows are placed top to bottom. Generation 1 is centred on x = 0; every
/// later row centres each family group under its parent (junction or single
/// parent) and shifts it sideways until it clears the groups already placed
/// on that row, giving up after `max_shift_iterations` rounds.
pub fn place_generations(
    graph: &PersonGraph<'_>,
    family: &mut FamilyGraph,
    config: &LayoutConfig,
) -> LayoutDiagnostics {
    let mut rows: BTreeMap<u32, Vec<PersonId>> = BTreeMap::new();
    let mut node_index: HashMap<String, usize> = HashMap::with_capacity(family.nodes.len());
    for (idx, node) in family.nodes.iter().enumerate() {
        node_index.insert(node.id.clone(), idx);
        if node.kind == NodeKind::Person
            && let Some(person_id) = node.person_id
        {
            rows.entry(node.generation).or_default().push(person_id);
        }
    }

    let mut placer = Placer {
        graph,
        config,
        family,
        node_index,
        placed_x: HashMap::new(),
        diagnostics: LayoutDiagnostics::default(),
    };
    for (generation, mut row) in rows {
        // Id order makes grouping independent of input order.
        row.sort_unstable();
        let groups = build_family_groups(graph, &row);
        if generation == 1 {
            placer.place_root_row(&groups);
        } else {
            placer.place_descendant_row(generation, groups);
        }
    }
    placer.diagnostics
}

struct Placer<'p, 'a> {
    graph: &'p PersonGraph<'a>,
    config: &'p LayoutConfig,
    family: &'p mut FamilyGraph,
    node_index: HashMap<String, usize>,
    /// x of every node placed so far, keyed by node id.
    placed_x: HashMap<String, f32>,
    diagnostics: LayoutDiagnostics,
}

impl Placer<'_, '_> {
    fn row_y(&self, generation: u32) -> f32 {
        self.config.top_offset + generation.saturating_sub(1) as f32 * self.config.row_spacing
    }

    fn group_width(&self, group: &FamilyGroup) -> f32 {
        group.len() as f32 * self.config.unit_spacing
    }

    fn place_root_row(&mut self, groups: &[FamilyGroup]) {
        let total_width: f32 = groups.iter().map(|g| self.group_width(g)).sum::<f32>()
            + groups.len().saturating_sub(1) as f32 * self.config.group_spacing;
        let mut cursor = -total_width / 2.0;
        for group in groups {
            self.commit_group(group, cursor, 1);
            cursor += self.group_width(group) + self.config.group_spacing;
        }
    }

    fn place_descendant_row(&mut self, generation: u32, groups: Vec<FamilyGroup>) {
        let mut by_parent: BTreeMap<ParentKey, Vec<FamilyGroup>> = BTreeMap::new();
        for group in groups {
            by_parent
                .entry(group.parent_key(self.graph))
                .or_default()
                .push(group);
        }

        let unit = self.config.unit_spacing;
        let mut placed: Vec<PlacementRect> = Vec::new();
        for (key, mut siblings) in by_parent {
            siblings.sort_by_key(FamilyGroup::min_member);
            let anchor_x = self.anchor_x(key);

            let mut cursor = if siblings.len() == 1 {
                anchor_x - self.group_width(&siblings[0]) / 2.0 + unit / 2.0
            } else {
                let block_width: f32 = siblings.iter().map(|g| self.group_width(g)).sum::<f32>()
                    + (siblings.len() - 1) as f32 * self.config.group_spacing;
                anchor_x - block_width / 2.0 + unit / 2.0
            };

            for group in &siblings {
                let width = self.group_width(group);
                let ideal_x = anchor_x - width / 2.0 + unit / 2.0;
                let (x, resolved) = resolve_overlap(cursor, ideal_x, width, anchor_x, &placed, self.config);
                if !resolved {
                    self.diagnostics.unresolved.push(UnresolvedGroup {
                        generation,
                        members: group.members.clone(),
                        x,
                    });
                }
                self.commit_group(group, x, generation);
                placed.push(PlacementRect::new(x, width));
                cursor = x + width + self.config.group_spacing;
            }
        }
    }

    /// Horizontal centre a family group hangs under.
    fn anchor_x(&self, key: ParentKey) -> f32 {
        match key {
            ParentKey::Root => 0.0,
            ParentKey::Single(parent) => self.person_x(parent).unwrap_or(0.0),
            ParentKey::Couple(a, b) => {
                if let Some(x) = self.placed_x.get(&junction_node_id(a, b)) {
                    return *x;
                }
                // Parents that never got a junction: centre between them.
                match (self.person_x(a), self.person_x(b)) {
                    (Some(xa), Some(xb)) => (xa + xb) / 2.0,
                    (Some(x), None) | (None, Some(x)) => x,
                    (None, None) => 0.0,
                }
            }
        }
    }

    fn person_x(&self, id: PersonId) -> Option<f32> {
        self.placed_x.get(&person_node_id(id)).copied()
    }

    fn commit_group(&mut self, group: &FamilyGroup, left: f32, generation: u32) {
        let y = self.row_y(generation);
        for (idx, member) in group.members.iter().enumerate() {
            let x = left + idx as f32 * self.config.unit_spacing;
            self.set_position(&person_node_id(*member), Point { x, y });
        }
        for (a, b) in group.spouse_pairs(self.graph) {
            self.place_junction(a, b);
        }
    }

    /// Centres the couple's junction, if it has one, between the partners.
    fn place_junction(&mut self, a: PersonId, b: PersonId) {
        let junction_id = junction_node_id(a, b);
        let Some(&idx) = self.node_index.get(&junction_id) else {
            return;
        };
        let (Some(xa), Some(xb)) = (self.person_x(a), self.person_x(b)) else {
            return;
        };
        let y = self.row_y(self.family.nodes[idx].generation);
        self.set_position(&junction_id, Point { x: (xa + xb) / 2.0, y });
    }

    fn set_position(&mut self, node_id: &str, position: Point) {
        let Some(&idx) = self.node_index.get(node_id) else {
            return;
        };
        self.family.nodes[idx].position = position;
        self.placed_x.insert(node_id.to_string(), position.x);
    }
}

/// Shifts a candidate interval of `width` off the already placed rectangles.
///
/// Each round jumps just past the first conflicting rectangle, to whichever
/// side lands nearer `ideal_x`. Ties break away from the centre line: left
/// for anchors left of x = 0, right otherwise. A side that was already
/// tried is skipped in favour of the other one. Once both sides of a hit
/// have been tried the group is cycling, and it goes straight to the
/// nearest free slot instead. Returns the final x and whether it is overlap
/// free; after `max_shift_iterations` rounds the last candidate is returned
/// as is.
pub fn resolve_overlap(
    candidate_x: f32,
    ideal_x: f32,
    width: f32,
    anchor_x: f32,
    placed: &[PlacementRect],
    config: &LayoutConfig,
) -> (f32, bool) {
    let gap = config.group_spacing;
    let mut x = candidate_x;
    let mut tried: Vec<u32> = vec![x.to_bits()];
    for _ in 0..config.max_shift_iterations {
        let Some(hit) = placed.iter().find(|rect| rect.overlaps(x, width)) else {
            return (x, true);
        };
        let (preferred, other) =
            order_by_preference(hit.right + gap, hit.left - gap - width, ideal_x, anchor_x);
        x = match (tried.contains(&preferred.to_bits()), tried.contains(&other.to_bits())) {
            (false, _) => preferred,
            (true, false) => other,
            (true, true) => return (nearest_free_slot(ideal_x, width, anchor_x, placed, gap), true),
        };
        tried.push(x.to_bits());
    }
    let resolved = !placed.iter().any(|rect| rect.overlaps(x, width));
    (x, resolved)
}

/// Orders two candidate x values by distance to `ideal_x`, breaking ties
/// left for anchors left of the centre line and right otherwise.
fn order_by_preference(a: f32, b: f32, ideal_x: f32, anchor_x: f32) -> (f32, f32) {
    let (left, right) = if a <= b { (a, b) } else { (b, a) };
    let dist_left = (left - ideal_x).abs();
    let dist_right = (right - ideal_x).abs();
    let prefer_left = if anchor_x < 0.0 {
        dist_left <= dist_right
    } else {
        dist_left < dist_right
    };
    if prefer_left { (left, right) } else { (right, left) }
}

/// Nearest x to `ideal_x` whose interval keeps `gap` clear of every placed
/// rectangle. Only `ideal_x` and the slots flush against a rectangle edge
/// can be nearest; the slot left of the leftmost rectangle always fits.
fn nearest_free_slot(
    ideal_x: f32,
    width: f32,
    anchor_x: f32,
    placed: &[PlacementRect],
    gap: f32,
) -> f32 {
    let clear = |x: f32| !placed.iter().any(|rect| rect.overlaps(x - gap, width + 2.0 * gap));
    let edges = placed
        .iter()
        .flat_map(|rect| [rect.left - gap - width, rect.right + gap]);
    std::iter::once(ideal_x)
        .chain(edges)
        .filter(|x| clear(*x))
        .reduce(|best, x| order_by_preference(best, x, ideal_x, anchor_x).0)
        .unwrap_or(ideal_x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LayoutConfig {
        LayoutConfig::default()
    }

    #[test]
    fn free_candidate_is_kept() {
        let placed = [PlacementRect::new(-500.0, 220.0)];
        assert_eq!(resolve_overlap(0.0, 0.0, 440.0, 0.0, &placed, &config()), (0.0, true));
    }

    #[test]
    fn shifts_to_nearer_side() {
        // Occupied [0, 440]; a 220 wide group ideally at 300 moves right.
        let placed = [PlacementRect::new(0.0, 440.0)];
        let (x, resolved) = resolve_overlap(300.0, 300.0, 220.0, 410.0, &placed, &config());
        assert!(resolved);
        assert_eq!(x, 490.0);
        // Ideally at 50 it is nearer the left edge.
        let (x, _) = resolve_overlap(50.0, 50.0, 220.0, 160.0, &placed, &config());
        assert_eq!(x, -270.0);
    }

    #[test]
    fn ties_break_away_from_centre() {
        // Occupied [-110, 110]; ideal -55 puts both exits 215 away.
        let placed = [PlacementRect::new(-110.0, 220.0)];
        let tie_x = -55.0;
        let (x, _) = resolve_overlap(tie_x, tie_x, 110.0, -10.0, &placed, &config());
        assert_eq!(x, -270.0);
        let (x, _) = resolve_overlap(tie_x, tie_x, 110.0, 10.0, &placed, &config());
        assert_eq!(x, 160.0);
        let (x, _) = resolve_overlap(tie_x, tie_x, 110.0, 0.0, &placed, &config());
        assert_eq!(x, 160.0);
    }

    #[test]
    fn squeezed_group_does_not_bounce_between_neighbours() {
        // Free gap between the two rects is too small for a 440 wide group.
        let placed = [
            PlacementRect::new(-435.0, 1320.0),
            PlacementRect::new(-1805.0, 1320.0),
        ];
        let (x, resolved) = resolve_overlap(-435.0, -355.0, 440.0, -245.0, &placed, &config());
        assert!(resolved);
        assert_eq!(x, -2295.0);
    }

    #[test]
    fn cycling_group_jumps_to_nearest_free_slot() {
        // Every gap is narrower than 440 + 2 * 50; the walk revisits both
        // exits of [-110, 770] before giving up on local shifts.
        let placed = [
            PlacementRect::new(-1200.0, 220.0),
            PlacementRect::new(-870.0, 440.0),
            PlacementRect::new(-380.0, 220.0),
            PlacementRect::new(-110.0, 880.0),
            PlacementRect::new(905.0, 660.0),
            PlacementRect::new(1615.0, 440.0),
        ];
        let (x, resolved) = resolve_overlap(820.0, 0.0, 440.0, 110.0, &placed, &config());
        assert!(resolved);
        assert_eq!(x, -1690.0);
        assert!(!placed.iter().any(|rect| rect.overlaps(x, 440.0)));
    }

    #[test]
    fn free_slot_ties_follow_anchor_side() {
        // Free slots start at -320 and 100; both are 210 away from -110.
        let placed = [PlacementRect::new(-50.0, 100.0)];
        assert_eq!(nearest_free_slot(0.0, 220.0, 10.0, &placed, 50.0), 100.0);
        assert_eq!(nearest_free_slot(-110.0, 220.0, -10.0, &placed, 50.0), -320.0);
        assert_eq!(nearest_free_slot(-110.0, 220.0, 10.0, &placed, 50.0), 100.0);
    }

    #[test]
    fn exhausted_cap_reports_degraded_result() {
        let placed = [PlacementRect::new(0.0, 440.0)];
        let capped = LayoutConfig {
            max_shift_iterations: 0,
            ..config()
        };
        let (x, resolved) = resolve_overlap(100.0, 100.0, 220.0, 210.0, &placed, &capped);
        assert_eq!(x, 100.0);
        assert!(!resolved);
    }
}
