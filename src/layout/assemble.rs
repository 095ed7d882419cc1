use std::collections::HashSet;

use crate::ir::{Person, PersonId};
use crate::theme::Theme;

use super::label::LabelContext;
use super::person_graph::PersonGraph;
use super::types::{
    EdgeKind, FamilyGraph, GraphEdge, GraphNode, NodeKind, NodeStyle, Point, Ranking,
    junction_node_id, person_node_id,
};

/// Emits person nodes, junction nodes and edges in snapshot order. Positions
/// are left at the origin for the placement pass.
pub fn assemble_graph(graph: &PersonGraph<'_>, theme: &Theme, labels: &LabelContext<'_>) -> FamilyGraph {
    let mut assembler = Assembler {
        graph,
        theme,
        labels,
        nodes: Vec::with_capacity(graph.snapshot().len()),
        edges: Vec::new(),
        emitted: HashSet::new(),
        junctions: HashSet::new(),
        edge_ids: HashSet::new(),
    };

    for person in graph.snapshot().people() {
        if assembler.emitted.contains(&person.id) {
            continue;
        }
        let spouse = graph
            .spouse_of(person.id)
            .filter(|spouse| !assembler.emitted.contains(&spouse.id));
        // Couples share the deeper of their two rows.
        let generation = match spouse {
            Some(spouse) => graph.generation(person.id).max(graph.generation(spouse.id)),
            None => graph.generation(person.id),
        };
        assembler.push_person(person, generation);

        if let Some(spouse) = spouse {
            assembler.push_person(spouse, generation);
            assembler.link_spouses(person, spouse, generation);
        }

        assembler.push_child_edges(person);
        if let Some(spouse) = spouse {
            assembler.push_child_edges(spouse);
        }
    }

    FamilyGraph {
        nodes: assembler.nodes,
        edges: assembler.edges,
        ranking: Ranking::Generational,
    }
}

struct Assembler<'g, 'a> {
    graph: &'g PersonGraph<'a>,
    theme: &'g Theme,
    labels: &'g LabelContext<'g>,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    emitted: HashSet<PersonId>,
    junctions: HashSet<String>,
    edge_ids: HashSet<String>,
}

impl Assembler<'_, '_> {
    fn push_person(&mut self, person: &Person, generation: u32) {
        let birthday = self.labels.birthday_today(person);
        let (fill, border) = self.theme.person_colors(generation, birthday);
        self.nodes.push(GraphNode {
            id: person_node_id(person.id),
            kind: NodeKind::Person,
            label: self.labels.label_for(person),
            person_id: Some(person.id),
            generation,
            position: Point::default(),
            style: NodeStyle {
                fill,
                border,
                bucket: self.theme.generation_bucket(generation),
                birthday,
            },
        });
        self.emitted.insert(person.id);
    }

    fn link_spouses(&mut self, person: &Person, spouse: &Person, generation: u32) {
        if !self.graph.shares_child(person.id, spouse.id) {
            let (a, b) = (person.id.min(spouse.id), person.id.max(spouse.id));
            self.push_edge(
                format!("spouse_{a}_{b}"),
                EdgeKind::Spouse,
                person_node_id(a),
                person_node_id(b),
            );
            return;
        }

        let junction_id = junction_node_id(person.id, spouse.id);
        if !self.junctions.insert(junction_id.clone()) {
            return;
        }
        self.nodes.push(GraphNode {
            id: junction_id.clone(),
            kind: NodeKind::Junction,
            label: String::new(),
            person_id: None,
            generation,
            position: Point::default(),
            style: NodeStyle {
                fill: self.theme.junction_color.clone(),
                border: self.theme.junction_color.clone(),
                bucket: None,
                birthday: false,
            },
        });
        for partner in [person.id, spouse.id] {
            self.push_edge(
                format!("spouse_{partner}_{junction_id}"),
                EdgeKind::Spouse,
                person_node_id(partner),
                junction_id.clone(),
            );
        }
    }

    /// A child shared with the spouse hangs off the couple's junction once
    /// it exists; every other child gets a direct edge from this parent.
    fn push_child_edges(&mut self, parent: &Person) {
        for &child in &parent.children_ids {
            if self.graph.lookup(child).is_none() {
                continue;
            }
            let junction = parent
                .spouse_id
                .and_then(|spouse| self.graph.lookup(spouse))
                .filter(|spouse| spouse.has_child(child))
                .map(|spouse| junction_node_id(parent.id, spouse.id))
                .filter(|junction_id| self.junctions.contains(junction_id));
            match junction {
                Some(junction_id) => self.push_edge(
                    format!("parent_{junction_id}_{child}"),
                    EdgeKind::Parent,
                    junction_id,
                    person_node_id(child),
                ),
                None => self.push_edge(
                    format!("parent_{}_{child}", parent.id),
                    EdgeKind::Parent,
                    person_node_id(parent.id),
                    person_node_id(child),
                ),
            }
        }
    }

    fn push_edge(&mut self, id: String, kind: EdgeKind, source: String, target: String) {
        if !self.edge_ids.insert(id.clone()) {
            return;
        }
        self.edges.push(GraphEdge {
            id,
            kind,
            source,
            target,
        });
    }
}
