mod assemble;
mod fallback;
mod family;
mod label;
mod person_graph;
mod placement;
pub(crate) mod types;
pub use assemble::assemble_graph;
pub use fallback::apply_breadth_first_ranking;
pub use family::{FamilyGroup, ParentKey, build_family_groups};
pub use label::LabelContext;
pub use person_graph::PersonGraph;
pub use placement::{place_generations, resolve_overlap};
pub use types::*;

use crate::config::LayoutConfig;
use crate::error::CyclicRelationshipError;
use crate::ir::FamilySnapshot;
use crate::theme::Theme;

/// Runs the full generational pipeline over one snapshot: rank generations,
/// assemble nodes and edges, then place every row.
pub fn compute_layout(
    snapshot: &FamilySnapshot,
    config: &LayoutConfig,
    theme: &Theme,
    labels: &LabelContext<'_>,
) -> Result<FamilyLayout, CyclicRelationshipError> {
    let graph = PersonGraph::build(snapshot)?;
    let mut family = assemble_graph(&graph, theme, labels);
    let diagnostics = place_generations(&graph, &mut family, config);
    Ok(FamilyLayout {
        graph: family,
        diagnostics,
    })
}
