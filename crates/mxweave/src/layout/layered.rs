//! Layered layout engine for graph-shaped diagrams.
//!
//! Nodes are ranked along the flow direction by their longest path from a
//! source, after edges closing a cycle have been set aside. Within a rank,
//! nodes keep input order.

use std::collections::HashMap;

use log::{debug, error};
use petgraph::{algo::toposort, graph::DiGraph};

use mxweave_core::{
    geometry::{Bounds, Point, Size},
    spec::{DiagramSpec, Direction},
};

use crate::{
    config::LayoutConfig,
    error::MxweaveError,
    layout::{EdgeRoute, LayoutResult, NodePlacement, engines::LayoutEngine, sizing::TextMetrics},
};

/// The layered layout engine.
pub struct Engine {
    metrics: TextMetrics,
    layer_pitch: f32,
    slot_pitch: f32,
    layer_gap: f32,
    slot_gap: f32,
    bend_offset: f32,
    margin: f32,
}

impl Engine {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            metrics: TextMetrics::new(config),
            layer_pitch: config.layer_pitch(),
            slot_pitch: config.slot_pitch(),
            layer_gap: config.layer_gap(),
            slot_gap: config.slot_gap(),
            bend_offset: config.bend_offset(),
            margin: config.margin(),
        }
    }

    /// Positions every node: layers advance along the main axis, slots along
    /// the cross axis, and every layer is centered against the widest one.
    ///
    /// Returns node bounds by node index and the main-axis start of each layer.
    fn place(&self, layers: &[Vec<usize>], sizes: &[Size], axes: Axes) -> (Vec<Bounds>, Vec<f32>) {
        let slots: Vec<Vec<f32>> = layers
            .iter()
            .map(|layer| {
                layer
                    .iter()
                    .map(|&node| self.slot_pitch.max(axes.cross(sizes[node]) + self.slot_gap))
                    .collect()
            })
            .collect();
        let widest = slots
            .iter()
            .map(|layer| layer.iter().sum::<f32>())
            .fold(0.0, f32::max);

        let mut bounds = vec![Bounds::default(); sizes.len()];
        let mut layer_starts = Vec::with_capacity(layers.len());
        let mut main = self.margin;
        for (layer, slots) in layers.iter().zip(&slots) {
            let thickness = layer
                .iter()
                .map(|&node| axes.main(sizes[node]))
                .fold(0.0, f32::max);
            let mut cross = self.margin + (widest - slots.iter().sum::<f32>()) / 2.0;

            for (&node, &slot) in layer.iter().zip(slots) {
                let size = sizes[node];
                let top_left = axes.point(
                    main + (thickness - axes.main(size)) / 2.0,
                    cross + (slot - axes.cross(size)) / 2.0,
                );
                bounds[node] = top_left.to_bounds(size);
                cross += slot;
            }

            layer_starts.push(main);
            main += self.layer_pitch.max(thickness + self.layer_gap);
        }
        (bounds, layer_starts)
    }

    fn route(&self, ctx: &RouteContext<'_>, edge: usize) -> EdgeRoute {
        let (source, target) = ctx.edges[edge];
        let back_edge = ctx.back[edge];
        let (source_rank, target_rank) = (ctx.ranks[source], ctx.ranks[target]);
        let axes = ctx.axes;
        let (from, to) = (ctx.bounds[source], ctx.bounds[target]);

        if source == target {
            let cross = axes.cross_max(from) + self.bend_offset;
            let center = axes.main_center(from);
            let quarter = axes.main(from.to_size()) / 4.0;
            return EdgeRoute::orthogonal(vec![
                axes.point(center - quarter, cross),
                axes.point(center + quarter, cross),
            ])
            .with_back_edge(true);
        }

        if source_rank == target_rank {
            // Channel in front of the layer
            let main = ctx.layer_starts[source_rank] - self.bend_offset;
            return EdgeRoute::orthogonal(vec![
                axes.point(main, axes.cross_center(from)),
                axes.point(main, axes.cross_center(to)),
            ])
            .with_back_edge(back_edge);
        }

        if !back_edge && target_rank == source_rank + 1 {
            return EdgeRoute::straight();
        }

        // Channel beyond every node of the spanned layers
        let (low, high) = (
            source_rank.min(target_rank),
            source_rank.max(target_rank),
        );
        let cross = ctx.layers[low..=high]
            .iter()
            .flatten()
            .map(|&node| axes.cross_max(ctx.bounds[node]))
            .fold(f32::MIN, f32::max)
            + self.bend_offset;
        EdgeRoute::orthogonal(vec![
            axes.point(axes.main_center(from), cross),
            axes.point(axes.main_center(to), cross),
        ])
        .with_back_edge(back_edge)
    }
}

impl LayoutEngine for Engine {
    fn calculate(&self, spec: &DiagramSpec) -> Result<LayoutResult, MxweaveError> {
        let edges = resolve_edges(spec)?;
        let node_count = spec.nodes().len();

        let back = break_cycles(node_count, &edges);
        let ranks = rank_nodes(spec, &edges, &back)?;
        let layers = group_layers(&ranks);

        let sizes: Vec<Size> = spec
            .nodes()
            .iter()
            .map(|node| self.metrics.node_size(node))
            .collect();
        let axes = Axes(spec.direction());
        let (bounds, layer_starts) = self.place(&layers, &sizes, axes);

        let ctx = RouteContext {
            axes,
            edges: &edges,
            back: &back,
            ranks: &ranks,
            layers: &layers,
            bounds: &bounds,
            layer_starts: &layer_starts,
        };
        let routes = (0..edges.len()).map(|edge| self.route(&ctx, edge)).collect();

        let mut ordinals = vec![0; node_count];
        for layer in &layers {
            for (ordinal, &node) in layer.iter().enumerate() {
                ordinals[node] = ordinal;
            }
        }
        let placements = spec
            .nodes()
            .iter()
            .enumerate()
            .map(|(idx, node)| {
                (
                    node.id().to_string(),
                    NodePlacement::new(ranks[idx], ordinals[idx], bounds[idx]),
                )
            })
            .collect();

        debug!(
            layers = layers.len(),
            back_edges = back.iter().filter(|&&b| b).count();
            "Layered layout calculated"
        );
        Ok(LayoutResult::new(placements, routes))
    }
}

struct RouteContext<'a> {
    axes: Axes,
    edges: &'a [(usize, usize)],
    back: &'a [bool],
    ranks: &'a [usize],
    layers: &'a [Vec<usize>],
    bounds: &'a [Bounds],
    layer_starts: &'a [f32],
}

/// Maps the flow direction onto x/y: the main axis runs across layers, the
/// cross axis along a layer.
#[derive(Debug, Clone, Copy)]
struct Axes(Direction);

impl Axes {
    fn main(self, size: Size) -> f32 {
        if self.0.is_horizontal() {
            size.width()
        } else {
            size.height()
        }
    }

    fn cross(self, size: Size) -> f32 {
        if self.0.is_horizontal() {
            size.height()
        } else {
            size.width()
        }
    }

    fn point(self, main: f32, cross: f32) -> Point {
        if self.0.is_horizontal() {
            Point::new(main, cross)
        } else {
            Point::new(cross, main)
        }
    }

    fn main_center(self, bounds: Bounds) -> f32 {
        let center = bounds.center();
        if self.0.is_horizontal() {
            center.x()
        } else {
            center.y()
        }
    }

    fn cross_center(self, bounds: Bounds) -> f32 {
        let center = bounds.center();
        if self.0.is_horizontal() {
            center.y()
        } else {
            center.x()
        }
    }

    fn cross_max(self, bounds: Bounds) -> f32 {
        if self.0.is_horizontal() {
            bounds.max_y()
        } else {
            bounds.max_x()
        }
    }
}

/// Edge endpoints as node indices.
pub(super) fn resolve_edges(spec: &DiagramSpec) -> Result<Vec<(usize, usize)>, MxweaveError> {
    let mut index = HashMap::with_capacity(spec.nodes().len());
    for (idx, node) in spec.nodes().iter().enumerate() {
        if index.insert(node.id(), idx).is_some() {
            error!(id = node.id(); "Duplicate node id reached layout");
            return Err(MxweaveError::Layout(format!(
                "duplicate node id `{}`",
                node.id()
            )));
        }
    }

    spec.edges()
        .iter()
        .enumerate()
        .map(|(idx, edge)| {
            let lookup = |id: &str| {
                index.get(id).copied().ok_or_else(|| {
                    error!(edge = idx, id = id; "Edge endpoint missing from layout");
                    MxweaveError::Layout(format!("edge {idx} references unknown node `{id}`"))
                })
            };
            Ok((lookup(edge.source())?, lookup(edge.target())?))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Done,
}

/// Marks the edges that close a cycle.
///
/// Depth-first search from the sources in input order, then from any node not
/// yet visited; an edge whose target is on the current search path (self-loops
/// included) is a back-edge.
fn break_cycles(node_count: usize, edges: &[(usize, usize)]) -> Vec<bool> {
    let mut outgoing = vec![Vec::new(); node_count];
    let mut has_incoming = vec![false; node_count];
    for (idx, &(source, target)) in edges.iter().enumerate() {
        outgoing[source].push(idx);
        if source != target {
            has_incoming[target] = true;
        }
    }

    let mut state = vec![Visit::New; node_count];
    let mut back = vec![false; edges.len()];
    let roots = (0..node_count)
        .filter(|&node| !has_incoming[node])
        .chain(0..node_count);

    for root in roots {
        if state[root] != Visit::New {
            continue;
        }
        state[root] = Visit::Active;
        let mut stack = vec![(root, 0)];

        while let Some((node, next)) = stack.last_mut() {
            let node = *node;
            if let Some(&edge) = outgoing[node].get(*next) {
                *next += 1;
                let target = edges[edge].1;
                match state[target] {
                    Visit::New => {
                        state[target] = Visit::Active;
                        stack.push((target, 0));
                    }
                    Visit::Active => back[edge] = true,
                    Visit::Done => {}
                }
            } else {
                state[node] = Visit::Done;
                stack.pop();
            }
        }
    }
    back
}

/// Longest path from a source over the edges that are not back-edges.
fn rank_nodes(
    spec: &DiagramSpec,
    edges: &[(usize, usize)],
    back: &[bool],
) -> Result<Vec<usize>, MxweaveError> {
    let node_count = spec.nodes().len();
    let mut graph = DiGraph::<(), ()>::with_capacity(node_count, edges.len());
    let indices: Vec<_> = (0..node_count).map(|_| graph.add_node(())).collect();
    for (&(source, target), _) in edges.iter().zip(back).filter(|(_, back)| !**back) {
        graph.add_edge(indices[source], indices[target], ());
    }

    let order = toposort(&graph, None).map_err(|cycle| {
        let id = spec.nodes()[cycle.node_id().index()].id();
        error!(id = id; "Cycle survived back-edge removal");
        MxweaveError::Layout(format!("cycle through `{id}` survived back-edge removal"))
    })?;

    let mut ranks = vec![0; node_count];
    for node in order {
        for next in graph.neighbors(node) {
            ranks[next.index()] = ranks[next.index()].max(ranks[node.index()] + 1);
        }
    }
    Ok(ranks)
}

/// Node indices per rank, in input order.
fn group_layers(ranks: &[usize]) -> Vec<Vec<usize>> {
    let count = ranks.iter().max().map_or(0, |max| max + 1);
    let mut layers = vec![Vec::new(); count];
    for (node, &rank) in ranks.iter().enumerate() {
        layers[rank].push(node);
    }
    layers
}

#[cfg(test)]
mod tests {
    use mxweave_core::spec::{Edge, Mode, Node, NodeKind, RelationKind};

    use super::*;
    use crate::layout::RouteHint;

    pub(super) fn graph(direction: Direction, nodes: &[&str], edges: &[(&str, &str)]) -> DiagramSpec {
        DiagramSpec::new(
            Mode::Generic,
            direction,
            None,
            nodes
                .iter()
                .map(|id| Node::new(*id, *id, NodeKind::Rect))
                .collect(),
            edges
                .iter()
                .map(|(s, t)| Edge::new(*s, *t, RelationKind::Flow))
                .collect(),
        )
    }

    fn layout(spec: &DiagramSpec) -> LayoutResult {
        Engine::new(&LayoutConfig::default()).calculate(spec).unwrap()
    }

    fn rank_and_ordinal(layout: &LayoutResult, id: &str) -> (usize, usize) {
        let placement = layout.placement(id).unwrap();
        (placement.layer(), placement.ordinal())
    }

    #[test]
    fn test_chain_ranks() {
        let spec = graph(Direction::TopDown, &["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let layout = layout(&spec);

        assert_eq!(rank_and_ordinal(&layout, "a"), (0, 0));
        assert_eq!(rank_and_ordinal(&layout, "b"), (1, 0));
        assert_eq!(rank_and_ordinal(&layout, "c"), (2, 0));
        assert!(layout.routes().iter().all(|r| r.hint() == RouteHint::Straight));

        let a = layout.placement("a").unwrap().bounds();
        let b = layout.placement("b").unwrap().bounds();
        assert!(b.min_y() >= a.max_y() + 80.0);
    }

    #[test]
    fn test_cycle_lays_out_with_back_edge() {
        let spec = graph(
            Direction::TopDown,
            &["A", "B", "C"],
            &[("A", "B"), ("B", "C"), ("C", "A")],
        );
        let layout = layout(&spec);

        assert_eq!(rank_and_ordinal(&layout, "A"), (0, 0));
        assert_eq!(rank_and_ordinal(&layout, "C"), (2, 0));

        let back = &layout.routes()[2];
        assert!(back.is_back_edge());
        assert_eq!(back.hint(), RouteHint::Orthogonal);
        assert_eq!(back.waypoints().len(), 2);
        assert!(!layout.routes()[0].is_back_edge());
    }

    #[test]
    fn test_longest_path_and_long_edge_channel() {
        let spec = graph(
            Direction::TopDown,
            &["a", "b", "c"],
            &[("a", "b"), ("b", "c"), ("a", "c")],
        );
        let layout = layout(&spec);
        assert_eq!(rank_and_ordinal(&layout, "c"), (2, 0));

        let long = &layout.routes()[2];
        assert_eq!(long.hint(), RouteHint::Orthogonal);
        let widest = ["a", "b", "c"]
            .iter()
            .map(|id| layout.placement(id).unwrap().bounds().max_x())
            .fold(f32::MIN, f32::max);
        assert!(long.waypoints().iter().all(|p| p.x() > widest));
    }

    #[test]
    fn test_self_loop_beside_node() {
        let spec = graph(Direction::TopDown, &["a"], &[("a", "a")]);
        let layout = layout(&spec);

        let route = &layout.routes()[0];
        let bounds = layout.placement("a").unwrap().bounds();
        assert!(route.is_back_edge());
        assert_eq!(route.hint(), RouteHint::Orthogonal);
        assert_eq!(route.waypoints().len(), 2);
        assert!(route.waypoints().iter().all(|p| p.x() > bounds.max_x()));
    }

    #[test]
    fn test_unconnected_nodes_share_first_layer_in_input_order() {
        let spec = graph(Direction::TopDown, &["z", "y", "x"], &[]);
        let layout = layout(&spec);

        assert_eq!(rank_and_ordinal(&layout, "z"), (0, 0));
        assert_eq!(rank_and_ordinal(&layout, "y"), (0, 1));
        assert_eq!(rank_and_ordinal(&layout, "x"), (0, 2));
    }

    #[test]
    fn test_layers_are_centered() {
        let spec = graph(
            Direction::TopDown,
            &["root", "l", "r"],
            &[("root", "l"), ("root", "r")],
        );
        let layout = layout(&spec);

        let root = layout.placement("root").unwrap().bounds().center();
        let left = layout.placement("l").unwrap().bounds().center();
        let right = layout.placement("r").unwrap().bounds().center();
        assert!((root.x() - left.midpoint(right).x()).abs() < 0.01);
    }

    #[test]
    fn test_left_right_uses_x_for_layers() {
        let spec = graph(Direction::LeftRight, &["a", "b"], &[("a", "b")]);
        let layout = layout(&spec);

        let a = layout.placement("a").unwrap().bounds();
        let b = layout.placement("b").unwrap().bounds();
        assert!(b.min_x() > a.max_x());
        assert!((a.center().y() - b.center().y()).abs() < 0.01);
    }

    #[test]
    fn test_unknown_endpoint_is_layout_error() {
        let spec = graph(Direction::TopDown, &["a"], &[("a", "ghost")]);
        let err = Engine::new(&LayoutConfig::default())
            .calculate(&spec)
            .unwrap_err();
        assert!(matches!(err, MxweaveError::Layout(msg) if msg.contains("ghost")));
    }

    #[test]
    fn test_break_cycles_marks_only_closing_edges() {
        let edges = [(0, 1), (1, 2), (2, 0), (1, 1), (0, 2)];
        assert_eq!(
            break_cycles(3, &edges),
            vec![false, false, true, true, false]
        );
    }
}

#[cfg(test)]
mod proptest_tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::{tests::graph, *};
    use crate::layout::RouteHint;

    fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
        (1usize..12).prop_flat_map(|nodes| {
            (
                Just(nodes),
                prop::collection::vec((0..nodes, 0..nodes), 0..24),
            )
        })
    }

    fn build(direction: Direction, nodes: usize, edges: &[(usize, usize)]) -> DiagramSpec {
        let ids: Vec<String> = (0..nodes).map(|i| format!("n{i}")).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let edge_refs: Vec<(&str, &str)> = edges
            .iter()
            .map(|&(s, t)| (id_refs[s], id_refs[t]))
            .collect();
        graph(direction, &id_refs, &edge_refs)
    }

    /// Every node has one (layer, ordinal); ordinals are 0..n within a layer.
    fn check_layering_totality(spec: &DiagramSpec) -> Result<(), TestCaseError> {
        let layout = Engine::new(&LayoutConfig::default()).calculate(spec).unwrap();
        prop_assert_eq!(layout.placements().count(), spec.nodes().len());
        prop_assert_eq!(layout.routes().len(), spec.edges().len());

        let mut per_layer: HashMap<usize, Vec<usize>> = HashMap::new();
        for node in spec.nodes() {
            let placement = layout.placement(node.id());
            prop_assert!(placement.is_some());
            if let Some(placement) = placement {
                per_layer
                    .entry(placement.layer())
                    .or_default()
                    .push(placement.ordinal());
            }
        }
        for ordinals in per_layer.values_mut() {
            ordinals.sort_unstable();
            let expected: Vec<usize> = (0..ordinals.len()).collect();
            prop_assert_eq!(&*ordinals, &expected[..]);
        }
        Ok(())
    }

    /// Forward edges point to a later layer; everything else is orthogonal.
    fn check_edges_respect_layers(spec: &DiagramSpec) -> Result<(), TestCaseError> {
        let layout = Engine::new(&LayoutConfig::default()).calculate(spec).unwrap();
        for (edge, route) in spec.edges().iter().zip(layout.routes()) {
            let source = layout.placement(edge.source()).unwrap().layer();
            let target = layout.placement(edge.target()).unwrap().layer();
            if route.is_back_edge() {
                prop_assert_eq!(route.hint(), RouteHint::Orthogonal);
            } else {
                prop_assert!(target > source);
            }
            if route.hint() == RouteHint::Straight {
                prop_assert_eq!(target, source + 1);
            }
        }
        Ok(())
    }

    fn check_nodes_do_not_overlap(spec: &DiagramSpec) -> Result<(), TestCaseError> {
        let layout = Engine::new(&LayoutConfig::default()).calculate(spec).unwrap();
        let bounds: Vec<Bounds> = layout.placements().map(|(_, p)| p.bounds()).collect();
        for (i, a) in bounds.iter().enumerate() {
            for b in &bounds[i + 1..] {
                prop_assert!(!a.intersects(b));
            }
        }
        Ok(())
    }

    fn check_deterministic(spec: &DiagramSpec) -> Result<(), TestCaseError> {
        let engine = Engine::new(&LayoutConfig::default());
        let first = engine.calculate(spec).unwrap();
        let second = engine.calculate(spec).unwrap();
        prop_assert_eq!(first, second);
        Ok(())
    }

    proptest! {
        #[test]
        fn layering_totality((nodes, edges) in graph_strategy()) {
            check_layering_totality(&build(Direction::TopDown, nodes, &edges))?;
        }

        #[test]
        fn edges_respect_layers((nodes, edges) in graph_strategy()) {
            check_edges_respect_layers(&build(Direction::TopDown, nodes, &edges))?;
        }

        #[test]
        fn nodes_do_not_overlap(
            (nodes, edges) in graph_strategy(),
            horizontal in any::<bool>(),
        ) {
            let direction = if horizontal { Direction::LeftRight } else { Direction::TopDown };
            check_nodes_do_not_overlap(&build(direction, nodes, &edges))?;
        }

        #[test]
        fn layout_is_deterministic((nodes, edges) in graph_strategy()) {
            check_deterministic(&build(Direction::TopDown, nodes, &edges))?;
        }

        #[test]
        fn distinct_nodes_get_distinct_slots((nodes, edges) in graph_strategy()) {
            let spec = build(Direction::TopDown, nodes, &edges);
            let layout = Engine::new(&LayoutConfig::default()).calculate(&spec).unwrap();
            let slots: HashSet<(usize, usize)> = layout
                .placements()
                .map(|(_, p)| (p.layer(), p.ordinal()))
                .collect();
            prop_assert_eq!(slots.len(), nodes);
        }
    }
}
