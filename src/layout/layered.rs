//! Layered placement for the tree strategies.
//!
//! Classic Sugiyama pipeline:
//! 1. Break cycles by reversing DFS back edges
//! 2. Rank by longest path from the sources
//! 3. Split edges that span several ranks with virtual vertices
//! 4. Order each rank with barycenter sweeps, keeping the ordering with the
//!    fewest crossings
//! 5. Place vertices at their neighbors' barycenter, pushed apart so that
//!    fixed-size node boxes never overlap

use std::collections::{HashMap, VecDeque};

use crate::topology::{Asset, VisibleEdge};

use super::{LayoutError, Placement, Point, Side};

/// Footprint every node gets, regardless of its content.
pub const NODE_WIDTH: f64 = 250.0;
pub const NODE_HEIGHT: f64 = 80.0;

const NODE_SEPARATION: f64 = 50.0;
const EDGE_SEPARATION: f64 = 20.0;
const RANK_SEPARATION: f64 = 50.0;

const ORDER_SWEEPS: usize = 8;
const ALIGN_PASSES: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Orientation {
    TopToBottom,
    LeftToRight,
}

impl Orientation {
    fn rank_extent(self) -> f64 {
        match self {
            Self::TopToBottom => NODE_HEIGHT,
            Self::LeftToRight => NODE_WIDTH,
        }
    }

    fn cross_extent(self) -> f64 {
        match self {
            Self::TopToBottom => NODE_WIDTH,
            Self::LeftToRight => NODE_HEIGHT,
        }
    }

    fn anchors(self) -> (Side, Side) {
        match self {
            Self::TopToBottom => (Side::Top, Side::Bottom),
            Self::LeftToRight => (Side::Left, Side::Right),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Done,
}

/// Returns the links with every DFS back edge reversed, sorted and deduplicated.
fn break_cycles(count: usize, links: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut outgoing = vec![Vec::new(); count];
    for (link_index, &(source, target)) in links.iter().enumerate() {
        outgoing[source].push((target, link_index));
    }

    let mut state = vec![Visit::New; count];
    let mut reversed = vec![false; links.len()];

    for start in 0..count {
        if state[start] != Visit::New {
            continue;
        }

        state[start] = Visit::Active;
        let mut stack = vec![(start, 0usize)];

        while let Some(frame) = stack.last_mut() {
            let (node, cursor) = *frame;
            if let Some(&(target, link_index)) = outgoing[node].get(cursor) {
                frame.1 += 1;
                match state[target] {
                    Visit::New => {
                        state[target] = Visit::Active;
                        stack.push((target, 0));
                    }
                    Visit::Active => reversed[link_index] = true,
                    Visit::Done => {}
                }
            } else {
                state[node] = Visit::Done;
                stack.pop();
            }
        }
    }

    let mut acyclic = links
        .iter()
        .zip(reversed)
        .map(|(&(source, target), flip)| if flip { (target, source) } else { (source, target) })
        .collect::<Vec<_>>();
    acyclic.sort_unstable();
    acyclic.dedup();
    acyclic
}

fn longest_path_ranks(count: usize, links: &[(usize, usize)]) -> Vec<usize> {
    let mut successors = vec![Vec::new(); count];
    let mut indegree = vec![0usize; count];
    for &(source, target) in links {
        successors[source].push(target);
        indegree[target] += 1;
    }

    let mut ranks = vec![0usize; count];
    let mut queue = (0..count)
        .filter(|&node| indegree[node] == 0)
        .collect::<VecDeque<_>>();

    while let Some(node) = queue.pop_front() {
        for &next in &successors[node] {
            ranks[next] = ranks[next].max(ranks[node] + 1);
            indegree[next] -= 1;
            if indegree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    ranks
}

/// Ranked vertices where every edge joins adjacent ranks. Vertices past the
/// real node count are virtual bends of long edges.
struct RankedGraph {
    rank: Vec<usize>,
    is_virtual: Vec<bool>,
    upper: Vec<Vec<usize>>,
    lower: Vec<Vec<usize>>,
}

impl RankedGraph {
    fn build(links: &[(usize, usize)], ranks: &[usize]) -> Self {
        let count = ranks.len();
        let mut graph = Self {
            rank: ranks.to_vec(),
            is_virtual: vec![false; count],
            upper: vec![Vec::new(); count],
            lower: vec![Vec::new(); count],
        };

        for &(source, target) in links {
            let mut previous = source;
            for rank in ranks[source] + 1..ranks[target] {
                let bend = graph.push_virtual(rank);
                graph.connect(previous, bend);
                previous = bend;
            }
            graph.connect(previous, target);
        }

        graph
    }

    fn len(&self) -> usize {
        self.rank.len()
    }

    fn push_virtual(&mut self, rank: usize) -> usize {
        self.rank.push(rank);
        self.is_virtual.push(true);
        self.upper.push(Vec::new());
        self.lower.push(Vec::new());
        self.rank.len() - 1
    }

    fn connect(&mut self, upper: usize, lower: usize) {
        self.lower[upper].push(lower);
        self.upper[lower].push(upper);
    }

    fn layers(&self) -> Vec<Vec<usize>> {
        let depth = self.rank.iter().max().map_or(0, |rank| rank + 1);
        let mut layers = vec![Vec::new(); depth];
        for (vertex, &rank) in self.rank.iter().enumerate() {
            layers[rank].push(vertex);
        }
        layers
    }

    fn half_extent(&self, vertex: usize, orientation: Orientation) -> f64 {
        if self.is_virtual[vertex] {
            0.0
        } else {
            orientation.cross_extent() / 2.0
        }
    }

    fn half_separation(&self, vertex: usize) -> f64 {
        if self.is_virtual[vertex] {
            EDGE_SEPARATION / 2.0
        } else {
            NODE_SEPARATION / 2.0
        }
    }

    /// Minimum center distance between two neighbors in the same rank.
    fn gap(&self, left: usize, right: usize, orientation: Orientation) -> f64 {
        self.half_extent(left, orientation)
            + self.half_extent(right, orientation)
            + self.half_separation(left)
            + self.half_separation(right)
    }
}

fn crossings_between(graph: &RankedGraph, upper_layer: &[usize], lower_layer: &[usize]) -> usize {
    let lower_position = lower_layer
        .iter()
        .enumerate()
        .map(|(position, &vertex)| (vertex, position))
        .collect::<HashMap<_, _>>();

    let mut segments = Vec::new();
    for (upper_position, &vertex) in upper_layer.iter().enumerate() {
        for next in &graph.lower[vertex] {
            if let Some(&position) = lower_position.get(next) {
                segments.push((upper_position, position));
            }
        }
    }

    let mut crossings = 0;
    for (index, a) in segments.iter().enumerate() {
        for b in &segments[index + 1..] {
            if (a.0 < b.0 && a.1 > b.1) || (a.0 > b.0 && a.1 < b.1) {
                crossings += 1;
            }
        }
    }
    crossings
}

fn total_crossings(graph: &RankedGraph, layers: &[Vec<usize>]) -> usize {
    layers
        .windows(2)
        .map(|pair| crossings_between(graph, &pair[0], &pair[1]))
        .sum()
}

/// Sorts `layer` by the mean position of each vertex's neighbors in `reference`.
/// Vertices without neighbors keep their current slot as sort key.
fn reorder_by_barycenter(layer: &mut Vec<usize>, reference: &[usize], neighbors: &[Vec<usize>]) {
    let position = reference
        .iter()
        .enumerate()
        .map(|(position, &vertex)| (vertex, position as f64))
        .collect::<HashMap<_, _>>();

    let mut keyed = layer
        .iter()
        .enumerate()
        .map(|(slot, &vertex)| {
            let (sum, count) = neighbors[vertex]
                .iter()
                .filter_map(|neighbor| position.get(neighbor))
                .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
            let key = if count == 0 { slot as f64 } else { sum / count as f64 };
            (key, vertex)
        })
        .collect::<Vec<_>>();

    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    *layer = keyed.into_iter().map(|(_, vertex)| vertex).collect();
}

fn order_layers(graph: &RankedGraph, layers: &mut [Vec<usize>]) {
    let mut best = layers.to_vec();
    let mut best_crossings = total_crossings(graph, layers);

    for sweep in 0..ORDER_SWEEPS {
        if best_crossings == 0 {
            break;
        }

        if sweep % 2 == 0 {
            for index in 1..layers.len() {
                let (fixed, rest) = layers.split_at_mut(index);
                reorder_by_barycenter(&mut rest[0], &fixed[index - 1], &graph.upper);
            }
        } else {
            for index in (0..layers.len().saturating_sub(1)).rev() {
                let (head, tail) = layers.split_at_mut(index + 1);
                reorder_by_barycenter(&mut head[index], &tail[0], &graph.lower);
            }
        }

        let crossings = total_crossings(graph, layers);
        if crossings < best_crossings {
            best_crossings = crossings;
            best = layers.to_vec();
        }
    }

    layers.clone_from_slice(&best);
}

/// Places `layer` as close to `desired` as the minimum gaps allow, keeping
/// the average displacement at zero.
fn pack(
    graph: &RankedGraph,
    layer: &[usize],
    desired: &[f64],
    centers: &mut [f64],
    orientation: Orientation,
) {
    if layer.is_empty() {
        return;
    }

    let mut placed: Vec<f64> = Vec::with_capacity(layer.len());
    for (slot, &vertex) in layer.iter().enumerate() {
        let center = match placed.last() {
            Some(&previous) => {
                desired[slot].max(previous + graph.gap(layer[slot - 1], vertex, orientation))
            }
            None => desired[slot],
        };
        placed.push(center);
    }

    let drift = placed
        .iter()
        .zip(desired)
        .map(|(placed, desired)| placed - desired)
        .sum::<f64>()
        / layer.len() as f64;

    for (&vertex, center) in layer.iter().zip(placed) {
        centers[vertex] = center - drift;
    }
}

fn align_to(
    graph: &RankedGraph,
    layer: &[usize],
    neighbors: &[Vec<usize>],
    centers: &mut [f64],
    orientation: Orientation,
) {
    let desired = layer
        .iter()
        .map(|&vertex| {
            let adjacent = &neighbors[vertex];
            if adjacent.is_empty() {
                centers[vertex]
            } else {
                adjacent.iter().map(|&other| centers[other]).sum::<f64>() / adjacent.len() as f64
            }
        })
        .collect::<Vec<_>>();
    pack(graph, layer, &desired, centers, orientation);
}

fn assign_cross_positions(
    graph: &RankedGraph,
    layers: &[Vec<usize>],
    orientation: Orientation,
) -> Vec<f64> {
    let mut centers = vec![0.0; graph.len()];
    for layer in layers {
        let desired = vec![0.0; layer.len()];
        pack(graph, layer, &desired, &mut centers, orientation);
    }

    for pass in 0..ALIGN_PASSES {
        if pass % 2 == 0 {
            for layer in layers.iter().skip(1) {
                align_to(graph, layer, &graph.upper, &mut centers, orientation);
            }
        } else {
            for layer in layers.iter().rev().skip(1) {
                align_to(graph, layer, &graph.lower, &mut centers, orientation);
            }
        }
    }

    centers
}

pub(super) fn layered(
    nodes: &[Asset],
    edges: &[VisibleEdge],
    orientation: Orientation,
) -> Result<Vec<Placement>, LayoutError> {
    let index_by_id = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.id.as_str(), index))
        .collect::<HashMap<_, _>>();
    let endpoint = |edge: &VisibleEdge, id: &str| {
        index_by_id
            .get(id)
            .copied()
            .ok_or_else(|| LayoutError::UnknownEndpoint {
                edge: edge.key.to_string(),
                node: id.to_owned(),
            })
    };

    let mut links = Vec::with_capacity(edges.len());
    for edge in edges {
        let source = endpoint(edge, &edge.connection.source)?;
        let target = endpoint(edge, &edge.connection.target)?;
        if source != target {
            links.push((source, target));
        }
    }

    let links = break_cycles(nodes.len(), &links);
    let ranks = longest_path_ranks(nodes.len(), &links);
    let graph = RankedGraph::build(&links, &ranks);
    let mut layers = graph.layers();
    order_layers(&graph, &mut layers);
    let centers = assign_cross_positions(&graph, &layers, orientation);

    let min_edge = (0..graph.len())
        .map(|vertex| centers[vertex] - graph.half_extent(vertex, orientation))
        .fold(f64::INFINITY, f64::min);
    let rank_pitch = orientation.rank_extent() + RANK_SEPARATION;
    let (anchor_in, anchor_out) = orientation.anchors();

    Ok((0..nodes.len())
        .map(|index| {
            let across = centers[index] - orientation.cross_extent() / 2.0 - min_edge;
            let along = ranks[index] as f64 * rank_pitch;
            let position = match orientation {
                Orientation::TopToBottom => Point::new(across, along),
                Orientation::LeftToRight => Point::new(along, across),
            };
            Placement::at(position).with_anchors(anchor_in, anchor_out)
        })
        .collect())
}
