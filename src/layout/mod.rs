//! Placement of visible nodes under interchangeable strategies.
//!
//! Every strategy is a pure function of the node and edge lists. Positions
//! are world coordinates of a node card's top-left corner. The geometric
//! strategies place corners on their circles and grids directly, so their
//! cards hang below and to the right of the nominal point.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::topology::{Asset, VisibleEdge};

mod grid;
mod layered;
mod radial;

pub use layered::{NODE_HEIGHT, NODE_WIDTH};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutStrategy {
    #[default]
    Tree,
    HorizontalTree,
    Circle,
    Star,
    Grid,
    Concentric,
}

impl LayoutStrategy {
    pub const ALL: [Self; 6] = [
        Self::Tree,
        Self::HorizontalTree,
        Self::Circle,
        Self::Star,
        Self::Grid,
        Self::Concentric,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::HorizontalTree => "horizontal-tree",
            Self::Circle => "circle",
            Self::Star => "star",
            Self::Grid => "grid",
            Self::Concentric => "concentric",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Tree => "Tree",
            Self::HorizontalTree => "Horizontal tree",
            Self::Circle => "Circle",
            Self::Star => "Star",
            Self::Grid => "Grid",
            Self::Concentric => "Concentric",
        }
    }
}

impl fmt::Display for LayoutStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutStrategy {
    type Err = LayoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name() == value)
            .ok_or_else(|| LayoutError::UnknownStrategy(value.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("edge {edge} references {node}, which is not part of the layout")]
    UnknownEndpoint { edge: String, node: String },
    #[error("unknown layout strategy: {0}")]
    UnknownStrategy(String),
}

/// Side of a node's bounding box where connectors attach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn polar(radius: f64, angle: f64) -> Self {
        Self::new(radius * angle.cos(), radius * angle.sin())
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Where a strategy puts one node. Shared by all strategies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Placement {
    pub(crate) position: Point,
    pub(crate) anchor_in: Side,
    pub(crate) anchor_out: Side,
}

impl Placement {
    fn at(position: Point) -> Self {
        Self {
            position,
            anchor_in: Side::Top,
            anchor_out: Side::Bottom,
        }
    }

    fn with_anchors(self, anchor_in: Side, anchor_out: Side) -> Self {
        Self {
            anchor_in,
            anchor_out,
            ..self
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionedNode {
    #[serde(flatten)]
    pub asset: Asset,
    pub position: Point,
    pub anchor_in: Side,
    pub anchor_out: Side,
}

impl PositionedNode {
    fn place(asset: Asset, placement: Placement) -> Self {
        Self {
            asset,
            position: placement.position,
            anchor_in: placement.anchor_in,
            anchor_out: placement.anchor_out,
        }
    }

    pub fn unpositioned(asset: Asset) -> Self {
        Self::place(asset, Placement::at(Point::ORIGIN))
    }
}

/// Lays out `nodes`, falling back to unpositioned nodes if the strategy fails.
pub fn layout(
    nodes: &[Asset],
    edges: &[VisibleEdge],
    strategy: LayoutStrategy,
) -> Vec<PositionedNode> {
    match try_layout(nodes, edges, strategy) {
        Ok(positioned) => {
            debug!(%strategy, nodes = positioned.len(), "computed layout");
            positioned
        }
        Err(error) => {
            warn!(%strategy, %error, "layout failed, leaving nodes unpositioned");
            nodes
                .iter()
                .cloned()
                .map(PositionedNode::unpositioned)
                .collect()
        }
    }
}

pub fn try_layout(
    nodes: &[Asset],
    edges: &[VisibleEdge],
    strategy: LayoutStrategy,
) -> Result<Vec<PositionedNode>, LayoutError> {
    if nodes.is_empty() {
        return Ok(Vec::new());
    }

    let placements = match strategy {
        LayoutStrategy::Tree => layered::layered(nodes, edges, layered::Orientation::TopToBottom)?,
        LayoutStrategy::HorizontalTree => {
            layered::layered(nodes, edges, layered::Orientation::LeftToRight)?
        }
        LayoutStrategy::Circle => radial::circle(nodes.len()),
        LayoutStrategy::Star => radial::star(nodes.len()),
        LayoutStrategy::Grid => grid::grid(nodes.len()),
        LayoutStrategy::Concentric => radial::concentric(nodes.len()),
    };

    Ok(nodes
        .iter()
        .cloned()
        .zip(placements)
        .map(|(asset, placement)| PositionedNode::place(asset, placement))
        .collect())
}

/// How far node `id` moved between two layouts of overlapping node sets.
pub fn position_shift(
    before: &[PositionedNode],
    after: &[PositionedNode],
    id: &str,
) -> Option<Point> {
    let find = |nodes: &[PositionedNode]| {
        nodes
            .iter()
            .find(|node| node.asset.id == id)
            .map(|node| node.position)
    };
    Some(find(after)? - find(before)?)
}
