use eframe::egui::{Context, Pos2, Rect, Vec2};

use crate::topology::{DEFAULT_CONNECTION_TYPE, EdgeKey, Scene, Session};

mod graph;
mod render_utils;
mod ui;

pub struct TopologyApp {
    model: Box<ViewModel>,
}

struct ViewModel {
    session: Session,
    scene: Scene,
    scene_dirty: bool,
    pan: Vec2,
    zoom: f32,
    fit_requested: bool,
    /// Node whose on-screen position must survive the next relayout.
    pinned: Option<String>,
    focal_search: String,
    selection: Option<Selection>,
    outgoing_form: ConnectionForm,
    incoming_form: ConnectionForm,
    status: Option<String>,
    show_asset_legend: bool,
    show_connection_legend: bool,
    canvas: CanvasCache,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Selection {
    Asset(String),
    Connection(EdgeKey),
}

/// Partner asset and label picked in one "add connection" form.
#[derive(Clone, Debug)]
struct ConnectionForm {
    other: Option<String>,
    label: String,
    search: String,
}

impl Default for ConnectionForm {
    fn default() -> Self {
        Self {
            other: None,
            label: DEFAULT_CONNECTION_TYPE.to_owned(),
            search: String::new(),
        }
    }
}

/// Screen-space geometry of the last drawn frame, used for hit testing.
#[derive(Default)]
struct CanvasCache {
    cards: Vec<CardGeometry>,
    edges: Vec<EdgeGeometry>,
}

struct CardGeometry {
    id: String,
    rect: Rect,
    badge: Option<Rect>,
}

struct EdgeGeometry {
    key: EdgeKey,
    label: String,
    start: Pos2,
    end: Pos2,
}

impl TopologyApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, session: Session) -> Self {
        Self {
            model: Box::new(ViewModel::new(session)),
        }
    }
}

impl eframe::App for TopologyApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.model.show(ctx);
    }
}
