mod demo;
mod load;
mod model;
mod session;
mod visibility;

pub use demo::demo_dataset;
pub use load::{load_dataset, parse_dataset};
pub use model::{
    Asset, AssetStatus, CONNECTION_TYPES, Connection, ConnectionEntry, ConnectionId,
    DATABASES_TYPE, DEFAULT_CONNECTION_TYPE, Dataset, Direction, EdgeKey, EditError,
    SERVERS_TYPE, SYSTEM_TYPE, UNKNOWN,
};
pub use session::{Scene, Session};
pub use visibility::{
    ExpansionState, TraversalMode, VisibleEdge, VisibleSubgraph, expand_all_from,
    resolve_visible,
};
