//! Class diagram editor with bendable polyline associations.

pub mod app;
pub mod connector;
pub mod error;
pub mod geometry;
pub mod model;
pub mod render;
pub mod sanity;
pub mod selection;
pub mod settings;
pub mod svg;
pub mod undo;

pub use connector::{Connector, NodeId, NodeKind, WaypointChain};
pub use error::{ChainError, DocumentError, SettingsError};
pub use model::{ClassBox, Diagram, Selectable};
pub use selection::{Scene, Selection};
pub use undo::{History, UndoSink};

/// Installs the global fmt subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second call keeps the subscriber already installed.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
