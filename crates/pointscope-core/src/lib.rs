pub mod bounds;
pub mod camera;
pub mod config;
pub mod cycle;
pub mod edit;
pub mod error;
pub mod event;
pub mod frame;
pub mod handle;
pub mod interaction;
pub mod loader;
pub mod palette;
pub mod persistence;
pub mod picking;
pub mod point;
pub mod port;
pub mod proxy;
pub mod registry;
pub mod selection;
pub mod session;

#[cfg(test)]
mod testing;

// Re-exports
pub use glam;

pub use bounds::AABB;
pub use camera::Camera;
pub use config::{SceneConfig, Viewport};
pub use edit::{CommitReport, EditForm};
pub use error::{ConfigError, EditError, LoadError, PersistenceError, RegistryError, SceneError};
pub use event::SessionEvent;
pub use frame::CoordinateFrame;
pub use handle::ProxyHandle;
pub use interaction::{CursorHint, InteractionMode, PointerEvent, SelectionGating};
pub use loader::{load_scene, LoadedScene, SceneLocators};
pub use palette::Rgb;
pub use point::{Point, PointRecord, PointState};
pub use port::{AssetSource, LoadedModel, SceneRenderer};
pub use proxy::VisualProxy;
pub use session::SceneSession;
