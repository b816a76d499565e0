pub mod camera;
pub mod instance;
pub mod mesh;
pub mod scene;

pub use camera::CameraUniform;
pub use instance::ProxyInstance;
pub use mesh::{Mesh, Vertex};
pub use scene::ProxyScene;

// Re-export glam types for consistent version usage
pub use glam;
