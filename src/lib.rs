pub mod bench;
pub mod complex;
pub mod config;
pub mod coord;
pub mod escape;
pub mod imagegen;
pub mod label;
pub mod painter;
pub mod query;
pub mod render;
#[cfg(feature = "server")]
pub mod server;
pub mod threads;

pub use config::{RenderConfig, ServerConfig};
pub use coord::Viewport;
pub use render::Renderer;
