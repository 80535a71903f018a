//! Strokeboard Render Library
//!
//! Paints a stroke ledger onto a raster surface, either one segment at a time
//! while a gesture is in progress or by full replay from blank.

mod raster;
mod renderer;
mod replica;

pub use raster::{Raster, compose_for};
pub use renderer::{RasterRenderer, RenderResult, Renderer, RendererError, render_ledger};
pub use replica::{RemoteCursor, Replica, ReplicaError};
