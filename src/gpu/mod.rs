//! GPU rendering: wgpu state, atlas upload, pipelines and the text backend.

pub mod atlas;
mod backend;
pub mod pipeline;
pub mod state;

pub use atlas::GpuAtlas;
pub use backend::{FRAME_GLYPHS, GpuBackend, MAX_DRAWS_PER_FRAME};
pub use state::GpuState;
