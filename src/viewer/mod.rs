//! Mesh viewer core: stage tables, preview camera and replay fetches.
//!
//! - [`MeshViewController`] - owns everything and applies fetch results
//! - [`ReplaySource`] / [`RenderTarget`] - the backend and the preview surface
//! - [`MeshDisplayConfig`] - per-frame state handed to the renderer
//! - [`Settings`] - persisted user preferences

mod config;
mod controller;
pub mod fetch;
pub mod replay;
mod settings;
mod worker;

pub use config::*;
pub use controller::{MeshViewController, TableViewState, CAMERA_TICK};
pub use fetch::{FetchRequest, Fetched, MeshData, RawSource};
pub use replay::{
    BoundIndexBuffer, BoundVertexBuffer, DrawCall, MemoryReplay, MeshFormat, PipelineSnapshot,
    RenderTarget, ReplaySource, ResourceId, SigParameter, Topology, VertexInputAttribute, Viewport,
};
pub use settings::Settings;
pub use worker::{FetchWorker, WorkerCommand, WorkerResult};
