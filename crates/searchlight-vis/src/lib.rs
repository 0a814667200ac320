//! Searchlight Playback
//!
//! Step-by-step playback of search algorithm traces with playback controls.
//!
//! # Architecture
//!
//! - **Simulation**: Validates user input and records one trace per run
//! - **Playback**: Walks the trace one step at a time
//! - **Render**: Presentation state updated by each applied step
//! - **Driver**: One card with its own cancellable auto-play task
//! - **Board**: The registry of cards and the tag filter
//! - **Server**: REST controls plus a WebSocket stream of card updates
//!
//! # Usage
//!
//! ```ignore
//! let server = VisServer::new(VisConfig::default());
//! server.serve().await?;
//! ```

mod board;
mod driver;
mod error;
mod playback;
mod render;
mod server;
mod simulation;

pub use board::Board;
pub use driver::{CardSnapshot, Driver, Tick};
pub use error::{Error, Result};
pub use playback::{Advance, Playback, PlaybackConfig, PlaybackState, PlaybackStatus};
pub use render::{ArrayPresenter, Cell, EdgeMark, GraphPresenter, NodeMark, Presenter, Renderer, StatusLine};
pub use server::{VisConfig, VisServer};
pub use simulation::{parse_target, Outcome, Params, Run, Selection};
