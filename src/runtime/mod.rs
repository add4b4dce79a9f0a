//! Long-running tasks: REST polling and websocket supervision.

pub mod poller;
pub mod websocket;

pub use poller::{PassReport, Poller};
pub use websocket::{FeedState, SupervisorConfig, WebsocketSupervisor};
