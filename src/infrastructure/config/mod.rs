//! Infrastructure configuration modules.

pub mod currency;
pub mod exchange;
pub mod logging;
pub mod polling;
pub mod settings;
pub mod websocket;

pub use settings::Config;
