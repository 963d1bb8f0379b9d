//! Live subscriber channel: registry, connection handling, wire frames.

pub mod frame;
pub mod handler;
pub mod registry;

pub use frame::DataFrame;
pub use handler::WsConnection;
pub use registry::{ConnectionId, SubscriberRegistry};
