//! # Strategies Core
//!
//! Request routing for the Smart Strategies Builder API client.
//!
//! A [`Router`] is built once from a [`RouterConfig`]. In [`Mode::Live`] every
//! request is forwarded verbatim to the backend; in [`Mode::Mock`] requests are
//! answered locally by the demo handlers after a simulated network delay.

pub mod config;
pub mod error;
pub mod events;
pub mod handlers;
pub mod latency;
pub mod models;
pub mod request;
pub mod response;
pub mod rng;
pub mod router;
pub mod routes;
pub mod session;
pub mod transport;

pub use config::{Mode, RouterConfig};
pub use error::{Result, RouterError};
pub use latency::LatencyRange;
pub use request::{Method, RouteRequest};
pub use response::ApiResponse;
pub use router::Router;
pub use transport::{LiveTransport, MockTransport, Transport};
