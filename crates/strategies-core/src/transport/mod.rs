use crate::config::Mode;
use crate::error::Result;
use crate::request::RouteRequest;
use crate::response::ApiResponse;
use async_trait::async_trait;

pub mod live;
pub mod mock;

pub use live::LiveTransport;
pub use mock::MockTransport;

/// Capability to turn a [`RouteRequest`] into an [`ApiResponse`].
///
/// Calling code depends on this trait only; whether the answer came from the
/// network or from a mock handler is invisible to it.
#[async_trait]
pub trait Transport: Send + Sync {
    /// The mode this transport implements.
    fn mode(&self) -> Mode;

    async fn send(&self, request: RouteRequest) -> Result<ApiResponse>;
}
