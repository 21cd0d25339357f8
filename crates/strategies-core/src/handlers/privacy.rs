use crate::response::ApiResponse;
use crate::routes::{HandlerContext, MockHandler};
use serde_json::json;

/// Data export of everything the demo backend holds about the user.
pub struct ExportDataHandler;

impl MockHandler for ExportDataHandler {
    fn id(&self) -> &'static str {
        "privacy.export"
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse {
        match ctx.session.current() {
            Some(session) => ApiResponse::ok(json!({
                "user": session.user,
                "sessions": ctx.account.devices(session),
                "orders": ctx
                    .account
                    .portfolio
                    .as_ref()
                    .map(|p| p.orders.as_slice())
                    .unwrap_or_default(),
                "exported_at": ctx.now,
            })),
            None => ApiResponse::unauthorized(),
        }
    }
}
