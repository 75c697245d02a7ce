use axum::extract::State;

use crate::{context::ApiContext, error::ApiError};

pub mod events;
pub mod users;

pub async fn health_check(State(ctx): State<ApiContext>) -> Result<&'static str, ApiError> {
    ctx.db.ping().await?;
    Ok("Healthy")
}

/// Remove an image stored for a request that then failed, so failed
/// requests leave no files behind.
async fn discard_on_error<T>(
    ctx: &ApiContext,
    image: Option<&str>,
    result: Result<T, ApiError>,
) -> Result<T, ApiError> {
    if result.is_err()
        && let Some(reference) = image
    {
        ctx.uploads.discard(reference).await;
    }
    result
}
