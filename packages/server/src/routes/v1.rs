use axum::extract::DefaultBodyLimit;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::media::upload_media))
        .layer(DefaultBodyLimit::max(config.media.max_upload_bytes));

    OpenApiRouter::new()
        .routes(routes!(handlers::media::access_media))
        .routes(routes!(handlers::media::access_link))
        .routes(routes!(handlers::media::delete_media))
        .merge(upload)
}
