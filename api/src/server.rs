use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::{DefaultBodyLimit, MatchedPath},
    http::{
        HeaderName, HeaderValue, Method, Request,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use eventhub_common::views::ApiErrorResponse;
use eventhub_db::storage::{Storage, mongodb::MongoDBStorage};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, info_span};
use utoipa::{
    ToSchema,
    openapi::{
        Info, License, OpenApi, RefOr,
        path::Operation,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::{config::EventhubApiConfig, context::ApiContext, handlers, upload::UPLOADS_ROUTE};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Connect to MongoDB and build the application router.
pub async fn make(cfg: EventhubApiConfig) -> anyhow::Result<(Router, OpenApi)> {
    let db = MongoDBStorage::new(&cfg.mongodb_uri)
        .await
        .context("failed to connect to MongoDB")?;
    info!("Connected to MongoDB");

    make_with_storage(cfg, Arc::new(db))
}

/// Build the application router on top of an existing storage backend.
pub fn make_with_storage(
    cfg: EventhubApiConfig,
    db: Arc<dyn Storage>,
) -> anyhow::Result<(Router, OpenApi)> {
    let jwt_secret = cfg.get_jwt_secret()?;
    let cors_origin = cfg
        .public_url
        .parse::<HeaderValue>()
        .with_context(|| format!("invalid public url {:?}", cfg.public_url))?;
    let upload_dir = cfg.upload_dir.clone();
    let body_limit = cfg.max_upload_bytes;

    let context = ApiContext::new(cfg, db, &jwt_secret);

    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            x_request_id.clone(),
            MakeRequestUuid,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    // Log the request ID as generated
                    let request_id = req
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok());
                    let span = info_span!(
                        "http_request",
                        method = req.method().to_string(),
                        request_id = Option::<&str>::None,
                        path = Option::<&str>::None,
                    );

                    if let Some(request_id) = request_id {
                        span.record("request_id", request_id);
                    };

                    if let Some(path) = req.extensions().get::<MatchedPath>() {
                        span.record("path", path.as_str())
                    } else {
                        span.record("path", req.uri().path())
                    };

                    span
                }),
        )
        .layer(
            CorsLayer::new()
                .allow_credentials(true)
                .allow_origin(cors_origin)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE]),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id));

    let (router, mut api) = api_router().split_for_parts();
    finish_openapi(&mut api);

    let router = router
        .route("/health", get(handlers::health_check))
        .nest_service(UPLOADS_ROUTE, ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware)
        .with_state(context);

    Ok((router, api))
}

/// The OpenAPI document alone. Needs no database or secret.
pub fn openapi() -> OpenApi {
    let (_, mut api) = api_router().split_for_parts();
    finish_openapi(&mut api);
    api
}

fn api_router() -> OpenApiRouter<ApiContext> {
    let openapi = OpenApi::builder()
        .info(
            Info::builder()
                .title("Eventhub API Reference")
                .version(env!("CARGO_PKG_VERSION"))
                .license(Some(
                    License::builder()
                        .name("Apache 2.0 License")
                        .identifier(Some(env!("CARGO_PKG_LICENSE")))
                        .build(),
                )),
        )
        .build();

    OpenApiRouter::with_openapi(openapi)
        .routes(routes!(handlers::users::register_user))
        .routes(routes!(handlers::users::login_user))
        .routes(routes!(handlers::users::list_users))
        .routes(routes!(handlers::users::get_user))
        .routes(routes!(handlers::users::update_user))
        .routes(routes!(handlers::users::delete_user))
        .routes(routes!(handlers::events::create_event))
        .routes(routes!(handlers::events::join_event))
        .routes(routes!(handlers::events::list_events))
        .routes(routes!(handlers::events::get_event))
        .routes(routes!(handlers::events::search_events))
        .routes(routes!(handlers::events::list_organized_events))
        .routes(routes!(handlers::events::list_joined_events))
        .routes(routes!(handlers::events::update_event))
        .routes(routes!(handlers::events::delete_event))
        .routes(routes!(handlers::events::delete_all_events))
}

fn finish_openapi(api: &mut OpenApi) {
    api.components
        .get_or_insert_with(Default::default)
        .add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );

    api.paths.paths.iter_mut().for_each(|(_path, item)| {
        for op in [
            &mut item.get,
            &mut item.post,
            &mut item.put,
            &mut item.delete,
        ] {
            let needs_auth = op.as_ref().is_some_and(|op| op.security.is_some());
            apply_default_errors(op, needs_auth);
        }
    });
}

fn apply_default_errors(item: &mut Option<Operation>, needs_auth: bool) {
    if let Some(item) = item {
        if needs_auth {
            item.responses.responses.insert(
                "401".into(),
                RefOr::Ref(
                    utoipa::openapi::Ref::builder()
                        .summary("Unauthorized")
                        .ref_location_from_schema_name(ApiErrorResponse::name())
                        .build(),
                ),
            );

            item.responses.responses.insert(
                "403".into(),
                RefOr::Ref(
                    utoipa::openapi::Ref::builder()
                        .summary("Forbidden")
                        .ref_location_from_schema_name(ApiErrorResponse::name())
                        .build(),
                ),
            );
        }

        item.responses.responses.insert(
            "500".into(),
            RefOr::Ref(
                utoipa::openapi::Ref::builder()
                    .summary("Internal server error")
                    .ref_location_from_schema_name(ApiErrorResponse::name())
                    .build(),
            ),
        );
    }
}
