use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use eventhub_common::{
    params::{CreateEventParams, JoinEventParams, SearchEventsParams, UpdateEventParams},
    views::{
        ApiErrorResponse, CreateEventResponse, DeleteAllEventsResponse, DeleteEventResponse,
        DeleteSummary, Event, JoinEventResponse, UpdateEventResponse,
    },
};

use super::discard_on_error;
use crate::{
    auth::Auth,
    context::ApiContext,
    error::ApiError,
    upload::{MultipartForm, UploadNamespace},
};

#[utoipa::path(
    post,
    path = "/event/create",
    tags = ["events"],
    request_body(content = CreateEventParams, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Event created", body = CreateEventResponse),
        (status = 400, description = "Validation failed", body = ApiErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn create_event(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
    mut form: MultipartForm,
) -> Result<(StatusCode, Json<CreateEventResponse>), ApiError> {
    let organizer = caller.id.as_str();
    let new_event = form.parse::<CreateEventParams>()?.validate()?;

    let image = ctx
        .uploads
        .store(UploadNamespace::Events, form.take_image())
        .await?;
    let result = ctx.events().create(new_event, organizer, image.clone()).await;
    let event = discard_on_error(&ctx, image.as_deref(), result).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateEventResponse {
            message: "Event created successfully".into(),
            event,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/event/joinEvent",
    tags = ["events"],
    request_body(content = JoinEventParams, content_type = "application/json"),
    responses(
        (status = 200, description = "Joined the event", body = JoinEventResponse),
        (status = 400, description = "Missing or malformed event id", body = ApiErrorResponse),
        (status = 404, description = "No such event", body = ApiErrorResponse),
        (status = 409, description = "Already joined", body = ApiErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn join_event(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
    form: MultipartForm,
) -> Result<Json<JoinEventResponse>, ApiError> {
    let user_id = caller.id.as_str();
    let event_id = form.parse::<JoinEventParams>()?.validate()?;

    let data = ctx.participation().join(&event_id, user_id).await?;

    Ok(Json(JoinEventResponse {
        success: true,
        data,
    }))
}

#[utoipa::path(
    get,
    path = "/event/getAll/all",
    tags = ["events"],
    responses((status = 200, description = "Every event", body = Vec<Event>))
)]
pub async fn list_events(State(ctx): State<ApiContext>) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(ctx.events().list_all().await?))
}

#[utoipa::path(
    get,
    path = "/event/{eventId}",
    tags = ["events"],
    params(("eventId" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Resolved event", body = Event),
        (status = 400, description = "Malformed id", body = ApiErrorResponse),
        (status = 404, description = "No such event", body = ApiErrorResponse),
    )
)]
pub async fn get_event(
    State(ctx): State<ApiContext>,
    Path(event_id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    Ok(Json(ctx.events().get_by_id(&event_id).await?))
}

#[utoipa::path(
    get,
    path = "/event/search/searchByName",
    tags = ["events"],
    params(SearchEventsParams),
    responses(
        (status = 200, description = "Events whose title matches", body = Vec<Event>),
        (status = 400, description = "Empty query", body = ApiErrorResponse),
    )
)]
pub async fn search_events(
    State(ctx): State<ApiContext>,
    Query(query): Query<SearchEventsParams>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let name = query.validate()?;
    Ok(Json(ctx.events().search_by_name(&name).await?))
}

#[utoipa::path(
    get,
    path = "/event/byOrganizer/all",
    tags = ["events"],
    responses((status = 200, description = "Events organized by the caller", body = Vec<Event>)),
    security(("bearer" = []))
)]
pub async fn list_organized_events(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
) -> Result<Json<Vec<Event>>, ApiError> {
    let organizer = caller.id.as_str();
    Ok(Json(ctx.events().list_by_organizer(organizer).await?))
}

#[utoipa::path(
    get,
    path = "/event/MyEvent/getAll",
    tags = ["events"],
    responses((status = 200, description = "Events the caller joined", body = Vec<Event>)),
    security(("bearer" = []))
)]
pub async fn list_joined_events(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
) -> Result<Json<Vec<Event>>, ApiError> {
    let participant = caller.id.as_str();
    Ok(Json(ctx.events().list_by_participant(participant).await?))
}

#[utoipa::path(
    put,
    path = "/event/update/{eventId}",
    tags = ["events"],
    params(("eventId" = String, Path, description = "Event id")),
    request_body(content = UpdateEventParams, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated event", body = UpdateEventResponse),
        (status = 400, description = "Malformed id or validation failed", body = ApiErrorResponse),
        (status = 404, description = "No such event", body = ApiErrorResponse),
    )
)]
pub async fn update_event(
    State(ctx): State<ApiContext>,
    Path(event_id): Path<String>,
    mut form: MultipartForm,
) -> Result<Json<UpdateEventResponse>, ApiError> {
    let patch = form.parse::<UpdateEventParams>()?.validate()?;

    let image = ctx
        .uploads
        .store(UploadNamespace::Events, form.take_image())
        .await?;
    let result = ctx.events().update(&event_id, patch, image.clone()).await;
    let data = discard_on_error(&ctx, image.as_deref(), result).await?;

    Ok(Json(UpdateEventResponse {
        success: true,
        message: "Event updated successfully".into(),
        data,
    }))
}

#[utoipa::path(
    delete,
    path = "/event/delete/{eventId}",
    tags = ["events"],
    params(("eventId" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Deleted event", body = DeleteEventResponse),
        (status = 400, description = "Malformed id", body = ApiErrorResponse),
        (status = 404, description = "No such event", body = ApiErrorResponse),
    )
)]
pub async fn delete_event(
    State(ctx): State<ApiContext>,
    Path(event_id): Path<String>,
) -> Result<Json<DeleteEventResponse>, ApiError> {
    let deleted_event = ctx.events().delete(&event_id).await?;

    Ok(Json(DeleteEventResponse {
        message: "Event deleted successfully".into(),
        deleted_event,
    }))
}

#[utoipa::path(
    delete,
    path = "/event/delete/event/all",
    tags = ["events"],
    responses((status = 200, description = "Every event deleted", body = DeleteAllEventsResponse))
)]
pub async fn delete_all_events(
    State(ctx): State<ApiContext>,
) -> Result<Json<DeleteAllEventsResponse>, ApiError> {
    let deleted_count = ctx.events().delete_all().await?;

    Ok(Json(DeleteAllEventsResponse {
        success: true,
        message: "All events deleted successfully".into(),
        data: DeleteSummary { deleted_count },
    }))
}
