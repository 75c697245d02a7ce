use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use eventhub_common::{
    params::{AuthLoginParams, RegisterUserParams, UpdateUserParams},
    views::{
        ApiErrorResponse, AuthLoginResponse, DeleteUserResponse, RegisterUserResponse,
        UpdateUserResponse, User,
    },
};

use super::discard_on_error;
use crate::{
    context::ApiContext,
    error::ApiError,
    upload::{MultipartForm, UploadNamespace},
};

#[utoipa::path(
    post,
    path = "/users/register",
    tags = ["users"],
    request_body(content = RegisterUserParams, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "User registered", body = RegisterUserResponse),
        (status = 400, description = "Validation failed", body = ApiErrorResponse),
        (status = 409, description = "Email already registered", body = ApiErrorResponse),
    )
)]
pub async fn register_user(
    State(ctx): State<ApiContext>,
    mut form: MultipartForm,
) -> Result<(StatusCode, Json<RegisterUserResponse>), ApiError> {
    let new_user = form.parse::<RegisterUserParams>()?.validate()?;

    let image = ctx
        .uploads
        .store(UploadNamespace::Users, form.take_image())
        .await?;
    let result = ctx.credentials().register(new_user, image.clone()).await;
    let user = discard_on_error(&ctx, image.as_deref(), result).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterUserResponse {
            message: "User registered successfully".into(),
            user,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/users/login",
    tags = ["users", "auth"],
    request_body(content = AuthLoginParams, content_type = "application/json"),
    responses(
        (status = 200, description = "Successful login", body = AuthLoginResponse),
        (status = 400, description = "Invalid credentials", body = ApiErrorResponse),
        (status = 404, description = "No user with this email", body = ApiErrorResponse),
    )
)]
pub async fn login_user(
    State(ctx): State<ApiContext>,
    form: MultipartForm,
) -> Result<Json<AuthLoginResponse>, ApiError> {
    let params = form.parse::<AuthLoginParams>()?;
    let (token, user) = ctx
        .credentials()
        .authenticate(&params.email, &params.password)
        .await?;

    Ok(Json(AuthLoginResponse {
        message: "Login successful".into(),
        token,
        user,
    }))
}

#[utoipa::path(
    get,
    path = "/users/getAll/all",
    tags = ["users"],
    responses((status = 200, description = "Every user", body = Vec<User>))
)]
pub async fn list_users(State(ctx): State<ApiContext>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(ctx.users().list().await?))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tags = ["users"],
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Resolved user", body = User),
        (status = 400, description = "Malformed id", body = ApiErrorResponse),
        (status = 404, description = "No such user", body = ApiErrorResponse),
    )
)]
pub async fn get_user(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(ctx.users().get_by_id(&id).await?))
}

#[utoipa::path(
    put,
    path = "/users/update/{id}",
    tags = ["users"],
    params(("id" = String, Path, description = "User id")),
    request_body(content = UpdateUserParams, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated user", body = UpdateUserResponse),
        (status = 400, description = "Malformed id or validation failed", body = ApiErrorResponse),
        (status = 404, description = "No such user", body = ApiErrorResponse),
        (status = 409, description = "Email already registered", body = ApiErrorResponse),
    )
)]
pub async fn update_user(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    mut form: MultipartForm,
) -> Result<Json<UpdateUserResponse>, ApiError> {
    let patch = form.parse::<UpdateUserParams>()?.validate()?;

    let image = ctx
        .uploads
        .store(UploadNamespace::Users, form.take_image())
        .await?;
    let result = ctx.users().update(&id, patch, image.clone()).await;
    let updated_user = discard_on_error(&ctx, image.as_deref(), result).await?;

    Ok(Json(UpdateUserResponse {
        message: "User updated successfully".into(),
        updated_user,
    }))
}

#[utoipa::path(
    delete,
    path = "/users/delete/{id}",
    tags = ["users"],
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Deleted user", body = DeleteUserResponse),
        (status = 400, description = "Malformed id", body = ApiErrorResponse),
        (status = 404, description = "No such user", body = ApiErrorResponse),
    )
)]
pub async fn delete_user(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    let user = ctx.users().delete(&id).await?;

    Ok(Json(DeleteUserResponse {
        message: "User deleted successfully".into(),
        user,
    }))
}
