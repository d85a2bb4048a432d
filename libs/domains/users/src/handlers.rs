//! HTTP handlers for the Users API
//!
//! Every route requires a verified access token. Writes additionally require `super_admin`.
//! Handlers forward their input to [`UserService`] unchanged.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_helpers::{
    JwtAuth, Page, PageOptions, PaginationQuery, RequiredRoles, ValidatedJson,
    errors::responses::{
        BadRequestObjectIdResponse, BadRequestQueryResponse, BadRequestValidationResponse,
        ConflictResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
    jwt_auth_middleware, require_roles,
};
use std::sync::Arc;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::error::UserResult;
use crate::models::{CreateUser, Role, UpdateUser, UserFilter, UserResponse};
use crate::service::UserService;

/// OpenAPI documentation for the Users API
#[derive(OpenApi)]
#[openapi(
    paths(create_user, list_users, get_user, update_user, delete_user),
    components(
        schemas(UserResponse, CreateUser, UpdateUser, UserFilter, Role, PageOptions, Page<UserResponse>),
        responses(
            BadRequestValidationResponse,
            BadRequestObjectIdResponse,
            BadRequestQueryResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    modifiers(&SecurityAddon),
    security(("bearer_auth" = [])),
    tags(
        (name = "Users", description = "User management endpoints")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` JWT scheme
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Create the users router.
///
/// Reads are open to any authenticated caller. Create, update and delete require `super_admin`.
pub fn router<S: UserService + 'static>(service: S, auth: JwtAuth) -> Router {
    let super_admin = RequiredRoles::any_of([Role::SuperAdmin]);

    Router::new()
        .route(
            "/",
            get(list_users::<S>).merge(
                post(create_user::<S>)
                    .route_layer(from_fn_with_state(super_admin.clone(), require_roles)),
            ),
        )
        .route(
            "/{id}",
            get(get_user::<S>).merge(
                put(update_user::<S>)
                    .delete(delete_user::<S>)
                    .route_layer(from_fn_with_state(super_admin, require_roles)),
            ),
        )
        .route_layer(from_fn_with_state(auth, jwt_auth_middleware))
        .with_state(Arc::new(service))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<S: UserService>(
    State(service): State<Arc<S>>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List users, one page at a time
#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    params(UserFilter, PageOptions),
    responses(
        (status = 200, description = "One page of users", body = Page<UserResponse>),
        (status = 400, response = BadRequestQueryResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<S: UserService>(
    State(service): State<Arc<S>>,
    PaginationQuery(filter, options): PaginationQuery<UserFilter>,
) -> UserResult<Json<Page<UserResponse>>> {
    let page = service.find_paginated(filter, options).await?;
    Ok(Json(page))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User id (hex ObjectId)")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<S: UserService>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
) -> UserResult<Json<UserResponse>> {
    let user = service.find_by_id(id).await?;
    Ok(Json(user))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User id (hex ObjectId)")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<S: UserService>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<UserResponse>> {
    let user = service.update_by_id(id, input).await?;
    Ok(Json(user))
}

/// Delete a user
///
/// Responds with an empty body; the removed record is not returned.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User id (hex ObjectId)")
    ),
    responses(
        (status = 200, description = "User deleted successfully"),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<S: UserService>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
) -> UserResult<StatusCode> {
    service.delete_by_id(id).await?;
    Ok(StatusCode::OK)
}
