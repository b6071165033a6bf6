use axum::{
	Json, Router,
	body::Body,
	extract::{Path, State},
	http::{HeaderMap, Request, StatusCode, header},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use msf_domain::status::Status;
use msf_service::{
	ApiEndpointRequest, DocumentsResponse, Error as ServiceError, FilterRequest, ItemsResponse,
	PublishRequest, PublishResponse, QueryResponse, Settings, SettingsPayload, UpdateRequest,
	UpdateResponse, WelcomeResponse,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	let guarded = Router::new()
		.route("/filter", post(filter))
		.route("/api/{*endpoint}", post(filter_api_endpoint))
		.route("/items/{tag}", get(items_draft))
		.route("/items/{tag}/{status}", get(items_by_status))
		.route("/update", post(update))
		.route("/publish", post(publish))
		.route("/documents", get(documents))
		.route("/settings", get(get_settings).post(set_settings))
		.layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

	Router::new()
		.route("/welcome", get(welcome))
		.route("/health", get(health))
		.merge(guarded)
		.with_state(state)
}

async fn auth_middleware(
	State(state): State<AppState>,
	req: Request<Body>,
	next: Next,
) -> Response {
	if !is_authorized(req.headers(), state.api_auth_token()) {
		return json_error(
			StatusCode::UNAUTHORIZED,
			"unauthorized",
			"Authentication required with a Bearer token.",
			None,
		)
		.into_response();
	}

	next.run(req).await
}

fn is_authorized(headers: &HeaderMap, expected: Option<&str>) -> bool {
	match expected {
		None => true,
		Some(expected) => read_bearer_token(headers).is_some_and(|token| token == expected),
	}
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let raw = headers.get(header::AUTHORIZATION)?;
	let value = raw.to_str().ok()?.trim();
	let token = value.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token) }
}

async fn welcome(State(state): State<AppState>) -> Json<WelcomeResponse> {
	Json(state.service.welcome())
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn filter(
	State(state): State<AppState>,
	Json(payload): Json<FilterRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
	let response = state.service.filter(payload).await?;

	Ok(Json(response))
}

async fn filter_api_endpoint(
	State(state): State<AppState>,
	Path(endpoint): Path<String>,
	Json(payload): Json<ApiEndpointRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
	let response = state.service.filter_api_endpoint(&endpoint, payload).await?;

	Ok(Json(response))
}

async fn items_draft(
	State(state): State<AppState>,
	Path(tag): Path<String>,
) -> Result<Json<ItemsResponse>, ApiError> {
	let response = state.service.items_by_tag(Some(&tag), Status::Draft).await?;

	Ok(Json(response))
}

async fn items_by_status(
	State(state): State<AppState>,
	Path((tag, status)): Path<(String, String)>,
) -> Result<Json<ItemsResponse>, ApiError> {
	let status = status.parse::<Status>().map_err(|err| {
		json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			err.to_string(),
			Some(vec!["status".to_string()]),
		)
	})?;
	let response = state.service.items_by_tag(Some(&tag), status).await?;

	Ok(Json(response))
}

async fn update(
	State(state): State<AppState>,
	Json(payload): Json<UpdateRequest>,
) -> Result<Json<UpdateResponse>, ApiError> {
	let response = state.service.update_by_tag(payload).await?;

	Ok(Json(response))
}

async fn publish(
	State(state): State<AppState>,
	Json(payload): Json<PublishRequest>,
) -> Result<Json<PublishResponse>, ApiError> {
	let response = state.service.publish_by_tag(payload).await?;

	Ok(Json(response))
}

async fn documents(State(state): State<AppState>) -> Json<DocumentsResponse> {
	Json(state.service.documents_grouped_by_tag().await.into())
}

async fn get_settings(State(state): State<AppState>) -> Result<Json<Settings>, ApiError> {
	let response = state.service.get_settings().await?;

	Ok(Json(response))
}

async fn set_settings(
	State(state): State<AppState>,
	Json(payload): Json<SettingsPayload>,
) -> Result<Json<Settings>, ApiError> {
	let response = state.service.set_settings(payload.into_settings()).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message, field } => json_error(
				StatusCode::BAD_REQUEST,
				"invalid_request",
				message,
				field.map(|field| vec![field]),
			),
			ServiceError::UnknownContentType { label } => json_error(
				StatusCode::NOT_FOUND,
				"unknown_content_type",
				format!("Unknown content type: {label}."),
				None,
			),
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Storage failure.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message, None)
			},
			ServiceError::Settings { message } => {
				tracing::error!(error = %message, "Stored settings are unreadable.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "settings_error", message, None)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
