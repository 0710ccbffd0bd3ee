// crates/propdesk-server/src/routes.rs
// ============================================================================
// Module: API Routes
// Description: axum handlers for chat, tickets, vendors, and demo auth.
// Purpose: Expose the triage pipeline and ticket store over HTTP.
// Dependencies: propdesk-agent, propdesk-core, axum, tokio-stream
// ============================================================================

//! ## Overview
//! Every handler is a thin adapter: session extraction, role gating, one
//! store or directory call, and a JSON or SSE response. `POST /api/chat`
//! spawns the orchestrator on its own task and streams the session's event
//! channel as SSE frames, closing with a `[DONE]` sentinel. The spawned
//! task owns the session, so a dropped client connection never rolls back
//! a committed ticket.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::convert::Infallible;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::response::AppendHeaders;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::response::Sse;
use axum::response::sse::Event;
use axum::routing::get;
use axum::routing::post;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;

use propdesk_agent::EventEmitter;
use propdesk_agent::SessionContext;
use propdesk_agent::SharedReasoningProvider;
use propdesk_agent::ToolCatalog;
use propdesk_agent::TriageEvent;
use propdesk_agent::TriageSession;
use propdesk_core::ChatMessage;
use propdesk_core::IssueType;
use propdesk_core::PropertyId;
use propdesk_core::SharedClock;
use propdesk_core::SharedTicketStore;
use propdesk_core::SharedVendorDirectory;
use propdesk_core::StoreError;
use propdesk_core::Tenant;
use propdesk_core::TenantId;
use propdesk_core::Ticket;
use propdesk_core::TicketFilter;
use propdesk_core::TicketId;
use propdesk_core::TicketUpdate;
use propdesk_core::Vendor;

use crate::auth;
use crate::auth::Role;
use crate::auth::Session;
use crate::seed;
use crate::telemetry::ApiRoute;
use crate::telemetry::RequestMetricEvent;
use crate::telemetry::RequestMetrics;
use crate::telemetry::RequestOutcome;

// ============================================================================
// SECTION: Application State
// ============================================================================

/// Shared state for all handlers.
///
/// # Invariants
/// - The ticket store is the only mutable member; everything else is a
///   read-only collaborator cloned per request.
#[derive(Clone)]
pub struct AppState {
    /// Shared ticket store.
    pub store: SharedTicketStore,
    /// Vendor lookup collaborator.
    pub directory: SharedVendorDirectory,
    /// Reasoning-service client.
    pub provider: SharedReasoningProvider,
    /// Tool catalog with compiled validators.
    pub catalog: Arc<ToolCatalog>,
    /// Clock for creation stamping.
    pub clock: SharedClock,
    /// Metrics sink.
    pub metrics: Arc<dyn RequestMetrics>,
}

/// Builds the API router over the shared state.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/chat", post(chat))
        .route("/api/tickets", get(list_tickets))
        .route("/api/tickets/{id}", get(get_ticket).patch(patch_ticket))
        .route("/api/vendors", get(list_vendors))
        .with_state(state)
}

// ============================================================================
// SECTION: API Errors
// ============================================================================

/// Handler-level request failures.
///
/// # Invariants
/// - Each variant maps to exactly one HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Missing or undecodable session.
    #[error("not authenticated")]
    Unauthorized,
    /// Authenticated but not permitted for this route.
    #[error("not permitted")]
    Forbidden,
    /// Referenced resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Request shape or field values are invalid.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Valid request that violates lifecycle rules.
    #[error("unprocessable: {0}")]
    Unprocessable(String),
}

impl ApiError {
    /// Returns the HTTP status for the error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

/// Maps store failures onto API errors.
fn store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound(id) => ApiError::NotFound(format!("ticket {id}")),
        StoreError::Duplicate(id) => ApiError::BadRequest(format!("ticket {id} already exists")),
        StoreError::Lifecycle(err) => ApiError::Unprocessable(err.to_string()),
    }
}

// ============================================================================
// SECTION: Session Extraction
// ============================================================================

/// Extracts and decodes the session cookie.
fn require_session(headers: &HeaderMap) -> Result<Session, ApiError> {
    let header = headers
        .get(axum::http::header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;
    let cookie = auth::session_cookie_value(header).ok_or(ApiError::Unauthorized)?;
    auth::decode_session(cookie).ok_or(ApiError::Unauthorized)
}

/// Records a request outcome against the metrics sink.
fn observe(state: &AppState, route: ApiRoute, status: StatusCode) {
    let outcome =
        if status.is_success() { RequestOutcome::Ok } else { RequestOutcome::Error };
    state.metrics.record_request(RequestMetricEvent {
        route,
        outcome,
        status: Some(status.as_u16()),
    });
}

// ============================================================================
// SECTION: Auth Handlers
// ============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Login password.
    #[serde(default)]
    pub password: String,
}

/// Login and session-introspection response body.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// The authenticated session.
    pub user: Session,
}

/// `POST /api/auth/login`.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<(AppendHeaders<[(axum::http::HeaderName, String); 1]>, Json<SessionResponse>), ApiError>
{
    if request.email.is_empty() || request.password.is_empty() {
        observe(&state, ApiRoute::Auth, StatusCode::BAD_REQUEST);
        return Err(ApiError::BadRequest("email and password are required".to_string()));
    }
    let Some(session) = auth::validate_credentials(&request.email, &request.password) else {
        observe(&state, ApiRoute::Auth, StatusCode::UNAUTHORIZED);
        return Err(ApiError::Unauthorized);
    };
    let cookie = auth::session_set_cookie(&auth::encode_session(&session));
    observe(&state, ApiRoute::Auth, StatusCode::OK);
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(SessionResponse {
            user: session,
        }),
    ))
}

/// `GET /api/auth/me`.
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = require_session(&headers).inspect_err(|err| {
        observe(&state, ApiRoute::Auth, err.status());
    })?;
    observe(&state, ApiRoute::Auth, StatusCode::OK);
    Ok(Json(SessionResponse {
        user: session,
    }))
}

// ============================================================================
// SECTION: Chat Handler
// ============================================================================

/// Chat request body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Conversation history, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Slug of the property the reporter belongs to.
    pub property_slug: String,
    /// Optional explicit reporting tenant.
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
}

/// `POST /api/chat`.
///
/// Spawns one triage session and streams its events as SSE. The session
/// task outlives the connection: a disconnect drops the receiver, later
/// emits are discarded, and any committed ticket write stands.
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let outcome = chat_session(&state, &headers, request);
    match outcome {
        Ok(rx) => {
            observe(&state, ApiRoute::Chat, StatusCode::OK);
            let stream = UnboundedReceiverStream::new(rx).map(|event| {
                let frame = match &event {
                    TriageEvent::Done => "[DONE]".to_string(),
                    other => serde_json::to_string(other).unwrap_or_else(|_| {
                        r#"{"type":"error","message":"serialization failed"}"#.to_string()
                    }),
                };
                Ok::<Event, Infallible>(Event::default().data(frame))
            });
            Ok(Sse::new(stream))
        }
        Err(err) => {
            observe(&state, ApiRoute::Chat, err.status());
            Err(err)
        }
    }
}

/// Validates the chat request and spawns the session task.
fn chat_session(
    state: &AppState,
    headers: &HeaderMap,
    request: ChatRequest,
) -> Result<tokio::sync::mpsc::UnboundedReceiver<TriageEvent>, ApiError> {
    let session = require_session(headers)?;
    if session.role != Role::Tenant {
        return Err(ApiError::Forbidden);
    }
    // A tenant session may only open chats against its own property.
    if session.property_slug.as_deref() != Some(request.property_slug.as_str()) {
        return Err(ApiError::Forbidden);
    }
    let property = seed::property_by_slug(&request.property_slug)
        .ok_or_else(|| ApiError::NotFound(format!("property {}", request.property_slug)))?;
    let tenant = resolve_tenant(&property.id, request.tenant_id.as_ref());

    let ctx = SessionContext {
        property,
        tenant,
    };
    let (emitter, rx) = EventEmitter::channel();
    let triage = TriageSession::new(
        ctx,
        Arc::clone(&state.store),
        Arc::clone(&state.directory),
        Arc::clone(&state.provider),
        Arc::clone(&state.catalog),
        Arc::clone(&state.clock),
        emitter,
    );
    tokio::spawn(triage.run(request.messages));
    Ok(rx)
}

/// Resolves the reporting tenant from the explicit id or the directory.
fn resolve_tenant(property_id: &PropertyId, tenant_id: Option<&TenantId>) -> Option<Tenant> {
    match tenant_id {
        Some(id) => seed::tenants()
            .into_iter()
            .find(|tenant| &tenant.id == id && &tenant.property_id == property_id),
        None => seed::tenant_for_property(property_id),
    }
}

// ============================================================================
// SECTION: Ticket Handlers
// ============================================================================

/// Returns the read filter for a session's role.
fn filter_for(session: &Session) -> Result<TicketFilter, ApiError> {
    match session.role {
        Role::Landlord => Ok(TicketFilter::default()),
        Role::Tenant => {
            let slug = session.property_slug.as_deref().ok_or(ApiError::Forbidden)?;
            let property =
                seed::property_by_slug(slug).ok_or_else(|| ApiError::NotFound(slug.to_string()))?;
            Ok(TicketFilter {
                property_id: Some(property.id),
                tenant_id: None,
            })
        }
    }
}

/// `GET /api/tickets`.
pub async fn list_tickets(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    let result = require_session(&headers).and_then(|session| filter_for(&session));
    match result {
        Ok(filter) => {
            observe(&state, ApiRoute::Tickets, StatusCode::OK);
            Ok(Json(state.store.list(&filter)))
        }
        Err(err) => {
            observe(&state, ApiRoute::Tickets, err.status());
            Err(err)
        }
    }
}

/// `GET /api/tickets/{id}`.
pub async fn get_ticket(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    let result = fetch_scoped_ticket(&state, &headers, &id);
    match result {
        Ok(ticket) => {
            observe(&state, ApiRoute::Tickets, StatusCode::OK);
            Ok(Json(ticket))
        }
        Err(err) => {
            observe(&state, ApiRoute::Tickets, err.status());
            Err(err)
        }
    }
}

/// Fetches a ticket, hiding records outside the session's scope.
fn fetch_scoped_ticket(
    state: &AppState,
    headers: &HeaderMap,
    id: &str,
) -> Result<Ticket, ApiError> {
    let session = require_session(headers)?;
    let filter = filter_for(&session)?;
    let ticket = state.store.get(&TicketId::new(id)).map_err(store_error)?;
    // Out-of-scope records read as absent rather than forbidden.
    if !filter.matches(&ticket) {
        return Err(ApiError::NotFound(format!("ticket {id}")));
    }
    Ok(ticket)
}

/// `PATCH /api/tickets/{id}`.
pub async fn patch_ticket(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<TicketUpdate>,
) -> Result<Json<Ticket>, ApiError> {
    let result = apply_ticket_update(&state, &headers, &id, update);
    match result {
        Ok(ticket) => {
            observe(&state, ApiRoute::TicketUpdate, StatusCode::OK);
            Ok(Json(ticket))
        }
        Err(err) => {
            observe(&state, ApiRoute::TicketUpdate, err.status());
            Err(err)
        }
    }
}

/// Validates role and applies the restricted-field update.
fn apply_ticket_update(
    state: &AppState,
    headers: &HeaderMap,
    id: &str,
    update: TicketUpdate,
) -> Result<Ticket, ApiError> {
    let session = require_session(headers)?;
    if session.role != Role::Landlord {
        return Err(ApiError::Forbidden);
    }
    if update.is_empty() {
        return Err(ApiError::BadRequest("update carries no fields".to_string()));
    }
    state.store.update(&TicketId::new(id), update).map_err(store_error)
}

// ============================================================================
// SECTION: Vendor Handler
// ============================================================================

/// Query parameters for vendor lookup.
#[derive(Debug, Default, Deserialize)]
pub struct VendorQuery {
    /// Trade to search for; unknown labels fall back to `other`.
    #[serde(default)]
    pub issue_type: Option<String>,
    /// Zip code hint, accepted for interface stability.
    #[serde(default)]
    pub zip: Option<String>,
}

/// `GET /api/vendors`.
pub async fn list_vendors(
    State(state): State<AppState>,
    Query(query): Query<VendorQuery>,
) -> Json<Vec<Vendor>> {
    let issue_type = query
        .issue_type
        .as_deref()
        .and_then(IssueType::parse)
        .unwrap_or(IssueType::Other);
    let zip = query.zip.unwrap_or_else(|| "00000".to_string());
    let vendors = state.directory.search(issue_type, &zip);
    observe(&state, ApiRoute::Vendors, StatusCode::OK);
    Json(vendors)
}

// ============================================================================
// SECTION: Health Handler
// ============================================================================

/// `GET /healthz`.
pub async fn healthz(State(state): State<AppState>) -> Json<Value> {
    observe(&state, ApiRoute::Health, StatusCode::OK);
    Json(json!({ "status": "ok" }))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
