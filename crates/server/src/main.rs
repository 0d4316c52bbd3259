// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod session;

#[cfg(test)]
mod tests;

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Redirect as HttpRedirect, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use water_abstraction::{ChargeInformationDraft, JourneyKind, PaperFormsState};
use water_abstraction_api::{
    ApiError, LicenceTitles, LocalBackend, PageOutcome, SessionData,
    handlers::{charge_information, paper_forms, returns},
};
use water_abstraction_domain::{DocumentId, LicenceId, ReturnId};
use water_abstraction_forms::{FormRequest, payload_from_pairs};

use crate::session::{BrowserSession, SessionCookie, SessionStore};

/// Water Abstraction Server - HTTP server for the returns, charge information
/// and paper forms wizards
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// JSON fixture with returns, licences and documents. If not provided,
    /// the backend starts empty.
    #[arg(short, long)]
    fixtures: Option<PathBuf>,

    /// CSV of licence condition titles (`code,subcode,display_title`)
    #[arg(long)]
    licence_titles: Option<PathBuf>,

    /// Log level used when `RUST_LOG` is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Minutes a session may sit idle before it is dropped
    #[arg(long, default_value_t = 120)]
    session_ttl_minutes: u64,
}

/// Application state shared across handlers.
///
/// Sessions and the backend are each behind a Mutex. Handlers that need both
/// lock `sessions` first.
#[derive(Clone)]
struct AppState {
    /// Session data keyed by session id.
    sessions: Arc<Mutex<SessionStore>>,
    /// Returns, licences and documents.
    backend: Arc<Mutex<LocalBackend>>,
    /// Licence condition titles, loaded once at startup.
    titles: Arc<LicenceTitles>,
}

impl AppState {
    fn new(backend: LocalBackend, titles: LicenceTitles, sessions: SessionStore) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(sessions)),
            backend: Arc::new(Mutex::new(backend)),
            titles: Arc::new(titles),
        }
    }
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    /// Always `ok`.
    status: String,
}

/// API response for a licence condition title lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConditionTitleResponse {
    /// Condition code.
    code: String,
    /// Condition subcode.
    subcode: String,
    /// Display title.
    title: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::ResourceNotFound { .. } => Self {
                status: StatusCode::NOT_FOUND,
                message: err.to_string(),
            },
            ApiError::InvalidInput { .. } => Self {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
            },
            ApiError::DomainRuleViolation { .. } => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: err.to_string(),
            },
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: err.to_string(),
                }
            }
        }
    }
}

/// Response type of the wizard page handlers.
type PageResult = Result<(SessionCookie, Response), HttpError>;

/// Decoded `name=value` pairs of a query string or form body.
type Pairs = Vec<(String, String)>;

/// Converts a page outcome to JSON or a `303 See Other`.
fn page_response(outcome: PageOutcome) -> Response {
    match outcome {
        PageOutcome::View(view) => Json(*view).into_response(),
        PageOutcome::Redirect(redirect) => HttpRedirect::to(&redirect.location).into_response(),
    }
}

/// A `POST` request carrying its body and the query string it was sent to.
fn post_request(query: Pairs, body: Pairs) -> FormRequest {
    FormRequest::post(payload_from_pairs(body)).with_query(payload_from_pairs(query))
}

fn parse_journey(journey: &str) -> Result<JourneyKind, HttpError> {
    journey.parse().map_err(|message: String| {
        HttpError::from(ApiError::not_found("Journey", message))
    })
}

/// Handler for GET `/health` endpoint.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

/// Handler for GET `/returns/{journey}/{return_id}/{step}` endpoint.
async fn handle_get_return_step(
    AxumState(app_state): AxumState<AppState>,
    session: BrowserSession,
    Path((journey, return_id, step)): Path<(String, String, String)>,
    Query(query): Query<Pairs>,
) -> PageResult {
    let journey: JourneyKind = parse_journey(&journey)?;
    debug!(%journey, return_id = %return_id, step = %step, "Handling get_return_step request");

    let mut sessions = app_state.sessions.lock().await;
    let backend = app_state.backend.lock().await;
    let outcome: PageOutcome = sessions.with_session(&session.id, |data: &mut SessionData| {
        returns::get_return_step(
            data,
            &backend,
            journey,
            &ReturnId::new(&return_id),
            &step,
            &payload_from_pairs(query),
        )
    })?;
    drop(backend);
    drop(sessions);

    Ok((session.cookie(), page_response(outcome)))
}

/// Handler for POST `/returns/{journey}/{return_id}/{step}` endpoint.
async fn handle_post_return_step(
    AxumState(app_state): AxumState<AppState>,
    session: BrowserSession,
    Path((journey, return_id, step)): Path<(String, String, String)>,
    Query(query): Query<Pairs>,
    Form(body): Form<Pairs>,
) -> PageResult {
    let journey: JourneyKind = parse_journey(&journey)?;
    info!(%journey, return_id = %return_id, step = %step, "Handling post_return_step request");

    let mut sessions = app_state.sessions.lock().await;
    let mut backend = app_state.backend.lock().await;
    let outcome: PageOutcome = sessions.with_session(&session.id, |data: &mut SessionData| {
        returns::post_return_step(
            data,
            &mut backend,
            journey,
            &ReturnId::new(&return_id),
            &step,
            &post_request(query, body),
        )
    })?;
    drop(backend);
    drop(sessions);

    Ok((session.cookie(), page_response(outcome)))
}

/// Handler for GET `/charge-information/{licence_id}/{step}` endpoint.
async fn handle_get_charge_step(
    AxumState(app_state): AxumState<AppState>,
    session: BrowserSession,
    Path((licence_id, step)): Path<(String, String)>,
    Query(query): Query<Pairs>,
) -> PageResult {
    debug!(licence_id = %licence_id, step = %step, "Handling get_charge_step request");

    let mut sessions = app_state.sessions.lock().await;
    let backend = app_state.backend.lock().await;
    let outcome: PageOutcome = sessions.with_session(&session.id, |data: &mut SessionData| {
        charge_information::get_charge_step(
            data,
            &backend,
            &LicenceId::new(&licence_id),
            &step,
            &payload_from_pairs(query),
        )
    })?;
    drop(backend);
    drop(sessions);

    Ok((session.cookie(), page_response(outcome)))
}

/// Handler for POST `/charge-information/{licence_id}/{step}` endpoint.
async fn handle_post_charge_step(
    AxumState(app_state): AxumState<AppState>,
    session: BrowserSession,
    Path((licence_id, step)): Path<(String, String)>,
    Query(query): Query<Pairs>,
    Form(body): Form<Pairs>,
) -> PageResult {
    info!(licence_id = %licence_id, step = %step, "Handling post_charge_step request");

    let mut sessions = app_state.sessions.lock().await;
    let backend = app_state.backend.lock().await;
    let outcome: PageOutcome = sessions.with_session(&session.id, |data: &mut SessionData| {
        charge_information::post_charge_step(
            data,
            &backend,
            &LicenceId::new(&licence_id),
            &step,
            &post_request(query, body),
        )
    })?;
    drop(backend);
    drop(sessions);

    Ok((session.cookie(), page_response(outcome)))
}

/// Handler for GET `/charge-information/{licence_id}/check` endpoint.
async fn handle_get_charge_check(
    AxumState(app_state): AxumState<AppState>,
    session: BrowserSession,
    Path(licence_id): Path<String>,
) -> Result<(SessionCookie, Json<ChargeInformationDraft>), HttpError> {
    let mut sessions = app_state.sessions.lock().await;
    let backend = app_state.backend.lock().await;
    let draft: ChargeInformationDraft =
        sessions.with_session(&session.id, |data: &mut SessionData| {
            charge_information::get_charge_check(data, &backend, &LicenceId::new(&licence_id))
        })?;
    drop(backend);
    drop(sessions);

    Ok((session.cookie(), Json(draft)))
}

/// Handler for POST `/charge-information/{licence_id}/cancel` endpoint.
async fn handle_post_charge_cancel(
    AxumState(app_state): AxumState<AppState>,
    session: BrowserSession,
    Path(licence_id): Path<String>,
) -> (SessionCookie, Response) {
    info!(licence_id = %licence_id, "Handling charge_cancel request");

    let mut sessions = app_state.sessions.lock().await;
    let outcome: PageOutcome = sessions.with_session(&session.id, |data: &mut SessionData| {
        charge_information::post_charge_cancel(data, &LicenceId::new(&licence_id))
    });
    drop(sessions);

    (session.cookie(), page_response(outcome))
}

/// Handler for POST `/charge-information/{licence_id}/charge-elements` endpoint.
async fn handle_post_create_charge_element(
    AxumState(app_state): AxumState<AppState>,
    session: BrowserSession,
    Path(licence_id): Path<String>,
) -> PageResult {
    info!(licence_id = %licence_id, "Handling create_charge_element request");

    let mut sessions = app_state.sessions.lock().await;
    let backend = app_state.backend.lock().await;
    let outcome: PageOutcome = sessions.with_session(&session.id, |data: &mut SessionData| {
        charge_information::post_create_charge_element(
            data,
            &backend,
            &LicenceId::new(&licence_id),
        )
    })?;
    drop(backend);
    drop(sessions);

    Ok((session.cookie(), page_response(outcome)))
}

/// Handler for GET `/charge-information/{licence_id}/charge-elements/{element_id}` endpoint.
async fn handle_get_charge_element(
    AxumState(app_state): AxumState<AppState>,
    session: BrowserSession,
    Path((licence_id, element_id)): Path<(String, String)>,
    Query(query): Query<Pairs>,
) -> PageResult {
    debug!(licence_id = %licence_id, element_id = %element_id, "Handling get_charge_element request");

    let mut sessions = app_state.sessions.lock().await;
    let backend = app_state.backend.lock().await;
    let outcome: PageOutcome = sessions.with_session(&session.id, |data: &mut SessionData| {
        charge_information::get_charge_element(
            data,
            &backend,
            &LicenceId::new(&licence_id),
            &element_id,
            &payload_from_pairs(query),
        )
    })?;
    drop(backend);
    drop(sessions);

    Ok((session.cookie(), page_response(outcome)))
}

/// Handler for POST `/charge-information/{licence_id}/charge-elements/{element_id}` endpoint.
async fn handle_post_charge_element(
    AxumState(app_state): AxumState<AppState>,
    session: BrowserSession,
    Path((licence_id, element_id)): Path<(String, String)>,
    Query(query): Query<Pairs>,
    Form(body): Form<Pairs>,
) -> PageResult {
    info!(licence_id = %licence_id, element_id = %element_id, "Handling post_charge_element request");

    let mut sessions = app_state.sessions.lock().await;
    let backend = app_state.backend.lock().await;
    let outcome: PageOutcome = sessions.with_session(&session.id, |data: &mut SessionData| {
        charge_information::post_charge_element(
            data,
            &backend,
            &LicenceId::new(&licence_id),
            &element_id,
            &post_request(query, body),
        )
    })?;
    drop(backend);
    drop(sessions);

    Ok((session.cookie(), page_response(outcome)))
}

/// Handler for POST `/charge-information/{licence_id}/charge-elements/{element_id}/remove` endpoint.
async fn handle_post_remove_charge_element(
    AxumState(app_state): AxumState<AppState>,
    session: BrowserSession,
    Path((licence_id, element_id)): Path<(String, String)>,
) -> PageResult {
    info!(licence_id = %licence_id, element_id = %element_id, "Handling remove_charge_element request");

    let mut sessions = app_state.sessions.lock().await;
    let backend = app_state.backend.lock().await;
    let outcome: PageOutcome = sessions.with_session(&session.id, |data: &mut SessionData| {
        charge_information::post_remove_charge_element(
            data,
            &backend,
            &LicenceId::new(&licence_id),
            &element_id,
        )
    })?;
    drop(backend);
    drop(sessions);

    Ok((session.cookie(), page_response(outcome)))
}

/// Handler for GET `/returns-notifications/paper-forms` endpoint.
async fn handle_get_paper_forms(
    AxumState(app_state): AxumState<AppState>,
    session: BrowserSession,
    Query(query): Query<Pairs>,
) -> PageResult {
    let mut sessions = app_state.sessions.lock().await;
    let outcome: PageOutcome = sessions.with_session(&session.id, |data: &mut SessionData| {
        paper_forms::get_paper_forms(data, &payload_from_pairs(query))
    })?;
    drop(sessions);

    Ok((session.cookie(), page_response(outcome)))
}

/// Handler for POST `/returns-notifications/paper-forms` endpoint.
async fn handle_post_paper_forms(
    AxumState(app_state): AxumState<AppState>,
    session: BrowserSession,
    Query(query): Query<Pairs>,
    Form(body): Form<Pairs>,
) -> PageResult {
    info!("Handling post_paper_forms request");

    let mut sessions = app_state.sessions.lock().await;
    let backend = app_state.backend.lock().await;
    let outcome: PageOutcome = sessions.with_session(&session.id, |data: &mut SessionData| {
        paper_forms::post_paper_forms(data, &backend, &post_request(query, body))
    })?;
    drop(backend);
    drop(sessions);

    Ok((session.cookie(), page_response(outcome)))
}

/// Handler for GET `/returns-notifications/paper-forms/check` endpoint.
async fn handle_get_paper_forms_check(
    AxumState(app_state): AxumState<AppState>,
    session: BrowserSession,
) -> Result<(SessionCookie, Json<PaperFormsState>), HttpError> {
    let mut sessions = app_state.sessions.lock().await;
    let state: PaperFormsState = sessions.with_session(&session.id, |data: &mut SessionData| {
        paper_forms::get_paper_forms_check(data)
    })?;
    drop(sessions);

    Ok((session.cookie(), Json(state)))
}

/// Handler for GET `/returns-notifications/paper-forms/{document_id}/select-returns` endpoint.
async fn handle_get_select_returns(
    AxumState(app_state): AxumState<AppState>,
    session: BrowserSession,
    Path(document_id): Path<String>,
    Query(query): Query<Pairs>,
) -> PageResult {
    let mut sessions = app_state.sessions.lock().await;
    let outcome: PageOutcome = sessions.with_session(&session.id, |data: &mut SessionData| {
        paper_forms::get_select_returns(
            data,
            &DocumentId::new(&document_id),
            &payload_from_pairs(query),
        )
    })?;
    drop(sessions);

    Ok((session.cookie(), page_response(outcome)))
}

/// Handler for POST `/returns-notifications/paper-forms/{document_id}/select-returns` endpoint.
async fn handle_post_select_returns(
    AxumState(app_state): AxumState<AppState>,
    session: BrowserSession,
    Path(document_id): Path<String>,
    Query(query): Query<Pairs>,
    Form(body): Form<Pairs>,
) -> PageResult {
    info!(document_id = %document_id, "Handling post_select_returns request");

    let mut sessions = app_state.sessions.lock().await;
    let outcome: PageOutcome = sessions.with_session(&session.id, |data: &mut SessionData| {
        paper_forms::post_select_returns(
            data,
            &DocumentId::new(&document_id),
            &post_request(query, body),
        )
    })?;
    drop(sessions);

    Ok((session.cookie(), page_response(outcome)))
}

/// Handler for GET `/returns-notifications/paper-forms/{document_id}/recipient` endpoint.
async fn handle_get_recipient(
    AxumState(app_state): AxumState<AppState>,
    session: BrowserSession,
    Path(document_id): Path<String>,
    Query(query): Query<Pairs>,
) -> PageResult {
    let mut sessions = app_state.sessions.lock().await;
    let outcome: PageOutcome = sessions.with_session(&session.id, |data: &mut SessionData| {
        paper_forms::get_recipient(
            data,
            &DocumentId::new(&document_id),
            &payload_from_pairs(query),
        )
    })?;
    drop(sessions);

    Ok((session.cookie(), page_response(outcome)))
}

/// Handler for POST `/returns-notifications/paper-forms/{document_id}/recipient` endpoint.
async fn handle_post_recipient(
    AxumState(app_state): AxumState<AppState>,
    session: BrowserSession,
    Path(document_id): Path<String>,
    Query(query): Query<Pairs>,
    Form(body): Form<Pairs>,
) -> PageResult {
    info!(document_id = %document_id, "Handling post_recipient request");

    let mut sessions = app_state.sessions.lock().await;
    let outcome: PageOutcome = sessions.with_session(&session.id, |data: &mut SessionData| {
        paper_forms::post_recipient(
            data,
            &DocumentId::new(&document_id),
            &post_request(query, body),
        )
    })?;
    drop(sessions);

    Ok((session.cookie(), page_response(outcome)))
}

/// Handler for GET `/licences/condition-titles/{code}/{subcode}` endpoint.
async fn handle_get_condition_title(
    AxumState(app_state): AxumState<AppState>,
    Path((code, subcode)): Path<(String, String)>,
) -> Result<Json<ConditionTitleResponse>, HttpError> {
    let title: &str = app_state.titles.get(&code, &subcode).ok_or_else(|| {
        ApiError::not_found(
            "Condition title",
            format!("No condition title for {code}/{subcode}"),
        )
    })?;

    Ok(Json(ConditionTitleResponse {
        title: title.to_string(),
        code,
        subcode,
    }))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/returns/{journey}/{return_id}/{step}",
            get(handle_get_return_step).post(handle_post_return_step),
        )
        .route(
            "/charge-information/{licence_id}/check",
            get(handle_get_charge_check),
        )
        .route(
            "/charge-information/{licence_id}/cancel",
            post(handle_post_charge_cancel),
        )
        .route(
            "/charge-information/{licence_id}/charge-elements",
            post(handle_post_create_charge_element),
        )
        .route(
            "/charge-information/{licence_id}/charge-elements/{element_id}",
            get(handle_get_charge_element).post(handle_post_charge_element),
        )
        .route(
            "/charge-information/{licence_id}/charge-elements/{element_id}/remove",
            post(handle_post_remove_charge_element),
        )
        .route(
            "/charge-information/{licence_id}/{step}",
            get(handle_get_charge_step).post(handle_post_charge_step),
        )
        .route(
            "/returns-notifications/paper-forms",
            get(handle_get_paper_forms).post(handle_post_paper_forms),
        )
        .route(
            "/returns-notifications/paper-forms/check",
            get(handle_get_paper_forms_check),
        )
        .route(
            "/returns-notifications/paper-forms/{document_id}/select-returns",
            get(handle_get_select_returns).post(handle_post_select_returns),
        )
        .route(
            "/returns-notifications/paper-forms/{document_id}/recipient",
            get(handle_get_recipient).post(handle_post_recipient),
        )
        .route(
            "/licences/condition-titles/{code}/{subcode}",
            get(handle_get_condition_title),
        )
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    info!("Initializing Water Abstraction Server");

    let backend: LocalBackend = if let Some(path) = &args.fixtures {
        info!("Loading backend fixtures from: {}", path.display());
        LocalBackend::from_path(path)?
    } else {
        info!("Starting with an empty backend");
        LocalBackend::default()
    };

    let titles: LicenceTitles = args
        .licence_titles
        .as_deref()
        .map_or_else(|| Ok(LicenceTitles::empty()), LicenceTitles::from_path)?;

    // Build router
    let sessions: SessionStore =
        SessionStore::new(Duration::from_secs(args.session_ttl_minutes.saturating_mul(60)));
    info!(ttl_minutes = args.session_ttl_minutes, "Sessions expire when idle");
    let app: Router = build_router(AppState::new(backend, titles, sessions));

    // Bind to address
    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
