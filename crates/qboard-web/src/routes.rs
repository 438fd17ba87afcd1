//! HTTP routes
//!
//! - `GET /` renders the page
//! - `POST /questions` submits the form; success redirects to `/` (303),
//!   failures render the page with the input kept
//! - `GET /api/board` returns the board as JSON
//! - `GET /healthz` liveness

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use qboard_core::{BoardError, QuestionBoard, SubmitError, ViewerId};
use serde::Deserialize;
use serde_json::json;
use warp::http::header::{HeaderValue, SET_COOKIE};
use warp::http::{StatusCode, Uri};
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::html::{render_page, FormValues, Notice, Page};

/// Cookie carrying the viewer id
pub const VIEWER_COOKIE: &str = "qboard_viewer";

const FORM_LIMIT: u64 = 16 * 1024;
const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 365;
const FLASH_TTL: Duration = Duration::from_secs(60);
const FLASH_CAPACITY: u64 = 10_000;

const RETRY_HINT: &str = "Please try submitting again.";
const REJECTED_HINT: &str = "The question store refused the write; ask the board owner to check its settings.";

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    board: Arc<QuestionBoard>,
    /// Success message waiting for the viewer's next page load
    flash: Cache<ViewerId, String>,
}

impl AppState {
    /// Wrap a connected board
    pub fn new(board: QuestionBoard) -> Self {
        Self {
            board: Arc::new(board),
            flash: Cache::builder()
                .max_capacity(FLASH_CAPACITY)
                .time_to_live(FLASH_TTL)
                .build(),
        }
    }

    /// The board
    pub fn board(&self) -> &QuestionBoard {
        &self.board
    }

    /// Take the board back once no route holds a clone
    pub fn into_board(self) -> Option<QuestionBoard> {
        Arc::try_unwrap(self.board).ok()
    }
}

/// Viewer resolved from the request cookie
#[derive(Debug, Clone, Copy)]
struct Viewer {
    id: ViewerId,
    issued: bool,
}

impl Viewer {
    fn from_cookie(raw: Option<&str>) -> Self {
        match raw.and_then(|v| v.parse::<ViewerId>().ok()) {
            Some(id) => Self { id, issued: false },
            None => Self {
                id: ViewerId::new(),
                issued: true,
            },
        }
    }

    /// Attach `Set-Cookie` when the id was minted for this request
    fn attach(self, mut response: Response) -> Response {
        if self.issued {
            let cookie = format!(
                "{VIEWER_COOKIE}={}; Path=/; Max-Age={COOKIE_MAX_AGE_SECS}; HttpOnly; SameSite=Lax",
                self.id
            );
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
        response
    }
}

/// Submitted form fields; absent fields count as empty
#[derive(Debug, Default, Deserialize)]
struct QuestionForm {
    #[serde(default)]
    group: String,
    #[serde(default)]
    text: String,
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn viewer() -> impl Filter<Extract = (Viewer,), Error = Infallible> + Clone {
    warp::cookie::optional::<String>(VIEWER_COOKIE)
        .map(|raw: Option<String>| Viewer::from_cookie(raw.as_deref()))
}

/// All routes
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let index = warp::path::end()
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(viewer())
        .and_then(index_handler);

    let submit = warp::path("questions")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(viewer())
        .and(warp::body::content_length_limit(FORM_LIMIT))
        .and(warp::body::form::<QuestionForm>())
        .and_then(submit_handler);

    let api = warp::path!("api" / "board")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(viewer())
        .and_then(board_json_handler);

    let health = warp::path!("healthz")
        .and(warp::get())
        .and(with_state(state))
        .and_then(health_handler);

    index
        .or(submit)
        .or(api)
        .or(health)
        .with(warp::trace::request())
}

fn html_response(body: String, status: StatusCode) -> Response {
    let mut response = warp::reply::html(body).into_response();
    *response.status_mut() = status;
    response
}

async fn index_handler(state: AppState, viewer: Viewer) -> Result<Response, Infallible> {
    let rendered = state.board.render(&viewer.id).await;
    let status = if rendered.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let notice = state.flash.remove(&viewer.id).await.map(Notice::Success);

    let body = render_page(&Page {
        board: rendered.as_ref(),
        notice,
        form: FormValues::default(),
    });

    Ok(viewer.attach(html_response(body, status)))
}

async fn submit_handler(
    state: AppState,
    viewer: Viewer,
    form: QuestionForm,
) -> Result<Response, Infallible> {
    let restore = state.board.config().restore_input_on_failure;

    let (notice, form_values, mut status) = match state.board.submit(&form.group, &form.text).await {
        Ok(ack) => {
            state.flash.insert(viewer.id, ack.message()).await;
            let redirect = warp::redirect::see_other(Uri::from_static("/")).into_response();
            return Ok(viewer.attach(redirect));
        }
        Err(SubmitError::Validation(err)) => (
            Notice::Warning(err.to_string()),
            FormValues::new(form.group, form.text),
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        Err(SubmitError::WriteFault(source)) => {
            let kept = if restore {
                FormValues::new(form.group, form.text)
            } else {
                FormValues::default()
            };
            let hint = if source.is_transient() {
                RETRY_HINT
            } else {
                REJECTED_HINT
            };
            let message = format!("{} {hint}", SubmitError::WriteFault(source));
            (Notice::Error(message), kept, StatusCode::BAD_GATEWAY)
        }
    };

    let rendered = state.board.render(&viewer.id).await;
    if rendered.is_err() {
        status = StatusCode::SERVICE_UNAVAILABLE;
    }

    let body = render_page(&Page {
        board: rendered.as_ref(),
        notice: Some(notice),
        form: form_values,
    });

    Ok(viewer.attach(html_response(body, status)))
}

async fn board_json_handler(state: AppState, viewer: Viewer) -> Result<Response, Infallible> {
    let response = match state.board.render(&viewer.id).await {
        Ok(board) => warp::reply::json(&board).into_response(),
        Err(err) => {
            let code = match &err {
                BoardError::ConnectionFault(source) | BoardError::ReadFault { source, .. } => {
                    source.code()
                }
            };
            warp::reply::with_status(
                warp::reply::json(&json!({ "error": err.to_string(), "code": code })),
                StatusCode::SERVICE_UNAVAILABLE,
            )
            .into_response()
        }
    };

    Ok(viewer.attach(response))
}

async fn health_handler(state: AppState) -> Result<Response, Infallible> {
    Ok(warp::reply::json(&json!({
        "status": "ok",
        "backend": state.board.backend_tag(),
        "version": crate::VERSION,
    }))
    .into_response())
}
