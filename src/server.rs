use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::admin::{accepts_image_name, AdminPanel, HeaderImageStore};
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::page::{render_dashboard, DashboardData};
use crate::render::{escape_html, FormInput, HtmlRenderer, MessageLevel, Renderer};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    pub store: HeaderImageStore,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let store = HeaderImageStore::new(config.header.upload_path.clone());
        Self {
            config: Arc::new(config),
            store,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.header.max_upload_bytes;
    Router::new()
        .route("/", get(show_dashboard).post(submit_dashboard))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn show_dashboard(State(state): State<AppState>) -> Response {
    render_page(state, FormInput::default(), None).await
}

async fn submit_dashboard(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let limit = state.config.header.max_upload_bytes;
    match read_form(&mut multipart, limit).await {
        Ok(input) => render_page(state, input, None).await,
        Err(err) => {
            warn!(error = %err, "rejected dashboard form");
            render_page(state, FormInput::default(), Some(err)).await
        }
    }
}

fn form_error(err: MultipartError, limit: usize) -> DashboardError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        DashboardError::UploadTooLarge { limit }
    } else {
        DashboardError::UploadRejected(err.body_text())
    }
}

async fn read_form(multipart: &mut Multipart, limit: usize) -> Result<FormInput, DashboardError> {
    let mut input = FormInput::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| form_error(err, limit))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if let Some(file_name) = field.file_name().map(str::to_string) {
            // An unchosen file input arrives as an empty part with an empty filename.
            if !file_name.is_empty() && !accepts_image_name(&file_name) {
                return Err(DashboardError::UploadRejected(format!(
                    "{file_name} is not a png, jpg or jpeg file"
                )));
            }
            let bytes = field.bytes().await.map_err(|err| form_error(err, limit))?;
            input.files.insert(name, bytes.to_vec());
        } else {
            let value = field.text().await.map_err(|err| form_error(err, limit))?;
            input.fields.insert(name, value);
        }
    }
    Ok(input)
}

async fn render_page(
    state: AppState,
    input: FormInput,
    rejected: Option<DashboardError>,
) -> Response {
    match tokio::task::spawn_blocking(move || render_pass(&state, input, rejected)).await {
        Ok((status, html)) => (status, Html(html)).into_response(),
        Err(err) => {
            error!(error = %err, "render task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn status_for(err: &DashboardError) -> StatusCode {
    match err {
        DashboardError::AuthenticationMismatch => StatusCode::UNAUTHORIZED,
        DashboardError::UploadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        DashboardError::UploadRejected(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// One full render pass. A form that could not be read still gets the page,
/// with the admin panel open and the reason shown at the bottom.
fn render_pass(
    state: &AppState,
    input: FormInput,
    rejected: Option<DashboardError>,
) -> (StatusCode, String) {
    let data = match DashboardData::generate(&state.config) {
        Ok(data) => data,
        Err(err) => {
            error!(error = %err, "failed to generate dashboard data");
            return (status_for(&err), escape_html(&err.to_string()));
        }
    };

    let mut panel = if rejected.is_some() {
        AdminPanel::Visible
    } else {
        input.admin_panel()
    };
    let mut renderer = HtmlRenderer::new(input);
    let mut status = match render_dashboard(&state.config, &data, &mut renderer, &mut panel, &state.store)
    {
        Ok(outcome) => {
            debug!(?outcome, panel = panel.as_str(), "render pass complete");
            StatusCode::OK
        }
        Err(err) => {
            warn!(error = %err, "render pass ended with error");
            status_for(&err)
        }
    };
    if let Some(err) = rejected {
        renderer.render_message(MessageLevel::Error, &err.to_string());
        status = status_for(&err);
    }
    (status, renderer.finish(panel))
}
