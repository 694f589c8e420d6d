use crate::{
    config::Settings,
    pipeline::{self, Format, Generator},
    prompt,
};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use log::{error, info};
use serde::Deserialize;
use std::sync::Arc;

const INDEX: &str = r#"<h2>FusionBrain e-Ink Image Server</h2>
<p>Open <a href="/image">/image</a> to get a freshly generated 1-bit image.</p>
<p>Use <a href="/image?format=raw">/image?format=raw</a> for the packed 400x300 frame buffer.</p>
"#;

#[derive(Clone)]
pub struct AppState {
    generator: Arc<dyn Generator>,
    settings: Arc<Settings>,
}
impl AppState {
    pub fn new(generator: impl Generator + 'static, settings: Settings) -> Self {
        Self {
            generator: Arc::new(generator),
            settings: Arc::new(settings),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/image", get(image))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX)
}

#[derive(Deserialize, Debug, Default)]
struct ImageQuery {
    format: Option<Format>,
}

async fn image(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, AppError> {
    let format = query.format.unwrap_or(state.settings.format);
    let prompt = prompt::prompt(&state.settings.prompts, &mut rand::thread_rng());
    info!("Generating {:?} for {:?}", format, prompt);

    let image = state.generator.generate(&prompt).await?;
    let polarity = state.settings.polarity();
    let body =
        tokio::task::spawn_blocking(move || pipeline::render(image, format, polarity)).await??;
    info!("Serving {} bytes", body.len());
    Ok(([(header::CONTENT_TYPE, format.content_type())], body).into_response())
}

/// Any failure of the pipeline, reported as a 500 with the error text.
struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error: {:#}", self.0),
        )
            .into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
