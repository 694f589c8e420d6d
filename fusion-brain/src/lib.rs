mod error;
mod types;

pub use crate::error::{ApiError as Error, Result};
pub use crate::types::{
    GenerateParams, GeneratedFiles, GenerationResult, GenerationStatus, Pipeline, PipelineType,
    Query, Run,
};

use base64::Engine as _;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use std::time::Duration;

const API_URL: &str = "https://api-key.fusionbrain.ai/";

/// Static key pair issued by FusionBrain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

/// How often, and how many times, a job's status is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Polling {
    pub interval: Duration,
    pub max_attempts: u32,
}
impl Default for Polling {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_attempts: 40,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    polling: Polling,
}
impl Client {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: API_URL.to_string(),
            credentials,
            polling: Polling::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_polling(mut self, polling: Polling) -> Self {
        self.polling = polling;
        self
    }

    pub async fn pipelines(&self) -> Result<Vec<Pipeline>> {
        Ok(self
            .get("pipelines")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    pub async fn pipelines_by_type(&self, kind: PipelineType) -> Result<Vec<Pipeline>> {
        Ok(self
            .pipelines()
            .await?
            .into_iter()
            .filter(|p| p.kind == kind)
            .collect())
    }

    pub async fn run_pipeline(&self, pipeline_id: &str, params: &GenerateParams) -> Result<Run> {
        let form = Form::new().text("pipeline_id", pipeline_id.to_string()).part(
            "params",
            Part::text(serde_json::to_string(params)?).mime_str("application/json")?,
        );
        Ok(self
            .authorize(self.http.post(self.url("pipeline/run")))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    pub async fn status(&self, uuid: &str) -> Result<GenerationResult> {
        Ok(self
            .get(&format!("pipeline/status/{}", uuid))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    /// Wait `initial_delay`, then poll until the job leaves the pending states.
    ///
    /// The returned result may still be a failure: only [`Error::Timeout`] is
    /// raised here, when the job is pending after every allowed attempt.
    pub async fn wait_for_completion(
        &self,
        uuid: &str,
        initial_delay: Duration,
    ) -> Result<GenerationResult> {
        tokio::time::sleep(initial_delay).await;
        for attempt in 1..=self.polling.max_attempts {
            let result = self.status(uuid).await?;
            if !result.status.is_pending() {
                return Ok(result);
            }
            debug!(
                "Generation {} is {} ({}/{})",
                uuid, result.status, attempt, self.polling.max_attempts
            );
            tokio::time::sleep(self.polling.interval).await;
        }
        Err(Error::Timeout {
            uuid: uuid.to_string(),
            attempts: self.polling.max_attempts,
        })
    }

    /// Run a prompt through the first available TEXT2IMAGE pipeline.
    pub async fn generate_image(&self, params: &GenerateParams) -> Result<image::DynamicImage> {
        info!("Requesting {:?}", params.prompt());
        let pipeline = self
            .pipelines_by_type(PipelineType::Text2Image)
            .await?
            .into_iter()
            .next()
            .ok_or(Error::NoPipelines)?;
        info!("Using pipeline {} ({})", pipeline.name, pipeline.id);

        let run = self.run_pipeline(&pipeline.id, params).await?;
        let result = self
            .wait_for_completion(&run.uuid, Duration::from_secs(run.status_time))
            .await?;
        if result.status != GenerationStatus::Done {
            return Err(Error::GenerationFailed {
                status: result.status,
                description: result.error_description,
            });
        }
        if let Some(time) = result.generation_time {
            info!("Generation {} done in {}s", result.uuid, time);
        }

        let files = result.result.ok_or(Error::NoImages)?;
        if files.censored {
            warn!("Generation {} was censored", run.uuid);
        }
        let file = files.files.into_iter().next().ok_or(Error::NoImages)?;
        let data = base64::engine::general_purpose::STANDARD.decode(file)?;
        let decoder = image::io::Reader::new(std::io::Cursor::new(data)).with_guessed_format()?;
        Ok(decoder.decode()?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/key/api/v1/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.get(self.url(path)))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("X-Key", format!("Key {}", self.credentials.api_key))
            .header("X-Secret", format!("Secret {}", self.credentials.api_secret))
    }
}
