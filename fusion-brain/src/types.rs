use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability of a pipeline, as reported by the pipeline listing.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineType {
    #[serde(rename = "TEXT2IMAGE")]
    Text2Image,
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PipelineType,
    #[serde(default)]
    pub status: Option<String>,
}

/// A submitted generation job.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub uuid: String,
    pub status: GenerationStatus,
    /// Suggested wait, in seconds, before the first status check.
    #[serde(default, alias = "statusTime")]
    pub status_time: u64,
}

/// Status of a generation job.
///
/// Anything that is neither pending nor `DONE` is a terminal failure; unknown
/// values are kept verbatim.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String")]
pub enum GenerationStatus {
    Initial,
    Processing,
    Done,
    Fail,
    Other(String),
}
impl GenerationStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Initial | Self::Processing)
    }
}
impl From<String> for GenerationStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "INITIAL" => Self::Initial,
            "PROCESSING" => Self::Processing,
            "DONE" => Self::Done,
            "FAIL" => Self::Fail,
            _ => Self::Other(s),
        }
    }
}
impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initial => "INITIAL",
            Self::Processing => "PROCESSING",
            Self::Done => "DONE",
            Self::Fail => "FAIL",
            Self::Other(s) => s.as_str(),
        })
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub uuid: String,
    pub status: GenerationStatus,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub result: Option<GeneratedFiles>,
    #[serde(default)]
    pub generation_time: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    /// Base64-encoded images.
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub censored: bool,
}

/// Parameters of a `GENERATE` job.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateParams {
    #[serde(rename = "type")]
    kind: &'static str,
    pub num_images: u32,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt_decoder: Option<String>,
    pub generate_params: Query,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub query: String,
}

impl GenerateParams {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            kind: "GENERATE",
            num_images: 1,
            width: 1024,
            height: 1024,
            style: None,
            negative_prompt_decoder: None,
            generate_params: Query {
                query: prompt.into(),
            },
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_negative_prompt(mut self, negative: impl Into<String>) -> Self {
        self.negative_prompt_decoder = Some(negative.into());
        self
    }

    pub fn prompt(&self) -> &str {
        &self.generate_params.query
    }
}
