use crate::config::Settings;
use async_trait::async_trait;
use fusion_brain::GenerateParams;
use log::info;
use serde::Deserialize;
use waveshare_epd::{epd_4in2 as epd, Polarity};

/// Body served by `/image`.
#[derive(Deserialize, clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// 1-bit PNG.
    #[default]
    Png,
    /// Packed frame buffer for the 4.2" panel.
    Raw,
}
impl Format {
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Raw => "application/octet-stream",
        }
    }
}

/// Source of freshly generated images.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<image::DynamicImage>;
}

/// [`Generator`] backed by the FusionBrain API.
pub struct FusionBrain {
    client: fusion_brain::Client,
    width: u32,
    height: u32,
    style: Option<String>,
    negative_prompt: Option<String>,
}
impl FusionBrain {
    pub fn new(client: fusion_brain::Client, settings: &Settings) -> Self {
        Self {
            client,
            width: settings.width,
            height: settings.height,
            style: settings.style.clone(),
            negative_prompt: settings.negative_prompt.clone(),
        }
    }

    fn params(&self, prompt: &str) -> GenerateParams {
        let mut params = GenerateParams::new(prompt).with_size(self.width, self.height);
        if let Some(style) = &self.style {
            params = params.with_style(style.as_str());
        }
        if let Some(negative) = &self.negative_prompt {
            params = params.with_negative_prompt(negative.as_str());
        }
        params
    }
}
#[async_trait]
impl Generator for FusionBrain {
    async fn generate(&self, prompt: &str) -> anyhow::Result<image::DynamicImage> {
        Ok(self.client.generate_image(&self.params(prompt)).await?)
    }
}

/// Convert a generated image to what the display expects.
pub fn render(
    image: image::DynamicImage,
    format: Format,
    polarity: Polarity,
) -> anyhow::Result<Vec<u8>> {
    info!(
        "Rendering {}x{} {:?} as {:?}",
        image.width(),
        image.height(),
        image.color(),
        format
    );
    let gray = gray2bw::to_gray(image);
    let bw = gray2bw::to_bw(&gray, epd::EPD_WIDTH as u32, epd::EPD_HEIGHT as u32);
    Ok(match format {
        Format::Png => gray2bw::encode_png(&bw)?,
        Format::Raw => epd::pack_buffer(&bw, polarity)?.to_vec(),
    })
}
