use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::aggregate::DEFAULT_SMOOTHING_WINDOW;

pub const DEFAULT_HEADER_IMAGE_URL: &str =
    "https://i.postimg.cc/3RVxKf2s/Screenshot-2024-10-02-at-11-33-04.png";

/// 200 MiB, the usual ceiling for a single dashboard file upload.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// Which challenge completion charts the page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeView {
    Cumulative,
    Smoothed,
    Both,
}

impl ChallengeView {
    pub fn shows_cumulative(self) -> bool {
        matches!(self, ChallengeView::Cumulative | ChallengeView::Both)
    }

    pub fn shows_smoothed(self) -> bool {
        matches!(self, ChallengeView::Smoothed | ChallengeView::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// Always show `image_url`; no admin panel.
    Static,
    /// Show the uploaded file when present, `image_url` otherwise.
    Uploadable,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub mode: HeaderMode,
    pub image_url: String,
    pub upload_path: PathBuf,
    pub width: u32,
    /// Largest accepted dashboard form body in bytes, upload included.
    pub max_upload_bytes: usize,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            mode: HeaderMode::Uploadable,
            image_url: DEFAULT_HEADER_IMAGE_URL.to_string(),
            upload_path: PathBuf::from("uploads/header_image.png"),
            width: 200,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub seed: u64,
    pub users: usize,
    pub days: usize,
    pub smoothing_window: usize,
    /// Reference date for ages; today when unset.
    pub as_of: Option<NaiveDate>,
    pub challenge_view: ChallengeView,
    pub header: HeaderConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            users: 100,
            days: 365,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            as_of: None,
            challenge_view: ChallengeView::Both,
            header: HeaderConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }
}
