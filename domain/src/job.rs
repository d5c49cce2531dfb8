use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use time::OffsetDateTime;
#[cfg(feature = "docs")]
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dataset::DatasetKind;
use crate::poster::ArtifactDescriptor;

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(value_type = String, format = Uuid))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Named lifecycle step. Declaration order is lifecycle order.
#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Starting,
    Validating,
    LoadingTheme,
    Geocoding,
    FetchingBoundary,
    FetchingData,
    FetchingStreets,
    FetchingWater,
    FetchingParks,
    RenderSetup,
    RenderLayersWater,
    RenderLayersParks,
    RenderBoundary,
    RenderRoads,
    RenderGradients,
    RenderText,
    RenderSave,
    Completed,
    Error,
}

impl Phase {
    pub const LIFECYCLE: [Phase; 18] = [
        Self::Starting,
        Self::Validating,
        Self::LoadingTheme,
        Self::Geocoding,
        Self::FetchingBoundary,
        Self::FetchingData,
        Self::FetchingStreets,
        Self::FetchingWater,
        Self::FetchingParks,
        Self::RenderSetup,
        Self::RenderLayersWater,
        Self::RenderLayersParks,
        Self::RenderBoundary,
        Self::RenderRoads,
        Self::RenderGradients,
        Self::RenderText,
        Self::RenderSave,
        Self::Completed,
    ];

    /// Display percentage; `None` for the error state.
    #[must_use]
    pub fn percent(self) -> Option<u8> {
        let percent = match self {
            Self::Starting => 5,
            Self::Validating => 10,
            Self::LoadingTheme => 15,
            Self::Geocoding | Self::FetchingBoundary => 20,
            Self::FetchingData => 25,
            Self::FetchingStreets => 35,
            Self::FetchingWater => 45,
            Self::FetchingParks => 55,
            Self::RenderSetup => 60,
            Self::RenderLayersWater => 65,
            Self::RenderLayersParks => 70,
            Self::RenderBoundary => 75,
            Self::RenderRoads => 85,
            Self::RenderGradients => 90,
            Self::RenderText => 95,
            Self::RenderSave => 97,
            Self::Completed => 100,
            Self::Error => return None,
        };
        Some(percent)
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    #[must_use]
    pub fn fetching(kind: DatasetKind) -> Self {
        match kind {
            DatasetKind::Streets => Self::FetchingStreets,
            DatasetKind::Water => Self::FetchingWater,
            DatasetKind::Parks => Self::FetchingParks,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobFailureKind {
    InvalidInput,
    DataUnavailable,
    ProviderFailure,
    Cancelled,
    RenderFailure,
    Internal,
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailure {
    pub kind: JobFailureKind,
    pub message: String,
}

/// Rendered file kept on disk for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterArtifact {
    pub descriptor: ArtifactDescriptor,
    pub path: PathBuf,
    /// Attachment name offered to the client, e.g. `poster_Jakarta_Indonesia_noir.png`.
    pub download_name: String,
    /// Location part of the download names, e.g. `Jakarta_Indonesia`.
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { artifacts: Vec<PosterArtifact> },
    Failed(JobFailure),
}

/// Partial record merged into a [`JobStatus`]; absent fields leave the record untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusUpdate {
    pub phase: Option<Phase>,
    pub message: Option<String>,
    pub cache_hits: BTreeMap<DatasetKind, bool>,
    pub fetch_steps: BTreeMap<DatasetKind, u8>,
    pub outcome: Option<JobOutcome>,
}

impl StatusUpdate {
    #[must_use]
    pub fn phase(phase: Phase, message: impl Into<String>) -> Self {
        Self {
            phase: Some(phase),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn cache_hit(kind: DatasetKind, hit: bool) -> Self {
        Self {
            cache_hits: BTreeMap::from([(kind, hit)]),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_fetch_step(mut self, kind: DatasetKind, step: u8) -> Self {
        self.fetch_steps.insert(kind, step);
        self
    }

    #[must_use]
    pub fn completed(artifacts: Vec<PosterArtifact>, message: impl Into<String>) -> Self {
        Self {
            phase: Some(Phase::Completed),
            message: Some(message.into()),
            outcome: Some(JobOutcome::Completed { artifacts }),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failed(kind: JobFailureKind, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            phase: Some(Phase::Error),
            message: Some(message.clone()),
            outcome: Some(JobOutcome::Failed(JobFailure { kind, message })),
            ..Self::default()
        }
    }
}

/// Mutable per-job record owned by the registry.
#[derive(Debug, Clone)]
pub struct JobStatus {
    pub job_id: JobId,
    pub phase: Phase,
    pub message: String,
    percent: u8,
    pub cache_hits: BTreeMap<DatasetKind, bool>,
    pub fetch_steps: BTreeMap<DatasetKind, u8>,
    pub cancelled: bool,
    pub started_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub outcome: Option<JobOutcome>,
}

impl JobStatus {
    #[must_use]
    pub fn new(job_id: JobId, message: impl Into<String>, now: OffsetDateTime) -> Self {
        Self {
            job_id,
            phase: Phase::Starting,
            message: message.into(),
            percent: Phase::Starting.percent().unwrap_or(0),
            cache_hits: BTreeMap::new(),
            fetch_steps: BTreeMap::new(),
            cancelled: false,
            started_at: now,
            updated_at: now,
            outcome: None,
        }
    }

    /// Shallow merge. Cache hits only move from `false` to `true`, fetch steps
    /// and the display percent never go backwards, and a terminal record keeps
    /// its phase, message and outcome.
    pub fn apply(&mut self, update: StatusUpdate, now: OffsetDateTime) {
        for (kind, hit) in update.cache_hits {
            let entry = self.cache_hits.entry(kind).or_insert(false);
            *entry = *entry || hit;
        }
        for (kind, step) in update.fetch_steps {
            let entry = self.fetch_steps.entry(kind).or_insert(0);
            *entry = (*entry).max(step);
        }
        self.updated_at = now;

        if self.phase.is_terminal() {
            return;
        }

        if let Some(phase) = update.phase {
            self.phase = phase;
            if let Some(percent) = phase.percent() {
                self.percent = self.percent.max(percent);
            }
        }
        if let Some(message) = update.message {
            self.message = message;
        }
        if update.outcome.is_some() {
            self.outcome = update.outcome;
        }
    }

    #[must_use]
    pub fn percent(&self) -> u8 {
        self.percent
    }

    #[must_use]
    pub fn artifacts(&self) -> &[PosterArtifact] {
        match &self.outcome {
            Some(JobOutcome::Completed { artifacts }) => artifacts,
            _ => &[],
        }
    }

    #[must_use]
    pub fn snapshot(&self, now: OffsetDateTime) -> JobSnapshot {
        let elapsed_seconds = (now - self.started_at).as_seconds_f64().max(0.0);
        let percent = self.percent;
        let eta_seconds = if percent > 0 && self.phase != Phase::Error {
            Some((elapsed_seconds * (100.0 / f64::from(percent) - 1.0)).max(0.0))
        } else {
            None
        };

        let (files, failure) = match &self.outcome {
            Some(JobOutcome::Completed { artifacts }) => (
                artifacts
                    .iter()
                    .map(|artifact| artifact.descriptor.clone())
                    .collect(),
                None,
            ),
            Some(JobOutcome::Failed(failure)) => (Vec::new(), Some(failure.clone())),
            None => (Vec::new(), None),
        };

        JobSnapshot {
            task_id: self.job_id,
            status: self.phase,
            message: self.message.clone(),
            percent,
            elapsed_seconds,
            eta_seconds,
            cache_hits: self.cache_hits.clone(),
            details: self.fetch_steps.clone(),
            cancelled: self.cancelled,
            started_at: self.started_at.unix_timestamp(),
            files,
            failure,
        }
    }
}

/// Point-in-time copy handed to pollers.
#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSnapshot {
    pub task_id: JobId,
    pub status: Phase,
    pub message: String,
    pub percent: u8,
    pub elapsed_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_seconds: Option<f64>,
    pub cache_hits: BTreeMap<DatasetKind, bool>,
    pub details: BTreeMap<DatasetKind, u8>,
    pub cancelled: bool,
    pub started_at: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<ArtifactDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<JobFailure>,
}
