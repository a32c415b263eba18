use crate::model::{GenerationId, MemberId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Traitement de l'index de cycle d'un membre absent toute la semaine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveCyclePolicy {
    /// L'état du membre absent n'est pas touché.
    #[default]
    Freeze,
    /// La semaine manquée est consommée : l'index avance, les compteurs non.
    Advance,
}

/// Options du moteur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub week_duration_days: u32,
    pub minimum_pool_size: usize,
    pub morning_floor: usize,
    pub leave_policy: LeaveCyclePolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            week_duration_days: 7,
            minimum_pool_size: 3,
            morning_floor: 2,
            leave_policy: LeaveCyclePolicy::Freeze,
        }
    }
}

impl EngineOptions {
    pub fn validate(&self) -> Result<(), RotaError> {
        if self.week_duration_days == 0 {
            return Err(RotaError::Configuration(
                "week_duration_days must be > 0".into(),
            ));
        }
        if self.minimum_pool_size == 0 {
            return Err(RotaError::Configuration(
                "minimum_pool_size must be > 0".into(),
            ));
        }
        if self.morning_floor == 0 {
            return Err(RotaError::Configuration("morning_floor must be > 0".into()));
        }
        Ok(())
    }
}

/// Paramètres d'une demande de génération.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub generation_id: GenerationId,
    pub start_date: NaiveDate,
    pub week_count: u32,
    pub first_rest: Option<MemberId>,
}

impl RunRequest {
    pub fn new(generation_id: GenerationId, start_date: NaiveDate, week_count: u32) -> Self {
        Self {
            generation_id,
            start_date,
            week_count,
            first_rest: None,
        }
    }

    pub fn with_first_rest(mut self, member: MemberId) -> Self {
        self.first_rest = Some(member);
        self
    }
}

#[derive(Error, Debug)]
pub enum RotaError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("constraint violation for week starting {week_start}: {reason}")]
    ConstraintViolation { week_start: NaiveDate, reason: String },
    #[error("integrity failure: {0:#}")]
    IntegrityFailure(anyhow::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RotaError {
    pub(crate) fn constraint<S: Into<String>>(week_start: NaiveDate, reason: S) -> Self {
        RotaError::ConstraintViolation {
            week_start,
            reason: reason.into(),
        }
    }
}
