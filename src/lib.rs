#![forbid(unsafe_code)]
//! Rota : moteur de planning hebdomadaire pour petite équipe d'exploitation.
//!
//! - Quatre créneaux : journée (Morning), soirée, nuit, repos post-nuit.
//! - Rotation déterministe sur un cycle de 6 semaines, équité par compteurs.
//! - Congés, exemptions, repos obligatoire après une nuit.
//! - Un run est calculé en mémoire puis publié d'un bloc dans le registre.

pub mod io;
pub mod leave;
pub mod model;
pub mod scheduler;
pub mod storage;
pub mod summary;

pub use leave::LeaveError;
pub use model::{
    ExemptionLevel, GenerationId, GenerationRun, LeaveId, LeavePeriod, Member, MemberId, Roster,
    RotationState, ShiftCounts, ShiftType, WeekAssignment,
};
pub use scheduler::{EngineOptions, LeaveCyclePolicy, RotaEngine, RotaError, RunRequest};
pub use storage::{JsonLedger, MemoryLedger, RotaLedger};
pub use summary::{fairness_report, FairnessReport, FairnessRow};
