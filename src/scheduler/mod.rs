mod eligibility;
mod locks;
mod orchestrate;
mod seed;
mod types;
mod util;
mod weekly;

pub use eligibility::{eligible_members, partition, Partition};
pub use orchestrate::plan_run;
pub use types::{EngineOptions, LeaveCyclePolicy, RotaError, RunRequest};
pub use weekly::{assign_week, WeekContext, WeekOutcome};

use crate::model::{GenerationId, GenerationRun, Roster};
use crate::storage::RotaLedger;
use locks::{poisoned, RunLocks};
use std::sync::Mutex;

/// RotaEngine : génère des runs et les publie dans un registre.
///
/// Une génération s'exécute sous le verrou de son `generation_id` ; deux
/// demandes sur le même identifiant sont sérialisées, des identifiants
/// différents avancent en parallèle. Le registre n'est touché qu'une fois,
/// au commit final.
#[derive(Debug)]
pub struct RotaEngine<L: RotaLedger> {
    ledger: Mutex<L>,
    options: EngineOptions,
    locks: RunLocks,
}

impl<L: RotaLedger> RotaEngine<L> {
    pub fn new(ledger: L, options: EngineOptions) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            options,
            locks: RunLocks::default(),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// (Re)génère entièrement le run `request.generation_id`.
    ///
    /// En cas d'échec le registre garde ce qu'il contenait avant l'appel.
    pub fn generate(
        &self,
        roster: &Roster,
        request: &RunRequest,
    ) -> Result<GenerationRun, RotaError> {
        let slot = self.locks.slot(&request.generation_id)?;
        let _writer = slot.lock().map_err(|_| poisoned("generation lock"))?;

        let run = plan_run(roster, request, &self.options)?;

        let mut ledger = self.ledger.lock().map_err(|_| poisoned("ledger"))?;
        ledger.replace_run(&run).map_err(RotaError::IntegrityFailure)?;
        tracing::info!(
            generation = %run.generation_id,
            weeks = run.weeks.len(),
            "rota committed"
        );
        Ok(run)
    }

    pub fn run(&self, id: &GenerationId) -> Result<Option<GenerationRun>, RotaError> {
        let ledger = self.ledger.lock().map_err(|_| poisoned("ledger"))?;
        Ok(ledger.load_run(id)?)
    }

    pub fn delete(&self, id: &GenerationId) -> Result<bool, RotaError> {
        let slot = self.locks.slot(id)?;
        let _writer = slot.lock().map_err(|_| poisoned("generation lock"))?;
        let mut ledger = self.ledger.lock().map_err(|_| poisoned("ledger"))?;
        ledger.delete_run(id).map_err(RotaError::IntegrityFailure)
    }

    pub fn run_ids(&self) -> Result<Vec<GenerationId>, RotaError> {
        let ledger = self.ledger.lock().map_err(|_| poisoned("ledger"))?;
        Ok(ledger.run_ids()?)
    }

    pub fn into_ledger(self) -> Result<L, RotaError> {
        self.ledger.into_inner().map_err(|_| poisoned("ledger"))
    }
}
