use super::RotaError;
use crate::model::GenerationId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Un verrou d'écriture par génération.
#[derive(Debug, Default)]
pub(super) struct RunLocks {
    slots: Mutex<HashMap<GenerationId, Arc<Mutex<()>>>>,
}

impl RunLocks {
    pub(super) fn slot(&self, id: &GenerationId) -> Result<Arc<Mutex<()>>, RotaError> {
        let mut slots = self.slots.lock().map_err(|_| poisoned("run lock registry"))?;
        Ok(slots.entry(id.clone()).or_default().clone())
    }
}

pub(super) fn poisoned(what: &str) -> RotaError {
    RotaError::IntegrityFailure(anyhow::anyhow!("{what} poisoned by a panicked writer"))
}
