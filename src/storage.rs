use crate::model::{GenerationId, GenerationRun};
use anyhow::Context;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Registre des plannings générés (semaines + états de rotation).
pub trait RotaLedger {
    /// Charge le run stocké pour `id`, s'il existe.
    fn load_run(&self, id: &GenerationId) -> anyhow::Result<Option<GenerationRun>>;
    /// Remplace en un seul geste toutes les semaines et tous les états de `run`.
    fn replace_run(&mut self, run: &GenerationRun) -> anyhow::Result<()>;
    /// Supprime le run, renvoie `false` s'il n'existait pas.
    fn delete_run(&mut self, id: &GenerationId) -> anyhow::Result<bool>;
    fn run_ids(&self) -> anyhow::Result<Vec<GenerationId>>;
}

/// Registre en mémoire (tests, usage embarqué).
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    runs: BTreeMap<GenerationId, GenerationRun>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RotaLedger for MemoryLedger {
    fn load_run(&self, id: &GenerationId) -> anyhow::Result<Option<GenerationRun>> {
        Ok(self.runs.get(id).cloned())
    }

    fn replace_run(&mut self, run: &GenerationRun) -> anyhow::Result<()> {
        self.runs.insert(run.generation_id.clone(), run.clone());
        Ok(())
    }

    fn delete_run(&mut self, id: &GenerationId) -> anyhow::Result<bool> {
        Ok(self.runs.remove(id).is_some())
    }

    fn run_ids(&self) -> anyhow::Result<Vec<GenerationId>> {
        Ok(self.runs.keys().cloned().collect())
    }
}

/// Registre fichier JSON, réécrit de manière atomique à chaque modification.
///
/// Chaque écriture relit le fichier puis le remplace : deux handles sur le
/// même chemin voient les écritures l'un de l'autre tant qu'elles se
/// succèdent. Rien ne verrouille le fichier entre processus ; un seul
/// processus écrivain à la fois (l'exclusion par génération de `RotaEngine`
/// ne vaut que dans le processus). Deux `rota-cli generate` concurrents sur
/// le même registre peuvent perdre un run.
#[derive(Debug, Clone)]
pub struct JsonLedger {
    path: PathBuf,
}

impl JsonLedger {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> anyhow::Result<BTreeMap<GenerationId, GenerationRun>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let runs: Vec<GenerationRun> = serde_json::from_slice(&data)
            .with_context(|| format!("parsing ledger {}", self.path.display()))?;
        Ok(runs
            .into_iter()
            .map(|r| (r.generation_id.clone(), r))
            .collect())
    }

    fn write_all(&self, runs: &BTreeMap<GenerationId, GenerationRun>) -> anyhow::Result<()> {
        let all: Vec<&GenerationRun> = runs.values().collect();
        let json = serde_json::to_vec_pretty(&all)?;
        let mut tmp = NamedTempFile::new_in(ledger_dir(&self.path))
            .with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}

fn ledger_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

impl RotaLedger for JsonLedger {
    fn load_run(&self, id: &GenerationId) -> anyhow::Result<Option<GenerationRun>> {
        Ok(self.read_all()?.remove(id))
    }

    fn replace_run(&mut self, run: &GenerationRun) -> anyhow::Result<()> {
        let mut runs = self.read_all()?;
        runs.insert(run.generation_id.clone(), run.clone());
        self.write_all(&runs)
    }

    fn delete_run(&mut self, id: &GenerationId) -> anyhow::Result<bool> {
        let mut runs = self.read_all()?;
        if runs.remove(id).is_none() {
            return Ok(false);
        }
        self.write_all(&runs)?;
        Ok(true)
    }

    fn run_ids(&self) -> anyhow::Result<Vec<GenerationId>> {
        Ok(self.read_all()?.into_keys().collect())
    }
}
