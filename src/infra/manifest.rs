// ============================================================
// Layer 6 — Run Manifest
// ============================================================
// Records what an `assemble` run produced so a later training
// run can rebuild the exact same batches:
//
//   <output_dir>/
//     vocabulary.json   ← written by VocabularyStore
//     manifest.json     ← config + discovery report + split sizes
//
// The config is stored in full (seed, batch size, target size,
// shuffle buffer), which together with the sorted sample order
// makes every epoch's batch sequence reproducible.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::application::assemble_use_case::DatasetConfig;
use crate::data::loader::AssemblyReport;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub config:            DatasetConfig,
    pub report:            AssemblyReport,
    pub vocabulary_size:   usize,
    pub blank_id:          u32,
    pub train_samples:     usize,
    pub val_samples:       usize,
    pub train_batches:     usize,
    pub val_batches:       usize,
    /// Samples skipped by the failure policy, summed over every pass
    pub skipped_samples:   usize,
    /// Samples whose label is longer than the CTC time axis
    pub infeasible_labels: usize,
}

pub struct ManifestStore {
    dir: PathBuf,
}

impl ManifestStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join("manifest.json")
    }

    pub fn save(&self, manifest: &RunManifest) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        let path = self.path();
        fs::write(&path, serde_json::to_string_pretty(manifest)?)
            .with_context(|| format!("Cannot write manifest to '{}'", path.display()))?;
        tracing::debug!("Saved run manifest to '{}'", path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<RunManifest> {
        let path = self.path();
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read manifest from '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::DropReason;

    #[test]
    fn test_manifest_survives_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = AssemblyReport { found: 5, used: 3, ..Default::default() };
        report.dropped.insert(DropReason::MissingTranscript, 2);
        report.misaligned_pages.push("page_2".into());

        let manifest = RunManifest {
            config:            DatasetConfig::default(),
            report,
            vocabulary_size:   41,
            blank_id:          40,
            train_samples:     3,
            val_samples:       0,
            train_batches:     1,
            val_batches:       0,
            skipped_samples:   0,
            infeasible_labels: 0,
        };

        let store = ManifestStore::new(dir.path());
        store.save(&manifest).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.report, manifest.report);
        assert_eq!(loaded.config.seed, manifest.config.seed);
        assert_eq!(loaded.blank_id, 40);
    }
}
