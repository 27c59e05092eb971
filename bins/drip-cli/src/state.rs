//! On-disk simulation state: engine snapshot, ledger, and chain height.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use drip_core::ledger::{ManualClock, MemoryLedger};
use drip_core::traits::BlockClock;
use drip_minter::{Minter, MinterSnapshot};
use serde::{Deserialize, Serialize};

pub type CliMinter = Minter<MemoryLedger, ManualClock>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub minter: MinterSnapshot,
    pub ledger: MemoryLedger,
    /// Simulated chain height.
    pub block: u64,
}

impl State {
    pub fn from_minter(minter: CliMinter) -> Self {
        let snapshot = minter.snapshot();
        let (ledger, clock) = minter.into_parts();
        Self {
            minter: snapshot,
            ledger,
            block: clock.current_block(),
        }
    }

    pub fn into_minter(self) -> Result<CliMinter> {
        Minter::restore(self.minter, self.ledger, ManualClock::at(self.block))
            .context("State file holds an invalid minter snapshot")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize state")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write state file: {}", path.display()))
    }
}

/// Resolve the state file path, using the default if not provided.
pub fn resolve_state_path(path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(p) = path {
        return Ok(p);
    }
    let data = dirs::data_dir().context("Could not determine data directory")?;
    Ok(data.join("drip").join("state.json"))
}
