use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use fixmath::Fixed;
use netsync::SyncConfig;
use physics::{checkpoint, Checkpoint};
use serde::{Deserialize, Serialize};

/// Everything about a run that is not a CLI knob, loadable from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub sync: SyncConfig,
    /// Checkpoints evenly spaced on a ring around the track centre.
    pub checkpoint_count: u8,
    pub checkpoint_ring_radius: Fixed,
    pub checkpoint_radius: Fixed,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            checkpoint_count: 8,
            checkpoint_ring_radius: Fixed::from_int(40),
            checkpoint_radius: Fixed::from_int(6),
        }
    }
}

impl SimConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents).context("parse config json")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.checkpoint_count == 0 {
            anyhow::bail!("checkpoint_count must be at least 1");
        }
        if self.checkpoint_ring_radius >= self.sync.physics.wall_radius {
            anyhow::bail!(
                "checkpoint ring radius {} lies outside the wall at {}",
                self.checkpoint_ring_radius,
                self.sync.physics.wall_radius
            );
        }
        if self.sync.physics.dt <= Fixed::ZERO {
            anyhow::bail!("physics dt must be positive");
        }
        Ok(())
    }

    pub fn checkpoints(&self) -> Vec<Checkpoint> {
        checkpoint::ring(
            self.checkpoint_count,
            self.checkpoint_ring_radius,
            self.checkpoint_radius,
        )
    }
}
