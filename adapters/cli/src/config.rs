use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use orbital_conquest_system_navigation::PlannerConfig;

/// Loads the planner configuration, falling back to defaults without a path.
pub(crate) fn load_planner_config(path: Option<&Path>) -> Result<PlannerConfig> {
    let Some(path) = path else {
        return Ok(PlannerConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read planner config {}", path.display()))?;
    let config: PlannerConfig = toml::from_str(&contents)
        .with_context(|| format!("failed to parse planner config {}", path.display()))?;

    if config.band_half_width <= 0.0 || config.axis_tolerance < 0.0 {
        bail!(
            "planner config {} has invalid simplification tolerances",
            path.display()
        );
    }

    Ok(config)
}
