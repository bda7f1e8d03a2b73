use crate::camera::Camera;
use crate::game::{DEFAULT_GRID_SIZE, FOOD_REWARD, Rules};
use anyhow::{Context, ensure};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Keeps `limit` and the cell count well inside `i32`.
pub const MAX_GRID_SIZE: u32 = 1024;

/// Runtime configuration. Every field has a default so a partial JSON
/// file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid_size: u32,
    pub cell_size: f32,
    pub move_interval_ms: u64,
    pub food_reward: u32,
    pub window_width: u32,
    pub window_height: u32,
    pub camera: Camera,
    pub seed: Option<u64>,
    pub force_uniform_binding: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            cell_size: 1.0,
            move_interval_ms: 150,
            food_reward: FOOD_REWARD,
            window_width: 800,
            window_height: 600,
            camera: Camera::default(),
            seed: None,
            force_uniform_binding: false,
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_json::from_str(text).context("parsing config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads `path` if given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in config {}", path.display()))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.grid_size >= 4 && self.grid_size % 2 == 0,
            "grid_size must be even and at least 4, got {}",
            self.grid_size
        );
        ensure!(
            self.grid_size <= MAX_GRID_SIZE,
            "grid_size must be at most {MAX_GRID_SIZE}, got {}",
            self.grid_size
        );
        ensure!(self.cell_size > 0.0, "cell_size must be positive");
        ensure!(self.move_interval_ms > 0, "move_interval_ms must be positive");
        ensure!(
            self.window_width > 0 && self.window_height > 0,
            "window size must be non-zero"
        );
        ensure!(
            self.camera.near > 0.0 && self.camera.far > self.camera.near,
            "camera clip planes must satisfy 0 < near < far"
        );
        Ok(())
    }

    pub fn rules(&self) -> Rules {
        Rules {
            grid_size: self.grid_size,
            food_reward: self.food_reward,
        }
    }

    pub fn move_interval(&self) -> Duration {
        Duration::from_millis(self.move_interval_ms)
    }

    pub fn camera(&self) -> Camera {
        let mut cam = self.camera;
        cam.resize(self.window_width, self.window_height);
        cam
    }
}

#[derive(Debug, clap::Parser)]
#[command(name = "snake3d", version, about = "Snake on a 3D board")]
pub struct Cli {
    /// JSON config file
    #[arg(long, env = "SNAKE3D_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seed for food placement
    #[arg(long)]
    pub seed: Option<u64>,

    /// Skip push constants even when the adapter supports them
    #[arg(long)]
    pub uniform_binding: bool,
}

impl Cli {
    pub fn resolve(&self) -> anyhow::Result<Config> {
        let mut cfg = Config::load(self.config.as_deref())?;
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        cfg.force_uniform_binding |= self.uniform_binding;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_match_classic_board() {
        let cfg = Config::default();
        assert_eq!(cfg.grid_size, 12);
        assert_eq!(cfg.move_interval(), Duration::from_millis(150));
        assert_eq!(cfg.rules().food_reward, 10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = Config::from_json(r#"{ "grid_size": 20, "camera": { "distance": 40.0 } }"#)
            .expect("valid config");
        assert_eq!(cfg.grid_size, 20);
        assert_eq!(cfg.cell_size, 1.0);
        assert_eq!(cfg.camera.distance, 40.0);
        assert_eq!(cfg.camera.height, 15.0);
    }

    #[test]
    fn odd_grid_is_rejected() {
        let err = Config::from_json(r#"{ "grid_size": 11 }"#).unwrap_err();
        assert!(err.to_string().contains("grid_size"));
    }

    #[test]
    fn oversized_grid_is_rejected() {
        assert!(Config::from_json(r#"{ "grid_size": 1024 }"#).is_ok());
        let err = Config::from_json(r#"{ "grid_size": 1026 }"#).unwrap_err();
        assert!(err.to_string().contains("at most 1024"));
        assert!(Config::from_json(r#"{ "grid_size": 4294967294 }"#).is_err());
    }

    #[test]
    fn cli_resolve_fails_on_invalid_config_file() {
        let path = std::env::temp_dir().join(format!("snake3d-bad-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "grid_size": 7 }"#).expect("write temp config");
        let cli = Cli::parse_from(["snake3d", "--config", path.to_str().expect("utf-8 path")]);
        let err = cli.resolve().unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(format!("{err:#}").contains("grid_size"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Config::from_json("{ grid_size: ").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Config::load(Some(Path::new("/nonexistent/snake3d.json"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/snake3d.json"));
    }

    #[test]
    fn camera_aspect_follows_window() {
        let cfg = Config { window_width: 1000, window_height: 500, ..Config::default() };
        assert_eq!(cfg.camera().aspect, 2.0);
    }

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::parse_from(["snake3d", "--seed", "42", "--uniform-binding"]);
        let cfg = cli.resolve().expect("defaults");
        assert_eq!(cfg.seed, Some(42));
        assert!(cfg.force_uniform_binding);
    }
}
