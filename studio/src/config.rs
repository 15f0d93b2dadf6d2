use {
    eyre::{ensure, Report, WrapErr},
    std::path::{Path, PathBuf},
};

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    pub engine: mannequin::config::Config,

    #[serde(default)]
    pub studio: StudioConfig,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct StudioConfig {
    /// Seconds advanced by `tick` without argument.
    #[serde(default = "default_frame_time")]
    pub frame_time: f32,

    #[serde(default = "default_beta_range")]
    pub beta_range: [f32; 2],

    #[serde(default = "default_expression_range")]
    pub expression_range: [f32; 2],
}

impl Default for StudioConfig {
    fn default() -> Self {
        StudioConfig {
            frame_time: default_frame_time(),
            beta_range: default_beta_range(),
            expression_range: default_expression_range(),
        }
    }
}

impl Config {
    pub fn load_default() -> Result<Self, Report> {
        let path = std::env::var("MANNEQUIN_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./cfg.ron"));

        Self::load(&path)
    }

    #[tracing::instrument]
    pub fn load(path: &Path) -> Result<Self, Report> {
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("Failed to open '{}'", path.display()))?;

        let mut config: Config = ron::de::from_reader(file)
            .wrap_err_with(|| format!("Failed to parse '{}'", path.display()))?;

        if let Some(base) = path.parent() {
            config.engine.rebase(base);
        }

        let studio = &config.studio;
        ensure!(
            studio.frame_time.is_finite() && studio.frame_time > 0.0,
            "Frame time must be positive, got {}",
            studio.frame_time
        );
        for range in &[studio.beta_range, studio.expression_range] {
            ensure!(range[0] <= range[1], "Invalid slider range {:?}", range);
        }

        Ok(config)
    }
}

fn default_frame_time() -> f32 {
    1.0 / 60.0
}

fn default_beta_range() -> [f32; 2] {
    let range = mannequin::blendshape::BETA_RANGE;
    [*range.start(), *range.end()]
}

fn default_expression_range() -> [f32; 2] {
    let range = mannequin::blendshape::EXPRESSION_RANGE;
    [*range.start(), *range.end()]
}
