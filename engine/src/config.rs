use {
    crate::{
        clothing::GarmentConfig, controller::default_root_fallbacks,
        skeleton::SkeletonSource,
    },
    eyre::{Report, WrapErr},
    std::path::{Path, PathBuf},
};

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    /// Character rig.
    pub skeleton: SkeletonSource,

    /// Pose library file.
    pub poses: PathBuf,

    /// Name of the pose applied before shape editing.
    #[serde(default)]
    pub rest_pose: Option<String>,

    /// Joint rotated by the root slider.
    #[serde(default)]
    pub root_bone: Option<String>,

    #[serde(default = "default_root_fallbacks")]
    pub root_fallbacks: Vec<String>,

    #[serde(default)]
    pub garments: Vec<GarmentConfig>,
}

impl Config {
    pub fn load_default() -> Result<Self, Report> {
        // Load from predefined file path for desktop platforms.
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

        // Relative paths are relative to the config file.
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    /// Resolves relative asset paths against `base`.
    pub fn rebase(&mut self, base: &Path) {
        if self.poses.is_relative() {
            self.poses = base.join(&self.poses);
        }
        if let SkeletonSource::File(path) = &mut self.skeleton {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Names tried for the root joint, explicit one first.
    pub fn root_candidates(&self) -> Vec<String> {
        self.root_bone
            .iter()
            .chain(&self.root_fallbacks)
            .cloned()
            .collect()
    }
}
