use {
    crate::{
        bone_map::BoneMap,
        error::{LoadError, PoseError},
        rotation::Euler,
        skeleton::LocalRotation,
    },
    hecs::World,
    std::path::Path,
};

/// Rotation assigned to a single bone, addressed by name.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoneRotation {
    pub bone: String,
    pub rotation: Euler,
}

impl BoneRotation {
    pub fn new(bone: impl Into<String>, rotation: Euler) -> Self {
        BoneRotation {
            bone: bone.into(),
            rotation,
        }
    }
}

/// Sparse set of bone rotations.
///
/// Bones not listed keep whatever rotation they currently have.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pose {
    pub name: String,
    pub bones: Vec<BoneRotation>,
}

impl Pose {
    pub fn new(name: impl Into<String>) -> Self {
        Pose {
            name: name.into(),
            bones: Vec::new(),
        }
    }

    pub fn with_bone(mut self, bone: impl Into<String>, rotation: Euler) -> Self {
        self.bones.push(BoneRotation::new(bone, rotation));
        self
    }
}

/// Outcome of a pose application.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApplyReport {
    /// Number of joints written.
    pub applied: usize,

    /// Bone names without matching joint, in pose order.
    pub unresolved: Vec<String>,
}

impl ApplyReport {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = PoseError> + '_ {
        self.unresolved
            .iter()
            .map(|name| PoseError::UnresolvedName { name: name.clone() })
    }
}

/// Overwrites local rotations of joints listed in `pose`.
///
/// Entries are processed in pose order. Unknown bones are reported and
/// skipped. There is no rollback, writes made before a failure stay.
pub fn apply_pose(world: &mut World, pose: &Pose, map: &BoneMap) -> ApplyReport {
    let mut report = ApplyReport::default();

    for entry in &pose.bones {
        let joint = map.get(&entry.bone).and_then(|joint| {
            world.get_mut::<LocalRotation>(joint).ok()
        });

        match joint {
            Some(mut rotation) => {
                rotation.0 = entry.rotation;
                report.applied += 1;
            }
            None => {
                let err = PoseError::UnresolvedName {
                    name: entry.bone.clone(),
                };
                tracing::warn!("{}", err);
                report.unresolved.push(entry.bone.clone());
            }
        }
    }

    tracing::debug!(
        "Pose '{}' applied to {} bones, {} unresolved",
        pose.name,
        report.applied,
        report.unresolved.len()
    );
    report
}

/// Sets every mapped joint to zero rotation.
pub fn reset_pose(world: &mut World, map: &BoneMap) -> usize {
    let mut count = 0;
    for joint in map.entities() {
        if let Ok(mut rotation) = world.get_mut::<LocalRotation>(joint) {
            rotation.0 = Euler::ZERO;
            count += 1;
        }
    }
    count
}

/// Ordered list of poses selectable by index.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PoseLibrary {
    pub poses: Vec<Pose>,
}

impl PoseLibrary {
    pub fn new(poses: Vec<Pose>) -> Self {
        PoseLibrary { poses }
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Bounds-checked access. Negative indices are rejected.
    pub fn get(&self, index: isize) -> Result<&Pose, PoseError> {
        let out_of_range = PoseError::OutOfRange {
            index,
            len: self.poses.len(),
        };

        if index < 0 {
            return Err(out_of_range);
        }
        self.poses.get(index as usize).ok_or(out_of_range)
    }

    pub fn find(&self, name: &str) -> Option<&Pose> {
        self.poses.iter().find(|pose| pose.name == name)
    }

    /// Lists bones of each pose that `map` cannot resolve.
    /// Poses that resolve fully are omitted.
    pub fn validate<'a>(&'a self, map: &BoneMap) -> Vec<(&'a str, Vec<&'a str>)> {
        self.poses
            .iter()
            .filter_map(|pose| {
                let missing: Vec<&str> = pose
                    .bones
                    .iter()
                    .filter(|entry| !map.contains(&entry.bone))
                    .map(|entry| entry.bone.as_str())
                    .collect();

                if missing.is_empty() {
                    None
                } else {
                    tracing::warn!(
                        "Pose '{}' references unknown bones {:?}",
                        pose.name,
                        missing
                    );
                    Some((pose.name.as_str(), missing))
                }
            })
            .collect()
    }

    #[tracing::instrument]
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;

        let library: PoseLibrary =
            ron::de::from_reader(file).map_err(|source| LoadError::Parse {
                path: path.to_owned(),
                source,
            })?;

        tracing::info!("Loaded {} poses", library.len());
        Ok(library)
    }

    #[tracing::instrument(skip(self))]
    pub fn save(&self, path: &Path) -> Result<(), LoadError> {
        let text = ron::ser::to_string_pretty(self, Default::default())
            .map_err(|source| LoadError::Serialize { source })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| LoadError::Io {
                path: parent.to_owned(),
                source,
            })?;
        }

        std::fs::write(path, text).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })
    }
}
