//! Offline authoring of SMPLX body poses.

use {
    crate::{
        error::LoadError,
        pose::{BoneRotation, Pose, PoseLibrary},
        rotation::Euler,
        skeleton::JointDesc,
    },
    std::{collections::HashMap, path::Path},
};

/// Body joints of the SMPLX rig in authoring order.
/// `root` is left out, it is driven by the rotation slider.
pub const SMPLX_BODY_BONES: [&str; 23] = [
    "pelvis",
    "left_hip",
    "left_knee",
    "left_ankle",
    "left_foot",
    "right_hip",
    "right_knee",
    "right_ankle",
    "right_foot",
    "spine1",
    "spine2",
    "spine3",
    "left_collar",
    "left_shoulder",
    "left_elbow",
    "left_wrist",
    "neck",
    "head",
    "jaw",
    "right_collar",
    "right_shoulder",
    "right_elbow",
    "right_wrist",
];

fn chain(names: &[&str]) -> JointDesc {
    let mut iter = names.iter().rev();
    let mut joint = match iter.next() {
        Some(name) => JointDesc::new(*name),
        None => return JointDesc::new(""),
    };
    for name in iter {
        joint = JointDesc::new(*name).with_child(joint);
    }
    joint
}

/// Body hierarchy of the SMPLX rig, without fingers and eyes.
pub fn smplx_body_skeleton() -> JointDesc {
    let spine3 = JointDesc::new("spine3")
        .with_child(chain(&["neck", "head", "jaw"]))
        .with_child(chain(&[
            "left_collar",
            "left_shoulder",
            "left_elbow",
            "left_wrist",
        ]))
        .with_child(chain(&[
            "right_collar",
            "right_shoulder",
            "right_elbow",
            "right_wrist",
        ]));

    let pelvis = JointDesc::new("pelvis")
        .with_child(chain(&["left_hip", "left_knee", "left_ankle", "left_foot"]))
        .with_child(chain(&[
            "right_hip",
            "right_knee",
            "right_ankle",
            "right_foot",
        ]))
        .with_child(
            JointDesc::new("spine1")
                .with_child(JointDesc::new("spine2").with_child(spine3)),
        );

    JointDesc::new("root").with_child(pelvis)
}

fn keys(entries: &[(&str, [f32; 3])]) -> Vec<BoneRotation> {
    entries
        .iter()
        .map(|&(bone, rotation)| BoneRotation::new(bone, rotation.into()))
        .collect()
}

/// Hand-authored key rotations of the stock poses.
pub fn key_poses() -> Vec<(&'static str, Vec<BoneRotation>)> {
    vec![
        (
            "Pose_ArmsUp",
            keys(&[
                ("left_shoulder", [0.0, 0.0, -85.0]),
                ("right_shoulder", [0.0, 0.0, 85.0]),
                ("left_elbow", [0.0, 0.0, -15.0]),
                ("right_elbow", [0.0, 0.0, 15.0]),
            ]),
        ),
        (
            "Pose_Surprised",
            keys(&[
                ("left_shoulder", [0.0, 0.0, -70.0]),
                ("right_shoulder", [0.0, 0.0, 70.0]),
                ("left_elbow", [0.0, 0.0, -20.0]),
                ("right_elbow", [0.0, 0.0, 20.0]),
                ("left_wrist", [-60.0, 0.0, 0.0]),
                ("right_wrist", [-60.0, 0.0, 0.0]),
                ("left_hip", [-20.0, 0.0, 0.0]),
                ("right_hip", [-20.0, 0.0, 0.0]),
                ("left_knee", [40.0, 0.0, 0.0]),
                ("right_knee", [40.0, 0.0, 0.0]),
            ]),
        ),
        (
            "Pose_Running",
            keys(&[
                ("spine1", [25.0, 0.0, 0.0]),
                ("left_hip", [-60.0, 5.0, 0.0]),
                ("right_hip", [45.0, -5.0, 0.0]),
                ("left_knee", [85.0, 0.0, 0.0]),
                ("right_knee", [15.0, 0.0, 0.0]),
                ("left_shoulder", [30.0, 0.0, 75.0]),
                ("right_shoulder", [-70.0, 0.0, -75.0]),
                ("left_elbow", [100.0, 20.0, 0.0]),
                ("right_elbow", [13.0, 0.0, -30.0]),
                ("left_collar", [10.0, 0.0, 0.0]),
                ("left_wrist", [30.0, 0.0, 0.0]),
            ]),
        ),
        (
            "Pose_SideKick",
            keys(&[
                ("pelvis", [0.0, 0.0, -35.0]),
                ("spine1", [0.0, 0.0, -20.0]),
                ("left_hip", [0.0, 0.0, -45.0]),
                ("right_hip", [0.0, 0.0, 33.0]),
                ("left_knee", [0.0, 0.0, -10.0]),
                ("right_knee", [20.0, 0.0, 0.0]),
                ("left_shoulder", [0.0, 0.0, 80.0]),
                ("right_shoulder", [0.0, 0.0, -77.0]),
                ("left_elbow", [0.0, 0.0, 10.0]),
                ("right_elbow", [0.0, 0.0, 20.0]),
            ]),
        ),
        (
            "Pose_Sitting",
            keys(&[
                ("spine1", [30.0, 0.0, 0.0]),
                ("left_hip", [-90.0, 3.0, 0.0]),
                ("right_hip", [-90.0, -3.0, 0.0]),
                ("left_knee", [90.0, 0.0, 0.0]),
                ("right_knee", [90.0, 0.0, 0.0]),
                ("left_shoulder", [-10.0, 0.0, 75.0]),
                ("right_shoulder", [-10.0, 0.0, -75.0]),
                ("left_elbow", [0.0, 30.0, 0.0]),
                ("right_elbow", [0.0, -30.0, 0.0]),
            ]),
        ),
        (
            "Pose_T_Pose",
            keys(&[
                ("left_shoulder", [0.0, 0.0, 0.0]),
                ("right_shoulder", [0.0, 0.0, 0.0]),
            ]),
        ),
    ]
}

/// Turns sparse key rotations into a full-body pose.
///
/// Result lists every bone of `SMPLX_BODY_BONES` in that order. Bones
/// without a key get zero rotation, keys for other bones are dropped.
pub fn expand_key_pose(name: &str, keys: &[BoneRotation]) -> Pose {
    let keyed: HashMap<&str, Euler, ahash::RandomState> = keys
        .iter()
        .map(|key| (key.bone.as_str(), key.rotation))
        .collect();

    for key in keys {
        if !SMPLX_BODY_BONES.contains(&key.bone.as_str()) {
            tracing::warn!("Pose '{}' keys unknown bone '{}'", name, key.bone);
        }
    }

    Pose {
        name: name.to_owned(),
        bones: SMPLX_BODY_BONES
            .iter()
            .map(|&bone| {
                let rotation = keyed.get(bone).copied().unwrap_or(Euler::ZERO);
                BoneRotation::new(bone, rotation)
            })
            .collect(),
    }
}

/// Full-body versions of all stock poses.
pub fn build_library() -> PoseLibrary {
    PoseLibrary::new(
        key_poses()
            .iter()
            .map(|(name, keys)| expand_key_pose(name, keys))
            .collect(),
    )
}

/// Writes stock pose library to `path`.
pub fn write_library(path: &Path) -> Result<PoseLibrary, LoadError> {
    let library = build_library();
    library.save(path)?;
    tracing::info!(
        "Created {} full body pose assets in '{}'",
        library.len(),
        path.display()
    );
    Ok(library)
}
