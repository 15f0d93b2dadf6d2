pub mod authoring;
pub mod blendshape;
pub mod bone_map;
pub mod clocks;
pub mod clothing;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod mode;
pub mod pose;
pub mod rotation;
pub mod skeleton;

pub use {
    self::{
        bone_map::BoneMap,
        clocks::{ClockIndex, Clocks},
        controller::{ControllerSettings, ModeStep, PoseController},
        engine::{Engine, System, SystemContext},
        error::{LoadError, PoseError},
        mode::{Mode, PanelSet, Visible},
        pose::{apply_pose, ApplyReport, BoneRotation, Pose, PoseLibrary},
        rotation::Euler,
        skeleton::{JointDesc, LocalRotation, Name, Skeleton, SkeletonSource},
    },
    hecs,
};
