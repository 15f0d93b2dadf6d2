use {
    crate::{
        bone_map::BoneMap,
        error::PoseError,
        mode::{Mode, PanelSet},
        pose::{apply_pose, reset_pose, ApplyReport, Pose, PoseLibrary},
        rotation::Euler,
        skeleton::{LocalRotation, Skeleton},
    },
    hecs::{Entity, World},
    std::cell::Cell,
};

/// How the controller finds its special joints and poses.
#[derive(Clone, Debug)]
pub struct ControllerSettings {
    /// Joint rotated by the root slider, if assigned up front.
    pub root: Option<Entity>,

    /// Names tried in order when `root` is not assigned.
    pub root_fallbacks: Vec<String>,

    /// Name of the library pose applied when entering shape mode.
    pub rest_pose: Option<String>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        ControllerSettings {
            root: None,
            root_fallbacks: default_root_fallbacks(),
            rest_pose: None,
        }
    }
}

pub fn default_root_fallbacks() -> Vec<String> {
    vec!["root".to_owned(), "m_avg_root".to_owned()]
}

/// Step of a mode switch, in the order they happen.
#[derive(Clone, Debug, PartialEq)]
pub enum ModeStep {
    /// Rest pose was written to the skeleton.
    RestPoseApplied(ApplyReport),

    /// Panels of the new mode became visible.
    PanelsShown(Mode),
}

/// Applies poses to a character and switches editing modes.
///
/// All methods are meant to be called from UI callbacks on the update
/// thread. None of them blocks, and failures only produce diagnostics.
pub struct PoseController {
    settings: ControllerSettings,
    skeleton: Option<Skeleton>,
    map: BoneMap,
    root: Option<Entity>,
    library: Option<PoseLibrary>,
    rest_pose: Option<Pose>,
    panels: PanelSet,
    mode: Mode,
    warned_missing_skeleton: Cell<bool>,
}

impl PoseController {
    pub fn new(
        world: &mut World,
        skeleton: Option<Skeleton>,
        library: Option<PoseLibrary>,
        panels: PanelSet,
        settings: ControllerSettings,
    ) -> Self {
        let rest_pose = match (&settings.rest_pose, &library) {
            (Some(name), Some(library)) => {
                let pose = library.find(name).cloned();
                if pose.is_none() {
                    tracing::warn!("Rest pose '{}' is not in the library", name);
                }
                pose
            }
            (Some(name), None) => {
                tracing::warn!("Rest pose '{}' requested without library", name);
                None
            }
            (None, _) => None,
        };

        let mut controller = PoseController {
            settings,
            skeleton: None,
            map: BoneMap::default(),
            root: None,
            library,
            rest_pose,
            panels,
            mode: Mode::Pose,
            warned_missing_skeleton: Cell::new(false),
        };

        controller.rebuild(world, skeleton);
        controller.panels.show(world, Mode::Pose);
        controller
    }

    /// Replaces the character skeleton and rebuilds the bone map.
    pub fn rebuild(&mut self, world: &World, skeleton: Option<Skeleton>) {
        self.map = BoneMap::build(world, skeleton.as_ref());
        self.skeleton = skeleton;
        self.warned_missing_skeleton.set(false);

        let explicit = self
            .settings
            .root
            .filter(|&root| world.get::<LocalRotation>(root).is_ok());
        self.root = if self.map.is_empty() && explicit.is_none() {
            None
        } else {
            self.map.resolve_root(explicit, &self.settings.root_fallbacks)
        };

        if let Some(library) = &self.library {
            library.validate(&self.map);
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn bone_map(&self) -> &BoneMap {
        &self.map
    }

    pub fn root(&self) -> Option<Entity> {
        self.root
    }

    pub fn skeleton(&self) -> Option<&Skeleton> {
        self.skeleton.as_ref()
    }

    pub fn library(&self) -> Option<&PoseLibrary> {
        self.library.as_ref()
    }

    pub fn panels(&self) -> &PanelSet {
        &self.panels
    }

    pub fn set_rest_pose(&mut self, pose: Option<Pose>) {
        self.rest_pose = pose;
    }

    /// Fails while there is no skeleton to pose.
    /// Logged on the first failure after each rebuild only.
    fn require_skeleton(&self) -> Result<(), PoseError> {
        if self.skeleton.is_some() && !self.map.is_empty() {
            return Ok(());
        }

        let err = PoseError::MissingReference {
            what: "Character skeleton",
        };
        if !self.warned_missing_skeleton.replace(true) {
            tracing::error!("{}, pose operations are ignored", err);
        }
        Err(err)
    }

    /// Applies `pose`. Does nothing without a skeleton.
    pub fn apply_pose(&self, world: &mut World, pose: &Pose) -> ApplyReport {
        match self.require_skeleton() {
            Ok(()) => apply_pose(world, pose, &self.map),
            Err(_) => ApplyReport::default(),
        }
    }

    /// Applies library pose at `index`.
    /// Rejected without touching the skeleton when index is out of range.
    pub fn apply_pose_by_index(
        &self,
        world: &mut World,
        index: isize,
    ) -> Result<ApplyReport, PoseError> {
        self.require_skeleton()?;

        let library = self.library.as_ref().ok_or_else(|| {
            let err = PoseError::MissingReference {
                what: "Pose library",
            };
            tracing::warn!("{}", err);
            err
        })?;

        let pose = library.get(index).map_err(|err| {
            tracing::warn!("Invalid pose index: {}", err);
            err
        })?;

        Ok(apply_pose(world, pose, &self.map))
    }

    pub fn apply_pose_named(
        &self,
        world: &mut World,
        name: &str,
    ) -> Option<ApplyReport> {
        self.require_skeleton().ok()?;

        match self.library.as_ref().and_then(|library| library.find(name)) {
            Some(pose) => Some(apply_pose(world, pose, &self.map)),
            None => {
                tracing::warn!("Pose '{}' not found", name);
                None
            }
        }
    }

    /// Replaces Y channel of the root joint rotation.
    /// X and Z channels are left exactly as they are.
    ///
    /// Returns new rotation, or `None` if there is no root joint.
    pub fn set_root_rotation(&self, world: &mut World, y: f32) -> Option<Euler> {
        let root = self.root?;
        let mut rotation = world.get_mut::<LocalRotation>(root).ok()?;
        rotation.0 = rotation.0.with_y(y);
        Some(rotation.0)
    }

    /// Zeroes all joints of the character.
    pub fn reset_pose(&self, world: &mut World) -> usize {
        if self.require_skeleton().is_err() {
            return 0;
        }

        let count = reset_pose(world, &self.map);
        tracing::info!("Reset {} joints to zero rotation", count);
        count
    }

    /// Switches between pose and shape/expression modes.
    ///
    /// Entering shape mode applies the rest pose first so that shapes are
    /// edited against known geometry. Leaving it applies nothing.
    pub fn toggle_mode(&mut self, world: &mut World) -> Result<Mode, PoseError> {
        self.toggle_mode_with(world, |_, _| {})
    }

    /// Same as `toggle_mode`, reporting each step to `on_step` right after
    /// it is done.
    pub fn toggle_mode_with<F>(
        &mut self,
        world: &mut World,
        mut on_step: F,
    ) -> Result<Mode, PoseError>
    where
        F: FnMut(&World, ModeStep),
    {
        if !self.panels.is_complete(world) {
            let err = PoseError::MissingReference {
                what: "Mode panel",
            };
            tracing::warn!("Cannot toggle mode: {}", err);
            return Err(err);
        }

        let next = self.mode.toggled();

        if next == Mode::ShapeExpression {
            if let Some(rest) = &self.rest_pose {
                if self.require_skeleton().is_ok() {
                    let report = apply_pose(world, rest, &self.map);
                    on_step(&*world, ModeStep::RestPoseApplied(report));
                }
            }
        }

        self.panels.show(world, next);
        on_step(&*world, ModeStep::PanelsShown(next));
        self.mode = next;
        tracing::info!("Switched to {:?} mode", next);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            mode::is_visible,
            skeleton::{JointDesc, Name},
        },
    };

    fn rig() -> JointDesc {
        JointDesc::new("root")
            .with_rotation(Euler::new(5.0, 10.0, 5.0))
            .with_child(
                JointDesc::new("pelvis")
                    .with_child(JointDesc::new("left_shoulder")),
            )
    }

    fn library() -> PoseLibrary {
        PoseLibrary::new(vec![
            Pose::new("Pose_ArmsUp")
                .with_bone("left_shoulder", Euler::new(0.0, 0.0, -85.0)),
            Pose::new("Pose_T_Pose")
                .with_bone("left_shoulder", Euler::ZERO),
        ])
    }

    fn setup(rest: Option<&str>) -> (World, PoseController) {
        let mut world = World::new();
        let skeleton = Skeleton::spawn(&mut world, &rig());
        let panels = PanelSet::spawn(&mut world);
        let controller = PoseController::new(
            &mut world,
            Some(skeleton),
            Some(library()),
            panels,
            ControllerSettings {
                rest_pose: rest.map(str::to_owned),
                ..ControllerSettings::default()
            },
        );
        (world, controller)
    }

    fn joint_rotation(world: &World, name: &str) -> Euler {
        let mut query = world.query::<(&Name, &LocalRotation)>();
        let found = query
            .iter()
            .find(|(_, (joint, _))| joint.0 == name)
            .map(|(_, (_, rotation))| rotation.0);
        found.unwrap()
    }

    fn rotation(world: &World, controller: &PoseController, name: &str) -> Euler {
        controller
            .skeleton()
            .and_then(|skeleton| skeleton.rotation(world, name))
            .unwrap()
    }

    #[test]
    fn starts_in_pose_mode() {
        let (world, controller) = setup(None);
        let panels = controller.panels();

        assert_eq!(controller.mode(), Mode::Pose);
        assert!(is_visible(&world, panels.pose.unwrap()));
        assert!(!is_visible(&world, panels.shape.unwrap()));
        assert!(!is_visible(&world, panels.expression.unwrap()));
    }

    #[test]
    fn root_slider_keeps_x_and_z() {
        let (mut world, controller) = setup(None);

        let out = controller.set_root_rotation(&mut world, 45.0);
        assert_eq!(out, Some(Euler::new(5.0, 45.0, 5.0)));
        assert_eq!(rotation(&world, &controller, "root"), Euler::new(5.0, 45.0, 5.0));
    }

    #[test]
    fn root_slider_without_root_is_ignored() {
        let mut world = World::new();
        let skeleton = Skeleton::spawn(&mut world, &JointDesc::new("hips"));
        let controller = PoseController::new(
            &mut world,
            Some(skeleton),
            None,
            PanelSet::default(),
            ControllerSettings::default(),
        );

        assert_eq!(controller.root(), None);
        assert_eq!(controller.set_root_rotation(&mut world, 30.0), None);
        assert_eq!(rotation(&world, &controller, "hips"), Euler::ZERO);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let (mut world, controller) = setup(None);

        for &index in &[-1, 2] {
            assert_eq!(
                controller.apply_pose_by_index(&mut world, index),
                Err(PoseError::OutOfRange { index, len: 2 })
            );
        }
        assert_eq!(rotation(&world, &controller, "left_shoulder"), Euler::ZERO);
    }

    #[test]
    fn entering_shape_mode_applies_rest_pose() {
        let (mut world, mut controller) = setup(Some("Pose_T_Pose"));

        controller.apply_pose_by_index(&mut world, 0).unwrap();
        assert_eq!(controller.toggle_mode(&mut world), Ok(Mode::ShapeExpression));
        assert_eq!(rotation(&world, &controller, "left_shoulder"), Euler::ZERO);

        controller.apply_pose_by_index(&mut world, 0).unwrap();
        assert_eq!(controller.toggle_mode(&mut world), Ok(Mode::Pose));
        assert_eq!(
            rotation(&world, &controller, "left_shoulder"),
            Euler::new(0.0, 0.0, -85.0)
        );
    }

    #[test]
    fn rest_pose_lands_before_panels_switch() {
        let (mut world, mut controller) = setup(Some("Pose_T_Pose"));
        controller.apply_pose_by_index(&mut world, 0).unwrap();
        let panels = controller.panels().clone();

        let mut steps = Vec::new();
        controller
            .toggle_mode_with(&mut world, |world, step| {
                let shoulder = joint_rotation(world, "left_shoulder");
                let shape_shown = is_visible(world, panels.shape.unwrap());
                steps.push((step, shoulder, shape_shown));
            })
            .unwrap();

        assert_eq!(steps.len(), 2);
        match &steps[0] {
            (ModeStep::RestPoseApplied(report), shoulder, shape_shown) => {
                assert_eq!(report.applied, 1);
                assert_eq!(*shoulder, Euler::ZERO);
                assert!(!shape_shown);
            }
            other => panic!("Unexpected first step {:?}", other),
        }
        assert_eq!(
            steps[1],
            (ModeStep::PanelsShown(Mode::ShapeExpression), Euler::ZERO, true)
        );

        steps.clear();
        controller
            .toggle_mode_with(&mut world, |_, step| {
                steps.push((step, Euler::ZERO, false))
            })
            .unwrap();
        assert_eq!(
            steps,
            [(ModeStep::PanelsShown(Mode::Pose), Euler::ZERO, false)]
        );
    }

    #[test]
    fn missing_skeleton_turns_posing_into_no_op() {
        let mut world = World::new();
        let panels = PanelSet::spawn(&mut world);
        let mut controller = PoseController::new(
            &mut world,
            None,
            Some(library()),
            panels,
            ControllerSettings {
                rest_pose: Some("Pose_T_Pose".to_owned()),
                ..ControllerSettings::default()
            },
        );
        let missing = PoseError::MissingReference {
            what: "Character skeleton",
        };

        for _ in 0..3 {
            assert_eq!(
                controller.apply_pose_by_index(&mut world, 0),
                Err(missing.clone())
            );
        }
        assert_eq!(controller.apply_pose_named(&mut world, "Pose_ArmsUp"), None);
        assert_eq!(
            controller.apply_pose(&mut world, &library().poses[0]),
            ApplyReport::default()
        );
        assert_eq!(controller.reset_pose(&mut world), 0);
        assert_eq!(controller.set_root_rotation(&mut world, 10.0), None);

        let mut steps = Vec::new();
        assert_eq!(
            controller.toggle_mode_with(&mut world, |_, step| steps.push(step)),
            Ok(Mode::ShapeExpression)
        );
        assert_eq!(steps, [ModeStep::PanelsShown(Mode::ShapeExpression)]);

        let skeleton = Skeleton::spawn(&mut world, &rig());
        controller.rebuild(&world, Some(skeleton));
        assert_eq!(
            controller.apply_pose_by_index(&mut world, 0).map(|r| r.applied),
            Ok(1)
        );
    }

    #[test]
    fn toggle_requires_panels() {
        let mut world = World::new();
        let mut controller = PoseController::new(
            &mut world,
            None,
            None,
            PanelSet::default(),
            ControllerSettings::default(),
        );

        assert!(controller.toggle_mode(&mut world).is_err());
        assert_eq!(controller.mode(), Mode::Pose);
    }

    #[test]
    fn rebuild_tracks_new_skeleton() {
        let (mut world, mut controller) = setup(None);
        let old = controller.skeleton().cloned().unwrap();
        old.despawn(&mut world);

        let skeleton = Skeleton::spawn(
            &mut world,
            &JointDesc::new("m_avg_root").with_child(JointDesc::new("left_shoulder")),
        );
        controller.rebuild(&world, Some(skeleton));

        assert_eq!(controller.bone_map().len(), 2);
        assert!(controller.root().is_some());
        let report = controller.apply_pose_by_index(&mut world, 0).unwrap();
        assert_eq!(report.applied, 1);
    }
}
