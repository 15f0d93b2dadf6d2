use {
    hecs::{Entity, World},
    smallvec::SmallVec,
};

/// Visibility flag of a panel or widget owned by the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visible(pub bool);

/// Editing mode of the front-end. Exactly one group of panels is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Pose buttons and root slider are shown.
    Pose,

    /// Shape and expression sliders are shown.
    ShapeExpression,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Pose
    }
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Pose => Mode::ShapeExpression,
            Mode::ShapeExpression => Mode::Pose,
        }
    }
}

/// Panels switched by the mode toggle.
#[derive(Clone, Debug, Default)]
pub struct PanelSet {
    pub pose: Option<Entity>,
    pub shape: Option<Entity>,
    pub expression: Option<Entity>,

    /// Widgets shown together with pose panel, e.g. clothing controls.
    pub pose_extras: SmallVec<[Entity; 2]>,
}

impl PanelSet {
    /// Spawns one entity per required panel.
    pub fn spawn(world: &mut World) -> Self {
        PanelSet {
            pose: Some(world.spawn((Visible(false),))),
            shape: Some(world.spawn((Visible(false),))),
            expression: Some(world.spawn((Visible(false),))),
            pose_extras: SmallVec::new(),
        }
    }

    pub fn with_pose_extra(mut self, widget: Entity) -> Self {
        self.pose_extras.push(widget);
        self
    }

    /// Checks that every required panel is assigned and still exists.
    pub fn is_complete(&self, world: &World) -> bool {
        let exists = |panel: &Option<Entity>| match panel {
            Some(panel) => world.get::<Visible>(*panel).is_ok(),
            None => false,
        };

        exists(&self.pose)
            && exists(&self.shape)
            && exists(&self.expression)
            && self
                .pose_extras
                .iter()
                .all(|&widget| world.get::<Visible>(widget).is_ok())
    }

    /// Makes panels of `mode` visible and hides the others.
    /// Unassigned panels are skipped.
    pub fn show(&self, world: &mut World, mode: Mode) {
        let pose = mode == Mode::Pose;

        let pose_group = self.pose.iter().chain(&self.pose_extras);
        for &panel in pose_group {
            set_visible(world, panel, pose);
        }

        for &panel in self.shape.iter().chain(&self.expression) {
            set_visible(world, panel, !pose);
        }
    }
}

pub fn set_visible(world: &mut World, entity: Entity, visible: bool) {
    match world.get_mut::<Visible>(entity) {
        Ok(mut flag) => flag.0 = visible,
        Err(err) => {
            tracing::warn!("Cannot change visibility of {:?}: {}", entity, err)
        }
    }
}

pub fn is_visible(world: &World, entity: Entity) -> bool {
    world.get::<Visible>(entity).map_or(false, |flag| flag.0)
}
