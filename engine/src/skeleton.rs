use {
    crate::{
        error::LoadError,
        rotation::Euler,
    },
    bumpalo::{collections::Vec as BVec, Bump},
    hecs::{Entity, World},
    smallvec::SmallVec,
    std::path::{Path, PathBuf},
};

/// Name of a joint. Poses address joints by it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Name(pub String);

/// Local rotation of a joint relative to its parent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocalRotation(pub Euler);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parent(pub Entity);

/// Child joints in authored order.
#[derive(Clone, Debug, Default)]
pub struct Children(pub SmallVec<[Entity; 4]>);

/// Description of a joint subtree, as stored in skeleton files.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct JointDesc {
    pub name: String,

    #[serde(default)]
    pub rotation: Euler,

    #[serde(default)]
    pub children: Vec<JointDesc>,
}

impl JointDesc {
    pub fn new(name: impl Into<String>) -> Self {
        JointDesc {
            name: name.into(),
            rotation: Euler::ZERO,
            children: Vec::new(),
        }
    }

    pub fn with_rotation(mut self, rotation: Euler) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_child(mut self, child: JointDesc) -> Self {
        self.children.push(child);
        self
    }

    #[tracing::instrument]
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;

        ron::de::from_reader(file).map_err(|source| LoadError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}

/// Handle to a rig spawned into a `World`.
///
/// Joints are plain entities. Dropping the handle leaves them in the world,
/// call `Skeleton::despawn` to remove the rig.
#[derive(Clone, Debug)]
pub struct Skeleton {
    root: Entity,
    joints: Box<[Entity]>,
}

impl Skeleton {
    /// Spawns joints described by `desc` into `world`.
    pub fn spawn(world: &mut World, desc: &JointDesc) -> Self {
        let mut joints = Vec::new();
        let root = spawn_joint(world, desc, None, &mut joints);
        tracing::debug!(
            "Spawned skeleton '{}' with {} joints",
            desc.name,
            joints.len()
        );

        Skeleton {
            root,
            joints: joints.into_boxed_slice(),
        }
    }

    pub fn root(&self) -> Entity {
        self.root
    }

    /// All joints in spawn order.
    pub fn joints(&self) -> &[Entity] {
        &self.joints
    }

    /// Visits root and all its descendants depth-first,
    /// parent before children, siblings in authored order.
    pub fn visit<F>(&self, world: &World, bump: &Bump, mut f: F)
    where
        F: FnMut(Entity),
    {
        let mut stack = BVec::new_in(bump);
        stack.push(self.root);

        while let Some(entity) = stack.pop() {
            f(entity);

            if let Ok(children) = world.get::<Children>(entity) {
                stack.extend(children.0.iter().rev().copied());
            }
        }
    }

    pub fn descendants(&self, world: &World) -> Vec<Entity> {
        let bump = Bump::new();
        let mut out = Vec::with_capacity(self.joints.len());
        self.visit(world, &bump, |entity| out.push(entity));
        out
    }

    /// Reads rotation of the joint named `name`.
    /// With duplicate names the last one in pre-order is read, same as the
    /// bone map resolves it.
    pub fn rotation(&self, world: &World, name: &str) -> Option<Euler> {
        self.joints.iter().rev().find_map(|&joint| {
            let joint_name = world.get::<Name>(joint).ok()?;
            if joint_name.0 == name {
                Some(world.get::<LocalRotation>(joint).ok()?.0)
            } else {
                None
            }
        })
    }

    /// Removes all joints of this rig from the world.
    pub fn despawn(self, world: &mut World) {
        for &joint in self.joints.iter() {
            let _ = world.despawn(joint);
        }
    }
}

fn spawn_joint(
    world: &mut World,
    desc: &JointDesc,
    parent: Option<Entity>,
    joints: &mut Vec<Entity>,
) -> Entity {
    let entity = world.spawn((
        Name(desc.name.clone()),
        LocalRotation(desc.rotation),
    ));
    joints.push(entity);

    if let Some(parent) = parent {
        let _ = world.insert_one(entity, Parent(parent));
    }

    let children = desc
        .children
        .iter()
        .map(|child| spawn_joint(world, child, Some(entity), joints))
        .collect();

    let _ = world.insert_one(entity, Children(children));
    entity
}

/// Where the rig comes from.
#[derive(Clone, Debug, serde::Deserialize)]
pub enum SkeletonSource {
    /// Built-in SMPLX body rig.
    SmplxBody,

    /// RON file holding a `JointDesc` tree.
    File(PathBuf),
}

impl SkeletonSource {
    pub fn load(&self) -> Result<JointDesc, LoadError> {
        match self {
            SkeletonSource::SmplxBody => {
                Ok(crate::authoring::smplx_body_skeleton())
            }
            SkeletonSource::File(path) => JointDesc::load(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> JointDesc {
        JointDesc::new("root").with_child(
            JointDesc::new("pelvis")
                .with_child(
                    JointDesc::new("left_hip")
                        .with_child(JointDesc::new("left_knee")),
                )
                .with_child(JointDesc::new("right_hip")),
        )
    }

    fn names(world: &World, entities: &[Entity]) -> Vec<String> {
        entities
            .iter()
            .map(|&e| world.get::<Name>(e).unwrap().0.clone())
            .collect()
    }

    #[test]
    fn descendants_are_preorder() {
        let mut world = World::new();
        let skeleton = Skeleton::spawn(&mut world, &rig());
        let order = skeleton.descendants(&world);

        assert_eq!(
            names(&world, &order),
            ["root", "pelvis", "left_hip", "left_knee", "right_hip"]
        );
    }

    #[test]
    fn parents_are_linked() {
        let mut world = World::new();
        let skeleton = Skeleton::spawn(&mut world, &rig());
        let joints = skeleton.joints();

        assert!(world.get::<Parent>(skeleton.root()).is_err());
        assert_eq!(world.get::<Parent>(joints[1]).unwrap().0, joints[0]);
        assert_eq!(world.get::<Parent>(joints[3]).unwrap().0, joints[2]);
    }

    #[test]
    fn despawn_removes_every_joint() {
        let mut world = World::new();
        let skeleton = Skeleton::spawn(&mut world, &rig());
        let joints = skeleton.joints().to_vec();
        skeleton.despawn(&mut world);

        for joint in joints {
            assert!(world.get::<Name>(joint).is_err());
        }
    }

    #[test]
    fn duplicate_names_read_the_mapped_joint() {
        let mut world = World::new();
        let skeleton = Skeleton::spawn(
            &mut world,
            &JointDesc::new("root")
                .with_child(JointDesc::new("hand"))
                .with_child(JointDesc::new("hand")),
        );
        let map = crate::bone_map::BoneMap::build(&world, Some(&skeleton));
        assert_eq!(map.get("hand"), Some(skeleton.joints()[2]));

        let pose = crate::pose::Pose::new("wave")
            .with_bone("hand", Euler::new(0.0, 0.0, 30.0));
        crate::pose::apply_pose(&mut world, &pose, &map);

        assert_eq!(
            skeleton.rotation(&world, "hand"),
            Some(Euler::new(0.0, 0.0, 30.0))
        );
        assert_eq!(
            world.get::<LocalRotation>(skeleton.joints()[1]).unwrap().0,
            Euler::ZERO
        );
    }

    #[test]
    fn parses_skeleton_file_format() {
        let desc: JointDesc = ron::de::from_str(
            r#"(
                name: "root",
                children: [
                    (name: "pelvis", rotation: (x: 5.0)),
                ],
            )"#,
        )
        .unwrap();

        assert_eq!(desc.children[0].name, "pelvis");
        assert_eq!(desc.children[0].rotation, Euler::new(5.0, 0.0, 0.0));
    }
}
