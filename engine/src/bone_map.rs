use {
    crate::{
        error::PoseError,
        skeleton::{Name, Skeleton},
    },
    bumpalo::Bump,
    hecs::{Entity, World},
    std::collections::HashMap,
};

/// Index from joint name to joint entity.
///
/// Holds plain entity handles into the world. When the skeleton is replaced
/// the map must be built again.
#[derive(Clone, Debug, Default)]
pub struct BoneMap {
    bones: HashMap<String, Entity, ahash::RandomState>,
    duplicates: Vec<String>,
}

impl BoneMap {
    /// Indexes every joint of `skeleton`.
    ///
    /// Joints sharing a name overwrite each other, the one visited last wins.
    /// Each collision is reported with a warning and kept in `duplicates`.
    pub fn build(world: &World, skeleton: Option<&Skeleton>) -> Self {
        match Self::try_build(world, skeleton) {
            Ok(map) => map,
            Err(err) => {
                tracing::error!("Cannot build bone map: {}", err);
                BoneMap::default()
            }
        }
    }

    pub fn try_build(
        world: &World,
        skeleton: Option<&Skeleton>,
    ) -> Result<Self, PoseError> {
        let skeleton = skeleton.ok_or(PoseError::MissingReference {
            what: "Character skeleton",
        })?;

        if world.get::<Name>(skeleton.root()).is_err() {
            return Err(PoseError::MissingReference {
                what: "Skeleton root joint",
            });
        }

        let bump = Bump::new();
        let mut map = BoneMap::default();

        skeleton.visit(world, &bump, |entity| {
            let name = match world.get::<Name>(entity) {
                Ok(name) => name.0.clone(),
                Err(_) => return,
            };

            if map.bones.insert(name.clone(), entity).is_some() {
                tracing::warn!(
                    "Duplicate bone name '{}', later joint replaces earlier one",
                    name
                );
                map.duplicates.push(name);
            }
        });

        tracing::debug!("Bone map built with {} bones", map.bones.len());
        Ok(map)
    }

    pub fn get(&self, name: &str) -> Option<Entity> {
        self.bones.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bones.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.bones.values().copied()
    }

    /// Names that occurred more than once, once per extra occurrence.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Picks the joint driven by the root rotation slider.
    ///
    /// Explicitly assigned joint wins. Otherwise first of `fallbacks`
    /// present in this map is used.
    pub fn resolve_root(
        &self,
        explicit: Option<Entity>,
        fallbacks: &[String],
    ) -> Option<Entity> {
        if let Some(explicit) = explicit {
            return Some(explicit);
        }

        let found = fallbacks
            .iter()
            .find_map(|name| self.get(name).map(|entity| (name, entity)));

        match found {
            Some((name, entity)) => {
                tracing::debug!("Root joint resolved as '{}'", name);
                Some(entity)
            }
            None => {
                tracing::error!(
                    "Could not find root joint, tried {:?}",
                    fallbacks
                );
                None
            }
        }
    }
}
