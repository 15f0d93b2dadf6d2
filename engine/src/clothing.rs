use {
    crate::{
        engine::{System, SystemContext},
        mode::{set_visible, Visible},
    },
    hecs::{Entity, World},
};

/// Garment with baked cloth animation.
#[derive(Clone, Debug, PartialEq)]
pub struct Garment {
    pub name: String,

    /// Length of the baked animation in seconds.
    pub duration: f32,

    /// Current playback position in seconds.
    pub time: f32,
}

/// Marks garment whose animation is advancing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Playing;

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct GarmentConfig {
    pub name: String,
    pub duration: f32,
}

/// Shows at most one garment at a time and restarts its animation
/// whenever a different one is put on.
pub struct Wardrobe {
    garments: Vec<Entity>,
    current: Option<Entity>,
}

impl Wardrobe {
    /// Spawns garments, all hidden.
    pub fn new(world: &mut World, garments: &[GarmentConfig]) -> Self {
        let garments = garments
            .iter()
            .map(|config| {
                world.spawn((
                    Garment {
                        name: config.name.clone(),
                        duration: config.duration.max(0.0),
                        time: 0.0,
                    },
                    Visible(false),
                ))
            })
            .collect();

        Wardrobe {
            garments,
            current: None,
        }
    }

    pub fn garments(&self) -> &[Entity] {
        &self.garments
    }

    pub fn current(&self) -> Option<Entity> {
        self.current
    }

    /// Puts on garment at `index`.
    /// Does nothing if it is already worn.
    pub fn show(&mut self, world: &mut World, index: usize) -> Option<Entity> {
        let garment = match self.garments.get(index) {
            Some(&garment) => garment,
            None => {
                tracing::warn!(
                    "Garment index {} is out of range 0..{}",
                    index,
                    self.garments.len()
                );
                return None;
            }
        };

        if self.current == Some(garment) {
            return Some(garment);
        }

        self.stop(world);
        for &other in &self.garments {
            set_visible(world, other, false);
        }

        set_visible(world, garment, true);
        if let Ok(mut state) = world.get_mut::<Garment>(garment) {
            state.time = 0.0;
            tracing::info!("Wearing '{}'", state.name);
        }
        let _ = world.insert_one(garment, Playing);

        self.current = Some(garment);
        Some(garment)
    }

    /// Takes off everything.
    pub fn remove_all(&mut self, world: &mut World) {
        self.stop(world);
        for &garment in &self.garments {
            set_visible(world, garment, false);
        }
        self.current = None;
        tracing::info!("All clothing removed");
    }

    /// Cancels in-flight playback, leaving time where it is.
    fn stop(&self, world: &mut World) {
        for &garment in &self.garments {
            let _ = world.remove_one::<Playing>(garment);
        }
    }
}

/// Advances playing garments by frame time and stops them at the end
/// of their animation.
pub struct PlaybackSystem;

impl System for PlaybackSystem {
    fn run(&mut self, ctx: SystemContext<'_>) {
        let delta = ctx.clock.delta_secs();
        let mut finished = Vec::new();

        for (entity, (garment, _)) in
            ctx.world.query::<(&mut Garment, &Playing)>().iter()
        {
            garment.time += delta;
            if garment.time >= garment.duration {
                garment.time = garment.duration;
                finished.push(entity);
            }
        }

        for entity in finished {
            let _ = ctx.world.remove_one::<Playing>(entity);
            tracing::debug!("Garment animation {:?} finished", entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{clocks::ClockIndex, engine::Engine, mode::is_visible},
        std::time::Duration,
    };

    fn setup() -> (Engine, Wardrobe) {
        let mut engine = Engine::new();
        let wardrobe = Wardrobe::new(
            &mut engine.world,
            &[
                GarmentConfig {
                    name: "shirt1".into(),
                    duration: 1.0,
                },
                GarmentConfig {
                    name: "shirt2".into(),
                    duration: 2.0,
                },
            ],
        );
        engine.add_system(PlaybackSystem);
        (engine, wardrobe)
    }

    fn frame(engine: &mut Engine, millis: u64) {
        engine.advance(ClockIndex::fixed(Duration::from_millis(millis)));
    }

    fn time(engine: &Engine, garment: Entity) -> f32 {
        engine.world.get::<Garment>(garment).unwrap().time
    }

    fn playing(engine: &Engine, garment: Entity) -> bool {
        engine.world.get::<Playing>(garment).is_ok()
    }

    #[test]
    fn playback_clamps_at_duration() {
        let (mut engine, mut wardrobe) = setup();
        let shirt = wardrobe.show(&mut engine.world, 0).unwrap();

        frame(&mut engine, 500);
        assert_eq!(time(&engine, shirt), 0.5);
        assert!(playing(&engine, shirt));

        frame(&mut engine, 750);
        assert_eq!(time(&engine, shirt), 1.0);
        assert!(!playing(&engine, shirt));

        frame(&mut engine, 500);
        assert_eq!(time(&engine, shirt), 1.0);
    }

    #[test]
    fn switching_cancels_previous_playback() {
        let (mut engine, mut wardrobe) = setup();
        let first = wardrobe.show(&mut engine.world, 0).unwrap();
        frame(&mut engine, 250);

        let second = wardrobe.show(&mut engine.world, 1).unwrap();
        assert!(!playing(&engine, first));
        assert!(!is_visible(&engine.world, first));
        assert!(is_visible(&engine.world, second));

        frame(&mut engine, 250);
        assert_eq!(time(&engine, first), 0.25);
        assert_eq!(time(&engine, second), 0.25);
    }

    #[test]
    fn showing_current_garment_does_not_restart() {
        let (mut engine, mut wardrobe) = setup();
        let shirt = wardrobe.show(&mut engine.world, 1).unwrap();
        frame(&mut engine, 500);

        wardrobe.show(&mut engine.world, 1);
        assert_eq!(time(&engine, shirt), 0.5);
        assert!(playing(&engine, shirt));
    }

    #[test]
    fn remove_all_hides_everything() {
        let (mut engine, mut wardrobe) = setup();
        let shirt = wardrobe.show(&mut engine.world, 0).unwrap();
        wardrobe.remove_all(&mut engine.world);

        assert_eq!(wardrobe.current(), None);
        assert!(!is_visible(&engine.world, shirt));
        assert!(!playing(&engine, shirt));
        assert_eq!(wardrobe.show(&mut engine.world, 5), None);
    }
}
