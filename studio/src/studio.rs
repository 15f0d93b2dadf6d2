use {
    crate::{command::Command, config::Config},
    eyre::{Report, WrapErr},
    mannequin::{
        blendshape::{Channel, SliderBank, SliderId, SmplxParams},
        clothing::{PlaybackSystem, Wardrobe},
        mode::Visible,
        ClockIndex, ControllerSettings, Engine, LocalRotation, Name, PanelSet,
        PoseController, PoseLibrary, Skeleton,
    },
    std::time::Duration,
};

/// Character with every front-end control wired up.
pub struct Studio {
    engine: Engine,
    controller: PoseController,
    wardrobe: Wardrobe,
    model: SmplxParams,
    shape: SliderBank,
    expression: SliderBank,
    frame_time: f32,
    frame: u64,
}

impl Studio {
    pub fn new(config: &Config) -> Result<Self, Report> {
        let mut engine = Engine::new();
        engine.add_system(PlaybackSystem);

        let desc = config
            .engine
            .skeleton
            .load()
            .wrap_err("Failed to load character skeleton")?;
        let skeleton = Skeleton::spawn(&mut engine.world, &desc);

        let library = match PoseLibrary::load(&config.engine.poses) {
            Ok(library) => Some(library),
            Err(err) => {
                tracing::error!("Pose library unavailable: {}", err);
                None
            }
        };

        let wardrobe = Wardrobe::new(&mut engine.world, &config.engine.garments);

        let mut panels = PanelSet::spawn(&mut engine.world);
        if !wardrobe.garments().is_empty() {
            let cloth_panel = engine.world.spawn((Visible(false),));
            let undress_button = engine.world.spawn((Visible(false),));
            panels = panels
                .with_pose_extra(cloth_panel)
                .with_pose_extra(undress_button);
        }

        let controller = PoseController::new(
            &mut engine.world,
            Some(skeleton),
            library,
            panels,
            ControllerSettings {
                root: None,
                root_fallbacks: config.engine.root_candidates(),
                rest_pose: config.engine.rest_pose.clone(),
            },
        );

        let model = SmplxParams::default();
        let [beta_min, beta_max] = config.studio.beta_range;
        let [exp_min, exp_max] = config.studio.expression_range;
        let shape = SliderBank::new(
            Channel::Shape,
            Channel::Shape.default_count(),
            beta_min..=beta_max,
            &model,
        );
        let expression = SliderBank::new(
            Channel::Expression,
            Channel::Expression.default_count(),
            exp_min..=exp_max,
            &model,
        );

        Ok(Studio {
            engine,
            controller,
            wardrobe,
            model,
            shape,
            expression,
            frame_time: config.studio.frame_time,
            frame: 0,
        })
    }

    pub fn execute(&mut self, command: Command) {
        tracing::debug!("Executing {:?}", command);
        let world = &mut self.engine.world;

        match command {
            Command::Pose(index) => {
                let _ = self.controller.apply_pose_by_index(world, index);
            }
            Command::PoseNamed(name) => {
                self.controller.apply_pose_named(world, &name);
            }
            Command::Root(angle) => {
                self.controller.set_root_rotation(world, angle);
            }
            Command::Toggle => {
                let _ = self.controller.toggle_mode(world);
            }
            Command::Reset => {
                self.controller.reset_pose(world);
            }
            Command::Beta(index, value) => {
                let id = SliderId {
                    channel: Channel::Shape,
                    index,
                };
                self.shape.on_value_changed(id, value, Some(&mut self.model));
            }
            Command::Expression(index, value) => {
                let id = SliderId {
                    channel: Channel::Expression,
                    index,
                };
                self.expression
                    .on_value_changed(id, value, Some(&mut self.model));
            }
            Command::Garment(index) => {
                self.wardrobe.show(world, index);
            }
            Command::Undress => self.wardrobe.remove_all(world),
            Command::Tick(secs) => {
                self.tick(secs.unwrap_or(self.frame_time));
            }
            Command::Dump => self.dump(),
        }
    }

    /// Advances whole frames of `frame_time` covering `secs`.
    /// Last frame takes the remainder. Returns number of frames run.
    fn tick(&mut self, secs: f32) -> u64 {
        let frame_time = f64::from(self.frame_time);
        let secs = f64::from(secs);
        let frames = ((secs / frame_time).ceil() as u64).max(1);

        for index in 0..frames {
            let delta = (secs - index as f64 * frame_time).min(frame_time).max(0.0);
            self.frame += 1;
            self.engine.advance(ClockIndex {
                delta: Duration::from_secs_f64(delta),
                step: self.frame,
            });
        }
        frames
    }

    fn dump(&self) {
        let world = &self.engine.world;

        println!("mode: {:?}", self.controller.mode());
        if let Some(skeleton) = self.controller.skeleton() {
            for &joint in skeleton.descendants(world).iter() {
                let name = world.get::<Name>(joint);
                let rotation = world.get::<LocalRotation>(joint);
                if let (Ok(name), Ok(rotation)) = (name, rotation) {
                    let r = rotation.0;
                    println!("{:>16} ({}, {}, {})", name.0, r.x, r.y, r.z);
                }
            }
        }

        println!("betas: {:?}", self.model.betas);
        println!("expressions: {:?}", self.model.expressions);

        for &garment in self.wardrobe.garments() {
            if let Ok(state) = world.get::<mannequin::clothing::Garment>(garment) {
                let worn = self.wardrobe.current() == Some(garment);
                println!(
                    "{} {:.3}/{:.3}{}",
                    state.name,
                    state.time,
                    state.duration,
                    if worn { " (worn)" } else { "" }
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, mannequin::{mode::is_visible, Euler, Mode}};

    fn studio(name: &str) -> (Studio, std::path::PathBuf) {
        let dir = std::env::temp_dir()
            .join(format!("mannequin-studio-{}-{}", name, std::process::id()));
        mannequin::authoring::write_library(&dir.join("poses.ron")).unwrap();

        let mut config: Config = ron::de::from_str(
            r#"(
                engine: (
                    skeleton: SmplxBody,
                    poses: "poses.ron",
                    rest_pose: Some("Pose_T_Pose"),
                    garments: [
                        (name: "shirt1", duration: 0.5),
                        (name: "shirt2", duration: 1.0),
                    ],
                ),
            )"#,
        )
        .unwrap();
        config.engine.rebase(&dir);

        (Studio::new(&config).unwrap(), dir)
    }

    fn rotation(studio: &Studio, name: &str) -> Option<Euler> {
        studio
            .controller
            .skeleton()?
            .rotation(&studio.engine.world, name)
    }

    #[test]
    fn script_drives_character() {
        let (mut studio, dir) = studio("script");
        let script = [
            "pose 0",
            "root 90",
            "beta 1 7.5",
            "exp 2 -1",
            "garment 1",
            "tick 0.5",
        ];
        for line in script.iter() {
            studio.execute(line.parse().unwrap());
        }

        assert_eq!(rotation(&studio, "left_shoulder"), Some(Euler::new(0.0, 0.0, -85.0)));
        assert_eq!(rotation(&studio, "root"), Some(Euler::new(0.0, 90.0, 0.0)));
        assert_eq!(studio.model.betas[1], 5.0);
        assert_eq!(studio.model.expressions[2], -1.0);
        assert_eq!(studio.model.ground_snaps, 1);

        let shirt = studio.wardrobe.current().unwrap();
        let time = studio
            .engine
            .world
            .get::<mannequin::clothing::Garment>(shirt)
            .unwrap()
            .time;
        assert!((time - 0.5).abs() < 1e-4);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn toggle_hides_clothing_controls() {
        let (mut studio, dir) = studio("toggle");
        studio.execute(Command::Pose(2));
        studio.execute(Command::Toggle);

        let panels = studio.controller.panels().clone();
        assert_eq!(studio.controller.mode(), Mode::ShapeExpression);
        assert_eq!(panels.pose_extras.len(), 2);
        for &widget in panels.pose_extras.iter() {
            assert!(!is_visible(&studio.engine.world, widget));
        }
        assert_eq!(rotation(&studio, "left_knee"), Some(Euler::ZERO));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn long_tick_runs_whole_frames() {
        let (mut studio, dir) = studio("long-tick");
        studio.execute(Command::Garment(1));

        let frames = studio.tick(600.0);
        assert!((36_000..=36_001).contains(&frames), "ran {} frames", frames);
        assert_eq!(studio.frame, frames);

        let shirt = studio.wardrobe.current().unwrap();
        let garment = studio
            .engine
            .world
            .get::<mannequin::clothing::Garment>(shirt)
            .unwrap();
        assert_eq!(garment.time, garment.duration);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn zero_tick_advances_single_frame() {
        let (mut studio, dir) = studio("zero-tick");
        assert_eq!(studio.tick(0.0), 1);
        assert_eq!(studio.frame, 1);

        let _ = std::fs::remove_dir_all(dir);
    }
}
