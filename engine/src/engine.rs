use {crate::clocks::ClockIndex, hecs::World};

pub struct SystemContext<'a> {
    pub world: &'a mut World,
    pub clock: ClockIndex,
}

/// Per-frame step driven by `Engine::advance`.
pub trait System {
    fn run(&mut self, ctx: SystemContext<'_>);
}

impl<F> System for F
where
    F: FnMut(SystemContext<'_>),
{
    fn run(&mut self, ctx: SystemContext<'_>) {
        self(ctx)
    }
}

/// Root data structure holding world and per-frame systems.
///
/// Everything runs on the thread calling `advance`. Systems never block,
/// anything spanning several frames keeps its progress in components and
/// continues on the next call.
pub struct Engine {
    pub world: World,
    schedule: Vec<Box<dyn System>>,
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            world: World::new(),
            schedule: Vec::new(),
        }
    }

    /// Adds a system to this engine.
    pub fn add_system<S>(&mut self, system: S) -> &mut Self
    where
        S: System + 'static,
    {
        self.schedule.push(Box::new(system));
        self
    }

    /// Runs every system once, in the order they were added.
    pub fn advance(&mut self, clock: ClockIndex) {
        tracing::trace!("Frame {} ({:?})", clock.step, clock.delta);

        for system in &mut self.schedule {
            system.run(SystemContext {
                world: &mut self.world,
                clock,
            });
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}
