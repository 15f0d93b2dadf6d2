use {
    eyre::{bail, eyre, Report, WrapErr},
    std::str::FromStr,
};

/// Longest span a single `tick` may advance, in seconds.
pub const MAX_TICK_SECS: f32 = 3600.0;

/// Front-end event, one per script line.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Pose button with library index.
    Pose(isize),
    PoseNamed(String),
    /// Root rotation slider.
    Root(f32),
    /// Mode toggle button.
    Toggle,
    Reset,
    Beta(usize, f32),
    Expression(usize, f32),
    Garment(usize),
    Undress,
    /// Advance frames by given seconds, or one frame.
    Tick(Option<f32>),
    Dump,
}

fn arg<T>(args: &[&str], index: usize, what: &str) -> Result<T, Report>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = args
        .get(index)
        .ok_or_else(|| eyre!("Missing {} argument", what))?;
    raw.parse()
        .wrap_err_with(|| format!("Invalid {} '{}'", what, raw))
}

impl FromStr for Command {
    type Err = Report;

    fn from_str(line: &str) -> Result<Self, Report> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let (name, args) = match words.split_first() {
            Some((name, args)) => (*name, args),
            None => bail!("Empty command"),
        };

        let expected = match name {
            "tick" => args.len().min(1),
            "pose" | "pose-named" | "root" | "garment" => 1,
            "beta" | "exp" => 2,
            _ => 0,
        };
        if args.len() > expected {
            bail!("Too many arguments for '{}'", name);
        }

        let command = match name {
            "pose" => Command::Pose(arg(args, 0, "pose index")?),
            "pose-named" => Command::PoseNamed(arg(args, 0, "pose name")?),
            "root" => Command::Root(arg(args, 0, "angle")?),
            "toggle" => Command::Toggle,
            "reset" => Command::Reset,
            "beta" => {
                Command::Beta(arg(args, 0, "beta index")?, arg(args, 1, "value")?)
            }
            "exp" => Command::Expression(
                arg(args, 0, "expression index")?,
                arg(args, 1, "value")?,
            ),
            "garment" => Command::Garment(arg(args, 0, "garment index")?),
            "undress" => Command::Undress,
            "tick" => {
                if args.is_empty() {
                    Command::Tick(None)
                } else {
                    let secs: f32 = arg(args, 0, "seconds")?;
                    if !secs.is_finite() || secs < 0.0 {
                        bail!("Tick must be non-negative, got {}", secs);
                    }
                    if secs > MAX_TICK_SECS {
                        bail!(
                            "Tick of {} seconds exceeds limit of {}",
                            secs,
                            MAX_TICK_SECS
                        );
                    }
                    Command::Tick(Some(secs))
                }
            }
            "dump" => Command::Dump,
            _ => bail!("Unknown command '{}'", name),
        };

        Ok(command)
    }
}
