//! Command-line arguments for the demo.

use anyhow::{bail, Context, Result};
use trigon_engine::scene::SceneKind;

#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Print the scene names and exit.
    List,
    Run {
        scene: SceneKind,
        texture: Option<String>,
        log_filter: Option<String>,
    },
}

pub const USAGE: &str = "usage: trigon-demo [--scene <name>] [--texture <path|file://|http(s)://url>] [--log <filter>] [--list]";

/// Parses arguments, program name excluded.
///
/// `--scene` defaults to `layered-triangles`.
pub fn parse<I>(args: I) -> Result<CliCommand>
where
    I: IntoIterator<Item = String>,
{
    let mut scene = SceneKind::LayeredTriangles;
    let mut texture = None;
    let mut log_filter = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--list" => return Ok(CliCommand::List),
            "--scene" => {
                let name = args.next().context("--scene needs a value")?;
                scene = SceneKind::from_name(&name).with_context(|| {
                    format!("unknown scene `{name}` (try --list)")
                })?;
            }
            "--texture" => texture = Some(args.next().context("--texture needs a value")?),
            "--log" => log_filter = Some(args.next().context("--log needs a value")?),
            other => bail!("unexpected argument `{other}`\n{USAGE}"),
        }
    }

    Ok(CliCommand::Run {
        scene,
        texture,
        log_filter,
    })
}
