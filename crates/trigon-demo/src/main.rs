mod cli;

use anyhow::Result;
use trigon_engine::device::GpuInit;
use trigon_engine::logging::{init_logging, LoggingConfig};
use trigon_engine::scene::SceneKind;
use trigon_engine::texture::{FsImageLoader, HttpImageLoader, UriImageLoader};
use trigon_engine::window::{Runtime, RuntimeConfig};

use cli::CliCommand;

fn main() -> Result<()> {
    let command = cli::parse(std::env::args().skip(1))?;

    let CliCommand::Run {
        scene,
        texture,
        log_filter,
    } = command
    else {
        for kind in SceneKind::ALL {
            println!("{kind}");
        }
        return Ok(());
    };

    init_logging(LoggingConfig {
        env_filter: log_filter,
        ..LoggingConfig::default()
    });

    if scene == SceneKind::TexturedQuad && texture.is_none() {
        log::warn!("`{scene}` has nothing to draw without --texture");
    }
    log::info!("starting `{scene}`; arrows move the camera, Escape quits");

    let config = RuntimeConfig {
        scene,
        texture,
        ..RuntimeConfig::default()
    };
    let loader = UriImageLoader::new(FsImageLoader::new(), HttpImageLoader::new()?);
    Runtime::run(config, GpuInit::default(), loader)
}
