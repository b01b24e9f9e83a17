use std::path::PathBuf;
use std::process::ExitCode;

use dreamroom::app::LoadingScene;
use dreamroom::config::AppConfig;
use dreamroom::engine::Engine;
use dreamroom::scene::SceneFlow;

fn config_path() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match AppConfig::load(config_path().as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = Engine::builder()
        .with_window(config.window.clone())
        .with_debug(config.debug)
        .with_master_volume(config.audio.master_volume)
        .run(SceneFlow::new(Box::new(LoadingScene::new(config))));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("event loop failed: {e}");
            ExitCode::FAILURE
        }
    }
}
