use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};

use tactiboard::config::TactiboardConfig;
use tactiboard::scenario::Scenario;

fn run(scenario_path: PathBuf, out_path: PathBuf) -> Result<()> {
    let config = TactiboardConfig::load();
    let scenario = Scenario::load(&scenario_path)?;
    let (width, height) = (scenario.image_width, scenario.image_height);

    let mut session = scenario.into_session(&config)?;
    let simulated = session.simulate();
    log::info!(
        "Simulated {} players, {} ball samples",
        simulated.players.len(),
        simulated.ball.len()
    );

    let img = session.render(width, height);
    img.save(&out_path)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    log::info!("Saved {}", out_path.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();
    let [_, scenario, out] = args.as_slice() else {
        eprintln!("Usage: tactiboard <scenario.json> <out.png>");
        return ExitCode::from(2);
    };

    match run(PathBuf::from(scenario), PathBuf::from(out)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:?}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
