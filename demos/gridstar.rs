//! Run pathfinding scenarios and log the resulting paths.
//!
//! Run: cargo run --bin gridstar [scenario.json ...]
//! Set `RUST_LOG=debug` to also see grid and search diagnostics.

use gridstar_demos::{Scenario, ScenarioError, builtin};

fn scenarios() -> Result<Vec<Scenario>, ScenarioError> {
    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        return Ok(builtin());
    }
    paths.iter().map(Scenario::load).collect()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = scenarios().and_then(|all| {
        for scenario in &all {
            scenario.run()?.log();
        }
        Ok(())
    });

    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}
