use std::sync::Arc;

use offboard_control::{
    bridge::InboundQueue,
    errors::OffboardError,
    info,
    sim::{self, SimConfig, SimHandle},
    OffboardController,
};

const ID: &str = "main";

/// Runs the offboard control loop against the simulated flight controller.
/// An optional first argument names a TOML file with the simulator
/// configuration.
fn main() -> Result<(), OffboardError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("[{}] Loading simulator configuration from {}", ID, path);
            sim::load_from_file_path(&path)?
        }
        None => SimConfig::default(),
    };

    let sim = SimHandle::new(config)?;
    let queue = Arc::new(InboundQueue::new());
    let _stepper = sim.spawn_stepper(queue.clone());

    let mut controller = OffboardController::new(queue, sim.clone(), sim);
    futures::executor::block_on(controller.run())
}
