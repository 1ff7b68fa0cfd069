use log::error;
use staff_scheduler::server::{self, AppState};
use staff_scheduler::{Scheduler, ServerConfig, SolverConfig};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (solver_config, server_config) = match (SolverConfig::from_env(), ServerConfig::from_env()) {
        (Ok(solver), Ok(server)) => (solver, server),
        (Err(e), _) | (_, Err(e)) => {
            error!("{e}");
            std::process::exit(2);
        }
    };

    let state = AppState {
        scheduler: Scheduler::new(solver_config),
        config: server_config,
    };
    if let Err(e) = server::run_server(state).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}
