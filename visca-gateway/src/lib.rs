pub mod modules;

pub use modules::camera_connector::{CameraConnector, OnvifConnector};
pub use modules::cli::Args;
pub use modules::config::{GatewayConfig, WorkerSettings};
pub use modules::fleet_orchestrator::FleetOrchestrator;
pub use modules::logging::init_logging;
pub use modules::roster::{
    CameraAddress, CameraRecord, ClientKey, ConnectionParams, JsonFileRoster, PresetRange, Roster,
    RosterSource, RosterStore,
};
