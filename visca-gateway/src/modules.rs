pub mod camera_connector;
pub mod cli;
pub mod config;
pub mod fleet_orchestrator;
pub mod gateway_loop;
pub mod logging;
pub mod preset_allocator;
pub mod roster;
pub mod translator;
pub mod worker_registry;
