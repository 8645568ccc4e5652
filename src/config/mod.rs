// ==========================================
// Campus Records - configuration module
// ==========================================

pub mod config_manager;

pub use config_manager::ConfigManager;
