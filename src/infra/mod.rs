pub mod file_system;
pub mod logger;
pub mod model_client;
pub mod output;
