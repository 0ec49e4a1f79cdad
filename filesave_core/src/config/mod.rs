pub mod settings;

pub use settings::{AppConfig, FileSaveConfig, ServerConfig};
