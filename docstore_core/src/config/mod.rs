pub mod settings;

pub use settings::{AppConfig, DownloadConfig, S3StorageConfig, ServerConfig, UploadConfig};
