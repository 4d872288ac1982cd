/*
[INPUT]:  Runner modules
[OUTPUT]: Public surface of the task runner (config, service, ticker, uploads, dashboard)
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod config;
pub mod dashboard;
pub mod service;
pub mod ticker;
pub mod uploader;

pub use config::{ConfigError, RunnerConfig, TaskSeed, TickerConfig, UploadConfig};
pub use dashboard::render_dashboard;
pub use service::TaskService;
pub use ticker::Ticker;
pub use uploader::SimulatedPhotoUploader;
