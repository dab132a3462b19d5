pub mod host;
pub mod logging;
pub mod service;

pub use host::HostConfig;
pub use logging::LoggingShortener;
pub use service::MappingService;
