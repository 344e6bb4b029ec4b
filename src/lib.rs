pub mod artifact;
pub mod config;
pub mod contract;
pub mod dispatch;
pub mod error;
pub mod interpret;
pub mod metrics;
pub mod model;
pub mod preprocess;
pub mod server;

pub use artifact::{ArtifactStore, FsArtifactStore, MemoryArtifactStore};
pub use config::AppConfig;
pub use dispatch::PredictionService;
pub use error::ServiceError;
pub use model::{ModelKind, ModelRegistry};
pub use server::build_router;
