pub mod estimators;
mod loader;
mod registry;
pub mod transform;
mod types;

pub use loader::{ArtifactLoader, LoadReport};
pub use registry::{Estimator, Generation, ModelBundle, ModelRegistry};
pub use types::{ModelInfo, ModelKind};
