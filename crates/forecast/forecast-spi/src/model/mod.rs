//! Model module containing the persistent state

mod hyper_parameters;
mod model_ensemble;
mod model_registry;
mod model_state;
mod training_progress;

pub use hyper_parameters::HyperParameters;
pub use model_ensemble::ModelEnsemble;
pub use model_registry::ModelRegistry;
pub use model_state::ModelState;
pub use training_progress::TrainingProgress;
