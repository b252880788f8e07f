// Application layer - Use case interactors

pub mod autocut_interactor;
pub mod batch_interactor;
pub mod container;

// Re-export interactors
pub use autocut_interactor::{AutoCutInteractor, CutRequest};
pub use batch_interactor::BatchInteractor;
pub use container::{AppContainer, DefaultAppContainer};
