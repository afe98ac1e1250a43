pub mod gbm;
pub mod summary;

pub use gbm::{simulate, simulate_with, GbmParams, PricePaths};
pub use summary::{run_gbm_simulation, GbmInput, GbmOutput};
