pub mod generator;
pub mod mistral;
pub mod steps;

pub use generator::TaskGenerator;
pub use mistral::MistralClient;
pub use steps::{split_steps, strip_marker};
