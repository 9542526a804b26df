mod assembler;
mod cluster;
mod color;
mod error;
mod models;
mod scorer;
mod service;
mod validity;

pub use error::LookError;
pub use models::{Candidate, Dimension, Look, LookItem, LooksResponse};
pub use scorer::{round3, PairScores};
pub use service::LookService;
