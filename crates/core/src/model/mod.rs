pub mod dataset;
pub mod store;
pub mod unit;

pub use dataset::{Dataset, TotalDrift, TotalPolicy, YearRecord};
pub use store::{VectorMetadata, VectorStore};
pub use unit::{Scale, Unit};
