pub mod lakehouse;
pub mod pipeline;
