pub mod cache;
pub mod pipeline;
pub mod plan;
pub mod surface;
