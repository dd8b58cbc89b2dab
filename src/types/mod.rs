// src/types/mod.rs
pub mod job;
pub mod payload;

pub use job::{
    DatePosted, ExtractedJob, LocationType, NormalizedJob, PositionType, SalaryFields, UNKNOWN,
};
pub use payload::RawPayload;
