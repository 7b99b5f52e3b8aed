pub mod data;
pub mod models;

pub use data::JobData;
pub use models::{CreateJobInput, Job, JobStatus, JobType, NewJob};
