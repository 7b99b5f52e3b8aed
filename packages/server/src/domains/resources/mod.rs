pub mod data;
pub mod models;

pub use data::ResourceData;
pub use models::Resource;
