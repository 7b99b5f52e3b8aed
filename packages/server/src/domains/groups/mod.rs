pub mod data;
pub mod models;

pub use data::GroupData;
pub use models::{CreateGroupInput, Group, NewGroup};
