pub mod auth;
pub mod catalog;
pub mod events;
pub mod groups;
pub mod jobs;
pub mod membership;
pub mod resources;
