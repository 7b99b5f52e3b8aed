pub mod data;
pub mod models;

pub use data::EventData;
pub use models::{CreateEventInput, Event, EventStatus, NewEvent};
