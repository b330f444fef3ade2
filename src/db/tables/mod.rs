pub mod memories;
pub mod users;
