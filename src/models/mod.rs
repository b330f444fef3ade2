pub mod memory;
pub mod user;

pub use memory::{FieldFilter, Memory, MemoryFields};
pub use user::{PublicUser, User};
