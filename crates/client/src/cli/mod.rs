pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Call, Endpoints, Init, UniqueId, Version};
