pub mod resource;
pub mod session;
pub mod token;
