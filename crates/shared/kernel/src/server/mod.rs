pub mod error;
pub mod extract;
pub mod health;
pub mod pagination;
pub mod router;
pub mod state;
