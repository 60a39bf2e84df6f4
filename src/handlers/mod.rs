pub mod accounts;
pub mod common;
pub mod health;
