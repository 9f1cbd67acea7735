//! Route handlers

pub mod channels;
pub mod events;
pub mod health;
