//! Domain entities

pub mod network;
pub mod token;
