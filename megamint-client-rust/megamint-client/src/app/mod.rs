pub mod controller;
pub mod projector;
