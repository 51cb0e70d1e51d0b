//! Domain layer for the wallet core

pub mod entities;
