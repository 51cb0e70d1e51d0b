//! Core wallet functionality

pub mod provider;
