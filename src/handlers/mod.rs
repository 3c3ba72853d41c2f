//! HTTP handlers

pub mod health;
pub mod auth;
pub mod predict;
pub mod samples;
pub mod artifact;
pub mod stats;
