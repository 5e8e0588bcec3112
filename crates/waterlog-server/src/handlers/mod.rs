//! HTTP handlers

pub mod predict;
pub mod root;
