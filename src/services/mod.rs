// src/services/mod.rs
pub mod cache;
pub mod feed;
pub mod normalize;
pub mod treasury;
pub mod yields;
