// Crate root library declaration and module exports.
pub mod audit;
pub mod catalog;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod extraction;
pub mod model;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod source;
pub mod storage;
pub mod store;
pub mod zmanim_context;
