pub mod error;
pub mod model;
pub mod pagination;
pub mod service;
pub mod store;
