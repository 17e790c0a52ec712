//! Core services. Each borrows an [`EntityStore`](crate::store::EntityStore)
//! for the duration of a call and takes the viewer as an explicit argument.

pub mod feed;
pub mod follow;
pub mod listing;
pub mod publish;

#[cfg(test)]
pub(crate) mod fixtures;
