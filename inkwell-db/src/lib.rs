//! Postgres implementation of the inkwell entity store.

use sqlx::migrate::Migrator;

pub mod client;
mod record;

/// Schema migrations, embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!();
