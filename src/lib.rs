//! A minimal in-memory table store.
//!
//! Named tables hold records of string fields, each record identified by an
//! auto-incrementing id. The whole store can be saved to, and replaced from,
//! a flat text file.

pub(crate) mod common;
pub(crate) mod db;
pub mod shell;
pub(crate) mod storage;

pub use common::error::DatabaseError;
pub use db::{database::Database, table::*};
