//! Business rules that do not touch the database. Handlers call these and
//! persist the outcome through the repository layer.

pub mod catalog;
pub mod download;
pub mod installments;
