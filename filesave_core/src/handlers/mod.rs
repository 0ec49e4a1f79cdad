//! HTTP handlers for the upload API

pub mod files;
pub mod health;
pub mod routes;
