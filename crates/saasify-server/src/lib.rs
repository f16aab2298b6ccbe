//! Saasify Server: HTTP boundary and tenant-scoped services.

pub mod api;
pub mod app;
pub mod config;
pub mod service;
