//! Core types and operations for tank gauging.
//!
//! Strapping-table volume lookup and the gauging pipeline live here, free of
//! HTTP and database dependencies. Storage backends implement
//! [`store::TankStore`]; [`service::GaugingService`] ties the two together.

pub mod error;
pub mod gauging;
pub mod service;
pub mod store;
pub mod strapping;
pub mod tank;

pub use error::{Error, ErrorKind, Result};
