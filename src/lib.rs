//! pingcalc: stateless arithmetic functions served over HTTP.
//!
//! [`function`] holds the request-to-string logic; [`service`] hosts it on
//! pingora listeners; [`config`] and [`logging`] carry the runtime setup.

#![allow(clippy::upper_case_acronyms)]

pub mod config;
pub mod core;
pub mod function;
pub mod logging;
pub mod service;
pub mod utils;
