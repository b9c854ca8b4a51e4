//! # External Service Providers
//!
//! Concrete clients for the Google APIs the pipeline talks to, plus the
//! trait seams the pipeline is written against.

pub mod ads;
pub mod auth;
pub mod gmail;
