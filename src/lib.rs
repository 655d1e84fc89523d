//! sp6-push - convert and deliver images to six-color e-paper panels
//!
//! Composes arbitrary images onto the panel canvas, runs them through the
//! `sp6-codec` pipeline and posts the result to the device over HTTP.
//! This library exposes modules for integration testing.

pub mod compose;
pub mod config;
pub mod error;
pub mod export;
pub mod preview;
pub mod service;
pub mod upload;
