// src/upload/mod.rs

//! Glue between the watcher and the upload tool.
//!
//! [`UploadClient`] wraps each tool command; [`UploadTrigger`] waits for a
//! run's completion marker and drives login, preparation and creation for
//! it, reporting every stage as an [`UploadReport`].

pub mod client;
pub mod trigger;

pub use client::UploadClient;
pub use trigger::{TriggerOptions, UploadReport, UploadStage, UploadTrigger};
