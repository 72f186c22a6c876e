//! snipdesk: screenshot capture and annotation
//!
//! This library provides the capture pipeline (delay, backend dispatch,
//! multi-monitor composition, region crop and freeform masking), the layered
//! annotation canvas with undo/redo, and the plumbing around them:
//! configuration, logging, single-instance IPC and the command controller.

pub mod app;
pub mod canvas;
pub mod capture;
pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod ipc;
pub mod logging;
pub mod model;
pub mod platform;
pub mod selection;
pub mod service;
