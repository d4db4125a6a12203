//! vidscaffold - idempotent video-converter project scaffolding
//!
//! Provisions a Node.js backend and a React frontend by running package
//! manager generators and installing templates. Each target keeps a step
//! cache next to it so reruns only redo what is missing or out of date.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod install;
pub mod orchestrator;
pub mod prereq;
pub mod process;
pub mod recipes;
pub mod report;
pub mod ui;

pub use error::{ScaffoldError, ScaffoldResult};
