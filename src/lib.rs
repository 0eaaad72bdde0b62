//! # MCP Server for OpenCTI
//!
//! This library provides an MCP (Model Context Protocol) server implementation
//! for the OpenCTI threat intelligence platform. It allows AI models and
//! automation scripts to query OpenCTI through a standardized protocol.
//!
//! ## Features
//!
//! - Retrieve the latest threat intelligence reports
//! - Search indicators, malware and threat actors by keyword
//! - Flatten OpenCTI's GraphQL edge/node results into plain JSON records
//!
//! ## Usage
//!
//! The server is typically run as a standalone binary that communicates
//! over stdio with MCP clients.

pub mod config;
pub mod error;
pub mod opencti;
pub mod server;
pub mod tools;

pub use config::OpenCtiConfig;
pub use error::ToolError;
pub use opencti::{client::OpenCtiClient, error::OpenCtiApiError};
pub use server::OpenCtiToolsServer;
pub use tools::OpenCtiTool;
