pub mod catalog;
pub mod clock;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod fields;
pub mod format;
pub mod harness;
pub mod mcp;
pub mod model;
pub mod pipeline;
pub mod query;
pub mod rest;
pub mod section;
pub mod store;
