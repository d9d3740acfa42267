//! mxweave Core Types and Definitions
//!
//! This crate provides the foundational types shared by the mxweave crates:
//!
//! - **Specification**: The validated diagram model ([`spec`] module)
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Colors**: CSS color parsing for document attributes ([`color::Color`])

pub mod color;
pub mod geometry;
pub mod spec;
