//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! The settings command line lives under [`cli`].

pub mod cli;
