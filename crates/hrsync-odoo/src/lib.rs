//! hrsync Odoo source
//!
//! [`RecordSource`](hrsync_core::RecordSource) backed by Odoo's external
//! JSON-RPC API:
//!
//! - `common.authenticate` once, at [`OdooClient::connect`]
//! - `object.execute_kw(..., "search", [[]])` to list every record id
//! - `object.execute_kw(..., "read", [ids, fields])` per batch
//!
//! # Example
//!
//! ```rust,ignore
//! use hrsync_odoo::{OdooClient, OdooConfig};
//!
//! let config = OdooConfig::new("https://erp.example.com", "prod", "bot", key);
//! let client = OdooClient::connect(config).await?;
//! println!("authenticated as uid {}", client.uid());
//! ```

#![warn(unreachable_pub)]

mod client;
mod config;
mod rpc;

pub use client::OdooClient;
pub use config::OdooConfig;
