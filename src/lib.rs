#![doc = "The `dashgate` library crate."]
#![doc = ""]
#![doc = "Credential login (validation, user lookup, password verification, session"]
#![doc = "issuance) and the access gate that guards the dashboard routes. The binary"]
#![doc = "(`main.rs`) wires these pieces into an Actix Web server."]

pub mod access;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
