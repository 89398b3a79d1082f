//! Higher-level call helpers for the velo protocol: one method per
//! message kind, each running the request/response recipe through a
//! [`velo_wire::Session`], plus the extended-API Sentinel/Caller roles.
#![deny(unsafe_code)]

pub mod client;
pub mod sentinel;

pub use client::{find_transaction_in_block, VeloClient};
pub use sentinel::{Caller, Sentinel, PING_VERB_ID};
