//! HTTP surface exposing give / lose / has / get to other services

pub mod server;

pub use server::{router, serve, start, CREATOR_HEADER};
