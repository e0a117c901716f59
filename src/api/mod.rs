//! HTTP surface for both tiers, one module per binary plus the shared wire
//! DTOs. Framing and routing belong to actix-web; everything here is thin
//! translation onto the storage and service layers.

pub mod node_api;
pub mod responses;
pub mod store_api;

pub const SHORTEN_ENDPOINT: &str = "/api/shorten";
pub const QUERY_ENDPOINT: &str = "/api/query";
pub const RESERVE_ENDPOINT: &str = "/api/reserve";
pub const SETRESERVE_ENDPOINT: &str = "/api/setReserve";
