//! Least-connections HTTP load balancer library.
//!
//! A fixed pool of backends is probed in the background and every inbound
//! request is sent to a healthy backend with the fewest reserved connection
//! slots, ties broken at random.

pub mod admin;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;

pub use config::schema::BalancerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
