//! Storage layer abstraction trait definition

mod clock;
mod route_writer;
mod subdomain_repository;

pub use clock::{Clock, SystemClock};
pub use route_writer::RouteWriter;
pub use subdomain_repository::SubdomainRepository;
