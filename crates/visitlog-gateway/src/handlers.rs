mod health;
mod visits;

pub use health::health_handler;
pub use visits::{visited_domains_handler, visited_links_handler};
