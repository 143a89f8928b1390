//! Configuration module

mod site;

pub use site::ElementIds;
pub use site::ServerConfig;
pub use site::SiteConfig;
