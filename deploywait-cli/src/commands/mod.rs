pub mod config;
pub mod juju;
pub mod page;
pub mod status;
pub mod wait;
