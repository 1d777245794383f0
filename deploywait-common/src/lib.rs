//! Polling helpers for deployed environments
//!
//! Waits for every agent of an environment to start and for web pages to
//! come up, each bounded by a timeout.

pub mod environment;
pub mod error;
pub mod page;
pub mod status;
pub mod timeout;

pub use environment::{wait_for_started, wait_for_started_with, Environment, StatusSource, WaitOptions};
pub use error::{Error, Result};
pub use page::{check_wordpress, http_client, PageCheck};
pub use status::{format_listing, AgentStates, Status};
pub use timeout::UntilTimeout;
