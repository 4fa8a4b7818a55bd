//! The Membership Fetcher (§4.1): keeps each pool's member set in sync
//! with the LTM control API.

mod client;
mod error;
mod fetcher;

pub use client::{F5Credentials, LtmClient, LtmHttpClient};
pub use error::LtmError;
pub use fetcher::run as run_membership_fetcher;
