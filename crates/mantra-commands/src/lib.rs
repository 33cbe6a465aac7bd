//! # Mantra Commands
//!
//! Discord command implementations using the Poise framework.
//!
//! Commands answer from in-memory state only: prefixes come from the
//! [`PrefixResolver`](mantra_store::PrefixResolver) and posts from the
//! [`ContentCache`](mantra_content::ContentCache), so no command waits on
//! Reddit.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod about;
pub mod framework;
pub mod help;
pub mod prefix;
pub mod reddit;
pub mod uptime;

pub use framework::*;
