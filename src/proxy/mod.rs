//! Forward proxy plumbing
//!
//! The state every connection handler shares, and the short-lived origin
//! connections used on cache misses.

pub mod origin;

pub use origin::{OriginExchange, fetch, origin_addr};

use crate::cache::ResponseCache;
use crate::config::OriginConfig;
use crate::stats::StatsSender;

/// Everything a connection handler needs besides its socket.
///
/// Cloning is cheap: the cache and stats sender are handles onto the same
/// process-wide instances.
#[derive(Debug, Clone)]
pub struct ProxyContext {
    pub cache: ResponseCache,
    pub stats: StatsSender,
    pub origin: OriginConfig,
}

impl ProxyContext {
    pub fn new(cache: ResponseCache, stats: StatsSender, origin: OriginConfig) -> Self {
        Self {
            cache,
            stats,
            origin,
        }
    }
}
