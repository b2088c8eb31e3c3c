pub mod traits;
pub mod ttl_cache;

pub use traits::ResultCache;
pub use ttl_cache::TtlCache;
