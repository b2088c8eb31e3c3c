pub mod extract;
pub mod lululemon;
pub mod nike;
pub mod registry;
pub mod traits;

pub use lululemon::LululemonRetailer;
pub use nike::NikeRetailer;
pub use registry::RetailerRegistry;
pub use traits::{RetailerMetadata, RetailerStrategy};
