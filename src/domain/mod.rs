pub mod product;
pub mod report;

pub use product::{ProductInfo, ProductResult};
pub use report::ProductReport;
