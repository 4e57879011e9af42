mod product_attributes;
pub use product_attributes::*;
mod sections;
pub use sections::*;
