pub mod assignment;
pub mod lifecycle;
pub mod pricing;
pub mod registry;
