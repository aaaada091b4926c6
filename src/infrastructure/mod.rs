pub mod alpha_vantage;
pub mod core;
pub mod factory;
pub mod mock;
pub mod observability;
pub mod yahoo;

pub use factory::ServiceFactory;
