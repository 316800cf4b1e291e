// HTTP middleware

pub mod cors;
pub mod policy;

pub use cors::*;
pub use policy::*;
