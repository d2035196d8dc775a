//! Name Resolver and Include Resolver.

pub mod include_resolver;
pub mod name_resolver;
pub mod schema;
pub mod scope;

pub use include_resolver::{IncludeResolution, IncludeResolver};
pub use name_resolver::{NameResolution, NameResolver, Resolution};
