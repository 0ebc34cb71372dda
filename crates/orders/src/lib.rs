//! `movequote-orders` — customer orders and the selection resolver.
//!
//! The resolver turns a client-supplied selection (item id + quantity pairs)
//! into normalized line items by looking each id up in the catalog. The
//! resolution is atomic across the whole list: the first unresolvable
//! reference fails everything, and no partial order is ever produced.

pub mod order;
pub mod resolver;

pub use order::{CustomerDetails, Order, OrderLineItem};
pub use resolver::{ResolveError, ResolverOptions, Selection, resolve};
