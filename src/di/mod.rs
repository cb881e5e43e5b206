//! Dependency store and slot resolution.
//!
//! [`Dependencies`] is an ordered, cloneable list of static values and
//! per-request providers. [`Resolver`] matches a slot type against it and
//! hands back a [`Binding`] that knows how to produce the value for a request.

mod dependency;
mod resolver;
mod store;

pub use dependency::{Dependency, DependencyKind, TypeKey};
pub use resolver::{ArgSource, Bindable, Binding, Resolver};
pub use store::{Dependencies, Lookup};
