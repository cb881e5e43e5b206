use crate::context::Context;
use crate::di::dependency::{AnyValue, Source, TypeKey};
use crate::di::store::Dependencies;
use crate::error::{MvcError, Result};
use crate::router::PathCursor;
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// Types that can fill a controller field or method parameter
pub trait Bindable: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Bindable for T {}

type ParseFn = fn(&str) -> Option<AnyValue>;

/// Where a bound slot gets its value from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgSource {
    Static,
    Dynamic,
    PathParam { name: String, position: usize },
}

/// A resolved slot of type `S`
pub enum Binding<S> {
    /// Resolved once, cloned per request
    Static(S),
    /// Produced per request; fails when a required provider yields nothing or
    /// its output cannot be converted to `S`
    Dynamic(Arc<dyn Fn(&Context) -> Result<S> + Send + Sync>),
    /// Parsed per request from a matched path parameter
    Path {
        name: String,
        position: usize,
        parse: ParseFn,
    },
}

impl<S: Bindable> Binding<S> {
    pub fn source(&self) -> ArgSource {
        match self {
            Binding::Static(_) => ArgSource::Static,
            Binding::Dynamic(_) => ArgSource::Dynamic,
            Binding::Path { name, position, .. } => ArgSource::PathParam {
                name: name.clone(),
                position: *position,
            },
        }
    }

    /// Produce the slot's value for one request
    pub fn materialize(&self, ctx: &Context) -> Result<S> {
        match self {
            Binding::Static(value) => Ok(value.clone()),
            Binding::Dynamic(provide) => provide(ctx),
            Binding::Path { name, parse, .. } => {
                let raw = ctx.param(name).ok_or_else(|| MvcError::MissingPathParam {
                    name: name.clone(),
                })?;
                parse(raw)
                    .and_then(|value| value.downcast::<S>().ok())
                    .map(|value| *value)
                    .ok_or_else(|| MvcError::PathParam {
                        name: name.clone(),
                        value: raw.to_string(),
                        expected: std::any::type_name::<S>(),
                    })
            }
        }
    }
}

impl<S> fmt::Debug for Binding<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Static(_) => f.write_str("Static"),
            Binding::Dynamic(_) => f.write_str("Dynamic"),
            Binding::Path { name, position, .. } => f
                .debug_struct("Path")
                .field("name", name)
                .field("position", position)
                .finish(),
        }
    }
}

/// Parser for types that may be bound from a path segment
fn primitive_parser<S: 'static>() -> Option<ParseFn> {
    let id = TypeId::of::<S>();

    macro_rules! primitives {
        ($($ty:ty),* $(,)?) => {
            $(
                if id == TypeId::of::<$ty>() {
                    return Some(|raw: &str| raw.parse::<$ty>().ok().map(|v| Box::new(v) as AnyValue));
                }
            )*
        };
    }

    primitives!(
        String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32,
        f64,
    );
    None
}

/// Matches slot types against a dependency store
///
/// Method parameters of primitive type consume the route's path parameters in
/// order before the store is consulted; everything else, fields included, is
/// looked up by type.
pub struct Resolver<'a> {
    dependencies: &'a Dependencies,
}

impl<'a> Resolver<'a> {
    pub fn new(dependencies: &'a Dependencies) -> Self {
        Self { dependencies }
    }

    /// Resolve a controller field; path parameters never apply
    pub fn resolve_field<S: Bindable>(&self) -> Option<Binding<S>> {
        self.resolve_dependency::<S>()
    }

    /// Resolve a method parameter against the route's remaining path parameters
    pub fn resolve_param<S: Bindable>(&self, cursor: &mut PathCursor<'_>) -> Option<Binding<S>> {
        if let Some(parse) = primitive_parser::<S>() {
            if let Some((position, name)) = cursor.next_param() {
                return Some(Binding::Path {
                    name: name.to_string(),
                    position,
                    parse,
                });
            }
        }
        self.resolve_dependency::<S>()
    }

    fn resolve_dependency<S: Bindable>(&self) -> Option<Binding<S>> {
        let found = self.dependencies.lookup(TypeKey::of::<S>())?;
        let cast = found.cast.cloned();

        match &found.dependency.source {
            Source::Static(value) => {
                let value = match cast {
                    None => value.downcast_ref::<S>().cloned(),
                    Some(cast) => cast(value.as_ref())
                        .and_then(|converted| converted.downcast::<S>().ok())
                        .map(|converted| *converted),
                };
                if value.is_none() {
                    tracing::warn!(
                        "static dependency {} could not be converted to {}",
                        found.dependency.type_name(),
                        std::any::type_name::<S>()
                    );
                }
                value.map(Binding::Static)
            }
            Source::Dynamic { provider, zero } => {
                let provider = Arc::clone(provider);
                let zero = zero.clone();
                let type_name = found.dependency.type_name();
                Some(Binding::Dynamic(Arc::new(move |ctx: &Context| {
                    let produced = match (provider(ctx), &zero) {
                        (Some(produced), _) => produced,
                        (None, Some(zero)) => zero(),
                        (None, None) => return Err(MvcError::MissingDependency { type_name }),
                    };
                    let produced = match &cast {
                        None => produced,
                        Some(cast) => cast(produced.as_ref()).ok_or_else(MvcError::binding::<S>)?,
                    };
                    produced
                        .downcast::<S>()
                        .map(|value| *value)
                        .map_err(|_| MvcError::binding::<S>())
                })))
            }
        }
    }
}
