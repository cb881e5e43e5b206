use crate::context::Context;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

pub(crate) type AnyValue = Box<dyn Any + Send + Sync>;

/// A provider erased to the request context in, boxed value out.
pub(crate) type ProviderFn = Arc<dyn Fn(&Context) -> Option<AnyValue> + Send + Sync>;

/// Produces the zero value of a provider's output type.
pub(crate) type ZeroFn = Arc<dyn Fn() -> AnyValue + Send + Sync>;

/// Converts a value of the entry's own type into a capability type.
pub(crate) type CastFn = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> Option<AnyValue> + Send + Sync>;

/// Runtime type descriptor used as the dependency key
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// One value, cloned into every slot it binds
    Static,
    /// A provider invoked once per request
    Dynamic,
}

#[derive(Clone)]
pub(crate) enum Source {
    Static(Arc<dyn Any + Send + Sync>),
    /// `zero` is `None` once the provider is marked required
    Dynamic {
        provider: ProviderFn,
        zero: Option<ZeroFn>,
    },
}

#[derive(Clone)]
pub(crate) struct Capability {
    pub(crate) key: TypeKey,
    pub(crate) cast: CastFn,
}

/// A value or provider available for injection
///
/// Static dependencies wrap one value; dynamic dependencies wrap a function of
/// the request [`Context`]. Either kind may additionally declare capability
/// types it can stand in for, typically trait objects.
///
/// # Example
/// ```rust,ignore
/// let greeter = Dependency::value(EnglishGreeter::default())
///     .provides(|g: &EnglishGreeter| Arc::new(g.clone()) as Arc<dyn Greeter>);
///
/// let user = Dependency::provider(|ctx: &Context| {
///     ctx.header("x-user").map(|name| User { name: name.to_string() })
/// });
/// ```
#[derive(Clone)]
pub struct Dependency {
    pub(crate) key: TypeKey,
    pub(crate) source: Source,
    pub(crate) capabilities: Vec<Capability>,
    defect: Option<String>,
}

impl Dependency {
    /// A static dependency keyed by `T`
    pub fn value<T>(value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        Self::new(TypeKey::of::<T>(), Source::Static(Arc::new(value)))
    }

    /// A dynamic dependency keyed by `T`
    ///
    /// Returning `None` means no value could be produced for this request;
    /// the bound slot then receives `T::default()` unless the dependency is
    /// marked [`required`](Self::required).
    pub fn provider<T, F>(provider: F) -> Self
    where
        T: Default + Send + Sync + 'static,
        F: Fn(&Context) -> Option<T> + Send + Sync + 'static,
    {
        let provider: ProviderFn =
            Arc::new(move |ctx: &Context| provider(ctx).map(|value| Box::new(value) as AnyValue));
        let zero: ZeroFn = Arc::new(|| Box::new(T::default()) as AnyValue);
        Self::new(
            TypeKey::of::<T>(),
            Source::Dynamic {
                provider,
                zero: Some(zero),
            },
        )
    }

    fn new(key: TypeKey, source: Source) -> Self {
        let defect = (key == TypeKey::of::<()>())
            .then(|| "the unit type carries nothing to inject".to_string());
        Self {
            key,
            source,
            capabilities: Vec::new(),
            defect,
        }
    }

    /// Declare that this dependency also satisfies slots of type `C`
    ///
    /// `T` must be the dependency's own type; a mismatch makes the dependency
    /// malformed and it is rejected when added to a store.
    pub fn provides<T, C, F>(mut self, cast: F) -> Self
    where
        T: 'static,
        C: Send + Sync + 'static,
        F: Fn(&T) -> C + Send + Sync + 'static,
    {
        if TypeKey::of::<T>() != self.key {
            self.defect.get_or_insert_with(|| {
                format!(
                    "capability {} converts from {}, not from the dependency's own type",
                    std::any::type_name::<C>(),
                    std::any::type_name::<T>()
                )
            });
            return self;
        }

        let cast: CastFn = Arc::new(move |value: &(dyn Any + Send + Sync)| {
            value
                .downcast_ref::<T>()
                .map(|value| Box::new(cast(value)) as AnyValue)
        });
        self.capabilities.push(Capability {
            key: TypeKey::of::<C>(),
            cast,
        });
        self
    }

    /// Fail the request instead of falling back to `T::default()` when the
    /// provider yields nothing
    ///
    /// Static dependencies always hold a value, so this only affects providers.
    ///
    /// # Example
    /// ```rust,ignore
    /// let user = Dependency::provider(|ctx: &Context| {
    ///     ctx.header("x-user").map(|name| User { name: name.to_string() })
    /// })
    /// .required();
    /// ```
    pub fn required(mut self) -> Self {
        if let Source::Dynamic { zero, .. } = &mut self.source {
            *zero = None;
        }
        self
    }

    /// Whether a request without a provided value is rejected
    pub fn is_required(&self) -> bool {
        matches!(self.source, Source::Dynamic { zero: None, .. })
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn type_name(&self) -> &'static str {
        self.key.name
    }

    pub fn kind(&self) -> DependencyKind {
        match self.source {
            Source::Static(_) => DependencyKind::Static,
            Source::Dynamic { .. } => DependencyKind::Dynamic,
        }
    }

    /// Capability types this dependency can stand in for
    pub fn capabilities(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.capabilities.iter().map(|capability| capability.key)
    }

    pub(crate) fn defect(&self) -> Option<&str> {
        self.defect.as_deref()
    }

    pub(crate) fn capability(&self, key: TypeKey) -> Option<&CastFn> {
        self.capabilities
            .iter()
            .rev()
            .find(|capability| capability.key == key)
            .map(|capability| &capability.cast)
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("key", &self.key)
            .field("kind", &self.kind())
            .field("capabilities", &self.capabilities().collect::<Vec<_>>())
            .finish()
    }
}
