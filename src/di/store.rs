use crate::context::Context;
use crate::di::dependency::{CastFn, Dependency, TypeKey};
use crate::error::{MvcError, Result};

/// Ordered dependency store.
///
/// Entries are never removed; a later entry with the same key shadows an
/// earlier one on lookup. Cloning copies the entry sequence while the values
/// themselves stay shared, so a clone can be extended without touching the
/// original.
#[derive(Clone, Default, Debug)]
pub struct Dependencies {
    entries: Vec<Dependency>,
}

/// Result of a store lookup: the entry and, for a capability match, the
/// conversion into the requested type.
pub struct Lookup<'a> {
    pub(crate) dependency: &'a Dependency,
    pub(crate) cast: Option<&'a CastFn>,
}

impl Lookup<'_> {
    pub fn dependency(&self) -> &Dependency {
        self.dependency
    }

    /// `true` when the entry matched through a declared capability
    pub fn is_capability(&self) -> bool {
        self.cast.is_some()
    }
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one dependency
    ///
    /// # Errors
    /// Returns [`MvcError::MalformedDependency`] if the dependency was built
    /// with an inconsistent capability or produces nothing injectable.
    pub fn add(&mut self, dependency: Dependency) -> Result<&mut Self> {
        Self::validate(&dependency)?;
        tracing::debug!(
            dependency = dependency.type_name(),
            kind = ?dependency.kind(),
            "dependency added"
        );
        self.entries.push(dependency);
        Ok(self)
    }

    /// Append several dependencies; nothing is appended if any is malformed
    pub fn add_all<I>(&mut self, dependencies: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = Dependency>,
    {
        let dependencies: Vec<Dependency> = dependencies.into_iter().collect();
        for dependency in &dependencies {
            Self::validate(dependency)?;
        }
        for dependency in dependencies {
            self.add(dependency)?;
        }
        Ok(self)
    }

    /// Shorthand for `add(Dependency::value(value))`
    pub fn add_value<T>(&mut self, value: T) -> Result<&mut Self>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.add(Dependency::value(value))
    }

    /// Shorthand for `add(Dependency::provider(provider))`
    pub fn add_provider<T, F>(&mut self, provider: F) -> Result<&mut Self>
    where
        T: Default + Send + Sync + 'static,
        F: Fn(&Context) -> Option<T> + Send + Sync + 'static,
    {
        self.add(Dependency::provider(provider))
    }

    fn validate(dependency: &Dependency) -> Result<()> {
        match dependency.defect() {
            Some(reason) => Err(MvcError::MalformedDependency {
                type_name: dependency.type_name(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Find the entry serving `key`
    ///
    /// The most recent exact match wins; failing that, the most recent entry
    /// declaring `key` as a capability.
    pub fn lookup(&self, key: TypeKey) -> Option<Lookup<'_>> {
        if let Some(dependency) = self.entries.iter().rev().find(|d| d.key == key) {
            return Some(Lookup {
                dependency,
                cast: None,
            });
        }

        self.entries.iter().rev().find_map(|dependency| {
            dependency.capability(key).map(|cast| Lookup {
                dependency,
                cast: Some(cast),
            })
        })
    }

    pub fn lookup_type<T: ?Sized + 'static>(&self) -> Option<Lookup<'_>> {
        self.lookup(TypeKey::of::<T>())
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.lookup_type::<T>().is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
