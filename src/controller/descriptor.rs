use super::field::FieldSlot;
use super::method::{BoundMethod, Method, Unresolved};
use super::naming::parse_method_name;
use crate::di::{Bindable, Resolver};
use crate::router::{PathCursor, Verb};
use std::fmt;
use std::sync::Arc;

type Binder<C> = Arc<
    dyn Fn(&Resolver<'_>, &mut PathCursor<'_>) -> std::result::Result<BoundMethod<C>, Unresolved>
        + Send
        + Sync,
>;

/// A controller method that may become a route
pub struct Candidate<C> {
    name: String,
    verb: Verb,
    path: String,
    binder: Binder<C>,
}

impl<C> Candidate<C> {
    pub(crate) fn new<M, F>(verb: Verb, path: &str, name: &str, method: F) -> Self
    where
        C: 'static,
        F: Method<C, M>,
    {
        let binder: Binder<C> = Arc::new(move |resolver: &Resolver<'_>, cursor: &mut PathCursor<'_>| {
            method.clone().bind(resolver, cursor)
        });
        Self {
            name: name.to_string(),
            verb,
            path: path.to_string(),
            binder,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Path relative to the controller's party
    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn bind(
        &self,
        resolver: &Resolver<'_>,
        cursor: &mut PathCursor<'_>,
    ) -> std::result::Result<BoundMethod<C>, Unresolved> {
        (self.binder)(resolver, cursor)
    }
}

impl<C> Clone for Candidate<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            verb: self.verb,
            path: self.path.clone(),
            binder: Arc::clone(&self.binder),
        }
    }
}

impl<C> fmt::Debug for Candidate<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("name", &self.name)
            .field("verb", &self.verb)
            .field("path", &self.path)
            .finish()
    }
}

/// Fields and handler methods of a controller type
///
/// Filled in by [`Controller::describe`](super::Controller::describe), by hand
/// or through `#[controller]`.
///
/// # Example
/// ```rust,ignore
/// fn describe(descriptor: &mut Descriptor<Self>) {
///     descriptor
///         .field("todos", |c| &mut c.todos)
///         .method("get", Self::get)
///         .method("get_by", Self::get_by)
///         .handle(Verb::Post, "/{id}/done", "complete", Self::complete);
/// }
/// ```
pub struct Descriptor<C> {
    pub(crate) fields: Vec<FieldSlot<C>>,
    pub(crate) candidates: Vec<Candidate<C>>,
}

impl<C: 'static> Descriptor<C> {
    pub(crate) fn new() -> Self {
        Self {
            fields: Vec::new(),
            candidates: Vec::new(),
        }
    }

    /// Declare an injectable field
    pub fn field<T: Bindable>(&mut self, name: &'static str, accessor: fn(&mut C) -> &mut T) -> &mut Self {
        self.fields.push(FieldSlot::new(name, accessor));
        self
    }

    /// Declare a method routed by its name; names outside the convention are
    /// ignored
    pub fn method<M, F>(&mut self, name: &str, method: F) -> &mut Self
    where
        F: Method<C, M>,
    {
        match parse_method_name(name) {
            Some((verb, path)) => self.insert(Candidate::new(verb, &path, name, method)),
            None => tracing::debug!("'{}' is not a handler name, ignored", name),
        }
        self
    }

    /// Declare a method served on an explicit verb and path
    pub fn handle<M, F>(&mut self, verb: Verb, path: &str, name: &str, method: F) -> &mut Self
    where
        F: Method<C, M>,
    {
        self.insert(Candidate::new(verb, path, name, method));
        self
    }

    pub fn fields(&self) -> &[FieldSlot<C>] {
        &self.fields
    }

    pub fn candidates(&self) -> &[Candidate<C>] {
        &self.candidates
    }

    /// Add a candidate, replacing any earlier one with the same name
    pub(crate) fn insert(&mut self, candidate: Candidate<C>) {
        match self
            .candidates
            .iter_mut()
            .find(|existing| existing.name == candidate.name)
        {
            Some(existing) => *existing = candidate,
            None => self.candidates.push(candidate),
        }
    }

    pub(crate) fn remove(&mut self, name: &str) -> bool {
        let before = self.candidates.len();
        self.candidates.retain(|candidate| candidate.name != name);
        self.candidates.len() != before
    }
}
