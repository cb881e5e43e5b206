use super::descriptor::{Candidate, Descriptor};
use super::method::Method;
use crate::di::{ArgSource, Dependencies};
use crate::router::{Party, Route, Verb};
use std::sync::Arc;

/// A route registered for a controller, with the sources of its arguments
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredRoute {
    pub route: Route,
    pub arguments: Vec<ArgSource>,
}

/// Activation state handed to [`Controller::before_activation`]
///
/// Changes made here apply to this controller only: the dependency scope is a
/// clone of the application's.
///
/// [`Controller::before_activation`]: super::Controller::before_activation
pub struct BeforeActivation<'a, C> {
    pub(crate) descriptor: &'a mut Descriptor<C>,
    pub(crate) dependencies: &'a mut Dependencies,
    pub(crate) router: &'a Arc<dyn Party>,
}

impl<C: 'static> BeforeActivation<'_, C> {
    /// Route `name` explicitly, replacing any discovered route with that name
    pub fn handle<M, F>(&mut self, verb: Verb, path: &str, name: &str, method: F) -> &mut Self
    where
        F: Method<C, M>,
    {
        self.descriptor.handle(verb, path, name, method);
        self
    }

    /// Drop a discovered method; returns `false` if there was none
    pub fn remove(&mut self, name: &str) -> bool {
        self.descriptor.remove(name)
    }

    pub fn candidates(&self) -> &[Candidate<C>] {
        self.descriptor.candidates()
    }

    pub fn dependencies(&self) -> &Dependencies {
        &*self.dependencies
    }

    pub fn dependencies_mut(&mut self) -> &mut Dependencies {
        &mut *self.dependencies
    }

    pub fn router(&self) -> &Arc<dyn Party> {
        self.router
    }
}

/// Activation result handed to [`Controller::after_activation`]
///
/// [`Controller::after_activation`]: super::Controller::after_activation
pub struct AfterActivation<'a> {
    pub(crate) routes: &'a [RegisteredRoute],
    pub(crate) dependencies: &'a Dependencies,
    pub(crate) router: &'a Arc<dyn Party>,
}

impl AfterActivation<'_> {
    pub fn routes(&self) -> &[RegisteredRoute] {
        self.routes
    }

    /// The route served by the method `name`
    pub fn route(&self, name: &str) -> Option<&RegisteredRoute> {
        self.routes.iter().find(|r| r.route.name == name)
    }

    pub fn dependencies(&self) -> &Dependencies {
        self.dependencies
    }

    pub fn router(&self) -> &Arc<dyn Party> {
        self.router
    }
}
