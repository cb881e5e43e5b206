use crate::context::Context;
use crate::di::{Bindable, Binding, Resolver};
use crate::error::Result;
use std::fmt;
use std::sync::Arc;

/// Writes a per-request value into a freshly cloned controller
pub type DynamicField<C> = Arc<dyn Fn(&mut C, &Context) -> Result<()> + Send + Sync>;

pub(crate) enum FieldBinding<C> {
    /// Applied once to the controller template
    Static(Box<dyn FnOnce(&mut C)>),
    Dynamic(DynamicField<C>),
}

type Bind<C> = Box<dyn Fn(&Resolver<'_>) -> Option<FieldBinding<C>> + Send + Sync>;

/// An injectable controller field
pub struct FieldSlot<C> {
    name: &'static str,
    type_name: &'static str,
    bind: Bind<C>,
}

impl<C: 'static> FieldSlot<C> {
    pub(crate) fn new<T: Bindable>(name: &'static str, accessor: fn(&mut C) -> &mut T) -> Self {
        let bind: Bind<C> = Box::new(move |resolver: &Resolver<'_>| {
            resolver.resolve_field::<T>().map(|binding| match binding {
                Binding::Static(value) => {
                    FieldBinding::Static(Box::new(move |controller: &mut C| {
                        *accessor(controller) = value;
                    }))
                }
                binding => FieldBinding::Dynamic(Arc::new(move |controller: &mut C, ctx: &Context| {
                    *accessor(controller) = binding.materialize(ctx)?;
                    Ok(())
                })),
            })
        });

        Self {
            name,
            type_name: std::any::type_name::<T>(),
            bind,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn resolve(&self, resolver: &Resolver<'_>) -> Option<FieldBinding<C>> {
        (self.bind)(resolver)
    }
}

impl<C> fmt::Debug for FieldSlot<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSlot")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::Dependencies;
    use axum::http::{Method, Uri};

    #[derive(Clone, Default)]
    struct Home {
        title: String,
        visits: u64,
    }

    #[test]
    fn test_static_field_applies_once() {
        let mut store = Dependencies::new();
        store.add_value(String::from("welcome")).unwrap();

        let slot = FieldSlot::new("title", |home: &mut Home| &mut home.title);
        assert_eq!(slot.name(), "title");

        let mut home = Home::default();
        match slot.resolve(&Resolver::new(&store)) {
            Some(FieldBinding::Static(apply)) => apply(&mut home),
            _ => panic!("expected a static binding"),
        }
        assert_eq!(home.title, "welcome");
    }

    #[test]
    fn test_dynamic_field_per_request() {
        let mut store = Dependencies::new();
        store
            .add_provider(|ctx: &Context| ctx.param("n").and_then(|n| n.parse::<u64>().ok()))
            .unwrap();

        let slot = FieldSlot::new("visits", |home: &mut Home| &mut home.visits);
        let apply = match slot.resolve(&Resolver::new(&store)) {
            Some(FieldBinding::Dynamic(apply)) => apply,
            _ => panic!("expected a dynamic binding"),
        };

        let mut home = Home::default();
        let ctx = Context::new(Method::GET, Uri::from_static("/")).with_params([("n", "5")]);
        apply(&mut home, &ctx).unwrap();
        assert_eq!(home.visits, 5);

        let ctx = Context::new(Method::GET, Uri::from_static("/"));
        apply(&mut home, &ctx).unwrap();
        assert_eq!(home.visits, 0);
    }

    #[test]
    fn test_unresolved_field() {
        let store = Dependencies::new();
        let slot = FieldSlot::new("visits", |home: &mut Home| &mut home.visits);
        assert!(slot.resolve(&Resolver::new(&store)).is_none());
    }
}
