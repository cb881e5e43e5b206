use super::descriptor::Descriptor;
use super::field::{DynamicField, FieldBinding};
use super::hooks::{AfterActivation, BeforeActivation, RegisteredRoute};
use super::Controller;
use crate::di::{Dependencies, Resolver};
use crate::emit::emit;
use crate::router::{join_paths, Party, PathPattern};
use axum::http::StatusCode;
use std::sync::Arc;

/// Discover, bind and register one controller
///
/// Methods and fields that cannot be bound are skipped with a warning; the
/// routes that were registered are returned.
pub(crate) fn activate<C: Controller>(
    mut controller: C,
    dependencies: &Dependencies,
    router: &Arc<dyn Party>,
    error_status: StatusCode,
) -> Vec<RegisteredRoute> {
    let controller_name = std::any::type_name::<C>();

    let mut descriptor = Descriptor::<C>::new();
    C::describe(&mut descriptor);

    let mut scope = dependencies.clone();
    controller.before_activation(&mut BeforeActivation {
        descriptor: &mut descriptor,
        dependencies: &mut scope,
        router,
    });

    let resolver = Resolver::new(&scope);

    let mut dynamic_fields: Vec<DynamicField<C>> = Vec::new();
    for field in &descriptor.fields {
        match field.resolve(&resolver) {
            Some(FieldBinding::Static(apply)) => apply(&mut controller),
            Some(FieldBinding::Dynamic(apply)) => dynamic_fields.push(apply),
            None => tracing::warn!(
                "{}: field '{}' of type {} has no dependency, left as is",
                controller_name,
                field.name(),
                field.type_name()
            ),
        }
    }

    let template = Arc::new(controller);
    let dynamic_fields: Arc<[DynamicField<C>]> = dynamic_fields.into();

    let mut routes = Vec::new();
    for candidate in &descriptor.candidates {
        let full_path = join_paths(router.prefix(), candidate.path());
        let pattern = match PathPattern::parse(&full_path) {
            Ok(pattern) => pattern,
            Err(err) => {
                tracing::warn!("{}: skipping '{}': {}", controller_name, candidate.name(), err);
                continue;
            }
        };

        let mut cursor = pattern.cursor();
        let bound = match candidate.bind(&resolver, &mut cursor) {
            Ok(bound) => bound,
            Err(unresolved) => {
                tracing::warn!(
                    "{}: skipping '{}': {}",
                    controller_name,
                    candidate.name(),
                    unresolved
                );
                continue;
            }
        };

        let handler = emit(
            Arc::clone(&template),
            Arc::clone(&dynamic_fields),
            Arc::clone(&bound.invoke),
            error_status,
        );
        match router.handle(candidate.verb(), candidate.path(), candidate.name(), handler) {
            Ok(route) => {
                tracing::debug!("{} {} -> {}::{}", route.verb, route.path, controller_name, route.name);
                routes.push(RegisteredRoute {
                    route,
                    arguments: bound.arguments,
                });
            }
            Err(err) => {
                tracing::warn!("{}: skipping '{}': {}", controller_name, candidate.name(), err);
            }
        }
    }

    if routes.is_empty() {
        tracing::info!("{} registered no routes", controller_name);
    } else {
        tracing::info!("{} activated with {} route(s)", controller_name, routes.len());
    }

    template.after_activation(&AfterActivation {
        routes: &routes,
        dependencies: &scope,
        router,
    });

    routes
}
