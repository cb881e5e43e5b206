//! Controllers and their activation.
//!
//! A controller is a cloneable struct whose fields receive dependencies and
//! whose methods become routes. [`Controller::describe`] lists both, usually
//! generated by `#[controller]`:
//!
//! ```rust,ignore
//! #[derive(Clone, Default)]
//! struct TodoController {
//!     todos: Arc<dyn TodoStore>,
//!     user: User,
//! }
//!
//! #[controller(fields(todos, user))]
//! impl TodoController {
//!     pub fn get(&self) -> Json<Vec<Todo>> { .. }
//!     pub fn get_by(&self, id: u64) -> Option<Json<Todo>> { .. }
//!     pub async fn post(self, draft: Draft) -> Result<StatusCode, HttpError> { .. }
//! }
//! ```
//!
//! Handler methods are found by name (`get`, `get_by`, `post_login`, ...) or
//! declared explicitly with a verb and path. Every request runs on a fresh
//! clone of the activated controller.

mod activator;
mod descriptor;
mod field;
mod hooks;
mod method;
mod naming;

pub(crate) use activator::activate;
pub use descriptor::{Candidate, Descriptor};
pub use field::{DynamicField, FieldSlot};
pub use hooks::{AfterActivation, BeforeActivation, RegisteredRoute};
pub use method::{Borrowed, BoundMethod, Invoke, Method, Owned, PendingReply, Unresolved};
pub use naming::parse_method_name;

/// A struct whose methods are served as routes
pub trait Controller: Clone + Send + Sync + 'static {
    /// List injectable fields and handler methods
    fn describe(descriptor: &mut Descriptor<Self>);

    /// Runs before binding; may reroute or drop methods and extend this
    /// controller's dependency scope
    fn before_activation(&self, _activation: &mut BeforeActivation<'_, Self>) {}

    /// Runs once the routes are registered
    fn after_activation(&self, _activation: &AfterActivation<'_>) {}
}
