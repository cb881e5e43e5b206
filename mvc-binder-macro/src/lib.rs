use proc_macro::TokenStream;

mod controller;
mod http_methods;

/// Implement `mvc_binder::Controller` for the type of an inherent impl block
///
/// Public methods taking `self` or `&self` whose name starts with a verb are
/// routed by name (`get`, `get_by`, `post_login`, `any_ping`, ...). Methods
/// marked with a verb attribute are routed on the given path instead. Fields
/// listed in `fields(..)` are injected from the dependency store.
/// `before_activation` and `after_activation` are moved into the generated
/// trait impl.
///
/// # Example
/// ```ignore
/// #[derive(Clone, Default)]
/// pub struct UserController {
///     users: Arc<dyn UserRepository>,
/// }
///
/// #[controller(fields(users))]
/// impl UserController {
///     // GET /{param1}
///     pub fn get_by(&self, id: u64) -> Option<Json<User>> {
///         self.users.find(id).map(Json)
///     }
///
///     #[post("/{id}/avatar")]
///     pub async fn upload_avatar(self, id: u64, avatar: Avatar) -> StatusCode {
///         // ...
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    controller::controller_attribute(attr, item)
}

/// HTTP GET route for a controller method
#[proc_macro_attribute]
pub fn get(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("get", attr, item)
}

/// HTTP POST route for a controller method
#[proc_macro_attribute]
pub fn post(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("post", attr, item)
}

/// HTTP PUT route for a controller method
#[proc_macro_attribute]
pub fn put(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("put", attr, item)
}

/// HTTP DELETE route for a controller method
#[proc_macro_attribute]
pub fn delete(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("delete", attr, item)
}

/// HTTP PATCH route for a controller method
#[proc_macro_attribute]
pub fn patch(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("patch", attr, item)
}

/// HTTP HEAD route for a controller method
#[proc_macro_attribute]
pub fn head(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("head", attr, item)
}

/// HTTP OPTIONS route for a controller method
#[proc_macro_attribute]
pub fn options(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("options", attr, item)
}

/// HTTP TRACE route for a controller method
#[proc_macro_attribute]
pub fn trace(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("trace", attr, item)
}

/// Route answering every HTTP method
#[proc_macro_attribute]
pub fn any(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("any", attr, item)
}
