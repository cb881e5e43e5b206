use crate::context::Context;
use crate::di::{ArgSource, Bindable, Resolver};
use crate::emit::{IntoReply, Reply};
use crate::error::Result;
use crate::router::PathCursor;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// The reply of an invoked method, possibly still running
pub type PendingReply = Pin<Box<dyn Future<Output = Reply> + Send>>;

/// Type-erased invocation of a bound method on a fresh controller
pub type Invoke<C> = Arc<dyn Fn(C, &Context) -> Result<PendingReply> + Send + Sync>;

/// Marker for methods taking `&self` and returning a reply directly
#[derive(Debug, Clone, Copy)]
pub struct Borrowed;

/// Marker for `async` methods taking `self` by value
#[derive(Debug, Clone, Copy)]
pub struct Owned;

/// A method parameter no dependency or path parameter could satisfy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    /// Zero-based parameter index, not counting the receiver
    pub position: usize,
    pub type_name: &'static str,
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parameter #{} of type {} has no source",
            self.position, self.type_name
        )
    }
}

/// A method with every parameter mapped to a source
pub struct BoundMethod<C> {
    pub(crate) invoke: Invoke<C>,
    pub(crate) arguments: Vec<ArgSource>,
}

impl<C> BoundMethod<C> {
    pub fn arguments(&self) -> &[ArgSource] {
        &self.arguments
    }
}

impl<C> Clone for BoundMethod<C> {
    fn clone(&self) -> Self {
        Self {
            invoke: Arc::clone(&self.invoke),
            arguments: self.arguments.clone(),
        }
    }
}

impl<C> fmt::Debug for BoundMethod<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("arguments", &self.arguments)
            .finish()
    }
}

/// A controller method that can be bound into a handler
///
/// Implemented for functions of up to six parameters after the receiver,
/// either `Fn(&C, ..) -> impl IntoReply` or
/// `Fn(C, ..) -> impl Future<Output = impl IntoReply>`. The marker `M` only
/// keeps the implementations apart and is always inferred.
pub trait Method<C, M>: Clone + Send + Sync + 'static {
    /// Resolve every parameter, consuming path parameters from `cursor`
    fn bind(
        self,
        resolver: &Resolver<'_>,
        cursor: &mut PathCursor<'_>,
    ) -> std::result::Result<BoundMethod<C>, Unresolved>;
}

macro_rules! impl_method {
    ($($ty:ident),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
        impl<C, F, R, $($ty,)*> Method<C, (Borrowed, $($ty,)*)> for F
        where
            C: Send + 'static,
            F: Fn(&C, $($ty,)*) -> R + Clone + Send + Sync + 'static,
            R: IntoReply,
            $($ty: Bindable,)*
        {
            fn bind(
                self,
                resolver: &Resolver<'_>,
                cursor: &mut PathCursor<'_>,
            ) -> std::result::Result<BoundMethod<C>, Unresolved> {
                let mut position = 0usize;
                let mut arguments = Vec::new();
                $(
                    let $ty = resolver.resolve_param::<$ty>(cursor).ok_or(Unresolved {
                        position,
                        type_name: std::any::type_name::<$ty>(),
                    })?;
                    arguments.push($ty.source());
                    position += 1;
                )*

                let invoke: Invoke<C> = Arc::new(move |controller: C, ctx: &Context| {
                    $(let $ty = $ty.materialize(ctx)?;)*
                    let reply = (self)(&controller, $($ty,)*).into_reply();
                    Ok(Box::pin(std::future::ready(reply)) as PendingReply)
                });
                Ok(BoundMethod { invoke, arguments })
            }
        }

        #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
        impl<C, F, Fut, $($ty,)*> Method<C, (Owned, $($ty,)*)> for F
        where
            C: Send + 'static,
            F: Fn(C, $($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future + Send + 'static,
            Fut::Output: IntoReply,
            $($ty: Bindable,)*
        {
            fn bind(
                self,
                resolver: &Resolver<'_>,
                cursor: &mut PathCursor<'_>,
            ) -> std::result::Result<BoundMethod<C>, Unresolved> {
                let mut position = 0usize;
                let mut arguments = Vec::new();
                $(
                    let $ty = resolver.resolve_param::<$ty>(cursor).ok_or(Unresolved {
                        position,
                        type_name: std::any::type_name::<$ty>(),
                    })?;
                    arguments.push($ty.source());
                    position += 1;
                )*

                let invoke: Invoke<C> = Arc::new(move |controller: C, ctx: &Context| {
                    $(let $ty = $ty.materialize(ctx)?;)*
                    let pending = (self)(controller, $($ty,)*);
                    Ok(Box::pin(async move { pending.await.into_reply() }) as PendingReply)
                });
                Ok(BoundMethod { invoke, arguments })
            }
        }
    };
}

impl_method!();
impl_method!(A1);
impl_method!(A1, A2);
impl_method!(A1, A2, A3);
impl_method!(A1, A2, A3, A4);
impl_method!(A1, A2, A3, A4, A5);
impl_method!(A1, A2, A3, A4, A5, A6);
