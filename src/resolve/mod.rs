//! Instance resolution.
//!
//! Everything that can hand out objects by type implements
//! [`InstanceResolver`]: the [`InstancePoolResolver`], the
//! [`MergedResolver`] composite, and any caller-provided capability. The
//! built-in resolvers are gathered in the [`Resolver`] sum type so composites
//! can hold them without boxing trait objects.
//!
//! Resolution-layer failures are plain `bool`/`Option` answers so recursive
//! probing stays cheap; only [`InstanceResolver::require`] turns a miss into a
//! [`ResolutionError`].
use crate::{error::ResolutionError, types::TypeDescription, value::ObjectRef};
use enum_dispatch::enum_dispatch;
use std::sync::Arc;

pub mod merged;
pub mod pool;
pub mod selector;

pub use merged::MergedResolver;
pub use pool::{InstancePoolResolver, PoolStats};
pub use selector::{select_constructor, virtual_candidates, VirtualCandidate};

#[enum_dispatch]
pub trait InstanceResolver: Send + Sync {
    /// Whether [`resolve`](Self::resolve) would produce an instance. Never
    /// has observable side effects.
    fn can_resolve(&self, ty: TypeDescription) -> bool;

    fn resolve(&self, ty: TypeDescription) -> Option<ObjectRef>;

    /// The concrete type [`resolve`](Self::resolve) would produce, without
    /// producing it.
    fn resolved_type(&self, ty: TypeDescription) -> Option<TypeDescription> {
        self.resolve(ty).map(|o| o.ty())
    }

    fn require(&self, ty: TypeDescription) -> Result<ObjectRef, ResolutionError> {
        self.resolve(ty)
            .ok_or_else(|| ResolutionError::Unresolvable(ty.name().to_string()))
    }
}

impl<T: InstanceResolver + ?Sized> InstanceResolver for Arc<T> {
    fn can_resolve(&self, ty: TypeDescription) -> bool {
        (**self).can_resolve(ty)
    }

    fn resolve(&self, ty: TypeDescription) -> Option<ObjectRef> {
        (**self).resolve(ty)
    }

    fn resolved_type(&self, ty: TypeDescription) -> Option<TypeDescription> {
        (**self).resolved_type(ty)
    }

    fn require(&self, ty: TypeDescription) -> Result<ObjectRef, ResolutionError> {
        (**self).require(ty)
    }
}

/// Resolves nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyResolver;

impl InstanceResolver for EmptyResolver {
    fn can_resolve(&self, _ty: TypeDescription) -> bool {
        false
    }

    fn resolve(&self, _ty: TypeDescription) -> Option<ObjectRef> {
        None
    }
}

#[enum_dispatch(InstanceResolver)]
#[derive(Clone)]
pub enum Resolver {
    InstancePool(Arc<InstancePoolResolver>),
    Merged(MergedResolver),
    Empty(EmptyResolver),
    Dynamic(Arc<dyn InstanceResolver>),
}

impl Resolver {
    /// A resolver that answers from `self` and consults `secondary` only for
    /// types `self` cannot resolve.
    pub fn merge_with(self, secondary: impl Into<Resolver>) -> Resolver {
        Resolver::Merged(MergedResolver::new(self, secondary.into()))
    }
}

impl From<InstancePoolResolver> for Resolver {
    fn from(pool: InstancePoolResolver) -> Self {
        Resolver::InstancePool(Arc::new(pool))
    }
}
