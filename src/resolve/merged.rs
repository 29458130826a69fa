use crate::{
    error::ResolutionError,
    resolve::{InstanceResolver, Resolver},
    types::TypeDescription,
    value::ObjectRef,
};

/// Priority-ordered composite of two resolvers.
///
/// The secondary is only asked about types the primary cannot resolve, and
/// never learns about the composite, so merging cannot form a cycle unless a
/// caller builds one by hand.
#[derive(Clone)]
pub struct MergedResolver {
    primary: Box<Resolver>,
    secondary: Box<Resolver>,
}

impl MergedResolver {
    pub fn new(primary: Resolver, secondary: Resolver) -> Self {
        Self {
            primary: Box::new(primary),
            secondary: Box::new(secondary),
        }
    }

    pub fn primary(&self) -> &Resolver {
        &self.primary
    }

    pub fn secondary(&self) -> &Resolver {
        &self.secondary
    }

    fn pick(&self, ty: TypeDescription) -> &Resolver {
        if self.primary.can_resolve(ty) {
            &self.primary
        } else {
            &self.secondary
        }
    }
}

impl InstanceResolver for MergedResolver {
    fn can_resolve(&self, ty: TypeDescription) -> bool {
        self.primary.can_resolve(ty) || self.secondary.can_resolve(ty)
    }

    fn resolve(&self, ty: TypeDescription) -> Option<ObjectRef> {
        self.pick(ty).resolve(ty)
    }

    fn resolved_type(&self, ty: TypeDescription) -> Option<TypeDescription> {
        self.pick(ty).resolved_type(ty)
    }

    fn require(&self, ty: TypeDescription) -> Result<ObjectRef, ResolutionError> {
        self.pick(ty).require(ty)
    }
}
