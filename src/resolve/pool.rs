//! Resolver over a fixed pool of pre-built instances.
//!
//! Every instance is indexed under each type it satisfies. Types that are not
//! indexed are built on demand: the pool selects a constructor using itself as
//! the capability and caches a [`Factory`] for it, or a permanent
//! "unresolvable" marker when none exists.
use crate::{
    error::{ResolutionError, SelectionError},
    resolve::{select_constructor, InstanceResolver, Resolver},
    types::{ConstructorDescription, TypeDescription},
    value::{ObjectRef, Value},
};
use dashmap::DashMap;
use std::{
    cell::RefCell,
    collections::HashMap,
    fmt::{Debug, Display, Formatter},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

/// A selected constructor together with the type it builds.
#[derive(Debug)]
pub struct Factory {
    ty: TypeDescription,
    constructor: &'static ConstructorDescription,
}

impl Factory {
    pub fn ty(&self) -> TypeDescription {
        self.ty
    }

    pub fn constructor(&self) -> &'static ConstructorDescription {
        self.constructor
    }

    fn build(&self, pool: &InstancePoolResolver) -> Option<ObjectRef> {
        let args: Vec<Value> = self
            .constructor
            .parameters
            .iter()
            .map(|p| {
                let resolved = if !p.ty.is_primitive_like() && pool.can_resolve(p.ty) {
                    pool.resolve(p.ty)
                } else {
                    None
                };
                resolved.map(Value::Object).unwrap_or_else(|| p.default_value())
            })
            .collect();

        match self.constructor.invoke(self.ty, args) {
            Ok(object) => Some(object),
            Err(e) => {
                tracing::warn!(ty = %self.ty, error = %e, "pooled construction failed");
                None
            }
        }
    }
}

struct ProbeFrame {
    pool: usize,
    ty: TypeDescription,
    cycle: bool,
}

thread_local! {
    static PROBES: RefCell<Vec<ProbeFrame>> = const { RefCell::new(Vec::new()) };
}

/// Marks a type as being probed on this thread until dropped.
struct ProbeGuard {
    depth: usize,
}

impl ProbeGuard {
    /// `None` when `ty` is already being probed by `pool` further up the
    /// stack. Every frame above the re-entered one is marked as depending on
    /// an unfinished answer.
    fn enter(pool: usize, ty: TypeDescription) -> Option<Self> {
        PROBES.with_borrow_mut(|stack| {
            if let Some(start) = stack.iter().position(|f| f.pool == pool && f.ty == ty) {
                for frame in &mut stack[start + 1..] {
                    frame.cycle = true;
                }
                return None;
            }
            stack.push(ProbeFrame {
                pool,
                ty,
                cycle: false,
            });
            Some(Self { depth: stack.len() })
        })
    }

    fn in_cycle(&self) -> bool {
        PROBES.with_borrow(|stack| stack.get(self.depth - 1).is_some_and(|f| f.cycle))
    }
}

impl Drop for ProbeGuard {
    fn drop(&mut self) {
        PROBES.with_borrow_mut(|stack| stack.truncate(self.depth - 1));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub hits: u64,
    pub misses: u64,
    pub factories: usize,
    pub failures: usize,
}

impl PoolStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl Display for PoolStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hits: {:>8}, misses: {:>8}, hit_rate: {:>6.2}%, factories: {:>6}, failures: {:>6}",
            self.hits,
            self.misses,
            self.hit_rate() * 100.0,
            self.factories,
            self.failures
        )
    }
}

pub struct InstancePoolResolver {
    instances: HashMap<TypeDescription, ObjectRef>,
    factories: DashMap<TypeDescription, Option<Arc<Factory>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Debug for InstancePoolResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstancePoolResolver")
            .field("indexed", &self.instances.len())
            .field("stats", &self.stats())
            .finish()
    }
}

impl InstancePoolResolver {
    /// Indexes each instance under its concrete type, every ancestor class
    /// except Object and every implemented interface. The first instance
    /// registered for a type keeps it.
    pub fn new(instances: impl IntoIterator<Item = ObjectRef>) -> Self {
        let mut index = HashMap::new();
        for instance in instances {
            for ty in instance.ty().satisfied_types() {
                index.entry(ty).or_insert_with(|| instance.clone());
            }
        }
        tracing::debug!(indexed = index.len(), "instance pool created");
        Self {
            instances: index,
            factories: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Like [`new`](Self::new), skipping anything that is not an object.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Self::new(values.into_iter().filter_map(|v| match v {
            Value::Object(o) => Some(o),
            _ => None,
        }))
    }

    pub fn is_indexed(&self, ty: TypeDescription) -> bool {
        self.instances.contains_key(&ty)
    }

    pub fn indexed_types(&self) -> impl Iterator<Item = TypeDescription> + '_ {
        self.instances.keys().copied()
    }

    pub fn stats(&self) -> PoolStats {
        let failures = self.factories.iter().filter(|e| e.value().is_none()).count();
        PoolStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            factories: self.factories.len() - failures,
            failures,
        }
    }

    pub fn merge_with(self: &Arc<Self>, secondary: impl Into<Resolver>) -> Resolver {
        Resolver::InstancePool(self.clone()).merge_with(secondary)
    }

    fn factory(&self, ty: TypeDescription) -> Option<Arc<Factory>> {
        if let Some(cached) = self.factories.get(&ty).map(|e| e.value().clone()) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return cached;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let guard = ProbeGuard::enter(self as *const Self as usize, ty)?;
        let computed = select_constructor(ty, self)
            .ok()
            .map(|constructor| Arc::new(Factory { ty, constructor }));

        if guard.in_cycle() {
            tracing::trace!(%ty, "not caching result that depends on an unfinished probe");
            return computed;
        }
        // Another thread may have raced us here; the first insert wins.
        self.factories.entry(ty).or_insert(computed).value().clone()
    }
}

impl InstanceResolver for InstancePoolResolver {
    fn can_resolve(&self, ty: TypeDescription) -> bool {
        self.is_indexed(ty) || self.factory(ty).is_some()
    }

    fn resolve(&self, ty: TypeDescription) -> Option<ObjectRef> {
        if let Some(instance) = self.instances.get(&ty) {
            return Some(instance.clone());
        }
        self.factory(ty)?.build(self)
    }

    fn resolved_type(&self, ty: TypeDescription) -> Option<TypeDescription> {
        match self.instances.get(&ty) {
            Some(instance) => Some(instance.ty()),
            None => self.factory(ty).map(|f| f.ty),
        }
    }

    fn require(&self, ty: TypeDescription) -> Result<ObjectRef, ResolutionError> {
        if let Some(object) = self.resolve(ty) {
            return Ok(object);
        }
        match select_constructor(ty, self) {
            Err(SelectionError::Ambiguous { candidates }) => Err(ResolutionError::Ambiguous {
                type_name: ty.name().to_string(),
                candidates,
            }),
            _ => Err(ResolutionError::Unresolvable(ty.name().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConstructorDescription, TypeRegistry};

    #[test]
    fn factories_are_cached() {
        let mut reg = TypeRegistry::new();
        let ty = reg
            .class("Demo.Plain")
            .constructor(ConstructorDescription::new())
            .build();
        let missing = reg.interface("Demo.IMissing").build();

        let pool = InstancePoolResolver::new([]);
        let a = pool.resolve(ty).unwrap();
        let b = pool.resolve(ty).unwrap();
        assert!(!ObjectRef::ptr_eq(&a, &b));
        assert!(!pool.can_resolve(missing));

        let stats = pool.stats();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.factories, 1);
        assert_eq!(stats.failures, 1);
    }

    #[test]
    fn cycles_are_unresolvable() {
        let mut reg = TypeRegistry::new();
        let a = reg.declare("Demo.A", crate::types::TypeKind::Class { is_abstract: false });
        let b = reg
            .class("Demo.B")
            .constructor(ConstructorDescription::new().param("a", a))
            .build();
        reg.define(a)
            .constructor(ConstructorDescription::new().param("b", b))
            .build();

        let pool = InstancePoolResolver::new([]);
        assert!(!pool.can_resolve(a));
        assert!(!pool.can_resolve(b));
        assert!(pool.resolve(a).is_none());
        PROBES.with_borrow(|stack| assert!(stack.is_empty()));
    }

    #[test]
    fn require_reports_ambiguity() {
        let mut reg = TypeRegistry::new();
        let ty = reg
            .class("Demo.Twice")
            .constructor(ConstructorDescription::new())
            .constructor(ConstructorDescription::new())
            .build();
        let pool = InstancePoolResolver::new([]);
        assert_eq!(
            pool.require(ty).unwrap_err(),
            ResolutionError::Ambiguous {
                type_name: "Demo.Twice".into(),
                candidates: 2
            }
        );
    }
}
