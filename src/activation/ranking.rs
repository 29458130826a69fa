use crate::{
    activation::{binding::accepts_text, Activator},
    resolve::InstanceResolver,
    source::SourceValue,
    types::{ConstructorDescription, ParameterDescription, TypeDescription},
};
use std::cmp::Ordering;

/// How well one constructor fits the available sources. A greater rank is a
/// better constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstructorRank {
    /// Required parameters that have a named source or can be resolved by
    /// the fallback.
    pub satisfied_required: usize,
    pub total_parameters: usize,
    /// Matched parameters whose supplier is only assignable to the
    /// parameter type.
    pub inexact_matches: usize,
}

impl Ord for ConstructorRank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.satisfied_required
            .cmp(&other.satisfied_required)
            .then_with(|| other.total_parameters.cmp(&self.total_parameters))
            .then_with(|| other.inexact_matches.cmp(&self.inexact_matches))
    }
}

impl PartialOrd for ConstructorRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// What a parameter would be bound from, as far as ranking can tell without
/// building anything.
enum Supplier {
    Source(Option<TypeDescription>),
    Fallback(Option<TypeDescription>),
}

impl Activator<'_> {
    fn supplier(
        &self,
        param: &ParameterDescription,
        fallback: Option<&dyn InstanceResolver>,
    ) -> Option<Supplier> {
        let source = self.sources().find(&param.name).filter(|s| match &s.value {
            SourceValue::Scalar(_) => accepts_text(param.ty),
            SourceValue::Structured(_) => true,
        });
        if let Some(source) = source {
            let supplied = match &source.value {
                SourceValue::Structured(node) if !accepts_text(param.ty) => node
                    .attribute(&self.config().type_indicator)
                    .and_then(|name| self.registry().find_type(name).ok()),
                _ => None,
            };
            tracing::trace!(parameter = %param.name, ?supplied, "ranked from named source");
            return Some(Supplier::Source(supplied));
        }
        fallback
            .filter(|f| f.can_resolve(param.ty))
            .map(|f| Supplier::Fallback(f.resolved_type(param.ty)))
    }

    pub fn rank(
        &self,
        constructor: &ConstructorDescription,
        fallback: Option<&dyn InstanceResolver>,
    ) -> ConstructorRank {
        let mut rank = ConstructorRank {
            satisfied_required: 0,
            total_parameters: constructor.parameters.len(),
            inexact_matches: 0,
        };
        for param in &constructor.parameters {
            let Some(supplier) = self.supplier(param, fallback) else {
                continue;
            };
            if !param.has_default() {
                rank.satisfied_required += 1;
            }
            let (Supplier::Source(supplied) | Supplier::Fallback(supplied)) = supplier;
            if supplied.is_some_and(|ty| ty != param.ty) {
                rank.inexact_matches += 1;
            }
        }
        rank
    }

    /// The best-ranked constructor of `ty`. Constructors that rank equal to
    /// the best keep declaration order: the earliest one wins.
    pub fn select(
        &self,
        ty: TypeDescription,
        fallback: Option<&dyn InstanceResolver>,
    ) -> Option<&'static ConstructorDescription> {
        let mut best: Option<(&'static ConstructorDescription, ConstructorRank)> = None;
        let mut tied = false;
        for constructor in ty.constructors() {
            let rank = self.rank(constructor, fallback);
            let better = match &best {
                None => true,
                Some((_, current)) => {
                    if rank == *current {
                        tied = true;
                    }
                    rank > *current
                }
            };
            if better {
                best = Some((constructor, rank));
                tied = false;
            }
        }

        let (constructor, rank) = best?;
        if tied {
            tracing::debug!(
                %ty,
                signature = %constructor.signature(ty),
                "constructors rank equal; using the first declared"
            );
        } else {
            tracing::debug!(
                %ty,
                signature = %constructor.signature(ty),
                ?rank,
                "constructor ranked best"
            );
        }
        Some(constructor)
    }
}
