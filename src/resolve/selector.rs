//! Constructor selection for capability-driven resolution.
//!
//! Every constructor competes once per subset of its optional parameters.
//! Such a *virtual candidate* uses all required parameters plus the chosen
//! optional ones, in declaration order, and scores
//! `100 * parameters - optional parameters included`. The unique best
//! candidate wins; a tie at the top is a failure, never a silent pick.
use crate::{
    error::SelectionError,
    resolve::InstanceResolver,
    types::{ConstructorDescription, ParameterDescription, TypeDescription},
};
use std::collections::BTreeMap;

/// Beyond this many usable optional parameters only the full subset is
/// expanded; smaller subsets of the same constructor always score lower.
const MAX_EXPANDED_OPTIONALS: usize = 16;

#[derive(Clone, Debug)]
pub struct VirtualCandidate<'c> {
    pub constructor: &'c ConstructorDescription,
    pub parameters: Vec<&'c ParameterDescription>,
    pub optional_included: usize,
}

impl VirtualCandidate<'_> {
    pub fn score(&self) -> i64 {
        100 * self.parameters.len() as i64 - self.optional_included as i64
    }
}

fn expand<'c>(
    constructor: &'c ConstructorDescription,
    optional: &[&'c ParameterDescription],
) -> Vec<VirtualCandidate<'c>> {
    let masks: Vec<u64> = if optional.len() > MAX_EXPANDED_OPTIONALS {
        vec![u64::MAX >> (64 - optional.len().min(64))]
    } else {
        (0..1u64 << optional.len()).collect()
    };

    masks
        .into_iter()
        .map(|mask| {
            let chosen = |p: &ParameterDescription| {
                optional
                    .iter()
                    .position(|o| std::ptr::eq(*o, p))
                    .is_some_and(|i| mask & (1 << i) != 0)
            };
            let parameters: Vec<_> = constructor
                .parameters
                .iter()
                .filter(|p| !p.has_default() || chosen(*p))
                .collect();
            VirtualCandidate {
                constructor,
                optional_included: parameters.iter().filter(|p| p.has_default()).count(),
                parameters,
            }
        })
        .collect()
}

/// Every virtual candidate of `constructor`, unfiltered.
pub fn virtual_candidates(constructor: &ConstructorDescription) -> Vec<VirtualCandidate<'_>> {
    let optional: Vec<_> = constructor.optional_parameters().collect();
    expand(constructor, &optional)
}

/// Picks the constructor of `ty` whose best virtual candidate can be fully
/// supplied by `capability`.
pub fn select_constructor<R: InstanceResolver + ?Sized>(
    ty: TypeDescription,
    capability: &R,
) -> Result<&'static ConstructorDescription, SelectionError> {
    if !ty.is_instantiable() {
        return Err(SelectionError::NotInstantiable);
    }

    let usable =
        |p: &ParameterDescription| !p.ty.is_primitive_like() && capability.can_resolve(p.ty);

    let mut by_score: BTreeMap<i64, Vec<VirtualCandidate<'static>>> = BTreeMap::new();
    for constructor in ty.constructors() {
        // Candidates holding an unusable parameter are discarded, so optional
        // parameters that can never be supplied are left out of the power set.
        if !constructor.required_parameters().all(|p| usable(p)) {
            continue;
        }
        let optional: Vec<_> = constructor.optional_parameters().filter(|p| usable(*p)).collect();
        for candidate in expand(constructor, &optional) {
            by_score.entry(candidate.score()).or_default().push(candidate);
        }
    }

    let Some((score, best)) = by_score.pop_last() else {
        tracing::debug!(%ty, "no resolvable constructor");
        return Err(SelectionError::NoResolvableConstructor);
    };
    match best.as_slice() {
        [only] => {
            tracing::debug!(
                %ty,
                score,
                signature = %only.constructor.signature(ty),
                "constructor selected"
            );
            Ok(only.constructor)
        }
        tied => {
            tracing::debug!(
                %ty,
                score,
                candidates = tied.len(),
                "constructor selection is ambiguous"
            );
            Err(SelectionError::Ambiguous {
                candidates: tied.len(),
            })
        }
    }
}
