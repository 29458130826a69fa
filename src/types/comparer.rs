use crate::types::{TypeDescription, TypeKind};
use std::collections::{HashSet, VecDeque};

impl TypeDescription {
    /// Whether a value of this type can be used where `ancestor` is expected.
    pub fn is_assignable_to(&self, ancestor: TypeDescription) -> bool {
        if *self == ancestor || ancestor.is_object() {
            return true;
        }
        if let TypeKind::Nullable(inner) = ancestor.kind() {
            return *self == *inner;
        }

        let mut seen = HashSet::new();
        let mut queue: VecDeque<TypeDescription> = self.ancestors().collect();
        queue.extend(self.interfaces().iter().copied());

        while let Some(current) = queue.pop_front() {
            if current == ancestor {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            queue.extend(current.interfaces().iter().copied());
        }
        false
    }

    /// The type itself, every ancestor class except the Object root, and
    /// every interface implemented anywhere in the hierarchy.
    pub fn satisfied_types(&self) -> Vec<TypeDescription> {
        let mut result = vec![*self];
        result.extend(self.ancestors().filter(|a| !a.is_object()));
        for i in self.all_interfaces() {
            if !result.contains(&i) {
                result.push(i);
            }
        }
        result.retain(|t| !t.is_object());
        result
    }
}
