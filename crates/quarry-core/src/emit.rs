//! Named-type emission registry.
//!
//! Every generation step returns an [`Emitted`] value: the thing it built plus
//! a side-table ([`Definitions`]) of the named types it introduced. Side-tables
//! are unioned at every combination point, so a named type reachable through
//! many fields (a shared `IntFilter`, say) ends up in the output exactly once.
//!
//! Generation joins side-tables with [`Definitions::merge_checked`], which
//! rejects a name bound to two shapes: two records sharing a name, or a
//! record whose derived names clash with a built-in filter type. The plain
//! [`Definitions::merge`] is reserved for side-tables already known to agree.
//!
//! Self-referential types are built in two phases: [`Definitions::declare`]
//! registers the name and hands back a [`Pending`], whose `reference()` can be
//! used while computing the body; [`Pending::populate`] fills it in.

use std::collections::BTreeMap;

use crate::api::{NamedType, TypeBody, TypeRef};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Declared,
    Defined(NamedType),
}

/// Side-table of named definitions keyed by type name.
///
/// A BTreeMap keeps emission order deterministic across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definitions {
    slots: BTreeMap<String, Slot>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(definition: NamedType) -> Self {
        let mut defs = Self::new();
        defs.insert(definition);
        defs
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&NamedType> {
        match self.slots.get(name) {
            Some(Slot::Defined(def)) => Some(def),
            _ => None,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Last writer wins.
    pub fn insert(&mut self, definition: NamedType) {
        self.slots
            .insert(definition.name.clone(), Slot::Defined(definition));
    }

    /// Union by key. A definition always replaces a bare declaration; a bare
    /// declaration never replaces a definition.
    pub fn merge(&mut self, other: Definitions) {
        for (name, slot) in other.slots {
            match slot {
                Slot::Defined(_) => {
                    self.slots.insert(name, slot);
                }
                Slot::Declared => {
                    self.slots.entry(name).or_insert(Slot::Declared);
                }
            }
        }
    }

    /// Union by key, failing when one name is bound to two different shapes.
    pub fn merge_checked(&mut self, other: Definitions) -> Result<()> {
        for (name, slot) in &other.slots {
            if let (Some(Slot::Defined(ours)), Slot::Defined(theirs)) = (self.slots.get(name), slot)
            {
                if ours != theirs {
                    return Err(Error::Collision(name.clone()));
                }
            }
        }
        self.merge(other);
        Ok(())
    }

    /// Register `name` before its body exists.
    pub fn declare(&mut self, name: impl Into<String>) -> Result<Pending> {
        let name = name.into();
        if self.slots.contains_key(&name) {
            return Err(Error::Collision(name));
        }
        self.slots.insert(name.clone(), Slot::Declared);
        Ok(Pending { name })
    }

    /// Flatten into a definition list. Fails if a declaration was never
    /// populated.
    pub fn finish(self) -> Result<Vec<NamedType>> {
        self.slots
            .into_iter()
            .map(|(name, slot)| match slot {
                Slot::Defined(def) => Ok(def),
                Slot::Declared => Err(Error::Invariant(format!(
                    "type '{name}' was declared but never populated"
                ))),
            })
            .collect()
    }
}

/// A declared-but-unpopulated named type.
#[derive(Debug)]
#[must_use = "a pending declaration must be populated"]
pub struct Pending {
    name: String,
}

impl Pending {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reference(&self) -> TypeRef {
        TypeRef::named(self.name.clone())
    }

    pub fn populate(self, body: TypeBody, defs: &mut Definitions) -> TypeRef {
        let reference = self.reference();
        defs.insert(NamedType {
            name: self.name,
            body,
        });
        reference
    }
}

/// A generated value plus the named definitions it depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct Emitted<T> {
    pub value: T,
    pub definitions: Definitions,
}

impl<T> Emitted<T> {
    pub fn new(value: T, definitions: Definitions) -> Self {
        Self { value, definitions }
    }

    /// A value that introduces no named types.
    pub fn bare(value: T) -> Self {
        Self::new(value, Definitions::new())
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Emitted<U> {
        Emitted::new(f(self.value), self.definitions)
    }

    /// Chain a step that emits more definitions; both side-tables are kept.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Emitted<U>) -> Emitted<U> {
        let mut definitions = self.definitions;
        let next = f(self.value);
        definitions.merge(next.definitions);
        Emitted::new(next.value, definitions)
    }

    pub fn into_parts(self) -> (T, Definitions) {
        (self.value, self.definitions)
    }

    /// Sequence many emitted values, unioning their side-tables.
    pub fn collect<I>(items: I) -> Emitted<Vec<T>>
    where
        I: IntoIterator<Item = Emitted<T>>,
    {
        let mut values = Vec::new();
        let mut definitions = Definitions::new();
        for item in items {
            values.push(item.value);
            definitions.merge(item.definitions);
        }
        Emitted::new(values, definitions)
    }
}

impl Emitted<NamedType> {
    /// Register the built type in its own side-table and yield a reference.
    pub fn include_self(self) -> Emitted<TypeRef> {
        let reference = self.value.reference();
        let mut definitions = self.definitions;
        definitions.insert(self.value);
        Emitted::new(reference, definitions)
    }
}

impl Emitted<TypeRef> {
    /// Flatten into `(root reference, all definitions)`.
    pub fn finish(self) -> Result<(TypeRef, Vec<NamedType>)> {
        Ok((self.value, self.definitions.finish()?))
    }
}
