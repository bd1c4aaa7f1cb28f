// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::hash::Hash;

use indexmap::IndexSet;

/// Include/Exclude filter over a set of items.
///
/// `Include(S)` contains exactly the members of `S`; `Exclude(S)` contains
/// everything but the members of `S`. An empty `Exclude` therefore means
/// "everything" and is the default for group exports. Equality is structural
/// over the variant and set contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope<T: Eq + Hash> {
    Include(IndexSet<T>),
    Exclude(IndexSet<T>),
}

impl<T: Eq + Hash> Scope<T> {
    pub fn include(items: impl IntoIterator<Item = T>) -> Self {
        Scope::Include(items.into_iter().collect())
    }

    pub fn exclude(items: impl IntoIterator<Item = T>) -> Self {
        Scope::Exclude(items.into_iter().collect())
    }

    /// The scope that contains everything.
    pub fn everything() -> Self {
        Scope::Exclude(IndexSet::new())
    }

    /// The scope that contains nothing.
    pub fn nothing() -> Self {
        Scope::Include(IndexSet::new())
    }

    pub fn contains(&self, item: &T) -> bool {
        match self {
            Scope::Include(set) => set.contains(item),
            Scope::Exclude(set) => !set.contains(item),
        }
    }

    /// Keep only the listed members that satisfy `keep`. The variant is
    /// preserved, so an `Exclude` stays permissive for unlisted items.
    pub fn retain(&mut self, keep: impl Fn(&T) -> bool) {
        match self {
            Scope::Include(set) | Scope::Exclude(set) => set.retain(|item| keep(item)),
        }
    }
}

impl<T: Eq + Hash> Default for Scope<T> {
    fn default() -> Self {
        Scope::everything()
    }
}
