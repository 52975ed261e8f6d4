//! Feature-augmented labels.
//!
//! A category is a phrase name (its coarse type, and the key the chart indexes
//! it under) together with a flat, canonically ordered set of features. A
//! feature value is either an atom or a variable `?x`. Variables are scoped to
//! the production (and so to the edges grown from it); unifying the symbol an
//! edge expects against the label of a complete edge may bind them, and the
//! bindings are then substituted through the whole production.
//!
//! Variables inside a *found* label act as wildcards: they never bind anything
//! on the expecting side, and they are not copied into the merged label.

use crate::grammar::{Advance, Grammar, Label, Production, ProductionSet};

use std::collections::BTreeMap;
use std::rc::Rc;

use derive_more::Display;

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Debug)]
pub enum FeatValue {
    Atom(String),
    Var(String),
}

impl FeatValue {
    pub fn atom(s: impl Into<String>) -> Self { FeatValue::Atom(s.into()) }
    pub fn var(s: impl Into<String>) -> Self { FeatValue::Var(s.into()) }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Debug)]
pub struct Category {
    pub(crate) name: String,
    pub(crate) features: BTreeMap<String, FeatValue>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Category { name: name.into(), features: BTreeMap::new() }
    }

    pub fn with(mut self, feature: impl Into<String>, value: FeatValue) -> Self {
        self.features.insert(feature.into(), value);
        self
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn get(&self, feature: &str) -> Option<&FeatValue> {
        self.features.get(feature)
    }

    pub fn features(&self) -> impl Iterator<Item=(&str, &FeatValue)> {
        self.features.iter().map(|(f, v)| (f.as_str(), v))
    }

    pub fn substitute(&self, bindings: &Bindings) -> Category {
        let features = self.features.iter()
            .map(|(f, v)| (f.clone(), bindings.resolve(v)))
            .collect();
        Category { name: self.name.clone(), features }
    }

    /// Unifies `self`, the category an edge is waiting for, with `found`, the
    /// label of a complete edge. On success returns the merged category, with
    /// any new variable bindings recorded in `bindings`.
    pub fn unify(&self, found: &Category, bindings: &mut Bindings) -> Option<Category> {
        if self.name != found.name {
            return None;
        }
        let mut merged = BTreeMap::new();
        for (feat, value) in &self.features {
            let value = bindings.resolve(value);
            let value = match (value, found.features.get(feat)) {
                (v, None) => v,
                (FeatValue::Atom(a), Some(FeatValue::Atom(b))) => {
                    if &a != b { return None; }
                    FeatValue::Atom(a)
                }
                (FeatValue::Atom(a), Some(FeatValue::Var(_))) => FeatValue::Atom(a),
                (FeatValue::Var(x), Some(FeatValue::Atom(b))) => {
                    if !bindings.bind(&x, b) { return None; }
                    FeatValue::Atom(b.clone())
                }
                (FeatValue::Var(x), Some(FeatValue::Var(_))) => FeatValue::Var(x),
            };
            merged.insert(feat.clone(), value);
        }
        for (feat, value) in &found.features {
            if let FeatValue::Atom(_) = value {
                merged.entry(feat.clone()).or_insert_with(|| value.clone());
            }
        }
        // a variable bound by a later feature may occur in an earlier one
        Some(Category { name: self.name.clone(), features: merged }.substitute(bindings))
    }
}

/// Variable to atom bindings collected during unification.
#[derive(Default, Clone, PartialEq, Eq, Debug)]
pub struct Bindings(BTreeMap<String, String>);

impl Bindings {
    pub fn get(&self, var: &str) -> Option<&str> {
        self.0.get(var).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    fn bind(&mut self, var: &str, atom: &str) -> bool {
        match self.0.get(var) {
            Some(bound) => bound == atom,
            None => {
                self.0.insert(var.to_string(), atom.to_string());
                true
            }
        }
    }

    fn resolve(&self, value: &FeatValue) -> FeatValue {
        match value {
            FeatValue::Var(x) => match self.0.get(x) {
                Some(atom) => FeatValue::Atom(atom.clone()),
                None => value.clone(),
            },
            FeatValue::Atom(_) => value.clone(),
        }
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Debug)]
pub enum FeatSymbol {
    Term(String),
    Cat(Category),
}

impl FeatSymbol {
    pub fn term(s: impl Into<String>) -> Self { FeatSymbol::Term(s.into()) }

    pub fn substitute(&self, bindings: &Bindings) -> FeatSymbol {
        match self {
            FeatSymbol::Term(_) => self.clone(),
            FeatSymbol::Cat(c) => FeatSymbol::Cat(c.substitute(bindings)),
        }
    }
}

impl From<Category> for FeatSymbol {
    fn from(c: Category) -> Self { FeatSymbol::Cat(c) }
}

/// Index key of a feature symbol: the terminal itself, or the category name.
#[derive(PartialEq, Eq, Clone, Hash, Debug, Display)]
pub enum FeatKey {
    #[display(fmt = "'{}'", _0)]
    Term(String),
    #[display(fmt = "{}", _0)]
    Cat(String),
}

impl Label for FeatSymbol {
    type Key = FeatKey;

    fn index_key(&self) -> FeatKey {
        match self {
            FeatSymbol::Term(t) => FeatKey::Term(t.clone()),
            FeatSymbol::Cat(c) => FeatKey::Cat(c.name.clone()),
        }
    }

    fn terminal(token: &str) -> Self { FeatSymbol::Term(token.to_string()) }

    fn as_terminal(&self) -> Option<&str> {
        match self {
            FeatSymbol::Term(t) => Some(t),
            FeatSymbol::Cat(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct FeatureGrammar {
    start: FeatSymbol,
    productions: ProductionSet<FeatSymbol>,
}

impl FeatureGrammar {
    pub fn new(start: FeatSymbol, productions: impl IntoIterator<Item=Production<FeatSymbol>>) -> Self {
        FeatureGrammar { start, productions: productions.into_iter().collect() }
    }
}

impl Grammar for FeatureGrammar {
    type Label = FeatSymbol;

    fn start(&self) -> &FeatSymbol { &self.start }

    fn production_set(&self) -> &ProductionSet<FeatSymbol> { &self.productions }

    fn advance(&self, lhs: &FeatSymbol, rhs: &Rc<[FeatSymbol]>, dot: usize, found: &FeatSymbol)
        -> Option<Advance<FeatSymbol>>
    {
        match (rhs.get(dot)?, found) {
            (FeatSymbol::Term(a), FeatSymbol::Term(b)) if a == b => {
                Some(Advance { lhs: lhs.clone(), rhs: Rc::clone(rhs) })
            }
            (FeatSymbol::Cat(expected), FeatSymbol::Cat(found)) => {
                let mut bindings = Bindings::default();
                let merged = expected.unify(found, &mut bindings)?;
                let rhs: Vec<FeatSymbol> = rhs.iter()
                    .enumerate()
                    .map(|(i, sym)| if i == dot { FeatSymbol::Cat(merged.clone()) } else { sym.substitute(&bindings) })
                    .collect();
                Some(Advance { lhs: lhs.substitute(&bindings), rhs: rhs.into() })
            }
            _ => None,
        }
    }

    fn accepts_root(&self, root: &FeatSymbol, found: &FeatSymbol) -> bool {
        match (root, found) {
            (FeatSymbol::Cat(r), FeatSymbol::Cat(f)) => r.unify(f, &mut Bindings::default()).is_some(),
            (r, f) => r == f,
        }
    }
}

#[cfg(test)]
#[path = "tests/feature.rs"]
mod tests_for_feature;
