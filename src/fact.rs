//! Facts and the three order-specific keys used to index them.

use crate::atom::Atom;

/// An immutable (subject, predicate, object) triple over interned atoms.
///
/// Facts are always handled through `Rc<Fact>` once they enter a `Store`, so the same
/// allocation can live in all three indices at once (see `index.rs`).
#[derive(Clone, Debug)]
pub struct Fact {
    pub s: Atom,
    pub p: Atom,
    pub o: Atom,
}

impl Fact {
    pub fn new(s: Atom, p: Atom, o: Atom) -> Fact {
        Fact { s, p, o }
    }
}

impl PartialEq for Fact {
    fn eq(&self, other: &Fact) -> bool {
        self.s == other.s && self.p == other.p && self.o == other.o
    }
}

impl Eq for Fact {}

/// The key used by the SPO index: orders by subject, then predicate, then object.
///
/// This, together with [`PosKey`] and [`OspKey`], is the idiomatic replacement for the
/// C source's function-pointer comparator attached to a single generic skiplist type —
/// three distinct key types with a derived `Ord` instead of one type with a runtime
/// comparison hook (see the original spec's Design Notes §9, and the REDESIGN note in
/// `SPEC_FULL.md` §1).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpoKey(pub Atom, pub Atom, pub Atom);

/// The key used by the POS index: orders by predicate, then object, then subject.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PosKey(pub Atom, pub Atom, pub Atom);

/// The key used by the OSP index: orders by object, then subject, then predicate.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct OspKey(pub Atom, pub Atom, pub Atom);

impl SpoKey {
    pub fn of(f: &Fact) -> SpoKey {
        SpoKey(f.s.clone(), f.p.clone(), f.o.clone())
    }
}

impl PosKey {
    pub fn of(f: &Fact) -> PosKey {
        PosKey(f.p.clone(), f.o.clone(), f.s.clone())
    }
}

impl OspKey {
    pub fn of(f: &Fact) -> OspKey {
        OspKey(f.o.clone(), f.s.clone(), f.p.clone())
    }
}
