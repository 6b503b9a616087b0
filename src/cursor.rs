//! Cursors and variable bindings for pattern-matching enumeration.

use std::collections::HashMap;
use std::ops::Bound;
use std::rc::Rc;

use crate::atom::Atom;
use crate::fact::{Fact, OspKey, PosKey, SpoKey};
use crate::index::Index;

/// Which index a [`Cursor`] is bound to, and the live range iterator over it.
///
/// Matches the original spec's notion of a cursor "referencing one index" — here made
/// concrete as a small enum instead of a `tree: *mut s_skiplist` field, since the three
/// indices have three different key types.
enum Scan<'a> {
    Spo(std::iter::Peekable<Box<dyn Iterator<Item = Rc<Fact>> + 'a>>),
    Pos(std::iter::Peekable<Box<dyn Iterator<Item = Rc<Fact>> + 'a>>),
    Osp(std::iter::Peekable<Box<dyn Iterator<Item = Rc<Fact>> + 'a>>),
}

/// A stateful iterator over a closed key range of one index.
///
/// A `Cursor<'a>` borrows the `Index` it scans for `'a`; the Rust borrow checker
/// therefore enforces "a live cursor blocks mutation of the store" statically, where the
/// C source relies on documentation alone (§5 of the original spec).
pub struct Cursor<'a> {
    scan: Scan<'a>,
}

impl<'a> Cursor<'a> {
    pub fn over_spo(index: &'a Index<SpoKey>, lo: Bound<SpoKey>, hi: Bound<SpoKey>) -> Cursor<'a> {
        let iter: Box<dyn Iterator<Item = Rc<Fact>> + 'a> = Box::new(index.range(lo, hi));
        Cursor { scan: Scan::Spo(iter.peekable()) }
    }

    pub fn over_pos(index: &'a Index<PosKey>, lo: Bound<PosKey>, hi: Bound<PosKey>) -> Cursor<'a> {
        let iter: Box<dyn Iterator<Item = Rc<Fact>> + 'a> = Box::new(index.range(lo, hi));
        Cursor { scan: Scan::Pos(iter.peekable()) }
    }

    pub fn over_osp(index: &'a Index<OspKey>, lo: Bound<OspKey>, hi: Bound<OspKey>) -> Cursor<'a> {
        let iter: Box<dyn Iterator<Item = Rc<Fact>> + 'a> = Box::new(index.range(lo, hi));
        Cursor { scan: Scan::Osp(iter.peekable()) }
    }

    /// Advance to the next matching Fact, or `None` once the range is exhausted. Once
    /// exhausted, a `Cursor` keeps returning `None` (it wraps a standard `Range`
    /// iterator, which is already fused).
    pub fn next(&mut self) -> Option<Rc<Fact>> {
        match &mut self.scan {
            Scan::Spo(it) => it.next(),
            Scan::Pos(it) => it.next(),
            Scan::Osp(it) => it.next(),
        }
    }

    /// True if another call to `next` would yield a Fact.
    pub fn has_next(&mut self) -> bool {
        match &mut self.scan {
            Scan::Spo(it) => it.peek().is_some(),
            Scan::Pos(it) => it.peek().is_some(),
            Scan::Osp(it) => it.peek().is_some(),
        }
    }
}

/// A caller-supplied environment mapping `?variable` names to the atom they were last
/// bound to. Populated by [`crate::pattern::PatternCursor::next`] on each step.
#[derive(Default, Debug)]
pub struct Bindings {
    slots: HashMap<String, Atom>,
}

impl Bindings {
    pub fn new() -> Bindings {
        Bindings { slots: HashMap::new() }
    }

    /// The atom currently bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Atom> {
        self.slots.get(name)
    }

    /// Bind `name` to `atom`, overwriting any previous binding.
    pub fn set(&mut self, name: &str, atom: Atom) {
        self.slots.insert(name.to_string(), atom);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Atom)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v))
    }
}
