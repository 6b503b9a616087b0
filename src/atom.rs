//! String interning with reference counting.
//!
//! Atoms are handed out by an [`AtomPool`]: requesting the same byte content twice
//! yields the same [`Atom`] (reference-identical, not just content-equal), and the pool
//! tracks how many live `Fact`s reference each one so it can reclaim entries that are no
//! longer used. This is the same shape as the teacher's deduplication table
//! (`core/src/alloc/dedup.rs`, a pool of shared handles keyed by content and reclaimed on
//! disuse) applied to strings instead of disk pages, and close in spirit to
//! `mquickjs`'s `AtomTable` (interned strings with a `ref_count` field per entry).

use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::rc::Rc;

use seahash::SeaHasher;

/// The backing allocation and usage counter for one interned string.
struct AtomInner {
    bytes: Box<str>,
    usage: Cell<u64>,
}

/// A canonical, reference-counted string handle, or one of the two sentinel extremes
/// used to build range bounds.
///
/// Two real atoms compare equal (`Atom::eq`) iff they are the same allocation —
/// `Rc::ptr_eq` is the fast path the original spec describes, and it coincides with
/// content equality because the pool never hands out two allocations for equal content.
/// Ordering (`Atom::cmp`), by contrast, is always content-based so that a throwaway key
/// built from a literal string (never interned) still compares correctly against real
/// atoms in an index.
#[derive(Clone)]
pub enum Atom {
    /// Sorts below every real atom. Never appears in a stored `Fact`.
    NegInf,
    /// A real, pool-owned string.
    Real(Rc<AtomInner>),
    /// Sorts above every real atom. Never appears in a stored `Fact`.
    PosInf,
}

impl Atom {
    /// The atom's content, or `None` for a sentinel.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Atom::Real(inner) => Some(&inner.bytes),
            Atom::NegInf | Atom::PosInf => None,
        }
    }

    /// The atom's current usage count (the number of Facts referencing it), or `0` for a
    /// sentinel.
    pub fn usage(&self) -> u64 {
        match self {
            Atom::Real(inner) => inner.usage.get(),
            Atom::NegInf | Atom::PosInf => 0,
        }
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Atom) -> bool {
        match (self, other) {
            (Atom::NegInf, Atom::NegInf) => true,
            (Atom::PosInf, Atom::PosInf) => true,
            (Atom::Real(a), Atom::Real(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Atom {}

/// Ranks used purely to order the three `Atom` variants relative to one another;
/// `Real`s are then broken down further by content.
fn rank(atom: &Atom) -> (u8, &str) {
    match atom {
        Atom::NegInf => (0, ""),
        Atom::Real(inner) => (1, &inner.bytes),
        Atom::PosInf => (2, ""),
    }
}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Atom) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Atom) -> Ordering {
        match (self, other) {
            (Atom::NegInf, Atom::NegInf) => Ordering::Equal,
            (Atom::PosInf, Atom::PosInf) => Ordering::Equal,
            (Atom::Real(a), Atom::Real(b)) => a.bytes.as_bytes().cmp(b.bytes.as_bytes()),
            _ => rank(self).0.cmp(&rank(other).0),
        }
    }
}

impl std::fmt::Debug for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Atom::NegInf => write!(f, "Atom::NegInf"),
            Atom::PosInf => write!(f, "Atom::PosInf"),
            Atom::Real(inner) => write!(f, "Atom({:?})", inner.bytes),
        }
    }
}

/// A content-keyed set of interned strings with per-atom usage counts.
///
/// The lookup table is seeded with [`seahash`], the teacher's own hashing dependency
/// (there used for on-disk checksums, here repurposed as a fast, non-cryptographic
/// `HashMap` hasher).
pub struct AtomPool {
    table: HashMap<Box<str>, Rc<AtomInner>, BuildHasherDefault<SeaHasher>>,
}

impl AtomPool {
    /// Create an empty pool. `capacity_hint` is a size hint for the backing table, not a
    /// hard limit (unlike the C source's fixed-size hash set, `HashMap` grows as needed).
    pub fn with_capacity(capacity_hint: usize) -> AtomPool {
        AtomPool {
            table: HashMap::with_capacity_and_hasher(capacity_hint, BuildHasherDefault::default()),
        }
    }

    /// Number of distinct atoms currently interned.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Look up the canonical atom for `string`, without creating one and without
    /// touching its usage counter.
    pub fn find(&self, string: &str) -> Option<Atom> {
        self.table.get(string).map(|inner| Atom::Real(inner.clone()))
    }

    /// Intern `string`, creating a new atom if none exists yet. Always increments the
    /// returned atom's usage counter by one.
    pub fn intern(&mut self, string: &str) -> Atom {
        if let Some(inner) = self.table.get(string) {
            inner.usage.set(inner.usage.get() + 1);
            return Atom::Real(inner.clone());
        }
        let inner = Rc::new(AtomInner {
            bytes: string.into(),
            usage: Cell::new(1),
        });
        self.table.insert(string.into(), inner.clone());
        Atom::Real(inner)
    }

    /// Decrement the usage counter of the atom backing `string`. If it reaches zero,
    /// the atom is removed from the pool's lookup table (the allocation itself survives
    /// until the last outstanding `Atom` clone is dropped).
    pub fn unintern(&mut self, atom: &Atom) {
        let inner = match atom {
            Atom::Real(inner) => inner,
            Atom::NegInf | Atom::PosInf => return,
        };
        let usage = inner.usage.get();
        debug_assert!(usage > 0, "unintern called more often than intern");
        if usage == 0 {
            return;
        }
        inner.usage.set(usage - 1);
        if usage - 1 == 0 {
            self.table.remove(inner.bytes.as_ref());
        }
    }
}
