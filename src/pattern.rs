//! Pattern matching: picking an index and a key range for a triple of literals and/or
//! `?variable` names, and driving a cursor's results back out through [`Bindings`].

use std::rc::Rc;

use crate::atom::Atom;
use crate::cursor::{Bindings, Cursor};
use crate::fact::Fact;

/// Does `token` denote a variable (`?name`) rather than a literal?
pub fn is_variable(token: &str) -> bool {
    token.starts_with('?')
}

/// Which index a pattern should be scanned against, given which positions are variable.
///
/// The original spec's table (§4.5) special-cases the fully-bound and fully-unbound rows
/// to SPO (`with_3`'s single-point lookup and `with_0`'s full scan, respectively) before
/// falling back to the general rule: `!v_s && v_o` picks SPO, otherwise `!v_p` picks POS,
/// otherwise OSP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexChoice {
    Spo,
    Pos,
    Osp,
}

pub fn choose_index(v_s: bool, v_p: bool, v_o: bool) -> IndexChoice {
    if (!v_s && !v_p && !v_o) || (v_s && v_p && v_o) {
        IndexChoice::Spo
    } else if !v_s && v_o {
        IndexChoice::Spo
    } else if !v_p {
        IndexChoice::Pos
    } else {
        IndexChoice::Osp
    }
}

/// A [`Cursor`] paired with the variable names (if any) bound to each of the three
/// positions, so that each step can write the matched atoms back through a caller's
/// [`Bindings`] — the "cursor holds a mutable environment and updates it" alternative
/// from the original spec's Design Notes §9.
pub struct PatternCursor<'a> {
    cursor: Cursor<'a>,
    var_s: Option<String>,
    var_p: Option<String>,
    var_o: Option<String>,
}

impl<'a> PatternCursor<'a> {
    pub(crate) fn new(cursor: Cursor<'a>, var_s: Option<String>, var_p: Option<String>, var_o: Option<String>) -> PatternCursor<'a> {
        PatternCursor { cursor, var_s, var_p, var_o }
    }

    /// Advance the cursor. If a Fact is matched, write the atom at each variable
    /// position into `bindings` under its name before returning it.
    pub fn next(&mut self, bindings: &mut Bindings) -> Option<Rc<Fact>> {
        let fact = self.cursor.next()?;
        if let Some(name) = &self.var_s {
            bindings.set(name, fact.s.clone());
        }
        if let Some(name) = &self.var_p {
            bindings.set(name, fact.p.clone());
        }
        if let Some(name) = &self.var_o {
            bindings.set(name, fact.o.clone());
        }
        Some(fact)
    }
}

/// `Included(sentinel)` bounds for a variable position; the literal atom itself for a
/// fixed one. See the REDESIGN note in `SPEC_FULL.md` §1 for why sentinels are `Atom`
/// variants rather than magic interned strings.
pub(crate) fn bound_pair(fixed: Option<Atom>) -> (Atom, Atom) {
    match fixed {
        Some(atom) => (atom.clone(), atom),
        None => (Atom::NegInf, Atom::PosInf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_selection_matches_the_table() {
        assert_eq!(choose_index(false, false, false), IndexChoice::Spo);
        assert_eq!(choose_index(true, true, true), IndexChoice::Spo);
        assert_eq!(choose_index(false, false, true), IndexChoice::Spo);
        assert_eq!(choose_index(false, true, true), IndexChoice::Spo);
        assert_eq!(choose_index(true, false, false), IndexChoice::Pos);
        assert_eq!(choose_index(true, false, true), IndexChoice::Pos);
        assert_eq!(choose_index(true, true, false), IndexChoice::Osp);
        assert_eq!(choose_index(false, true, false), IndexChoice::Osp);
    }

    #[test]
    fn variable_detection() {
        assert!(is_variable("?s"));
        assert!(!is_variable("Alice"));
    }
}
