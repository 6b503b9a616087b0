//! The `Store`: owns the atom pool, the three indices, and an optional log.
//!
//! Operation sequencing mirrors `examples/original_source/facts.c`'s
//! `facts_add_fact`/`facts_remove_fact`/`facts_get_fact`/`facts_count`, adapted to
//! resolve the open question in §7 of the original spec (see `add_fact` below) and to
//! log uniformly before mutation (§9's WAL-ordering note). Logging density follows the
//! teacher's `core/src/fs/mod.rs` `State` (an owning struct that emits `debug!`/`trace!`
//! around each mutating operation).

use std::io::{BufRead, Write};
use std::ops::Bound;
use std::rc::Rc;

use slog::{debug, info, o, trace, warn, Logger};

use crate::atom::{Atom, AtomPool};
use crate::cursor::{Bindings, Cursor};
use crate::error::Error;
use crate::fact::{Fact, OspKey, PosKey, SpoKey};
use crate::index::Index;
use crate::log::{self, Log, Op};
use crate::pattern::{self, IndexChoice, PatternCursor};

/// Capacity and logging configuration for a new [`Store`].
///
/// Plain code-level configuration, matching the teacher's own `StateBlock`/`Options`
/// (`core/src/alloc/state_block.rs`) rather than an external config-file crate — there
/// is no on-disk or network configuration surface here to justify one.
pub struct StoreConfig {
    /// Size hint for the atom pool's hash table.
    pub atom_capacity_hint: usize,
}

impl Default for StoreConfig {
    fn default() -> StoreConfig {
        StoreConfig { atom_capacity_hint: 1024 }
    }
}

/// An in-memory triple-store: atom pool + SPO/POS/OSP indices + optional log.
pub struct Store<W: Write> {
    pool: AtomPool,
    spo: Index<SpoKey>,
    pos: Index<PosKey>,
    osp: Index<OspKey>,
    log: Option<Log<W>>,
    logger: Logger,
}

impl<W: Write> Store<W> {
    /// Build a store with a silent (`slog::Discard`) logger. Callers that want
    /// structured log output should use [`Store::with_logger`].
    pub fn new(config: StoreConfig) -> Store<W> {
        Store::with_logger(config, Logger::root(slog::Discard, o!()))
    }

    pub fn with_logger(config: StoreConfig, logger: Logger) -> Store<W> {
        info!(logger, "opening store"; "atom_capacity_hint" => config.atom_capacity_hint);
        Store {
            pool: AtomPool::with_capacity(config.atom_capacity_hint),
            spo: Index::new(),
            pos: Index::new(),
            osp: Index::new(),
            log: None,
            logger,
        }
    }

    /// Attach a log; subsequent mutations are appended to it before being applied.
    pub fn enable_log(&mut self, writer: W) {
        info!(self.logger, "log enabled");
        self.log = Some(Log::new(writer));
    }

    pub fn is_logging(&self) -> bool {
        self.log.is_some()
    }

    /// Resolve a canonical atom for `string` without creating one. Exposed so that
    /// advanced callers can build their own index keys (see `pattern.rs`).
    pub fn find_atom(&self, string: &str) -> Option<Atom> {
        self.pool.find(string)
    }

    /// Number of distinct Facts currently stored (the size of the SPO index, which by
    /// invariant equals the size of the other two).
    pub fn count(&self) -> usize {
        self.spo.len()
    }

    /// Insert `(s, p, o)`, interning its atoms as needed. Idempotent: adding an already
    /// -present triple returns the existing Fact unchanged, touching neither usage
    /// counters nor the log.
    ///
    /// This resolves the open question in §7 of the original spec (unconditional
    /// `intern` before the duplicate check leaks three usage increments per duplicate
    /// add): the existence check below uses `find`, never `intern`, so nothing is ever
    /// interned on the duplicate path. The log append also happens before interning, so
    /// a failed append (`Err` returned here) leaves no dangling usage increments behind.
    pub fn add_fact(&mut self, s: &str, p: &str, o: &str) -> Result<Rc<Fact>, Error> {
        if let (Some(sa), Some(pa), Some(oa)) = (self.pool.find(s), self.pool.find(p), self.pool.find(o)) {
            let key = SpoKey(sa, pa, oa);
            if let Some(existing) = self.spo.get(&key) {
                trace!(self.logger, "add_fact: already present"; "s" => s, "p" => p, "o" => o);
                return Ok(existing.clone());
            }
        }
        if let Some(log) = &mut self.log {
            log.append(Op::Add, s, p, o)?;
        }
        let sa = self.pool.intern(s);
        let pa = self.pool.intern(p);
        let oa = self.pool.intern(o);
        let fact = Rc::new(Fact::new(sa, pa, oa));
        self.spo.insert(SpoKey::of(&fact), fact.clone());
        self.pos.insert(PosKey::of(&fact), fact.clone());
        self.osp.insert(OspKey::of(&fact), fact.clone());
        debug!(self.logger, "add_fact"; "s" => s, "p" => p, "o" => o, "count" => self.spo.len());
        Ok(fact)
    }

    /// Like [`Store::add_fact`] but never writes to the log, used by log replay and
    /// snapshot loading (§4.6: "re-apply add ... without re-logging").
    fn add_fact_no_log(&mut self, s: &str, p: &str, o: &str) -> Result<Rc<Fact>, Error> {
        if let (Some(sa), Some(pa), Some(oa)) = (self.pool.find(s), self.pool.find(p), self.pool.find(o)) {
            let key = SpoKey(sa, pa, oa);
            if let Some(existing) = self.spo.get(&key) {
                return Ok(existing.clone());
            }
        }
        let sa = self.pool.intern(s);
        let pa = self.pool.intern(p);
        let oa = self.pool.intern(o);
        let fact = Rc::new(Fact::new(sa, pa, oa));
        self.spo.insert(SpoKey::of(&fact), fact.clone());
        self.pos.insert(PosKey::of(&fact), fact.clone());
        self.osp.insert(OspKey::of(&fact), fact.clone());
        Ok(fact)
    }

    /// Remove `(s, p, o)` if present. Returns `false` (not an error) if it was absent.
    pub fn remove_fact(&mut self, s: &str, p: &str, o: &str) -> Result<bool, Error> {
        match self.remove_fact_inner(s, p, o, true)? {
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }

    fn remove_fact_inner(&mut self, s: &str, p: &str, o: &str, log_this: bool) -> Result<Option<Rc<Fact>>, Error> {
        let (sa, pa, oa) = match (self.pool.find(s), self.pool.find(p), self.pool.find(o)) {
            (Some(sa), Some(pa), Some(oa)) => (sa, pa, oa),
            _ => return Ok(None),
        };
        let key = SpoKey(sa, pa, oa);
        let fact = match self.spo.get(&key) {
            Some(fact) => fact.clone(),
            None => return Ok(None),
        };
        if log_this {
            if let Some(log) = &mut self.log {
                log.append(Op::Remove, s, p, o)?;
            }
        }
        self.spo.remove(&SpoKey::of(&fact));
        self.pos.remove(&PosKey::of(&fact));
        self.osp.remove(&OspKey::of(&fact));
        self.pool.unintern(&fact.s);
        self.pool.unintern(&fact.p);
        self.pool.unintern(&fact.o);
        debug!(self.logger, "remove_fact"; "s" => s, "p" => p, "o" => o, "count" => self.spo.len());
        Ok(Some(fact))
    }

    /// Look up `(s, p, o)` without creating any atoms or mutating any counters.
    pub fn get_fact(&self, s: &str, p: &str, o: &str) -> Option<Rc<Fact>> {
        let sa = self.pool.find(s)?;
        let pa = self.pool.find(p)?;
        let oa = self.pool.find(o)?;
        self.spo.get(&SpoKey(sa, pa, oa)).cloned()
    }

    /// A cursor over every Fact in SPO order (the "fully unbound" dispatch case).
    pub fn cursor_full_scan(&self) -> Cursor<'_> {
        Cursor::over_spo(&self.spo, Bound::Unbounded, Bound::Unbounded)
    }

    /// Pattern-match `(s, p, o)` against the store. Any token starting with `?` is a
    /// variable; its name becomes the key used in `bindings` on each step. Picks the
    /// index per the table in §4.5 and returns a [`PatternCursor`] wired to write
    /// matched atoms back through `bindings`.
    pub fn match_pattern(&self, s: &str, p: &str, o: &str) -> PatternCursor<'_> {
        let v_s = pattern::is_variable(s);
        let v_p = pattern::is_variable(p);
        let v_o = pattern::is_variable(o);

        let atom_or_sentinel = |token: &str, is_var: bool| -> Option<Atom> {
            if is_var {
                None
            } else {
                Some(self.pool.find(token).unwrap_or(Atom::PosInf))
            }
        };
        // A fixed literal that was never interned cannot match anything; using
        // `Atom::PosInf` as its stand-in yields an empty (lo > hi is impossible here
        // since lo==hi==PosInf) single-point range rather than panicking.
        let sa = atom_or_sentinel(s, v_s);
        let pa = atom_or_sentinel(p, v_p);
        let oa = atom_or_sentinel(o, v_o);

        let choice = pattern::choose_index(v_s, v_p, v_o);
        trace!(self.logger, "match_pattern"; "s" => s, "p" => p, "o" => o, "index" => format!("{:?}", choice));

        let (s_lo, s_hi) = pattern::bound_pair(sa);
        let (p_lo, p_hi) = pattern::bound_pair(pa);
        let (o_lo, o_hi) = pattern::bound_pair(oa);

        let cursor = match choice {
            IndexChoice::Spo => {
                let lo = SpoKey(s_lo, p_lo, o_lo);
                let hi = SpoKey(s_hi, p_hi, o_hi);
                Cursor::over_spo(&self.spo, Bound::Included(lo), Bound::Included(hi))
            }
            IndexChoice::Pos => {
                let lo = PosKey(p_lo, o_lo, s_lo);
                let hi = PosKey(p_hi, o_hi, s_hi);
                Cursor::over_pos(&self.pos, Bound::Included(lo), Bound::Included(hi))
            }
            IndexChoice::Osp => {
                let lo = OspKey(o_lo, s_lo, p_lo);
                let hi = OspKey(o_hi, s_hi, p_hi);
                Cursor::over_osp(&self.osp, Bound::Included(lo), Bound::Included(hi))
            }
        };

        let var_s = v_s.then(|| s.to_string());
        let var_p = v_p.then(|| p.to_string());
        let var_o = v_o.then(|| o.to_string());
        PatternCursor::new(cursor, var_s, var_p, var_o)
    }

    /// Write every Fact to `w` in SPO order, one `s p o` line each.
    pub fn write_snapshot<Wr: Write>(&self, w: &mut Wr) -> Result<(), Error> {
        let mut count = 0;
        for fact in self.spo.range(Bound::Unbounded, Bound::Unbounded) {
            log::write_snapshot_record(w, fact.s.as_str().unwrap_or(""), fact.p.as_str().unwrap_or(""), fact.o.as_str().unwrap_or(""))?;
            count += 1;
        }
        info!(self.logger, "wrote snapshot"; "facts" => count);
        Ok(())
    }

    /// Load Facts from a snapshot stream, calling the non-logging `add_fact` path for
    /// each record (§4.6: "a loader reconstructs the store by calling `add_fact` on
    /// each record").
    pub fn load_snapshot<R: BufRead>(&mut self, r: R) -> Result<usize, Error> {
        let records = log::read_records(r)?;
        for record in &records {
            self.add_fact_no_log(&record.s, &record.p, &record.o)?;
        }
        info!(self.logger, "loaded snapshot"; "facts" => records.len());
        Ok(records.len())
    }

    /// Replay a log stream against this store, failing on the first malformed line.
    /// Idempotent: replaying an `add` for an already-present triple, or a `remove` for
    /// an absent one, is a no-op (§4.6).
    pub fn load_log<R: BufRead>(&mut self, r: R) -> Result<usize, Error> {
        let records = log::read_records(r)?;
        self.apply_replayed(&records);
        Ok(records.len())
    }

    /// Like [`Store::load_log`], but skips rather than aborts on malformed lines,
    /// returning the collected parse errors alongside the applied-record count.
    pub fn load_log_lenient<R: BufRead>(&mut self, r: R) -> (usize, Vec<Error>) {
        let (records, errors) = log::read_records_lenient(r);
        for err in &errors {
            warn!(self.logger, "skipping malformed log record"; "error" => format!("{}", err));
        }
        self.apply_replayed(&records);
        (records.len(), errors)
    }

    fn apply_replayed(&mut self, records: &[log::Record]) {
        for record in records {
            match record.op {
                Some(Op::Add) | None => {
                    let _ = self.add_fact_no_log(&record.s, &record.p, &record.o);
                }
                Some(Op::Remove) => {
                    let _ = self.remove_fact_inner(&record.s, &record.p, &record.o, false);
                }
            }
        }
        info!(self.logger, "replayed log"; "records" => records.len(), "count" => self.spo.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor as IoCursor;

    fn new_store() -> Store<Vec<u8>> {
        Store::new(StoreConfig::default())
    }

    #[test]
    fn empty_store_read() {
        let store = new_store();
        assert!(store.get_fact("a", "b", "c").is_none());
        assert_eq!(store.count(), 0);
        let mut cursor = store.cursor_full_scan();
        assert!(cursor.next().is_none());
    }

    #[test]
    fn basic_insert_and_count() {
        let mut store = new_store();
        store.add_fact("Alice", "knows", "Bob").unwrap();
        store.add_fact("Alice", "knows", "Carol").unwrap();
        store.add_fact("Alice", "knows", "Bob").unwrap();
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn pattern_prefix_subject_fixed_yields_spo_order() {
        let mut store = new_store();
        store.add_fact("Alice", "knows", "Bob").unwrap();
        store.add_fact("Alice", "knows", "Carol").unwrap();
        let mut bindings = Bindings::new();
        let mut cursor = store.match_pattern("Alice", "?p", "?o");
        let mut results = Vec::new();
        while let Some(_fact) = cursor.next(&mut bindings) {
            let p = bindings.get("?p").unwrap().as_str().unwrap().to_string();
            let o = bindings.get("?o").unwrap().as_str().unwrap().to_string();
            results.push((p, o));
        }
        assert_eq!(results, vec![("knows".to_string(), "Bob".to_string()), ("knows".to_string(), "Carol".to_string())]);
    }

    #[test]
    fn pattern_using_pos_order() {
        let mut store = new_store();
        store.add_fact("Alice", "knows", "Bob").unwrap();
        store.add_fact("Alice", "knows", "Carol").unwrap();
        store.add_fact("Bob", "knows", "Carol").unwrap();
        let mut bindings = Bindings::new();
        let mut cursor = store.match_pattern("?s", "knows", "Carol");
        let mut results = Vec::new();
        while let Some(_fact) = cursor.next(&mut bindings) {
            results.push(bindings.get("?s").unwrap().as_str().unwrap().to_string());
        }
        assert_eq!(results, vec!["Alice".to_string(), "Bob".to_string()]);
    }

    #[test]
    fn remove_restores_absence() {
        let mut store = new_store();
        store.add_fact("Alice", "knows", "Bob").unwrap();
        store.add_fact("Alice", "knows", "Carol").unwrap();
        store.add_fact("Bob", "knows", "Carol").unwrap();
        assert!(store.remove_fact("Alice", "knows", "Bob").unwrap());
        assert!(store.get_fact("Alice", "knows", "Bob").is_none());
        assert_eq!(store.count(), 2);
        assert!(!store.remove_fact("Alice", "knows", "Bob").unwrap());
    }

    #[test]
    fn add_fact_is_idempotent_on_usage_counters() {
        let mut store = new_store();
        store.add_fact("Alice", "knows", "Bob").unwrap();
        let before = store.find_atom("Alice").unwrap().usage();
        store.add_fact("Alice", "knows", "Bob").unwrap();
        let after = store.find_atom("Alice").unwrap().usage();
        assert_eq!(before, after, "duplicate add must not leak a usage increment");
    }

    #[test]
    fn log_replay_cancels_add_then_remove() {
        let mut log_buf = Vec::new();
        {
            let mut store = Store::with_logger(StoreConfig::default(), Logger::root(slog::Discard, o!()));
            store.enable_log(Vec::new());
            store.add_fact("Alice", "knows", "Bob").unwrap();
            store.add_fact("Alice", "knows", "Carol").unwrap();
            store.add_fact("Bob", "knows", "Carol").unwrap();
            store.remove_fact("Alice", "knows", "Bob").unwrap();
            // pull the bytes back out of the in-memory log writer
            log_buf = store.log.unwrap().into_inner();
        }
        let mut fresh: Store<Vec<u8>> = new_store();
        let applied = fresh.load_log(IoCursor::new(log_buf)).unwrap();
        assert_eq!(applied, 4);
        assert_eq!(fresh.count(), 2);
        assert!(fresh.get_fact("Alice", "knows", "Carol").is_some());
        assert!(fresh.get_fact("Bob", "knows", "Carol").is_some());
        assert!(fresh.get_fact("Alice", "knows", "Bob").is_none());
    }

    #[test]
    fn snapshot_round_trip() {
        let mut store = new_store();
        store.add_fact("Alice", "knows", "Bob").unwrap();
        store.add_fact("Alice", "knows", "Carol").unwrap();
        let mut buf = Vec::new();
        store.write_snapshot(&mut buf).unwrap();

        let mut fresh: Store<Vec<u8>> = new_store();
        fresh.load_snapshot(IoCursor::new(buf)).unwrap();
        assert_eq!(fresh.count(), store.count());
        assert!(fresh.get_fact("Alice", "knows", "Bob").is_some());
        assert!(fresh.get_fact("Alice", "knows", "Carol").is_some());
    }

    #[test]
    fn range_query_on_nonmatching_prefix_yields_nothing() {
        let mut store = new_store();
        store.add_fact("Alice", "knows", "Bob").unwrap();
        let mut bindings = Bindings::new();
        let mut cursor = store.match_pattern("Zeke", "?p", "?o");
        assert!(cursor.next(&mut bindings).is_none());
    }

    #[test]
    fn full_scan_yields_all_facts() {
        let mut store = new_store();
        store.add_fact("Alice", "knows", "Bob").unwrap();
        store.add_fact("Bob", "knows", "Carol").unwrap();
        let mut bindings = Bindings::new();
        let mut cursor = store.match_pattern("?s", "?p", "?o");
        let mut n = 0;
        while cursor.next(&mut bindings).is_some() {
            n += 1;
        }
        assert_eq!(n, 2);
    }
}
