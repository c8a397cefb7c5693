//! Range and name interning (component A).
//!
//! Two dedicated pools, each backed by a `PrimaryMap` for the canonical
//! forward table and a `HashMap` for the reverse (dedup) lookup — the same
//! split `cranelift-codegen`'s `ConstantPool` uses for interned constant
//! bytes.

use std::collections::HashMap;

use cranelift_entity::{entity_impl, PrimaryMap};

/// An interned `(msb, lsb)` bit-range. Index 0 is reserved and never handed
/// out by `RangePool::intern`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RangeId(u32);
entity_impl!(RangeId, "rng");

/// An interned byte-string name. Index 0 means "no name" (spec §4.A).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameId(u32);
entity_impl!(NameId, "name");

impl NameId {
    /// The reserved "no name" id.
    pub const NONE: NameId = NameId(0);
}

/// `msb`/`lsb` pair; width is `|msb - lsb| + 1`, and the range is
/// "reversed" when `msb < lsb` (spec §3.1).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Range {
    /// Most-significant bit index.
    pub msb: i32,
    /// Least-significant bit index.
    pub lsb: i32,
}

impl Range {
    /// Build a range, without interning it.
    pub fn new(msb: i32, lsb: i32) -> Self {
        Range { msb, lsb }
    }

    /// `|msb - lsb| + 1`.
    pub fn width(&self) -> u32 {
        (self.msb - self.lsb).unsigned_abs() + 1
    }

    /// `msb < lsb`.
    pub fn is_reversed(&self) -> bool {
        self.msb < self.lsb
    }
}

/// Deduplicates `(msb, lsb)` pairs into compact, stable ids.
///
/// Pre-seeded with the common ranges `(0..64, 0)` and `(k..k)` for scalar
/// widths so that the lookups a bit-blaster does constantly (single bit,
/// byte, word widths) are present from construction — spec §4.A.
pub struct RangePool {
    forward: PrimaryMap<RangeId, Range>,
    reverse: HashMap<(i32, i32), RangeId>,
}

impl RangePool {
    /// Create a pool pre-seeded as specified.
    pub fn new() -> Self {
        let mut pool = RangePool {
            forward: PrimaryMap::new(),
            reverse: HashMap::new(),
        };
        // Reserve index 0; no particular range owns it, but callers that
        // zero-initialize a `RangeId` field must not alias a real range.
        pool.forward.push(Range::new(0, 0));
        for msb in 0..64i32 {
            pool.do_intern(Range::new(msb, 0));
        }
        for k in 0..64i32 {
            pool.do_intern(Range::new(k, k));
        }
        pool
    }

    fn do_intern(&mut self, r: Range) -> RangeId {
        if let Some(&id) = self.reverse.get(&(r.msb, r.lsb)) {
            return id;
        }
        let id = self.forward.push(r);
        self.reverse.insert((r.msb, r.lsb), id);
        id
    }

    /// Intern `(msb, lsb)`, returning the same id for equal keys every time
    /// (spec §8 property 1: range interning idempotence).
    pub fn intern(&mut self, msb: i32, lsb: i32) -> RangeId {
        self.do_intern(Range::new(msb, lsb))
    }

    /// Resolve an id back to its range.
    pub fn get(&self, id: RangeId) -> Range {
        self.forward[id]
    }

    /// Number of distinct ranges interned so far (including the reserved
    /// slot 0).
    pub fn len(&self) -> usize {
        self.forward.len()
    }
}

impl Default for RangePool {
    fn default() -> Self {
        Self::new()
    }
}

/// Deduplicates byte-string names into compact, stable ids. No deletion
/// happens during a job; the only failure mode is `OutOfMemory` (spec
/// §4.A), which in Rust means an allocation failure we don't model
/// explicitly — callers instead see ordinary allocator aborts.
pub struct NamePool {
    forward: PrimaryMap<NameId, Box<[u8]>>,
    reverse: HashMap<Box<[u8]>, NameId>,
}

impl NamePool {
    /// Create an empty pool; index 0 is reserved for "no name".
    pub fn new() -> Self {
        let mut pool = NamePool {
            forward: PrimaryMap::new(),
            reverse: HashMap::new(),
        };
        pool.forward.push(Box::from(&b""[..]));
        pool
    }

    /// Intern `name`, returning the same id for equal byte strings.
    pub fn intern(&mut self, name: &[u8]) -> NameId {
        if let Some(&id) = self.reverse.get(name) {
            return id;
        }
        let boxed: Box<[u8]> = Box::from(name);
        let id = self.forward.push(boxed.clone());
        self.reverse.insert(boxed, id);
        id
    }

    /// Intern a UTF-8 string; convenience over `intern`.
    pub fn intern_str(&mut self, name: &str) -> NameId {
        self.intern(name.as_bytes())
    }

    /// Resolve an id back to its bytes. Panics on `NameId::NONE`.
    pub fn get(&self, id: NameId) -> &[u8] {
        &self.forward[id]
    }

    /// Resolve an id back to a `&str`, assuming it was interned as UTF-8.
    pub fn get_str(&self, id: NameId) -> &str {
        std::str::from_utf8(self.get(id)).expect("name was not interned as utf-8")
    }
}

impl Default for NamePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_intern_idempotent() {
        let mut pool = RangePool::new();
        let a = pool.intern(17, 3);
        let b = pool.intern(17, 3);
        assert_eq!(a, b);
        assert_eq!(pool.get(a), Range::new(17, 3));
    }

    #[test]
    fn range_preseeded() {
        let mut pool = RangePool::new();
        let before = pool.len();
        let id = pool.intern(31, 0);
        assert_eq!(pool.len(), before, "should have hit the pre-seeded entry");
        assert_eq!(pool.get(id).width(), 32);
    }

    #[test]
    fn range_width_and_reversed() {
        assert_eq!(Range::new(3, 0).width(), 4);
        assert!(!Range::new(3, 0).is_reversed());
        assert!(Range::new(0, 3).is_reversed());
    }

    #[test]
    fn name_intern_idempotent_and_none() {
        let mut pool = NamePool::new();
        assert_eq!(pool.get(NameId::NONE), b"");
        let a = pool.intern_str("foo");
        let b = pool.intern_str("foo");
        assert_eq!(a, b);
        assert_ne!(a, NameId::NONE);
        assert_eq!(pool.get_str(a), "foo");
    }
}
