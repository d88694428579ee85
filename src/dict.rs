//! Provide methods and data structures for dictionary of strings.
//! This module is based on `libxml/dict.h`, `dict.c`, and so on in `libxml2-v2.11.8`.
//!
//! Please refer to original libxml2 documents also.

use std::{
    cell::RefCell,
    collections::HashSet,
    hash::{BuildHasher, Hasher},
    rc::Rc,
};

/// Hash used by the dictionary.
///
/// This is the string hash of `dict.c` seeded with a per-dictionary random value.
#[derive(Debug, Clone, Copy)]
pub struct XmlDictHashBuilder {
    seed: u64,
}

impl BuildHasher for XmlDictHashBuilder {
    type Hasher = XmlDictHasher;

    fn build_hasher(&self) -> Self::Hasher {
        XmlDictHasher {
            value: self.seed,
            started: false,
        }
    }
}

pub struct XmlDictHasher {
    value: u64,
    started: bool,
}

impl Hasher for XmlDictHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &ch in bytes {
            if !self.started {
                self.value = self.value.wrapping_add(30 * ch as u64);
                self.started = true;
            }
            self.value ^= self
                .value
                .wrapping_shl(5)
                .wrapping_add(self.value.wrapping_shr(3))
                .wrapping_add(ch as u64);
        }
    }

    fn finish(&self) -> u64 {
        let value = self.value;
        value ^ value.wrapping_shl(5).wrapping_add(value.wrapping_shr(3))
    }
}

/// A dictionary of interned strings.
///
/// Every string returned by [`XmlDict::lookup`] is shared, so the dictionary
/// can tell whether a given string is one of its own with [`XmlDict::owns`].
#[derive(Debug)]
pub struct XmlDict {
    strings: HashSet<Rc<str>, XmlDictHashBuilder>,
}

impl XmlDict {
    /// Create a new dictionary
    #[doc(alias = "xmlDictCreate")]
    pub fn new() -> Self {
        Self {
            strings: HashSet::with_hasher(XmlDictHashBuilder {
                seed: rand::random(),
            }),
        }
    }

    /// Add the `name` to the dictionary if not present.
    ///
    /// Returns the internal copy of the name.
    #[doc(alias = "xmlDictLookup")]
    pub fn lookup(&mut self, name: &str) -> Rc<str> {
        if let Some(interned) = self.strings.get(name) {
            return interned.clone();
        }
        let interned: Rc<str> = Rc::from(name);
        self.strings.insert(interned.clone());
        interned
    }

    /// Check if the `name` exists in the dictionary.
    #[doc(alias = "xmlDictExists")]
    pub fn exists(&self, name: &str) -> Option<Rc<str>> {
        self.strings.get(name).cloned()
    }

    /// Check if a string is owned by the dictionary.
    ///
    /// A string with equal contents that was not handed out by this
    /// dictionary is not owned.
    #[doc(alias = "xmlDictOwns")]
    pub fn owns(&self, s: &Rc<str>) -> bool {
        self.strings
            .get(&**s)
            .is_some_and(|interned| Rc::ptr_eq(interned, s))
    }

    /// Returns the number of elements in the dictionary.
    #[doc(alias = "xmlDictSize")]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for XmlDict {
    fn default() -> Self {
        Self::new()
    }
}

/// A dictionary shared between documents.
#[derive(Debug, Clone, Default)]
pub struct XmlDictRef(Rc<RefCell<XmlDict>>);

impl XmlDictRef {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(XmlDict::new())))
    }

    pub fn lookup(&self, name: &str) -> Rc<str> {
        self.0.borrow_mut().lookup(name)
    }

    pub fn exists(&self, name: &str) -> Option<Rc<str>> {
        self.0.borrow().exists(name)
    }

    pub fn owns(&self, s: &Rc<str>) -> bool {
        self.0.borrow().owns(s)
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Check whether two handles refer to the same dictionary.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_dict_lookup() {
        let mut dict = XmlDict::new();
        let a = dict.lookup("foo");
        let b = dict.lookup("foo");
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(dict.len(), 1);
        dict.lookup("bar");
        assert_eq!(dict.len(), 2);
        assert!(dict.exists("bar").is_some());
        assert!(dict.exists("baz").is_none());
    }

    #[test]
    fn test_xml_dict_owns() {
        let mut dict = XmlDict::new();
        let interned = dict.lookup("name");
        let foreign: Rc<str> = Rc::from("name");
        assert!(dict.owns(&interned));
        assert!(!dict.owns(&foreign));

        let mut other = XmlDict::new();
        let elsewhere = other.lookup("name");
        assert!(!dict.owns(&elsewhere));
    }

    #[test]
    fn test_xml_dict_ref_sharing() {
        let dict = XmlDictRef::new();
        let shared = dict.clone();
        let s = dict.lookup("shared");
        assert!(shared.owns(&s));
        assert!(dict.ptr_eq(&shared));
        assert!(!dict.ptr_eq(&XmlDictRef::new()));
    }
}
