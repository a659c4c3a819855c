//! Attribute overrides over a wrapped object.

use std::collections::HashMap;

use tabula_frame::{Attr, Attributes};

/// Wraps an object, answering attribute lookups from a set of overrides
/// first and from the wrapped object otherwise.
///
/// ```
/// use tabula_frame::{Attr, Attributes, Index};
/// use tabula_testkit::mock::SimpleMock;
///
/// let index = Index::range(3);
/// let mock = SimpleMock::new(&index).with_attr("dtype", "float64");
/// assert_eq!(mock.attr("dtype"), Some(Attr::from("float64")));
/// assert_eq!(mock.attr("len"), Some(Attr::Int(3)));
/// ```
#[derive(Debug)]
pub struct SimpleMock<'a, T: ?Sized> {
    obj: &'a T,
    overrides: HashMap<String, Attr>,
}

impl<'a, T: Attributes + ?Sized> SimpleMock<'a, T> {
    pub fn new(obj: &'a T) -> SimpleMock<'a, T> {
        SimpleMock {
            obj,
            overrides: HashMap::new(),
        }
    }

    pub fn from_pairs<I, K, V>(obj: &'a T, pairs: I) -> SimpleMock<'a, T>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Attr>,
    {
        pairs
            .into_iter()
            .fold(SimpleMock::new(obj), |mock, (k, v)| mock.with_attr(k, v))
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Attr>) -> Self {
        self.overrides.insert(name.into(), value.into());
        self
    }

    pub fn inner(&self) -> &'a T {
        self.obj
    }
}

impl<T: Attributes + ?Sized> Attributes for SimpleMock<'_, T> {
    fn attr(&self, name: &str) -> Option<Attr> {
        self.overrides
            .get(name)
            .cloned()
            .or_else(|| self.obj.attr(name))
    }
}
