//! Views handed to executors by the batch runners.

use std::slice;

/// The input of one executor invocation.
///
/// Runners without a concurrency limit hand out single items; chunked runners
/// hand out whole chunks.
#[derive(Debug, PartialEq, Eq)]
pub enum Batch<'a, T> {
    Item(&'a T),
    Chunk(&'a [T]),
}

impl<T> Clone for Batch<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Batch<'_, T> {}

impl<'a, T> Batch<'a, T> {
    /// The batch as a slice; a single item becomes a one-element slice.
    #[must_use]
    pub fn as_slice(&self) -> &'a [T] {
        match *self {
            Batch::Item(item) => slice::from_ref(item),
            Batch::Chunk(chunk) => chunk,
        }
    }

    #[must_use]
    pub fn item(&self) -> Option<&'a T> {
        match *self {
            Batch::Item(item) => Some(item),
            Batch::Chunk(_) => None,
        }
    }

    #[must_use]
    pub fn chunk(&self) -> Option<&'a [T]> {
        match *self {
            Batch::Item(_) => None,
            Batch::Chunk(chunk) => Some(chunk),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.as_slice().to_vec()
    }
}

/// Result of partitioning a slice.
///
/// `Flat` is the identity pass-through and holds the very slice that was
/// passed in. `Groups` concatenates back to the original in order.
#[derive(Debug, PartialEq, Eq)]
pub enum Chunked<'a, T> {
    Flat(&'a [T]),
    Groups(Vec<&'a [T]>),
}

impl<'a, T> Chunked<'a, T> {
    /// Number of executor invocations this partition produces.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Chunked::Flat(items) => items.len(),
            Chunked::Groups(groups) => groups.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn is_grouped(&self) -> bool {
        matches!(self, Chunked::Groups(_))
    }

    #[must_use]
    pub fn groups(&self) -> Option<&[&'a [T]]> {
        match self {
            Chunked::Flat(_) => None,
            Chunked::Groups(groups) => Some(groups),
        }
    }

    /// One batch per element (`Flat`) or per group (`Groups`).
    #[must_use]
    pub fn batches(&self) -> Vec<Batch<'a, T>> {
        match self {
            Chunked::Flat(items) => {
                let items: &'a [T] = *items;
                items.iter().map(Batch::Item).collect()
            }
            Chunked::Groups(groups) => groups.iter().map(|&group| Batch::Chunk(group)).collect(),
        }
    }

    /// Concatenation of every group, in order.
    #[must_use]
    pub fn concat(&self) -> Vec<&'a T> {
        match self {
            Chunked::Flat(items) => {
                let items: &'a [T] = *items;
                items.iter().collect()
            }
            Chunked::Groups(groups) => groups.iter().flat_map(|&group| group.iter()).collect(),
        }
    }
}
