//! Disjoint-set forest with weighted union and path compression.
//!
//! Used to build random partitions and to collapse an assignment relation into
//! group ids.

use crate::Error;

/// Disjoint sets over the elements `0..len`.
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), anticlust::Error> {
/// use anticlust::UnionFind;
///
/// let mut sets = UnionFind::new(4);
/// sets.union(0, 1)?;
/// sets.union(2, 3)?;
///
/// assert!(sets.connected(0, 1)?);
/// assert!(!sets.connected(1, 2)?);
/// assert_eq!(sets.component_count(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct UnionFind {
    /// Parent of each element. A root is its own parent.
    parent: Vec<usize>,
    /// Size of the tree below each root. Meaningless for non-roots.
    size: Vec<usize>,
    component_count: usize,
}

impl UnionFind {
    /// Creates `len` singleton components.
    pub fn new(len: usize) -> UnionFind {
        UnionFind {
            parent: (0..len).collect(),
            size: vec![1; len],
            component_count: len,
        }
    }

    /// Number of elements in the structure.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of disjoint components left.
    pub fn component_count(&self) -> usize {
        self.component_count
    }

    fn check(&self, a: usize) -> Result<(), Error> {
        if a < self.parent.len() {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index: a,
                len: self.parent.len(),
            })
        }
    }

    /// Returns the root of the component of `a`.
    ///
    /// Every visited node is repointed to its grandparent (path halving), which
    /// keeps trees flat without recursion.
    pub fn find(&mut self, mut a: usize) -> Result<usize, Error> {
        self.check(a)?;
        while self.parent[a] != a {
            let grandparent = self.parent[self.parent[a]];
            self.parent[a] = grandparent;
            a = grandparent;
        }
        Ok(a)
    }

    /// Merges the components of `a` and `b`.
    ///
    /// The root of the smaller tree is attached below the root of the larger
    /// one. On ties, `b`'s root goes below `a`'s root.
    pub fn union(&mut self, a: usize, b: usize) -> Result<(), Error> {
        self.check(b)?;
        if a == b {
            return self.check(a);
        }
        let x = self.find(a)?;
        let y = self.find(b)?;
        if x == y {
            return Ok(());
        }
        let (root, child) = if self.size[x] < self.size[y] {
            (y, x)
        } else {
            (x, y)
        };
        self.parent[child] = root;
        self.size[root] += self.size[child];
        self.component_count -= 1;
        Ok(())
    }

    /// Whether `a` and `b` belong to the same component.
    pub fn connected(&mut self, a: usize, b: usize) -> Result<bool, Error> {
        Ok(self.find(a)? == self.find(b)?)
    }
}
