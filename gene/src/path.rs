//! Structural gene addressing.
//!
//! The consistency checker reports an offending gene as a path of child
//! indices from a top-level gene; the repair engine resolves the path
//! mutably when it is ready to randomize. Addressing by path instead of by
//! reference keeps scan and mutation as separate borrows.

use crate::Gene;

/// Child-index path from a top-level gene down to a descendant. Empty means
/// the top-level gene itself.
pub type GenePath = Vec<usize>;

impl Gene {
    /// Resolve a path to a descendant gene.
    pub fn descend(&self, path: &[usize]) -> Option<&Gene> {
        let mut current = self;
        for &index in path {
            current = current.children().into_iter().nth(index)?;
        }
        Some(current)
    }

    /// Resolve a path to a descendant gene, mutably.
    pub fn descend_mut(&mut self, path: &[usize]) -> Option<&mut Gene> {
        match path.split_first() {
            None => Some(self),
            Some((&index, rest)) => self
                .children_mut()
                .into_iter()
                .nth(index)?
                .descend_mut(rest),
        }
    }

    /// All genes in this tree with their paths, pre-order. The root is
    /// included with an empty path.
    pub fn flat_paths(&self) -> Vec<(GenePath, &Gene)> {
        let mut out = Vec::new();
        fn walk<'a>(gene: &'a Gene, path: &GenePath, out: &mut Vec<(GenePath, &'a Gene)>) {
            out.push((path.clone(), gene));
            for (index, child) in gene.children().into_iter().enumerate() {
                let mut child_path = path.clone();
                child_path.push(index);
                walk(child, &child_path, out);
            }
        }
        walk(self, &Vec::new(), &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IntegerGene, OptionalGene, PairGene};

    fn sample() -> Gene {
        Gene::Optional(OptionalGene::new(
            "opt",
            Gene::Pair(PairGene::new(
                "p",
                Gene::Integer(IntegerGene::new("first").with_value(1)),
                Gene::Integer(IntegerGene::new("second").with_value(2)),
            )),
        ))
    }

    #[test]
    fn test_descend_empty_path_is_self() {
        let gene = sample();
        assert_eq!(gene.descend(&[]).unwrap().name(), "opt");
    }

    #[test]
    fn test_descend_nested() {
        let gene = sample();
        assert_eq!(gene.descend(&[0, 1]).unwrap().name(), "second");
        assert!(gene.descend(&[0, 2]).is_none());
        assert!(gene.descend(&[1]).is_none());
    }

    #[test]
    fn test_descend_mut_allows_in_place_mutation() {
        let mut gene = sample();

        if let Some(Gene::Integer(g)) = gene.descend_mut(&[0, 0]) {
            g.value = 42;
        } else {
            unreachable!();
        }

        assert_eq!(gene.descend(&[0, 0]).unwrap().value_as_raw_string(), "42");
    }

    #[test]
    fn test_flat_paths_matches_flat_view() {
        let gene = sample();
        let paths = gene.flat_paths();
        let view = gene.flat_view();

        assert_eq!(paths.len(), view.len());
        for ((path, by_path), by_view) in paths.iter().zip(view) {
            assert_eq!(by_path.name(), by_view.name());
            assert_eq!(gene.descend(path).unwrap().name(), by_path.name());
        }
    }
}
