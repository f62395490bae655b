//! Composite and collection genes: pairs, tuples, arrays, and maps.

use germ_core::Randomness;

use crate::{Gene, GeneError, GeneResult};

/// Default cap on randomized collection sizes when a schema declares none.
pub const DEFAULT_MAX_COLLECTION_SIZE: usize = 5;

/// A two-element composite, also used as map entry.
#[derive(Debug, Clone)]
pub struct PairGene {
    pub name: String,
    pub first: Box<Gene>,
    pub second: Box<Gene>,
    /// Whether the first element takes part in mutation. Map keys that are
    /// fixed by the schema set this to false.
    pub first_mutable: bool,
}

impl PairGene {
    pub fn new(name: impl Into<String>, first: Gene, second: Gene) -> Self {
        Self {
            name: name.into(),
            first: Box::new(first),
            second: Box::new(second),
            first_mutable: true,
        }
    }

    pub fn with_fixed_first(mut self) -> Self {
        self.first_mutable = false;
        self
    }

    pub fn is_mutable(&self) -> bool {
        (self.first_mutable && self.first.is_mutable()) || self.second.is_mutable()
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new: bool) {
        if self.first_mutable && self.first.is_mutable() {
            self.first.randomize(rng, force_new);
        }
        if self.second.is_mutable() {
            self.second.randomize(rng, force_new);
        }
    }

    pub fn value_as_raw_string(&self) -> String {
        format!(
            "{}:{}",
            self.first.value_as_raw_string(),
            self.second.value_as_raw_string()
        )
    }

    pub fn value_as_printable_string(&self, previous: &[&Gene]) -> String {
        format!(
            "{}:{}",
            self.first.value_as_printable_string(previous),
            self.second.value_as_printable_string(previous)
        )
    }
}

/// A fixed-arity ordered composite.
#[derive(Debug, Clone)]
pub struct TupleGene {
    pub name: String,
    pub elements: Vec<Gene>,
}

impl TupleGene {
    pub fn new(name: impl Into<String>, elements: Vec<Gene>) -> Self {
        Self {
            name: name.into(),
            elements,
        }
    }

    pub fn is_mutable(&self) -> bool {
        self.elements.iter().any(|g| g.is_mutable())
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new: bool) {
        for element in &mut self.elements {
            if element.is_mutable() {
                element.randomize(rng, force_new);
            }
        }
    }

    pub fn value_as_raw_string(&self) -> String {
        let inner: Vec<String> = self
            .elements
            .iter()
            .map(|g| g.value_as_raw_string())
            .collect();
        format!("({})", inner.join(", "))
    }

    pub fn value_as_printable_string(&self, previous: &[&Gene]) -> String {
        let inner: Vec<String> = self
            .elements
            .iter()
            .map(|g| g.value_as_printable_string(previous))
            .collect();
        format!("({})", inner.join(", "))
    }
}

/// A variable-size homogeneous collection.
///
/// New elements are cloned from the template; size mutations are validated
/// against the declared bounds before they apply.
#[derive(Debug, Clone)]
pub struct ArrayGene {
    pub name: String,
    pub template: Box<Gene>,
    pub elements: Vec<Gene>,
    pub min_size: usize,
    pub max_size: usize,
}

impl ArrayGene {
    pub fn new(name: impl Into<String>, template: Gene) -> Self {
        Self {
            name: name.into(),
            template: Box::new(template),
            elements: Vec::new(),
            min_size: 0,
            max_size: DEFAULT_MAX_COLLECTION_SIZE,
        }
    }

    pub fn with_size_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_size = min;
        self.max_size = max.max(min);
        self
    }

    pub fn is_mutable(&self) -> bool {
        self.max_size > self.min_size
            || (*self.template).is_mutable()
            || self.elements.iter().any(|e| e.is_mutable())
    }

    pub fn is_locally_valid(&self) -> bool {
        (self.min_size..=self.max_size).contains(&self.elements.len())
            && self.elements.iter().all(|g| g.is_locally_valid())
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new: bool) {
        let size = rng.next_int(self.min_size as i64, self.max_size as i64) as usize;
        self.elements.clear();
        for _ in 0..size {
            let mut element = (*self.template).clone();
            if element.is_mutable() {
                element.randomize(rng, force_new);
            }
            self.elements.push(element);
        }
    }

    /// Append an element, validated against the maximum size.
    pub fn add_element(&mut self, element: Gene) -> GeneResult<()> {
        if self.elements.len() >= self.max_size {
            return Err(GeneError::max_size_reached(&self.name, self.max_size));
        }
        self.elements.push(element);
        Ok(())
    }

    /// Remove the element at `index`, validated against the minimum size.
    pub fn remove_element(&mut self, index: usize) -> GeneResult<Gene> {
        if self.elements.len() <= self.min_size {
            return Err(GeneError::min_size_reached(&self.name, self.min_size));
        }
        if index >= self.elements.len() {
            return Err(GeneError::ElementOutOfBounds {
                name: self.name.clone(),
                index,
                size: self.elements.len(),
            });
        }
        Ok(self.elements.remove(index))
    }

    pub fn value_as_raw_string(&self) -> String {
        let inner: Vec<String> = self
            .elements
            .iter()
            .map(|g| g.value_as_raw_string())
            .collect();
        format!("[{}]", inner.join(", "))
    }

    pub fn value_as_printable_string(&self, previous: &[&Gene]) -> String {
        let inner: Vec<String> = self
            .elements
            .iter()
            .map(|g| g.value_as_printable_string(previous))
            .collect();
        format!("[{}]", inner.join(", "))
    }
}

/// A variable-size collection of pair entries with unique keys.
///
/// Elements are `Gene::Pair` values; the pair invariant is enforced on
/// insertion so traversal stays uniform with the rest of the tree.
#[derive(Debug, Clone)]
pub struct MapGene {
    pub name: String,
    pub template: Box<PairGene>,
    pub elements: Vec<Gene>,
    pub min_size: usize,
    pub max_size: usize,
}

impl MapGene {
    pub fn new(name: impl Into<String>, template: PairGene) -> Self {
        Self {
            name: name.into(),
            template: Box::new(template),
            elements: Vec::new(),
            min_size: 0,
            max_size: DEFAULT_MAX_COLLECTION_SIZE,
        }
    }

    pub fn with_size_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_size = min;
        self.max_size = max.max(min);
        self
    }

    pub fn is_mutable(&self) -> bool {
        self.max_size > self.min_size
            || self.template.is_mutable()
            || self.elements.iter().any(|e| e.is_mutable())
    }

    pub fn is_locally_valid(&self) -> bool {
        (self.min_size..=self.max_size).contains(&self.elements.len())
            && self.elements.iter().all(|g| g.is_locally_valid())
    }

    fn contains_key(&self, key: &Gene) -> bool {
        self.elements.iter().any(|e| match e {
            Gene::Pair(p) => p.first.contains_same_value_as(key).unwrap_or(false),
            _ => false,
        })
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new: bool) {
        let size = rng.next_int(self.min_size as i64, self.max_size as i64) as usize;
        self.elements.clear();
        for _ in 0..size {
            let mut entry = (*self.template).clone();
            entry.randomize(rng, force_new);
            // Key collisions are skipped rather than retried; the resulting
            // map may be smaller than drawn but stays key-unique.
            if !self.contains_key(&entry.first) {
                self.elements.push(Gene::Pair(entry));
            }
        }
    }

    /// Insert an entry, validated against the maximum size and key
    /// uniqueness.
    pub fn add_entry(&mut self, entry: Gene) -> GeneResult<()> {
        let pair = match &entry {
            Gene::Pair(p) => p,
            other => return Err(GeneError::type_mismatch("pair", other.kind_name())),
        };
        if self.elements.len() >= self.max_size {
            return Err(GeneError::max_size_reached(&self.name, self.max_size));
        }
        if self.contains_key(&pair.first) {
            return Err(GeneError::duplicate_key(&self.name));
        }
        self.elements.push(entry);
        Ok(())
    }

    /// Remove the entry at `index`, validated against the minimum size.
    pub fn remove_entry(&mut self, index: usize) -> GeneResult<Gene> {
        if self.elements.len() <= self.min_size {
            return Err(GeneError::min_size_reached(&self.name, self.min_size));
        }
        if index >= self.elements.len() {
            return Err(GeneError::ElementOutOfBounds {
                name: self.name.clone(),
                index,
                size: self.elements.len(),
            });
        }
        Ok(self.elements.remove(index))
    }

    pub fn value_as_raw_string(&self) -> String {
        let inner: Vec<String> = self
            .elements
            .iter()
            .map(|e| e.value_as_raw_string())
            .collect();
        format!("{{{}}}", inner.join(", "))
    }

    pub fn value_as_printable_string(&self, previous: &[&Gene]) -> String {
        let inner: Vec<String> = self
            .elements
            .iter()
            .map(|e| e.value_as_printable_string(previous))
            .collect();
        format!("{{{}}}", inner.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IntegerGene, StringGene};

    fn int_gene(name: &str) -> Gene {
        Gene::Integer(IntegerGene::new(name).with_range(Some(0), Some(9)))
    }

    fn entry(key: &str) -> Gene {
        Gene::Pair(PairGene::new(
            "entry",
            Gene::Str(StringGene::new("key").with_value(key)),
            int_gene("value"),
        ))
    }

    #[test]
    fn test_array_randomize_respects_size_bounds() {
        let mut rng = Randomness::new(21);
        let mut array = ArrayGene::new("tags", int_gene("tag")).with_size_bounds(2, 4);

        for _ in 0..50 {
            array.randomize(&mut rng, false);
            assert!(array.is_locally_valid());
            assert!((2..=4).contains(&array.elements.len()));
        }
    }

    #[test]
    fn test_array_add_element_validates_max() {
        let mut array = ArrayGene::new("tags", int_gene("tag")).with_size_bounds(0, 1);

        assert!(array.add_element(int_gene("tag")).is_ok());
        let err = array.add_element(int_gene("tag"));

        assert!(matches!(err, Err(GeneError::MaxSizeReached { .. })));
    }

    #[test]
    fn test_array_remove_element_validates_min() {
        let mut array = ArrayGene::new("tags", int_gene("tag")).with_size_bounds(1, 3);
        array.add_element(int_gene("tag")).unwrap();

        let err = array.remove_element(0);

        assert!(matches!(err, Err(GeneError::MinSizeReached { .. })));
    }

    #[test]
    fn test_map_rejects_duplicate_keys() {
        let template = PairGene::new(
            "entry",
            Gene::Str(StringGene::new("key")),
            int_gene("value"),
        );
        let mut map = MapGene::new("attrs", template);

        assert!(map.add_entry(entry("color")).is_ok());
        assert!(matches!(
            map.add_entry(entry("color")),
            Err(GeneError::DuplicateKey { .. })
        ));
        assert!(map.add_entry(entry("size")).is_ok());
    }

    #[test]
    fn test_map_rejects_non_pair_entry() {
        let template = PairGene::new(
            "entry",
            Gene::Str(StringGene::new("key")),
            int_gene("value"),
        );
        let mut map = MapGene::new("attrs", template);

        assert!(matches!(
            map.add_entry(int_gene("loose")),
            Err(GeneError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_pair_printing() {
        let pair = PairGene::new(
            "entry",
            Gene::Str(StringGene::new("key").with_value("color")),
            Gene::Str(StringGene::new("value").with_value("red")),
        );

        assert_eq!(pair.value_as_raw_string(), "color:red");
        assert_eq!(pair.value_as_printable_string(&[]), "\"color\":\"red\"");
    }
}
