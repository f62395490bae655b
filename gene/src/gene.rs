//! The gene sum type and its uniform operations.
//!
//! Every gene kind is one variant; every operation is one exhaustive match.
//! Adding a kind forces each operation to decide how to handle it, which is
//! the point of modeling the hierarchy as a closed type.

use germ_core::{unique_warn, Randomness};

use crate::{
    ArrayGene, AutoIncrementGene, BooleanGene, CycleGene, DateGene, DateTimeGene, EnumGene,
    EnumLiteral, FloatGene, ForeignKeyGene, GeneError, GeneResult, IntegerGene, MapGene,
    ObjectGene, OptionalGene, PairGene, PrimaryKeyGene, SeededGene, StringGene, TimeGene,
    TupleGene, DEFAULT_FLOAT_MAX, DEFAULT_FLOAT_MIN,
};

/// A typed, mutable value container.
#[derive(Debug, Clone)]
pub enum Gene {
    /// Boolean leaf.
    Boolean(BooleanGene),
    /// Integer leaf with an optional range domain.
    Integer(IntegerGene),
    /// Float leaf with an optional range domain.
    Float(FloatGene),
    /// String leaf with length bounds and an optional match pattern.
    Str(StringGene),
    /// Index into an interned constant list.
    Enum(EnumGene),
    /// Database-assigned placeholder; not printable, not mutable.
    AutoIncrement(AutoIncrementGene),
    /// Sentinel for a type cut off at the translation depth bound.
    Cycle(CycleGene),
    /// Calendar date composite.
    Date(DateGene),
    /// Time-of-day composite.
    Time(TimeGene),
    /// Date + time composite.
    DateTime(DateTimeGene),
    /// Two-element composite.
    Pair(PairGene),
    /// Fixed-arity composite.
    Tuple(TupleGene),
    /// Named-field composite.
    Object(ObjectGene),
    /// Variable-size homogeneous collection.
    Array(ArrayGene),
    /// Variable-size key-unique pair collection.
    Map(MapGene),
    /// Presence wrapper.
    Optional(OptionalGene),
    /// Free-gene-or-seeded-constant wrapper.
    Seeded(SeededGene),
    /// Primary-key identity wrapper.
    PrimaryKey(PrimaryKeyGene),
    /// Reference to an earlier primary key.
    ForeignKey(ForeignKeyGene),
}

impl Gene {
    /// Stable label for this gene kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Gene::Boolean(_) => "boolean",
            Gene::Integer(_) => "integer",
            Gene::Float(_) => "float",
            Gene::Str(_) => "string",
            Gene::Enum(_) => "enum",
            Gene::AutoIncrement(_) => "auto_increment",
            Gene::Cycle(_) => "cycle",
            Gene::Date(_) => "date",
            Gene::Time(_) => "time",
            Gene::DateTime(_) => "date_time",
            Gene::Pair(_) => "pair",
            Gene::Tuple(_) => "tuple",
            Gene::Object(_) => "object",
            Gene::Array(_) => "array",
            Gene::Map(_) => "map",
            Gene::Optional(_) => "optional",
            Gene::Seeded(_) => "seeded",
            Gene::PrimaryKey(_) => "primary_key",
            Gene::ForeignKey(_) => "foreign_key",
        }
    }

    /// The gene's name, usually the column or field it was built for.
    pub fn name(&self) -> &str {
        match self {
            Gene::Boolean(g) => &g.name,
            Gene::Integer(g) => &g.name,
            Gene::Float(g) => &g.name,
            Gene::Str(g) => &g.name,
            Gene::Enum(g) => &g.name,
            Gene::AutoIncrement(g) => &g.name,
            Gene::Cycle(g) => &g.name,
            Gene::Date(g) => &g.name,
            Gene::Time(g) => &g.name,
            Gene::DateTime(g) => &g.name,
            Gene::Pair(g) => &g.name,
            Gene::Tuple(g) => &g.name,
            Gene::Object(g) => &g.name,
            Gene::Array(g) => &g.name,
            Gene::Map(g) => &g.name,
            Gene::Optional(g) => &g.name,
            Gene::Seeded(g) => &g.name,
            Gene::PrimaryKey(g) => &g.name,
            Gene::ForeignKey(g) => &g.name,
        }
    }

    /// Whether randomization can produce a different value.
    pub fn is_mutable(&self) -> bool {
        match self {
            Gene::Boolean(_) => true,
            Gene::Integer(g) => g.is_mutable(),
            Gene::Float(g) => {
                g.min.unwrap_or(DEFAULT_FLOAT_MIN) < g.max.unwrap_or(DEFAULT_FLOAT_MAX)
            }
            Gene::Str(g) => g.max_length > 0,
            Gene::Enum(g) => g.is_mutable(),
            Gene::AutoIncrement(_) => false,
            Gene::Cycle(_) => false,
            Gene::Date(_) => true,
            Gene::Time(_) => true,
            Gene::DateTime(_) => true,
            Gene::Pair(g) => g.is_mutable(),
            Gene::Tuple(g) => g.is_mutable(),
            Gene::Object(g) => g.is_mutable(),
            Gene::Array(g) => g.is_mutable(),
            Gene::Map(g) => g.is_mutable(),
            Gene::Optional(_) => true,
            Gene::Seeded(g) => g.is_mutable(),
            Gene::PrimaryKey(g) => g.is_mutable(),
            // Rebinding happens through candidates; see
            // `ForeignKeyGene::randomize_with_candidates`.
            Gene::ForeignKey(_) => true,
        }
    }

    /// Whether the value can be rendered as a string on its own.
    pub fn is_printable(&self) -> bool {
        match self {
            Gene::AutoIncrement(_) => false,
            Gene::Cycle(_) => false,
            Gene::ForeignKey(g) => g.nullable || g.is_bound(),
            Gene::PrimaryKey(g) => g.is_printable(),
            Gene::Optional(g) => !g.is_active || g.gene.is_printable(),
            Gene::Seeded(g) => {
                if g.employ_seeded {
                    true
                } else {
                    g.gene.is_printable()
                }
            }
            Gene::Pair(g) => g.first.is_printable() && g.second.is_printable(),
            Gene::Tuple(g) => g.elements.iter().all(|e| e.is_printable()),
            Gene::Object(g) => g.fields.iter().all(|f| f.is_printable()),
            Gene::Array(g) => g.elements.iter().all(|e| e.is_printable()),
            Gene::Map(g) => g.elements.iter().all(|e| e.is_printable()),
            _ => true,
        }
    }

    /// Whether the current value satisfies the gene's own declared domain.
    pub fn is_locally_valid(&self) -> bool {
        match self {
            Gene::Boolean(_) => true,
            Gene::Integer(g) => g.is_locally_valid(),
            Gene::Float(g) => g.is_locally_valid(),
            Gene::Str(g) => g.is_locally_valid(),
            Gene::Enum(g) => g.is_locally_valid(),
            Gene::AutoIncrement(_) => true,
            Gene::Cycle(_) => true,
            Gene::Date(g) => g.is_locally_valid(),
            Gene::Time(g) => g.is_locally_valid(),
            Gene::DateTime(g) => g.is_locally_valid(),
            Gene::Pair(g) => g.first.is_locally_valid() && g.second.is_locally_valid(),
            Gene::Tuple(g) => g.elements.iter().all(|e| e.is_locally_valid()),
            Gene::Object(g) => g.fields.iter().all(|f| f.is_locally_valid()),
            Gene::Array(g) => g.is_locally_valid(),
            Gene::Map(g) => g.is_locally_valid(),
            Gene::Optional(g) => g.gene.is_locally_valid(),
            Gene::Seeded(g) => g.gene.is_locally_valid() && g.seeded.is_locally_valid(),
            Gene::PrimaryKey(g) => g.gene.is_locally_valid(),
            Gene::ForeignKey(g) => g.nullable || g.is_bound(),
        }
    }

    /// Assign a new value consistent with the declared domain, recursively
    /// randomizing mutable children. Foreign keys are skipped here: they
    /// rebind through [`ForeignKeyGene::randomize_with_candidates`], which
    /// needs the primary keys of preceding insertions.
    pub fn randomize(&mut self, rng: &mut Randomness, force_new: bool) {
        match self {
            Gene::Boolean(g) => g.randomize(rng, force_new),
            Gene::Integer(g) => g.randomize(rng, force_new),
            Gene::Float(g) => g.randomize(rng, force_new),
            Gene::Str(g) => g.randomize(rng, force_new),
            Gene::Enum(g) => g.randomize(rng, force_new),
            Gene::AutoIncrement(_) => {}
            Gene::Cycle(_) => {}
            Gene::Date(g) => g.randomize(rng, force_new),
            Gene::Time(g) => g.randomize(rng, force_new),
            Gene::DateTime(g) => g.randomize(rng, force_new),
            Gene::Pair(g) => g.randomize(rng, force_new),
            Gene::Tuple(g) => g.randomize(rng, force_new),
            Gene::Object(g) => g.randomize(rng, force_new),
            Gene::Array(g) => g.randomize(rng, force_new),
            Gene::Map(g) => g.randomize(rng, force_new),
            Gene::Optional(g) => g.randomize(rng, force_new),
            Gene::Seeded(g) => g.randomize(rng, force_new),
            Gene::PrimaryKey(g) => g.randomize(rng, force_new),
            Gene::ForeignKey(_) => {}
        }
    }

    /// Overwrite this gene's value (not its structural shape) from a
    /// compatible gene.
    pub fn copy_value_from(&mut self, other: &Gene) -> GeneResult<()> {
        match (self, other) {
            (Gene::Boolean(a), Gene::Boolean(b)) => {
                a.value = b.value;
                Ok(())
            }
            (Gene::Integer(a), Gene::Integer(b)) => {
                a.value = b.value;
                Ok(())
            }
            (Gene::Float(a), Gene::Float(b)) => {
                a.value = b.value;
                Ok(())
            }
            (Gene::Str(a), Gene::Str(b)) => {
                a.value = b.value.clone();
                Ok(())
            }
            (Gene::Enum(a), Gene::Enum(b)) => {
                a.index = b.index;
                Ok(())
            }
            (Gene::AutoIncrement(_), Gene::AutoIncrement(_)) => Ok(()),
            (Gene::Cycle(_), Gene::Cycle(_)) => Ok(()),
            (Gene::Date(a), Gene::Date(b)) => {
                a.copy_value_from(b);
                Ok(())
            }
            (Gene::Time(a), Gene::Time(b)) => {
                a.copy_value_from(b);
                Ok(())
            }
            (Gene::DateTime(a), Gene::DateTime(b)) => {
                a.copy_value_from(b);
                Ok(())
            }
            (Gene::Pair(a), Gene::Pair(b)) => {
                a.first.copy_value_from(&b.first)?;
                a.second.copy_value_from(&b.second)
            }
            (Gene::Tuple(a), Gene::Tuple(b)) => {
                if a.elements.len() != b.elements.len() {
                    return Err(GeneError::ShapeMismatch {
                        name: a.name.clone(),
                    });
                }
                for (ae, be) in a.elements.iter_mut().zip(&b.elements) {
                    ae.copy_value_from(be)?;
                }
                Ok(())
            }
            (Gene::Object(a), Gene::Object(b)) => {
                if a.fields.len() != b.fields.len() {
                    return Err(GeneError::ShapeMismatch {
                        name: a.name.clone(),
                    });
                }
                for (af, bf) in a.fields.iter_mut().zip(&b.fields) {
                    af.copy_value_from(bf)?;
                }
                Ok(())
            }
            (Gene::Array(a), Gene::Array(b)) => {
                if a.template.kind_name() != b.template.kind_name() {
                    return Err(GeneError::ShapeMismatch {
                        name: a.name.clone(),
                    });
                }
                a.elements = b.elements.clone();
                Ok(())
            }
            (Gene::Map(a), Gene::Map(b)) => {
                a.elements = b.elements.clone();
                Ok(())
            }
            (Gene::Optional(a), Gene::Optional(b)) => {
                a.is_active = b.is_active;
                a.gene.copy_value_from(&b.gene)
            }
            (Gene::Seeded(a), Gene::Seeded(b)) => {
                a.employ_seeded = b.employ_seeded;
                a.seeded.index = b.seeded.index;
                a.gene.copy_value_from(&b.gene)
            }
            // Identity (unique id, table) is preserved; only the value moves.
            (Gene::PrimaryKey(a), Gene::PrimaryKey(b)) => a.gene.copy_value_from(&b.gene),
            (Gene::ForeignKey(a), Gene::ForeignKey(b)) => {
                match b.reference() {
                    Some(id) => a.bind(id),
                    None => a.unbind(),
                }
                Ok(())
            }
            (me, other) => Err(GeneError::type_mismatch(me.kind_name(), other.kind_name())),
        }
    }

    /// Structural + value equality against a gene of the same kind. Fails
    /// with [`GeneError::TypeMismatch`] across kinds: callers are expected to
    /// compare only already-type-checked pairs.
    pub fn contains_same_value_as(&self, other: &Gene) -> GeneResult<bool> {
        match (self, other) {
            (Gene::Boolean(a), Gene::Boolean(b)) => Ok(a.value == b.value),
            (Gene::Integer(a), Gene::Integer(b)) => Ok(a.value == b.value),
            (Gene::Float(a), Gene::Float(b)) => Ok(a.value == b.value),
            (Gene::Str(a), Gene::Str(b)) => Ok(a.value == b.value),
            (Gene::Enum(a), Gene::Enum(b)) => Ok(a.index == b.index),
            (Gene::AutoIncrement(_), Gene::AutoIncrement(_)) => Ok(true),
            (Gene::Cycle(_), Gene::Cycle(_)) => Ok(true),
            (Gene::Date(a), Gene::Date(b)) => Ok(a.contains_same_value_as(b)),
            (Gene::Time(a), Gene::Time(b)) => Ok(a.contains_same_value_as(b)),
            (Gene::DateTime(a), Gene::DateTime(b)) => Ok(a.contains_same_value_as(b)),
            (Gene::Pair(a), Gene::Pair(b)) => Ok(a.first.contains_same_value_as(&b.first)?
                && a.second.contains_same_value_as(&b.second)?),
            (Gene::Tuple(a), Gene::Tuple(b)) => {
                if a.elements.len() != b.elements.len() {
                    return Ok(false);
                }
                for (ae, be) in a.elements.iter().zip(&b.elements) {
                    if !ae.contains_same_value_as(be)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Gene::Object(a), Gene::Object(b)) => {
                if a.fields.len() != b.fields.len() {
                    return Ok(false);
                }
                for (af, bf) in a.fields.iter().zip(&b.fields) {
                    if !af.contains_same_value_as(bf)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Gene::Array(a), Gene::Array(b)) => {
                if a.elements.len() != b.elements.len() {
                    return Ok(false);
                }
                for (ae, be) in a.elements.iter().zip(&b.elements) {
                    if !ae.contains_same_value_as(be)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Gene::Map(a), Gene::Map(b)) => {
                if a.elements.len() != b.elements.len() {
                    return Ok(false);
                }
                for (ae, be) in a.elements.iter().zip(&b.elements) {
                    if !ae.contains_same_value_as(be)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Gene::Optional(a), Gene::Optional(b)) => {
                if a.is_active != b.is_active {
                    return Ok(false);
                }
                if !a.is_active {
                    return Ok(true);
                }
                a.gene.contains_same_value_as(&b.gene)
            }
            (Gene::Seeded(a), Gene::Seeded(b)) => {
                if a.employ_seeded != b.employ_seeded {
                    return Ok(false);
                }
                if a.employ_seeded {
                    Ok(a.seeded.index == b.seeded.index)
                } else {
                    a.gene.contains_same_value_as(&b.gene)
                }
            }
            (Gene::PrimaryKey(a), Gene::PrimaryKey(b)) => {
                Ok(a.table_name == b.table_name && a.gene.contains_same_value_as(&b.gene)?)
            }
            (Gene::ForeignKey(a), Gene::ForeignKey(b)) => {
                Ok(a.target_table == b.target_table && a.reference() == b.reference())
            }
            (me, other) => Err(GeneError::type_mismatch(me.kind_name(), other.kind_name())),
        }
    }

    /// Best-effort cross-variant value propagation. Returns whether the
    /// binding succeeded; never fails, incompatibilities are logged once.
    pub fn bind_value_based_on(&mut self, other: &Gene) -> bool {
        // Relational bindings first: a foreign key can bind directly to a
        // primary key of its target table.
        if let Gene::ForeignKey(fk) = self {
            return match other {
                Gene::ForeignKey(o) if o.target_table == fk.target_table => {
                    match o.reference() {
                        Some(id) => fk.bind(id),
                        None => fk.unbind(),
                    }
                    true
                }
                Gene::PrimaryKey(pk) if pk.table_name == fk.target_table => {
                    fk.bind(pk.unique_id);
                    true
                }
                _ => {
                    unique_warn(&format!(
                        "cannot bind foreign_key gene based on {}",
                        other.kind_name()
                    ));
                    false
                }
            };
        }

        // Unwrap the source side down to its phenotype.
        match other {
            Gene::Seeded(s) if !s.employ_seeded => return self.bind_value_based_on(&s.gene),
            Gene::Optional(o) if o.is_active => return self.bind_value_based_on(&o.gene),
            Gene::PrimaryKey(pk) => return self.bind_value_based_on(&pk.gene),
            _ => {}
        }

        match (self, other) {
            (Gene::Boolean(a), Gene::Boolean(b)) => {
                a.value = b.value;
                true
            }
            (Gene::Boolean(a), Gene::Str(b)) => match b.value.parse::<bool>() {
                Ok(v) => {
                    a.value = v;
                    true
                }
                Err(_) => false,
            },
            (Gene::Integer(a), Gene::Integer(b)) => {
                a.value = b.value;
                true
            }
            (Gene::Integer(a), Gene::Float(b)) => {
                a.value = b.value as i64;
                true
            }
            (Gene::Integer(a), Gene::Str(b)) => match b.value.parse::<i64>() {
                Ok(v) => {
                    a.value = v;
                    true
                }
                Err(_) => false,
            },
            (Gene::Integer(a), Gene::Enum(b)) => match b.current() {
                Some(EnumLiteral::Int(i)) => {
                    a.value = *i;
                    true
                }
                _ => false,
            },
            (Gene::Float(a), Gene::Float(b)) => {
                a.value = b.value;
                true
            }
            (Gene::Float(a), Gene::Integer(b)) => {
                a.value = b.value as f64;
                true
            }
            (Gene::Float(a), Gene::Str(b)) => match b.value.parse::<f64>() {
                Ok(v) => {
                    a.value = v;
                    true
                }
                Err(_) => false,
            },
            // A string can absorb any raw-printable value.
            (
                Gene::Str(a),
                Gene::Boolean(_)
                | Gene::Integer(_)
                | Gene::Float(_)
                | Gene::Str(_)
                | Gene::Enum(_)
                | Gene::Date(_)
                | Gene::Time(_)
                | Gene::DateTime(_),
            ) => {
                a.value = other.value_as_raw_string();
                true
            }
            (Gene::Enum(a), Gene::Enum(b)) => {
                if b.index < a.values().len() {
                    a.index = b.index;
                    true
                } else {
                    false
                }
            }
            (Gene::Date(a), Gene::Date(b)) => {
                a.copy_value_from(b);
                true
            }
            (Gene::Date(a), Gene::DateTime(b)) => {
                a.copy_value_from(&b.date);
                true
            }
            (Gene::Date(a), Gene::Str(b)) => a.bind_from_str(&b.value),
            (Gene::Time(a), Gene::Time(b)) => {
                a.copy_value_from(b);
                true
            }
            (Gene::Time(a), Gene::DateTime(b)) => {
                a.copy_value_from(&b.time);
                true
            }
            (Gene::Time(a), Gene::Str(b)) => a.bind_from_str(&b.value),
            (Gene::DateTime(a), Gene::DateTime(b)) => {
                a.copy_value_from(b);
                true
            }
            (Gene::DateTime(a), Gene::Date(b)) => {
                a.date.copy_value_from(b);
                true
            }
            (Gene::DateTime(a), Gene::Str(b)) => a.bind_from_str(&b.value),
            (Gene::Pair(a), Gene::Pair(b)) => {
                a.first.bind_value_based_on(&b.first) && a.second.bind_value_based_on(&b.second)
            }
            (Gene::Tuple(a), Gene::Tuple(b)) if a.elements.len() == b.elements.len() => a
                .elements
                .iter_mut()
                .zip(&b.elements)
                .all(|(ae, be)| ae.bind_value_based_on(be)),
            (Gene::Object(a), Gene::Object(b)) if a.fields.len() == b.fields.len() => a
                .fields
                .iter_mut()
                .zip(&b.fields)
                .all(|(af, bf)| af.bind_value_based_on(bf)),
            (Gene::Array(a), Gene::Array(b))
                if a.template.kind_name() == b.template.kind_name() =>
            {
                a.elements = b.elements.clone();
                true
            }
            (Gene::Map(a), Gene::Map(b)) => {
                a.elements = b.elements.clone();
                true
            }
            (Gene::Optional(a), b) => {
                a.is_active = true;
                a.gene.bind_value_based_on(b)
            }
            (Gene::Seeded(a), b) => {
                a.employ_seeded = false;
                a.gene.bind_value_based_on(b)
            }
            (Gene::PrimaryKey(a), b) => a.gene.bind_value_based_on(b),
            (me, other) => {
                unique_warn(&format!(
                    "cannot bind {} gene based on {}",
                    me.kind_name(),
                    other.kind_name()
                ));
                false
            }
        }
    }

    /// The value without quoting, e.g. for parsing or concatenation.
    pub fn value_as_raw_string(&self) -> String {
        match self {
            Gene::Boolean(g) => g.value.to_string(),
            Gene::Integer(g) => g.value.to_string(),
            Gene::Float(g) => g.value.to_string(),
            Gene::Str(g) => g.value.clone(),
            Gene::Enum(g) => g.value_as_raw_string(),
            Gene::AutoIncrement(_) => "NULL".to_string(),
            Gene::Cycle(_) => "null".to_string(),
            Gene::Date(g) => g.value_as_raw_string(),
            Gene::Time(g) => g.value_as_raw_string(),
            Gene::DateTime(g) => g.value_as_raw_string(),
            Gene::Pair(g) => g.value_as_raw_string(),
            Gene::Tuple(g) => g.value_as_raw_string(),
            Gene::Object(g) => g.value_as_raw_string(),
            Gene::Array(g) => g.value_as_raw_string(),
            Gene::Map(g) => g.value_as_raw_string(),
            Gene::Optional(g) => g.value_as_raw_string(),
            Gene::Seeded(g) => g.value_as_raw_string(),
            Gene::PrimaryKey(g) => g.value_as_raw_string(),
            Gene::ForeignKey(g) => g.value_as_raw_string(),
        }
    }

    /// The value rendered for embedding in a generated statement. Genes that
    /// reference others (foreign keys) resolve against `previous`, the genes
    /// of earlier insertions. This is a one-way projection: nothing parses it
    /// back.
    pub fn value_as_printable_string(&self, previous: &[&Gene]) -> String {
        match self {
            Gene::Str(g) => format!("\"{}\"", g.value),
            Gene::Date(g) => format!("\"{}\"", g.value_as_raw_string()),
            Gene::Time(g) => format!("\"{}\"", g.value_as_raw_string()),
            Gene::DateTime(g) => format!("\"{}\"", g.value_as_raw_string()),
            Gene::Enum(g) => g.value_as_printable_string(),
            Gene::Pair(g) => g.value_as_printable_string(previous),
            Gene::Tuple(g) => g.value_as_printable_string(previous),
            Gene::Object(g) => g.value_as_printable_string(previous),
            Gene::Array(g) => g.value_as_printable_string(previous),
            Gene::Map(g) => g.value_as_printable_string(previous),
            Gene::Optional(g) => g.value_as_printable_string(previous),
            Gene::Seeded(g) => g.value_as_printable_string(previous),
            Gene::PrimaryKey(g) => g.value_as_printable_string(previous),
            Gene::ForeignKey(g) => g.value_as_printable_string(previous),
            _ => self.value_as_raw_string(),
        }
    }

    /// Immediate child genes, in structural order.
    pub fn children(&self) -> Vec<&Gene> {
        match self {
            Gene::Pair(g) => vec![g.first.as_ref(), g.second.as_ref()],
            Gene::Tuple(g) => g.elements.iter().collect(),
            Gene::Object(g) => g.fields.iter().collect(),
            Gene::Array(g) => g.elements.iter().collect(),
            Gene::Map(g) => g.elements.iter().collect(),
            Gene::Optional(g) => vec![g.gene.as_ref()],
            Gene::Seeded(g) => vec![g.gene.as_ref()],
            Gene::PrimaryKey(g) => vec![g.gene.as_ref()],
            _ => vec![],
        }
    }

    /// Immediate child genes, mutably.
    pub fn children_mut(&mut self) -> Vec<&mut Gene> {
        match self {
            Gene::Pair(g) => vec![g.first.as_mut(), g.second.as_mut()],
            Gene::Tuple(g) => g.elements.iter_mut().collect(),
            Gene::Object(g) => g.fields.iter_mut().collect(),
            Gene::Array(g) => g.elements.iter_mut().collect(),
            Gene::Map(g) => g.elements.iter_mut().collect(),
            Gene::Optional(g) => vec![g.gene.as_mut()],
            Gene::Seeded(g) => vec![g.gene.as_mut()],
            Gene::PrimaryKey(g) => vec![g.gene.as_mut()],
            _ => vec![],
        }
    }

    /// Append a child to a variable-size collection.
    ///
    /// Panics on any other kind: leaf and fixed-arity genes never acquire
    /// children after construction, and a caller trying to is a bug, not a
    /// recoverable condition.
    pub fn add_child(&mut self, child: Gene) -> GeneResult<()> {
        match self {
            Gene::Array(g) => g.add_element(child),
            Gene::Map(g) => g.add_entry(child),
            other => panic!(
                "BUG in germ: cannot modify children of childless or fixed {} gene '{}'",
                other.kind_name(),
                other.name()
            ),
        }
    }

    /// Remove a child from a variable-size collection. Same panic contract
    /// as [`Gene::add_child`].
    pub fn remove_child(&mut self, index: usize) -> GeneResult<Gene> {
        match self {
            Gene::Array(g) => g.remove_element(index),
            Gene::Map(g) => g.remove_entry(index),
            other => panic!(
                "BUG in germ: cannot modify children of childless or fixed {} gene '{}'",
                other.kind_name(),
                other.name()
            ),
        }
    }

    /// This gene plus all descendants, pre-order.
    pub fn flat_view(&self) -> Vec<&Gene> {
        let mut out = Vec::new();
        fn walk<'a>(gene: &'a Gene, out: &mut Vec<&'a Gene>) {
            out.push(gene);
            for child in gene.children() {
                walk(child, out);
            }
        }
        walk(self, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use germ_core::UniqueId;
    use pretty_assertions::assert_eq;

    fn int(name: &str, value: i64) -> Gene {
        Gene::Integer(IntegerGene::new(name).with_value(value))
    }

    #[test]
    fn test_copy_value_from_same_kind() {
        let mut a = int("n", 1);
        let b = int("n", 99);

        a.copy_value_from(&b).unwrap();

        assert_eq!(a.value_as_raw_string(), "99");
    }

    #[test]
    fn test_copy_value_from_mismatched_kind_fails() {
        let mut a = int("n", 1);
        let b = Gene::Boolean(BooleanGene::new("b"));

        let err = a.copy_value_from(&b);

        assert!(matches!(err, Err(GeneError::TypeMismatch { .. })));
    }

    #[test]
    fn test_contains_same_value_mismatched_kind_fails() {
        let a = int("n", 1);
        let b = Gene::Str(StringGene::new("s"));

        assert!(matches!(
            a.contains_same_value_as(&b),
            Err(GeneError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_primary_key_copy_preserves_identity() {
        let mut a = Gene::PrimaryKey(PrimaryKeyGene::new(
            "id",
            "Users",
            UniqueId::new(1),
            int("id", 10),
        ));
        let b = Gene::PrimaryKey(PrimaryKeyGene::new(
            "id",
            "Users",
            UniqueId::new(2),
            int("id", 20),
        ));

        a.copy_value_from(&b).unwrap();

        match a {
            Gene::PrimaryKey(pk) => {
                assert_eq!(pk.unique_id, UniqueId::new(1));
                assert_eq!(pk.value_as_raw_string(), "20");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_bind_string_from_datetime() {
        let mut target = Gene::Str(StringGene::new("when"));
        let mut source = DateTimeGene::new("ts");
        source.date.year.value = 2022;
        source.date.month.value = 6;
        source.date.day.value = 15;
        source.time.hour.value = 10;
        source.time.minute.value = 30;
        source.time.second.value = 0;

        assert!(target.bind_value_based_on(&Gene::DateTime(source)));
        assert_eq!(target.value_as_raw_string(), "2022-06-15T10:30:00");
    }

    #[test]
    fn test_bind_datetime_from_string_parses() {
        let mut target = Gene::DateTime(DateTimeGene::new("ts"));
        let source = Gene::Str(StringGene::new("when").with_value("2022-06-15T10:30:00"));

        assert!(target.bind_value_based_on(&source));
        assert_eq!(target.value_as_raw_string(), "2022-06-15T10:30:00");
    }

    #[test]
    fn test_bind_incompatible_returns_false() {
        let mut target = Gene::Boolean(BooleanGene::new("flag"));
        let source = Gene::Date(DateGene::new("d"));

        assert!(!target.bind_value_based_on(&source));
    }

    #[test]
    fn test_bind_foreign_key_from_primary_key() {
        let mut fk = Gene::ForeignKey(ForeignKeyGene::new("user_id", "Users", false));
        let pk = Gene::PrimaryKey(PrimaryKeyGene::new(
            "id",
            "Users",
            UniqueId::new(4),
            int("id", 1),
        ));

        assert!(fk.bind_value_based_on(&pk));
        match fk {
            Gene::ForeignKey(g) => assert_eq!(g.reference(), Some(UniqueId::new(4))),
            _ => unreachable!(),
        }
    }

    #[test]
    #[should_panic(expected = "cannot modify children")]
    fn test_add_child_on_leaf_panics() {
        let mut leaf = int("n", 1);
        let _ = leaf.add_child(int("m", 2));
    }

    #[test]
    #[should_panic(expected = "cannot modify children")]
    fn test_add_child_on_fixed_composite_panics() {
        let mut tuple = Gene::Tuple(TupleGene::new("t", vec![int("a", 1)]));
        let _ = tuple.add_child(int("b", 2));
    }

    #[test]
    fn test_flat_view_is_preorder() {
        let pair = Gene::Pair(PairGene::new("p", int("first", 1), int("second", 2)));
        let wrapped = Gene::Optional(OptionalGene::new("opt", pair));

        let names: Vec<&str> = wrapped.flat_view().iter().map(|g| g.name()).collect();

        assert_eq!(names, vec!["opt", "p", "first", "second"]);
    }
}
