//! Bases, sequences and the pairing rule.
//!
//! A `Sequence` is immutable once constructed. The only admissibility rule
//! for a base pair is `Sequence::can_pair`: Watson-Crick or wobble
//! complementarity plus a minimum hairpin-loop distance.
//!

use std::fmt;
use std::str::FromStr;

use crate::FoldingPairs;
use crate::StructureError;
use crate::NAIDX;

/// A single nucleotide. `T` is read as `U`, everything unknown is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base {
    A,
    C,
    G,
    U,
    Other,
}

impl Base {
    /// Watson-Crick (A-U, G-C) or wobble (G-U) complementarity.
    pub fn can_pair(self, other: Base) -> bool {
        use Base::*;
        matches!(
            (self, other),
            (A, U) | (U, A) | (G, C) | (C, G) | (G, U) | (U, G)
        )
    }

    /// One-letter code, `N` for anything we do not know.
    pub fn code(self) -> char {
        match self {
            Base::A => 'A',
            Base::C => 'C',
            Base::G => 'G',
            Base::U => 'U',
            Base::Other => 'N',
        }
    }
}

impl From<char> for Base {
    fn from(c: char) -> Self {
        match c {
            'A' | 'a' => Base::A,
            'C' | 'c' => Base::C,
            'G' | 'g' => Base::G,
            'U' | 'u' | 'T' | 't' => Base::U,
            _ => Base::Other,
        }
    }
}

impl From<Base> for char {
    fn from(b: Base) -> Self {
        b.code()
    }
}

/// An ordered, 0-indexed list of bases, optionally with a reference folding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    name: String,
    comment: String,
    bases: Vec<Base>,
    reference: Option<FoldingPairs>,
}

impl Sequence {
    pub fn new(bases: Vec<Base>) -> Result<Self, StructureError> {
        if bases.len() >= NAIDX::MAX as usize {
            return Err(StructureError::IndexOverflow(bases.len()));
        }
        Ok(Self {
            name: String::new(),
            comment: String::new(),
            bases,
            reference: None,
        })
    }

    /// Attach a comment line; the name is its first word.
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = comment.to_string();
        self.name = comment.split_whitespace().next().unwrap_or("").to_string();
        self
    }

    /// Attach a reference folding of matching length.
    pub fn with_reference(mut self, reference: FoldingPairs) -> Result<Self, StructureError> {
        if reference.len() != self.bases.len() {
            return Err(StructureError::LengthMismatch {
                expected: self.bases.len(),
                found: reference.len(),
            });
        }
        self.reference = Some(reference);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn bases(&self) -> &[Base] {
        &self.bases
    }

    pub fn reference(&self) -> Option<&FoldingPairs> {
        self.reference.as_ref()
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// True iff bases `i` and `j` are complementary and more than
    /// `min_hairpin` positions apart. Symmetric in `i` and `j`.
    pub fn can_pair(&self, i: usize, j: usize, min_hairpin: usize) -> bool {
        i.abs_diff(j) > min_hairpin && self.bases[i].can_pair(self.bases[j])
    }

    pub fn bases_string(&self) -> String {
        self.bases.iter().map(|&b| char::from(b)).collect()
    }

    /// Safe bases in upper case, unsafe ones in lower case.
    pub fn safety_string(&self, safe: &[bool]) -> String {
        debug_assert_eq!(safe.len(), self.bases.len());
        self.bases
            .iter()
            .zip(safe)
            .map(|(&b, &s)| {
                let c = char::from(b);
                if s { c } else { c.to_ascii_lowercase() }
            })
            .collect()
    }
}

impl FromStr for Sequence {
    type Err = StructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sequence::new(s.trim().chars().map(Base::from).collect())
    }
}

impl TryFrom<&str> for Sequence {
    type Error = StructureError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bases_string())
    }
}
