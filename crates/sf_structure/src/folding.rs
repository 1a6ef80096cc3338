//! Partner tables and the dot-bracket interchange format.
//!
//! `FoldingPairs` stores for every position the index of its partner,
//! or `None` if the position is unpaired. This is the explicit form of a
//! single folding, as produced by enumeration and by the baseline
//! predictors.
//!

use std::fmt;
use std::ops::Deref;
use std::ops::DerefMut;
use serde::Deserialize;
use serde::Serialize;

use crate::Pair;
use crate::Sequence;
use crate::StructureError;
use crate::NAIDX;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FoldingPairs(pub Vec<Option<NAIDX>>);

impl Deref for FoldingPairs {
    type Target = [Option<NAIDX>];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for FoldingPairs {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<Option<NAIDX>> for FoldingPairs {
    fn from_iter<T: IntoIterator<Item = Option<NAIDX>>>(iter: T) -> Self {
        FoldingPairs(iter.into_iter().collect())
    }
}

impl FoldingPairs {
    /// The open chain: every position unpaired.
    pub fn unpaired(length: usize) -> Self {
        FoldingPairs(vec![None; length])
    }

    /// Build from a plain partner array, negative values mean unpaired.
    pub fn from_partners(partners: &[i64]) -> Self {
        partners
            .iter()
            .map(|&p| if p < 0 { None } else { Some(p as NAIDX) })
            .collect()
    }

    /// Plain partner array, `-1` for unpaired positions.
    pub fn to_partners(&self) -> Vec<i64> {
        self.iter().map(|p| p.map_or(-1, i64::from)).collect()
    }

    pub fn set_pair(&mut self, pair: Pair) {
        self[pair.i() as usize] = Some(pair.j());
        self[pair.j() as usize] = Some(pair.i());
    }

    /// Copy every paired position of `other` into `self`.
    pub fn overlay(&mut self, other: &FoldingPairs) {
        debug_assert_eq!(self.len(), other.len());
        for (mine, theirs) in self.iter_mut().zip(other.iter()) {
            if theirs.is_some() {
                *mine = *theirs;
            }
        }
    }

    /// All pairs (i, j) with i < j, in 5' to 3' order.
    pub fn pairs(&self) -> impl Iterator<Item = Pair> + '_ {
        self.iter().enumerate().filter_map(|(i, &p)| match p {
            Some(j) if (i as NAIDX) < j => Some(Pair::new(i as NAIDX, j)),
            _ => None,
        })
    }

    pub fn pair_count(&self) -> usize {
        self.pairs().count()
    }

    /// `.` if free, `(` if paired to a later index, `)` if paired to an
    /// earlier index.
    pub fn to_dot_bracket(&self) -> String {
        self.iter()
            .enumerate()
            .map(|(i, &p)| match p {
                None => '.',
                Some(j) if i < j as usize => '(',
                Some(_) => ')',
            })
            .collect()
    }

    /// Check the partner table for structural errors and against the
    /// pairing rule of `seq`. Crossing pairs are rejected.
    pub fn validate(&self, seq: &Sequence, min_hairpin: usize) -> Result<(), StructureError> {
        if self.len() != seq.len() {
            return Err(StructureError::LengthMismatch {
                expected: seq.len(),
                found: self.len(),
            });
        }
        for (i, &p) in self.iter().enumerate() {
            let Some(j) = p else { continue };
            let j = j as usize;
            if i == j {
                return Err(StructureError::SelfPaired(i));
            }
            if j >= self.len() || self[j] != Some(i as NAIDX) {
                return Err(StructureError::AsymmetricPair {
                    i,
                    j,
                    back: self.get(j).copied().flatten().map(usize::from),
                });
            }
            if i < j && !seq.can_pair(i, j, min_hairpin) {
                return Err(StructureError::InvalidPair { i, j });
            }
        }
        self.check_nested()
    }

    /// Every pair closes the innermost open one. Assumes symmetry.
    fn check_nested(&self) -> Result<(), StructureError> {
        let mut open: Vec<(usize, usize)> = Vec::new();
        for (pos, &p) in self.iter().enumerate() {
            let Some(partner) = p else { continue };
            let partner = partner as usize;
            if pos < partner {
                open.push((pos, partner));
                continue;
            }
            match open.pop() {
                Some((i, _)) if i == partner => (),
                Some((k, l)) => {
                    return Err(StructureError::Pseudoknot { i: partner, j: pos, k, l });
                }
                None => {
                    return Err(StructureError::UnbalancedDotBracket(format!(
                        "position {pos} closes an unopened pair"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn closing_bracket(c: char) -> Option<char> {
    match c {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        '<' => Some('>'),
        c if c.is_ascii_uppercase() => Some(c.to_ascii_lowercase()),
        _ => None,
    }
}

fn is_closing_bracket(c: char) -> bool {
    matches!(c, ')' | ']' | '}' | '>') || c.is_ascii_lowercase()
}

impl TryFrom<&str> for FoldingPairs {
    type Error = StructureError;

    /// Parse dot-bracket notation. Letter brackets (`Aa`, `Bb`, ...) and
    /// the `[]`, `{}`, `<>` families are matched independently of `()`.
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let s = s.trim();
        let length = s.chars().count();
        if length >= NAIDX::MAX as usize {
            return Err(StructureError::IndexOverflow(length));
        }
        let mut fold = FoldingPairs::unpaired(length);
        let mut stack: Vec<(usize, char)> = Vec::new();

        for (pos, c) in s.chars().enumerate() {
            if c == '.' {
                continue;
            }
            if let Some(close) = closing_bracket(c) {
                stack.push((pos, close));
            } else if is_closing_bracket(c) {
                let Some(idx) = stack.iter().rposition(|&(_, t)| t == c) else {
                    return Err(StructureError::UnbalancedDotBracket(format!(
                        "no opening bracket for '{c}' at position {pos}"
                    )));
                };
                let (open, _) = stack.remove(idx);
                fold[open] = Some(pos as NAIDX);
                fold[pos] = Some(open as NAIDX);
            } else {
                return Err(StructureError::InvalidDotBracket { pos, c });
            }
        }
        if let Some(&(pos, _)) = stack.last() {
            return Err(StructureError::UnbalancedDotBracket(format!(
                "{} unclosed bracket(s), last at position {pos}",
                stack.len()
            )));
        }
        Ok(fold)
    }
}

impl fmt::Display for FoldingPairs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dot_bracket())
    }
}
