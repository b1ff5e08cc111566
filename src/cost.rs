use crate::error::{SpellError, SpellResult};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};

/// Spelling cost, as produced for one bar and one key.
///
/// Grid and table code are generic over this trait and never look
/// inside a cost.
pub trait Cost: Clone + fmt::Debug + fmt::Display + Send + Sync {
    fn zero() -> Self;

    fn add(&mut self, other: &Self);

    fn compare(&self, other: &Self) -> Ordering;

    /// Signed percentage from `other` to `self`. Zero when equal,
    /// positive when `self` is larger.
    fn relative_distance(&self, other: &Self) -> f64;

    fn same(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }

    /// Equal to `reference`, or above it by at most `tolerance` percent.
    fn within(&self, reference: &Self, tolerance: f64) -> bool {
        self.same(reference) || (tolerance > 0.0 && self.relative_distance(reference) <= tolerance)
    }
}

/// Percentage between two non-negative magnitudes, relative to the
/// smaller one.
pub fn percent(lhs: f64, rhs: f64) -> f64 {
    let d = lhs - rhs;
    if d > 0.0 {
        if rhs == 0.0 {
            f64::INFINITY
        } else {
            d * 100.0 / rhs
        }
    } else if d < 0.0 {
        if lhs == 0.0 {
            f64::NEG_INFINITY
        } else {
            d * 100.0 / lhs
        }
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CostType {
    /// Number of printed accidentals.
    Accid,
    /// Accidentals, then distance to the local key.
    AdLex,
    /// Sum of accidentals and distance, then accidentals.
    AdPlus,
}

/// Parses one cost from its text form: `"3"` or `"3/1"`.
pub trait ParseCost: Sized {
    fn parse_cost(text: &str) -> SpellResult<Self>;
}

fn parse_u32(text: &str) -> SpellResult<u32> {
    text.trim()
        .parse::<u32>()
        .map_err(|e| SpellError::Validation(format!("bad cost value '{}': {}", text, e)))
}

fn parse_pair(text: &str) -> SpellResult<(u32, u32)> {
    match text.split_once('/') {
        Some((a, d)) => Ok((parse_u32(a)?, parse_u32(d)?)),
        None => Ok((parse_u32(text)?, 0)),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AccidCost {
    pub accid: u32,
}

impl AccidCost {
    pub fn new(accid: u32) -> Self {
        Self { accid }
    }
}

impl Cost for AccidCost {
    fn zero() -> Self {
        Self::default()
    }

    fn add(&mut self, other: &Self) {
        self.accid += other.accid;
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.accid.cmp(&other.accid)
    }

    fn relative_distance(&self, other: &Self) -> f64 {
        percent(f64::from(self.accid), f64::from(other.accid))
    }
}

impl ParseCost for AccidCost {
    fn parse_cost(text: &str) -> SpellResult<Self> {
        parse_u32(text).map(Self::new)
    }
}

impl fmt::Display for AccidCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.accid)
    }
}

/// Accidentals first, distance to the local key as a tie-break.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AccidDistLex {
    pub accid: u32,
    pub dist: u32,
}

impl AccidDistLex {
    pub fn new(accid: u32, dist: u32) -> Self {
        Self { accid, dist }
    }
}

impl Cost for AccidDistLex {
    fn zero() -> Self {
        Self::default()
    }

    fn add(&mut self, other: &Self) {
        self.accid += other.accid;
        self.dist += other.dist;
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.accid
            .cmp(&other.accid)
            .then(self.dist.cmp(&other.dist))
    }

    fn relative_distance(&self, other: &Self) -> f64 {
        if self.accid == other.accid {
            percent(f64::from(self.dist), f64::from(other.dist))
        } else {
            percent(f64::from(self.accid), f64::from(other.accid))
        }
    }
}

impl ParseCost for AccidDistLex {
    fn parse_cost(text: &str) -> SpellResult<Self> {
        parse_pair(text).map(|(a, d)| Self::new(a, d))
    }
}

impl fmt::Display for AccidDistLex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.accid, self.dist)
    }
}

/// Accidentals plus distance, accidentals as a tie-break.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AccidDistSum {
    pub accid: u32,
    pub dist: u32,
}

impl AccidDistSum {
    pub fn new(accid: u32, dist: u32) -> Self {
        Self { accid, dist }
    }

    pub fn sum(&self) -> u32 {
        self.accid + self.dist
    }
}

impl Cost for AccidDistSum {
    fn zero() -> Self {
        Self::default()
    }

    fn add(&mut self, other: &Self) {
        self.accid += other.accid;
        self.dist += other.dist;
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.sum()
            .cmp(&other.sum())
            .then(self.accid.cmp(&other.accid))
    }

    fn relative_distance(&self, other: &Self) -> f64 {
        if self.sum() == other.sum() {
            percent(f64::from(self.accid), f64::from(other.accid))
        } else {
            percent(f64::from(self.sum()), f64::from(other.sum()))
        }
    }
}

impl ParseCost for AccidDistSum {
    fn parse_cost(text: &str) -> SpellResult<Self> {
        parse_pair(text).map(|(a, d)| Self::new(a, d))
    }
}

impl fmt::Display for AccidDistSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.accid, self.dist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_relative_to_the_smaller_value() {
        assert_eq!(percent(12.0, 10.0), 20.0);
        assert_eq!(percent(10.0, 12.0), -20.0);
        assert_eq!(percent(5.0, 5.0), 0.0);
        assert_eq!(percent(3.0, 0.0), f64::INFINITY);
    }

    #[test]
    fn lexicographic_order() {
        let a = AccidDistLex::new(2, 9);
        let b = AccidDistLex::new(3, 0);
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(AccidDistLex::new(2, 1).compare(&AccidDistLex::new(2, 3)), Ordering::Less);
    }

    #[test]
    fn sum_order_breaks_ties_on_accidentals() {
        let a = AccidDistSum::new(1, 3);
        let b = AccidDistSum::new(2, 2);
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(AccidDistSum::new(5, 0).compare(&b), Ordering::Greater);
    }

    #[test]
    fn tolerance() {
        let min = AccidCost::new(10);
        assert!(AccidCost::new(10).within(&min, 0.0));
        assert!(!AccidCost::new(11).within(&min, 0.0));
        assert!(AccidCost::new(11).within(&min, 10.0));
        assert!(!AccidCost::new(12).within(&min, 10.0));
    }

    #[test]
    fn parse_from_text() {
        assert_eq!(AccidCost::parse_cost(" 4 ").unwrap(), AccidCost::new(4));
        assert_eq!(AccidDistLex::parse_cost("4/2").unwrap(), AccidDistLex::new(4, 2));
        assert_eq!(AccidDistSum::parse_cost("4").unwrap(), AccidDistSum::new(4, 0));
        assert!(AccidCost::parse_cost("x").is_err());
    }

    #[test]
    fn sum_accumulates() {
        let mut c = AccidDistLex::zero();
        c.add(&AccidDistLex::new(1, 2));
        c.add(&AccidDistLex::new(3, 0));
        assert_eq!(c, AccidDistLex::new(4, 2));
    }
}
