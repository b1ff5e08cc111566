use super::SpellingVector;
use crate::cost::Cost;

/// Spelling vector holding one optional cost per key.
#[derive(Debug, Clone, PartialEq)]
pub struct CostColumn<C> {
    bags: Vec<Option<C>>,
    renamed: Option<usize>,
}

impl<C: Cost> CostColumn<C> {
    pub fn new(bags: Vec<Option<C>>) -> Self {
        Self {
            bags,
            renamed: None,
        }
    }

    /// Column of an empty bar.
    pub fn empty(keys: usize) -> Self {
        Self::new(vec![None; keys])
    }

    pub fn from_costs(costs: Vec<C>) -> Self {
        Self::new(costs.into_iter().map(Some).collect())
    }

    /// Key used by the last rename.
    pub fn renamed(&self) -> Option<usize> {
        self.renamed
    }
}

impl<C: Cost> SpellingVector for CostColumn<C> {
    type Cost = C;

    fn size(&self) -> usize {
        self.bags.len()
    }

    fn is_empty(&self) -> bool {
        self.bags.iter().all(Option::is_none)
    }

    fn bag_cost(&self, key: usize) -> Option<&C> {
        self.bags.get(key).and_then(Option::as_ref)
    }

    fn rename(&mut self, key: usize) -> bool {
        if key < self.bags.len() {
            self.renamed = Some(key);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::AccidCost;

    #[test]
    fn empty_column_has_no_costs() {
        let c: CostColumn<AccidCost> = CostColumn::empty(4);
        assert!(c.is_empty());
        assert_eq!(c.size(), 4);
        assert_eq!(c.bag_cost(2), None);
        assert_eq!(c.bag_cost(9), None);
    }

    #[test]
    fn rename_records_the_key() {
        let mut c = CostColumn::from_costs(vec![AccidCost::new(1), AccidCost::new(0)]);
        assert!(!c.is_empty());
        assert!(c.rename(1));
        assert_eq!(c.renamed(), Some(1));
        assert!(!c.rename(2));
    }
}
