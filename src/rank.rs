use std::cmp::Ordering;

/// Rank of every position of a list under `cmp`. Equal elements share
/// the smallest rank of their tie group, and the next group starts at
/// its position in sorted order: `[102, 100, 109, 100, 101]` ranks as
/// `[3, 0, 4, 0, 2]`.
pub fn ranks_by<F>(len: usize, mut cmp: F) -> Vec<usize>
where
    F: FnMut(usize, usize) -> Ordering,
{
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by(|&a, &b| cmp(a, b));

    let mut ranks = vec![0; len];
    let mut group_rank = 0;
    for (pos, &i) in order.iter().enumerate() {
        if pos > 0 && cmp(order[pos - 1], i) != Ordering::Equal {
            group_rank = pos;
        }
        ranks[i] = group_rank;
    }
    ranks
}

pub fn ranks<T: Ord>(values: &[T]) -> Vec<usize> {
    ranks_by(values.len(), |a, b| values[a].cmp(&values[b]))
}

/// Positions holding the minimum of `values`.
pub fn argmin_set<T: Ord>(values: &[T]) -> Vec<usize> {
    match values.iter().min() {
        Some(min) => values
            .iter()
            .enumerate()
            .filter(|(_, v)| *v == min)
            .map(|(i, _)| i)
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_share_the_smallest_rank() {
        assert_eq!(ranks(&[102, 100, 109, 100, 101]), vec![3, 0, 4, 0, 2]);
        assert_eq!(ranks(&[101, 100, 107, 101, 106, 101]), vec![1, 0, 5, 1, 4, 1]);
    }

    #[test]
    fn empty_and_singleton() {
        assert!(ranks::<u32>(&[]).is_empty());
        assert_eq!(ranks(&[7]), vec![0]);
    }

    #[test]
    fn argmin_collects_all_ties() {
        assert_eq!(argmin_set(&[3, 1, 2, 1]), vec![1, 3]);
        assert!(argmin_set::<u8>(&[]).is_empty());
    }
}
