use crate::catalog::TonalityCatalog;
use crate::error::SpellResult;
use crate::ton::{Key, Mode};
use tracing::debug;

// Major first, then harmonic minor, then every other mode.
fn mode_preference(key: &Key) -> u8 {
    match key.mode() {
        Mode::Major => 0,
        Mode::Minor => 1,
        _ => 2,
    }
}

fn keep_min<F>(cands: Vec<usize>, mut score: F) -> SpellResult<Vec<usize>>
where
    F: FnMut(usize) -> SpellResult<usize>,
{
    let scored = cands
        .into_iter()
        .map(|c| Ok((score(c)?, c)))
        .collect::<SpellResult<Vec<(usize, usize)>>>()?;
    let Some(min) = scored.iter().map(|(s, _)| *s).min() else {
        return Ok(Vec::new());
    };
    Ok(scored
        .into_iter()
        .filter(|(s, _)| *s == min)
        .map(|(_, c)| c)
        .collect())
}

/// Picks one key among candidates of equal cost:
/// 1. closest (by rank) to the previous local key,
/// 2. closest to the global key,
/// 3. fewest accidentals in the signature,
/// 4. major or minor before other modes, major before minor.
///
/// A tie surviving all criteria goes to the smallest catalog index.
/// Returns `None` only for an empty candidate set.
pub fn break_ties(
    catalog: &TonalityCatalog,
    cands: &[usize],
    previous: Option<usize>,
    global: Option<usize>,
) -> SpellResult<Option<usize>> {
    let mut left: Vec<usize> = cands.to_vec();
    left.sort_unstable();
    left.dedup();
    if left.len() <= 1 {
        return Ok(left.first().copied());
    }

    if let Some(p) = previous {
        let ranks = catalog.rank_row(p)?;
        left = keep_min(left, |c| Ok(ranks[c]))?;
    }
    if left.len() > 1 {
        if let Some(g) = global {
            let ranks = catalog.rank_row(g)?;
            left = keep_min(left, |c| Ok(ranks[c]))?;
        }
    }
    if left.len() > 1 {
        left = keep_min(left, |c| Ok(catalog.key(c)?.signature().unsigned_abs() as usize))?;
    }
    if left.len() > 1 {
        left = keep_min(left, |c| Ok(mode_preference(&catalog.key(c)?) as usize))?;
    }
    if left.len() > 1 {
        let names: Vec<String> = left
            .iter()
            .filter_map(|&c| catalog.key(c).ok().map(|k| format!("{}:{}", c, k)))
            .collect();
        debug!("Tie break fail, keeping {}: {}", left[0], names.join(", "));
    }
    Ok(left.first().copied())
}
