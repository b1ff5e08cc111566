use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use pitchspell::cost::Cost;
use pitchspell::verifier::CrossCheck;
use pitchspell::{
    KeyIndex, LocalTonalityGrid, SpellOutcome, SpellResult, SpellingTable, SpellingVector,
    TonalityCatalog,
};
use std::cmp::Ordering;

fn key_label(catalog: &TonalityCatalog, index: KeyIndex) -> String {
    match index.index().and_then(|i| catalog.key(i).ok()) {
        Some(key) => format!("{} {}", key.tonic_name(), key.mode()),
        None => index.to_string(),
    }
}

fn right_align(table: &mut Table, from: usize, to: usize) {
    for i in from..=to {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

/// Row cost of every key, best first, with its global eligibility.
/// Keys that cannot spell every bar come last.
pub fn print_row_costs<V: SpellingVector>(
    table: &SpellingTable<V>,
    catalog: &TonalityCatalog,
    limit: usize,
) -> SpellResult<()> {
    let mut order: Vec<usize> = (0..catalog.len()).collect();
    let costs = order
        .iter()
        .map(|&i| table.row_cost(i))
        .collect::<SpellResult<Vec<_>>>()?;
    order.sort_by(|&a, &b| {
        let by_cost = match (costs[a], costs[b]) {
            (Some(ca), Some(cb)) => ca.compare(cb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_cost.then(a.cmp(&b))
    });

    let mut out = Table::new();
    out.load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    out.add_row(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Key").add_attribute(Attribute::Bold),
        Cell::new("Row cost").fg(Color::Cyan),
        Cell::new("Global"),
    ]);
    right_align(&mut out, 2, 2);

    for &i in order.iter().take(limit) {
        let eligible = catalog.is_global_eligible(i)?;
        let mark = if eligible {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("")
        };
        out.add_row(vec![
            Cell::new(i),
            Cell::new(catalog.key(i)?).add_attribute(Attribute::Bold),
            Cell::new(costs[i].map_or("-".to_string(), |c| c.to_string())).fg(Color::Cyan),
            mark,
        ]);
    }
    println!("\n{}", out);
    Ok(())
}

/// Local keys per bar for every computed row of the grid.
pub fn print_grid(grid: &LocalTonalityGrid, catalog: &TonalityCatalog) -> SpellResult<()> {
    let mut out = Table::new();
    out.load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let title = format!("Global \\ Bar ({})", grid.strategy());
    let mut header = vec![Cell::new(title).add_attribute(Attribute::Bold)];
    header.extend(
        (0..grid.bars()).map(|j| Cell::new(j).set_alignment(CellAlignment::Center)),
    );
    out.add_row(header);

    for g in 0..grid.rows() {
        let row = grid.row(g)?;
        if row.iter().all(|k| *k == KeyIndex::Unset) && grid.bars() > 0 {
            continue;
        }
        let label = if grid.is_modal() {
            "(modal)".to_string()
        } else {
            key_label(catalog, KeyIndex::Valid(g))
        };
        let mut cells = vec![Cell::new(label).add_attribute(Attribute::Bold)];
        cells.extend(row.iter().map(|&k| {
            let cell = Cell::new(key_label(catalog, k));
            if k == KeyIndex::Failed {
                cell.fg(Color::Red)
            } else {
                cell
            }
        }));
        out.add_row(cells);
    }
    println!("\n{}", out);
    Ok(())
}

pub fn print_outcome(outcome: &SpellOutcome, catalog: &TonalityCatalog) {
    let mut out = Table::new();
    out.load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let global = key_label(catalog, outcome.global);
    let candidates: Vec<String> = outcome
        .candidates
        .iter()
        .map(|&i| key_label(catalog, KeyIndex::Valid(i)))
        .collect();
    let locals: Vec<String> = outcome
        .locals
        .iter()
        .map(|&k| key_label(catalog, k))
        .collect();

    out.add_row(vec![
        Cell::new("Strategy").add_attribute(Attribute::Bold),
        Cell::new(outcome.strategy),
    ]);
    out.add_row(vec![
        Cell::new("Global").add_attribute(Attribute::Bold),
        Cell::new(global).fg(Color::Green),
    ]);
    out.add_row(vec![
        Cell::new("Candidates").add_attribute(Attribute::Bold),
        Cell::new(candidates.join(", ")),
    ]);
    out.add_row(vec![
        Cell::new("Locals").add_attribute(Attribute::Bold),
        Cell::new(locals.join(" | ")),
    ]);
    out.add_row(vec![
        Cell::new("Renamed").add_attribute(Attribute::Bold),
        Cell::new(if outcome.renamed { "yes" } else { "no" }),
    ]);
    println!("\n{}", out);
}

/// Distance (or rank) matrix of a closed catalog.
pub fn print_matrix(catalog: &TonalityCatalog, ranks: bool) -> SpellResult<()> {
    let n = catalog.len();
    let mut out = Table::new();
    out.load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Disabled);

    let corner = if ranks { "rank" } else { "dist" };
    let mut header = vec![Cell::new(corner).add_attribute(Attribute::Bold)];
    for j in 0..n {
        let key = catalog.key(j)?;
        let mode = short_mode(&key.mode().to_string());
        header.push(Cell::new(format!("{}{}", key.tonic_name(), mode)));
    }
    out.add_row(header);

    for i in 0..n {
        let key = catalog.key(i)?;
        let mut cells = vec![Cell::new(key).add_attribute(Attribute::Bold)];
        for j in 0..n {
            let v = if ranks {
                catalog.rank(i, j)?
            } else {
                catalog.distance(i, j)? as usize
            };
            let cell = Cell::new(v);
            cells.push(if i == j { cell.fg(Color::Cyan) } else { cell });
        }
        out.add_row(cells);
    }
    right_align(&mut out, 1, n);
    println!("{}", out);
    Ok(())
}

fn short_mode(mode: &str) -> String {
    mode.split('-')
        .filter_map(|w| w.chars().next())
        .collect()
}

pub fn print_cross_checks(checks: &[CrossCheck]) {
    let mut out = Table::new();
    out.load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    out.add_row(vec![
        Cell::new("Round").add_attribute(Attribute::Bold),
        Cell::new("Global"),
        Cell::new("DP"),
        Cell::new("Search"),
        Cell::new("Status"),
    ]);
    right_align(&mut out, 2, 3);

    let fmt_cost = |c: Option<u64>| c.map_or("-".to_string(), |v| v.to_string());
    for (round, check) in checks.iter().enumerate() {
        let status = if check.agrees() {
            Cell::new("ok").fg(Color::Green)
        } else {
            Cell::new("MISMATCH").fg(Color::Red).add_attribute(Attribute::Bold)
        };
        out.add_row(vec![
            Cell::new(round),
            Cell::new(check.global.map_or("modal".to_string(), |g| g.to_string())),
            Cell::new(fmt_cost(check.dp_cost)),
            Cell::new(fmt_cost(check.search_cost)),
            status,
        ]);
    }
    println!("\n{}", out);
}
