mod common;

use common::{index_of, TableBuilder};
use pitchspell::cost::{AccidDistSum, Cost};
use pitchspell::table::loader::read_columns;
use pitchspell::{
    CostColumn, KeyIndex, Mode, SpellError, SpellingTable, SpellingVector, TonalityCatalog,
};
use rstest::rstest;

#[test]
fn test_unique_minimum_selects_one_global() {
    let mut cat = TonalityCatalog::preset(30).unwrap();
    let d = index_of(&cat, 2, Mode::Major);
    let table = TableBuilder::new(30)
        .favour(&[d], 0, 2)
        .favour(&[d], 1, 2)
        .empty()
        .build(&cat);
    assert_eq!(table.select_global_candidates(&mut cat, 0.0, false).unwrap(), 1);
    assert_eq!(cat.eligible_indices(), vec![d]);
}

#[test]
fn test_full_tolerance_selects_everything() {
    let mut cat = TonalityCatalog::preset(26).unwrap();
    let table = TableBuilder::new(26).favour(&[3], 0, 50).build(&cat);
    assert_eq!(table.select_global_candidates(&mut cat, 100.0, false).unwrap(), 26);
}

#[rstest]
#[case(0.0, 2)]
#[case(10.0, 3)]
#[case(25.0, 4)]
fn test_tolerance_widens_the_selection(#[case] tolerance: f64, #[case] expected: usize) {
    let mut cat = TonalityCatalog::preset(30).unwrap();
    // row costs: 20, 20, 22, 25 for keys 0..4, 40 for the rest
    let mut costs = vec![40u32; 30];
    costs[..4].copy_from_slice(&[20, 20, 22, 25]);
    let table = TableBuilder::new(30).bar(&costs).build(&cat);
    assert_eq!(
        table.select_global_candidates(&mut cat, tolerance, false).unwrap(),
        expected
    );
}

#[test]
fn test_refine_only_narrows() {
    let mut cat = TonalityCatalog::preset(30).unwrap();
    let mut costs = vec![40u32; 30];
    costs[5] = 10;
    costs[9] = 11;
    let table = TableBuilder::new(30).bar(&costs).build(&cat);

    cat.clear_all_eligibility().unwrap();
    cat.set_global_eligible(9).unwrap();
    cat.set_global_eligible(20).unwrap();
    // key 5 is cheaper but not a candidate any more
    assert_eq!(table.select_global_candidates(&mut cat, 0.0, true).unwrap(), 1);
    assert_eq!(cat.eligible_indices(), vec![9]);
}

#[test]
fn test_single_global_is_idempotent() {
    let mut cat = TonalityCatalog::preset(30).unwrap();
    let table = TableBuilder::new(30).favour(&[4, 8], 0, 3).build(&cat);
    table.select_global_candidates(&mut cat, 0.0, false).unwrap();
    assert_eq!(cat.eligible_count(), 2);
    assert!(table.select_single_global(&mut cat).unwrap());
    assert_eq!(cat.best_eligible().unwrap(), KeyIndex::Valid(4));
    assert!(table.select_single_global(&mut cat).unwrap());
    assert_eq!(cat.eligible_indices(), vec![4]);

    cat.clear_all_eligibility().unwrap();
    assert!(!table.select_single_global(&mut cat).unwrap());
}

#[test]
fn test_table_needs_a_closed_catalog() {
    let cat = TonalityCatalog::new();
    let res = SpellingTable::<CostColumn<pitchspell::cost::AccidCost>>::new(vec![], &cat);
    assert!(matches!(res, Err(SpellError::CatalogOpen)));
}

#[test]
fn test_csv_with_compound_costs() {
    let data = "2/1,1/3,0/5\n,,\n1/1,1/0,4/0\n";
    let cols: Vec<CostColumn<AccidDistSum>> = read_columns(data.as_bytes(), 3, false).unwrap();
    assert_eq!(cols.len(), 3);
    assert!(cols[1].is_empty());
    // sum first: 3, 4, 5
    assert_eq!(cols[0].dense_cost_ranks(), vec![0, 1, 2]);
    // 1+1 vs 1+0 vs 4+0
    assert_eq!(cols[2].cost_tied_minimum(0.0), vec![1]);
    assert!(cols[2].bag_cost(1).unwrap().same(&AccidDistSum::new(1, 0)));
}
