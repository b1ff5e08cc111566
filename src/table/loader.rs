use super::CostColumn;
use crate::cost::{Cost, ParseCost};
use crate::error::{SpellError, SpellResult};
use std::fs::File;
use std::io::Read;
use tracing::{debug, info};

/// Reads one bar per record, one field per catalog key (catalog order).
/// Empty fields are empty bags; a record of empty fields is an empty bar.
pub fn read_columns<C, R>(
    reader: R,
    keys: usize,
    has_headers: bool,
) -> SpellResult<Vec<CostColumn<C>>>
where
    C: Cost + ParseCost,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(has_headers)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut columns = Vec::new();
    for (bar, result) in rdr.records().enumerate() {
        let rec = result?;
        if rec.len() != keys {
            return Err(SpellError::Validation(format!(
                "bar {}: {} fields, expected {}",
                bar,
                rec.len(),
                keys
            )));
        }

        let bags = rec
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Ok(None)
                } else {
                    C::parse_cost(field).map(Some)
                }
            })
            .collect::<SpellResult<Vec<Option<C>>>>()?;
        columns.push(CostColumn::new(bags));
    }

    debug!("Read {} bars", columns.len());
    Ok(columns)
}

pub fn load_columns<C>(
    path: &str,
    keys: usize,
    has_headers: bool,
) -> SpellResult<Vec<CostColumn<C>>>
where
    C: Cost + ParseCost,
{
    info!("📂 Loading cost table: {}", path);
    let file = File::open(path)?;
    read_columns(file, keys, has_headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{AccidCost, AccidDistLex};
    use crate::table::SpellingVector;

    #[test]
    fn reads_bars_and_empty_bags() {
        let data = "0,1,\n,,\n2,0,1\n";
        let cols: Vec<CostColumn<AccidCost>> = read_columns(data.as_bytes(), 3, false).unwrap();
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[0].bag_cost(1), Some(&AccidCost::new(1)));
        assert_eq!(cols[0].bag_cost(2), None);
        assert!(cols[1].is_empty());
        assert!(!cols[2].is_empty());
    }

    #[test]
    fn header_row_is_skipped() {
        let data = "C,a,F\n1/0,0/2,3/1\n";
        let cols: Vec<CostColumn<AccidDistLex>> = read_columns(data.as_bytes(), 3, true).unwrap();
        assert_eq!(cols.len(), 1);
        assert_eq!(cols[0].bag_cost(1), Some(&AccidDistLex::new(0, 2)));
    }

    #[test]
    fn wrong_width_is_a_validation_error() {
        let data = "0,1\n";
        let res: SpellResult<Vec<CostColumn<AccidCost>>> = read_columns(data.as_bytes(), 3, false);
        assert!(matches!(res, Err(SpellError::Validation(_))));
    }
}
