use std::collections::HashMap;

use tracing::debug;

use crate::bail;
use crate::error::{ErrorKind, FeedResult};
use crate::mapping::FeedColumn;
use crate::types::{ProductId, SheetRecord};

/// Sheet row of every product currently listed in the feed.
pub type DestinationIndex = HashMap<ProductId, u32>;

/// Maps each non-blank identifier to the sheet row holding it.
///
/// When an identifier appears on several rows the last one wins. Rows with a
/// blank identifier are not indexed. A sheet with data rows but no `id`
/// column cannot be indexed and fails with [`ErrorKind::DestinationSchemaError`].
pub fn build_index(headers: &[String], records: &[SheetRecord]) -> FeedResult<DestinationIndex> {
    if records.is_empty() {
        return Ok(DestinationIndex::new());
    }

    if !headers.iter().any(|header| header == FeedColumn::ID_HEADER) {
        bail!(
            ErrorKind::DestinationSchemaError,
            "Feed sheet has data rows but no id column",
            format!("headers: {headers:?}")
        );
    }

    let mut index = DestinationIndex::with_capacity(records.len());
    for record in records {
        let Some(id) = record
            .get(FeedColumn::ID_HEADER)
            .and_then(|cell| cell.to_product_id())
        else {
            continue;
        };

        if let Some(previous) = index.insert(id.clone(), record.row) {
            debug!(%id, previous, row = record.row, "duplicate product id in feed sheet");
        }
    }

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    fn headers() -> Vec<String> {
        vec!["id".to_string(), "title".to_string()]
    }

    fn record(row: u32, id: Cell) -> SheetRecord {
        SheetRecord::from_cells(row, &headers(), vec![id, Cell::String("t".to_string())])
    }

    #[test]
    fn empty_sheet_gives_empty_index() {
        assert!(build_index(&headers(), &[]).unwrap().is_empty());
        assert!(build_index(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn rows_are_indexed_by_position() {
        let records = vec![
            record(2, Cell::String("A".to_string())),
            record(3, Cell::Number(1001.0)),
        ];

        let index = build_index(&headers(), &records).unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index["A"], 2);
        assert_eq!(index["1001"], 3);
    }

    #[test]
    fn last_duplicate_wins() {
        let records = vec![
            record(2, Cell::String("A".to_string())),
            record(3, Cell::String("B".to_string())),
            record(4, Cell::String(" A ".to_string())),
        ];

        let index = build_index(&headers(), &records).unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index["A"], 4);
    }

    #[test]
    fn blank_identifiers_are_skipped() {
        let records = vec![
            record(2, Cell::Null),
            record(3, Cell::String("   ".to_string())),
            record(4, Cell::String("C".to_string())),
        ];

        let index = build_index(&headers(), &records).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index["C"], 4);
    }

    #[test]
    fn data_without_id_column_is_a_schema_error() {
        let headers = vec!["title".to_string()];
        let records = vec![SheetRecord::from_cells(
            2,
            &headers,
            vec![Cell::String("t".to_string())],
        )];

        let err = build_index(&headers, &records).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DestinationSchemaError);
    }
}
