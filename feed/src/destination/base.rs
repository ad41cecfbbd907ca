use std::future::Future;

use crate::error::FeedResult;
use crate::types::SheetRecord;

/// The tabular feed the catalog is reconciled into.
///
/// Row 1 holds the column headers and rows 2 onwards hold one product each.
/// Row numbers are 1-based. Deleting a row shifts every row below it up by one.
pub trait Destination {
    /// Reads the header row. Returns an empty vector when the sheet has no headers.
    fn read_header_row(&self) -> impl Future<Output = FeedResult<Vec<String>>> + Send;

    /// Reads every data row, keyed by header, in sheet order.
    ///
    /// The record at index `i` sits on sheet row `i + 2`.
    fn read_records(&self) -> impl Future<Output = FeedResult<Vec<SheetRecord>>> + Send;

    /// Writes `rows` in a single call starting at sheet row `start_row`.
    ///
    /// `start_row` is the row after the last data row, so the write never
    /// lands inside or above existing data, even when the sheet has blank rows.
    fn append_rows(
        &self,
        start_row: u32,
        rows: Vec<Vec<String>>,
    ) -> impl Future<Output = FeedResult<()>> + Send;

    /// Overwrites the cells of sheet row `row`, starting at the first column.
    fn update_row(
        &self,
        row: u32,
        values: Vec<String>,
    ) -> impl Future<Output = FeedResult<()>> + Send;

    /// Deletes sheet row `row`.
    fn delete_row(&self, row: u32) -> impl Future<Output = FeedResult<()>> + Send;
}
