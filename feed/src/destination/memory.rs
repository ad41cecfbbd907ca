use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::destination::Destination;
use crate::error::{ErrorKind, FeedResult};
use crate::feed_error;
use crate::types::{Cell, SheetRecord};

/// Kind of a destination call, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestinationOpKind {
    ReadHeaderRow,
    ReadRecords,
    AppendRows,
    UpdateRow,
    DeleteRow,
}

/// A destination call recorded by [`MemoryDestination`].
#[derive(Debug, Clone, PartialEq)]
pub enum DestinationOp {
    ReadHeaderRow,
    ReadRecords,
    AppendRows { start_row: u32, rows: Vec<Vec<String>> },
    UpdateRow { row: u32, values: Vec<String> },
    DeleteRow { row: u32 },
}

impl DestinationOp {
    pub fn kind(&self) -> DestinationOpKind {
        match self {
            DestinationOp::ReadHeaderRow => DestinationOpKind::ReadHeaderRow,
            DestinationOp::ReadRecords => DestinationOpKind::ReadRecords,
            DestinationOp::AppendRows { .. } => DestinationOpKind::AppendRows,
            DestinationOp::UpdateRow { .. } => DestinationOpKind::UpdateRow,
            DestinationOp::DeleteRow { .. } => DestinationOpKind::DeleteRow,
        }
    }

    /// Returns `true` for calls that change the sheet.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            DestinationOp::AppendRows { .. }
                | DestinationOp::UpdateRow { .. }
                | DestinationOp::DeleteRow { .. }
        )
    }
}

#[derive(Debug, Default)]
struct Inner {
    /// Sheet cells, row 1 first.
    grid: Vec<Vec<Cell>>,
    operations: Vec<DestinationOp>,
    failing: HashSet<DestinationOpKind>,
}

impl Inner {
    fn record(&mut self, op: DestinationOp) -> FeedResult<()> {
        let kind = op.kind();
        self.operations.push(op);

        if self.failing.contains(&kind) {
            return Err(feed_error!(
                ErrorKind::DestinationQueryFailed,
                "Sheets API request failed",
                format!("injected {kind:?} failure")
            ));
        }

        Ok(())
    }

    fn headers(&self) -> Vec<String> {
        self.grid
            .first()
            .map(|row| row.iter().map(Cell::to_text).collect())
            .unwrap_or_default()
    }
}

/// In-memory feed sheet for tests and local development.
///
/// Behaves like a spreadsheet tab: deleting a row shifts the rows below it up,
/// and writing past the last row grows the grid. Every call is recorded and can
/// be made to fail with [`MemoryDestination::fail_on`]. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryDestination {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryDestination {
    /// Creates an empty sheet, without even a header row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sheet holding only the given header row.
    pub fn with_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let header_row = headers
            .iter()
            .map(|header| Cell::String(header.as_ref().to_string()))
            .collect();

        Self {
            inner: Arc::new(Mutex::new(Inner {
                grid: vec![header_row],
                ..Inner::default()
            })),
        }
    }

    /// Appends a data row of raw cells, bypassing the operation log.
    pub async fn push_row(&self, cells: Vec<Cell>) {
        self.inner.lock().await.grid.push(cells);
    }

    /// Returns the whole sheet as text, header row included.
    pub async fn grid(&self) -> Vec<Vec<String>> {
        let inner = self.inner.lock().await;
        inner
            .grid
            .iter()
            .map(|row| row.iter().map(Cell::to_text).collect())
            .collect()
    }

    /// Returns the data rows as text.
    pub async fn data_rows(&self) -> Vec<Vec<String>> {
        self.grid().await.into_iter().skip(1).collect()
    }

    /// Returns every call made so far, in order.
    pub async fn operations(&self) -> Vec<DestinationOp> {
        self.inner.lock().await.operations.clone()
    }

    /// Returns the calls that changed the sheet, in order.
    pub async fn writes(&self) -> Vec<DestinationOp> {
        self.operations()
            .await
            .into_iter()
            .filter(DestinationOp::is_write)
            .collect()
    }

    pub async fn clear_operations(&self) {
        self.inner.lock().await.operations.clear();
    }

    /// Makes every subsequent call of `kind` fail after being recorded.
    pub async fn fail_on(&self, kind: DestinationOpKind) {
        self.inner.lock().await.failing.insert(kind);
    }

    pub async fn clear_failures(&self) {
        self.inner.lock().await.failing.clear();
    }
}

impl Destination for MemoryDestination {
    async fn read_header_row(&self) -> FeedResult<Vec<String>> {
        let mut inner = self.inner.lock().await;
        inner.record(DestinationOp::ReadHeaderRow)?;

        let mut headers = inner.headers();
        while headers.last().is_some_and(String::is_empty) {
            headers.pop();
        }

        Ok(headers)
    }

    async fn read_records(&self) -> FeedResult<Vec<SheetRecord>> {
        let mut inner = self.inner.lock().await;
        inner.record(DestinationOp::ReadRecords)?;

        let headers = inner.headers();
        let records = inner
            .grid
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, cells)| SheetRecord::from_cells(index as u32 + 1, &headers, cells.clone()))
            .collect();

        Ok(records)
    }

    async fn append_rows(&self, start_row: u32, rows: Vec<Vec<String>>) -> FeedResult<()> {
        let mut inner = self.inner.lock().await;
        inner.record(DestinationOp::AppendRows {
            start_row,
            rows: rows.clone(),
        })?;

        info!(rows = rows.len(), start_row, "appending rows to memory destination");
        let index = start_row.saturating_sub(1).max(1) as usize;
        if inner.grid.len() < index {
            inner.grid.resize(index, Vec::new());
        }
        inner.grid.splice(
            index..index,
            rows.into_iter()
                .map(|row| row.into_iter().map(Cell::String).collect::<Vec<_>>()),
        );

        Ok(())
    }

    async fn update_row(&self, row: u32, values: Vec<String>) -> FeedResult<()> {
        let mut inner = self.inner.lock().await;
        inner.record(DestinationOp::UpdateRow {
            row,
            values: values.clone(),
        })?;

        let index = row.saturating_sub(1) as usize;
        if inner.grid.len() <= index {
            inner.grid.resize(index + 1, Vec::new());
        }

        let cells = &mut inner.grid[index];
        if cells.len() < values.len() {
            cells.resize(values.len(), Cell::Null);
        }
        for (cell, value) in cells.iter_mut().zip(values) {
            *cell = Cell::String(value);
        }

        Ok(())
    }

    async fn delete_row(&self, row: u32) -> FeedResult<()> {
        let mut inner = self.inner.lock().await;
        inner.record(DestinationOp::DeleteRow { row })?;

        let index = row.saturating_sub(1) as usize;
        if index < inner.grid.len() {
            inner.grid.remove(index);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deleting_a_row_shifts_the_rows_below() {
        let destination = MemoryDestination::with_headers(&["id", "title"]);
        destination
            .append_rows(2, vec![
                vec!["A".to_string(), "a".to_string()],
                vec!["B".to_string(), "b".to_string()],
                vec!["C".to_string(), "c".to_string()],
            ])
            .await
            .unwrap();

        destination.delete_row(3).await.unwrap();

        let records = destination.read_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].row, 3);
        assert_eq!(records[1].get("id"), Some(&Cell::String("C".to_string())));
    }

    #[tokio::test]
    async fn append_writes_at_the_start_row() {
        let destination = MemoryDestination::with_headers(&["id"]);
        destination.push_row(vec![Cell::String("A".to_string())]).await;
        destination.push_row(vec![]).await;
        destination.push_row(vec![Cell::String("B".to_string())]).await;

        destination
            .append_rows(5, vec![vec!["C".to_string()]])
            .await
            .unwrap();
        destination
            .append_rows(8, vec![vec!["D".to_string()]])
            .await
            .unwrap();

        let ids: Vec<String> = destination
            .data_rows()
            .await
            .into_iter()
            .map(|row| row.into_iter().next().unwrap_or_default())
            .collect();
        assert_eq!(ids, vec!["A", "", "B", "C", "", "", "D"]);
    }

    #[tokio::test]
    async fn update_overwrites_cells_in_place() {
        let destination = MemoryDestination::with_headers(&["id", "title"]);
        destination
            .push_row(vec![Cell::Number(7.0), Cell::String("old".to_string())])
            .await;

        destination
            .update_row(2, vec!["7".to_string(), "new".to_string()])
            .await
            .unwrap();

        assert_eq!(
            destination.data_rows().await,
            vec![vec!["7".to_string(), "new".to_string()]]
        );
    }

    #[tokio::test]
    async fn injected_failures_are_recorded_and_returned() {
        let destination = MemoryDestination::with_headers(&["id"]);
        destination.fail_on(DestinationOpKind::DeleteRow).await;

        let err = destination.delete_row(2).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DestinationQueryFailed);
        assert_eq!(
            destination.operations().await,
            vec![DestinationOp::DeleteRow { row: 2 }]
        );
    }

    #[tokio::test]
    async fn headers_of_an_empty_sheet_are_empty() {
        let destination = MemoryDestination::new();

        assert!(destination.read_header_row().await.unwrap().is_empty());
        assert!(destination.read_records().await.unwrap().is_empty());
    }
}
