use std::collections::HashMap;

use serde_json::Value;

use crate::types::ProductId;

/// A single value read back from the feed sheet.
///
/// Data rows are read unformatted, so numbers arrive as numbers and need a
/// canonical text form before they can be compared with catalog SKUs.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    String(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Renders the cell as text. Integral numbers lose their fractional part (`123.0` → `"123"`).
    pub fn to_text(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::String(value) => value.clone(),
            Cell::Number(value) => render_number(*value),
            Cell::Bool(value) => if *value { "TRUE" } else { "FALSE" }.to_string(),
        }
    }

    /// Returns the product identifier held by this cell, if it is not blank.
    pub fn to_product_id(&self) -> Option<ProductId> {
        ProductId::parse(&self.to_text())
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(value) => Cell::Bool(value),
            Value::Number(number) => match number.as_f64() {
                Some(value) => Cell::Number(value),
                None => Cell::String(number.to_string()),
            },
            Value::String(value) => Cell::String(value),
            other => Cell::String(other.to_string()),
        }
    }
}

fn render_number(value: f64) -> String {
    // 2^53: beyond this f64 no longer represents every integer.
    const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// A data row of the feed sheet keyed by header name.
///
/// `row` is the 1-based sheet row the record was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRecord {
    pub row: u32,
    pub values: HashMap<String, Cell>,
}

impl SheetRecord {
    /// Builds a record by pairing `cells` with `headers` positionally.
    ///
    /// Missing trailing cells are treated as empty and cells beyond the header
    /// width are dropped.
    pub fn from_cells(row: u32, headers: &[String], cells: Vec<Cell>) -> Self {
        let mut cells = cells.into_iter();
        let mut values = HashMap::with_capacity(headers.len());
        for header in headers {
            let cell = cells.next().unwrap_or(Cell::Null);
            if !header.is_empty() {
                values.insert(header.clone(), cell);
            }
        }

        Self { row, values }
    }

    pub fn get(&self, header: &str) -> Option<&Cell> {
        self.values.get(header)
    }
}
