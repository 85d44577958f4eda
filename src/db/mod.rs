mod connection;

pub use connection::*;

/// Header labels for the active-books view. The view projects exactly these
/// four columns in this order.
pub const ACTIVE_BOOK_HEADERS: [&str; 4] = ["Title", "Price", "Quantity", "Popularity"];

/// Rows returned by a query, rendered to text. A `None` cell is SQL NULL;
/// the results table shows it as `NULL`, the CSV export as an empty field.
#[derive(Clone, Debug)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self {
            columns: vec![],
            rows: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_has_no_columns() {
        let result = QueryResult::empty();
        assert!(result.is_empty());
        assert!(result.rows.is_empty());
    }
}
