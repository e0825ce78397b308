/// An in-memory CSV table: a header plus rows aligned with it.
///
/// Every row holds exactly `headers.len()` values; missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a row, padding or truncating it to the table width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Appends all rows of `other`, which must share this table's header.
    pub fn append(&mut self, other: CsvTable) {
        debug_assert_eq!(self.headers, other.headers);
        self.rows.extend(other.rows);
    }

    /// Concatenates tables in order under a shared header.
    pub fn concat<I>(headers: Vec<String>, tables: I) -> Self
    where
        I: IntoIterator<Item = CsvTable>,
    {
        let mut combined = Self::new(headers);
        for table in tables {
            combined.append(table);
        }
        combined
    }

    /// Returns the values of one column, or `None` if the column is unknown.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.headers.iter().position(|h| h == name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        vec!["a".to_string(), "b".to_string()]
    }

    #[test]
    fn test_push_row_pads_short_rows() {
        let mut table = CsvTable::new(headers());
        table.push_row(vec!["1".to_string()]);
        assert_eq!(table.rows[0], vec!["1", ""]);
        assert_eq!(table.height(), 1);
        assert_eq!(table.width(), 2);
    }

    #[test]
    fn test_concat_preserves_order() {
        let mut first = CsvTable::new(headers());
        first.push_row(vec!["1".into(), "x".into()]);
        let mut second = CsvTable::new(headers());
        second.push_row(vec!["2".into(), "y".into()]);
        second.push_row(vec!["3".into(), "z".into()]);

        let combined = CsvTable::concat(headers(), vec![first, second]);
        assert_eq!(combined.column("a").unwrap(), vec!["1", "2", "3"]);
        assert_eq!(combined.column("missing"), None);
    }
}
