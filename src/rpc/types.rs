//! Result types returned by the remote node.

use std::fmt;

/// Compression applied to an outgoing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip = 1,
    None = 2,
}

impl Compression {
    /// Returns the wire value of this compression mode.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Kind of result a query produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CqlResultType {
    /// The result carries rows.
    Rows,
    /// Statement executed with nothing to return.
    #[default]
    Void,
    /// The result carries a single integer (e.g. a count).
    Int,
}

impl CqlResultType {
    /// Parses the wire value.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Rows),
            2 => Some(Self::Void),
            3 => Some(Self::Int),
            _ => None,
        }
    }
}

impl fmt::Display for CqlResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rows => f.write_str("ROWS"),
            Self::Void => f.write_str("VOID"),
            Self::Int => f.write_str("INT"),
        }
    }
}

/// Structured result of one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CqlResult {
    pub result_type: CqlResultType,
    pub rows: Vec<CqlRow>,
    pub num: Option<i32>,
}

impl CqlResult {
    /// Creates a ROWS result.
    pub fn rows(rows: Vec<CqlRow>) -> Self {
        Self {
            result_type: CqlResultType::Rows,
            rows,
            num: None,
        }
    }

    /// Creates a VOID result.
    pub fn void() -> Self {
        Self::default()
    }
}

/// A row: raw key plus ordered columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CqlRow {
    pub key: Vec<u8>,
    pub columns: Vec<Column>,
}

impl CqlRow {
    /// Creates a row with the given key and columns.
    pub fn new(key: impl Into<Vec<u8>>, columns: Vec<Column>) -> Self {
        Self {
            key: key.into(),
            columns,
        }
    }
}

/// A column as received from the node. A value absent on the wire is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Column {
    pub name: Vec<u8>,
    pub value: Vec<u8>,
    pub timestamp: Option<i64>,
}

impl Column {
    /// Creates a column with the given name and value.
    pub fn new(name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            timestamp: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_wire_values() {
        assert_eq!(Compression::Gzip.as_i32(), 1);
        assert_eq!(Compression::None.as_i32(), 2);
    }

    #[test]
    fn test_result_type_from_i32() {
        assert_eq!(CqlResultType::from_i32(1), Some(CqlResultType::Rows));
        assert_eq!(CqlResultType::from_i32(2), Some(CqlResultType::Void));
        assert_eq!(CqlResultType::from_i32(3), Some(CqlResultType::Int));
        assert_eq!(CqlResultType::from_i32(9), None);
    }

    #[test]
    fn test_result_constructors() {
        let result = CqlResult::rows(vec![CqlRow::new(vec![1], vec![Column::new(b"a", b"b")])]);
        assert_eq!(result.result_type, CqlResultType::Rows);
        assert_eq!(result.rows[0].columns[0].name, b"a".to_vec());

        let void = CqlResult::void();
        assert_eq!(void.result_type, CqlResultType::Void);
        assert!(void.rows.is_empty());
    }
}
