//! The database-connection collaborator interface.

use crate::error::DbResult;
use crate::value::Value;

/// Result descriptor reported by the driver for write statements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteResult {
    /// Identifier generated for the inserted row, if any.
    pub insert_id: u64,
    /// Rows whose content actually changed (UPDATE).
    pub changed_rows: u64,
    /// Rows matched/removed by the statement (UPDATE/DELETE).
    pub affected_rows: u64,
}

/// The raw outcome of a dispatched statement: a row sequence for reads, a
/// write descriptor for writes.
#[derive(Clone, Debug)]
pub enum QueryOutput<R> {
    Rows(Vec<R>),
    Write(WriteResult),
}

impl<R> QueryOutput<R> {
    /// Normalize to a row sequence.
    ///
    /// A write descriptor maps to no rows; reads never yield `null`.
    pub fn into_rows(self) -> Vec<R> {
        match self {
            Self::Rows(rows) => rows,
            Self::Write(_) => Vec::new(),
        }
    }

    /// Normalize to a write descriptor.
    ///
    /// A row sequence maps to a zeroed descriptor.
    pub fn into_write(self) -> WriteResult {
        match self {
            Self::Write(write) => write,
            Self::Rows(_) => WriteResult::default(),
        }
    }
}

/// Capabilities the builder requires from a database connection.
///
/// Pooling, transactions, and network-level retries live behind the
/// implementation; this layer only hands over finished SQL strings and maps
/// the result shape.
pub trait Driver: Send + Sync {
    /// Row type produced by read statements.
    type Row: Send;

    /// Render a scalar as a SQL-safe literal.
    fn escape(&self, value: &Value) -> String;

    /// Execute a finished SQL string.
    ///
    /// Failures (syntax errors, constraint violations, connection loss)
    /// surface as [`crate::error::DbError::Driver`].
    fn query(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = DbResult<QueryOutput<Self::Row>>> + Send;
}

/// MySQL-style literal quoting, usable as an [`Driver::escape`]
/// implementation for drivers that do not expose their own.
pub fn escape_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        Value::Int(n) => n.to_string(),
        Value::UInt(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::Text(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "''")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_literal_scalars() {
        assert_eq!(escape_literal(&Value::Null), "NULL");
        assert_eq!(escape_literal(&Value::Bool(true)), "1");
        assert_eq!(escape_literal(&Value::Int(-7)), "-7");
        assert_eq!(escape_literal(&Value::UInt(7)), "7");
    }

    #[test]
    fn test_escape_literal_quotes_text() {
        assert_eq!(
            escape_literal(&Value::Text("O'Brien".to_string())),
            "'O''Brien'"
        );
    }

    #[test]
    fn test_output_normalization() {
        let rows: QueryOutput<i32> = QueryOutput::Rows(vec![1, 2]);
        assert_eq!(rows.into_rows(), vec![1, 2]);

        let write: QueryOutput<i32> = QueryOutput::Write(WriteResult {
            insert_id: 9,
            changed_rows: 1,
            affected_rows: 1,
        });
        assert!(write.clone().into_rows().is_empty());
        assert_eq!(write.into_write().insert_id, 9);
    }
}
