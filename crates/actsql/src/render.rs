//! Fragment renderers over the clause store.
//!
//! Pure serialization: each method maps one stored clause kind to its SQL
//! text. Escaping applies only to structured where/set values; raw
//! fragments, tables, fields, join and order-by text pass through verbatim —
//! callers own injection-safety for anything they supply raw.

use crate::clause::{ClauseSet, JoinEntry, SetEntry, WhereEntry};
use crate::value::Value;

impl ClauseSet {
    /// The stored field list, or `*` if unset.
    pub(crate) fn select_sql(&self) -> &str {
        if self.select.is_empty() {
            "*"
        } else {
            &self.select
        }
    }

    /// Join clauses, space-joined in insertion order.
    pub(crate) fn join_sql(&self) -> String {
        let parts: Vec<String> = self
            .join
            .iter()
            .filter_map(|entry| match entry {
                JoinEntry::Raw(fragment) if fragment.is_empty() => None,
                JoinEntry::Raw(fragment) => Some(fragment.clone()),
                JoinEntry::On { relate, table, on } => {
                    Some(format!("{relate} {table} ON({on})"))
                }
            })
            .collect();
        parts.join(" ")
    }

    /// Where conditions, space-joined in insertion order.
    ///
    /// Structured conditions keep their leading relate keyword, including
    /// the first one (`WHERE AND age > 18`).
    pub(crate) fn where_sql(&self, esc: &dyn Fn(&Value) -> String) -> String {
        let parts: Vec<String> = self
            .where_
            .iter()
            .filter_map(|entry| match entry {
                WhereEntry::Raw(fragment) if fragment.is_empty() => None,
                WhereEntry::Raw(fragment) => Some(fragment.clone()),
                WhereEntry::Cond {
                    relate,
                    field,
                    operate,
                    value,
                } => Some(format!("{relate} {field} {operate} {}", esc(value))),
            })
            .collect();
        parts.join(" ")
    }

    /// Set assignments, comma-joined in insertion order.
    pub(crate) fn set_sql(&self, esc: &dyn Fn(&Value) -> String) -> String {
        let parts: Vec<String> = self
            .set
            .iter()
            .filter_map(|entry| match entry {
                SetEntry::Raw(fragment) if fragment.is_empty() => None,
                SetEntry::Raw(fragment) => Some(fragment.clone()),
                SetEntry::Assign { field, value } => Some(format!("{field}={}", esc(value))),
            })
            .collect();
        parts.join(", ")
    }

    /// Order-by pairs, comma-joined in insertion order; direction omitted
    /// when absent.
    pub(crate) fn order_sql(&self) -> String {
        let parts: Vec<String> = self
            .orderby
            .iter()
            .map(|(field, direction)| match direction {
                Some(direction) => format!("{field} {direction}"),
                None => field.clone(),
            })
            .collect();
        parts.join(", ")
    }

    /// `<offset>, <num>` when a limit is present, empty otherwise.
    ///
    /// An explicit zero limit is present and renders `0, 0`.
    pub(crate) fn limit_sql(&self) -> String {
        match self.limit {
            Some(limit) => format!("{}, {}", limit.offset, limit.num),
            None => String::new(),
        }
    }
}
