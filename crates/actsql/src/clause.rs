//! The clause store and input normalization.
//!
//! Clause-definition methods on [`crate::record::ActiveRecord`] push into a
//! [`ClauseSet`]; terminal calls take the whole set and replace it with a
//! fresh one, so exactly one statement's clauses live at a time.

use indexmap::IndexMap;

use crate::value::Value;

/// Heterogeneous input to `where`-style methods.
///
/// The three shapes normalize recursively: a list is parsed element by
/// element, pairs become structured conditions in insertion order.
#[derive(Clone, Debug)]
pub enum WhereInput {
    /// Pre-formatted condition fragment, stored verbatim (no escaping).
    Raw(String),
    /// Mixed list of raw fragments and pair maps.
    List(Vec<WhereInput>),
    /// Ordered field/value pairs, AND-combined in order. Keys follow the
    /// key-descriptor grammar (`"OR age >="` etc.).
    Pairs(Vec<(String, Value)>),
}

impl From<&str> for WhereInput {
    fn from(fragment: &str) -> Self {
        WhereInput::Raw(fragment.to_string())
    }
}

impl From<String> for WhereInput {
    fn from(fragment: String) -> Self {
        WhereInput::Raw(fragment)
    }
}

impl From<Vec<WhereInput>> for WhereInput {
    fn from(items: Vec<WhereInput>) -> Self {
        WhereInput::List(items)
    }
}

impl<K: Into<String>, V: Into<Value>> From<Vec<(K, V)>> for WhereInput {
    fn from(pairs: Vec<(K, V)>) -> Self {
        WhereInput::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for WhereInput {
    fn from(pairs: [(K, V); N]) -> Self {
        WhereInput::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Heterogeneous input to `set`-style methods.
///
/// Mirrors [`WhereInput`] minus the key-descriptor grammar: pair keys are
/// taken verbatim as field names.
#[derive(Clone, Debug)]
pub enum SetInput {
    /// Raw assignment fragment such as `f1=f1+1`, stored verbatim.
    Raw(String),
    /// Mixed list of raw fragments and pair maps.
    List(Vec<SetInput>),
    /// Ordered field/value pairs.
    Pairs(Vec<(String, Value)>),
}

impl From<&str> for SetInput {
    fn from(fragment: &str) -> Self {
        SetInput::Raw(fragment.to_string())
    }
}

impl From<String> for SetInput {
    fn from(fragment: String) -> Self {
        SetInput::Raw(fragment)
    }
}

impl From<Vec<SetInput>> for SetInput {
    fn from(items: Vec<SetInput>) -> Self {
        SetInput::List(items)
    }
}

impl<K: Into<String>, V: Into<Value>> From<Vec<(K, V)>> for SetInput {
    fn from(pairs: Vec<(K, V)>) -> Self {
        SetInput::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for SetInput {
    fn from(pairs: [(K, V); N]) -> Self {
        SetInput::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Stored where condition.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum WhereEntry {
    Raw(String),
    Cond {
        relate: String,
        field: String,
        operate: String,
        value: Value,
    },
}

/// Stored set assignment.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SetEntry {
    Raw(String),
    Assign { field: String, value: Value },
}

/// Stored join clause.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum JoinEntry {
    Raw(String),
    On {
        relate: String,
        table: String,
        on: String,
    },
}

/// Limit descriptor. `{offset: 0, num: 0}` is an explicit value and still
/// renders, unlike an absent limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Limit {
    pub(crate) offset: u64,
    pub(crate) num: u64,
}

/// Accumulated, not-yet-rendered clause state for one statement.
#[derive(Debug, Default)]
pub(crate) struct ClauseSet {
    /// Raw field-list string; empty renders as `*`. Overwritten, not
    /// accumulated.
    pub(crate) select: String,
    /// Raw table expression, possibly aliased. Overwritten.
    pub(crate) table: String,
    pub(crate) join: Vec<JoinEntry>,
    pub(crate) set: Vec<SetEntry>,
    pub(crate) where_: Vec<WhereEntry>,
    /// Field → direction, render order = insertion order, last write per
    /// field wins.
    pub(crate) orderby: IndexMap<String, Option<String>>,
    pub(crate) limit: Option<Limit>,
    /// First malformed input seen while accumulating; surfaced by the next
    /// terminal call before rendering.
    pub(crate) build_error: Option<String>,
}

impl ClauseSet {
    pub(crate) fn push_where(&mut self, input: WhereInput) {
        match input {
            WhereInput::Raw(fragment) => self.where_.push(WhereEntry::Raw(fragment)),
            WhereInput::List(items) => {
                for item in items {
                    self.push_where(item);
                }
            }
            WhereInput::Pairs(pairs) => {
                for (key, value) in pairs {
                    self.push_where_cond(&key, value);
                }
            }
        }
    }

    pub(crate) fn push_where_cond(&mut self, key: &str, value: Value) {
        if key.trim().is_empty() {
            self.fail("where key descriptor must be non-empty");
            return;
        }
        let (relate, field, operate) = parse_key_descriptor(key);
        self.where_.push(WhereEntry::Cond {
            relate,
            field,
            operate,
            value,
        });
    }

    pub(crate) fn push_set(&mut self, input: SetInput) {
        match input {
            SetInput::Raw(fragment) => self.set.push(SetEntry::Raw(fragment)),
            SetInput::List(items) => {
                for item in items {
                    self.push_set(item);
                }
            }
            SetInput::Pairs(pairs) => {
                for (field, value) in pairs {
                    self.push_set_assign(&field, value);
                }
            }
        }
    }

    pub(crate) fn push_set_assign(&mut self, field: &str, value: Value) {
        self.set.push(SetEntry::Assign {
            field: field.to_string(),
            value,
        });
    }

    pub(crate) fn push_join(&mut self, relate: &str, table: &str, on: &str) {
        self.join.push(JoinEntry::On {
            relate: relate.to_string(),
            table: table.to_string(),
            on: on.to_string(),
        });
    }

    pub(crate) fn push_join_raw(&mut self, fragment: &str) {
        self.join.push(JoinEntry::Raw(fragment.to_string()));
    }

    /// Parse a comma-separated `field [direction]` list into the order-by
    /// mapping.
    pub(crate) fn push_order(&mut self, spec: &str) {
        for part in spec.split(',') {
            let mut tokens = part.split_whitespace();
            let Some(field) = tokens.next() else { continue };
            let direction = tokens.next().map(str::to_string);
            self.orderby.insert(field.to_string(), direction);
        }
    }

    pub(crate) fn set_limit(&mut self, offset: u64, num: u64) {
        self.limit = Some(Limit { offset, num });
    }

    /// Latch the first accumulation error; later ones are dropped.
    fn fail(&mut self, message: &str) {
        if self.build_error.is_none() {
            self.build_error = Some(message.to_string());
        }
    }

    pub(crate) fn check(&self) -> crate::error::DbResult<()> {
        match &self.build_error {
            Some(message) => Err(crate::error::DbError::invalid_argument(message.clone())),
            None => Ok(()),
        }
    }
}

/// Split a where key descriptor into `(relate, field, operate)`.
///
/// One token is a bare field (`AND`/`=` defaults). Two tokens are either
/// `relate field` when the first token uppercases to AND/OR, otherwise
/// `field operate` — relate-keyword detection takes priority. Three or more
/// tokens are `relate field operate`, trailing tokens ignored.
pub(crate) fn parse_key_descriptor(key: &str) -> (String, String, String) {
    let parts: Vec<&str> = key.split_whitespace().collect();
    let mut relate = "AND".to_string();
    let mut field = String::new();
    let mut operate = "=".to_string();

    match parts.len() {
        0 => {}
        1 => field = parts[0].to_string(),
        2 => {
            let head = parts[0].to_uppercase();
            if head == "AND" || head == "OR" {
                relate = head;
                field = parts[1].to_string();
            } else {
                field = parts[0].to_string();
                operate = parts[1].to_string();
            }
        }
        _ => {
            relate = parts[0].to_string();
            field = parts[1].to_string();
            operate = parts[2].to_string();
        }
    }

    (relate, field, operate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(relate: &str, field: &str, operate: &str, value: Value) -> WhereEntry {
        WhereEntry::Cond {
            relate: relate.to_string(),
            field: field.to_string(),
            operate: operate.to_string(),
            value,
        }
    }

    #[test]
    fn test_key_descriptor_single_token() {
        assert_eq!(
            parse_key_descriptor("age"),
            ("AND".to_string(), "age".to_string(), "=".to_string())
        );
    }

    #[test]
    fn test_key_descriptor_two_tokens_relate_wins() {
        assert_eq!(
            parse_key_descriptor("or name"),
            ("OR".to_string(), "name".to_string(), "=".to_string())
        );
    }

    #[test]
    fn test_key_descriptor_two_tokens_operator() {
        assert_eq!(
            parse_key_descriptor("age >"),
            ("AND".to_string(), "age".to_string(), ">".to_string())
        );
    }

    #[test]
    fn test_key_descriptor_three_tokens() {
        assert_eq!(
            parse_key_descriptor("OR abc >="),
            ("OR".to_string(), "abc".to_string(), ">=".to_string())
        );
    }

    #[test]
    fn test_key_descriptor_extra_tokens_ignored() {
        assert_eq!(
            parse_key_descriptor("AND abc >= junk more"),
            ("AND".to_string(), "abc".to_string(), ">=".to_string())
        );
    }

    #[test]
    fn test_pairs_match_sequential_conds() {
        let mut via_pairs = ClauseSet::default();
        via_pairs.push_where(WhereInput::from(vec![("a", 1), ("b", 2)]));

        let mut via_calls = ClauseSet::default();
        via_calls.push_where_cond("a", Value::Int(1));
        via_calls.push_where_cond("b", Value::Int(2));

        assert_eq!(via_pairs.where_, via_calls.where_);
    }

    #[test]
    fn test_mixed_list_recursion() {
        let mut set = ClauseSet::default();
        set.push_where(WhereInput::List(vec![
            WhereInput::from("AND `f1`=\"xxx\""),
            WhereInput::from("OR 1=1"),
            WhereInput::from(vec![("OR abc >=", "131")]),
        ]));

        assert_eq!(
            set.where_,
            vec![
                WhereEntry::Raw("AND `f1`=\"xxx\"".to_string()),
                WhereEntry::Raw("OR 1=1".to_string()),
                cond("OR", "abc", ">=", Value::Text("131".to_string())),
            ]
        );
    }

    #[test]
    fn test_empty_key_latches_error() {
        let mut set = ClauseSet::default();
        set.push_where_cond("  ", Value::Int(1));
        assert!(set.check().is_err());
        assert!(set.where_.is_empty());
    }

    #[test]
    fn test_order_parse_comma_list() {
        let mut set = ClauseSet::default();
        set.push_order("a DESC, b");
        assert_eq!(
            set.orderby.get_index(0),
            Some((&"a".to_string(), &Some("DESC".to_string())))
        );
        assert_eq!(set.orderby.get_index(1), Some((&"b".to_string(), &None)));
    }

    #[test]
    fn test_order_last_write_wins_in_place() {
        let mut set = ClauseSet::default();
        set.push_order("a ASC");
        set.push_order("b DESC");
        set.push_order("a DESC");
        assert_eq!(
            set.orderby.get_index(0),
            Some((&"a".to_string(), &Some("DESC".to_string())))
        );
        assert_eq!(set.orderby.len(), 2);
    }

    #[test]
    fn test_set_mixed_list_recursion() {
        let mut set = ClauseSet::default();
        set.push_set(SetInput::List(vec![
            SetInput::from("hits=hits+1"),
            SetInput::from(vec![("name", "Bob")]),
        ]));

        assert_eq!(
            set.set,
            vec![
                SetEntry::Raw("hits=hits+1".to_string()),
                SetEntry::Assign {
                    field: "name".to_string(),
                    value: Value::Text("Bob".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_set_pairs_keep_keys_verbatim() {
        let mut set = ClauseSet::default();
        set.push_set(SetInput::from(vec![("count >", 1)]));
        assert_eq!(
            set.set,
            vec![SetEntry::Assign {
                field: "count >".to_string(),
                value: Value::Int(1),
            }]
        );
    }
}
