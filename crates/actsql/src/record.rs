//! The chainable builder: clause definition, statement assembly, and the
//! execution lifecycle.

use tracing::debug;

use crate::clause::{ClauseSet, SetInput, WhereInput};
use crate::driver::{Driver, QueryOutput};
use crate::error::{DbError, DbResult};
use crate::value::Value;

/// A chainable, Active Record-style statement builder bound to a driver.
///
/// Clause-definition methods mutate an owned clause store and return the
/// builder for chaining; terminal methods (`get`, `get_one`, `insert`,
/// `update`, `delete`) render the accumulated clauses, record the statement
/// for [`ActiveRecord::last_sql`], replace the store with a fresh one, and
/// only then dispatch to the driver. The reset happens before the driver
/// round-trip resolves, so the builder is immediately reusable and clause
/// state never leaks into the next statement, even on I/O failure.
///
/// A builder is a single logical thread of use and has no internal locking.
/// Callers needing concurrent statements should use separate builders over
/// the same underlying connection.
pub struct ActiveRecord<D> {
    db: D,
    last_sql: String,
    clause: ClauseSet,
}

impl<D: Driver> ActiveRecord<D> {
    /// Create a builder over a driver connection.
    pub fn new(db: D) -> Self {
        Self {
            db,
            last_sql: String::new(),
            clause: ClauseSet::default(),
        }
    }

    /// The most recently rendered statement, or `""` if none was rendered
    /// yet. Valid until the next terminal call overwrites it.
    pub fn last_sql(&self) -> &str {
        &self.last_sql
    }

    // ==================== Clause definition ====================

    /// Set the SELECT field list (raw string, e.g. `"id,name"` or `"*"`).
    /// Overwrites any previous value.
    pub fn select(&mut self, fields: &str) -> &mut Self {
        self.clause.select = fields.to_string();
        self
    }

    /// Set the target table expression (raw string, may carry aliases such
    /// as `"users u, orders o"`). Overwrites any previous value.
    pub fn from(&mut self, table: &str) -> &mut Self {
        self.clause.table = table.to_string();
        self
    }

    /// Add a structured where condition.
    ///
    /// `key` follows the key-descriptor grammar: `"age"`, `"age >"`,
    /// `"OR age"`, `"OR age >="`. Relate defaults to `AND`, operator to
    /// `=`. The value is escaped by the driver at render time.
    pub fn where_cond(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.clause.push_where_cond(key, value.into());
        self
    }

    /// Add a pre-formatted where fragment, stored verbatim.
    ///
    /// No escaping is applied; the caller owns injection-safety.
    pub fn where_raw(&mut self, fragment: &str) -> &mut Self {
        self.clause.push_where(WhereInput::Raw(fragment.to_string()));
        self
    }

    /// Add where conditions from a mixed list or ordered field/value pairs,
    /// normalized recursively in insertion order.
    pub fn where_many(&mut self, input: impl Into<WhereInput>) -> &mut Self {
        self.clause.push_where(input.into());
        self
    }

    /// Add a join with the default `LEFT` relation, rendered as
    /// `LEFT <table> ON(<on>)`.
    pub fn join(&mut self, table: &str, on: &str) -> &mut Self {
        self.clause.push_join("LEFT", table, on);
        self
    }

    /// Add a join with an explicit relation keyword (`LEFT`, `RIGHT`,
    /// `INNER`, ...).
    pub fn join_as(&mut self, relate: &str, table: &str, on: &str) -> &mut Self {
        self.clause.push_join(relate, table, on);
        self
    }

    /// Add a pre-formatted join fragment, stored verbatim.
    pub fn join_raw(&mut self, fragment: &str) -> &mut Self {
        self.clause.push_join_raw(fragment);
        self
    }

    /// Add a set assignment; the field name is taken verbatim, the value is
    /// escaped by the driver at render time. Used by INSERT and UPDATE.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.clause.push_set_assign(field, value.into());
        self
    }

    /// Add a raw assignment fragment such as `"hits=hits+1"`, stored
    /// verbatim.
    pub fn set_raw(&mut self, fragment: &str) -> &mut Self {
        self.clause.push_set(SetInput::Raw(fragment.to_string()));
        self
    }

    /// Add set assignments from a mixed list or ordered field/value pairs.
    pub fn set_many(&mut self, input: impl Into<SetInput>) -> &mut Self {
        self.clause.push_set(input.into());
        self
    }

    /// Add order-by fields from a comma-separated `field [direction]` list
    /// (e.g. `"id DESC, name"`). Last write for a field wins; insertion
    /// order is the render order.
    pub fn order_by(&mut self, spec: &str) -> &mut Self {
        self.clause.push_order(spec);
        self
    }

    /// Add `field ASC` to the order-by mapping.
    pub fn order_by_asc(&mut self, field: &str) -> &mut Self {
        self.order_by(&format!("{field} ASC"))
    }

    /// Add `field DESC` to the order-by mapping.
    pub fn order_by_desc(&mut self, field: &str) -> &mut Self {
        self.order_by(&format!("{field} DESC"))
    }

    /// Set the limit to `num` rows from offset 0. Overwrites any previous
    /// limit.
    pub fn limit(&mut self, num: u64) -> &mut Self {
        self.limit_offset(0, num)
    }

    /// Set the limit to `num` rows starting at `offset`.
    pub fn limit_offset(&mut self, offset: u64, num: u64) -> &mut Self {
        self.clause.set_limit(offset, num);
        self
    }

    /// Pagination form of [`ActiveRecord::limit_offset`].
    ///
    /// `page` is 1-based and clamped to `>= 1`; `per_page < 1` falls back
    /// to 20.
    pub fn paginate(&mut self, page: i64, per_page: i64) -> &mut Self {
        let page = page.max(1) as u64;
        let per_page = if per_page < 1 { 20 } else { per_page as u64 };
        self.limit_offset((page - 1) * per_page, per_page)
    }

    // ==================== Statement assembly ====================

    fn push_tail(&self, sql: &mut String, clause: &ClauseSet) {
        let esc = |value: &Value| self.db.escape(value);

        let where_sql = clause.where_sql(&esc);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        let order_sql = clause.order_sql();
        if !order_sql.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order_sql);
        }

        let limit_sql = clause.limit_sql();
        if !limit_sql.is_empty() {
            sql.push_str(" LIMIT ");
            sql.push_str(&limit_sql);
        }
    }

    fn build_select(&self, clause: &ClauseSet) -> String {
        let mut sql = format!("SELECT {} FROM {}", clause.select_sql(), clause.table);

        let join_sql = clause.join_sql();
        if !join_sql.is_empty() {
            sql.push(' ');
            sql.push_str(&join_sql);
        }

        self.push_tail(&mut sql, clause);
        sql
    }

    fn build_insert(&self, table: &str, clause: &ClauseSet) -> String {
        let esc = |value: &Value| self.db.escape(value);
        format!("INSERT INTO {} SET {}", table, clause.set_sql(&esc))
    }

    fn build_update(&self, clause: &ClauseSet) -> String {
        let esc = |value: &Value| self.db.escape(value);
        let mut sql = format!("UPDATE {}", clause.table);

        let join_sql = clause.join_sql();
        if !join_sql.is_empty() {
            sql.push(' ');
            sql.push_str(&join_sql);
        }

        sql.push_str(" SET ");
        sql.push_str(&clause.set_sql(&esc));

        self.push_tail(&mut sql, clause);
        sql
    }

    fn build_delete(&self, clause: &ClauseSet) -> String {
        let mut sql = format!("DELETE FROM {}", clause.table);
        self.push_tail(&mut sql, clause);
        sql
    }

    // ==================== Execution lifecycle ====================

    /// Take the accumulated clauses and install a fresh store, so the next
    /// statement starts clean regardless of how this one ends.
    fn take_clauses(&mut self) -> DbResult<ClauseSet> {
        let clause = std::mem::take(&mut self.clause);
        clause.check()?;
        Ok(clause)
    }

    /// Record the rendered statement and submit it to the driver.
    async fn dispatch(&mut self, sql: String) -> DbResult<QueryOutput<D::Row>> {
        debug!(sql = %sql, "dispatching statement");
        self.last_sql = sql;
        self.db.query(&self.last_sql).await
    }

    /// Execute a SELECT over the accumulated clauses and return the row
    /// sequence (empty, never null, when the driver returns no rows).
    pub async fn get(&mut self) -> DbResult<Vec<D::Row>> {
        let clause = self.take_clauses()?;
        let sql = self.build_select(&clause);
        Ok(self.dispatch(sql).await?.into_rows())
    }

    /// [`ActiveRecord::get`] with the table set first.
    pub async fn get_from(&mut self, table: &str) -> DbResult<Vec<D::Row>> {
        self.from(table);
        self.get().await
    }

    /// Execute a SELECT forced to `LIMIT 0, 1` and return the first row, or
    /// `None` for an empty result (never an error).
    pub async fn get_one(&mut self) -> DbResult<Option<D::Row>> {
        self.limit(1);
        let mut rows = self.get().await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }

    /// [`ActiveRecord::get_one`] with the table set first.
    pub async fn get_one_from(&mut self, table: &str) -> DbResult<Option<D::Row>> {
        self.from(table);
        self.get_one().await
    }

    /// Execute an INSERT of the accumulated set assignments and return the
    /// driver-generated row identifier.
    ///
    /// The table is mandatory; an empty table name fails with
    /// [`DbError::InvalidArgument`] before any driver interaction.
    pub async fn insert(&mut self, table: &str) -> DbResult<u64> {
        let clause = self.take_clauses()?;
        if table.trim().is_empty() {
            return Err(DbError::invalid_argument("insert requires a table name"));
        }
        let sql = self.build_insert(table, &clause);
        Ok(self.dispatch(sql).await?.into_write().insert_id)
    }

    /// [`ActiveRecord::insert`] with `data` merged into the set assignments
    /// first.
    pub async fn insert_values(
        &mut self,
        table: &str,
        data: impl Into<SetInput>,
    ) -> DbResult<u64> {
        self.set_many(data);
        self.insert(table).await
    }

    /// Execute an UPDATE over the accumulated clauses and return the count
    /// of rows the driver reports as changed.
    pub async fn update(&mut self) -> DbResult<u64> {
        let clause = self.take_clauses()?;
        let sql = self.build_update(&clause);
        Ok(self.dispatch(sql).await?.into_write().changed_rows)
    }

    /// [`ActiveRecord::update`] with table, set data, and where conditions
    /// applied first.
    pub async fn update_values(
        &mut self,
        table: &str,
        data: impl Into<SetInput>,
        cond: impl Into<WhereInput>,
    ) -> DbResult<u64> {
        self.from(table);
        self.set_many(data);
        self.where_many(cond);
        self.update().await
    }

    /// Execute a DELETE over the accumulated clauses and return the count
    /// of rows the driver reports as affected.
    pub async fn delete(&mut self) -> DbResult<u64> {
        let clause = self.take_clauses()?;
        let sql = self.build_delete(&clause);
        Ok(self.dispatch(sql).await?.into_write().affected_rows)
    }

    /// [`ActiveRecord::delete`] with table and where conditions applied
    /// first.
    pub async fn delete_where(
        &mut self,
        table: &str,
        cond: impl Into<WhereInput>,
    ) -> DbResult<u64> {
        self.from(table);
        self.where_many(cond);
        self.delete().await
    }
}
