//! # actsql
//!
//! A chainable, Active Record-style SQL statement builder for MySQL-flavored
//! drivers.
//!
//! ## Features
//!
//! - **Chainable clauses**: `select` / `from` / `where_*` / `join*` / `set*` /
//!   `order_by*` / `limit*` accumulate into one clause store and return the
//!   builder for further chaining
//! - **Shape-polymorphic input**: raw fragments, field/value pairs, and mixed
//!   lists all normalize into the same stored clause forms
//! - **Driver-owned escaping**: the connection collaborator renders scalar
//!   values as SQL literals; raw fragments pass through verbatim
//! - **Statement lifecycle**: every terminal call renders, records the SQL
//!   for introspection, resets the store, and only then dispatches — the
//!   builder is immediately reusable even while a round-trip is in flight
//!
//! ## Usage
//!
//! ```ignore
//! use actsql::ActiveRecord;
//!
//! let mut ar = ActiveRecord::new(db);
//!
//! // SELECT
//! let rows = ar
//!     .select("id,name")
//!     .from("users")
//!     .where_cond("age >", 18)
//!     .order_by_desc("id")
//!     .limit(10)
//!     .get()
//!     .await?;
//!
//! // INSERT
//! let id = ar.insert_values("users", [("name", "alice")]).await?;
//!
//! // UPDATE
//! let changed = ar
//!     .update_values("users", [("status", "inactive")], [("id", 1)])
//!     .await?;
//!
//! // DELETE
//! let affected = ar.delete_where("users", [("id", 1)]).await?;
//! ```

mod clause;
mod render;

pub mod driver;
pub mod error;
pub mod record;
pub mod value;

pub use clause::{SetInput, WhereInput};
pub use driver::{Driver, QueryOutput, WriteResult, escape_literal};
pub use error::{DbError, DbResult};
pub use record::ActiveRecord;
pub use value::Value;
