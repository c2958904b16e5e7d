//! Filtered, ordered, paginated selects shared by every listing.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Row};

use super::page::{Page, PageWindow};
use super::{Database, DbError, DbResult};

/// `WHERE` clauses joined with `AND`, with their bound values.
#[derive(Debug, Default)]
pub(crate) struct Conditions {
    clauses: Vec<String>,
    params: Vec<Value>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `column = ?` when a value is given.
    pub fn equals(&mut self, column: &str, value: Option<Value>) -> &mut Self {
        if let Some(value) = value {
            self.clauses.push(format!("{} = ?", column));
            self.params.push(value);
        }
        self
    }

    /// Case-insensitive substring match on any of `columns`.
    pub fn search(&mut self, columns: &[&str], term: Option<&str>) -> &mut Self {
        let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) else {
            return self;
        };

        let pattern = format!("%{}%", escape_like(term));
        let any: Vec<String> = columns
            .iter()
            .map(|c| format!("{} LIKE ? ESCAPE '\\'", c))
            .collect();
        self.clauses.push(format!("({})", any.join(" OR ")));
        for _ in columns {
            self.params.push(Value::Text(pattern.clone()));
        }
        self
    }

    fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// A listing: select-with-joins prefix, the table the count runs against,
/// and the ordering.
pub(crate) struct ListQuery<'a> {
    /// `SELECT ... FROM ... JOIN ...`
    pub select: String,
    /// `FROM ... JOIN ...` used for counting; must bind the same aliases
    pub count_from: &'a str,
    pub order_by: &'a str,
    pub conditions: Conditions,
}

impl Database {
    /// Run a listing and return the requested page. The count and the rows
    /// come from one read snapshot.
    pub(crate) fn fetch_page<R, T>(
        &self,
        query: &ListQuery<'_>,
        page: u32,
        read: fn(&Row<'_>) -> rusqlite::Result<R>,
    ) -> DbResult<Page<T>>
    where
        R: TryInto<T, Error = DbError>,
    {
        let tx = self.conn.unchecked_transaction()?;
        let where_sql = query.conditions.where_sql();

        let count_sql = format!("SELECT COUNT(*) FROM {}{}", query.count_from, where_sql);
        let total: i64 = self.conn.query_row(
            &count_sql,
            params_from_iter(query.conditions.params.iter()),
            |row| row.get(0),
        )?;
        let window = PageWindow::new(page, total.max(0) as u64)?;

        let sql = format!(
            "{}{} ORDER BY {} LIMIT {} OFFSET {}",
            query.select,
            where_sql,
            query.order_by,
            window.limit(),
            window.offset()
        );
        let items = {
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(query.conditions.params.iter()), read)?;

            let mut items: Vec<T> = Vec::new();
            for row in rows {
                let item: T = row?.try_into()?;
                items.push(item);
            }
            items
        };
        tx.finish()?;

        Ok(window.into_page(items))
    }

    /// Run an unpaginated select returning at most `limit` rows.
    pub(crate) fn fetch_limited<R, T>(
        &self,
        select: &str,
        order_by: &str,
        limit: usize,
        read: fn(&Row<'_>) -> rusqlite::Result<R>,
    ) -> DbResult<Vec<T>>
    where
        R: TryInto<T, Error = DbError>,
    {
        let sql = format!("{} ORDER BY {} LIMIT ?", select, order_by);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([limit as i64], read)?;

        let mut items: Vec<T> = Vec::new();
        for row in rows {
            let item: T = row?.try_into()?;
            items.push(item);
        }
        Ok(items)
    }
}
