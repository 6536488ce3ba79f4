//! Multi-row INSERT shared by every seeder.
//!
//! Values travel as text and are cast in SQL, so one binding loop covers
//! uuid, enum, date and numeric columns alike.

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

const BATCH_SIZE: usize = 500;

pub type Row = Vec<Option<String>>;

/// A column name and the SQL type its text value is cast to.
pub type Column = (&'static str, &'static str);

/// Builds `INSERT INTO table (..) VALUES ($1::t, ..), (..) RETURNING id`.
pub fn insert_statement(table: &str, columns: &[Column], row_count: usize) -> String {
    let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
    let mut query = format!("INSERT INTO {table} ({}) VALUES ", names.join(", "));

    for row in 0..row_count {
        if row > 0 {
            query.push_str(", ");
        }
        query.push('(');
        for (i, (_, cast)) in columns.iter().enumerate() {
            if i > 0 {
                query.push_str(", ");
            }
            query.push_str(&format!("${}::{cast}", row * columns.len() + i + 1));
        }
        query.push(')');
    }

    query.push_str(" RETURNING id");
    query
}

/// Inserts `rows` in chunks and returns their ids in insertion order.
pub async fn insert_rows(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    columns: &[Column],
    rows: &[Row],
) -> Result<Vec<Uuid>, sqlx::Error> {
    let mut ids = Vec::with_capacity(rows.len());

    for chunk in rows.chunks(BATCH_SIZE) {
        let query = insert_statement(table, columns, chunk.len());
        let mut q = sqlx::query_scalar::<_, Uuid>(&query);
        for row in chunk {
            for value in row {
                q = q.bind(value.as_deref());
            }
        }
        ids.extend(q.fetch_all(&mut **tx).await?);
    }

    Ok(ids)
}

pub fn text(value: impl ToString) -> Option<String> {
    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_numbered_across_rows() {
        let sql = insert_statement("formations", &[("code", "text"), ("level", "study_level")], 2);
        assert_eq!(
            sql,
            "INSERT INTO formations (code, level) VALUES \
             ($1::text, $2::study_level), ($3::text, $4::study_level) RETURNING id"
        );
    }
}
