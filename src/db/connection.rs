use anyhow::Result;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use super::{ACTIVE_BOOK_HEADERS, QueryResult};

/// Connection to the BuyPy MySQL schema. Statements check a connection out of
/// the pool right before running and hand it back when done, so every exit
/// path releases the connection.
pub struct BackofficeDb {
    pool: sqlx::MySqlPool,
}

impl BackofficeDb {
    pub async fn connect(connection_string: &str) -> Result<Self> {
        if !connection_string.starts_with("mysql://") {
            return Err(anyhow::anyhow!(
                "BuyPy runs on MySQL; the connection string must start with mysql://"
            ));
        }
        let pool = sqlx::MySqlPool::connect(connection_string).await?;
        Ok(Self { pool })
    }

    /// Rows of the active-books view, relabeled with the fixed display headers.
    pub async fn active_books(&self) -> Result<QueryResult> {
        let result = self.fetch_rows("SELECT * FROM vw_livros_ativos").await?;
        Ok(with_active_book_headers(result))
    }

    /// Sets a product's stock quantity through the stored procedure. The
    /// procedure owns the transaction; on failure the raw driver error
    /// propagates and the database stays wherever the procedure left it.
    pub async fn update_quantity(&self, product_id: i32, quantity: i32) -> Result<()> {
        sqlx::query("CALL sp_atualizar_quantidade(?, ?)")
            .bind(product_id)
            .bind(quantity)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Evaluates the server-side VAT function. Both arguments are bound as
    /// the text the user typed; the return value is displayed unmodified.
    pub async fn price_with_vat(&self, price: &str, vat_rate: &str) -> Result<String> {
        let row = sqlx::query("SELECT fn_preco_com_iva(?, ?)")
            .bind(price)
            .bind(vat_rate)
            .fetch_one(&self.pool)
            .await?;
        Ok(decode_mysql_value(&row, 0).unwrap_or_else(|| "NULL".to_string()))
    }

    /// Full dump of one base table: column names plus every row. Used by the
    /// CSV export, one call per table in the fixed export list.
    pub async fn dump_table(&self, table: &str) -> Result<QueryResult> {
        let result = self.fetch_rows(&format!("SELECT * FROM `{table}`")).await?;
        if !result.is_empty() {
            return Ok(result);
        }

        // An empty result carries no column metadata, but the CSV still needs
        // its header row. This also surfaces an error for missing tables.
        let columns = self.table_columns(table).await?;
        if columns.is_empty() {
            return Err(anyhow::anyhow!("table {table} does not exist"));
        }
        Ok(QueryResult {
            columns,
            rows: vec![],
        })
    }

    async fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_schema = DATABASE() AND table_name = ? \
             ORDER BY ordinal_position",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    async fn fetch_rows(&self, query: &str) -> Result<QueryResult> {
        let rows = sqlx::query(query).fetch_all(&self.pool).await?;
        if rows.is_empty() {
            return Ok(QueryResult::empty());
        }

        let columns: Vec<String> = rows[0]
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let data: Vec<Vec<Option<String>>> = rows
            .iter()
            .map(|row| {
                (0..columns.len())
                    .map(|idx| decode_mysql_value(row, idx))
                    .collect()
            })
            .collect();

        Ok(QueryResult {
            columns,
            rows: data,
        })
    }
}

/// Applies the fixed display headers to the view's rows. An empty view still
/// renders the header row; a projection with a different column count keeps
/// its real names.
fn with_active_book_headers(mut result: QueryResult) -> QueryResult {
    if result.is_empty() || result.columns.len() == ACTIVE_BOOK_HEADERS.len() {
        result.columns = ACTIVE_BOOK_HEADERS.iter().map(|h| h.to_string()).collect();
    }
    result
}

/// Renders one cell to text by its MySQL column type. SQL NULL comes back as
/// `None`; anything the typed paths miss falls through to a best-effort chain.
fn decode_mysql_value(row: &sqlx::mysql::MySqlRow, idx: usize) -> Option<String> {
    if let Ok(vr) = row.try_get_raw(idx) {
        if vr.is_null() {
            return None;
        }

        let type_info = vr.type_info().clone();
        match type_info.name() {
            "BOOLEAN" | "TINYINT(1)" => {
                if let Ok(v) = row.try_get::<bool, _>(idx) {
                    return Some(v.to_string());
                }
            }
            "TINYINT" => {
                if let Ok(v) = row.try_get::<i8, _>(idx) {
                    return Some(v.to_string());
                }
            }
            "SMALLINT" => {
                if let Ok(v) = row.try_get::<i16, _>(idx) {
                    return Some(v.to_string());
                }
            }
            "INT" | "MEDIUMINT" => {
                if let Ok(v) = row.try_get::<i32, _>(idx) {
                    return Some(v.to_string());
                }
            }
            "BIGINT" => {
                if let Ok(v) = row.try_get::<i64, _>(idx) {
                    return Some(v.to_string());
                }
            }
            "FLOAT" => {
                if let Ok(v) = row.try_get::<f32, _>(idx) {
                    return Some(v.to_string());
                }
            }
            "DOUBLE" => {
                if let Ok(v) = row.try_get::<f64, _>(idx) {
                    return Some(v.to_string());
                }
            }
            "DECIMAL" => {
                if let Ok(v) = row.try_get::<sqlx::types::BigDecimal, _>(idx) {
                    return Some(v.to_string());
                }
            }
            "VARCHAR" | "CHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM"
            | "SET" => {
                if let Ok(v) = row.try_get::<String, _>(idx) {
                    return Some(v);
                }
            }
            "DATE" => {
                if let Ok(v) = row.try_get::<sqlx::types::chrono::NaiveDate, _>(idx) {
                    return Some(v.to_string());
                }
            }
            "TIME" => {
                if let Ok(v) = row.try_get::<sqlx::types::chrono::NaiveTime, _>(idx) {
                    return Some(v.to_string());
                }
            }
            "DATETIME" | "TIMESTAMP" => {
                if let Ok(v) = row.try_get::<sqlx::types::chrono::NaiveDateTime, _>(idx) {
                    return Some(v.to_string());
                }
            }
            "JSON" => {
                if let Ok(v) = row.try_get::<sqlx::types::JsonValue, _>(idx) {
                    return Some(v.to_string());
                }
            }
            "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => {
                if let Ok(v) = row.try_get::<Vec<u8>, _>(idx) {
                    return Some(format!("0x{}", hex::encode(v)));
                }
            }
            _ => {}
        }
    }

    row.try_get::<String, _>(idx)
        .or_else(|_| row.try_get::<i64, _>(idx).map(|v| v.to_string()))
        .or_else(|_| row.try_get::<i32, _>(idx).map(|v| v.to_string()))
        .or_else(|_| row.try_get::<f64, _>(idx).map(|v| v.to_string()))
        .or_else(|_| row.try_get::<bool, _>(idx).map(|v| v.to_string()))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(columns: &[&str]) -> QueryResult {
        QueryResult {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: vec![vec![None; columns.len()]],
        }
    }

    #[test]
    fn empty_view_still_gets_the_display_headers() {
        let relabeled = with_active_book_headers(QueryResult::empty());
        assert_eq!(relabeled.columns, ACTIVE_BOOK_HEADERS);
        assert!(relabeled.rows.is_empty());
    }

    #[test]
    fn four_column_projection_is_relabeled() {
        let relabeled = with_active_book_headers(result(&["t", "p", "q", "pop"]));
        assert_eq!(relabeled.columns, ACTIVE_BOOK_HEADERS);
        assert_eq!(relabeled.rows.len(), 1);
    }

    #[test]
    fn unexpected_projection_keeps_its_real_names() {
        let relabeled = with_active_book_headers(result(&["titulo", "preco"]));
        assert_eq!(relabeled.columns, vec!["titulo", "preco"]);
    }
}
