//! Relational-store gateway: schema setup and CRUD on the `produtos` table.
//!
//! Every user-supplied value goes through `bind`. The only identifier spliced
//! into SQL is the database name, which comes from configuration and is
//! validated there (see `config::is_valid_database_name`).

use crate::{
    config::MySqlSettings,
    errors::{GatewayError, GatewayResult},
    models::product::{NewProduct, Product},
};
use async_trait::async_trait;
use sqlx::{
    MySqlPool,
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
};
use tracing::{debug, info};

pub const PRODUCT_NOT_FOUND: &str = "Produto não encontrado";

/// Operations the HTTP layer may run against stored products.
#[async_trait]
pub trait ProductGateway: Send + Sync {
    async fn ping(&self) -> GatewayResult<()>;
    /// Create the database and table if absent. Safe to repeat.
    async fn init_schema(&self) -> GatewayResult<()>;
    async fn create(&self, product: NewProduct) -> GatewayResult<u64>;
    async fn list(&self) -> GatewayResult<Vec<Product>>;
    async fn get(&self, id: u64) -> GatewayResult<Product>;
    async fn update(&self, id: u64, product: NewProduct) -> GatewayResult<()>;
    async fn delete(&self, id: u64) -> GatewayResult<()>;
}

/// MySQL-backed products over a bounded connection pool.
#[derive(Clone)]
pub struct MySqlProductGateway {
    /// Shared pool; callers beyond `max_connections` wait for a free slot.
    pool: MySqlPool,
    database: String,
}

impl MySqlProductGateway {
    /// Build a lazily-connecting pool.
    ///
    /// The pool is not bound to a default schema so that `init_schema` can
    /// create the database it lives in. Queries qualify the table instead.
    pub fn connect_lazy(settings: &MySqlSettings) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.user)
            .password(&settings.password);
        let pool = MySqlPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_lazy_with(options);
        Self::new(pool, settings.database.clone())
    }

    pub fn new(pool: MySqlPool, database: String) -> Self {
        Self { pool, database }
    }

    fn table(&self) -> String {
        qualified_table(&self.database)
    }

    async fn exists(&self, id: u64) -> GatewayResult<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?", self.table());
        let row: Option<i64> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| GatewayError::store("Erro ao atualizar produto", err))?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl ProductGateway for MySqlProductGateway {
    async fn ping(&self) -> GatewayResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|err| GatewayError::store("Falha ao conectar ao MySQL", err))?;
        Ok(())
    }

    async fn init_schema(&self) -> GatewayResult<()> {
        for stmt in schema_statements(&self.database) {
            debug!("Executing schema SQL: {}", stmt);
            sqlx::query(&stmt)
                .execute(&self.pool)
                .await
                .map_err(|err| GatewayError::store("Erro ao inicializar o banco de dados", err))?;
        }
        info!(database = %self.database, "product schema ready");
        Ok(())
    }

    async fn create(&self, product: NewProduct) -> GatewayResult<u64> {
        let sql = format!(
            "INSERT INTO {} (Nome, Descricao, Preco) VALUES (?, ?, ?)",
            self.table()
        );
        let result = sqlx::query(&sql)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .execute(&self.pool)
            .await
            .map_err(|err| GatewayError::store("Erro ao criar produto", err))?;
        Ok(result.last_insert_id())
    }

    async fn list(&self) -> GatewayResult<Vec<Product>> {
        let sql = format!(
            "SELECT id, Nome, Descricao, Preco FROM {} ORDER BY id",
            self.table()
        );
        sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| GatewayError::store("Erro ao buscar produtos", err))
    }

    async fn get(&self, id: u64) -> GatewayResult<Product> {
        let sql = format!(
            "SELECT id, Nome, Descricao, Preco FROM {} WHERE id = ?",
            self.table()
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| GatewayError::store("Erro ao buscar produto", err))?
            .ok_or_else(|| GatewayError::not_found(PRODUCT_NOT_FOUND))
    }

    async fn update(&self, id: u64, product: NewProduct) -> GatewayResult<()> {
        let sql = format!(
            "UPDATE {} SET Nome = ?, Descricao = ?, Preco = ? WHERE id = ?",
            self.table()
        );
        let result = sqlx::query(&sql)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| GatewayError::store("Erro ao atualizar produto", err))?;
        confirm_update(result.rows_affected(), || self.exists(id)).await
    }

    async fn delete(&self, id: u64) -> GatewayResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?", self.table());
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| GatewayError::store("Erro ao deletar produto", err))?;
        if result.rows_affected() == 0 {
            return Err(GatewayError::not_found(PRODUCT_NOT_FOUND));
        }
        Ok(())
    }
}

/// Outcome of an `UPDATE` given its affected-row count.
///
/// MySQL counts changed rows, so an identical update also reports zero.
/// `exists` is only consulted in that case.
async fn confirm_update<F, Fut>(rows_affected: u64, exists: F) -> GatewayResult<()>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = GatewayResult<bool>>,
{
    if rows_affected == 0 && !exists().await? {
        return Err(GatewayError::not_found(PRODUCT_NOT_FOUND));
    }
    Ok(())
}

/// `` `db`.`produtos` `` for a database name already validated by config.
fn qualified_table(database: &str) -> String {
    format!("`{}`.`produtos`", database)
}

/// DDL run by `init_schema`, in order.
fn schema_statements(database: &str) -> [String; 2] {
    [
        format!("CREATE DATABASE IF NOT EXISTS `{}`", database),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
                Nome VARCHAR(255) NOT NULL,
                Descricao TEXT NOT NULL,
                Preco DECIMAL(10, 2) NOT NULL
            )",
            qualified_table(database)
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use std::{
        io,
        sync::atomic::{AtomicUsize, Ordering},
    };

    #[test]
    fn table_is_qualified_and_quoted() {
        assert_eq!(qualified_table("loja"), "`loja`.`produtos`");
    }

    #[test]
    fn schema_statements_are_idempotent_ddl() {
        let [create_db, create_table] = schema_statements("loja");
        assert_eq!(create_db, "CREATE DATABASE IF NOT EXISTS `loja`");
        assert!(create_table.starts_with("CREATE TABLE IF NOT EXISTS `loja`.`produtos`"));
        assert!(create_table.contains("AUTO_INCREMENT"));
        assert!(create_table.contains("Descricao TEXT NOT NULL"));
        assert!(create_table.contains("Preco DECIMAL(10, 2)"));
    }

    #[tokio::test]
    async fn changed_rows_skip_the_existence_check() {
        let lookups = AtomicUsize::new(0);
        let outcome = confirm_update(1, || async {
            lookups.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        })
        .await;
        assert!(outcome.is_ok());
        assert_eq!(lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unchanged_existing_row_is_a_successful_update() {
        let lookups = AtomicUsize::new(0);
        let outcome = confirm_update(0, || async {
            lookups.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        })
        .await;
        assert!(outcome.is_ok());
        assert_eq!(lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_rows_and_no_row_is_not_found() {
        let err = confirm_update(0, || async { Ok(false) }).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.public_message(), PRODUCT_NOT_FOUND);
    }

    #[tokio::test]
    async fn failed_existence_check_is_a_store_fault() {
        let err = confirm_update(0, || async {
            Err(GatewayError::store(
                "Erro ao atualizar produto",
                io::Error::other("connection reset"),
            ))
        })
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreFault);
    }
}
