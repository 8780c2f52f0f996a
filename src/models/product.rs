//! Product rows in the relational store.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `produtos` table. Column and JSON names match.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct Product {
    pub id: u64,

    #[serde(rename = "Nome")]
    #[sqlx(rename = "Nome")]
    pub name: String,

    #[serde(rename = "Descricao")]
    #[sqlx(rename = "Descricao")]
    pub description: String,

    /// Stored as DECIMAL(10,2), rendered as a JSON number.
    #[serde(rename = "Preco")]
    #[sqlx(rename = "Preco")]
    pub price: Decimal,
}

/// Body of `POST /produtos` and `PUT /produtos/{id}`.
#[derive(Deserialize, Clone, Debug)]
pub struct NewProduct {
    #[serde(rename = "Nome")]
    pub name: String,
    #[serde(rename = "Descricao")]
    pub description: String,
    #[serde(rename = "Preco")]
    pub price: Decimal,
}

/// Response of `POST /produtos`.
#[derive(Serialize, Debug)]
pub struct CreatedProduct {
    pub id: u64,
}
