//! SQLite catalog store.
//!
//! A `products` table plus `product_text`, which holds every text field
//! lower-cased in Rust. SQLite's `LOWER()` folds ASCII only, so substring
//! predicates match against the folded copies. Predicates are rendered
//! through `sqlx::QueryBuilder` with bound parameters only; column names come
//! from the closed [`Field`] set, never from input.

use async_trait::async_trait;
use luxroute_core::catalog::{
    CatalogItem, CatalogQuery, CatalogStore, CategoryCount, Field, OrderBy, Predicate, Value,
};
use luxroute_core::error::CatalogError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// A catalog backed by a SQLite database file.
pub struct SqliteCatalog {
    pool: SqlitePool,
}

fn column(field: Field) -> &'static str {
    match field {
        Field::Name => "name",
        Field::ItemNumber => "item_number",
        Field::ShortDescription => "short_description",
        Field::LongDescription => "long_description",
        Field::Category1 => "category_1",
        Field::Category2 => "category_2",
        Field::GroupName => "group_name",
        Field::HousingColor => "housing_color",
        Field::IngressProtection => "ingress_protection",
        Field::Cct => "cct",
        Field::CctSwitch => "cct_switch",
        Field::Sdcm => "sdcm",
        Field::Cri => "cri",
        Field::Lumen => "lumen",
        Field::Wattage => "wattage",
        Field::Price => "price",
        Field::OperatingMode => "operating_mode",
        Field::Available => "available",
    }
}

const TEXT_FIELDS: [Field; 11] = [
    Field::Name,
    Field::ItemNumber,
    Field::ShortDescription,
    Field::LongDescription,
    Field::Category1,
    Field::Category2,
    Field::GroupName,
    Field::HousingColor,
    Field::IngressProtection,
    Field::CctSwitch,
    Field::OperatingMode,
];

/// `%needle%` with LIKE wildcards escaped.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_value(builder: &mut QueryBuilder<'_, Sqlite>, value: &Value) {
    match value {
        Value::Bool(b) => builder.push_bind(*b),
        Value::Number(n) => builder.push_bind(*n),
        Value::Text(t) => builder.push_bind(t.clone()),
    };
}

fn push_value_list(builder: &mut QueryBuilder<'_, Sqlite>, values: &[Value]) {
    builder.push("(");
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        push_value(builder, value);
    }
    builder.push(")");
}

fn push_predicate(builder: &mut QueryBuilder<'_, Sqlite>, predicate: &Predicate) {
    match predicate {
        Predicate::Eq { field, value } => {
            builder.push(column(*field)).push(" = ");
            push_value(builder, value);
        }
        Predicate::In { field, values } => {
            if values.is_empty() {
                builder.push("0");
            } else {
                builder.push(column(*field)).push(" IN ");
                push_value_list(builder, values);
            }
        }
        Predicate::NotIn { field, values } => {
            if values.is_empty() {
                builder.push("1");
            } else {
                let col = column(*field);
                builder.push(format!("({col} IS NULL OR {col} NOT IN "));
                push_value_list(builder, values);
                builder.push(")");
            }
        }
        Predicate::Gte { field, value } => {
            builder.push(column(*field)).push(" >= ").push_bind(*value);
        }
        Predicate::Lte { field, value } => {
            builder.push(column(*field)).push(" <= ").push_bind(*value);
        }
        Predicate::Contains { field, needle } => push_folded_match(builder, *field, needle),
        Predicate::NotContains { field, needle } => {
            builder.push("NOT ");
            push_folded_match(builder, *field, needle);
        }
        Predicate::IsNull { field } => {
            let col = column(*field);
            if field.is_text() {
                builder.push(format!("({col} IS NULL OR {col} = '')"));
            } else {
                builder.push(format!("{col} IS NULL"));
            }
        }
        Predicate::NotNull { field } => {
            let col = column(*field);
            if field.is_text() {
                builder.push(format!("({col} IS NOT NULL AND {col} <> '')"));
            } else {
                builder.push(format!("{col} IS NOT NULL"));
            }
        }
        Predicate::AnyOf { predicates } => {
            if predicates.is_empty() {
                builder.push("0");
                return;
            }
            builder.push("(");
            for (i, p) in predicates.iter().enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                push_predicate(builder, p);
            }
            builder.push(")");
        }
    }
}

/// `EXISTS` over the folded copy of `field`. A missing field has no copy.
fn push_folded_match(builder: &mut QueryBuilder<'_, Sqlite>, field: Field, needle: &str) {
    builder
        .push(format!(
            "EXISTS (SELECT 1 FROM product_text t WHERE t.product_id = products.id \
             AND t.field = '{}' AND t.folded LIKE ",
            column(field)
        ))
        .push_bind(like_pattern(needle))
        .push(" ESCAPE '\\')");
}

fn push_where(builder: &mut QueryBuilder<'_, Sqlite>, predicates: &[Predicate]) {
    builder.push(" WHERE 1 = 1");
    for predicate in predicates {
        builder.push(" AND ");
        push_predicate(builder, predicate);
    }
}

fn order_clause(order: Option<OrderBy>) -> &'static str {
    match order {
        Some(OrderBy::PriceAsc) => " ORDER BY price IS NULL, price ASC, id ASC",
        Some(OrderBy::NameAsc) => " ORDER BY name COLLATE NOCASE ASC, id ASC",
        Some(OrderBy::AvailabilityThenPrice) => {
            " ORDER BY available DESC, price IS NULL, price ASC, id ASC"
        }
        None => " ORDER BY id ASC",
    }
}

impl SqliteCatalog {
    /// Open (or create) a catalog database.
    ///
    /// Pass `"sqlite::memory:"` for an ephemeral database (useful for tests).
    pub async fn new(path: &str) -> Result<Self, CatalogError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| CatalogError::Unavailable(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| CatalogError::Unavailable(format!("Failed to open SQLite: {e}")))?;

        let catalog = Self { pool };
        catalog.run_migrations().await?;
        info!("SQLite catalog initialized at {path}");
        Ok(catalog)
    }

    /// Create from an existing pool.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, CatalogError> {
        let catalog = Self { pool };
        catalog.run_migrations().await?;
        Ok(catalog)
    }

    async fn run_migrations(&self) -> Result<(), CatalogError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id                 INTEGER PRIMARY KEY,
                name               TEXT NOT NULL,
                item_number        TEXT,
                short_description  TEXT,
                long_description   TEXT,
                category_1         TEXT,
                category_2         TEXT,
                group_name         TEXT,
                housing_color      TEXT,
                ingress_protection TEXT,
                cct                INTEGER,
                cct_switch         TEXT,
                sdcm               REAL,
                cri                REAL,
                lumen              REAL,
                wattage            REAL,
                price              REAL,
                operating_mode     TEXT,
                available          INTEGER NOT NULL DEFAULT 1
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| CatalogError::Migration(format!("products table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS product_text (
                product_id INTEGER NOT NULL,
                field      TEXT NOT NULL,
                folded     TEXT NOT NULL,
                PRIMARY KEY (product_id, field)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| CatalogError::Migration(format!("product_text table: {e}")))?;

        for (name, col) in [
            ("idx_products_category_2", "category_2"),
            ("idx_products_ip", "ingress_protection"),
            ("idx_products_price", "price"),
        ] {
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS {name} ON products({col})"
            ))
            .execute(&self.pool)
            .await
            .map_err(|e| CatalogError::Migration(format!("{name}: {e}")))?;
        }

        self.backfill_folds().await?;
        debug!("SQLite catalog migrations complete");
        Ok(())
    }

    /// Fill `product_text` for databases written before it existed.
    async fn backfill_folds(&self) -> Result<(), CatalogError> {
        let folded: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_text")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CatalogError::Migration(format!("product_text count: {e}")))?;
        if folded > 0 {
            return Ok(());
        }

        let rows = sqlx::query("SELECT * FROM products")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CatalogError::Migration(format!("product_text backfill: {e}")))?;
        if rows.is_empty() {
            return Ok(());
        }
        let items = rows
            .iter()
            .map(Self::row_to_item)
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CatalogError::Migration(format!("Begin backfill: {e}")))?;
        for item in &items {
            write_folds(&mut tx, item).await?;
        }
        tx.commit()
            .await
            .map_err(|e| CatalogError::Migration(format!("Commit backfill: {e}")))?;
        info!(items = items.len(), "Folded text backfilled");
        Ok(())
    }

    /// Insert or replace items by id. Returns the number written.
    pub async fn insert_items(&self, items: &[CatalogItem]) -> Result<usize, CatalogError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CatalogError::Unavailable(format!("Begin transaction: {e}")))?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO products (
                    id, name, item_number, short_description, long_description,
                    category_1, category_2, group_name, housing_color, ingress_protection,
                    cct, cct_switch, sdcm, cri, lumen, wattage, price, operating_mode, available
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    item_number = excluded.item_number,
                    short_description = excluded.short_description,
                    long_description = excluded.long_description,
                    category_1 = excluded.category_1,
                    category_2 = excluded.category_2,
                    group_name = excluded.group_name,
                    housing_color = excluded.housing_color,
                    ingress_protection = excluded.ingress_protection,
                    cct = excluded.cct,
                    cct_switch = excluded.cct_switch,
                    sdcm = excluded.sdcm,
                    cri = excluded.cri,
                    lumen = excluded.lumen,
                    wattage = excluded.wattage,
                    price = excluded.price,
                    operating_mode = excluded.operating_mode,
                    available = excluded.available
                "#,
            )
            .bind(item.id)
            .bind(&item.name)
            .bind(&item.item_number)
            .bind(&item.short_description)
            .bind(&item.long_description)
            .bind(&item.category_1)
            .bind(&item.category_2)
            .bind(&item.group_name)
            .bind(&item.housing_color)
            .bind(&item.ingress_protection)
            .bind(item.cct.map(i64::from))
            .bind(&item.cct_switch)
            .bind(item.sdcm)
            .bind(item.cri)
            .bind(item.lumen)
            .bind(item.wattage)
            .bind(item.price)
            .bind(&item.operating_mode)
            .bind(item.available)
            .execute(&mut *tx)
            .await
            .map_err(|e| CatalogError::QueryFailed(format!("INSERT product {}: {e}", item.id)))?;
            write_folds(&mut tx, item).await?;
        }

        tx.commit()
            .await
            .map_err(|e| CatalogError::QueryFailed(format!("Commit: {e}")))?;
        debug!(count = items.len(), "Catalog items written");
        Ok(items.len())
    }

    fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> Result<CatalogItem, CatalogError> {
        fn get<'r, T>(row: &'r sqlx::sqlite::SqliteRow, col: &str) -> Result<T, CatalogError>
        where
            T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
        {
            row.try_get(col)
                .map_err(|e| CatalogError::InvalidData(format!("{col} column: {e}")))
        }

        let cct: Option<i64> = get(row, "cct")?;
        Ok(CatalogItem {
            id: get(row, "id")?,
            name: get(row, "name")?,
            item_number: get(row, "item_number")?,
            short_description: get(row, "short_description")?,
            long_description: get(row, "long_description")?,
            category_1: get(row, "category_1")?,
            category_2: get(row, "category_2")?,
            group_name: get(row, "group_name")?,
            housing_color: get(row, "housing_color")?,
            ingress_protection: get(row, "ingress_protection")?,
            cct: cct.and_then(|k| u32::try_from(k).ok()),
            cct_switch: get(row, "cct_switch")?,
            sdcm: get(row, "sdcm")?,
            cri: get(row, "cri")?,
            lumen: get(row, "lumen")?,
            wattage: get(row, "wattage")?,
            price: get(row, "price")?,
            operating_mode: get(row, "operating_mode")?,
            available: get(row, "available")?,
        })
    }
}

/// Replace the folded text rows of one item.
async fn write_folds(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    item: &CatalogItem,
) -> Result<(), CatalogError> {
    sqlx::query("DELETE FROM product_text WHERE product_id = ?")
        .bind(item.id)
        .execute(&mut **tx)
        .await
        .map_err(|e| CatalogError::QueryFailed(format!("DELETE folds {}: {e}", item.id)))?;

    for field in TEXT_FIELDS {
        let Some(text) = item.text(field) else {
            continue;
        };
        sqlx::query("INSERT INTO product_text (product_id, field, folded) VALUES (?, ?, ?)")
            .bind(item.id)
            .bind(column(field))
            .bind(text.to_lowercase())
            .execute(&mut **tx)
            .await
            .map_err(|e| CatalogError::QueryFailed(format!("INSERT folds {}: {e}", item.id)))?;
    }
    Ok(())
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn query(&self, query: CatalogQuery) -> Result<Vec<CatalogItem>, CatalogError> {
        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT * FROM products");
        push_where(&mut builder, &query.predicates);
        builder.push(order_clause(query.order));
        builder.push(" LIMIT ").push_bind(query.limit as i64);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CatalogError::QueryFailed(format!("SELECT products: {e}")))?;

        rows.iter().map(Self::row_to_item).collect()
    }

    async fn count_by(
        &self,
        field: Field,
        predicates: Vec<Predicate>,
    ) -> Result<Vec<CategoryCount>, CatalogError> {
        if !field.is_text() {
            return Err(CatalogError::QueryFailed(format!(
                "cannot group by numeric field {field:?}"
            )));
        }
        let col = column(field);
        let mut builder: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {col} AS name, COUNT(*) AS n FROM products"));
        push_where(&mut builder, &predicates);
        builder.push(format!(
            " AND {col} IS NOT NULL AND {col} <> '' GROUP BY {col} ORDER BY n DESC, name ASC"
        ));

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CatalogError::QueryFailed(format!("GROUP BY {col}: {e}")))?;

        rows.iter()
            .map(|row| {
                let name: String = row
                    .try_get("name")
                    .map_err(|e| CatalogError::InvalidData(format!("name column: {e}")))?;
                let n: i64 = row
                    .try_get("n")
                    .map_err(|e| CatalogError::InvalidData(format!("n column: {e}")))?;
                Ok(CategoryCount {
                    name,
                    count: usize::try_from(n).unwrap_or(0),
                })
            })
            .collect()
    }

    async fn count(&self) -> Result<usize, CatalogError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CatalogError::QueryFailed(format!("COUNT failed: {e}")))?;
        Ok(usize::try_from(n).unwrap_or(0))
    }

    async fn health_check(&self) -> Result<bool, CatalogError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| true)
            .map_err(|e| CatalogError::Unavailable(e.to_string()))
    }
}
