use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::monitoring::{IndexInfo, TableInventory};
use crate::infrastructure::monitoring::ProbeTransport;

// Row counts are planner estimates; never-analyzed tables report -1, clamped
// to zero.
const ROW_ESTIMATES: &str = r#"
    SELECT c.relname::text AS table_name,
           GREATEST(c.reltuples, 0)::bigint AS row_count
    FROM pg_class c
    JOIN pg_namespace n ON n.oid = c.relnamespace
    WHERE n.nspname = 'public' AND c.relkind IN ('r', 'p')
"#;

const INDEXES: &str = r#"
    SELECT tablename::text, indexname::text, indexdef::text
    FROM pg_indexes
    WHERE schemaname = 'public'
    ORDER BY tablename, indexname
"#;

const FOREIGN_KEY_COLUMNS: &str = r#"
    SELECT kcu.table_name::text, kcu.column_name::text
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
      ON tc.constraint_name = kcu.constraint_name
     AND tc.table_schema = kcu.table_schema
    WHERE tc.constraint_type = 'FOREIGN KEY' AND tc.table_schema = 'public'
    ORDER BY kcu.table_name, kcu.ordinal_position
"#;

/// Probes PostgreSQL through the application's pool.
pub struct PgProbeTransport {
    pool: PgPool,
}

impl PgProbeTransport {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProbeTransport for PgProbeTransport {
    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn inventory(&self) -> anyhow::Result<BTreeMap<String, TableInventory>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(ROW_ESTIMATES)
            .fetch_all(&self.pool)
            .await?;
        let mut tables: BTreeMap<String, TableInventory> = rows
            .into_iter()
            .map(|(name, row_count)| {
                (
                    name,
                    TableInventory {
                        row_count,
                        ..TableInventory::default()
                    },
                )
            })
            .collect();

        let indexes: Vec<(String, String, String)> = sqlx::query_as(INDEXES)
            .fetch_all(&self.pool)
            .await?;
        for (table, name, definition) in indexes {
            if let Some(inventory) = tables.get_mut(&table) {
                inventory.indexes.push(IndexInfo { name, definition });
            }
        }

        let foreign_keys: Vec<(String, String)> = sqlx::query_as(FOREIGN_KEY_COLUMNS)
            .fetch_all(&self.pool)
            .await?;
        for (table, column) in foreign_keys {
            if let Some(inventory) = tables.get_mut(&table) {
                inventory.foreign_key_columns.push(column);
            }
        }

        Ok(tables)
    }
}
