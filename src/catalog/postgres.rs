//! Live catalog over `tokio-postgres`
//!
//! The engine is synchronous, so the client lives next to a current-thread
//! runtime and every query blocks until its rows arrive. The connection task
//! is driven while a query is in flight.

use tokio::runtime::{Builder, Runtime};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Config, NoTls, Row};
use tracing::{debug, error};

use crate::error::ReshapeError;

use super::queries;
use super::{
    AttributeRow, CatalogSource, ConstraintRow, IndexRow, LabelScope, Oid, ReferencingKeyRow,
    SecurityLabelRow, SequenceRow, TableRow, TriggerRow, ViewRow,
};

/// Catalog Source backed by a live PostgreSQL session
pub struct PgCatalog {
    runtime: Runtime,
    client: Client,
}

impl PgCatalog {
    /// Open a session. `target` is only used in diagnostics.
    pub fn connect(config: &Config, target: &str) -> Result<Self, ReshapeError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| ReshapeError::Runtime { source })?;

        let (client, connection) =
            runtime
                .block_on(config.connect(NoTls))
                .map_err(|source| ReshapeError::Connection {
                    target: target.to_string(),
                    source,
                })?;

        runtime.spawn(async move {
            if let Err(err) = connection.await {
                error!(%err, "connection closed with error");
            }
        });

        debug!(server = target, "connected");
        Ok(Self { runtime, client })
    }

    fn query(
        &self,
        fact: &'static str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, ReshapeError> {
        debug!(fact, "catalog query");
        self.runtime
            .block_on(self.client.query(sql, params))
            .map_err(|source| ReshapeError::Query { fact, source })
    }

    /// Run a query and decode every row, mapping decode failures to the same fact.
    fn fetch<T>(
        &self,
        fact: &'static str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
        decode: fn(&Row) -> Result<T, tokio_postgres::Error>,
    ) -> Result<Vec<T>, ReshapeError> {
        self.query(fact, sql, params)?
            .iter()
            .map(decode)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| ReshapeError::Query { fact, source })
    }

    fn constraints(
        &self,
        fact: &'static str,
        table: Oid,
        kinds: &[&str],
    ) -> Result<Vec<ConstraintRow>, ReshapeError> {
        self.fetch(
            fact,
            queries::CONSTRAINTS,
            &[&table, &kinds],
            decode_constraint,
        )
    }
}

impl CatalogSource for PgCatalog {
    fn schema_exists(&self, schema: &str) -> Result<bool, ReshapeError> {
        let rows = self.query("schema", queries::SCHEMA_EXISTS, &[&schema])?;
        match rows.first() {
            Some(row) => row
                .try_get("found")
                .map_err(|source| ReshapeError::Query {
                    fact: "schema",
                    source,
                }),
            None => Ok(false),
        }
    }

    fn find_table(&self, schema: &str, table: &str) -> Result<Option<TableRow>, ReshapeError> {
        let mut rows = self.fetch(
            "table",
            queries::FIND_TABLE,
            &[&schema, &table],
            decode_table,
        )?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    fn attributes(&self, table: Oid) -> Result<Vec<AttributeRow>, ReshapeError> {
        self.fetch(
            "attributes",
            queries::ATTRIBUTES,
            &[&table],
            decode_attribute,
        )
    }

    fn indexes(&self, table: Oid) -> Result<Vec<IndexRow>, ReshapeError> {
        self.fetch("indexes", queries::INDEXES, &[&table], decode_index)
    }

    fn unique_constraints(&self, table: Oid) -> Result<Vec<ConstraintRow>, ReshapeError> {
        self.constraints("unique constraints", table, &["p", "u"])
    }

    fn foreign_keys(&self, table: Oid) -> Result<Vec<ConstraintRow>, ReshapeError> {
        self.constraints("foreign keys", table, &["f"])
    }

    fn referencing_keys(&self, table: Oid) -> Result<Vec<ReferencingKeyRow>, ReshapeError> {
        self.fetch(
            "referencing foreign keys",
            queries::REFERENCING_KEYS,
            &[&table],
            decode_referencing_key,
        )
    }

    fn exclusion_constraints(&self, table: Oid) -> Result<Vec<ConstraintRow>, ReshapeError> {
        self.constraints("exclusion constraints", table, &["x"])
    }

    fn check_constraints(&self, table: Oid) -> Result<Vec<ConstraintRow>, ReshapeError> {
        self.constraints("check constraints", table, &["c"])
    }

    fn dependent_views(&self, table: Oid) -> Result<Vec<ViewRow>, ReshapeError> {
        self.fetch(
            "dependent views",
            queries::DEPENDENT_VIEWS,
            &[&table],
            decode_view,
        )
    }

    fn owned_sequences(&self, table: Oid) -> Result<Vec<SequenceRow>, ReshapeError> {
        self.fetch(
            "owned sequences",
            queries::OWNED_SEQUENCES,
            &[&table],
            decode_sequence,
        )
    }

    fn triggers(&self, table: Oid) -> Result<Vec<TriggerRow>, ReshapeError> {
        self.fetch("triggers", queries::TRIGGERS, &[&table], decode_trigger)
    }

    fn security_labels(
        &self,
        scope: LabelScope<'_>,
    ) -> Result<Vec<SecurityLabelRow>, ReshapeError> {
        const FACT: &str = "security labels";
        match scope {
            LabelScope::Table(oid) => {
                self.fetch(FACT, queries::TABLE_LABELS, &[&oid], decode_label)
            }
            LabelScope::Columns(oid) => {
                self.fetch(FACT, queries::COLUMN_LABELS, &[&oid], decode_label)
            }
            LabelScope::Views(oids) | LabelScope::Sequences(oids) => {
                self.fetch(FACT, queries::RELATION_LABELS, &[&oids], decode_label)
            }
        }
    }
}

fn decode_table(row: &Row) -> Result<TableRow, tokio_postgres::Error> {
    Ok(TableRow {
        oid: row.try_get("oid")?,
        schema: row.try_get("schema")?,
        name: row.try_get("name")?,
    })
}

fn decode_attribute(row: &Row) -> Result<AttributeRow, tokio_postgres::Error> {
    Ok(AttributeRow {
        number: row.try_get("number")?,
        name: row.try_get("name")?,
        not_null: row.try_get("not_null")?,
        type_name: row.try_get("type_name")?,
        default_expr: row.try_get("default_expr")?,
        collation: row.try_get("collation")?,
        storage: row.try_get("storage")?,
        storage_is_default: row.try_get("storage_is_default")?,
        stats_target: row.try_get("stats_target")?,
        options: row.try_get("options")?,
        comment: row.try_get("comment")?,
        acl: row.try_get("acl")?,
        identity: row.try_get("identity")?,
        generated: row.try_get("generated")?,
    })
}

fn decode_index(row: &Row) -> Result<IndexRow, tokio_postgres::Error> {
    Ok(IndexRow {
        name: row.try_get("name")?,
        definition: row.try_get("definition")?,
        tablespace: row.try_get("tablespace")?,
        comment: row.try_get("comment")?,
    })
}

fn decode_constraint(row: &Row) -> Result<ConstraintRow, tokio_postgres::Error> {
    Ok(ConstraintRow {
        name: row.try_get("name")?,
        kind: row.try_get("kind")?,
        definition: row.try_get("definition")?,
        tablespace: row.try_get("tablespace")?,
        comment: row.try_get("comment")?,
    })
}

fn decode_referencing_key(row: &Row) -> Result<ReferencingKeyRow, tokio_postgres::Error> {
    Ok(ReferencingKeyRow {
        schema: row.try_get("schema")?,
        table: row.try_get("table")?,
        name: row.try_get("name")?,
    })
}

fn decode_view(row: &Row) -> Result<ViewRow, tokio_postgres::Error> {
    Ok(ViewRow {
        oid: row.try_get("oid")?,
        schema: row.try_get("schema")?,
        name: row.try_get("name")?,
        kind: row.try_get("kind")?,
        definition: row.try_get("definition")?,
        owner: row.try_get("owner")?,
        acl: row.try_get("acl")?,
        comment: row.try_get("comment")?,
        options: row.try_get("options")?,
        check_option: row.try_get("check_option")?,
    })
}

fn decode_sequence(row: &Row) -> Result<SequenceRow, tokio_postgres::Error> {
    Ok(SequenceRow {
        oid: row.try_get("oid")?,
        schema: row.try_get("schema")?,
        name: row.try_get("name")?,
        owner_column: row.try_get("owner_column")?,
        start: row.try_get("start")?,
        increment: row.try_get("increment")?,
        min: row.try_get("min")?,
        max: row.try_get("max")?,
        cycle: row.try_get("cycle")?,
        data_type: row.try_get("data_type")?,
        acl: row.try_get("acl")?,
        comment: row.try_get("comment")?,
    })
}

fn decode_trigger(row: &Row) -> Result<TriggerRow, tokio_postgres::Error> {
    Ok(TriggerRow {
        name: row.try_get("name")?,
        enabled: row.try_get("enabled")?,
    })
}

fn decode_label(row: &Row) -> Result<SecurityLabelRow, tokio_postgres::Error> {
    Ok(SecurityLabelRow {
        object: row.try_get("object")?,
        sub_id: row.try_get("sub_id")?,
        provider: row.try_get("provider")?,
        label: row.try_get("label")?,
    })
}
