//! Common test utilities for pgreshape tests
//!
//! [`FixtureCatalog`] answers catalog queries from in-memory rows so the
//! builder, planner and script emitter can be exercised without a server.

#![allow(dead_code)]

use std::cell::RefCell;

use pgreshape::catalog::{
    AttributeRow, CatalogSource, ConstraintRow, IndexRow, LabelScope, Oid, ReferencingKeyRow,
    SecurityLabelRow, SequenceRow, TableRow, TriggerRow, ViewRow,
};
use pgreshape::ReshapeError;
use pgreshape::ReshapeRequest;

pub const ORDERS_OID: Oid = 16384;

/// In-memory catalog for a single table
#[derive(Debug, Default)]
pub struct FixtureCatalog {
    pub schemas: Vec<String>,
    pub table: Option<TableRow>,
    pub attributes: Vec<AttributeRow>,
    pub indexes: Vec<IndexRow>,
    pub unique: Vec<ConstraintRow>,
    pub foreign_keys: Vec<ConstraintRow>,
    pub referencing_keys: Vec<ReferencingKeyRow>,
    pub exclusions: Vec<ConstraintRow>,
    pub checks: Vec<ConstraintRow>,
    pub views: Vec<ViewRow>,
    /// Indexes of dependent materialized views, keyed by view oid
    pub view_indexes: Vec<(Oid, IndexRow)>,
    pub sequences: Vec<SequenceRow>,
    pub triggers: Vec<TriggerRow>,
    pub labels: Vec<SecurityLabelRow>,
    /// Names of the facts fetched so far, in call order
    pub calls: RefCell<Vec<&'static str>>,
}

impl FixtureCatalog {
    /// A table with plain integer columns and nothing else
    pub fn with_columns(schema: &str, table: &str, columns: &[&str]) -> Self {
        Self {
            schemas: vec![schema.to_string()],
            table: Some(TableRow {
                oid: ORDERS_OID,
                schema: schema.to_string(),
                name: table.to_string(),
            }),
            attributes: columns
                .iter()
                .enumerate()
                .map(|(i, name)| attribute(i as i32 + 1, name, "integer"))
                .collect(),
            ..Self::default()
        }
    }

    /// `public.orders` with one object of most kinds hanging off it
    pub fn orders() -> Self {
        let mut catalog = Self::with_columns("public", "orders", &[]);

        let mut id = attribute(1, "id", "bigint");
        id.not_null = true;
        id.default_expr = Some("nextval('orders_id_seq'::regclass)".to_string());

        let mut customer_id = attribute(2, "customer_id", "integer");
        customer_id.not_null = true;
        customer_id.acl = Some("{carol=r/app}".to_string());

        let mut qty = attribute(3, "qty", "integer");
        qty.stats_target = Some(500);

        let mut price = attribute(4, "price", "numeric(10,2)");
        price.comment = Some("Unit price".to_string());

        let mut total = attribute(5, "total", "numeric");
        total.default_expr = Some("((qty)::numeric * price)".to_string());
        total.generated = "s".to_string();

        let mut status = attribute(6, "Status", "text");
        status.collation = Some("pg_catalog.\"C\"".to_string());
        status.storage = "m".to_string();
        status.storage_is_default = false;

        catalog.attributes = vec![id, customer_id, qty, price, total, status];

        catalog.indexes = vec![IndexRow {
            name: "orders_customer_idx".to_string(),
            definition: "CREATE INDEX orders_customer_idx ON public.orders USING btree (customer_id)"
                .to_string(),
            tablespace: None,
            comment: None,
        }];
        catalog.unique = vec![constraint("orders_pkey", "p", "PRIMARY KEY (id)")];
        catalog.foreign_keys = vec![constraint(
            "orders_customer_fk",
            "f",
            "FOREIGN KEY (customer_id) REFERENCES public.customers(id)",
        )];
        catalog.checks = vec![constraint("orders_qty_check", "c", "CHECK ((qty > 0))")];
        catalog.views = vec![ViewRow {
            oid: 16400,
            schema: "public".to_string(),
            name: "order_totals".to_string(),
            kind: "v".to_string(),
            definition: " SELECT orders.id,\n    orders.total\n   FROM orders;".to_string(),
            owner: "app".to_string(),
            acl: Some("{app=arwdDxtm/app,reader=r/app}".to_string()),
            comment: Some("Totals per order".to_string()),
            options: None,
            check_option: None,
        }];
        catalog.sequences = vec![SequenceRow {
            oid: 16380,
            schema: "public".to_string(),
            name: "orders_id_seq".to_string(),
            owner_column: "id".to_string(),
            start: 1,
            increment: 1,
            min: 1,
            max: i64::MAX,
            cycle: false,
            data_type: "bigint".to_string(),
            acl: None,
            comment: None,
        }];
        catalog.labels = vec![SecurityLabelRow {
            object: ORDERS_OID,
            sub_id: 0,
            provider: "dummy".to_string(),
            label: "classified".to_string(),
        }];
        catalog
    }

    fn record(&self, fact: &'static str) {
        self.calls.borrow_mut().push(fact);
    }
}

impl CatalogSource for FixtureCatalog {
    fn schema_exists(&self, schema: &str) -> Result<bool, ReshapeError> {
        self.record("schema");
        Ok(self.schemas.iter().any(|s| s == schema))
    }

    fn find_table(&self, schema: &str, table: &str) -> Result<Option<TableRow>, ReshapeError> {
        self.record("table");
        Ok(self
            .table
            .clone()
            .filter(|t| t.schema == schema && t.name == table))
    }

    fn attributes(&self, _table: Oid) -> Result<Vec<AttributeRow>, ReshapeError> {
        self.record("attributes");
        Ok(self.attributes.clone())
    }

    fn indexes(&self, table: Oid) -> Result<Vec<IndexRow>, ReshapeError> {
        self.record("indexes");
        if self.table.as_ref().is_some_and(|t| t.oid == table) {
            return Ok(self.indexes.clone());
        }
        Ok(self
            .view_indexes
            .iter()
            .filter(|(oid, _)| *oid == table)
            .map(|(_, row)| row.clone())
            .collect())
    }

    fn unique_constraints(&self, _table: Oid) -> Result<Vec<ConstraintRow>, ReshapeError> {
        self.record("unique");
        Ok(self.unique.clone())
    }

    fn foreign_keys(&self, _table: Oid) -> Result<Vec<ConstraintRow>, ReshapeError> {
        self.record("foreign_keys");
        Ok(self.foreign_keys.clone())
    }

    fn referencing_keys(&self, _table: Oid) -> Result<Vec<ReferencingKeyRow>, ReshapeError> {
        self.record("referencing_keys");
        Ok(self.referencing_keys.clone())
    }

    fn exclusion_constraints(&self, _table: Oid) -> Result<Vec<ConstraintRow>, ReshapeError> {
        self.record("exclusions");
        Ok(self.exclusions.clone())
    }

    fn check_constraints(&self, _table: Oid) -> Result<Vec<ConstraintRow>, ReshapeError> {
        self.record("checks");
        Ok(self.checks.clone())
    }

    fn dependent_views(&self, _table: Oid) -> Result<Vec<ViewRow>, ReshapeError> {
        self.record("views");
        Ok(self.views.clone())
    }

    fn owned_sequences(&self, _table: Oid) -> Result<Vec<SequenceRow>, ReshapeError> {
        self.record("sequences");
        Ok(self.sequences.clone())
    }

    fn triggers(&self, _table: Oid) -> Result<Vec<TriggerRow>, ReshapeError> {
        self.record("triggers");
        Ok(self.triggers.clone())
    }

    fn security_labels(
        &self,
        scope: LabelScope<'_>,
    ) -> Result<Vec<SecurityLabelRow>, ReshapeError> {
        self.record("labels");
        let labels = self.labels.iter().filter(|l| match scope {
            LabelScope::Table(oid) => l.object == oid && l.sub_id == 0,
            LabelScope::Columns(oid) => l.object == oid && l.sub_id > 0,
            LabelScope::Views(oids) | LabelScope::Sequences(oids) => {
                oids.contains(&l.object) && l.sub_id == 0
            }
        });
        Ok(labels.cloned().collect())
    }
}

/// A materialized view over `orders` with one unique index
pub fn with_materialized_view(mut catalog: FixtureCatalog) -> FixtureCatalog {
    catalog.views.push(ViewRow {
        oid: 16410,
        schema: "public".to_string(),
        name: "customer_totals".to_string(),
        kind: "m".to_string(),
        definition: " SELECT orders.customer_id,\n    sum(orders.total) AS total\n   FROM orders\n  GROUP BY orders.customer_id;".to_string(),
        owner: "app".to_string(),
        ..ViewRow::default()
    });
    catalog.view_indexes.push((
        16410,
        IndexRow {
            name: "customer_totals_customer_idx".to_string(),
            definition: "CREATE UNIQUE INDEX customer_totals_customer_idx ON public.customer_totals USING btree (customer_id)".to_string(),
            tablespace: None,
            comment: None,
        },
    ));
    catalog
}

pub fn trigger(name: &str, enabled: &str) -> TriggerRow {
    TriggerRow {
        name: name.to_string(),
        enabled: enabled.to_string(),
    }
}

pub fn attribute(number: i32, name: &str, type_name: &str) -> AttributeRow {
    AttributeRow {
        number,
        name: name.to_string(),
        type_name: type_name.to_string(),
        storage: "p".to_string(),
        storage_is_default: true,
        ..AttributeRow::default()
    }
}

pub fn constraint(name: &str, kind: &str, definition: &str) -> ConstraintRow {
    ConstraintRow {
        name: name.to_string(),
        kind: kind.to_string(),
        definition: definition.to_string(),
        tablespace: None,
        comment: None,
    }
}

pub fn request(schema: &str, table: &str, after: &str, column: &str, type_expr: &str) -> ReshapeRequest {
    ReshapeRequest {
        schema: schema.to_string(),
        table: table.to_string(),
        insert_after: after.to_string(),
        new_column: column.to_string(),
        new_column_type: type_expr.to_string(),
    }
}
