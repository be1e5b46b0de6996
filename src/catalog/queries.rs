//! Catalog query text. Every query takes the table oid as `$1` unless noted.

/// `$1` schema name
pub(super) const SCHEMA_EXISTS: &str = "\
SELECT EXISTS (SELECT 1 FROM pg_namespace WHERE nspname = $1) AS found";

/// `$1` schema name, `$2` table name
pub(super) const FIND_TABLE: &str = "\
SELECT c.oid, n.nspname::text AS schema, c.relname::text AS name
FROM pg_class c
JOIN pg_namespace n ON n.oid = c.relnamespace
WHERE n.nspname = $1 AND c.relname = $2 AND c.relkind = 'r'";

pub(super) const ATTRIBUTES: &str = "\
SELECT a.attnum::int4 AS number,
       a.attname::text AS name,
       a.attnotnull AS not_null,
       format_type(a.atttypid, a.atttypmod) AS type_name,
       pg_get_expr(d.adbin, d.adrelid) AS default_expr,
       CASE WHEN a.attcollation <> t.typcollation
            THEN quote_ident(cn.nspname) || '.' || quote_ident(co.collname)
       END AS collation,
       a.attstorage::text AS storage,
       a.attstorage = t.typstorage AS storage_is_default,
       NULLIF(a.attstattarget, -1)::int4 AS stats_target,
       array_to_string(a.attoptions, ', ') AS options,
       col_description(a.attrelid, a.attnum) AS comment,
       a.attacl::text AS acl,
       a.attidentity::text AS identity,
       a.attgenerated::text AS generated
FROM pg_attribute a
JOIN pg_type t ON t.oid = a.atttypid
LEFT JOIN pg_attrdef d ON d.adrelid = a.attrelid AND d.adnum = a.attnum
LEFT JOIN pg_collation co ON co.oid = a.attcollation
LEFT JOIN pg_namespace cn ON cn.oid = co.collnamespace
WHERE a.attrelid = $1 AND a.attnum > 0 AND NOT a.attisdropped
ORDER BY a.attnum";

/// Indexes owned by a primary key, unique or exclusion constraint are
/// excluded; they come back with their constraint.
pub(super) const INDEXES: &str = "\
SELECT i.relname::text AS name,
       pg_get_indexdef(i.oid) AS definition,
       ts.spcname::text AS tablespace,
       obj_description(i.oid, 'pg_class') AS comment
FROM pg_index x
JOIN pg_class i ON i.oid = x.indexrelid
LEFT JOIN pg_tablespace ts ON ts.oid = i.reltablespace
WHERE x.indrelid = $1
  AND NOT EXISTS (
      SELECT 1 FROM pg_constraint k
      WHERE k.conrelid = x.indrelid
        AND k.conindid = x.indexrelid
        AND k.contype IN ('p', 'u', 'x'))
ORDER BY i.relname";

/// `$2` text array of `contype` codes
pub(super) const CONSTRAINTS: &str = "\
SELECT k.conname::text AS name,
       k.contype::text AS kind,
       pg_get_constraintdef(k.oid) AS definition,
       ts.spcname::text AS tablespace,
       obj_description(k.oid, 'pg_constraint') AS comment
FROM pg_constraint k
LEFT JOIN pg_class i ON i.oid = k.conindid AND k.contype IN ('p', 'u', 'x')
LEFT JOIN pg_tablespace ts ON ts.oid = i.reltablespace
WHERE k.conrelid = $1 AND k.contype::text = ANY($2) AND k.conislocal
ORDER BY k.conname";

/// Self-references are left out; they are part of the table's own keys.
pub(super) const REFERENCING_KEYS: &str = "\
SELECT n.nspname::text AS schema, c.relname::text AS table, k.conname::text AS name
FROM pg_constraint k
JOIN pg_class c ON c.oid = k.conrelid
JOIN pg_namespace n ON n.oid = c.relnamespace
WHERE k.contype = 'f' AND k.confrelid = $1 AND k.conrelid <> $1
ORDER BY n.nspname, c.relname, k.conname";

/// Views reached through rewrite rules, transitively. A view's depth is its
/// longest path from the table, so ordering by depth puts dependencies first.
pub(super) const DEPENDENT_VIEWS: &str = "\
WITH RECURSIVE dependents(oid, depth) AS (
    SELECT r.ev_class, 1
    FROM pg_depend d
    JOIN pg_rewrite r ON r.oid = d.objid
    WHERE d.classid = 'pg_rewrite'::regclass
      AND d.refclassid = 'pg_class'::regclass
      AND d.refobjid = $1
      AND r.ev_class <> $1
    UNION
    SELECT r.ev_class, dependents.depth + 1
    FROM dependents
    JOIN pg_depend d ON d.refobjid = dependents.oid
    JOIN pg_rewrite r ON r.oid = d.objid
    WHERE d.classid = 'pg_rewrite'::regclass
      AND d.refclassid = 'pg_class'::regclass
      AND r.ev_class <> dependents.oid
)
SELECT c.oid,
       n.nspname::text AS schema,
       c.relname::text AS name,
       c.relkind::text AS kind,
       pg_get_viewdef(c.oid) AS definition,
       pg_get_userbyid(c.relowner)::text AS owner,
       c.relacl::text AS acl,
       obj_description(c.oid, 'pg_class') AS comment,
       (SELECT string_agg(o, ', ') FROM unnest(c.reloptions) AS o
        WHERE o NOT LIKE 'check_option=%') AS options,
       (SELECT upper(substring(o FROM 14)) FROM unnest(c.reloptions) AS o
        WHERE o LIKE 'check_option=%') AS check_option
FROM (SELECT oid, max(depth) AS depth FROM dependents GROUP BY oid) v
JOIN pg_class c ON c.oid = v.oid
JOIN pg_namespace n ON n.oid = c.relnamespace
ORDER BY v.depth, n.nspname, c.relname";

/// Sequences tied to a column with an automatic dependency (`OWNED BY`).
/// Identity sequences use an internal dependency and are not listed.
pub(super) const OWNED_SEQUENCES: &str = "\
SELECT s.oid,
       n.nspname::text AS schema,
       s.relname::text AS name,
       a.attname::text AS owner_column,
       q.seqstart AS start,
       q.seqincrement AS increment,
       q.seqmin AS min,
       q.seqmax AS max,
       q.seqcycle AS cycle,
       format_type(q.seqtypid, NULL) AS data_type,
       s.relacl::text AS acl,
       obj_description(s.oid, 'pg_class') AS comment
FROM pg_depend d
JOIN pg_class s ON s.oid = d.objid AND s.relkind = 'S'
JOIN pg_namespace n ON n.oid = s.relnamespace
JOIN pg_sequence q ON q.seqrelid = s.oid
JOIN pg_attribute a ON a.attrelid = d.refobjid AND a.attnum = d.refobjsubid
WHERE d.classid = 'pg_class'::regclass
  AND d.refclassid = 'pg_class'::regclass
  AND d.refobjid = $1
  AND d.deptype = 'a'
ORDER BY n.nspname, s.relname";

pub(super) const TRIGGERS: &str = "\
SELECT g.tgname::text AS name, g.tgenabled::text AS enabled
FROM pg_trigger g
WHERE g.tgrelid = $1 AND NOT g.tgisinternal
ORDER BY g.tgname";

pub(super) const TABLE_LABELS: &str = "\
SELECT l.objoid AS object, l.objsubid AS sub_id, l.provider, l.label
FROM pg_seclabel l
WHERE l.classoid = 'pg_class'::regclass AND l.objoid = $1 AND l.objsubid = 0
ORDER BY l.provider";

pub(super) const COLUMN_LABELS: &str = "\
SELECT l.objoid AS object, l.objsubid AS sub_id, l.provider, l.label
FROM pg_seclabel l
WHERE l.classoid = 'pg_class'::regclass AND l.objoid = $1 AND l.objsubid > 0
ORDER BY l.objsubid, l.provider";

/// `$1` oid array
pub(super) const RELATION_LABELS: &str = "\
SELECT l.objoid AS object, l.objsubid AS sub_id, l.provider, l.label
FROM pg_seclabel l
WHERE l.classoid = 'pg_class'::regclass AND l.objoid = ANY($1) AND l.objsubid = 0
ORDER BY l.objoid, l.provider";
