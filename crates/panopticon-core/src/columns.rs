//! Column catalog for the two stats tables.
//!
//! The same ordered lists drive both the sparse `INSERT` built per request and
//! the `CREATE TABLE` run at startup, so a field cannot be persisted into a
//! column the table lacks.

use crate::classify::ServerKind;
use crate::field::Field;
use crate::report::{DendriteStats, ReportBase, SynapseStats};
use crate::sparse::SqlValue;

/// Storage type of a column, mapped to concrete SQL by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    BigInt,
    Double,
    Boolean,
    Text,
    /// Bounded text used for the homeserver name.
    ShortText,
}

/// One column: its name, its type, and how to read its value off a report part.
pub struct ColumnSpec<R> {
    pub name: &'static str,
    pub ty: ColumnType,
    pub read: fn(&R) -> Field<SqlValue>,
}

macro_rules! column {
    ($name:literal, $ty:ident, $source:ty => $($path:ident).+) => {
        ColumnSpec {
            name: $name,
            ty: ColumnType::$ty,
            read: |r: &$source| r.$($path).+.to_sql(),
        }
    };
}

/// Columns shared by both tables, in insertion order. The first three are
/// assigned by the service and always written.
pub static BASE_COLUMNS: &[ColumnSpec<ReportBase>] = &[
    ColumnSpec {
        name: "homeserver",
        ty: ColumnType::ShortText,
        read: |r: &ReportBase| Field::Present(SqlValue::from(r.homeserver.as_str())),
    },
    ColumnSpec {
        name: "local_timestamp",
        ty: ColumnType::BigInt,
        read: |r: &ReportBase| Field::Present(SqlValue::Int(r.receipt.local_timestamp)),
    },
    ColumnSpec {
        name: "remote_addr",
        ty: ColumnType::Text,
        read: |r: &ReportBase| Field::Present(SqlValue::from(r.receipt.remote_addr.as_str())),
    },
    ColumnSpec {
        name: "forwarded_for",
        ty: ColumnType::Text,
        read: |r: &ReportBase| Field::from(r.receipt.forwarded_for.clone()).to_sql(),
    },
    ColumnSpec {
        name: "user_agent",
        ty: ColumnType::Text,
        read: |r: &ReportBase| Field::from(r.receipt.user_agent.clone()).to_sql(),
    },
    column!("remote_timestamp", BigInt, ReportBase => common.remote_timestamp),
    column!("uptime_seconds", BigInt, ReportBase => common.uptime_seconds),
    column!("total_users", BigInt, ReportBase => common.total_users),
    column!("total_nonbridged_users", BigInt, ReportBase => common.total_nonbridged_users),
    column!("total_room_count", BigInt, ReportBase => common.total_room_count),
    column!("daily_active_users", BigInt, ReportBase => common.daily_active_users),
    column!("daily_active_rooms", BigInt, ReportBase => common.daily_active_rooms),
    column!("daily_messages", BigInt, ReportBase => common.daily_messages),
    column!("daily_sent_messages", BigInt, ReportBase => common.daily_sent_messages),
    column!("daily_active_e2ee_rooms", BigInt, ReportBase => common.daily_active_e2ee_rooms),
    column!("daily_e2ee_messages", BigInt, ReportBase => common.daily_e2ee_messages),
    column!("daily_sent_e2ee_messages", BigInt, ReportBase => common.daily_sent_e2ee_messages),
    column!("monthly_active_users", BigInt, ReportBase => common.monthly_active_users),
    column!("r30_users_all", BigInt, ReportBase => common.r30_users_all),
    column!("r30_users_android", BigInt, ReportBase => common.r30_users_android),
    column!("r30_users_ios", BigInt, ReportBase => common.r30_users_ios),
    column!("r30_users_electron", BigInt, ReportBase => common.r30_users_electron),
    column!("r30_users_web", BigInt, ReportBase => common.r30_users_web),
    column!("r30v2_users_all", BigInt, ReportBase => common.r30v2_users_all),
    column!("r30v2_users_android", BigInt, ReportBase => common.r30v2_users_android),
    column!("r30v2_users_ios", BigInt, ReportBase => common.r30v2_users_ios),
    column!("r30v2_users_electron", BigInt, ReportBase => common.r30v2_users_electron),
    column!("r30v2_users_web", BigInt, ReportBase => common.r30v2_users_web),
    column!("cpu_average", BigInt, ReportBase => common.cpu_average),
    column!("memory_rss", BigInt, ReportBase => common.memory_rss),
    column!("daily_user_type_native", BigInt, ReportBase => common.daily_user_type_native),
    column!("daily_user_type_guest", BigInt, ReportBase => common.daily_user_type_guest),
    column!("daily_user_type_bridged", BigInt, ReportBase => common.daily_user_type_bridged),
    column!("database_engine", Text, ReportBase => common.database_engine),
    column!("database_server_version", Text, ReportBase => common.database_server_version),
    column!("log_level", Text, ReportBase => common.log_level),
];

/// Number of leading [`BASE_COLUMNS`] that every row carries.
pub const REQUIRED_COLUMNS: usize = 3;

pub static SYNAPSE_COLUMNS: &[ColumnSpec<SynapseStats>] = &[
    column!("cache_factor", Double, SynapseStats => cache_factor),
    column!("event_cache_size", BigInt, SynapseStats => event_cache_size),
    column!("python_version", Text, SynapseStats => python_version),
    column!("server_context", Text, SynapseStats => server_context),
];

pub static DENDRITE_COLUMNS: &[ColumnSpec<DendriteStats>] = &[
    column!("goos", Text, DendriteStats => goos),
    column!("goarch", Text, DendriteStats => goarch),
    column!("goversion", Text, DendriteStats => goversion),
    column!("federation_disabled", Boolean, DendriteStats => federation_disabled),
    column!("monolith", Boolean, DendriteStats => monolith),
    column!("nats_embedded", Boolean, DendriteStats => nats_embedded),
    column!("nats_in_memory", Boolean, DendriteStats => nats_in_memory),
    column!("num_cpu", BigInt, DendriteStats => num_cpu),
    column!("num_go_routine", BigInt, DendriteStats => num_go_routine),
    column!("version", Text, DendriteStats => version),
];

/// Every column of the table for `kind`, in insertion order.
pub fn table_columns(kind: ServerKind) -> Vec<(&'static str, ColumnType)> {
    let base = BASE_COLUMNS.iter().map(|c| (c.name, c.ty));
    match kind {
        ServerKind::Synapse => base
            .chain(SYNAPSE_COLUMNS.iter().map(|c| (c.name, c.ty)))
            .collect(),
        ServerKind::Dendrite => base
            .chain(DENDRITE_COLUMNS.iter().map(|c| (c.name, c.ty)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn column_names_are_unique_per_table() {
        for kind in ServerKind::ALL {
            let columns = table_columns(kind);
            let unique: HashSet<_> = columns.iter().map(|(name, _)| *name).collect();
            assert_eq!(unique.len(), columns.len(), "duplicate column in {kind}");
        }
    }

    #[test]
    fn required_columns_lead_the_catalog() {
        let names: Vec<_> = BASE_COLUMNS
            .iter()
            .take(REQUIRED_COLUMNS)
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["homeserver", "local_timestamp", "remote_addr"]);
    }

    #[test]
    fn extensions_do_not_overlap() {
        let synapse: HashSet<_> = SYNAPSE_COLUMNS.iter().map(|c| c.name).collect();
        assert!(DENDRITE_COLUMNS.iter().all(|c| !synapse.contains(c.name)));
    }
}
