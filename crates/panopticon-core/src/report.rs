use chrono::Utc;
use serde::Deserialize;

use crate::classify::{classify, ServerKind};
use crate::columns::{ColumnSpec, BASE_COLUMNS, DENDRITE_COLUMNS, SYNAPSE_COLUMNS};
use crate::error::DecodeError;
use crate::field::Field;
use crate::sparse::{InsertStatement, Placeholder, SparseRow};

/// Fields both homeserver implementations report.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CommonStats {
    /// Sender's clock at report time, seconds since epoch UTC.
    #[serde(rename = "timestamp")]
    pub remote_timestamp: Field<i64>,
    pub uptime_seconds: Field<i64>,
    pub total_users: Field<i64>,
    /// Native and guest users, excluding appservice-bridged ones.
    pub total_nonbridged_users: Field<i64>,
    pub total_room_count: Field<i64>,
    pub daily_active_users: Field<i64>,
    pub daily_active_rooms: Field<i64>,
    pub daily_messages: Field<i64>,
    pub daily_sent_messages: Field<i64>,
    pub daily_active_e2ee_rooms: Field<i64>,
    pub daily_e2ee_messages: Field<i64>,
    pub daily_sent_e2ee_messages: Field<i64>,
    pub monthly_active_users: Field<i64>,
    pub r30_users_all: Field<i64>,
    pub r30_users_android: Field<i64>,
    pub r30_users_ios: Field<i64>,
    pub r30_users_electron: Field<i64>,
    pub r30_users_web: Field<i64>,
    pub r30v2_users_all: Field<i64>,
    pub r30v2_users_android: Field<i64>,
    pub r30v2_users_ios: Field<i64>,
    pub r30v2_users_electron: Field<i64>,
    pub r30v2_users_web: Field<i64>,
    pub cpu_average: Field<i64>,
    pub memory_rss: Field<i64>,
    /// New users registered in the last 24 hours, split by account type.
    pub daily_user_type_native: Field<i64>,
    pub daily_user_type_guest: Field<i64>,
    pub daily_user_type_bridged: Field<i64>,
    pub database_engine: Field<String>,
    pub database_server_version: Field<String>,
    pub log_level: Field<String>,
}

/// Synapse-only fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SynapseStats {
    pub cache_factor: Field<f64>,
    pub event_cache_size: Field<i64>,
    pub python_version: Field<String>,
    pub server_context: Field<String>,
}

/// Dendrite-only fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DendriteStats {
    #[serde(rename = "go_os")]
    pub goos: Field<String>,
    #[serde(rename = "go_arch")]
    pub goarch: Field<String>,
    #[serde(rename = "go_version")]
    pub goversion: Field<String>,
    pub federation_disabled: Field<bool>,
    pub monolith: Field<bool>,
    pub nats_embedded: Field<bool>,
    pub nats_in_memory: Field<bool>,
    pub num_cpu: Field<i64>,
    pub num_go_routine: Field<i64>,
    pub version: Field<String>,
}

/// A request body after structural parsing, before classification.
///
/// Both extension field sets are decoded so a type error anywhere in the
/// payload is reported the same way regardless of sender. Keys the service
/// assigns itself (`local_timestamp`, `remote_addr`, ...) have no field here
/// and are dropped with every other unknown key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DecodedReport {
    pub homeserver: Option<String>,
    /// Older senders capitalise the key. Kept apart so a body carrying both
    /// spellings still decodes.
    #[serde(rename = "Homeserver")]
    pub homeserver_capitalised: Option<String>,
    #[serde(flatten)]
    pub common: CommonStats,
    #[serde(flatten)]
    pub synapse: SynapseStats,
    #[serde(flatten)]
    pub dendrite: DendriteStats,
}

impl DecodedReport {
    /// The reporting server's name. The lowercase key wins when both are sent.
    pub fn homeserver(&self) -> Option<&str> {
        self.homeserver
            .as_deref()
            .or(self.homeserver_capitalised.as_deref())
    }
}

/// Parse a report body. Unknown keys are ignored; wrong types are errors.
pub fn decode_report(body: &[u8]) -> Result<DecodedReport, DecodeError> {
    Ok(serde_json::from_slice(body)?)
}

/// What the service knows about a submission independently of its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Seconds since epoch UTC when the report was received.
    pub local_timestamp: i64,
    /// Peer address of the connection, `ip:port`.
    pub remote_addr: String,
    pub forwarded_for: Option<String>,
    pub user_agent: Option<String>,
}

impl Receipt {
    /// Stamp a receipt with the current time. Empty header values count as
    /// not sent.
    pub fn now(
        remote_addr: impl Into<String>,
        forwarded_for: Option<&str>,
        user_agent: Option<&str>,
    ) -> Self {
        let non_empty = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_string);
        Self {
            local_timestamp: Utc::now().timestamp(),
            remote_addr: remote_addr.into(),
            forwarded_for: non_empty(forwarded_for),
            user_agent: non_empty(user_agent),
        }
    }
}

/// Columns shared by both report variants.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBase {
    pub homeserver: String,
    pub receipt: Receipt,
    pub common: CommonStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynapseReport {
    pub base: ReportBase,
    pub extension: SynapseStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DendriteReport {
    pub base: ReportBase,
    pub extension: DendriteStats,
}

/// A classified report, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub enum StatsReport {
    Synapse(SynapseReport),
    Dendrite(DendriteReport),
}

impl StatsReport {
    /// Classify `decoded` by the receipt's User-Agent and keep only the
    /// extension fields of the matching sender.
    pub fn assemble(decoded: DecodedReport, receipt: Receipt) -> Self {
        let kind = classify(receipt.user_agent.as_deref());
        let base = ReportBase {
            homeserver: decoded.homeserver().unwrap_or_default().to_string(),
            receipt,
            common: decoded.common,
        };
        match kind {
            ServerKind::Synapse => StatsReport::Synapse(SynapseReport {
                base,
                extension: decoded.synapse,
            }),
            ServerKind::Dendrite => StatsReport::Dendrite(DendriteReport {
                base,
                extension: decoded.dendrite,
            }),
        }
    }

    pub fn kind(&self) -> ServerKind {
        match self {
            StatsReport::Synapse(_) => ServerKind::Synapse,
            StatsReport::Dendrite(_) => ServerKind::Dendrite,
        }
    }

    pub fn base(&self) -> &ReportBase {
        match self {
            StatsReport::Synapse(r) => &r.base,
            StatsReport::Dendrite(r) => &r.base,
        }
    }

    /// The columns this report actually carries: base columns first, then
    /// the variant's extension columns.
    pub fn sparse_row(&self) -> SparseRow {
        let mut row = SparseRow::new();
        extend(&mut row, BASE_COLUMNS, self.base());
        match self {
            StatsReport::Synapse(r) => extend(&mut row, SYNAPSE_COLUMNS, &r.extension),
            StatsReport::Dendrite(r) => extend(&mut row, DENDRITE_COLUMNS, &r.extension),
        }
        row
    }

    /// Parameterized `INSERT` into this report's table.
    pub fn insert_statement(&self, placeholder: Placeholder) -> InsertStatement {
        self.sparse_row()
            .into_insert(self.kind().table(), placeholder)
    }
}

fn extend<R>(row: &mut SparseRow, specs: &[ColumnSpec<R>], source: &R) {
    for spec in specs {
        row.push_field(spec.name, (spec.read)(source));
    }
}
