use serde::{Deserialize, Deserializer};

use crate::sparse::SqlValue;

/// An optional report field that remembers *how* it was optional.
///
/// Senders omit fields they do not compute, and occasionally send an explicit
/// `null`. Both are different from a present zero: an omitted field must never
/// reach the `INSERT` column list, while an explicit `null` is written as SQL
/// `NULL`.
///
/// Decoding relies on the containing struct carrying `#[serde(default)]` so a
/// missing key lands on [`Field::Absent`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Field<T> {
    #[default]
    Absent,
    Null,
    Present(T),
}

impl<T: Clone + Into<SqlValue>> Field<T> {
    /// Lower the field into its SQL representation, keeping absence intact.
    pub fn to_sql(&self) -> Field<SqlValue> {
        match self {
            Field::Absent => Field::Absent,
            Field::Null => Field::Null,
            Field::Present(value) => Field::Present(value.clone().into()),
        }
    }
}

/// `None` is absence, not an explicit null. Used for request-derived values
/// such as headers, where "not sent" is the only way to be missing.
impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Field::Absent, Field::Present)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // The key was present, so the only remaining question is null vs value.
        Option::<T>::deserialize(deserializer).map(|v| v.map_or(Field::Null, Field::Present))
    }
}
