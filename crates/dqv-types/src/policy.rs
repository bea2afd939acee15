//! Per-datasource batch kwargs policies.
//!
//! Every kind of kwargs has exactly one required field and a set of
//! datasource families that accept it. The table below is the single source
//! of truth; [`TypedBatchKwargs`] checks kwargs against it at construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BatchError, BatchResult};
use crate::fingerprint::{BatchFingerprint, Fingerprinter};
use crate::frame::{FrameHandle, FrameKind};
use crate::kwargs::{BatchKwargs, BatchValue};

/// A family of datasources sharing one execution engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasourceFamily {
    Pandas,
    SparkDf,
    SqlAlchemy,
}

impl DatasourceFamily {
    pub const ALL: [Self; 3] = [Self::Pandas, Self::SparkDf, Self::SqlAlchemy];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pandas => "pandas",
            Self::SparkDf => "spark_df",
            Self::SqlAlchemy => "sql_alchemy",
        }
    }

    /// Frame kind produced by this family's in-memory datasets, if it has any.
    pub fn frame_kind(self) -> Option<FrameKind> {
        match self {
            Self::Pandas => Some(FrameKind::Pandas),
            Self::SparkDf => Some(FrameKind::SparkDf),
            Self::SqlAlchemy => None,
        }
    }
}

impl fmt::Display for DatasourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasourceFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown datasource family: {s}"))
    }
}

/// The shape of a kwargs mapping, named after the field that identifies it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchKwargsKind {
    Path,
    S3,
    InMemory,
    Table,
    Query,
}

struct KindPolicy {
    kind: BatchKwargsKind,
    name: &'static str,
    required_field: &'static str,
    families: &'static [DatasourceFamily],
}

const POLICIES: [KindPolicy; 5] = [
    KindPolicy {
        kind: BatchKwargsKind::Path,
        name: "path",
        required_field: "path",
        families: &[DatasourceFamily::Pandas, DatasourceFamily::SparkDf],
    },
    KindPolicy {
        kind: BatchKwargsKind::S3,
        name: "s3",
        required_field: "s3",
        families: &[DatasourceFamily::Pandas, DatasourceFamily::SparkDf],
    },
    KindPolicy {
        kind: BatchKwargsKind::InMemory,
        name: "in_memory",
        required_field: "dataset",
        families: &[DatasourceFamily::Pandas, DatasourceFamily::SparkDf],
    },
    KindPolicy {
        kind: BatchKwargsKind::Table,
        name: "table",
        required_field: "table",
        families: &[DatasourceFamily::SqlAlchemy],
    },
    KindPolicy {
        kind: BatchKwargsKind::Query,
        name: "query",
        required_field: "query",
        families: &[DatasourceFamily::SqlAlchemy, DatasourceFamily::SparkDf],
    },
];

impl BatchKwargsKind {
    pub const ALL: [Self; 5] = [Self::Path, Self::S3, Self::InMemory, Self::Table, Self::Query];

    fn policy(self) -> &'static KindPolicy {
        // The table is ordered like the enum.
        &POLICIES[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        self.policy().name
    }

    /// The field every kwargs of this kind must carry.
    pub fn required_field(self) -> &'static str {
        self.policy().required_field
    }

    /// Datasource families that accept this kind.
    pub fn families(self) -> &'static [DatasourceFamily] {
        self.policy().families
    }

    pub fn supports(self, family: DatasourceFamily) -> bool {
        self.families().contains(&family)
    }
}

impl fmt::Display for BatchKwargsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchKwargsKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown batch kwargs kind: {s}"))
    }
}

/// Batch kwargs that passed their kind's policy.
///
/// The inner mapping is private: once checked, kwargs can be read through the
/// named accessors but not mutated, so the policy cannot be invalidated after
/// construction.
#[derive(Clone, Debug)]
pub struct TypedBatchKwargs {
    kind: BatchKwargsKind,
    family: Option<DatasourceFamily>,
    kwargs: BatchKwargs,
}

impl TypedBatchKwargs {
    /// Check `kwargs` against the policy for `kind`.
    ///
    /// In-memory kwargs must carry a frame handle of any kind; use
    /// [`for_family`](Self::for_family) to also pin the frame kind.
    pub fn new(kind: BatchKwargsKind, kwargs: BatchKwargs) -> BatchResult<Self> {
        check(kind, None, &kwargs)?;
        Ok(Self {
            kind,
            family: None,
            kwargs,
        })
    }

    /// Check `kwargs` against the policy for `kind` as used by `family`.
    pub fn for_family(
        kind: BatchKwargsKind,
        family: DatasourceFamily,
        kwargs: BatchKwargs,
    ) -> BatchResult<Self> {
        if !kind.supports(family) {
            return Err(BatchError::UnsupportedFamily { kind, family });
        }
        check(kind, Some(family), &kwargs)?;
        Ok(Self {
            kind,
            family: Some(family),
            kwargs,
        })
    }

    pub fn kind(&self) -> BatchKwargsKind {
        self.kind
    }

    /// The family these kwargs were checked for, if one was given.
    pub fn family(&self) -> Option<DatasourceFamily> {
        self.family
    }

    pub fn kwargs(&self) -> &BatchKwargs {
        &self.kwargs
    }

    pub fn into_kwargs(self) -> BatchKwargs {
        self.kwargs
    }

    pub fn path(&self) -> Option<&str> {
        self.kwargs.get_str("path")
    }

    pub fn s3(&self) -> Option<&str> {
        self.kwargs.get_str("s3")
    }

    pub fn table(&self) -> Option<&str> {
        self.kwargs.get_str("table")
    }

    pub fn query(&self) -> Option<&str> {
        self.kwargs.get_str("query")
    }

    pub fn schema(&self) -> Option<&str> {
        self.kwargs.get_str("schema")
    }

    pub fn dataset(&self) -> Option<&FrameHandle> {
        self.kwargs.get("dataset").and_then(BatchValue::as_frame)
    }

    pub fn reader_method(&self) -> Option<&str> {
        self.kwargs.reader_method()
    }

    pub fn limit(&self) -> Option<u64> {
        self.kwargs.limit()
    }

    pub fn fingerprint(&self, fingerprinter: &Fingerprinter) -> BatchResult<BatchFingerprint> {
        fingerprinter.fingerprint(&self.kwargs)
    }
}

fn check(
    kind: BatchKwargsKind,
    family: Option<DatasourceFamily>,
    kwargs: &BatchKwargs,
) -> BatchResult<()> {
    let field = kind.required_field();
    let invalid = |reason: String| BatchError::InvalidBatchKwargs { kind, reason };

    let value = match kwargs.get(field) {
        None | Some(BatchValue::Json(Value::Null)) => {
            return Err(invalid(format!("requires a '{field}' element")));
        }
        Some(v) => v,
    };

    if kind == BatchKwargsKind::InMemory {
        let handle = value
            .as_frame()
            .ok_or_else(|| invalid(format!("'{field}' must be an in-memory frame")))?;
        if let Some(expected) = family.and_then(DatasourceFamily::frame_kind) {
            if handle.kind != expected {
                return Err(invalid(format!(
                    "'{field}' must be a {expected} frame, got a {} frame",
                    handle.kind
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -----------------------------------------------------------------------
    // Policy table
    // -----------------------------------------------------------------------

    #[test]
    fn table_is_ordered_like_the_enum() {
        for kind in BatchKwargsKind::ALL {
            assert_eq!(kind.policy().kind, kind);
        }
    }

    #[test]
    fn required_fields() {
        assert_eq!(BatchKwargsKind::Path.required_field(), "path");
        assert_eq!(BatchKwargsKind::S3.required_field(), "s3");
        assert_eq!(BatchKwargsKind::InMemory.required_field(), "dataset");
        assert_eq!(BatchKwargsKind::Table.required_field(), "table");
        assert_eq!(BatchKwargsKind::Query.required_field(), "query");
    }

    #[test]
    fn family_support() {
        assert!(BatchKwargsKind::Path.supports(DatasourceFamily::Pandas));
        assert!(BatchKwargsKind::Path.supports(DatasourceFamily::SparkDf));
        assert!(!BatchKwargsKind::Path.supports(DatasourceFamily::SqlAlchemy));
        assert!(BatchKwargsKind::Query.supports(DatasourceFamily::SparkDf));
        assert!(!BatchKwargsKind::Table.supports(DatasourceFamily::Pandas));
    }

    #[test]
    fn parse_names() {
        for kind in BatchKwargsKind::ALL {
            assert_eq!(kind.as_str().parse::<BatchKwargsKind>().unwrap(), kind);
        }
        for family in DatasourceFamily::ALL {
            assert_eq!(family.as_str().parse::<DatasourceFamily>().unwrap(), family);
        }
        assert!("csv".parse::<BatchKwargsKind>().is_err());
    }

    // -----------------------------------------------------------------------
    // Required fields
    // -----------------------------------------------------------------------

    #[test]
    fn path_kwargs() {
        let kwargs = BatchKwargs::new()
            .with("path", "/data/orders.csv")
            .with("reader_method", "read_csv");
        let typed = TypedBatchKwargs::new(BatchKwargsKind::Path, kwargs).unwrap();
        assert_eq!(typed.path(), Some("/data/orders.csv"));
        assert_eq!(typed.reader_method(), Some("read_csv"));
        assert_eq!(typed.family(), None);
    }

    #[test]
    fn missing_required_field() {
        let kwargs = BatchKwargs::new().with("table", "orders");
        let err = TypedBatchKwargs::new(BatchKwargsKind::Path, kwargs).unwrap_err();
        assert_eq!(
            err,
            BatchError::InvalidBatchKwargs {
                kind: BatchKwargsKind::Path,
                reason: "requires a 'path' element".into(),
            }
        );
    }

    #[test]
    fn null_required_field_is_missing() {
        let kwargs = BatchKwargs::new().with("query", json!(null));
        assert!(TypedBatchKwargs::new(BatchKwargsKind::Query, kwargs).is_err());
    }

    #[test]
    fn table_and_query_kwargs() {
        let table = TypedBatchKwargs::new(
            BatchKwargsKind::Table,
            BatchKwargs::new().with("table", "orders").with("schema", "public"),
        )
        .unwrap();
        assert_eq!(table.table(), Some("orders"));
        assert_eq!(table.schema(), Some("public"));

        let query = TypedBatchKwargs::new(
            BatchKwargsKind::Query,
            BatchKwargs::new().with("query", "select 1"),
        )
        .unwrap();
        assert_eq!(query.query(), Some("select 1"));
        assert!(TypedBatchKwargs::new(BatchKwargsKind::Table, BatchKwargs::new()).is_err());
    }

    #[test]
    fn s3_kwargs() {
        let typed = TypedBatchKwargs::new(
            BatchKwargsKind::S3,
            BatchKwargs::new().with("s3", "s3://bucket/key.csv"),
        )
        .unwrap();
        assert_eq!(typed.s3(), Some("s3://bucket/key.csv"));
    }

    // -----------------------------------------------------------------------
    // In-memory datasets
    // -----------------------------------------------------------------------

    #[test]
    fn in_memory_requires_a_frame() {
        let kwargs = BatchKwargs::new().with("dataset", json!([1, 2, 3]));
        let err = TypedBatchKwargs::new(BatchKwargsKind::InMemory, kwargs).unwrap_err();
        assert!(matches!(
            err,
            BatchError::InvalidBatchKwargs {
                kind: BatchKwargsKind::InMemory,
                ..
            }
        ));
    }

    #[test]
    fn in_memory_exposes_dataset() {
        let kwargs = BatchKwargs::new().with("dataset", FrameHandle::pandas("orders_df"));
        let typed = TypedBatchKwargs::new(BatchKwargsKind::InMemory, kwargs).unwrap();
        assert_eq!(typed.dataset(), Some(&FrameHandle::pandas("orders_df")));
    }

    #[test]
    fn in_memory_frame_kind_must_match_family() {
        let spark = BatchKwargs::new().with("dataset", FrameHandle::spark("sdf"));
        let err = TypedBatchKwargs::for_family(
            BatchKwargsKind::InMemory,
            DatasourceFamily::Pandas,
            spark.clone(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("must be a pandas frame"));

        let typed = TypedBatchKwargs::for_family(
            BatchKwargsKind::InMemory,
            DatasourceFamily::SparkDf,
            spark,
        )
        .unwrap();
        assert_eq!(typed.family(), Some(DatasourceFamily::SparkDf));
    }

    #[test]
    fn unsupported_family() {
        let kwargs = BatchKwargs::new().with("table", "orders");
        let err =
            TypedBatchKwargs::for_family(BatchKwargsKind::Table, DatasourceFamily::Pandas, kwargs)
                .unwrap_err();
        assert_eq!(
            err,
            BatchError::UnsupportedFamily {
                kind: BatchKwargsKind::Table,
                family: DatasourceFamily::Pandas,
            }
        );
    }

    #[test]
    fn typed_kwargs_fingerprint_like_their_mapping() {
        let fp = Fingerprinter::new();
        let kwargs = BatchKwargs::new().with("table", "orders").with("partition_id", "p1");
        let typed = TypedBatchKwargs::new(BatchKwargsKind::Table, kwargs.clone()).unwrap();
        assert_eq!(
            typed.fingerprint(&fp).unwrap(),
            fp.fingerprint(&kwargs).unwrap()
        );
    }
}
