//! SQLite storage backend

use super::traits::{
    ArtifactRecord, EngagementStore, OpenStore, StorageError, StorageResult, UnreadableArtifact,
};
use crate::clone::CloneSummary;
use crate::lineage::LineageEdge;
use crate::model::{
    Artifact, ArtifactId, ArtifactStatus, Client, ClientId, Engagement, EngagementId,
    EngagementStatus, NewArtifact, NewEngagement,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Raw artifact columns, in `ARTIFACT_COLUMNS` order
type ArtifactRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    String,
    u32,
    String,
    String,
);

const ARTIFACT_COLUMNS: &str =
    "id, engagement_id, template_id, title, content, status, version, metadata_json, created_at";

/// SQLite-backed engagement store
///
/// One database file with tables for clients, engagements, artifacts and
/// lineage edges. Thread-safe via internal mutex on the connection. The
/// `lineage_edges` keys make the database reject duplicate edges and second
/// parents on its own.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS engagements (
                id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL,
                name TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (client_id) REFERENCES clients(id)
            );

            CREATE TABLE IF NOT EXISTS artifacts (
                id TEXT PRIMARY KEY,
                engagement_id TEXT NOT NULL,
                template_id TEXT NOT NULL,
                title TEXT NOT NULL,
                content TEXT,
                status TEXT NOT NULL,
                version INTEGER NOT NULL,
                metadata_json TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (engagement_id) REFERENCES engagements(id)
            );

            CREATE INDEX IF NOT EXISTS idx_artifacts_engagement
                ON artifacts(engagement_id, status);

            -- Append-only; never updated or deleted
            CREATE TABLE IF NOT EXISTS lineage_edges (
                parent_id TEXT NOT NULL,
                child_id TEXT NOT NULL UNIQUE,
                cloned_at TEXT NOT NULL,
                summary_json TEXT NOT NULL,
                PRIMARY KEY (parent_id, child_id)
            );

            CREATE INDEX IF NOT EXISTS idx_lineage_parent
                ON lineage_edges(parent_id);

            PRAGMA foreign_keys = ON;
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn parse_time(s: &str) -> StorageResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| StorageError::DateParse(e.to_string()))
    }

    fn read_artifact_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ArtifactRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
            row.get(8)?,
        ))
    }

    fn row_to_artifact(row: ArtifactRow) -> StorageResult<Artifact> {
        let (
            id,
            engagement_id,
            template_id,
            title,
            content,
            status,
            version,
            metadata_json,
            created_at,
        ) = row;
        Ok(Artifact {
            id: ArtifactId::from_string(id),
            engagement_id: EngagementId::from_string(engagement_id),
            template_id,
            title,
            content,
            status: status.parse().map_err(StorageError::InvalidValue)?,
            version,
            metadata: serde_json::from_str(&metadata_json)?,
            created_at: Self::parse_time(&created_at)?,
        })
    }

    fn row_to_edge(
        parent_id: String,
        child_id: String,
        cloned_at: String,
        summary_json: String,
    ) -> StorageResult<LineageEdge> {
        let summary: CloneSummary = serde_json::from_str(&summary_json)?;
        Ok(LineageEdge {
            parent_engagement_id: EngagementId::from_string(parent_id),
            child_engagement_id: EngagementId::from_string(child_id),
            cloned_at: Self::parse_time(&cloned_at)?,
            summary,
        })
    }

    fn query_edges(conn: &Connection, sql: &str, key: &str) -> StorageResult<Vec<LineageEdge>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![key], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?;
        let mut edges = Vec::new();
        for row in rows {
            let (parent, child, cloned_at, summary) = row?;
            edges.push(Self::row_to_edge(parent, child, cloned_at, summary)?);
        }
        Ok(edges)
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl EngagementStore for SqliteStore {
    // === Clients ===

    fn create_client(&self, name: &str) -> StorageResult<Client> {
        let client = Client {
            id: ClientId::generate(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.conn()?.execute(
            "INSERT INTO clients (id, name, created_at) VALUES (?1, ?2, ?3)",
            params![client.id.as_str(), client.name, client.created_at.to_rfc3339()],
        )?;
        Ok(client)
    }

    fn get_client(&self, id: &ClientId) -> StorageResult<Option<Client>> {
        let conn = self.conn()?;
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT name, created_at FROM clients WHERE id = ?1",
                params![id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((name, created_at)) = row else {
            return Ok(None);
        };
        Ok(Some(Client {
            id: id.clone(),
            name,
            created_at: Self::parse_time(&created_at)?,
        }))
    }

    // === Engagements ===

    fn get_engagement(&self, id: &EngagementId) -> StorageResult<Option<Engagement>> {
        let conn = self.conn()?;
        let row: Option<(String, String, String, String)> = conn
            .query_row(
                "SELECT client_id, name, status, created_at FROM engagements WHERE id = ?1",
                params![id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let Some((client_id, name, status, created_at)) = row else {
            return Ok(None);
        };
        Ok(Some(Engagement {
            id: id.clone(),
            client_id: ClientId::from_string(client_id),
            name,
            status: status
                .parse::<EngagementStatus>()
                .map_err(StorageError::InvalidValue)?,
            created_at: Self::parse_time(&created_at)?,
        }))
    }

    fn create_engagement(&self, fields: NewEngagement) -> StorageResult<Engagement> {
        let conn = self.conn()?;
        let client_exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM clients WHERE id = ?1",
            params![fields.client_id.as_str()],
            |row| row.get(0),
        )?;
        if !client_exists {
            return Err(StorageError::ClientNotFound(fields.client_id.to_string()));
        }

        let engagement = Engagement {
            id: EngagementId::generate(),
            client_id: fields.client_id,
            name: fields.name,
            status: fields.status,
            created_at: Utc::now(),
        };
        conn.execute(
            "INSERT INTO engagements (id, client_id, name, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                engagement.id.as_str(),
                engagement.client_id.as_str(),
                engagement.name,
                engagement.status.as_str(),
                engagement.created_at.to_rfc3339(),
            ],
        )?;
        Ok(engagement)
    }

    // === Artifacts ===

    fn list_artifacts(
        &self,
        engagement_id: &EngagementId,
        exclude_statuses: &[ArtifactStatus],
    ) -> StorageResult<Vec<Artifact>> {
        self.scan_artifacts(engagement_id, exclude_statuses)?
            .into_iter()
            .map(|record| {
                record.map_err(|bad| {
                    StorageError::InvalidValue(format!("artifact {}: {}", bad.id, bad.reason))
                })
            })
            .collect()
    }

    fn scan_artifacts(
        &self,
        engagement_id: &EngagementId,
        exclude_statuses: &[ArtifactStatus],
    ) -> StorageResult<Vec<ArtifactRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM artifacts WHERE engagement_id = ?1 ORDER BY rowid",
            ARTIFACT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![engagement_id.as_str()], |row| {
            let id: String = row.get(0)?;
            let template_id: String = row.get(2)?;
            let status: String = row.get(5)?;
            let columns = Self::read_artifact_row(row);
            Ok((id, template_id, status, columns))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, template_id, status, columns) = row?;
            if exclude_statuses.iter().any(|s| s.as_str() == status) {
                continue;
            }
            let decoded = columns
                .map_err(StorageError::from)
                .and_then(Self::row_to_artifact);
            records.push(decoded.map_err(|err| {
                tracing::warn!(artifact = %id, error = %err, "undecodable artifact row");
                UnreadableArtifact {
                    id: ArtifactId::from_string(id),
                    template_id,
                    reason: err.to_string(),
                }
            }));
        }
        Ok(records)
    }

    fn create_artifact(&self, fields: NewArtifact) -> StorageResult<Artifact> {
        let conn = self.conn()?;
        let engagement_exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM engagements WHERE id = ?1",
            params![fields.engagement_id.as_str()],
            |row| row.get(0),
        )?;
        if !engagement_exists {
            return Err(StorageError::EngagementNotFound(
                fields.engagement_id.to_string(),
            ));
        }

        let artifact = Artifact {
            id: ArtifactId::generate(),
            engagement_id: fields.engagement_id,
            template_id: fields.template_id,
            title: fields.title,
            content: fields.content,
            status: fields.status,
            version: fields.version,
            metadata: fields.metadata,
            created_at: Utc::now(),
        };
        conn.execute(
            &format!(
                "INSERT INTO artifacts ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                ARTIFACT_COLUMNS
            ),
            params![
                artifact.id.as_str(),
                artifact.engagement_id.as_str(),
                artifact.template_id,
                artifact.title,
                artifact.content,
                artifact.status.as_str(),
                artifact.version,
                serde_json::to_string(&artifact.metadata)?,
                artifact.created_at.to_rfc3339(),
            ],
        )?;
        Ok(artifact)
    }

    // === Lineage ===

    fn record_lineage_edge(&self, edge: &LineageEdge) -> StorageResult<()> {
        let conn = self.conn()?;
        let existing_parent: Option<String> = conn
            .query_row(
                "SELECT parent_id FROM lineage_edges WHERE child_id = ?1",
                params![edge.child_engagement_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let duplicate = || StorageError::DuplicateEdge {
            parent: edge.parent_engagement_id.to_string(),
            child: edge.child_engagement_id.to_string(),
        };

        if let Some(existing_parent) = existing_parent {
            if existing_parent == edge.parent_engagement_id.as_str() {
                return Err(duplicate());
            }
            return Err(StorageError::ParentAlreadyRecorded {
                child: edge.child_engagement_id.to_string(),
                existing_parent,
            });
        }

        let inserted = conn.execute(
            "INSERT INTO lineage_edges (parent_id, child_id, cloned_at, summary_json) VALUES (?1, ?2, ?3, ?4)",
            params![
                edge.parent_engagement_id.as_str(),
                edge.child_engagement_id.as_str(),
                edge.cloned_at.to_rfc3339(),
                serde_json::to_string(&edge.summary)?,
            ],
        );
        match inserted {
            Ok(_) => Ok(()),
            // Another connection raced us to the same child
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(duplicate())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn edges_by_parent(&self, parent_id: &EngagementId) -> StorageResult<Vec<LineageEdge>> {
        let conn = self.conn()?;
        Self::query_edges(
            &conn,
            "SELECT parent_id, child_id, cloned_at, summary_json FROM lineage_edges WHERE parent_id = ?1 ORDER BY rowid",
            parent_id.as_str(),
        )
    }

    fn edge_by_child(&self, child_id: &EngagementId) -> StorageResult<Option<LineageEdge>> {
        let conn = self.conn()?;
        let mut edges = Self::query_edges(
            &conn,
            "SELECT parent_id, child_id, cloned_at, summary_json FROM lineage_edges WHERE child_id = ?1",
            child_id.as_str(),
        )?;
        Ok(edges.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArtifactMetadata;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn seed_engagement(store: &SqliteStore) -> Engagement {
        let client = store.create_client("Acme").unwrap();
        store
            .create_engagement(NewEngagement::draft(client.id, "Discovery 2026"))
            .unwrap()
    }

    fn edge(parent: &str, child: &str) -> LineageEdge {
        LineageEdge {
            parent_engagement_id: EngagementId::from(parent),
            child_engagement_id: EngagementId::from(child),
            cloned_at: Utc::now(),
            summary: CloneSummary {
                artifacts_cloned: 2,
                cleared_fields: vec!["client_name".into()],
                ..Default::default()
            },
        }
    }

    #[test]
    fn client_and_engagement_round_trip() {
        let store = create_test_store();
        let engagement = seed_engagement(&store);

        let loaded = store.get_engagement(&engagement.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Discovery 2026");
        assert_eq!(loaded.status, EngagementStatus::Draft);

        let client = store.get_client(&engagement.client_id).unwrap().unwrap();
        assert_eq!(client.name, "Acme");

        assert!(store
            .get_engagement(&EngagementId::from("missing"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn artifact_persistence_keeps_metadata_and_order() {
        let store = create_test_store();
        let engagement = seed_engagement(&store);

        let mut first = NewArtifact::draft(
            engagement.id.clone(),
            "discovery",
            "Notes",
            Some(r#"{"client_name":"Acme"}"#.into()),
        );
        first.metadata = ArtifactMetadata {
            cloned_from: Some(ArtifactId::from("origin")),
            cloned_at: Some(Utc::now()),
            ..Default::default()
        };
        store.create_artifact(first).unwrap();
        store
            .create_artifact(
                NewArtifact::draft(engagement.id.clone(), "roi-analysis", "ROI", None)
                    .with_status(ArtifactStatus::Archived),
            )
            .unwrap();

        let all = store.list_artifacts(&engagement.id, &[]).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "Notes");
        assert_eq!(all[0].metadata.cloned_from, Some(ArtifactId::from("origin")));
        assert_eq!(all[1].content, None);

        let live = store
            .list_artifacts(&engagement.id, &[ArtifactStatus::Archived])
            .unwrap();
        assert_eq!(live.len(), 1);
    }

    #[test]
    fn corrupt_artifact_row_is_reported_in_place() {
        let store = create_test_store();
        let engagement = seed_engagement(&store);
        let good = store
            .create_artifact(NewArtifact::draft(engagement.id.clone(), "discovery", "Good", None))
            .unwrap();
        let bad = store
            .create_artifact(NewArtifact::draft(engagement.id.clone(), "roi-analysis", "Bad", None))
            .unwrap();
        store
            .conn()
            .unwrap()
            .execute(
                "UPDATE artifacts SET metadata_json = 'not json' WHERE id = ?1",
                params![bad.id.as_str()],
            )
            .unwrap();

        let records = store.scan_artifacts(&engagement.id, &[]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].as_ref().unwrap().id, good.id);
        let unreadable = records[1].as_ref().unwrap_err();
        assert_eq!(unreadable.id, bad.id);
        assert_eq!(unreadable.template_id, "roi-analysis");

        assert!(matches!(
            store.list_artifacts(&engagement.id, &[]),
            Err(StorageError::InvalidValue(_))
        ));
    }

    #[test]
    fn clone_skips_corrupt_artifact_and_keeps_the_rest() {
        use crate::classify::FieldClassifier;
        use crate::clone::{CloneOrchestrator, CloneRequest};
        use crate::config::FieldCatalog;
        use crate::sanitize::ContentSanitizer;
        use std::sync::Arc;

        let store = Arc::new(create_test_store());
        let engagement = seed_engagement(&store);
        let target = store.create_client("Globex").unwrap();
        store
            .create_artifact(NewArtifact::draft(
                engagement.id.clone(),
                "discovery",
                "Good",
                Some(r#"{"client_name":"Acme"}"#.into()),
            ))
            .unwrap();
        let bad = store
            .create_artifact(NewArtifact::draft(engagement.id.clone(), "discovery", "Bad", None))
            .unwrap();
        store
            .conn()
            .unwrap()
            .execute(
                "UPDATE artifacts SET status = 'shredded' WHERE id = ?1",
                params![bad.id.as_str()],
            )
            .unwrap();

        let sanitizer =
            ContentSanitizer::new(FieldClassifier::new(Arc::new(FieldCatalog::builtin())));
        let orchestrator = CloneOrchestrator::new(store.clone(), sanitizer);
        let result = orchestrator
            .clone_engagement(&CloneRequest::new(engagement.id.clone(), target.id))
            .unwrap();

        assert_eq!(result.summary.artifacts_cloned, 1);
        assert_eq!(result.summary.artifacts_skipped, 1);
        assert!(result.summary.warnings[0].contains(bad.id.as_str()));
        assert_eq!(
            store
                .list_artifacts(&result.new_engagement_id, &[])
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn create_artifact_for_unknown_engagement_fails() {
        let store = create_test_store();
        let result = store.create_artifact(NewArtifact::draft(
            EngagementId::from("nope"),
            "discovery",
            "x",
            None,
        ));
        assert!(matches!(result, Err(StorageError::EngagementNotFound(_))));
    }

    #[test]
    fn lineage_edges_round_trip() {
        let store = create_test_store();
        store.record_lineage_edge(&edge("p", "c1")).unwrap();
        store.record_lineage_edge(&edge("p", "c2")).unwrap();

        let children = store.edges_by_parent(&EngagementId::from("p")).unwrap();
        let ids: Vec<_> = children
            .iter()
            .map(|e| e.child_engagement_id.as_str())
            .collect();
        assert_eq!(ids, vec!["c1", "c2"]);
        assert_eq!(children[0].summary.artifacts_cloned, 2);

        let parent = store.edge_by_child(&EngagementId::from("c2")).unwrap().unwrap();
        assert_eq!(parent.parent_engagement_id.as_str(), "p");
    }

    #[test]
    fn duplicate_and_second_parent_rejected() {
        let store = create_test_store();
        store.record_lineage_edge(&edge("p", "c")).unwrap();
        assert!(matches!(
            store.record_lineage_edge(&edge("p", "c")),
            Err(StorageError::DuplicateEdge { .. })
        ));
        assert!(matches!(
            store.record_lineage_edge(&edge("other", "c")),
            Err(StorageError::ParentAlreadyRecorded { .. })
        ));
    }

    #[test]
    fn reopen_from_disk_preserves_edges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cloneline.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.record_lineage_edge(&edge("p", "c")).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert!(store.edge_by_child(&EngagementId::from("c")).unwrap().is_some());
    }
}
