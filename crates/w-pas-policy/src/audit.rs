//! ---
//! pas_section: "02-permission-resolution"
//! pas_subsection: "module"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Hierarchical permission resolution, role directory, and decision auditing."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::enforce::{Decision, DecisionReason};

/// One authorization decision as recorded in the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// Timestamp when the decision was produced.
    pub timestamp: DateTime<Utc>,
    /// Actor role as supplied; `None` for unauthenticated calls.
    pub actor_role: Option<String>,
    /// Permission key evaluated; `None` when no restriction was declared.
    pub key: Option<String>,
    /// Whether the operation was allowed.
    pub allow: bool,
    /// Reason attached to the decision.
    pub reason: DecisionReason,
    /// SHA-256 over the record contents and the previous hash.
    pub hash: String,
    /// Hash of the previous record (zero string for the first entry).
    pub previous_hash: String,
}

impl DecisionRecord {
    fn compute_hash(
        id: Uuid,
        timestamp: DateTime<Utc>,
        actor_role: Option<&str>,
        key: Option<&str>,
        decision: Decision,
        previous_hash: &str,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(id.as_bytes());
        hasher.update(
            timestamp
                .timestamp_nanos_opt()
                .unwrap_or_default()
                .to_be_bytes(),
        );
        hasher.update(actor_role.unwrap_or_default().as_bytes());
        hasher.update(key.unwrap_or_default().as_bytes());
        hasher.update([decision.allow as u8]);
        hasher.update(decision.reason.as_str().as_bytes());
        hasher.update(previous_hash.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Decision audit trail backed by a newline-delimited JSON file. Each line
/// hashes the previous line's hash into its own so tampering breaks the
/// chain.
#[derive(Debug, Clone)]
pub struct DecisionLog {
    path: PathBuf,
    last_hash: String,
}

impl DecisionLog {
    /// Open (or create) a decision log. Existing entries are scanned to
    /// recover the head hash so appends continue the chain.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut log = Self {
            path: path.clone(),
            last_hash: "0".repeat(64),
        };
        if path.exists() {
            for line in BufReader::new(fs::File::open(&path)?).lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let record: DecisionRecord = serde_json::from_str(&line)?;
                log.last_hash = record.hash.clone();
            }
        }
        Ok(log)
    }

    /// Append one decision to the trail.
    pub fn append(
        &mut self,
        actor_role: Option<&str>,
        key: Option<&str>,
        decision: Decision,
    ) -> Result<DecisionRecord> {
        let id = Uuid::new_v4();
        let timestamp = Utc::now();
        let hash =
            DecisionRecord::compute_hash(id, timestamp, actor_role, key, decision, &self.last_hash);
        let record = DecisionRecord {
            id,
            timestamp,
            actor_role: actor_role.map(str::to_string),
            key: key.map(str::to_string),
            allow: decision.allow,
            reason: decision.reason,
            hash: hash.clone(),
            previous_hash: self.last_hash.clone(),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("unable to open decision log {}", self.path.display()))?;
        file.write_all(serde_json::to_string(&record)?.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()?;
        self.last_hash = hash;
        Ok(record)
    }

    /// Verify chain integrity (detect tampering).
    pub fn verify(&self) -> Result<bool> {
        let mut previous = "0".repeat(64);
        if !self.path.exists() {
            return Ok(true);
        }
        for line in BufReader::new(fs::File::open(&self.path)?).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: DecisionRecord = serde_json::from_str(&line)?;
            let decision = Decision {
                allow: record.allow,
                reason: record.reason,
            };
            let expected = DecisionRecord::compute_hash(
                record.id,
                record.timestamp,
                record.actor_role.as_deref(),
                record.key.as_deref(),
                decision,
                &previous,
            );
            if expected != record.hash {
                return Ok(false);
            }
            previous = record.hash;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek, SeekFrom};
    use tempfile::tempdir;

    fn denied() -> Decision {
        Decision::denied(DecisionReason::PermissionDenied)
    }

    fn granted() -> Decision {
        Decision::allowed(DecisionReason::PermissionGranted)
    }

    #[test]
    fn decision_log_detects_tampering() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("decisions.ndjson");
        let mut log = DecisionLog::new(&path).unwrap();
        log.append(Some("HR Officer"), Some("HR.view"), granted())
            .unwrap();
        log.append(Some("Accountant"), Some("HR.Payroll.view"), denied())
            .unwrap();
        assert!(log.verify().unwrap());

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();
        let mut records: Vec<serde_json::Value> = contents
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        records[1]["allow"] = serde_json::json!(true);
        file.set_len(0).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        for value in records {
            file.write_all(value.to_string().as_bytes()).unwrap();
            file.write_all(b"\n").unwrap();
        }
        assert!(!DecisionLog::new(&path).unwrap().verify().unwrap());
    }

    #[test]
    fn reopened_log_continues_the_chain() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("decisions.ndjson");
        {
            let mut log = DecisionLog::new(&path).unwrap();
            log.append(Some("admin"), Some("Admin.edit"), granted())
                .unwrap();
        }
        let mut reopened = DecisionLog::new(&path).unwrap();
        reopened.append(None, Some("HR.view"), denied()).unwrap();
        assert!(reopened.verify().unwrap());
    }
}
