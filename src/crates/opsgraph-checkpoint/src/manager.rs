//! Directory-backed checkpoint and execution-state persistence
//!
//! [`CheckpointManager`] owns two directories: a state directory holding one JSON file per
//! execution (`<executionID>.json`), and a checkpoint directory holding one file per checkpoint
//! (`cp-<executionID>-<stage>-<unixSeconds>.json`, optionally gzip-compressed). Both directories
//! default under the user's home directory but can always be overridden per instance — there is no
//! process-wide singleton.
//!
//! # Locking
//!
//! The manager holds its own lock over its directory view (creation, listing, pruning); it never
//! takes the caller's [`ExecutionState`] lock itself. [`CheckpointManager::create_checkpoint`] is
//! given an already-cloned state snapshot by its caller — cloning a live state under its own lock is
//! the caller's responsibility, not this manager's, so a checkpoint write never blocks a concurrent
//! state update.
//!
//! # Example
//!
//! ```rust,no_run
//! use opsgraph_checkpoint::manager::CheckpointManager;
//! use opsgraph_checkpoint::state::ExecutionState;
//! use serde_json::json;
//!
//! let manager = CheckpointManager::new("/tmp/opsgraph/state", "/tmp/opsgraph/checkpoints", 10);
//! let mut state = ExecutionState::new("exec-1", "plan-1", "proj-1", 3);
//! state.register_operation("op-a");
//! manager.save_state(&state)?;
//! let checkpoint = manager.create_checkpoint(&state, json!({}), 0, None, None)?;
//! assert!(checkpoint.is_valid());
//! # Ok::<(), opsgraph_checkpoint::error::CheckpointError>(())
//! ```

use crate::checkpoint::Checkpoint;
use crate::error::{CheckpointError, Result};
use crate::state::ExecutionState;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

fn default_state_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".matlas")
        .join("state")
}

fn default_checkpoint_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".matlas")
        .join("checkpoints")
}

/// Configuration for [`CheckpointManager::with_config`]. Mirrors the constructor arguments of
/// [`CheckpointManager::new`]/[`CheckpointManager::with_defaults`]/[`CheckpointManager::with_compression`]
/// as a plain struct so callers wiring the manager up from a config file or CLI flags have a single
/// value to deserialize instead of four separate fields.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CheckpointConfig {
    pub state_dir: PathBuf,
    pub checkpoint_dir: PathBuf,
    pub max_checkpoints: usize,
    pub compress: bool,
    /// Prune down to `max_checkpoints` after every [`CheckpointManager::create_checkpoint`]. When
    /// `false`, checkpoints accumulate until a caller prunes manually — useful for callers who want
    /// to inspect every checkpoint written during a debugging session.
    pub auto_prune: bool,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            checkpoint_dir: default_checkpoint_dir(),
            max_checkpoints: 10,
            compress: false,
            auto_prune: true,
        }
    }
}

impl CheckpointConfig {
    pub fn with_state_dir(mut self, state_dir: impl Into<PathBuf>) -> Self {
        self.state_dir = state_dir.into();
        self
    }

    pub fn with_checkpoint_dir(mut self, checkpoint_dir: impl Into<PathBuf>) -> Self {
        self.checkpoint_dir = checkpoint_dir.into();
        self
    }

    pub fn with_max_checkpoints(mut self, max_checkpoints: usize) -> Self {
        self.max_checkpoints = max_checkpoints;
        self
    }

    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_auto_prune(mut self, auto_prune: bool) -> Self {
        self.auto_prune = auto_prune;
        self
    }
}

/// Directory-backed persistence for execution state and checkpoints.
///
/// Construct with [`CheckpointManager::new`] for explicit directories,
/// [`CheckpointManager::with_defaults`] to use `~/.matlas/state` and `~/.matlas/checkpoints`, or
/// [`CheckpointManager::with_config`] for the full [`CheckpointConfig`].
pub struct CheckpointManager {
    state_dir: PathBuf,
    checkpoint_dir: PathBuf,
    max_checkpoints: usize,
    compress: bool,
    auto_prune: bool,
    /// Serializes directory operations (listing, pruning) against concurrent managers in the same
    /// process; filesystem-level atomicity of individual writes still comes from the rename-based
    /// write path below.
    lock: RwLock<()>,
}

impl CheckpointManager {
    pub fn new(
        state_dir: impl Into<PathBuf>,
        checkpoint_dir: impl Into<PathBuf>,
        max_checkpoints: usize,
    ) -> Self {
        Self {
            state_dir: state_dir.into(),
            checkpoint_dir: checkpoint_dir.into(),
            max_checkpoints,
            compress: false,
            auto_prune: true,
            lock: RwLock::new(()),
        }
    }

    /// `~/.matlas/state` / `~/.matlas/checkpoints`, 10 retained checkpoints, no compression.
    pub fn with_defaults() -> Self {
        Self::new(default_state_dir(), default_checkpoint_dir(), 10)
    }

    /// Construct a manager from a [`CheckpointConfig`] in one call.
    pub fn with_config(config: CheckpointConfig) -> Self {
        Self {
            state_dir: config.state_dir,
            checkpoint_dir: config.checkpoint_dir,
            max_checkpoints: config.max_checkpoints,
            compress: config.compress,
            auto_prune: config.auto_prune,
            lock: RwLock::new(()),
        }
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    fn ensure_dir(dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o755);
            fs::set_permissions(dir, perms)?;
        }
        Ok(())
    }

    fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
        let tmp_path = path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o644))?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    fn gzip(bytes: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes)?;
        Ok(encoder.finish()?)
    }

    fn gunzip(bytes: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = GzDecoder::new(bytes);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(out)
    }

    /// True when the first two bytes of `bytes` are the gzip magic number.
    pub fn is_compressed(bytes: &[u8]) -> bool {
        bytes.len() >= 2 && bytes[0] == GZIP_MAGIC[0] && bytes[1] == GZIP_MAGIC[1]
    }

    fn state_path(&self, execution_id: &str) -> PathBuf {
        self.state_dir.join(format!("{execution_id}.json"))
    }

    /// Serialize and atomically write an execution state snapshot to `<stateDir>/<executionID>.json`.
    pub fn save_state(&self, state: &ExecutionState) -> Result<()> {
        let _guard = self.lock.write().expect("checkpoint manager lock poisoned");
        Self::ensure_dir(&self.state_dir)?;
        let bytes = serde_json::to_vec_pretty(state)?;
        Self::write_atomic(&self.state_path(&state.execution_id), &bytes)
    }

    pub fn load_state(&self, execution_id: &str) -> Result<ExecutionState> {
        let _guard = self.lock.read().expect("checkpoint manager lock poisoned");
        let path = self.state_path(execution_id);
        let bytes = fs::read(&path)
            .map_err(|_| CheckpointError::StateNotFound(execution_id.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn list_executions(&self) -> Result<Vec<String>> {
        let _guard = self.lock.read().expect("checkpoint manager lock poisoned");
        if !self.state_dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.state_dir)? {
            let entry = entry?;
            if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
                if entry.path().extension().and_then(|e| e.to_str()) == Some("json") {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    pub fn delete_state(&self, execution_id: &str) -> Result<()> {
        let _guard = self.lock.write().expect("checkpoint manager lock poisoned");
        let path = self.state_path(execution_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Clone the given state, write it (and the opaque graph snapshot) to a new checkpoint file,
    /// update the manager's view of `<executionID>`'s checkpoints, and prune down to
    /// `max_checkpoints`. Callers pass `state` already cloned under its own lock — this method never
    /// touches the caller's lock.
    pub fn create_checkpoint(
        &self,
        state: &ExecutionState,
        graph_snapshot: Value,
        stage: usize,
        operation_id: Option<String>,
        reason: Option<String>,
    ) -> Result<Checkpoint> {
        let _guard = self.lock.write().expect("checkpoint manager lock poisoned");
        Self::ensure_dir(&self.checkpoint_dir)?;

        let mut checkpoint = Checkpoint::new(
            state.execution_id.clone(),
            state.plan_id.clone(),
            state.deep_clone(),
            graph_snapshot,
            stage,
        );
        if let Some(op) = operation_id {
            checkpoint = checkpoint.with_operation_id(op);
        }
        if let Some(r) = reason {
            checkpoint = checkpoint.with_reason(r);
        }
        if !checkpoint.is_valid() {
            return Err(CheckpointError::Invalid(format!(
                "checkpoint for execution {} has no registered operations",
                checkpoint.execution_id
            )));
        }

        let mut bytes = serde_json::to_vec(&checkpoint)?;
        if self.compress {
            bytes = Self::gzip(&bytes)?;
            checkpoint.compressed = true;
        }
        checkpoint.file_size = bytes.len() as u64;

        let extension = if self.compress { "json.gz" } else { "json" };
        let path = self
            .checkpoint_dir
            .join(format!("{}.{extension}", checkpoint.checkpoint_id));
        Self::write_atomic(&path, &bytes)?;

        if self.auto_prune {
            if let Err(err) = self.prune_checkpoints(&checkpoint.execution_id) {
                tracing::warn!(
                    execution_id = %checkpoint.execution_id,
                    error = %err,
                    "failed to prune old checkpoints"
                );
            }
        }

        Ok(checkpoint)
    }

    /// Checkpoint file paths for one execution, newest first.
    fn checkpoint_files(&self, execution_id: &str) -> Result<Vec<(PathBuf, i64)>> {
        if !self.checkpoint_dir.exists() {
            return Ok(Vec::new());
        }
        let prefix = format!("cp-{execution_id}-");
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.checkpoint_dir)? {
            let entry = entry?;
            let path = entry.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n,
                None => continue,
            };
            if !name.starts_with(&prefix) {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH)
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs() as i64;
            files.push((path, modified));
        }
        files.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(files)
    }

    /// List checkpoint IDs for `execution_id`, newest-first. Pure directory enumeration; does not
    /// read checkpoint contents.
    pub fn list_checkpoints(&self, execution_id: &str) -> Result<Vec<String>> {
        let _guard = self.lock.read().expect("checkpoint manager lock poisoned");
        Ok(self
            .checkpoint_files(execution_id)?
            .into_iter()
            .filter_map(|(path, _)| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.trim_end_matches(".gz").trim_end_matches(".json").to_string())
            })
            .collect())
    }

    fn prune_checkpoints(&self, execution_id: &str) -> Result<()> {
        let files = self.checkpoint_files(execution_id)?;
        for (path, _) in files.into_iter().skip(self.max_checkpoints) {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn read_checkpoint_file(path: &Path) -> Result<Checkpoint> {
        let bytes = fs::read(path)?;
        let bytes = if Self::is_compressed(&bytes) {
            Self::gunzip(&bytes)?
        } else {
            bytes
        };
        let checkpoint: Checkpoint = serde_json::from_slice(&bytes)?;
        Ok(checkpoint)
    }

    /// Load the newest checkpoint for `execution_id`.
    pub fn load_latest_checkpoint(&self, execution_id: &str) -> Result<Checkpoint> {
        let _guard = self.lock.read().expect("checkpoint manager lock poisoned");
        let files = self.checkpoint_files(execution_id)?;
        let (path, _) = files
            .into_iter()
            .next()
            .ok_or_else(|| CheckpointError::NotFound(execution_id.to_string()))?;
        Self::read_checkpoint_file(&path)
    }

    /// Reject checkpoints with empty IDs or zero registered operations. A thin wrapper over
    /// [`Checkpoint::is_valid`] kept on the manager so callers validating a checkpoint they loaded
    /// from disk don't need to import the checkpoint module directly.
    pub fn validate_checkpoint(checkpoint: &Checkpoint) -> Result<()> {
        if checkpoint.is_valid() {
            Ok(())
        } else {
            Err(CheckpointError::Invalid(format!(
                "checkpoint {} failed validation",
                checkpoint.checkpoint_id
            )))
        }
    }

    /// Load the newest checkpoint for `execution_id` and return its cloned state (forced back to
    /// `Running`) and opaque graph snapshot.
    pub fn restore_from_checkpoint(
        &self,
        execution_id: &str,
    ) -> Result<(ExecutionState, Value)> {
        let checkpoint = self.load_latest_checkpoint(execution_id)?;
        Self::validate_checkpoint(&checkpoint)?;
        let mut state = checkpoint.state;
        state.set_status(crate::state::ExecutionStatus::Running);
        Ok((state, checkpoint.graph_snapshot))
    }

    /// Checkpoint-trigger predicate: true at every stage boundary, before every high-risk operation,
    /// and every 10 completed operations.
    pub fn should_create_checkpoint(
        state: &ExecutionState,
        stage_completed: bool,
        high_risk_op: bool,
    ) -> bool {
        stage_completed || high_risk_op || (state.completed_ops > 0 && state.completed_ops % 10 == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn manager() -> (CheckpointManager, TempDir) {
        let dir = TempDir::new().unwrap();
        let manager = CheckpointManager::new(
            dir.path().join("state"),
            dir.path().join("checkpoints"),
            2,
        );
        (manager, dir)
    }

    fn state_with_ops(n: usize) -> ExecutionState {
        let mut state = ExecutionState::new("exec-1", "plan-1", "proj-1", 3);
        for i in 0..n {
            state.register_operation(format!("op-{i}"));
        }
        state
    }

    #[test]
    fn save_and_load_state_roundtrips() {
        let (manager, _dir) = manager();
        let state = state_with_ops(3);
        manager.save_state(&state).unwrap();
        let loaded = manager.load_state("exec-1").unwrap();
        assert_eq!(loaded.execution_id, state.execution_id);
        assert_eq!(loaded.total_ops, 3);
    }

    #[test]
    fn load_missing_state_is_not_found() {
        let (manager, _dir) = manager();
        let err = manager.load_state("missing").unwrap_err();
        assert!(matches!(err, CheckpointError::StateNotFound(_)));
    }

    #[test]
    fn create_checkpoint_rejects_empty_state() {
        let (manager, _dir) = manager();
        let state = ExecutionState::new("exec-1", "plan-1", "proj-1", 1);
        let err = manager
            .create_checkpoint(&state, json!({}), 0, None, None)
            .unwrap_err();
        assert!(matches!(err, CheckpointError::Invalid(_)));
    }

    #[test]
    fn create_checkpoint_writes_and_lists() {
        let (manager, _dir) = manager();
        let state = state_with_ops(1);
        let checkpoint = manager
            .create_checkpoint(&state, json!({"nodes": []}), 0, None, Some("stage boundary".into()))
            .unwrap();
        assert!(!checkpoint.compressed);
        assert!(checkpoint.file_size > 0);

        let listed = manager.list_checkpoints("exec-1").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], checkpoint.checkpoint_id);
    }

    #[test]
    fn pruning_keeps_only_newest_n() {
        let (manager, _dir) = manager();
        let state = state_with_ops(1);
        for stage in 0..5 {
            manager
                .create_checkpoint(&state, json!({}), stage, None, None)
                .unwrap();
        }
        let listed = manager.list_checkpoints("exec-1").unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[test]
    fn with_config_disables_auto_prune() {
        let dir = TempDir::new().unwrap();
        let config = CheckpointConfig::default()
            .with_state_dir(dir.path().join("state"))
            .with_checkpoint_dir(dir.path().join("checkpoints"))
            .with_max_checkpoints(2)
            .with_auto_prune(false);
        let manager = CheckpointManager::with_config(config);
        let state = state_with_ops(1);
        for stage in 0..5 {
            manager.create_checkpoint(&state, json!({}), stage, None, None).unwrap();
        }
        let listed = manager.list_checkpoints("exec-1").unwrap();
        assert_eq!(listed.len(), 5);
    }

    #[test]
    fn compressed_roundtrip_detects_gzip_magic() {
        let dir = TempDir::new().unwrap();
        let manager = CheckpointManager::new(
            dir.path().join("state"),
            dir.path().join("checkpoints"),
            10,
        )
        .with_compression(true);
        let state = state_with_ops(1);
        let checkpoint = manager
            .create_checkpoint(&state, json!({"nodes": []}), 0, None, None)
            .unwrap();
        assert!(checkpoint.compressed);

        let (restored, snapshot) = manager.restore_from_checkpoint("exec-1").unwrap();
        assert_eq!(restored.execution_id, "exec-1");
        assert_eq!(restored.status, crate::state::ExecutionStatus::Running);
        assert_eq!(snapshot, json!({"nodes": []}));
    }

    #[test]
    fn should_create_checkpoint_triggers() {
        let mut state = state_with_ops(20);
        for i in 0..10 {
            state.update_operation_state(&format!("op-{i}"), crate::state::OperationStatus::Completed, None);
        }
        assert!(CheckpointManager::should_create_checkpoint(&state, false, false));
        assert!(CheckpointManager::should_create_checkpoint(&state, true, false));
        assert!(CheckpointManager::should_create_checkpoint(&state, false, true));

        state.update_operation_state("op-10", crate::state::OperationStatus::Completed, None);
        assert!(!CheckpointManager::should_create_checkpoint(&state, false, false));
    }
}
