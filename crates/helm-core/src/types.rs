//! Resource records exchanged with the agent backend.
//!
//! All entities are plain JSON records; the console owns no persistence.
//! Wire names are snake_case with epoch-millisecond timestamps, except
//! [`ChatMessage`] which keeps the chat API's camelCase `createdAt`.
//!
//! Identity is the server-issued `id` everywhere except chat messages,
//! where the client mints ids locally (the transcript never round-trips
//! through the backend).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current UTC time as epoch milliseconds.
#[must_use]
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Mint a client-side id (UUID v7, time-ordered).
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Todos / Plans
// ─────────────────────────────────────────────────────────────────────────────

/// A scheduled task item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Server-issued id.
    pub id: String,
    /// Owning plan, if the item was created under one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    /// Short title.
    pub title: String,
    /// Optional longer description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Completion flag, flipped via the dedicated toggle endpoint.
    pub completed: bool,
    /// Session the item belongs to, if scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Creation time (epoch ms).
    pub created_at: i64,
    /// Last update time (epoch ms).
    pub updated_at: i64,
}

/// Fields for `POST /api/todos`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TodoCreate {
    /// Short title.
    pub title: String,
    /// Optional longer description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Session to scope the item to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Plan to attach the item to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
}

/// Changed fields for `PUT /api/todos/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TodoUpdate {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New completion state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// A plan item: same shape as a todo, held in its own list and mutated
/// through the `/api/plans` family.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanItem {
    /// Server-issued id.
    pub id: String,
    /// Short title.
    pub title: String,
    /// Optional longer description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Completion flag.
    pub completed: bool,
    /// Session the item belongs to, if scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Creation time (epoch ms).
    pub created_at: i64,
    /// Last update time (epoch ms).
    pub updated_at: i64,
}

/// Fields for `POST /api/plans`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanCreate {
    /// Short title.
    pub title: String,
    /// Optional longer description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Session to scope the item to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Changed fields for `PUT /api/plans/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanUpdate {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New completion state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Backlog
// ─────────────────────────────────────────────────────────────────────────────

/// An unscheduled item awaiting promotion to a todo.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BacklogItem {
    /// Server-issued id.
    pub id: String,
    /// Short title.
    pub title: String,
    /// Optional longer description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation time (epoch ms).
    pub created_at: i64,
    /// Last update time (epoch ms).
    pub updated_at: i64,
}

/// Fields for `POST /api/backlogs`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BacklogCreate {
    /// Short title.
    pub title: String,
    /// Optional longer description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Changed fields for `PUT /api/backlogs/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BacklogUpdate {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Approvals
// ─────────────────────────────────────────────────────────────────────────────

/// Approval status. Transitions only ever leave `Pending`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Awaiting an operator decision.
    Pending,
    /// Accepted; terminal.
    Approved,
    /// Declined; terminal.
    Rejected,
}

impl ApprovalStatus {
    /// Whether this status admits no further transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

/// An operator decision on a pending approval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Allow the gated function call.
    Approve,
    /// Refuse the gated function call.
    Reject,
}

/// Attempted transition out of a terminal approval status.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("approval {id} was already decided ({status:?})")]
pub struct AlreadyDecided {
    /// The approval that refused the decision.
    pub id: String,
    /// Its terminal status.
    pub status: ApprovalStatus,
}

/// A human-in-the-loop gate pausing agent execution on a function call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    /// Server-issued id.
    pub id: String,
    /// Session the gated call belongs to.
    pub session_id: String,
    /// The paused function call.
    pub function_call_id: String,
    /// What the agent wants to do.
    pub description: String,
    /// Current status.
    pub status: ApprovalStatus,
    /// Creation time (epoch ms).
    pub created_at: i64,
    /// Last update time (epoch ms).
    pub updated_at: i64,
    /// Result recorded after the decision, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl Approval {
    /// Apply an operator decision locally.
    ///
    /// Only `pending` approvals accept a decision; approved/rejected are
    /// irreversible and return [`AlreadyDecided`] without mutating.
    pub fn decide(&mut self, decision: Decision) -> Result<(), AlreadyDecided> {
        if self.status.is_terminal() {
            return Err(AlreadyDecided {
                id: self.id.clone(),
                status: self.status,
            });
        }
        self.status = match decision {
            Decision::Approve => ApprovalStatus::Approved,
            Decision::Reject => ApprovalStatus::Rejected,
        };
        self.updated_at = now_ms();
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Code interpreter
// ─────────────────────────────────────────────────────────────────────────────

/// Execution status of a code-interpreter run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeInterpreterStatus {
    /// Queued, not yet started.
    Pending,
    /// Executing.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Error,
}

/// State of one code-interpreter execution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CodeInterpreterState {
    /// Server-issued id.
    pub id: String,
    /// Owning session.
    pub session_id: String,
    /// Ticket the execution was filed under.
    pub ticket_id: String,
    /// The submitted code.
    pub code: String,
    /// Optional human description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Execution status.
    pub status: CodeInterpreterStatus,
    /// Captured result, once available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Rendered widget URL, once available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget_url: Option<String>,
    /// Creation time (epoch ms).
    pub created_at: i64,
    /// Last update time (epoch ms).
    pub updated_at: i64,
}

/// Fields for `POST /api/code-interpreter/states`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeInterpreterCreate {
    /// Owning session.
    pub session_id: String,
    /// The code to run.
    pub code: String,
    /// Optional human description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Changed fields for `PUT /api/code-interpreter/states/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeInterpreterUpdate {
    /// New status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CodeInterpreterStatus>,
    /// New result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Files
// ─────────────────────────────────────────────────────────────────────────────

/// File-system entry kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// A regular file.
    File,
    /// A directory.
    Folder,
}

/// Flat file record as returned by `GET /api/files`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Server-issued id.
    pub id: String,
    /// Base name.
    pub name: String,
    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: FileKind,
    /// Size in bytes (files only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Full path, `/`-separated, used as the hierarchy key.
    pub path: String,
    /// Last modification time (epoch ms).
    pub updated_at: i64,
}

/// Hierarchical file entry reconstructed client-side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    /// Server-issued id.
    pub id: String,
    /// Base name.
    pub name: String,
    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: FileKind,
    /// Size in bytes (files only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Last modification time (epoch ms).
    pub modified: i64,
    /// Full path.
    pub path: String,
    /// Child entries (folders only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileNode>>,
    /// UI expansion state, always collapsed after a rebuild.
    pub expanded: bool,
}

impl FileNode {
    fn from_record(record: &FileRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            kind: record.kind,
            size: record.size,
            modified: record.updated_at,
            path: record.path.clone(),
            children: match record.kind {
                FileKind::Folder => Some(Vec::new()),
                FileKind::File => None,
            },
            expanded: false,
        }
    }
}

/// Rebuild the file hierarchy from a flat listing.
///
/// Parentage is by path prefix: `a/b/c` attaches to the entry whose path
/// is `a/b` when one exists; entries whose parent path is absent from the
/// listing become roots. Input order is preserved within each level.
#[must_use]
pub fn build_file_tree(flat: &[FileRecord]) -> Vec<FileNode> {
    use std::collections::HashMap;

    // Index of each path in an arena of nodes.
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut arena: Vec<FileNode> = Vec::with_capacity(flat.len());
    for record in flat {
        let _ = index.insert(record.path.as_str(), arena.len());
        arena.push(FileNode::from_record(record));
    }

    // Attach children to parents back-to-front so removal by index stays
    // valid: collect (child, parent) pairs first, then move nodes.
    let mut roots: Vec<usize> = Vec::new();
    let mut parent_of: Vec<Option<usize>> = vec![None; arena.len()];
    for (i, record) in flat.iter().enumerate() {
        let parent = record
            .path
            .rfind('/')
            .map(|cut| &record.path[..cut])
            .filter(|p| !p.is_empty())
            .and_then(|p| index.get(p).copied());
        match parent {
            // A file listed as someone's parent cannot hold children.
            Some(p) if arena[p].children.is_some() && p != i => parent_of[i] = Some(p),
            _ => roots.push(i),
        }
    }

    // Assemble the forest depth-first from the roots.
    fn assemble(arena: &[FileNode], parent_of: &[Option<usize>], node: usize) -> FileNode {
        let mut out = arena[node].clone();
        if out.children.is_some() {
            let children: Vec<FileNode> = parent_of
                .iter()
                .enumerate()
                .filter(|&(_, p)| *p == Some(node))
                .map(|(child, _)| assemble(arena, parent_of, child))
                .collect();
            out.children = Some(children);
        }
        out
    }

    roots
        .into_iter()
        .map(|r| assemble(&arena, &parent_of, r))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Terminal
// ─────────────────────────────────────────────────────────────────────────────

/// One executed command shown in the terminal viewer. Held client-side
/// only; never fetched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerminalCommand {
    /// Client-minted id.
    pub id: String,
    /// The command line.
    pub command: String,
    /// Captured output.
    pub output: String,
    /// Exit code, when the command has finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Start time (epoch ms).
    pub started_at: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────────────────────────────────────

/// Who authored a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The operator.
    User,
    /// The agent.
    Assistant,
}

/// One entry in the chat transcript. Append-only; assistant messages grow
/// by fragment while a reply streams, nothing is edited afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Client-minted id.
    pub id: String,
    /// Author role.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
    /// Creation time (epoch ms).
    pub created_at: i64,
}

impl ChatMessage {
    /// New message with a fresh id and the current timestamp.
    #[must_use]
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            role,
            content: content.into(),
            created_at: now_ms(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn pending_approval() -> Approval {
        Approval {
            id: "ap-1".into(),
            session_id: "s1".into(),
            function_call_id: "fc-1".into(),
            description: "run a shell command".into(),
            status: ApprovalStatus::Pending,
            created_at: 1000,
            updated_at: 1000,
            result: None,
        }
    }

    // ── Wire shapes ──────────────────────────────────────────────────────

    #[test]
    fn todo_deserializes_from_backend_shape() {
        let todo: TodoItem = serde_json::from_value(json!({
            "id": "t1",
            "title": "buy milk",
            "completed": false,
            "session_id": "s1",
            "created_at": 1700000000000i64,
            "updated_at": 1700000000000i64,
        }))
        .unwrap();
        assert_eq!(todo.title, "buy milk");
        assert!(!todo.completed);
        assert!(todo.description.is_none());
    }

    #[test]
    fn todo_create_omits_unset_fields() {
        let body = serde_json::to_value(TodoCreate {
            title: "buy milk".into(),
            ..TodoCreate::default()
        })
        .unwrap();
        assert_eq!(body, json!({"title": "buy milk"}));
    }

    #[test]
    fn approval_status_snake_case() {
        let approval = pending_approval();
        let json = serde_json::to_value(&approval).unwrap();
        assert_eq!(json["status"], "pending");
        assert!(json.get("result").is_none());
    }

    #[test]
    fn file_record_uses_type_key() {
        let record: FileRecord = serde_json::from_value(json!({
            "id": "f1",
            "name": "main.rs",
            "type": "file",
            "size": 120,
            "path": "src/main.rs",
            "updated_at": 1,
        }))
        .unwrap();
        assert_eq!(record.kind, FileKind::File);
    }

    #[test]
    fn chat_message_camel_case() {
        let msg = ChatMessage::new(ChatRole::User, "hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn chat_message_ids_are_unique() {
        let a = ChatMessage::new(ChatRole::User, "x");
        let b = ChatMessage::new(ChatRole::User, "x");
        assert_ne!(a.id, b.id);
    }

    // ── Approval transitions ─────────────────────────────────────────────

    #[test]
    fn pending_approval_can_be_approved() {
        let mut approval = pending_approval();
        approval.decide(Decision::Approve).unwrap();
        assert_eq!(approval.status, ApprovalStatus::Approved);
    }

    #[test]
    fn pending_approval_can_be_rejected() {
        let mut approval = pending_approval();
        approval.decide(Decision::Reject).unwrap();
        assert_eq!(approval.status, ApprovalStatus::Rejected);
    }

    #[test]
    fn approved_refuses_further_decisions() {
        let mut approval = pending_approval();
        approval.decide(Decision::Approve).unwrap();
        let err = approval.decide(Decision::Reject).unwrap_err();
        assert_matches!(
            err,
            AlreadyDecided {
                status: ApprovalStatus::Approved,
                ..
            }
        );
        // Status unchanged; no way back to pending either.
        assert_eq!(approval.status, ApprovalStatus::Approved);
    }

    #[test]
    fn rejected_refuses_further_decisions() {
        let mut approval = pending_approval();
        approval.decide(Decision::Reject).unwrap();
        assert!(approval.decide(Decision::Approve).is_err());
        assert_eq!(approval.status, ApprovalStatus::Rejected);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!ApprovalStatus::Pending.is_terminal());
        assert!(ApprovalStatus::Approved.is_terminal());
        assert!(ApprovalStatus::Rejected.is_terminal());
    }

    // ── File tree ────────────────────────────────────────────────────────

    fn record(path: &str, kind: FileKind) -> FileRecord {
        FileRecord {
            id: format!("id-{path}"),
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            kind,
            size: matches!(kind, FileKind::File).then_some(10),
            path: path.to_string(),
            updated_at: 1,
        }
    }

    #[test]
    fn flat_list_nests_by_path_prefix() {
        let flat = vec![
            record("src", FileKind::Folder),
            record("src/main.rs", FileKind::File),
            record("src/lib.rs", FileKind::File),
            record("README.md", FileKind::File),
        ];
        let tree = build_file_tree(&flat);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].path, "src");
        let children = tree[0].children.as_ref().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].name, "main.rs");
        assert_eq!(children[1].name, "lib.rs");
        assert!(tree[1].children.is_none());
    }

    #[test]
    fn orphan_entries_become_roots() {
        // Parent "deep/nested" never listed.
        let flat = vec![record("deep/nested/file.txt", FileKind::File)];
        let tree = build_file_tree(&flat);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].path, "deep/nested/file.txt");
    }

    #[test]
    fn folders_start_collapsed_with_empty_children() {
        let flat = vec![record("docs", FileKind::Folder)];
        let tree = build_file_tree(&flat);
        assert!(!tree[0].expanded);
        assert_eq!(tree[0].children.as_deref(), Some(&[][..]));
    }

    #[test]
    fn file_listed_as_parent_cannot_adopt() {
        // "notes" is a *file*, so "notes/a.txt" has no valid parent.
        let flat = vec![
            record("notes", FileKind::File),
            record("notes/a.txt", FileKind::File),
        ];
        let tree = build_file_tree(&flat);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn nested_folders() {
        let flat = vec![
            record("a", FileKind::Folder),
            record("a/b", FileKind::Folder),
            record("a/b/c.txt", FileKind::File),
        ];
        let tree = build_file_tree(&flat);
        assert_eq!(tree.len(), 1);
        let b = &tree[0].children.as_ref().unwrap()[0];
        assert_eq!(b.path, "a/b");
        assert_eq!(b.children.as_ref().unwrap()[0].name, "c.txt");
    }

    #[test]
    fn empty_listing_builds_empty_tree() {
        assert!(build_file_tree(&[]).is_empty());
    }
}
