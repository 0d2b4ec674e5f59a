use crate::client_certificate::ClientCertificateId;
use crate::error::CoreError;

/// Unique identifier of a [`Node`].
pub type NodeId = i64;

/// Operating system family a daemon runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsTag {
    Linux,
    Windows,
    Other,
}

/// How a fresh install of the daemon's managed game servers is provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallMethod {
    Auto,
    Copy,
    Download,
    Script,
    Steam,
    None,
}

/// Per-lifecycle script overrides a Node may carry instead of the daemon's
/// built-in defaults. Every field is optional; an absent override means
/// "use the daemon's default behavior for this lifecycle event".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOverrides {
    pub install: Option<String>,
    pub reinstall: Option<String>,
    pub update: Option<String>,
    pub start: Option<String>,
    pub pause: Option<String>,
    pub unpause: Option<String>,
    pub stop: Option<String>,
    pub kill: Option<String>,
    pub restart: Option<String>,
    pub status: Option<String>,
    pub stats: Option<String>,
    pub get_console: Option<String>,
    pub send_command: Option<String>,
    pub delete: Option<String>,
}

/// A managed host running a daemon; the unit of fleet membership.
///
/// `client_certificate_id` always references an existing
/// [`ClientCertificate`](crate::ClientCertificate) row at creation time —
/// enforced by [`NodeRepository::insert`] implementations, never by this
/// struct itself, since the struct has no way to reach the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub enabled: bool,
    pub name: String,
    pub os: OsTag,
    pub location: String,
    pub provider: String,
    pub addresses: Vec<String>,
    pub ram: Option<String>,
    pub cpu: Option<String>,
    pub work_path: String,
    pub steamcmd_path: Option<String>,
    pub gdaemon_host: String,
    pub gdaemon_port: u16,
    pub gdaemon_api_key: String,
    pub gdaemon_login: Option<String>,
    pub gdaemon_password: Option<String>,
    pub gdaemon_server_cert_path: String,
    pub client_certificate_id: ClientCertificateId,
    pub preferred_install_method: InstallMethod,
    pub scripts: ScriptOverrides,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

impl Node {
    /// Default gdaemon port used by the enrollment flow (§4.I) when the
    /// client does not supply one.
    pub const DEFAULT_PORT: u16 = 31717;

    /// Picks the first configured address, the one the dialer should use.
    ///
    /// Returns `None` for a Node with no addresses at all, which the
    /// connection pool treats as a dial error rather than a panic.
    #[must_use]
    pub fn primary_address(&self) -> Option<&str> {
        self.addresses.first().map(String::as_str)
    }
}

/// Persistence boundary for [`Node`] records.
///
/// This is the "relational schema and ORM-style repository" the
/// specification calls out as an external collaborator (§1); the core only
/// consumes it through this trait.
#[async_trait::async_trait]
pub trait NodeRepository: Send + Sync {
    async fn insert(&self, node: Node) -> Result<Node, CoreError>;
    async fn find_by_id(&self, id: NodeId) -> Result<Option<Node>, CoreError>;
    async fn list(&self) -> Result<Vec<Node>, CoreError>;
    /// Marks a node as deleted by stamping `deleted_at`; does not remove
    /// the row (the spec makes no mention of hard deletes for nodes).
    async fn soft_delete(&self, id: NodeId, deleted_at: i64) -> Result<(), CoreError>;
}
