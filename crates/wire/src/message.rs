//! Typed wire constants and message builders/readers built on [`crate::value::Value`].
//!
//! The protocol's message families are all plain lists with a selector in
//! the first slot (§4.A); these types exist so callers above this crate
//! never construct those lists by hand.

use crate::error::WireError;
use crate::value::Value;

/// Top-level message mode, the first element of every request list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Login request: `[ModeAuth, username, password, protocol-mode]`.
    Auth = 1,
    /// Command-execution target mode, used as the login's protocol-mode.
    Cmd = 2,
    /// File-operation target mode.
    Files = 3,
    /// Status-query target mode.
    Status = 4,
}

impl Mode {
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

/// Status query selector, the sole element of a status request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRequestKind {
    Version = 1,
    StatusBase = 2,
}

/// File operation selector, first element of a file-service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOpSelector {
    FileSend = 3,
    ReadDir = 4,
    MakeDir = 5,
    FileMove = 6,
    FileRemove = 7,
    FileInfo = 8,
    FileChmod = 9,
}

/// Sub-direction of a [`FileOpSelector::FileSend`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSendDirection {
    /// Upload: client sends bytes to the daemon.
    GetFromClient = 1,
    /// Download: daemon sends bytes to the client.
    SendToClient = 2,
}

/// Base response status code, first element of every response list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Error = 1,
    Critical = 2,
    UnknownCommand = 3,
    Ok = 100,
    ReadyToTransfer = 101,
}

impl StatusCode {
    #[must_use]
    pub fn from_i64(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Error),
            2 => Some(Self::Critical),
            3 => Some(Self::UnknownCommand),
            100 => Some(Self::Ok),
            101 => Some(Self::ReadyToTransfer),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok | Self::ReadyToTransfer)
    }
}

/// File type tag used in `ReadDir`/`FileInfo` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Unknown = 0,
    Dir = 1,
    File = 2,
    CharDevice = 3,
    BlockDevice = 4,
    NamedPipe = 5,
    Symlink = 6,
    Socket = 7,
}

impl FileType {
    #[must_use]
    pub fn from_i64(tag: i64) -> Self {
        match tag {
            1 => Self::Dir,
            2 => Self::File,
            3 => Self::CharDevice,
            4 => Self::BlockDevice,
            5 => Self::NamedPipe,
            6 => Self::Symlink,
            7 => Self::Socket,
            _ => Self::Unknown,
        }
    }
}

/// `[ModeAuth, username, password, protocol-mode]`.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub target_mode: Mode,
}

impl LoginRequest {
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::list([
            Value::Int32(Mode::Auth.as_i64() as i32),
            Value::Str(self.username.clone()),
            Value::Str(self.password.clone()),
            Value::Int32(self.target_mode.as_i64() as i32),
        ])
    }
}

/// `[kind=0, command, workDir]`, the only command-service request shape.
#[derive(Debug, Clone)]
pub struct CommandExecRequest {
    pub command: String,
    pub work_dir: String,
}

impl CommandExecRequest {
    /// `work_dir` defaults to `/` per §4.F when the caller doesn't override it.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            work_dir: "/".to_string(),
        }
    }

    #[must_use]
    pub fn with_work_dir(mut self, work_dir: impl Into<String>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::list([
            Value::Int32(0),
            Value::Str(self.command.clone()),
            Value::Str(self.work_dir.clone()),
        ])
    }
}

/// A decoded `[statusCode, info, data?]` base response.
#[derive(Debug, Clone)]
pub struct BaseResponse {
    pub code: i64,
    pub info: String,
    pub data: Option<Value>,
}

impl BaseResponse {
    pub fn from_value(value: &Value) -> Result<Self, WireError> {
        let items = value
            .as_list()
            .ok_or_else(|| WireError::Malformed("base response is not a list".into()))?;
        let code = items
            .first()
            .and_then(Value::as_i64)
            .ok_or_else(|| WireError::Malformed("base response missing status code".into()))?;
        let info = items
            .get(1)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let data = items.get(2).cloned();
        Ok(Self { code, info, data })
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        StatusCode::from_i64(self.code).is_some_and(StatusCode::is_ok)
    }
}
