use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use core::CoreError;
use net::{NodePool, PooledConnection};
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf, Take};
use wire::{read_frame, write_frame, BaseResponse, FileOpSelector, FileSendDirection, FileType, Value};

use crate::connection::{acquire, wire_err_to_core};
use crate::retry::retry_connection;

/// One entry of a [`FileService::read_dir`] listing.
#[derive(Debug, Clone, PartialEq)]
pub struct DirEntry {
    pub name: String,
    pub size: u64,
    pub mtime: i64,
    pub file_type: FileType,
    pub perm: u32,
}

/// Response of [`FileService::file_info`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFileInfo {
    pub name: String,
    pub size: u64,
    pub file_type: FileType,
    pub mtime: i64,
    pub atime: i64,
    pub ctime: i64,
    pub perm: u32,
    pub mime: String,
}

/// `Files(Mode=3)` operations (§4.G): directory/file metadata management
/// plus streaming upload/download.
pub struct FileService {
    pool: Arc<NodePool>,
}

impl FileService {
    #[must_use]
    pub fn new(pool: Arc<NodePool>) -> Self {
        Self { pool }
    }

    pub async fn read_dir(&self, dir: &str) -> Result<Vec<DirEntry>, CoreError> {
        retry_connection(|| async {
            let request = Value::list([
                Value::Int32(FileOpSelector::ReadDir as i32),
                Value::Str(dir.to_string()),
                Value::Int32(0),
            ]);
            let response = self.request_response(&request).await?;
            let base = BaseResponse::from_value(&response).map_err(wire_err_to_core)?;
            if !base.is_ok() {
                return Err(CoreError::Daemon { code: base.code, info: base.info });
            }
            let data = base
                .data
                .ok_or_else(|| CoreError::Frame("read_dir response missing data".into()))?;
            let rows = data
                .as_list()
                .ok_or_else(|| CoreError::Frame("read_dir data is not a list".into()))?;
            rows.iter().map(parse_dir_entry).collect()
        })
        .await
    }

    pub async fn make_dir(&self, dir: &str) -> Result<(), CoreError> {
        let request = Value::list([
            Value::Int32(FileOpSelector::MakeDir as i32),
            Value::Str(dir.to_string()),
        ]);
        self.base_op(&request).await
    }

    pub async fn move_path(&self, src: &str, dst: &str, copy: bool) -> Result<(), CoreError> {
        let request = Value::list([
            Value::Int32(FileOpSelector::FileMove as i32),
            Value::Str(src.to_string()),
            Value::Str(dst.to_string()),
            Value::Bool(copy),
        ]);
        self.base_op(&request).await
    }

    pub async fn remove(&self, path: &str, recursive: bool) -> Result<(), CoreError> {
        let request = Value::list([
            Value::Int32(FileOpSelector::FileRemove as i32),
            Value::Str(path.to_string()),
            Value::Bool(recursive),
        ]);
        self.base_op(&request).await
    }

    pub async fn chmod(&self, path: &str, perm: u32) -> Result<(), CoreError> {
        let request = Value::list([
            Value::Int32(FileOpSelector::FileChmod as i32),
            Value::Str(path.to_string()),
            Value::UInt32(perm),
        ]);
        self.base_op(&request).await
    }

    pub async fn file_info(&self, path: &str) -> Result<NodeFileInfo, CoreError> {
        retry_connection(|| async {
            let request = Value::list([
                Value::Int32(FileOpSelector::FileInfo as i32),
                Value::Str(path.to_string()),
            ]);
            let response = self.request_response(&request).await?;
            let base = BaseResponse::from_value(&response).map_err(wire_err_to_core)?;
            if !base.is_ok() {
                return Err(CoreError::Daemon { code: base.code, info: base.info });
            }
            let data = base
                .data
                .ok_or_else(|| CoreError::Frame("file_info response missing data".into()))?;
            parse_file_info(&data)
        })
        .await
    }

    /// Opens a download stream for `path`. The caller MUST call
    /// [`DownloadStream::close`] (or drop it) promptly; until then the
    /// underlying pool slot stays checked out (§4.G DownloadStream).
    ///
    /// The request/ready-response negotiation retries on connection-layer
    /// failure like every other file operation; once a connection reaches
    /// `ReadyToTransfer` the bulk byte transfer itself is never retried
    /// (§4.G "once a transfer has begun... retries are disallowed").
    pub async fn download(&self, path: &str) -> Result<DownloadStream, CoreError> {
        let (conn, size) = retry_connection(|| self.start_download(path)).await?;
        Ok(DownloadStream { inner: conn.take(size) })
    }

    async fn start_download(&self, path: &str) -> Result<(PooledConnection, u64), CoreError> {
        let mut conn = acquire(&self.pool).await?;
        let request = Value::list([
            Value::Int32(FileOpSelector::FileSend as i32),
            Value::Int32(FileSendDirection::SendToClient as i32),
            Value::Str(path.to_string()),
        ]);
        if let Err(err) = write_frame(&mut conn, &request).await {
            conn.mark_broken();
            return Err(wire_err_to_core(err));
        }
        let response = match read_frame(&mut conn).await {
            Ok(value) => value,
            Err(err) => {
                conn.mark_broken();
                return Err(wire_err_to_core(err));
            }
        };
        let base = BaseResponse::from_value(&response).map_err(wire_err_to_core)?;
        if base.code != wire::StatusCode::ReadyToTransfer as i64 {
            return Err(CoreError::NotReady(format!(
                "expected ReadyToTransfer, got code={}",
                base.code
            )));
        }
        let size = base
            .data
            .as_ref()
            .and_then(Value::as_u64)
            .ok_or_else(|| CoreError::Frame("download response missing file size".into()))?;

        Ok((conn, size))
    }

    /// Streams `size` bytes from `source` to `path`, creating parent
    /// directories when `make_dirs` is set (§4.G Upload).
    ///
    /// As with [`FileService::download`], only the pre-transfer request/
    /// ready-response round trip retries on connection-layer failure; the
    /// byte stream and final response are not (§4.G).
    pub async fn upload(
        &self,
        path: &str,
        size: u64,
        perm: u32,
        make_dirs: bool,
        mut source: impl AsyncRead + Unpin,
    ) -> Result<(), CoreError> {
        let mut conn = retry_connection(|| self.start_upload(path, size, make_dirs, perm)).await?;

        let mut limited = source.by_ref().take(size);
        if let Err(err) = tokio::io::copy(&mut limited, &mut conn).await {
            conn.mark_broken();
            return Err(CoreError::Internal(Box::new(err)));
        }

        let final_response = match read_frame(&mut conn).await {
            Ok(value) => value,
            Err(err) => {
                conn.mark_broken();
                return Err(wire_err_to_core(err));
            }
        };
        let final_base = BaseResponse::from_value(&final_response).map_err(wire_err_to_core)?;
        if !final_base.is_ok() {
            return Err(CoreError::Daemon {
                code: final_base.code,
                info: final_base.info,
            });
        }
        Ok(())
    }

    async fn start_upload(
        &self,
        path: &str,
        size: u64,
        make_dirs: bool,
        perm: u32,
    ) -> Result<PooledConnection, CoreError> {
        let mut conn = acquire(&self.pool).await?;
        let request = Value::list([
            Value::Int32(FileOpSelector::FileSend as i32),
            Value::Int32(FileSendDirection::GetFromClient as i32),
            Value::Str(path.to_string()),
            Value::UInt64(size),
            Value::Bool(make_dirs),
            Value::UInt32(perm),
        ]);
        if let Err(err) = write_frame(&mut conn, &request).await {
            conn.mark_broken();
            return Err(wire_err_to_core(err));
        }
        let ready = match read_frame(&mut conn).await {
            Ok(value) => value,
            Err(err) => {
                conn.mark_broken();
                return Err(wire_err_to_core(err));
            }
        };
        let base = BaseResponse::from_value(&ready).map_err(wire_err_to_core)?;
        if base.code != wire::StatusCode::ReadyToTransfer as i64 {
            return Err(CoreError::NotReady(format!(
                "expected ReadyToTransfer, got code={}",
                base.code
            )));
        }
        Ok(conn)
    }

    /// Issues a bare-response (`[code, info]`) operation and maps a
    /// non-OK code to [`CoreError::Daemon`].
    async fn base_op(&self, request: &Value) -> Result<(), CoreError> {
        retry_connection(|| async {
            let response = self.request_response(request).await?;
            let base = BaseResponse::from_value(&response).map_err(wire_err_to_core)?;
            if base.is_ok() {
                Ok(())
            } else {
                Err(CoreError::Daemon { code: base.code, info: base.info })
            }
        })
        .await
    }

    async fn request_response(&self, request: &Value) -> Result<Value, CoreError> {
        let mut conn = acquire(&self.pool).await?;
        if let Err(err) = write_frame(&mut conn, request).await {
            conn.mark_broken();
            return Err(wire_err_to_core(err));
        }
        match read_frame(&mut conn).await {
            Ok(value) => Ok(value),
            Err(err) => {
                conn.mark_broken();
                Err(wire_err_to_core(err))
            }
        }
    }
}

/// A bounded, pool-owning byte stream for a file download (§4.G
/// DownloadStream). Reads never exceed the announced file size; dropping
/// (or calling [`DownloadStream::close`]) releases the pool slot without
/// ever closing the underlying socket.
pub struct DownloadStream {
    inner: Take<PooledConnection>,
}

impl DownloadStream {
    pub fn close(self) {
        drop(self);
    }
}

impl AsyncRead for DownloadStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

fn parse_dir_entry(value: &Value) -> Result<DirEntry, CoreError> {
    let items = value
        .as_list()
        .ok_or_else(|| CoreError::Frame("read_dir entry is not a list".into()))?;
    Ok(DirEntry {
        name: field_str(items, 0)?,
        size: items.get(1).and_then(Value::as_u64).unwrap_or(0),
        mtime: items.get(2).and_then(Value::as_i64).unwrap_or(0),
        file_type: items
            .get(3)
            .and_then(Value::as_i64)
            .map(FileType::from_i64)
            .unwrap_or(FileType::Unknown),
        perm: items
            .get(4)
            .and_then(Value::as_i64)
            .map(|v| v as u32)
            .unwrap_or(0),
    })
}

fn parse_file_info(value: &Value) -> Result<NodeFileInfo, CoreError> {
    let items = value
        .as_list()
        .ok_or_else(|| CoreError::Frame("file_info data is not a list".into()))?;
    Ok(NodeFileInfo {
        name: field_str(items, 0)?,
        size: items.get(1).and_then(Value::as_u64).unwrap_or(0),
        file_type: items
            .get(2)
            .and_then(Value::as_i64)
            .map(FileType::from_i64)
            .unwrap_or(FileType::Unknown),
        mtime: items.get(3).and_then(Value::as_i64).unwrap_or(0),
        atime: items.get(4).and_then(Value::as_i64).unwrap_or(0),
        ctime: items.get(5).and_then(Value::as_i64).unwrap_or(0),
        perm: items
            .get(6)
            .and_then(Value::as_i64)
            .map(|v| v as u32)
            .unwrap_or(0),
        mime: items.get(7).and_then(Value::as_str).unwrap_or_default().to_string(),
    })
}

fn field_str(items: &[Value], index: usize) -> Result<String, CoreError> {
    items
        .get(index)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CoreError::Frame(format!("response missing string field at index {index}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dir_entry_reads_all_columns() {
        let row = Value::list([
            Value::Str("server.log".into()),
            Value::UInt64(2048),
            Value::Int64(1_700_000_000),
            Value::Int32(FileType::File as i32),
            Value::Int32(0o644),
        ]);
        let entry = parse_dir_entry(&row).unwrap();
        assert_eq!(entry.name, "server.log");
        assert_eq!(entry.size, 2048);
        assert_eq!(entry.file_type, FileType::File);
        assert_eq!(entry.perm, 0o644);
    }

    #[test]
    fn parse_file_info_reads_all_columns() {
        let value = Value::list([
            Value::Str("server.log".into()),
            Value::UInt64(2048),
            Value::Int32(FileType::File as i32),
            Value::Int64(3),
            Value::Int64(2),
            Value::Int64(1),
            Value::Int32(0o644),
            Value::Str("text/plain".into()),
        ]);
        let info = parse_file_info(&value).unwrap();
        assert_eq!(info.mime, "text/plain");
        assert_eq!(info.perm, 0o644);
        assert_eq!(info.ctime, 1);
    }
}
