use std::sync::Arc;
use std::time::Duration;

use core::CoreError;
use net::NodePool;
use wire::{read_frame, write_frame, BaseResponse, StatusRequestKind, Value};

use crate::connection::{acquire, wire_err_to_core};
use crate::duration::{parse_count, parse_go_duration};
use crate::retry::retry_connection;

/// Daemon build identity returned by [`StatusService::version`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: String,
    pub build_date: String,
}

/// Full status snapshot returned by [`StatusService::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub uptime: Duration,
    pub version: String,
    pub build_date: String,
    pub working_tasks: u64,
    pub waiting_tasks: u64,
    pub online_servers: u64,
}

/// `Status(Mode=4)` queries: version identity and the richer status
/// snapshot (§4.E). Both retry on connection-layer failures only.
pub struct StatusService {
    pool: Arc<NodePool>,
}

impl StatusService {
    #[must_use]
    pub fn new(pool: Arc<NodePool>) -> Self {
        Self { pool }
    }

    pub async fn version(&self) -> Result<VersionInfo, CoreError> {
        retry_connection(|| self.fetch_version()).await
    }

    pub async fn status(&self) -> Result<StatusInfo, CoreError> {
        retry_connection(|| self.fetch_status()).await
    }

    async fn fetch_version(&self) -> Result<VersionInfo, CoreError> {
        let mut conn = acquire(&self.pool).await?;
        let request = Value::list([Value::Int32(StatusRequestKind::Version as i32)]);
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
        parse_version(&response)
    }

    async fn fetch_status(&self) -> Result<StatusInfo, CoreError> {
        let mut conn = acquire(&self.pool).await?;

        let version_request = Value::list([Value::Int32(StatusRequestKind::Version as i32)]);
        if let Err(err) = write_frame(&mut conn, &version_request).await {
            conn.mark_broken();
            return Err(wire_err_to_core(err));
        }
        let version_response = match read_frame(&mut conn).await {
            Ok(value) => value,
            Err(err) => {
                conn.mark_broken();
                return Err(wire_err_to_core(err));
            }
        };
        let version = parse_version(&version_response)?;

        let base_request = Value::list([Value::Int32(StatusRequestKind::StatusBase as i32)]);
        if let Err(err) = write_frame(&mut conn, &base_request).await {
            conn.mark_broken();
            return Err(wire_err_to_core(err));
        }
        let base_response = match read_frame(&mut conn).await {
            Ok(value) => value,
            Err(err) => {
                conn.mark_broken();
                return Err(wire_err_to_core(err));
            }
        };

        let base = BaseResponse::from_value(&base_response).map_err(wire_err_to_core)?;
        if !base.is_ok() {
            return Err(CoreError::Daemon {
                code: base.code,
                info: base.info,
            });
        }

        let items = base_response
            .as_list()
            .ok_or_else(|| CoreError::Frame("status base response is not a list".into()))?;
        let uptime = field_str(items, 1)?;
        let working = field_str(items, 2)?;
        let waiting = field_str(items, 3)?;
        let online = field_str(items, 4)?;

        Ok(StatusInfo {
            uptime: parse_go_duration(&uptime),
            version: version.version,
            build_date: version.build_date,
            working_tasks: parse_count(&working),
            waiting_tasks: parse_count(&waiting),
            online_servers: parse_count(&online),
        })
    }
}

fn parse_version(response: &Value) -> Result<VersionInfo, CoreError> {
    let items = response
        .as_list()
        .ok_or_else(|| CoreError::Frame("version response is not a list".into()))?;
    let code = items
        .first()
        .and_then(Value::as_i64)
        .ok_or_else(|| CoreError::Frame("version response missing status code".into()))?;
    if wire::StatusCode::from_i64(code).is_none_or(|c| !c.is_ok()) {
        let info = items.get(1).and_then(Value::as_str).unwrap_or_default();
        return Err(CoreError::Daemon {
            code,
            info: info.to_string(),
        });
    }
    Ok(VersionInfo {
        version: field_str(items, 1)?,
        build_date: field_str(items, 2)?,
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
    fn parse_version_reads_version_and_build_date() {
        let response = Value::list([
            Value::Int32(100),
            Value::Str("1.4.2".into()),
            Value::Str("2025-01-01".into()),
        ]);
        let info = parse_version(&response).unwrap();
        assert_eq!(info.version, "1.4.2");
        assert_eq!(info.build_date, "2025-01-01");
    }

    #[test]
    fn parse_version_propagates_daemon_error() {
        let response = Value::list([Value::Int32(1), Value::Str("boom".into())]);
        let err = parse_version(&response).unwrap_err();
        assert!(matches!(err, CoreError::Daemon { code: 1, .. }));
    }
}
