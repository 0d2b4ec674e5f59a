use std::sync::Arc;

use core::CoreError;
use net::NodePool;
use wire::{read_frame, write_frame, CommandExecRequest, Value};

use crate::connection::{acquire, wire_err_to_core};
use crate::retry::retry_connection;

/// Result of [`CommandService::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub output: String,
    pub exit_code: i32,
}

/// `CMD(Mode=2)` single operation: run a shell command on the node (§4.F).
pub struct CommandService {
    pool: Arc<NodePool>,
}

impl CommandService {
    #[must_use]
    pub fn new(pool: Arc<NodePool>) -> Self {
        Self { pool }
    }

    /// Runs `command` with `work_dir` defaulting to `/` (§4.F); pass a
    /// request built with [`CommandExecRequest::with_work_dir`] to override.
    pub async fn execute(&self, request: &CommandExecRequest) -> Result<CommandResult, CoreError> {
        retry_connection(|| self.execute_once(request)).await
    }

    async fn execute_once(&self, request: &CommandExecRequest) -> Result<CommandResult, CoreError> {
        let mut conn = acquire(&self.pool).await?;

        if let Err(err) = write_frame(&mut conn, &request.to_value()).await {
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

        parse_command_response(&response)
    }
}

/// The happy response is `[code, exitCode, output]`; a generic base
/// response (e.g. `[code, info]` on error) is coerced into `Code = code`,
/// `Output = info`, `exitCode = 0` (§4.F).
fn parse_command_response(response: &Value) -> Result<CommandResult, CoreError> {
    let items = response
        .as_list()
        .ok_or_else(|| CoreError::Frame("command response is not a list".into()))?;

    let code = items
        .first()
        .and_then(Value::as_i64)
        .ok_or_else(|| CoreError::Frame("command response missing status code".into()))?;

    match items.get(1) {
        Some(Value::Str(output_as_info)) => Err(CoreError::Daemon {
            code,
            info: output_as_info.clone(),
        }),
        Some(exit_code_value) => {
            let exit_code = exit_code_value
                .as_i64()
                .ok_or_else(|| CoreError::Frame("command response exit code is not numeric".into()))?;
            let output = items
                .get(2)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Ok(CommandResult {
                output,
                exit_code: exit_code as i32,
            })
        }
        None => Err(CoreError::Frame("command response missing second field".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_response_parses_exit_code_and_output() {
        let response = Value::list([Value::Int32(100), Value::Int32(0), Value::Str("ok\n".into())]);
        let result = parse_command_response(&response).unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output, "ok\n");
    }

    #[test]
    fn error_base_response_is_coerced_into_daemon_error() {
        let response = Value::list([Value::Int32(1), Value::Str("unknown command".into())]);
        let err = parse_command_response(&response).unwrap_err();
        match err {
            CoreError::Daemon { code, info } => {
                assert_eq!(code, 1);
                assert_eq!(info, "unknown command");
            }
            other => panic!("expected Daemon error, got {other:?}"),
        }
    }

    #[test]
    fn nonzero_exit_code_is_not_an_error() {
        let response = Value::list([Value::Int32(100), Value::Int32(127), Value::Str("not found".into())]);
        let result = parse_command_response(&response).unwrap();
        assert_eq!(result.exit_code, 127);
    }
}
