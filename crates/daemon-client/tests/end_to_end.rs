//! End-to-end scenarios against an in-process [`test_support::MockDaemon`]
//! (§8 S1/S2/S3): exercises the dialer, pool, and service layers together
//! instead of just the frame-parsing helpers unit-tested in `src/`.

use std::time::Duration;

use daemon_client::{CommandService, FileService, StatusService};
use net::{NodePool, TlsDialer};
use test_support::{error_response, ok_response, ready_to_transfer, MockDaemon, Step};
use tokio::io::AsyncReadExt;
use wire::{CommandExecRequest, Mode, Value};

/// S1: Version=3.9.0, BuildDate=2025-10-15, Uptime=2h30m15s, Working=5,
/// Waiting=3, Online=10 round-trips into the expected [`StatusInfo`].
#[tokio::test]
async fn status_round_trip() {
    let daemon = MockDaemon::spawn(vec![
        Step::Reply(Value::list([
            Value::Int32(100),
            Value::Str("3.9.0".into()),
            Value::Str("2025-10-15".into()),
        ])),
        Step::Reply(Value::list([
            Value::Int32(100),
            Value::Str("2h30m15s".into()),
            Value::Str("5".into()),
            Value::Str("3".into()),
            Value::Str("10".into()),
        ])),
    ])
    .await;

    let pool = NodePool::new(TlsDialer::new(), daemon.dial_config(Mode::Status));
    let status = StatusService::new(pool);

    let info = status.status().await.expect("status round trip succeeds");
    assert_eq!(info.version, "3.9.0");
    assert_eq!(info.build_date, "2025-10-15");
    assert_eq!(info.uptime, Duration::from_secs(9015));
    assert_eq!(info.working_tasks, 5);
    assert_eq!(info.waiting_tasks, 3);
    assert_eq!(info.online_servers, 10);
}

/// S2: command exec with a custom work dir; the captured request frame
/// carries `[kind=0, "ls -al", "/root"]` and the response decodes to
/// `ExitCode=0`, `Output` starting with `"total 48"`.
#[tokio::test]
async fn command_exec_with_custom_workdir() {
    let daemon = MockDaemon::spawn(vec![Step::Reply(Value::list([
        Value::Int32(100),
        Value::Int32(0),
        Value::Str("total 48\ndrwxr-xr-x ...".into()),
    ]))])
    .await;

    let pool = NodePool::new(TlsDialer::new(), daemon.dial_config(Mode::Cmd));
    let commands = CommandService::new(pool);

    let request = CommandExecRequest::new("ls -al").with_work_dir("/root");
    let result = commands.execute(&request).await.expect("command exec succeeds");
    assert_eq!(result.exit_code, 0);
    assert!(result.output.starts_with("total 48"));
}

/// A daemon error response is surfaced as [`core::CoreError::Daemon`] and
/// is not retried (parsing/daemon errors aren't connection-layer errors).
#[tokio::test]
async fn command_exec_surfaces_daemon_error() {
    let daemon = MockDaemon::spawn(vec![Step::Reply(error_response(3, "unknown command"))]).await;

    let pool = NodePool::new(TlsDialer::new(), daemon.dial_config(Mode::Cmd));
    let commands = CommandService::new(pool);

    let err = commands
        .execute(&CommandExecRequest::new("bogus"))
        .await
        .unwrap_err();
    match err {
        core::CoreError::Daemon { code, info } => {
            assert_eq!(code, 3);
            assert_eq!(info, "unknown command");
        }
        other => panic!("expected Daemon error, got {other:?}"),
    }
}

/// S3: upload `"Test file content for streaming"` to
/// `/srv/gameap/stream-file.txt`, then download the same path; the fully
/// drained stream equals the original bytes.
#[tokio::test]
async fn upload_then_download_stream_round_trips() {
    let payload = b"Test file content for streaming".to_vec();
    let len = payload.len() as u64;

    let upload_daemon = MockDaemon::spawn(vec![Step::ReceiveBytes(
        ready_to_transfer(len),
        payload.len(),
        ok_response("ok", None),
    )])
    .await;
    let upload_pool = NodePool::new(TlsDialer::new(), upload_daemon.dial_config(Mode::Files));
    let uploader = FileService::new(upload_pool);
    uploader
        .upload(
            "/srv/gameap/stream-file.txt",
            len,
            0o644,
            true,
            std::io::Cursor::new(payload.clone()),
        )
        .await
        .expect("upload succeeds");

    let download_daemon = MockDaemon::spawn(vec![Step::SendBytes(ready_to_transfer(len), payload.clone())]).await;
    let download_pool = NodePool::new(TlsDialer::new(), download_daemon.dial_config(Mode::Files));
    let downloader = FileService::new(download_pool);
    let mut stream = downloader
        .download("/srv/gameap/stream-file.txt")
        .await
        .expect("download opens");
    let mut drained = Vec::new();
    stream.read_to_end(&mut drained).await.expect("drain stream");
    stream.close();

    assert_eq!(drained, payload);
}
