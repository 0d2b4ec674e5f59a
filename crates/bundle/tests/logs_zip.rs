//! S7: the logs zip streams only regular files, skipping directories.

use std::io::{Cursor, Read};

use bundle::build_logs_zip;
use daemon_client::FileService;
use net::{NodePool, TlsDialer};
use test_support::{ok_response, ready_to_transfer, MockDaemon, Step};
use wire::{FileType, Mode, Value};

fn dir_row(name: &str, file_type: FileType, size: u64) -> Value {
    Value::list([
        Value::Str(name.to_string()),
        Value::UInt64(size),
        Value::Int64(0),
        Value::Int32(file_type as i32),
        Value::Int32(0o644),
    ])
}

#[tokio::test]
async fn logs_zip_contains_only_regular_files() {
    let log_contents = b"daemon started\n".to_vec();
    let len = log_contents.len() as u64;

    let daemon = MockDaemon::spawn(vec![
        Step::Reply(ok_response(
            "ok",
            Some(Value::list([
                dir_row("archive", FileType::Dir, 0),
                dir_row("test.log", FileType::File, len),
            ])),
        )),
        Step::SendBytes(ready_to_transfer(len), log_contents.clone()),
    ])
    .await;

    let pool = NodePool::new(TlsDialer::new(), daemon.dial_config(Mode::Files));
    let files = FileService::new(pool);

    let zip_bytes = build_logs_zip(&files, "/srv/gameap/logs")
        .await
        .expect("logs zip assembles");

    let mut archive = zip::ZipArchive::new(Cursor::new(zip_bytes)).expect("valid zip archive");
    assert_eq!(archive.len(), 1, "only the regular file should be archived");

    let mut entry = archive.by_name("daemon_logs/test.log").expect("log file entry present");
    let mut contents = Vec::new();
    entry.read_to_end(&mut contents).expect("read archived log");
    assert_eq!(contents, log_contents);

    drop(entry);
    assert!(archive.by_name("daemon_logs/archive").is_err());
}
