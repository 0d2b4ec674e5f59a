use std::io::{Cursor, Write};

use daemon_client::{FileService, FileType};
use tokio::io::AsyncReadExt;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::BundleError;

const ZIP_PREFIX: &str = "daemon_logs";

/// Builds a ZIP of every regular file directly under `remote_dir` on the
/// node, skipping subdirectories entirely (§4.J, §8 S7).
///
/// Each file is fully drained into memory before being written to the
/// archive — the `zip` crate's writer isn't async, so true streaming would
/// require buffering the whole archive anyway; log files are assumed small
/// enough that this is the simpler and equally correct choice.
pub async fn build_logs_zip(files: &FileService, remote_dir: &str) -> Result<Vec<u8>, BundleError> {
    let entries = files.read_dir(remote_dir).await?;

    let mut buf = Vec::new();
    {
        let cursor = Cursor::new(&mut buf);
        let mut zip = ZipWriter::new(cursor);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in entries {
            if entry.file_type != FileType::File {
                continue;
            }

            let remote_path = format!("{}/{}", remote_dir.trim_end_matches('/'), entry.name);
            let mut stream = files.download(&remote_path).await?;
            let mut contents = Vec::with_capacity(entry.size as usize);
            stream.read_to_end(&mut contents).await?;
            stream.close();

            zip.start_file(format!("{ZIP_PREFIX}/{}", entry.name), options)?;
            zip.write_all(&contents)?;
        }

        zip.finish()?;
    }
    Ok(buf)
}
