//! gzip 압축
//!
//! 블로킹 I/O입니다. 비동기 컨텍스트에서는 `spawn_blocking` 안에서 호출합니다.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{info, warn};

use logharbor_core::archive_name::GZ_EXTENSION;

use crate::error::RotationError;

/// `<path>.gz`를 만들고 원본을 제거합니다. 생성된 파일 경로를 반환합니다.
///
/// 압축 도중 실패하면 만들다 만 `.gz`를 지우고 원본은 그대로 둡니다.
pub fn gzip_file(path: &Path) -> Result<PathBuf, RotationError> {
    let target = gz_path(path);
    let compress_err = |source| RotationError::Compress {
        path: path.to_path_buf(),
        source,
    };

    if let Err(e) = write_gz(path, &target) {
        if let Err(cleanup) = std::fs::remove_file(&target) {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %target.display(), error = %cleanup, "failed to remove partial archive");
            }
        }
        return Err(compress_err(e));
    }

    std::fs::remove_file(path).map_err(compress_err)?;
    info!(from = %path.display(), to = %target.display(), "compressed rotated log");
    Ok(target)
}

fn write_gz(source: &Path, target: &Path) -> std::io::Result<()> {
    let mut input = BufReader::new(File::open(source)?);
    let output = BufWriter::new(File::create(target)?);
    let mut encoder = GzEncoder::new(output, Compression::default());
    std::io::copy(&mut input, &mut encoder)?;
    let mut output = encoder.finish()?;
    output.flush()?;
    output.get_ref().sync_all()
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(GZ_EXTENSION);
    PathBuf::from(name)
}
