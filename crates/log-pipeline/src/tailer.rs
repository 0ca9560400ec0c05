//! 로테이션 안전 테일러 — 라이브 로그 파일을 따라 읽어 버퍼에 추가
//!
//! # 상태 기계
//!
//! ```text
//!                 FileFound
//!  WAITING_FOR_FILE ───────> WATCHING <──────┐
//!        ^                     │             │ FileFound
//!        │ FileMissing         │ Renamed / Deleted / Created / restart
//!        └──────────────── RESTARTING ───────┘
//!
//!  (모든 상태) ── stop ──> STOPPED
//! ```
//!
//! 모든 전이는 [`transition`] 하나로 결정됩니다. 워커 루프는 현재 상태에 맞는
//! 동작(폴링, 감시, 재오픈)을 수행하고 그 결과를 [`TailerInput`]으로 되돌려줍니다.
//!
//! # 로테이션 안전성
//! - 감시는 로그 파일의 부모 디렉토리에 걸어 rename/재생성 이후에도 이벤트를 받습니다.
//! - rename/삭제를 감지하면 열린 핸들에 남은 바이트를 모두 읽은 뒤 재시작합니다.
//! - 재시작 시 경로가 같은 inode를 가리키면 오프셋을 유지하고(중복 방지),
//!   다른 파일이면 오프셋 0부터 읽습니다(손실 방지).
//! - 파일이 추적 오프셋보다 작아지면 (copy-truncate) 오프셋을 0으로 되돌립니다.
//! - 이벤트가 누락되어도 폴링 틱에서 inode 변경과 새 데이터를 확인합니다.

use std::io::SeekFrom;
#[cfg(unix)]
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use logharbor_core::control::RestartSignal;
use logharbor_core::error::LogharborError;
use logharbor_core::metrics as m;
use logharbor_core::record::LogRecord;

use crate::buffer::LogBuffer;
use crate::error::LogPipelineError;

/// 초기 꼬리 읽기 시 한 번에 거꾸로 읽는 블록 크기
const TAIL_CHUNK: u64 = 64 * 1024;

/// 제어 채널 용량 (재시작 요청은 합쳐질 수 있음)
const CONTROL_CAPACITY: usize = 4;

/// 테일러 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailerState {
    /// 로그 파일이 아직 없음
    WaitingForFile,
    /// 파일을 감시하며 추가분을 읽는 중
    Watching,
    /// 감시를 해제하고 다시 설정하는 중
    Restarting,
    /// 종료됨 (종착 상태)
    Stopped,
}

/// 파일시스템 이벤트 종류 (감시 대상 경로 기준)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsEvent {
    /// 데이터 추가 (또는 메타데이터 변경)
    Appended,
    /// 경로가 rename 되었거나 다른 파일로 대체됨
    Renamed,
    /// 경로가 삭제됨
    Deleted,
    /// 경로에 새 파일이 생성됨
    Created,
}

/// 상태 전이 입력
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailerInput {
    /// 경로에 파일이 존재함
    FileFound,
    /// 경로에 파일이 없음
    FileMissing,
    /// 파일시스템 이벤트
    Fs(FsEvent),
    /// 외부 재시작 요청
    RestartRequested,
    /// 종료 요청
    StopRequested,
}

/// 단일 상태 전이 함수
pub fn transition(state: TailerState, input: TailerInput) -> TailerState {
    use TailerInput::*;
    use TailerState::*;

    match (state, input) {
        (_, StopRequested) | (Stopped, _) => Stopped,

        (WaitingForFile, FileFound) => Watching,
        (WaitingForFile, _) => WaitingForFile,

        (Watching, Fs(FsEvent::Appended)) | (Watching, FileFound) => Watching,
        (Watching, Fs(FsEvent::Renamed | FsEvent::Deleted | FsEvent::Created))
        | (Watching, RestartRequested)
        | (Watching, FileMissing) => Restarting,

        (Restarting, FileFound) => Watching,
        (Restarting, FileMissing) => WaitingForFile,
        (Restarting, _) => Restarting,
    }
}

/// notify 이벤트를 감시 대상 기준의 [`FsEvent`]로 분류합니다.
///
/// 감시는 부모 디렉토리에 걸려 있으므로 파일명으로 대상을 식별합니다.
/// 대상과 무관한 이벤트나 접근 이벤트는 `None`입니다.
pub fn classify(event: &Event, target: &Path) -> Option<FsEvent> {
    let name = target.file_name()?;
    if !event.paths.iter().any(|p| p.file_name() == Some(name)) {
        return None;
    }

    match event.kind {
        EventKind::Create(_) => Some(FsEvent::Created),
        EventKind::Remove(_) => Some(FsEvent::Deleted),
        EventKind::Modify(ModifyKind::Name(_)) => Some(FsEvent::Renamed),
        EventKind::Modify(_) | EventKind::Any => Some(FsEvent::Appended),
        EventKind::Access(_) | EventKind::Other => None,
    }
}

/// 테일러 설정
#[derive(Debug, Clone)]
pub struct TailerConfig {
    /// 라이브 로그 파일 경로
    pub path: PathBuf,
    /// 처음 파일을 발견했을 때 미리 읽을 마지막 라인 수
    pub initial_lines: usize,
    /// 파일 대기 및 누락 이벤트 보정용 폴링 주기
    pub poll_interval: Duration,
}

impl TailerConfig {
    /// core 설정에서 테일러 설정을 만듭니다.
    pub fn from_core(config: &logharbor_core::LogharborConfig) -> Self {
        Self {
            path: config.paths.log_file.clone(),
            initial_lines: config.buffer.initial_lines,
            poll_interval: config.tailer.poll_interval(),
        }
    }
}

/// 외부 제어 메시지
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailerControl {
    /// 감시 재시작
    Restart,
}

/// 실행 중인 테일러를 제어하는 핸들
///
/// 복제하여 여러 곳(로테이션 엔진, SIGHUP 처리기)에서 사용할 수 있습니다.
#[derive(Debug, Clone)]
pub struct TailerHandle {
    control_tx: mpsc::Sender<TailerControl>,
    state_rx: watch::Receiver<TailerState>,
}

impl TailerHandle {
    /// 재시작을 요청합니다.
    ///
    /// 이미 대기 중인 요청으로 채널이 가득 차 있으면 합쳐진 것으로 간주합니다.
    pub fn restart(&self) -> Result<(), LogPipelineError> {
        match self.control_tx.try_send(TailerControl::Restart) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => Ok(()),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(LogPipelineError::TailerStopped),
        }
    }

    /// 현재 상태
    pub fn state(&self) -> TailerState {
        *self.state_rx.borrow()
    }

    /// 상태 변경을 구독합니다.
    pub fn subscribe(&self) -> watch::Receiver<TailerState> {
        self.state_rx.clone()
    }
}

impl RestartSignal for TailerHandle {
    fn request_restart(&self) -> Result<(), LogharborError> {
        self.restart().map_err(LogharborError::from)
    }
}

/// 열린 파일과 읽기 위치
struct Session {
    file: File,
    offset: u64,
    /// 개행을 아직 받지 못한 마지막 라인 조각
    pending: Vec<u8>,
    inode: Option<u64>,
}

/// 로테이션 안전 테일러
pub struct Tailer {
    config: TailerConfig,
    buffer: Arc<LogBuffer>,
    cancel: CancellationToken,
    control_rx: mpsc::Receiver<TailerControl>,
    control_open: bool,
    state: TailerState,
    state_tx: watch::Sender<TailerState>,
    session: Option<Session>,
    watcher: Option<RecommendedWatcher>,
    fs_rx: Option<mpsc::UnboundedReceiver<notify::Result<Event>>>,
    first_open: bool,
}

impl Tailer {
    /// 새 테일러와 제어 핸들을 생성합니다.
    pub fn new(
        config: TailerConfig,
        buffer: Arc<LogBuffer>,
        cancel: CancellationToken,
    ) -> (Self, TailerHandle) {
        let (control_tx, control_rx) = mpsc::channel(CONTROL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(TailerState::WaitingForFile);

        let tailer = Self {
            config,
            buffer,
            cancel,
            control_rx,
            control_open: true,
            state: TailerState::WaitingForFile,
            state_tx,
            session: None,
            watcher: None,
            fs_rx: None,
            first_open: true,
        };
        let handle = TailerHandle {
            control_tx,
            state_rx,
        };
        (tailer, handle)
    }

    /// 종료될 때까지 상태 기계를 실행합니다.
    pub async fn run(mut self) {
        info!(path = %self.config.path.display(), "tailer started");

        loop {
            let input = match self.state {
                TailerState::WaitingForFile => self.wait_for_file().await,
                TailerState::Watching => self.watch().await,
                TailerState::Restarting => self.restart().await,
                TailerState::Stopped => break,
            };
            self.apply(input).await;
        }

        self.watcher = None;
        self.session = None;
        info!(path = %self.config.path.display(), "tailer stopped");
    }

    async fn apply(&mut self, input: TailerInput) {
        let next = transition(self.state, input);
        if next == self.state {
            return;
        }
        debug!(from = ?self.state, to = ?next, ?input, "tailer transition");

        if next == TailerState::Watching && self.session.is_none() {
            // WAITING_FOR_FILE 또는 RESTARTING에서 파일을 발견함
            if let Err(e) = self.open().await {
                self.record_read_error(&e);
                self.set_state(TailerState::WaitingForFile);
                // 열 수 없는 파일을 바로 다시 시도하지 않도록 한 주기 대기
                tokio::select! {
                    _ = self.cancel.cancelled() => {}
                    _ = tokio::time::sleep(self.config.poll_interval) => {}
                }
                return;
            }
        }
        if next == TailerState::Restarting {
            counter!(m::TAILER_RESTARTS_TOTAL).increment(1);
        }
        self.set_state(next);
    }

    fn set_state(&mut self, state: TailerState) {
        self.state = state;
        self.state_tx.send_replace(state);
    }

    /// WAITING_FOR_FILE: 파일이 나타날 때까지 폴링
    async fn wait_for_file(&mut self) -> TailerInput {
        loop {
            if tokio::fs::metadata(&self.config.path).await.is_ok() {
                return TailerInput::FileFound;
            }
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return TailerInput::StopRequested,
                ctrl = self.control_rx.recv(), if self.control_open => {
                    // 파일이 없는 동안의 재시작 요청은 다음 폴링과 같음
                    if ctrl.is_none() {
                        self.control_open = false;
                    }
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }
    }

    /// WATCHING: 이벤트/제어/폴링 틱을 기다리며 추가분을 읽음
    async fn watch(&mut self) -> TailerInput {
        if self.watcher.is_none() {
            self.install_watcher();
        }

        let mut tick = tokio::time::interval(self.config.poll_interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // 설치 직후 놓친 추가분을 먼저 읽음
        self.read_appended().await;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return TailerInput::StopRequested;
                }
                ctrl = self.control_rx.recv(), if self.control_open => {
                    match ctrl {
                        Some(TailerControl::Restart) => {
                            info!("tailer restart requested");
                            self.read_appended().await;
                            return TailerInput::RestartRequested;
                        }
                        None => self.control_open = false,
                    }
                }
                res = recv_fs(&mut self.fs_rx) => {
                    match res {
                        Some(Ok(event)) => {
                            let Some(kind) = classify(&event, &self.config.path) else {
                                continue;
                            };
                            self.read_appended().await;
                            if kind != FsEvent::Appended {
                                info!(event = ?kind, path = %self.config.path.display(), "log file rotated");
                                return TailerInput::Fs(kind);
                            }
                        }
                        Some(Err(e)) => warn!(error = %e, "watch error"),
                        None => {
                            warn!("watch channel closed, falling back to polling");
                            self.watcher = None;
                            self.fs_rx = None;
                        }
                    }
                }
                _ = tick.tick() => {
                    self.read_appended().await;
                    if let Some(input) = self.check_identity().await {
                        return input;
                    }
                }
            }
        }
    }

    /// RESTARTING: 감시를 해제하고 같은 파일이면 세션 유지, 아니면 새로 열기
    async fn restart(&mut self) -> TailerInput {
        self.watcher = None;
        self.fs_rx = None;

        let (exists, inode) = match tokio::fs::metadata(&self.config.path).await {
            Ok(meta) => (true, inode_of(&meta)),
            Err(_) => (false, None),
        };

        if let Some(session) = &self.session {
            if exists && inode.is_some() && session.inode == inode {
                debug!("restart on unchanged file, keeping offset");
                return TailerInput::FileFound;
            }
        }

        if let Some(mut session) = self.session.take() {
            // 이전 핸들에 rename 이후 기록된 바이트까지 마저 읽음
            match read_new_lines(&mut session).await {
                Ok(lines) => {
                    self.buffer.append(&lines);
                }
                Err(e) => self.record_read_error(&LogPipelineError::Read {
                    path: self.config.path.clone(),
                    source: e,
                }),
            }
            self.flush_pending(session);
        }

        if exists {
            TailerInput::FileFound
        } else {
            TailerInput::FileMissing
        }
    }

    fn install_watcher(&mut self) {
        let dir = match self.config.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })
        .and_then(|mut w| w.watch(&dir, RecursiveMode::NonRecursive).map(|()| w));

        match watcher {
            Ok(w) => {
                debug!(dir = %dir.display(), "watch installed");
                self.watcher = Some(w);
                self.fs_rx = Some(rx);
            }
            Err(e) => {
                let err = LogPipelineError::Watch {
                    path: dir,
                    reason: e.to_string(),
                };
                warn!(error = %err, "failed to install watch, falling back to polling");
            }
        }
    }

    /// 파일을 엽니다. 최초 한 번은 마지막 `initial_lines`줄을, 이후에는 처음부터 읽습니다.
    async fn open(&mut self) -> Result<(), LogPipelineError> {
        let path = &self.config.path;
        let read_err = |e| LogPipelineError::Read {
            path: path.clone(),
            source: e,
        };
        let mut file = File::open(path).await.map_err(read_err)?;
        let meta = file.metadata().await.map_err(read_err)?;
        let inode = inode_of(&meta);

        let (offset, pending) = if self.first_open {
            let (lines, end, pending) = tail_lines(&mut file, meta.len(), self.config.initial_lines)
                .await
                .map_err(read_err)?;
            info!(
                path = %path.display(),
                initial = lines.len(),
                offset = end,
                "log file opened"
            );
            self.buffer.append(&lines);
            (end, pending)
        } else {
            info!(path = %path.display(), "log file reopened from start");
            (0, Vec::new())
        };
        self.first_open = false;

        self.session = Some(Session {
            file,
            offset,
            pending,
            inode,
        });
        Ok(())
    }

    /// 폴링 틱: 경로가 여전히 같은 파일을 가리키는지 확인
    async fn check_identity(&self) -> Option<TailerInput> {
        let session = self.session.as_ref()?;
        match tokio::fs::metadata(&self.config.path).await {
            Err(_) => Some(TailerInput::Fs(FsEvent::Deleted)),
            Ok(meta) => {
                let inode = inode_of(&meta);
                (inode.is_some() && inode != session.inode)
                    .then_some(TailerInput::Fs(FsEvent::Renamed))
            }
        }
    }

    /// 추적 오프셋 이후의 바이트를 읽어 완성된 라인을 버퍼에 추가합니다.
    ///
    /// 실패는 로그와 합성 에러 레코드로 남기고 감시는 계속됩니다.
    async fn read_appended(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match read_new_lines(session).await {
            Ok(lines) if !lines.is_empty() => {
                let out = self.buffer.append(&lines);
                debug!(lines = out.appended, offset = session.offset, "lines appended");
            }
            Ok(_) => {}
            Err(e) => {
                let err = LogPipelineError::Read {
                    path: self.config.path.clone(),
                    source: e,
                };
                self.record_read_error(&err);
            }
        }
    }

    /// 닫히는 파일에 남은 마지막 조각을 한 줄로 추가합니다.
    fn flush_pending(&self, session: Session) {
        if session.pending.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&session.pending).into_owned();
        self.buffer.append(&[line]);
    }

    fn record_read_error(&self, err: &LogPipelineError) {
        error!(error = %err, "failed to read log file");
        counter!(m::TAILER_READ_ERRORS_TOTAL).increment(1);
        self.buffer
            .append_records(vec![LogRecord::error(err.to_string())]);
    }
}

async fn recv_fs(
    rx: &mut Option<mpsc::UnboundedReceiver<notify::Result<Event>>>,
) -> Option<notify::Result<Event>> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(unix)]
fn inode_of(meta: &std::fs::Metadata) -> Option<u64> {
    Some(meta.ino())
}

#[cfg(not(unix))]
fn inode_of(_meta: &std::fs::Metadata) -> Option<u64> {
    None
}

/// 세션의 오프셋 이후 바이트를 읽어 완성된 라인들을 반환합니다.
///
/// 읽기 시점의 파일 크기까지만 읽고, 개행으로 끝나지 않은 조각은 보류합니다.
/// 파일이 오프셋보다 작아졌으면 처음부터 다시 읽습니다.
async fn read_new_lines(session: &mut Session) -> std::io::Result<Vec<String>> {
    let len = session.file.metadata().await?.len();

    if len < session.offset {
        warn!(
            offset = session.offset,
            len, "log file truncated, resetting offset"
        );
        session.offset = 0;
        session.pending.clear();
    }
    if len == session.offset {
        return Ok(Vec::new());
    }

    session.file.seek(SeekFrom::Start(session.offset)).await?;
    let want = len - session.offset;
    let mut chunk = Vec::with_capacity(usize::try_from(want).unwrap_or(0).min(8 * 1024 * 1024));
    (&mut session.file).take(want).read_to_end(&mut chunk).await?;
    session.offset += chunk.len() as u64;

    session.pending.extend_from_slice(&chunk);
    Ok(split_complete_lines(&mut session.pending))
}

/// `pending`에서 개행으로 끝나는 라인들을 꺼내고 나머지 조각은 남깁니다.
fn split_complete_lines(pending: &mut Vec<u8>) -> Vec<String> {
    let Some(last_nl) = pending.iter().rposition(|b| *b == b'\n') else {
        return Vec::new();
    };
    let rest = pending.split_off(last_nl + 1);
    let complete = std::mem::replace(pending, rest);

    complete
        .split(|b| *b == b'\n')
        .filter(|l| !l.is_empty() && *l != b"\r".as_slice())
        .map(|l| String::from_utf8_lossy(l).into_owned())
        .collect()
}

/// 파일 끝에서 거꾸로 읽어 마지막 `n`개의 완성된 라인을 찾습니다.
///
/// 반환값: (라인들, 읽기를 이어갈 오프셋 = 파일 크기, 끝의 미완성 조각)
async fn tail_lines(
    file: &mut File,
    len: u64,
    n: usize,
) -> std::io::Result<(Vec<String>, u64, Vec<u8>)> {
    let mut buf: Vec<u8> = Vec::new();
    let mut pos = len;

    while pos > 0 {
        let step = TAIL_CHUNK.min(pos);
        pos -= step;
        file.seek(SeekFrom::Start(pos)).await?;
        let mut chunk = vec![0u8; usize::try_from(step).unwrap_or(0)];
        file.read_exact(&mut chunk).await?;
        chunk.extend_from_slice(&buf);
        buf = chunk;

        if buf.contains(&b'\n') && lines_after_first_break(&buf) >= n {
            break;
        }
    }

    // 파일 중간에서 시작했으면 첫 개행까지는 잘린 라인
    if pos > 0 {
        if let Some(first_nl) = buf.iter().position(|b| *b == b'\n') {
            buf.drain(..=first_nl);
        }
    }

    let mut lines = split_complete_lines(&mut buf);
    if lines.len() > n {
        lines.drain(..lines.len() - n);
    }
    Ok((lines, len, buf))
}

/// 첫 개행 뒤부터 마지막 개행까지의 비어 있지 않은 라인 수
fn lines_after_first_break(buf: &[u8]) -> usize {
    let (Some(first), Some(last)) = (
        buf.iter().position(|b| *b == b'\n'),
        buf.iter().rposition(|b| *b == b'\n'),
    ) else {
        return 0;
    };
    buf[first + 1..=last]
        .split(|b| *b == b'\n')
        .filter(|l| !l.is_empty() && *l != b"\r".as_slice())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, RemoveKind, RenameMode};

    #[test]
    fn transition_table() {
        use TailerInput::*;
        use TailerState::*;

        assert_eq!(transition(WaitingForFile, FileMissing), WaitingForFile);
        assert_eq!(transition(WaitingForFile, FileFound), Watching);
        assert_eq!(transition(WaitingForFile, RestartRequested), WaitingForFile);
        assert_eq!(transition(Watching, Fs(FsEvent::Appended)), Watching);
        assert_eq!(transition(Watching, Fs(FsEvent::Renamed)), Restarting);
        assert_eq!(transition(Watching, Fs(FsEvent::Deleted)), Restarting);
        assert_eq!(transition(Watching, Fs(FsEvent::Created)), Restarting);
        assert_eq!(transition(Watching, RestartRequested), Restarting);
        assert_eq!(transition(Restarting, FileFound), Watching);
        assert_eq!(transition(Restarting, FileMissing), WaitingForFile);
        for state in [WaitingForFile, Watching, Restarting, Stopped] {
            assert_eq!(transition(state, StopRequested), Stopped);
        }
        assert_eq!(transition(Stopped, FileFound), Stopped);
    }

    #[test]
    fn classify_matches_by_file_name() {
        let target = Path::new("/var/log/logharbor/messages");

        let append = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(PathBuf::from("/var/log/logharbor/messages"));
        assert_eq!(classify(&append, target), Some(FsEvent::Appended));

        let rename = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::From)))
            .add_path(PathBuf::from("/var/log/logharbor/messages"));
        assert_eq!(classify(&rename, target), Some(FsEvent::Renamed));

        let remove = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/var/log/logharbor/messages"));
        assert_eq!(classify(&remove, target), Some(FsEvent::Deleted));

        let create = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/var/log/logharbor/messages"));
        assert_eq!(classify(&create, target), Some(FsEvent::Created));

        let other = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/var/log/logharbor/messages.2024-01-01_00-00-00-to-x"));
        assert_eq!(classify(&other, target), None);
    }

    #[test]
    fn split_keeps_partial_tail() {
        let mut pending = b"a|1\nb|2\npart".to_vec();
        let lines = split_complete_lines(&mut pending);
        assert_eq!(lines, vec!["a|1", "b|2"]);
        assert_eq!(pending, b"part");

        pending.extend_from_slice(b"ial\n");
        assert_eq!(split_complete_lines(&mut pending), vec!["partial"]);
        assert!(pending.is_empty());
    }

    #[test]
    fn split_without_newline_returns_nothing() {
        let mut pending = b"no newline yet".to_vec();
        assert!(split_complete_lines(&mut pending).is_empty());
        assert_eq!(pending, b"no newline yet");
    }

    #[tokio::test]
    async fn tail_lines_returns_last_n() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages");
        let content: String = (1..=100).map(|i| format!("t{i}||h|f|s|p|1|m\n")).collect();
        tokio::fs::write(&path, &content).await.unwrap();

        let mut file = File::open(&path).await.unwrap();
        let (lines, end, pending) = tail_lines(&mut file, content.len() as u64, 3).await.unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("t98|"));
        assert!(lines[2].starts_with("t100|"));
        assert_eq!(end, content.len() as u64);
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn tail_lines_drops_partial_line_at_chunk_start() {
        // Given: 마지막 청크가 첫 라인 중간에서 시작하고 나머지는 대부분 빈 줄
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages");
        let first = format!("t1||h|f|s|p|1|{}", "y".repeat(100));
        let last = "t2||h|f|s|p|2|last";
        let blanks = "\n".repeat(TAIL_CHUNK as usize - 60);
        let content = format!("{first}\n{blanks}{last}\n");
        tokio::fs::write(&path, &content).await.unwrap();

        // When
        let mut file = File::open(&path).await.unwrap();
        let (lines, _, pending) = tail_lines(&mut file, content.len() as u64, 5).await.unwrap();

        // Then: 잘린 조각 대신 온전한 라인만
        assert_eq!(lines, vec![first, last.to_owned()]);
        assert!(pending.is_empty());
    }

    #[test]
    fn counts_only_whole_non_blank_lines() {
        assert_eq!(lines_after_first_break(b"partial\na\n\n\nb\ntail"), 2);
        assert_eq!(lines_after_first_break(b"no newline"), 0);
        assert_eq!(lines_after_first_break(b"only one\n"), 0);
    }

    #[tokio::test]
    async fn read_new_lines_resets_on_truncate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages");
        tokio::fs::write(&path, "one\ntwo\n").await.unwrap();

        let mut session = Session {
            file: File::open(&path).await.unwrap(),
            offset: 0,
            pending: Vec::new(),
            inode: None,
        };
        assert_eq!(read_new_lines(&mut session).await.unwrap(), vec!["one", "two"]);

        // copy-truncate: 같은 inode에서 크기가 줄어듦
        tokio::fs::write(&path, "x\n").await.unwrap();
        assert_eq!(read_new_lines(&mut session).await.unwrap(), vec!["x"]);
        assert_eq!(session.offset, 2);
    }

    #[tokio::test]
    async fn handle_restart_fails_after_tailer_dropped() {
        let buffer = Arc::new(LogBuffer::new(10, 2));
        let (tailer, handle) = Tailer::new(
            TailerConfig {
                path: PathBuf::from("/nonexistent/messages"),
                initial_lines: 5,
                poll_interval: Duration::from_millis(10),
            },
            buffer,
            CancellationToken::new(),
        );
        assert_eq!(handle.state(), TailerState::WaitingForFile);
        assert!(handle.restart().is_ok());
        drop(tailer);
        assert!(matches!(
            handle.restart(),
            Err(LogPipelineError::TailerStopped)
        ));
    }
}
