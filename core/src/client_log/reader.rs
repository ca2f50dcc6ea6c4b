use crate::client_log::{LogParser, ReaderError};
use crate::context::TrackingSession;
use memchr::memchr_iter;
use memmap2::Mmap;
use std::fs;
use std::io::SeekFrom;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::RwLock;
use tokio::time::{Duration, sleep};

const DEFAULT_TAIL_POLL: Duration = Duration::from_millis(500);

/// Outcome of the bootstrap pass over the existing log file.
pub struct BootstrapResult {
    /// Lines in the bootstrap window (most recent `line_limit`).
    pub lines_scanned: usize,
    /// Lines actually replayed through the session.
    pub lines_replayed: usize,
    /// Byte offset the live tail resumes from.
    pub end_pos: u64,
}

pub struct Reader {
    path: PathBuf,
    session: Arc<RwLock<TrackingSession>>,
    tail_poll: Duration,
}

impl Reader {
    pub fn from(file_path: PathBuf, session: Arc<RwLock<TrackingSession>>) -> Self {
        Reader {
            path: file_path,
            session,
            tail_poll: DEFAULT_TAIL_POLL,
        }
    }

    pub fn with_tail_poll(mut self, poll: Duration) -> Self {
        self.tail_poll = poll;
        self
    }

    /// Replay the tail of an existing log file to rebuild tracker state.
    ///
    /// Scans the most recent `line_limit` lines backward for the latest
    /// area-enter line and replays forward from there, so the tracker picks
    /// up mid-session instead of chewing through the whole file history.
    pub async fn bootstrap_log_file(&self, line_limit: usize) -> Result<BootstrapResult, ReaderError> {
        let file = fs::File::open(&self.path).map_err(|source| ReaderError::OpenFile {
            path: self.path.clone(),
            source,
        })?;
        let mmap = unsafe {
            Mmap::map(&file).map_err(|source| ReaderError::MemoryMap {
                path: self.path.clone(),
                source,
            })?
        };
        let bytes = mmap.as_ref();
        let end_pos = bytes.len() as u64;

        // Find all line boundaries
        let mut line_ranges: Vec<(usize, usize)> = Vec::new();
        let mut start = 0;
        for end in memchr_iter(b'\n', bytes) {
            if end > start {
                line_ranges.push((start, end));
            }
            start = end + 1;
        }
        if start < bytes.len() {
            line_ranges.push((start, bytes.len()));
        }

        let window_start = line_ranges.len().saturating_sub(line_limit);
        let window = &line_ranges[window_start..];

        let lines: Vec<String> = window
            .iter()
            .map(|&(start, end)| {
                let end = if bytes[end - 1] == b'\r' { end - 1 } else { end };
                String::from_utf8_lossy(&bytes[start..end]).into_owned()
            })
            .collect();

        // Backward scan to the most recent area enter; nothing recognized
        // means the whole window is replayed (harmless, interaction lines
        // without an instance are no-ops).
        let replay_from = lines
            .iter()
            .rposition(|line| LogParser::is_area_enter(line))
            .unwrap_or(0);

        let replayed = &lines[replay_from..];
        {
            let mut session = self.session.write().await;
            session.process_lines(replayed.iter().map(String::as_str));
            session.current_byte = Some(end_pos);
        }

        Ok(BootstrapResult {
            lines_scanned: lines.len(),
            lines_replayed: replayed.len(),
            end_pos,
        })
    }

    /// Follow the live log file, feeding each complete line through one
    /// session transition. Blocks forever; run on a background task and
    /// abort to stop.
    pub async fn tail_log_file(self) -> Result<(), ReaderError> {
        let file = File::open(&self.path)
            .await
            .map_err(|source| ReaderError::OpenFile {
                path: self.path.clone(),
                source,
            })?;
        let mut reader = BufReader::new(file);

        let pos = self.session.read().await.current_byte.unwrap_or(0);
        reader
            .seek(SeekFrom::Start(pos))
            .await
            .map_err(|source| ReaderError::Seek {
                path: self.path.clone(),
                source,
            })?;

        let mut buf = Vec::new();
        loop {
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => {
                    sleep(self.tail_poll).await;
                }
                Ok(_) => {
                    // Only process complete lines; a partial line stays in
                    // buf and the next read appends to it.
                    if buf.ends_with(b"\n") {
                        let line = String::from_utf8_lossy(&buf);
                        let line = line.trim_end_matches(['\r', '\n']);
                        let mut session = self.session.write().await;
                        session.process_line(line);
                        if let Some(byte) = session.current_byte.as_mut() {
                            *byte += buf.len() as u64;
                        }
                        drop(session);
                        buf.clear();
                    }
                }
                Err(source) => {
                    return Err(ReaderError::ReadFile {
                        path: self.path.clone(),
                        source,
                    });
                }
            }
        }
    }
}
