use crate::error::StmtError;
use crate::extraction::{DocumentSource, PageContent};
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Rasterization resolution for OCR.
const OCR_DPI: &str = "300";

/// PDF backend using poppler-utils (`pdfinfo`, `pdftotext`, `pdftoppm`) and
/// `tesseract` for OCR.
///
/// Uses `pdftotext -layout` so that column alignment survives as runs of
/// spaces. The PDF bytes are kept in a temp file for the lifetime of the
/// source; every tool invocation is bounded by `timeout`.
pub struct PdftotextSource {
    file: tempfile::NamedTempFile,
    timeout: Duration,
}

impl PdftotextSource {
    pub fn from_bytes(pdf_bytes: &[u8], timeout: Duration) -> Result<Self, StmtError> {
        let mut file = tempfile::NamedTempFile::new()
            .map_err(|e| StmtError::DocumentUnreadable(e.to_string()))?;
        file.write_all(pdf_bytes)
            .map_err(|e| StmtError::DocumentUnreadable(e.to_string()))?;
        Ok(PdftotextSource { file, timeout })
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }

    fn run(&self, mut command: Command, tool: &str, page: usize) -> Result<Vec<u8>, StmtError> {
        run_tool(&mut command, tool, page, self.timeout)
    }
}

impl DocumentSource for PdftotextSource {
    fn page_count(&self) -> Result<usize, StmtError> {
        let mut command = Command::new("pdfinfo");
        command.arg(self.file.path());
        let output = self.run(command, "pdfinfo", 0)?;
        let info = String::from_utf8_lossy(&output);
        parse_page_count(&info).ok_or_else(|| {
            StmtError::DocumentUnreadable("pdfinfo reported no page count".into())
        })
    }

    fn page_content(&self, page_number: usize) -> Result<PageContent, StmtError> {
        let page = page_number.to_string();
        let mut command = Command::new("pdftotext");
        command
            .arg("-layout")
            .args(["-f", &page, "-l", &page])
            .arg(self.file.path())
            .arg("-");
        let output = self.run(command, "pdftotext", page_number)?;
        let text = String::from_utf8_lossy(&output);
        Ok(PageContent::from_text(
            page_number,
            text.trim_end_matches(['\x0c', '\n']),
        ))
    }

    fn rasterize_and_ocr(&self, page_number: usize) -> Result<Option<String>, StmtError> {
        let workdir = tempfile::tempdir()?;
        let prefix = workdir.path().join("page");
        let page = page_number.to_string();

        let mut rasterize = Command::new("pdftoppm");
        rasterize
            .args(["-f", &page, "-l", &page, "-r", OCR_DPI, "-png", "-singlefile"])
            .arg(self.file.path())
            .arg(&prefix);
        self.run(rasterize, "pdftoppm", page_number)?;

        let mut ocr = Command::new("tesseract");
        ocr.arg(prefix.with_extension("png")).arg("stdout");
        let output = self.run(ocr, "tesseract", page_number)?;

        let text = String::from_utf8_lossy(&output).trim().to_string();
        Ok(if text.is_empty() { None } else { Some(text) })
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

fn parse_page_count(info: &str) -> Option<usize> {
    info.lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|rest| rest.trim().parse().ok())
}

/// Run an external tool, killing it once `timeout` has elapsed.
///
/// Output pipes are drained on helper threads so a chatty child cannot block
/// on a full pipe while we poll for its exit.
fn run_tool(
    command: &mut Command,
    tool: &str,
    page: usize,
    timeout: Duration,
) -> Result<Vec<u8>, StmtError> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StmtError::ToolNotFound {
                    tool: tool.to_string(),
                }
            } else {
                StmtError::PageUnreadable {
                    page,
                    reason: format!("{tool} failed to start: {e}"),
                }
            }
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(StmtError::PageTimeout {
                page,
                seconds: timeout.as_secs(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();

    if !status.success() {
        return Err(StmtError::ToolFailed {
            tool: tool.to_string(),
            code: status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        });
    }

    Ok(stdout)
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}
