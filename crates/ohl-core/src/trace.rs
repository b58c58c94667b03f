//! 실행 추적 로그.
//!
//! 한 번의 분석 실행 동안 발생한 디버그 메시지를 순서대로 모아두었다가
//! 실행이 끝나면 파일 하나로 기록합니다. 추가된 메시지는 `tracing::debug!`로도
//! 즉시 출력됩니다.

use std::io::{self, BufWriter, Write};
use std::path::Path;

/// 순서가 보장되는 추적 메시지 모음.
#[derive(Debug, Default, Clone)]
pub struct TraceLog {
    lines: Vec<String>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 메시지를 추가합니다.
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(target: "ohl::trace", "{}", line);
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 줄 단위로 파일에 기록합니다.
    pub fn write_to(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(std::fs::File::create(path)?);
        for line in &self.lines {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_keeps_order_and_writes() {
        let mut trace = TraceLog::new();
        trace.push("first");
        trace.push(format!("second {}", 2));
        trace.push("third");

        assert_eq!(trace.lines(), ["first", "second 2", "third"]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("analysis_debug.log");
        trace.write_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond 2\nthird\n");
    }
}
