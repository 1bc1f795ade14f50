use crate::config::LoggingConfig;
use regex::Regex;
use std::io;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

/// Rewrites each formatted line through the configured patterns before it
/// reaches the inner writer.
struct RedactingWriter<W> {
    inner: W,
    patterns: Vec<(Regex, String)>,
}

impl<W: io::Write> io::Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let mut redacted = s.to_string();
        for (re, replacement) in &self.patterns {
            redacted = re.replace_all(&redacted, replacement.as_str()).to_string();
        }
        self.inner.write_all(redacted.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter {
    patterns: Vec<(Regex, String)>,
}

impl<'a> fmt::MakeWriter<'a> for RedactingMakeWriter {
    // stdout carries command results, so logs go to stderr
    type Writer = RedactingWriter<io::Stderr>;

    fn make_writer(&self) -> Self::Writer {
        RedactingWriter {
            inner: io::stderr(),
            patterns: self.patterns.clone(),
        }
    }
}

fn compile_patterns(config: &LoggingConfig) -> Vec<(Regex, String)> {
    let mut patterns = Vec::new();
    if !config.redaction.enabled {
        return patterns;
    }
    for p in &config.redaction.patterns {
        match Regex::new(&p.regex) {
            Ok(re) => patterns.push((re, p.placeholder.clone())),
            Err(e) => eprintln!("warning: skipping redaction pattern '{}': {}", p.name, e),
        }
    }
    patterns
}

pub fn init_logging(config: &LoggingConfig) {
    // RUST_LOG wins over the configured levels
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level()));

    let show_file = config.format.location.show_file;
    let show_line = config.format.location.show_line;
    let make_writer = RedactingMakeWriter {
        patterns: compile_patterns(config),
    };

    // Use Layer::boxed() to unify the types of the branches
    let fmt_layer = if config.format.json {
        fmt::layer()
            .json()
            .with_writer(make_writer)
            .with_file(show_file)
            .with_line_number(show_line)
            .boxed()
    } else if !config.format.show_time {
        fmt::layer()
            .with_writer(make_writer)
            .with_target(show_file)
            .with_file(show_file)
            .with_line_number(show_line)
            .with_thread_ids(false)
            .without_time()
            .boxed()
    } else {
        fmt::layer()
            .with_writer(make_writer)
            .with_target(show_file)
            .with_file(show_file)
            .with_line_number(show_line)
            .with_thread_ids(false)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config, RedactionPattern};
    use std::io::Write;

    fn logging_with(patterns: Vec<RedactionPattern>, enabled: bool) -> LoggingConfig {
        let mut logging = load_config(None).unwrap().logging;
        logging.redaction.enabled = enabled;
        logging.redaction.patterns = patterns;
        logging
    }

    fn socket_pattern() -> RedactionPattern {
        RedactionPattern {
            name: "socket".into(),
            regex: r"/tmp/[\w.-]+\.sock".into(),
            placeholder: "<socket>".into(),
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_redacting_writer_replaces_matches() {
        let config = logging_with(vec![socket_pattern()], true);
        let mut writer = RedactingWriter {
            inner: Vec::new(),
            patterns: compile_patterns(&config),
        };
        let line = b"daemon listening on /tmp/calcctl.sock\n";
        let n = writer.write(line).unwrap();
        assert_eq!(n, line.len());
        assert_eq!(
            String::from_utf8(writer.inner).unwrap(),
            "daemon listening on <socket>\n"
        );
    }

    #[test]
    #[serial_test::serial]
    fn test_disabled_redaction_passes_through() {
        let config = logging_with(vec![socket_pattern()], false);
        assert!(compile_patterns(&config).is_empty());
    }

    #[test]
    #[serial_test::serial]
    fn test_invalid_pattern_is_skipped() {
        let bad = RedactionPattern {
            name: "bad".into(),
            regex: "(".into(),
            placeholder: "x".into(),
        };
        let config = logging_with(vec![bad, socket_pattern()], true);
        assert_eq!(compile_patterns(&config).len(), 1);
    }
}
