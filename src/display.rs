use std::io::Write;

pub trait ProgressDisplay {
    fn show(&mut self, text: &str);
}

/// Line-oriented display. A text identical to the last one written is
/// skipped, since a terminal appends where a page element would overwrite.
#[derive(Debug)]
pub struct TerminalDisplay<W: Write> {
    out: W,
    last: Option<String>,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ProgressDisplay for TerminalDisplay<W> {
    fn show(&mut self, text: &str) {
        if self.last.as_deref() == Some(text) {
            return;
        }
        match writeln!(self.out, "{text}").and_then(|_| self.out.flush()) {
            Ok(()) => self.last = Some(text.to_owned()),
            Err(err) => tracing::warn!(error = %err, "failed to write progress"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn repeated_text_is_written_once() {
        let mut display = TerminalDisplay::new(Vec::new());
        display.show("Downloading\n10%");
        display.show("Downloading\n10%");
        display.show("Downloading\n20%");
        display.show("Downloading\n10%");

        let out = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(
            out,
            "Downloading\n10%\nDownloading\n20%\nDownloading\n10%\n"
        );
    }

    struct Flaky {
        failures_left: usize,
        written: Vec<u8>,
    }

    impl Write for Flaky {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn text_lost_to_a_write_error_is_written_next_time() {
        let mut display = TerminalDisplay::new(Flaky {
            failures_left: 1,
            written: Vec::new(),
        });
        display.show("Downloading\n10%");
        display.show("Downloading\n10%");

        let out = String::from_utf8(display.into_inner().written).unwrap();
        assert_eq!(out, "Downloading\n10%\n");
    }
}
