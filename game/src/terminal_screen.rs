use std::io::{stdout, Stdout, Write};

use tracing::debug;
use vowel_race::Screen;

const CLEAR_AND_HOME: &str = "\x1B[2J\x1B[1;1H";

/// Renders frames on a terminal. Without clearing, only lines that were not
/// printed by an earlier frame of the same round are written.
pub struct TerminalScreen<W: Write = Stdout> {
    out: W,
    clear: bool,
    printed: usize,
}

impl TerminalScreen {
    pub fn new(clear: bool) -> TerminalScreen {
        TerminalScreen::with_writer(stdout(), clear)
    }
}

impl<W: Write> TerminalScreen<W> {
    pub fn with_writer(out: W, clear: bool) -> TerminalScreen<W> {
        TerminalScreen { out, clear, printed: 0 }
    }

    fn write_lines(&mut self, lines: &[String]) -> std::io::Result<()> {
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }
}

impl<W: Write> Screen for TerminalScreen<W> {
    fn begin_round(&mut self) {
        self.printed = 0;
    }

    fn clear(&mut self) {
        if self.clear {
            if let Err(e) = write!(self.out, "{CLEAR_AND_HOME}") {
                debug!("could not clear the terminal: {e}");
            }
            self.printed = 0;
        }
    }

    fn show(&mut self, lines: &[String]) {
        if lines.len() < self.printed {
            self.printed = 0;
        }
        let start = self.printed;
        match self.write_lines(&lines[start..]) {
            Ok(()) => self.printed = lines.len(),
            Err(e) => debug!("could not write to the terminal: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    fn render(screen: &mut TerminalScreen<Vec<u8>>, lines: &[&str]) -> String {
        screen.out.clear();
        screen.clear();
        screen.show(&frame(lines));
        String::from_utf8(screen.out.clone()).unwrap()
    }

    #[test]
    fn without_clearing_only_new_lines_are_written() {
        let mut screen = TerminalScreen::with_writer(Vec::new(), false);
        screen.begin_round();
        assert_eq!(render(&mut screen, &["header", "m1"]), "header\nm1\n");
        assert_eq!(render(&mut screen, &["header", "m1", "m2"]), "m2\n");
        assert_eq!(render(&mut screen, &["header", "m1", "m2"]), "");
    }

    #[test]
    fn next_round_starts_with_its_header() {
        let mut screen = TerminalScreen::with_writer(Vec::new(), false);
        screen.begin_round();
        assert_eq!(render(&mut screen, &["header round 1"]), "header round 1\n");

        screen.begin_round();
        assert_eq!(
            render(&mut screen, &["header round 2", "m1", "m2"]),
            "header round 2\nm1\nm2\n"
        );
    }

    #[test]
    fn clearing_redraws_the_whole_frame() {
        let mut screen = TerminalScreen::with_writer(Vec::new(), true);
        screen.begin_round();
        render(&mut screen, &["header", "m1"]);
        assert_eq!(
            render(&mut screen, &["header", "m1", "m2"]),
            format!("{CLEAR_AND_HOME}header\nm1\nm2\n")
        );
    }
}
