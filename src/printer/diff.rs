use colored::Colorize;
use difference::{Changeset, Difference};
use std::fmt;

/// Whether a line is shared by both strings or only present in one.
#[derive(Clone, Copy, PartialEq, Debug)]
enum Mode {
    Same,
    Add,
    Rem,
}

/// A line number, blank for lines missing from one side.
#[derive(PartialEq, Debug)]
struct Lineno(Option<usize>);

impl fmt::Display for Lineno {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            None => f.pad(""),
            Some(lineno) => f.pad(&lineno.to_string()),
        }
    }
}

/// One line of a diff with its position in the old and new strings.
#[derive(PartialEq, Debug)]
struct Line<'a> {
    mode: Mode,
    old: Lineno,
    new: Lineno,
    text: &'a str,
}

/// Split a changeset into lines, numbering each side separately.
fn numbered_lines(changes: &Changeset) -> Vec<Line> {
    let (mut old, mut new) = (0, 0);
    let mut lines = Vec::new();
    for diff in &changes.diffs {
        let (mode, chunk) = match diff {
            Difference::Same(chunk) => (Mode::Same, chunk),
            Difference::Add(chunk) => (Mode::Add, chunk),
            Difference::Rem(chunk) => (Mode::Rem, chunk),
        };
        for text in chunk.split('\n') {
            if mode != Mode::Add {
                old += 1;
            }
            if mode != Mode::Rem {
                new += 1;
            }
            lines.push(Line {
                mode,
                old: Lineno(Some(old).filter(|_| mode != Mode::Add)),
                new: Lineno(Some(new).filter(|_| mode != Mode::Rem)),
                text: text.trim_end(),
            });
        }
    }
    lines
}

/// Render a line diff from `org` to `new` with line numbers on both sides.
/// Removed lines are marked `-`, added lines `+`.
pub fn gen_diff(org: &str, new: &str, color: bool) -> String {
    let changes = &Changeset::new(org, new, "\n");
    let mut buf = String::new();
    for line in numbered_lines(changes) {
        let text = line.text;
        let (marker, text) = match (line.mode, color) {
            (Mode::Add, true) => {
                ("+".green().to_string(), text.green().to_string())
            }
            (Mode::Rem, true) => ("-".red().to_string(), text.red().to_string()),
            (Mode::Same, true) => (" ".to_string(), text.dimmed().to_string()),
            (Mode::Add, false) => ("+".to_string(), text.to_string()),
            (Mode::Rem, false) => ("-".to_string(), text.to_string()),
            (Mode::Same, false) => (" ".to_string(), text.to_string()),
        };
        buf.push_str(&format!(
            "{:>3} {:>3}│{}{}\n",
            line.old, line.new, marker, text
        ));
    }
    buf.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::gen_diff;

    #[test]
    fn marks_changed_lines() {
        let diff = gen_diff("one\ntwo\nthree", "one\n2\nthree", false);
        let lines: Vec<&str> = diff.lines().collect();
        assert!(lines.iter().any(|l| l.ends_with("│-two")), "{}", diff);
        assert!(lines.iter().any(|l| l.ends_with("│+2")), "{}", diff);
        assert!(lines.iter().any(|l| l.ends_with("│ one")), "{}", diff);
    }

    #[test]
    fn removed_lines_have_no_new_number() {
        let diff = gen_diff("keep\ndrop", "keep", false);
        assert!(diff.lines().any(|l| l == "  2    │-drop"), "{}", diff);
    }

    #[test]
    fn identical_text_has_no_markers() {
        let diff = gen_diff("a\nb", "a\nb", false);
        assert!(!diff.contains("│+") && !diff.contains("│-"), "{}", diff);
    }
}
