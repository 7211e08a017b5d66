//! Marker-line section scanner.
//!
//! GEO SOFT-style documents concatenate named sections, each opened by a
//! line whose first byte is `[` and implicitly closed by the next marker
//! or end of document. The scanner is a two-state machine: `Idle` (no
//! section open, lines discarded) and `InSection` (lines buffered), with
//! an explicit finalize transition on each marker and at EOF.

/// A named, marker-delimited chunk of a raw text document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Name taken from the marker line, brackets stripped.
    pub name: String,
    /// Raw body lines between this marker and the next.
    pub lines: Vec<String>,
}

/// Scanner state.
enum ScanState {
    /// Before the first marker; body lines are document preamble.
    Idle,
    /// Accumulating lines for the named section.
    InSection { name: String, lines: Vec<String> },
}

impl ScanState {
    /// Finalize the active section, if any, and reset to `Idle`.
    fn finalize(&mut self, out: &mut Vec<Section>) {
        if let ScanState::InSection { name, lines } = std::mem::replace(self, ScanState::Idle) {
            out.push(Section { name, lines });
        }
    }
}

/// Split a document into its sections, in document order.
///
/// Marker lines contribute no data to either the section they close or
/// the one they open. A document with no markers yields no sections.
pub fn scan_sections(content: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut state = ScanState::Idle;

    for line in content.lines() {
        if line.starts_with('[') {
            state.finalize(&mut sections);
            state = ScanState::InSection {
                name: line.trim_end().trim_matches(['[', ']']).to_string(),
                lines: Vec::new(),
            };
            continue;
        }

        if let ScanState::InSection { lines, .. } = &mut state {
            lines.push(line.to_string());
        }
        // Idle: preamble before the first marker is discarded.
    }

    // EOF acts as an implicit closing marker.
    state.finalize(&mut sections);
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_two_sections() {
        let doc = "[A]\nx\ty\n1\t2\n[B]\nm\tn\n3\t4\n5\t6\n";
        let sections = scan_sections(doc);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].name, "A");
        assert_eq!(sections[0].lines, vec!["x\ty", "1\t2"]);
        assert_eq!(sections[1].name, "B");
        assert_eq!(sections[1].lines, vec!["m\tn", "3\t4", "5\t6"]);
    }

    #[test]
    fn no_markers_yields_no_sections() {
        let doc = "just\tsome\ntabular\tnoise\n";
        assert!(scan_sections(doc).is_empty());
    }

    #[test]
    fn preamble_before_first_marker_is_discarded() {
        let doc = "header comment\nmore preamble\n[Data]\na\tb\n1\t2\n";
        let sections = scan_sections(doc);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, "Data");
        assert_eq!(sections[0].lines, vec!["a\tb", "1\t2"]);
    }

    #[test]
    fn marker_opened_section_may_be_empty() {
        let doc = "[Empty]\n[Full]\na\n";
        let sections = scan_sections(doc);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].name, "Empty");
        assert!(sections[0].lines.is_empty());
        assert_eq!(sections[1].lines, vec!["a"]);
    }

    #[test]
    fn duplicate_names_produce_two_sections() {
        let doc = "[A]\nfirst\n[A]\nsecond\n";
        let sections = scan_sections(doc);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].lines, vec!["first"]);
        assert_eq!(sections[1].lines, vec!["second"]);
    }

    #[test]
    fn last_section_closed_at_eof_without_newline() {
        let doc = "[A]\nx\ty\n1\t2";
        let sections = scan_sections(doc);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].lines, vec!["x\ty", "1\t2"]);
    }
}
