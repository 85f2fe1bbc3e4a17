//! Line scanner that finds fenced diagram blocks in a document.
//!
//! A block opens with a line that trims to `` ```<language> `` and closes with
//! the next line that trims to `` ``` ``. Lines in between are the diagram
//! source, kept verbatim. Every other line, including an unterminated block
//! and its opening fence, comes back unchanged as [`Segment::Line`].

/// A closed diagram block, borrowing from the scanned document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock<'a> {
    /// Zero-based line index of the opening fence.
    pub start_line: usize,
    /// Zero-based line index of the closing fence.
    pub end_line: usize,
    pub opening: &'a str,
    pub closing: &'a str,
    pub body: Vec<&'a str>,
}

impl<'a> DiagramBlock<'a> {
    /// Diagram source as handed to the renderer.
    pub fn source(&self) -> String {
        self.body.join("\n")
    }

    /// The block exactly as it appeared, fences included.
    pub fn original_lines(&self) -> impl Iterator<Item = &'a str> + '_ {
        std::iter::once(self.opening)
            .chain(self.body.iter().copied())
            .chain(std::iter::once(self.closing))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Line(&'a str),
    Diagram(DiagramBlock<'a>),
}

/// Split `content` on `\n` and group diagram blocks for `language`.
pub fn scan<'a>(content: &'a str, language: &str) -> Vec<Segment<'a>> {
    let opening_fence = format!("```{language}");
    let mut segments = Vec::new();
    let mut open: Option<(usize, &'a str, Vec<&'a str>)> = None;

    for (index, line) in content.split('\n').enumerate() {
        let trimmed = line.trim();
        match open.take() {
            None if trimmed == opening_fence => open = Some((index, line, Vec::new())),
            None => segments.push(Segment::Line(line)),
            Some((start_line, opening, body)) if trimmed == "```" => {
                segments.push(Segment::Diagram(DiagramBlock {
                    start_line,
                    end_line: index,
                    opening,
                    closing: line,
                    body,
                }));
            }
            Some((start_line, opening, mut body)) => {
                body.push(line);
                open = Some((start_line, opening, body));
            }
        }
    }

    // Unterminated: give the lines back untouched
    if let Some((_, opening, body)) = open {
        segments.push(Segment::Line(opening));
        segments.extend(body.into_iter().map(Segment::Line));
    }

    segments
}

/// Number of closed diagram blocks in `content`.
pub fn count_blocks(content: &str, language: &str) -> usize {
    scan(content, language)
        .iter()
        .filter(|s| matches!(s, Segment::Diagram(_)))
        .count()
}
