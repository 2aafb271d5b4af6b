//! Line-span model of a GitHub workflow file.
//!
//! A workflow is split into four regions by anchor lines:
//!
//! ```text
//! on: ...                         <- events
//!   workflow_dispatch:
//!     inputs:
//!       <option>: ...             <- dispatch options
//! concurrency:
//!   ...                           <- concurrency
//! jobs:
//!   ...                           <- jobs
//! ```
//!
//! Each anchor includes the newline preceding it, so region text never carries
//! the line break that separates it from the next anchor.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

/// Indentation added per nesting level in workflow files.
pub const INDENT_STEP: usize = 2;

/// Indentation of option header lines below `    inputs:`.
pub const OPTION_INDENT: usize = 4 + INDENT_STEP;

const DISPATCH_LINE: &str = "  workflow_dispatch:\n";
const INPUTS_LINE: &str = "    inputs:\n";
const CONCURRENCY_LINE: &str = "concurrency:\n";
const JOBS_LINE: &str = "jobs:\n";

/// Fixed markers splitting a workflow file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Anchor {
    Dispatch,
    Concurrency,
    Jobs,
}

impl Anchor {
    /// The literal text of the marker
    pub fn marker(self) -> &'static str {
        match self {
            Anchor::Dispatch => "\n  workflow_dispatch:\n    inputs:\n",
            Anchor::Concurrency => "\nconcurrency:\n",
            Anchor::Jobs => "\njobs:\n",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.marker())
    }
}

/// Why a file could not be split into regions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorError {
    /// A required anchor occurs zero or several times
    Count { anchor: Anchor, count: usize },
    /// Required anchors are present but not in dispatch, concurrency, jobs order
    OutOfOrder,
}

impl fmt::Display for AnchorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorError::Count { anchor, count } => {
                write!(f, "expected {anchor} exactly once, found {count}")
            }
            AnchorError::OutOfOrder => {
                write!(f, "workflow_dispatch, concurrency and jobs are out of order")
            }
        }
    }
}

/// Byte span of one anchor occurrence, preceding newline included
#[derive(Debug, Clone, PartialEq, Eq)]
struct AnchorHit {
    anchor: Anchor,
    span: Range<usize>,
}

/// Find every anchor occurrence in one pass over the lines.
fn scan_anchors(text: &str) -> Vec<AnchorHit> {
    let lines: Vec<(usize, &str)> = text
        .split_inclusive('\n')
        .scan(0, |offset, line| {
            let start = *offset;
            *offset += line.len();
            Some((start, line))
        })
        .collect();

    let mut hits = Vec::new();
    // The first line has no preceding newline and can never start an anchor.
    for (i, &(start, line)) in lines.iter().enumerate().skip(1) {
        let end = start + line.len();
        let hit = match line {
            DISPATCH_LINE => match lines.get(i + 1) {
                Some(&(next_start, next)) if next == INPUTS_LINE => {
                    Some((Anchor::Dispatch, next_start + next.len()))
                }
                _ => None,
            },
            CONCURRENCY_LINE => Some((Anchor::Concurrency, end)),
            JOBS_LINE => Some((Anchor::Jobs, end)),
            _ => None,
        };
        if let Some((anchor, end)) = hit {
            hits.push(AnchorHit {
                anchor,
                span: start - 1..end,
            });
        }
    }
    hits
}

/// Locate each required anchor, which must occur exactly once and in order.
fn locate(text: &str, required: &[Anchor]) -> Result<Vec<Range<usize>>, AnchorError> {
    let hits = scan_anchors(text);
    let mut spans = Vec::with_capacity(required.len());
    for &anchor in required {
        let mut matching = hits.iter().filter(|h| h.anchor == anchor);
        match (matching.next(), matching.count()) {
            (Some(hit), 0) => spans.push(hit.span.clone()),
            (first, rest) => {
                return Err(AnchorError::Count {
                    anchor,
                    count: first.map_or(0, |_| 1 + rest),
                })
            }
        }
    }
    if spans.windows(2).any(|pair| pair[0].end > pair[1].start) {
        return Err(AnchorError::OutOfOrder);
    }
    Ok(spans)
}

/// A workflow carrying all three anchors (the root CI file and the CI files
/// composed inside each example)
#[derive(Debug, Clone)]
pub struct WorkflowDocument<'a> {
    text: &'a str,
    events: Range<usize>,
    dispatch: Range<usize>,
    concurrency: Range<usize>,
    jobs: Range<usize>,
}

impl<'a> WorkflowDocument<'a> {
    pub fn parse(text: &'a str) -> Result<Self, AnchorError> {
        let spans = locate(text, &[Anchor::Dispatch, Anchor::Concurrency, Anchor::Jobs])?;
        let (dispatch, concurrency, jobs) = (&spans[0], &spans[1], &spans[2]);
        Ok(Self {
            text,
            events: 0..dispatch.start,
            dispatch: dispatch.end..concurrency.start,
            concurrency: concurrency.end..jobs.start,
            jobs: jobs.end..text.len(),
        })
    }

    /// Trigger configuration before `workflow_dispatch:`
    pub fn events(&self) -> &'a str {
        &self.text[self.events.clone()]
    }

    /// The `workflow_dispatch` inputs, between `inputs:` and `concurrency:`
    pub fn dispatch(&self) -> &'a str {
        &self.text[self.dispatch.clone()]
    }

    pub fn concurrency(&self) -> &'a str {
        &self.text[self.concurrency.clone()]
    }

    pub fn jobs(&self) -> &'a str {
        &self.text[self.jobs.clone()]
    }

    pub fn option_blocks(&self) -> Vec<OptionBlock<'a>> {
        option_blocks(self.dispatch())
    }

    pub fn stray_dispatch_lines(&self) -> Vec<&'a str> {
        stray_dispatch_lines(self.dispatch())
    }
}

/// Jobs section of a standalone workflow, which only needs the jobs anchor
pub fn jobs_section(text: &str) -> Result<&str, AnchorError> {
    let spans = locate(text, &[Anchor::Jobs])?;
    Ok(&text[spans[0].end..])
}

/// One `workflow_dispatch` input: its header line plus nested lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionBlock<'a> {
    pub name: &'a str,
    /// Header through last nested line, without the final line break
    pub text: &'a str,
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Blank and comment lines carry no configuration of their own
fn is_filler(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Option blocks of a dispatch region plus the remaining non-filler lines
fn scan_dispatch(dispatch: &str) -> (Vec<OptionBlock<'_>>, Vec<&str>) {
    let lines: Vec<(usize, &str)> = dispatch
        .split_inclusive('\n')
        .scan(0, |offset, line| {
            let start = *offset;
            *offset += line.len();
            Some((start, line.trim_end_matches(['\n', '\r'])))
        })
        .collect();

    let mut blocks = Vec::new();
    let mut stray = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let (start, line) = lines[i];
        i += 1;
        if is_filler(line) {
            continue;
        }
        if indentation(line) != OPTION_INDENT {
            stray.push(line);
            continue;
        }

        let name = line.trim().trim_end_matches(':');
        let mut end = start + line.len();
        // Filler lines stay inside the block while nested lines follow them.
        while let Some(&(next_start, next)) = lines.get(i) {
            if is_filler(next) {
                i += 1;
                continue;
            }
            if indentation(next) < OPTION_INDENT + INDENT_STEP {
                break;
            }
            end = next_start + next.len();
            i += 1;
        }

        blocks.push(OptionBlock {
            name,
            text: &dispatch[start..end],
        });
    }

    (blocks, stray)
}

/// Split a dispatch region into option blocks.
///
/// A header is a non-blank line indented exactly [`OPTION_INDENT`]. The block
/// extends over the following lines indented at least one [`INDENT_STEP`]
/// deeper than the header, including blank and comment lines between them;
/// the first shallower line that is neither ends it.
pub fn option_blocks(dispatch: &str) -> Vec<OptionBlock<'_>> {
    scan_dispatch(dispatch).0
}

/// Lines of a dispatch region that belong to no option block, ignoring blank
/// and comment lines
pub fn stray_dispatch_lines(dispatch: &str) -> Vec<&str> {
    scan_dispatch(dispatch).1
}

/// Names of the given blocks
pub fn option_names<'a>(blocks: &[OptionBlock<'a>]) -> BTreeSet<&'a str> {
    blocks.iter().map(|b| b.name).collect()
}
