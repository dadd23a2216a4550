//! Test-side YAML reader.
//!
//! The crate takes its parse tree from the host, so tests build one with this
//! small block-YAML reader instead. It covers what the fixtures use: nested
//! mappings, `-` sequences (including `- key: value` items), plain and quoted
//! scalars, one-line flow sequences, comments and `---` separators. Offsets
//! are character offsets, like the host's.
#![allow(dead_code)]

use tekton_graph::parse::{NodeId, ParseTree, ParsedDocuments, YamlDocument};

// =============================================================================
// Reader
// =============================================================================

/// One logical line. `- a: 1` becomes a dash line plus a content line.
#[derive(Debug, Clone)]
struct Line {
    indent: usize,
    /// Character offset of the first content character.
    start: usize,
    text: Vec<char>,
    dash: bool,
}

struct Reader<'a> {
    chars: &'a [char],
    lines: Vec<Line>,
    pos: usize,
    tree: &'a mut ParseTree,
}

impl Reader<'_> {
    fn peek(&self) -> Option<&Line> {
        self.lines.get(self.pos)
    }

    fn raw(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    fn end_of(&self, id: NodeId) -> usize {
        self.tree.node(id).end
    }

    fn block(&mut self, indent: usize) -> Option<NodeId> {
        let line = self.peek()?.clone();
        if line.dash {
            return Some(self.sequence(indent));
        }
        if split_key(&line.text).is_some() {
            return Some(self.mapping(indent));
        }
        self.pos += 1;
        Some(self.inline(line.start, &line.text))
    }

    fn sequence(&mut self, indent: usize) -> NodeId {
        let mut items = Vec::new();
        let mut start = None;
        let mut end = 0;

        while let Some(line) = self.peek().filter(|l| l.indent == indent && l.dash).cloned() {
            start.get_or_insert(line.start);
            end = line.start + 1;
            self.pos += 1;
            let Some(next) = self.peek().filter(|l| l.indent > indent).cloned() else {
                continue;
            };
            if let Some(item) = self.block(next.indent) {
                end = self.end_of(item);
                items.push(item);
            }
        }

        let start = start.unwrap_or(end);
        let raw = self.raw(start, end);
        self.tree.sequence(items, raw, start, end)
    }

    fn mapping(&mut self, indent: usize) -> NodeId {
        let mut pairs = Vec::new();
        while let Some(line) = self.peek().filter(|l| l.indent == indent && !l.dash).cloned() {
            self.pos += 1;
            pairs.push(self.pair(&line));
        }

        let start = pairs.first().map(|&p| self.tree.node(p).start).unwrap_or(0);
        let end = pairs.last().map(|&p| self.end_of(p)).unwrap_or(start);
        let raw = self.raw(start, end);
        self.tree.mapping(pairs, raw, start, end)
    }

    fn pair(&mut self, line: &Line) -> NodeId {
        let colon = split_key(&line.text).unwrap_or(line.text.len());
        let key_text: String = line.text[..colon].iter().collect();
        let key = self.tree.scalar(key_text, line.start, line.start + colon);

        let after = (colon + 1).min(line.text.len());
        let spaces = line.text[after..].iter().take_while(|c| **c == ' ').count();
        let rest = &line.text[after + spaces..];

        let (value, end) = if !rest.is_empty() {
            let value = self.inline(line.start + after + spaces, rest);
            (Some(value), self.end_of(value))
        } else {
            let nested = self
                .peek()
                .filter(|next| next.indent > line.indent || (next.indent == line.indent && next.dash))
                .map(|next| next.indent);
            match nested.and_then(|indent| self.block(indent)) {
                Some(value) => (Some(value), self.end_of(value)),
                None => (None, line.start + after),
            }
        };
        self.tree.pair(key, value, line.start, end)
    }

    /// A one-line scalar or flow sequence starting at `start`.
    fn inline(&mut self, start: usize, text: &[char]) -> NodeId {
        let end = start + text.len();
        if text.first() != Some(&'[') {
            return self.tree.scalar(text.iter().collect::<String>(), start, end);
        }

        let mut items = Vec::new();
        let inner_end = text.iter().rposition(|c| *c == ']').unwrap_or(text.len());
        let mut piece_start = 1;
        for i in 1..=inner_end {
            if i < inner_end && text[i] != ',' {
                continue;
            }
            let piece = &text[piece_start..i];
            let lead = piece.iter().take_while(|c| c.is_whitespace()).count();
            let trimmed_len = piece.len() - piece.iter().rev().take_while(|c| c.is_whitespace()).count();
            if trimmed_len > lead {
                let from = start + piece_start + lead;
                let value: String = piece[lead..trimmed_len].iter().collect();
                items.push(self.tree.scalar(value, from, start + piece_start + trimmed_len));
            }
            piece_start = i + 1;
        }

        let raw: String = text.iter().collect();
        self.tree.sequence(items, raw, start, end)
    }
}

/// Index of the `:` ending a mapping key, if the line is a `key: value` pair.
fn split_key(text: &[char]) -> Option<usize> {
    if let Some(&quote) = text.first().filter(|c| **c == '"' || **c == '\'') {
        let close = text[1..].iter().position(|c| *c == quote)? + 1;
        return (text.get(close + 1) == Some(&':')).then_some(close + 1);
    }
    if text.first() == Some(&'[') {
        return None;
    }
    (0..text.len()).find(|&i| text[i] == ':' && (i + 1 == text.len() || text[i + 1] == ' '))
}

/// Drop a trailing ` # comment` that is not inside quotes.
fn strip_comment(text: &[char]) -> &[char] {
    let mut quote = None;
    for (i, &c) in text.iter().enumerate() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '#' && (i == 0 || text[i - 1] == ' ') => return trim_end(&text[..i]),
            None => {}
        }
    }
    trim_end(text)
}

fn trim_end(text: &[char]) -> &[char] {
    let len = text.len() - text.iter().rev().take_while(|c| c.is_whitespace()).count();
    &text[..len]
}

fn logical_lines(line_start: usize, content: &[char], mut indent: usize, out: &mut Vec<Line>) {
    let mut rest = content;
    loop {
        if rest.first() == Some(&'-') && (rest.len() == 1 || rest[1] == ' ') {
            out.push(Line {
                indent,
                start: line_start + indent,
                text: vec!['-'],
                dash: true,
            });
            let skip = 1 + rest[1..].iter().take_while(|c| **c == ' ').count();
            if skip >= rest.len() {
                return;
            }
            indent += skip;
            rest = &rest[skip..];
            continue;
        }
        out.push(Line {
            indent,
            start: line_start + indent,
            text: rest.to_vec(),
            dash: false,
        });
        return;
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Parse `text` into the arena form the crate consumes.
pub fn parse(text: &str) -> ParsedDocuments {
    let chars: Vec<char> = text.chars().collect();
    let mut tree = ParseTree::new();
    let mut documents = Vec::new();

    // (segment start, segment end, lines)
    let mut segments: Vec<(usize, usize, Vec<Line>)> = vec![(0, chars.len(), Vec::new())];
    let mut offset = 0;
    for raw_line in text.split('\n') {
        let line: Vec<char> = raw_line.chars().collect();
        let line_start = offset;
        offset += line.len() + 1;

        if trim_end(&line).iter().collect::<String>() == "---" {
            if let Some(last) = segments.last_mut() {
                last.1 = line_start;
            }
            segments.push((offset.min(chars.len()), chars.len(), Vec::new()));
            continue;
        }

        let indent = line.iter().take_while(|c| **c == ' ').count();
        let content = strip_comment(&line[indent..]);
        if content.is_empty() {
            continue;
        }
        if let Some(last) = segments.last_mut() {
            logical_lines(line_start, content, indent, &mut last.2);
        }
    }

    for (start, end, lines) in segments {
        let Some(first) = lines.first().map(|l| l.indent) else {
            continue;
        };
        let mut reader = Reader {
            chars: &chars,
            lines,
            pos: 0,
            tree: &mut tree,
        };
        let nodes = reader.block(first).into_iter().collect();
        documents.push(YamlDocument {
            nodes,
            errors: Vec::new(),
            start,
            end,
        });
    }

    ParsedDocuments { tree, documents }
}

/// Character offset of the first occurrence of `needle`.
pub fn offset_of(text: &str, needle: &str) -> usize {
    let byte = text
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not in fixture"));
    text[..byte].chars().count()
}

/// Character offset of the `nth` (0-based) occurrence of `needle`.
pub fn nth_offset_of(text: &str, needle: &str, nth: usize) -> usize {
    let (byte, _) = text
        .match_indices(needle)
        .nth(nth)
        .unwrap_or_else(|| panic!("{needle:?} #{nth} not in fixture"));
    text[..byte].chars().count()
}

// =============================================================================
// Fixtures
// =============================================================================

/// Two tasks, the second running after the first.
pub const SEQUENTIAL: &str = "\
apiVersion: tekton.dev/v1beta1
kind: Pipeline
metadata:
  name: build-and-deploy
spec:
  tasks:
    - name: build
      taskRef:
        name: buildah
    - name: deploy
      runAfter:
        - build
      taskRef:
        name: kubectl
        kind: ClusterTask
";

/// Resource wiring, result references, a condition and a finally block.
pub const FULL: &str = "\
apiVersion: tekton.dev/v1beta1
kind: Pipeline
metadata:
  name: release
spec:
  resources:
    - name: source-repo
      type: git
    - name: app-image
      type: image
  tasks:
    - name: fetch
      taskRef:
        name: git-clone
      resources:
        outputs:
          - name: repo
            resource: source-repo
    - name: test
      taskRef:
        name: unit-tests
      resources:
        inputs:
          - name: repo
            resource: source-repo
            from: [fetch]
    - name: build
      taskRef:
        name: buildah
      params:
        - name: commit
          value: \"$(tasks.fetch.results.commit)\"
      conditions:
        - conditionRef: tests-passed
          resources:
            - name: repo
              resource: source-repo
              from:
                - test
  finally:
    - name: notify
      taskRef:
        name: slack
";

/// A `when` guard whose input reads a result of another task.
pub const WHEN_GUARD: &str = "\
apiVersion: tekton.dev/v1beta1
kind: Pipeline
metadata:
  name: guarded
spec:
  tasks:
    - name: check
      taskRef:
        name: checker
    - name: deploy
      taskRef:
        name: kubectl
      when:
        - input: \"$(tasks.check.results.ok)\"
          operator: in
          values: [\"true\"]
";

/// A run that references its Pipeline by name.
pub const RUN_BY_REF: &str = "\
apiVersion: tekton.dev/v1beta1
kind: PipelineRun
metadata:
  name: build-and-deploy-run-1
spec:
  pipelineRef:
    name: build-and-deploy
";

/// A run with its Pipeline inline.
pub const RUN_INLINE: &str = "\
apiVersion: tekton.dev/v1beta1
kind: PipelineRun
metadata:
  name: inline-run
spec:
  pipelineSpec:
    tasks:
      - name: only
        taskSpec:
          description: inline task
";

/// Fetched status of `build-and-deploy-run-1`.
pub const RUN_STATUS: &str = "\
apiVersion: tekton.dev/v1beta1
kind: PipelineRun
metadata:
  name: build-and-deploy-run-1
status:
  taskRuns:
    build-and-deploy-run-1-build-abcde:
      pipelineTaskName: build
      status:
        conditions:
          - type: Succeeded
            status: \"True\"
            reason: Succeeded
        startTime: \"2021-01-01T00:00:00Z\"
        completionTime: \"2021-01-01T00:01:30Z\"
        steps:
          - name: build
            terminated:
              exitCode: 0
          - name: push
            terminated:
              exitCode: 0
    build-and-deploy-run-1-deploy-fghij:
      pipelineTaskName: deploy
      status:
        conditions:
          - type: Succeeded
            status: Unknown
            reason: Running
        startTime: \"2021-01-01T00:02:00Z\"
        steps:
          - name: apply
            terminated:
              exitCode: 0
          - name: wait
";
