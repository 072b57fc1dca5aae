// Marker-block patching.
// Replaces every well-formed block in place, or appends one when none exists.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

/// Prefix of the last-update comment.
pub const TIMESTAMP_PREFIX: &str = "<!-- LAST_UPDATE:";

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{}.*?-->", regex::escape(TIMESTAMP_PREFIX)))
        .expect("timestamp marker pattern is valid")
});

/// Start/end comment sentinels around a generated region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPair {
    pub start: String,
    pub end: String,
}

impl MarkerPair {
    /// `<!-- NAME_START -->` / `<!-- NAME_END -->`.
    pub fn named(name: &str) -> Self {
        Self {
            start: format!("<!-- {name}_START -->"),
            end: format!("<!-- {name}_END -->"),
        }
    }

    pub fn wrap(&self, content: &str) -> String {
        format!("{}\n{}\n{}", self.start, content, self.end)
    }

    /// Byte spans of every block, each the narrowest start..end match.
    fn spans(&self, doc: &str) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut cursor = 0;

        while let Some(rel) = doc[cursor..].find(&self.end) {
            let end_at = cursor + rel;
            let block_end = end_at + self.end.len();
            if let Some(start_rel) = doc[cursor..end_at].rfind(&self.start) {
                spans.push((cursor + start_rel, block_end));
            }
            cursor = block_end;
        }

        spans
    }
}

/// Replace the block delimited by `markers`, or append it if absent.
pub fn replace_block(doc: &str, markers: &MarkerPair, content: &str) -> String {
    let block = markers.wrap(content);
    let spans = markers.spans(doc);

    if spans.is_empty() {
        return format!("{doc}\n\n{block}");
    }

    let mut out = String::with_capacity(doc.len() + block.len());
    let mut cursor = 0;
    for (start, end) in spans {
        out.push_str(&doc[cursor..start]);
        out.push_str(&block);
        cursor = end;
    }
    out.push_str(&doc[cursor..]);
    out
}

/// Rewrite the last-update comment, or append it if absent.
pub fn replace_timestamp(doc: &str, stamp: &str) -> String {
    let marker = format!("{TIMESTAMP_PREFIX} {stamp} -->");
    if TIMESTAMP_RE.is_match(doc) {
        TIMESTAMP_RE.replace_all(doc, NoExpand(&marker)).into_owned()
    } else {
        format!("{doc}\n\n{marker}")
    }
}
