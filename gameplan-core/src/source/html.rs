//! Low-level HTML string helpers for the schedule table.
//! Tag names are matched case-insensitively.

/// Find the next complete tag block from `from` onwards.
/// A block spans from the start of the opening tag to the end of the
/// closing tag, e.g. `<tr ...> ... </tr>`.
pub fn next_tag_block_ci(
    s: &str,
    open_tag: &str,
    close_tag: &str,
    from: usize,
) -> Option<(usize, usize)> {
    let lc = to_lowercase_fast(s);
    let open_lc = to_lowercase_fast(open_tag);
    let close_lc = to_lowercase_fast(close_tag);

    let start = lc.get(from..)?.find(&open_lc)? + from;
    let open_end = s[start..].find('>')? + start + 1;
    let end_rel = lc[open_end..].find(&close_lc)?;
    let end = open_end + end_rel + close_tag.len();
    Some((start, end))
}

/// All blocks of one tag inside `s`, in document order.
pub fn tag_blocks<'a>(s: &'a str, open_tag: &str, close_tag: &str) -> Vec<&'a str> {
    let mut blocks = Vec::new();
    let mut pos = 0usize;
    while let Some((start, end)) = next_tag_block_ci(s, open_tag, close_tag, pos) {
        blocks.push(&s[start..end]);
        pos = end;
    }
    blocks
}

/// Text content of a block such as `<td ...>INNER</td>`: tags stripped,
/// entities decoded, whitespace collapsed.
pub fn cell_text(block: &str) -> String {
    normalize_ws(&normalize_entities(&strip_tags(inner_after_open_tag(block))))
}

fn inner_after_open_tag(block: &str) -> &str {
    match (block.find('>'), block.rfind('<')) {
        (Some(open_end), Some(close_start)) if close_start > open_end => {
            &block[open_end + 1..close_start]
        }
        _ => "",
    }
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Minimal entity decoding for what the schedule site emits.
fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
}

/// Collapse whitespace runs into one space and trim.
fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// ASCII-only lowercasing, keeps byte offsets intact.
fn to_lowercase_fast(s: &str) -> String {
    s.chars().map(|c| c.to_ascii_lowercase()).collect()
}
