//! Line-oriented diff between an input file and its canonical rendition.
//!
//! Good enough for eyeballing what a rewrite would change: common prefix and
//! suffix are stripped first, the remaining middle goes through a longest
//! common subsequence pass. Output is colored in the familiar -/+ style.

use colored::Colorize;

/// One line of diff output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOp<'a> {
    Equal(&'a str),
    Delete(&'a str),
    Insert(&'a str),
}

/// Change counts for a computed diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub deleted: usize,
    pub inserted: usize,
}

impl DiffStats {
    pub fn is_unchanged(&self) -> bool {
        self.deleted == 0 && self.inserted == 0
    }
}

pub fn stats(ops: &[DiffOp<'_>]) -> DiffStats {
    let mut stats = DiffStats::default();
    for op in ops {
        match op {
            DiffOp::Delete(_) => stats.deleted += 1,
            DiffOp::Insert(_) => stats.inserted += 1,
            DiffOp::Equal(_) => {}
        }
    }
    stats
}

/// Beyond this many cells the quadratic middle pass is skipped and the
/// changed region reported wholesale.
const MAX_LCS_CELLS: usize = 4_000_000;

/// Compute a line diff. Equal lines are included so callers can render
/// context.
pub fn diff_lines<'a>(old: &'a str, new: &'a str) -> Vec<DiffOp<'a>> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    // Trim the common prefix and suffix; real project edits are local.
    let mut prefix = 0;
    while prefix < old_lines.len()
        && prefix < new_lines.len()
        && old_lines[prefix] == new_lines[prefix]
    {
        prefix += 1;
    }
    let mut suffix = 0;
    while suffix < old_lines.len() - prefix
        && suffix < new_lines.len() - prefix
        && old_lines[old_lines.len() - 1 - suffix] == new_lines[new_lines.len() - 1 - suffix]
    {
        suffix += 1;
    }

    let old_mid = &old_lines[prefix..old_lines.len() - suffix];
    let new_mid = &new_lines[prefix..new_lines.len() - suffix];

    let mut ops: Vec<DiffOp<'a>> = Vec::with_capacity(old_lines.len().max(new_lines.len()));
    ops.extend(old_lines[..prefix].iter().map(|l| DiffOp::Equal(l)));
    if old_mid.len().saturating_mul(new_mid.len()) > MAX_LCS_CELLS {
        ops.extend(old_mid.iter().map(|l| DiffOp::Delete(l)));
        ops.extend(new_mid.iter().map(|l| DiffOp::Insert(l)));
    } else {
        lcs_diff(old_mid, new_mid, &mut ops);
    }
    ops.extend(
        old_lines[old_lines.len() - suffix..]
            .iter()
            .map(|l| DiffOp::Equal(l)),
    );
    ops
}

/// Standard LCS dynamic program over the trimmed middle.
fn lcs_diff<'a>(old: &[&'a str], new: &[&'a str], ops: &mut Vec<DiffOp<'a>>) {
    let (n, m) = (old.len(), new.len());
    let mut table = vec![0u32; (n + 1) * (m + 1)];
    let idx = |i: usize, j: usize| i * (m + 1) + j;
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[idx(i, j)] = if old[i] == new[j] {
                table[idx(i + 1, j + 1)] + 1
            } else {
                table[idx(i + 1, j)].max(table[idx(i, j + 1)])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            ops.push(DiffOp::Equal(old[i]));
            i += 1;
            j += 1;
        } else if table[idx(i + 1, j)] >= table[idx(i, j + 1)] {
            ops.push(DiffOp::Delete(old[i]));
            i += 1;
        } else {
            ops.push(DiffOp::Insert(new[j]));
            j += 1;
        }
    }
    ops.extend(old[i..].iter().map(|l| DiffOp::Delete(l)));
    ops.extend(new[j..].iter().map(|l| DiffOp::Insert(l)));
}

/// Lines of equal context shown around each change.
const CONTEXT: usize = 2;

/// Render a diff for the terminal: deletions red, insertions green, long
/// unchanged stretches elided.
pub fn format_diff(ops: &[DiffOp<'_>]) -> String {
    let mut out = String::new();
    let mut pending_equal: Vec<&str> = Vec::new();
    let mut seen_change = false;

    for op in ops {
        match op {
            DiffOp::Equal(line) => pending_equal.push(line),
            _ => {
                flush_context(&mut out, &mut pending_equal, seen_change);
                seen_change = true;
                match op {
                    DiffOp::Delete(line) => {
                        out.push_str(&format!("{}\n", format!("-{line}").red()));
                    }
                    DiffOp::Insert(line) => {
                        out.push_str(&format!("{}\n", format!("+{line}").green()));
                    }
                    DiffOp::Equal(_) => {}
                }
            }
        }
    }
    if seen_change {
        for line in pending_equal.iter().take(CONTEXT) {
            out.push_str(&format!(" {line}\n"));
        }
        if pending_equal.len() > CONTEXT {
            out.push_str("...\n");
        }
    }
    out
}

fn flush_context(out: &mut String, pending: &mut Vec<&str>, seen_change: bool) {
    let keep_head = if seen_change { CONTEXT } else { 0 };
    if pending.len() > keep_head + CONTEXT {
        for line in &pending[..keep_head] {
            out.push_str(&format!(" {line}\n"));
        }
        out.push_str("...\n");
        for line in &pending[pending.len() - CONTEXT..] {
            out.push_str(&format!(" {line}\n"));
        }
    } else {
        for line in pending.iter() {
            out.push_str(&format!(" {line}\n"));
        }
    }
    pending.clear();
}
