//! # Comment Handling
//!
//! Collects comment tokens from the syntax tree and attaches doc comments to
//! declarations the way `go/ast` does: the run of comments on the lines
//! directly above a node, with no blank line or code in between.

use crate::parser::models::Comment;
use crate::span::Span;
use tree_sitter::Node;

/// Collects every comment in the tree, in source order.
///
/// Walks the tree iteratively so that deeply nested input cannot exhaust the stack.
pub(crate) fn collect_comments(root: Node<'_>, src: &[u8]) -> Vec<Comment> {
    let mut comments = Vec::new();
    let mut cursor = root.walk();

    loop {
        let node = cursor.node();
        if node.kind() == "comment" {
            comments.push(make_comment(node, src));
        }

        if cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return comments;
            }
        }
    }
}

fn make_comment(node: Node<'_>, src: &[u8]) -> Comment {
    let start = node.start_byte();
    let end = node.end_byte();
    let line_start = line_start(src, start);

    Comment {
        span: Span::new(start, end),
        text: String::from_utf8_lossy(&src[start..end]).into_owned(),
        start_row: node.start_position().row,
        end_row: node.end_position().row,
        own_line: is_blank(&src[line_start..start]),
    }
}

/// Returns the doc comments attached to a node starting at byte `start` on line `row`.
///
/// `comments` must be sorted by position, as returned by [`collect_comments`].
pub(crate) fn leading_docs(comments: &[Comment], src: &[u8], start: usize, row: usize) -> Vec<Comment> {
    let before = comments.partition_point(|c| c.span.end <= start);

    let mut docs = Vec::new();
    let mut boundary = start;
    let mut expected_row = row;

    for comment in comments[..before].iter().rev() {
        if !comment.own_line || comment.end_row + 1 != expected_row {
            break;
        }
        if !is_blank(&src[comment.span.end..boundary]) {
            break;
        }

        docs.push(comment.clone());
        boundary = comment.span.start;
        expected_row = comment.start_row;
    }

    docs.reverse();
    docs
}

/// Byte offset of the first character on the line containing `offset`.
pub(crate) fn line_start(src: &[u8], offset: usize) -> usize {
    src[..offset]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1)
}

pub(crate) fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
}
