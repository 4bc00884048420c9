//! Plain-text rendering of a plan.

use crate::plan::{Plan, RenameOperation};
use unicode_width::UnicodeWidthStr;

struct Line {
    verb: &'static str,
    subject: String,
    target: Option<String>,
}

fn line(op: &RenameOperation) -> Line {
    match op {
        RenameOperation::TableRename {
            table_from,
            table_to,
        } => Line {
            verb: "rename table",
            subject: table_from.clone(),
            target: Some(table_to.clone()),
        },
        RenameOperation::ColumnEdit {
            table_from,
            column_from,
            column_to,
            new_type,
        } => {
            let subject = format!("{}.{}", table_from, column_from);
            let rename = column_to.as_deref().filter(|to| *to != column_from);
            match (rename, new_type) {
                (Some(to), Some(ty)) => Line {
                    verb: "rename column",
                    subject,
                    target: Some(format!("{} : {}", to, ty)),
                },
                (Some(to), None) => Line {
                    verb: "rename column",
                    subject,
                    target: Some(to.to_string()),
                },
                (None, Some(ty)) => Line {
                    verb: "retype column",
                    subject,
                    target: Some(ty.clone()),
                },
                (None, None) => Line {
                    verb: "keep column",
                    subject,
                    target: None,
                },
            }
        }
        RenameOperation::AddColumn {
            table_from,
            column_to,
            new_type,
            ..
        } => Line {
            verb: "add column",
            subject: format!("{}.{}", table_from, column_to),
            target: Some(new_type.clone()),
        },
    }
}

/// Pad `s` with spaces up to `width` display columns.
fn pad(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    let mut out = s.to_string();
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(w)));
    out
}

/// One line per operation, with subjects padded so the arrows line up.
pub fn describe(plan: &Plan) -> String {
    if plan.is_empty() {
        return "no pending changes\n".to_string();
    }

    let lines: Vec<Line> = plan.iter().map(line).collect();
    let verb_width = lines.iter().map(|l| l.verb.len()).max().unwrap_or(0);
    let subject_width = lines
        .iter()
        .filter(|l| l.target.is_some())
        .map(|l| UnicodeWidthStr::width(l.subject.as_str()))
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for l in &lines {
        output.push_str(&pad(l.verb, verb_width));
        output.push(' ');
        match &l.target {
            Some(target) => {
                output.push_str(&pad(&l.subject, subject_width));
                output.push_str(" -> ");
                output.push_str(target);
            }
            None => output.push_str(&l.subject),
        }
        output.push('\n');
    }
    output
}

/// Lines of [`describe`] without the trailing newline.
pub fn describe_lines(plan: &Plan) -> Vec<String> {
    describe(plan).lines().map(str::to_string).collect()
}
