//! `luneva schema`: the studio's document types by desk group.

use std::fmt::Write as _;

use luneva_core::studio::{DOCUMENT_TYPES, DeskGroup};

use super::{CliError, emit};

const GROUPS: [DeskGroup; 4] = [
    DeskGroup::Pages,
    DeskGroup::Components,
    DeskGroup::Settings,
    DeskGroup::Other,
];

#[must_use]
pub fn render() -> String {
    let width = DOCUMENT_TYPES
        .iter()
        .map(|doc_type| doc_type.name.len())
        .max()
        .unwrap_or_default();

    let mut out = String::new();
    for group in GROUPS {
        let mut types = DOCUMENT_TYPES
            .iter()
            .filter(|doc_type| doc_type.group == group)
            .peekable();
        if types.peek().is_none() {
            continue;
        }

        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "{}", group.title());
        for doc_type in types {
            let marker = if doc_type.singleton { "  (singleton)" } else { "" };
            let _ = writeln!(out, "  {:<width$}  {}{marker}", doc_type.name, doc_type.title);
        }
    }
    out
}

/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn run() -> Result<(), CliError> {
    emit(&render())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_listed_once() {
        let output = render();
        for doc_type in DOCUMENT_TYPES {
            let needle = format!(" {} ", doc_type.name);
            assert_eq!(output.matches(&needle).count(), 1, "{}", doc_type.name);
        }
    }

    #[test]
    fn test_groups_in_desk_order() {
        let output = render();
        let pages = output.find("Pages\n").unwrap_or(usize::MAX);
        let settings = output.find("Settings\n").unwrap_or(usize::MAX);
        assert!(pages < settings);
    }
}
