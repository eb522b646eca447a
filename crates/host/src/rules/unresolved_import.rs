//! Fix for unresolved imports.

use fixcheck::{CodeAction, CodeFixContext, CodeFixProvider, TextEdit, TextRange, TextSize};
use ra_ap_syntax::{ast, AstNode};

use crate::compiler::UNRESOLVED_IMPORT;
use crate::language::RustLanguage;
use crate::utils;

/// Removes `use` items whose crate can't be resolved (`RS0003`).
#[derive(Debug, Default)]
pub struct RemoveUnresolvedImportFixProvider;

impl CodeFixProvider<RustLanguage> for RemoveUnresolvedImportFixProvider {
    fn fixable_diagnostic_ids(&self) -> Vec<String> {
        vec![UNRESOLVED_IMPORT.to_owned()]
    }

    fn register_code_fixes(
        &self,
        context: &mut CodeFixContext<'_, RustLanguage>,
    ) -> anyhow::Result<()> {
        if context.diagnostic().id() != UNRESOLVED_IMPORT {
            return Ok(());
        }
        let file = utils::fix_file(context)?;
        let Some(use_item) = utils::covering_node::<ast::Use>(file.syntax(), context.span()) else {
            return Ok(());
        };

        let range = with_line_break(context.document().text(), use_item.syntax().text_range());
        let action = CodeAction::document_edits(
            "Remove unresolved import",
            Some(UNRESOLVED_IMPORT),
            context.document(),
            vec![TextEdit::delete(range)],
        );
        context.register_code_fix(action);
        Ok(())
    }
}

/// Extends the range over the line break that follows it (if any).
fn with_line_break(text: &str, range: TextRange) -> TextRange {
    let rest = &text[usize::from(range.end())..];
    let len = match rest.as_bytes() {
        [b'\r', b'\n', ..] => 2,
        [b'\n', ..] => 1,
        _ => 0,
    };
    range.cover_offset(range.end() + TextSize::from(len))
}
