//! Empty `else` blocks.

use std::sync::Arc;

use fixcheck::{
    AnalysisContext, Analyzer, CodeAction, CodeFixContext, CodeFixProvider, Diagnostic,
    DiagnosticDescriptor, TextEdit, TextRange,
};
use ra_ap_syntax::{ast, AstNode};

use crate::descriptors::EMPTY_ELSE;
use crate::language::{RustCompilation, RustLanguage};
use crate::utils;

/// Reports `else {}` (`FC0003`, disabled by default).
#[derive(Debug, Default)]
pub struct EmptyElseAnalyzer;

/// Removes empty `else` blocks.
#[derive(Debug, Default)]
pub struct RemoveEmptyElseFixProvider;

/// Returns the empty `else` block of the `if` expression (if any).
fn empty_else(if_expr: &ast::IfExpr) -> Option<ast::BlockExpr> {
    let ast::ElseBranch::Block(block) = if_expr.else_branch()? else {
        return None;
    };
    let text = block.syntax().text().to_string();
    let inner = text.strip_prefix('{')?.strip_suffix('}')?;
    inner.trim().is_empty().then_some(block)
}

/// Returns the range from the `else` keyword to the end of the empty block.
fn else_range(if_expr: &ast::IfExpr, block: &ast::BlockExpr) -> Option<TextRange> {
    let else_token = if_expr.else_token()?;
    Some(TextRange::new(
        else_token.text_range().start(),
        block.syntax().text_range().end(),
    ))
}

impl Analyzer<RustLanguage> for EmptyElseAnalyzer {
    fn supported_diagnostics(&self) -> Vec<Arc<DiagnosticDescriptor>> {
        vec![EMPTY_ELSE.clone()]
    }

    fn analyze(
        &self,
        compilation: &RustCompilation,
        context: &mut AnalysisContext<'_>,
    ) -> anyhow::Result<()> {
        for file in compilation.files() {
            for if_expr in file.syntax().descendants().filter_map(ast::IfExpr::cast) {
                let Some(range) =
                    empty_else(&if_expr).and_then(|block| else_range(&if_expr, &block))
                else {
                    continue;
                };
                context.report(Diagnostic::new(
                    EMPTY_ELSE.clone(),
                    file.document().location(range),
                ));
            }
        }
        Ok(())
    }
}

impl CodeFixProvider<RustLanguage> for RemoveEmptyElseFixProvider {
    fn fixable_diagnostic_ids(&self) -> Vec<String> {
        vec![EMPTY_ELSE.id.clone()]
    }

    fn register_code_fixes(
        &self,
        context: &mut CodeFixContext<'_, RustLanguage>,
    ) -> anyhow::Result<()> {
        let file = utils::fix_file(context)?;
        let Some(if_expr) = utils::covering_node::<ast::IfExpr>(file.syntax(), context.span())
        else {
            return Ok(());
        };
        let (Some(then_branch), Some(block)) = (if_expr.then_branch(), empty_else(&if_expr)) else {
            return Ok(());
        };
        if else_range(&if_expr, &block) != Some(context.span()) {
            return Ok(());
        }

        // Removes the whitespace between the `then` branch and the `else` keyword too.
        let range = TextRange::new(
            then_branch.syntax().text_range().end(),
            block.syntax().text_range().end(),
        );
        let action = CodeAction::document_edits(
            "Remove empty `else`",
            Some(EMPTY_ELSE.id.as_str()),
            context.document(),
            vec![TextEdit::delete(range)],
        );
        context.register_code_fix(action);
        Ok(())
    }
}
