//! Swaps the operands of a comparison.

use fixcheck::{CodeAction, RefactoringContext, RefactoringProvider, TextEdit};
use ra_ap_syntax::{ast, AstNode};

use crate::language::RustLanguage;
use crate::utils;

/// Swaps the operands of the comparison under the cursor (`a < b` becomes `b > a`).
#[derive(Debug, Default)]
pub struct SwapOperandsRefactoring;

/// Returns the operator that compares swapped operands the same way.
fn swapped_operator(op: ast::CmpOp) -> &'static str {
    match op {
        ast::CmpOp::Eq { negated: false } => "==",
        ast::CmpOp::Eq { negated: true } => "!=",
        ast::CmpOp::Ord {
            ordering: ast::Ordering::Less,
            strict: true,
        } => ">",
        ast::CmpOp::Ord {
            ordering: ast::Ordering::Less,
            strict: false,
        } => ">=",
        ast::CmpOp::Ord {
            ordering: ast::Ordering::Greater,
            strict: true,
        } => "<",
        ast::CmpOp::Ord {
            ordering: ast::Ordering::Greater,
            strict: false,
        } => "<=",
    }
}

/// Returns the edits that swap the operands of the comparison (if it's one).
fn swap_edits(bin_expr: &ast::BinExpr) -> Option<Vec<TextEdit>> {
    let ast::BinaryOp::CmpOp(op) = bin_expr.op_kind()? else {
        return None;
    };
    let (lhs, rhs, op_token) = (bin_expr.lhs()?, bin_expr.rhs()?, bin_expr.op_token()?);
    Some(vec![
        TextEdit::replace(rhs.syntax().text().to_string(), lhs.syntax().text_range()),
        TextEdit::replace(swapped_operator(op).to_owned(), op_token.text_range()),
        TextEdit::replace(lhs.syntax().text().to_string(), rhs.syntax().text_range()),
    ])
}

impl RefactoringProvider<RustLanguage> for SwapOperandsRefactoring {
    fn compute_refactorings(
        &self,
        context: &mut RefactoringContext<'_, RustLanguage>,
    ) -> anyhow::Result<()> {
        let file = utils::refactoring_file(context)?;
        // Innermost comparison.
        let Some(edits) = utils::covering_node::<ast::BinExpr>(file.syntax(), context.span())
            .and_then(|bin_expr| {
                bin_expr
                    .syntax()
                    .ancestors()
                    .filter_map(ast::BinExpr::cast)
                    .find_map(|bin_expr| swap_edits(&bin_expr))
            })
        else {
            return Ok(());
        };

        context.register_refactoring(CodeAction::document_edits(
            "Swap operands",
            Some("swap-operands"),
            context.document(),
            edits,
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ra_ap_syntax::SourceFile;

    #[test]
    fn swap_edits_works() {
        for (code, expected) in [
            ("a == b", Some("b == a")),
            ("a != b", Some("b != a")),
            ("a < b", Some("b > a")),
            ("a <= b", Some("b >= a")),
            ("a > b", Some("b < a")),
            ("a >= b", Some("b <= a")),
            ("f(x) < y.z", Some("y.z > f(x)")),
            ("a + b", None),
            ("a && b", None),
        ] {
            let file = SourceFile::parse(&format!("fn f() {{ {code}; }}")).tree();
            let bin_expr = file
                .syntax()
                .descendants()
                .find_map(ast::BinExpr::cast)
                .unwrap();
            let results = swap_edits(&bin_expr).map(|edits| {
                let start = bin_expr.syntax().text_range().start();
                let mut text = bin_expr.syntax().text().to_string();
                for edit in edits.iter().rev() {
                    let range = edit.range - start;
                    text.replace_range(std::ops::Range::<usize>::from(range), &edit.text);
                }
                text
            });

            assert_eq!(results.as_deref(), expected, "code: {code}");
        }
    }
}
