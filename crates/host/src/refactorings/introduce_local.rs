//! Introduces a local variable for an expression.

use fixcheck::{
    AnnotationKind, CodeAction, NameGenerator, RefactoringContext, RefactoringProvider, TextEdit,
    TextRange, TextSize,
};
use ra_ap_syntax::{ast, AstNode, SyntaxNode};

use crate::language::RustLanguage;
use crate::utils;

/// Base name of introduced locals.
const LOCAL_NAME: &str = "value";

/// Moves the selected expression into a `let` statement before the enclosing statement.
///
/// The new local is named `value` (`value2`, `value3` ... if the name is taken)
/// and annotated for renaming.
#[derive(Debug, Default)]
pub struct IntroduceLocalRefactoring;

/// Returns the statement (or tail expression) of a block that contains the node.
fn enclosing_statement(node: &SyntaxNode) -> Option<SyntaxNode> {
    node.ancestors().find(|ancestor| {
        ancestor
            .parent()
            .map_or(false, |parent| ast::StmtList::can_cast(parent.kind()))
    })
}

/// Returns the edits that introduce a local for the expression.
fn introduce_local_edits(root: &SyntaxNode, expr: &ast::Expr) -> Option<Vec<TextEdit>> {
    // Blocks and expressions that are statements on their own.
    if matches!(expr, ast::Expr::BlockExpr(_))
        || expr.syntax().parent().map_or(true, |parent| {
            ast::StmtList::can_cast(parent.kind()) || ast::ExprStmt::can_cast(parent.kind())
        })
    {
        return None;
    }
    let statement = enclosing_statement(expr.syntax())?;
    let name =
        NameGenerator::Numbered.ensure_unique_name(LOCAL_NAME, |name| utils::has_identifier(root, name));
    let declaration = format!(
        "let {name} = {};\n{}",
        expr.syntax().text(),
        utils::indent_of(&statement)
    );
    let name_range = TextRange::at(TextSize::of("let "), TextSize::of(name.as_str()));

    Some(vec![
        TextEdit::insert(declaration, statement.text_range().start())
            .with_annotation(AnnotationKind::Rename, name_range),
        TextEdit::replace(name, expr.syntax().text_range()),
    ])
}

impl RefactoringProvider<RustLanguage> for IntroduceLocalRefactoring {
    fn compute_refactorings(
        &self,
        context: &mut RefactoringContext<'_, RustLanguage>,
    ) -> anyhow::Result<()> {
        let file = utils::refactoring_file(context)?;
        let Some(edits) = utils::node_at_range::<ast::Expr>(file.syntax(), context.span())
            .and_then(|expr| introduce_local_edits(file.syntax(), &expr))
        else {
            return Ok(());
        };

        context.register_refactoring(CodeAction::document_edits(
            "Introduce local variable",
            Some("introduce-local"),
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
    fn introduce_local_edits_works() {
        for (code, expr, expected) in [
            (
                "fn f() {\n    g(a + b);\n}",
                "a + b",
                Some("fn f() {\n    let value = a + b;\n    g(value);\n}"),
            ),
            (
                "fn f(value: i32) {\n    g(value * 2)\n}",
                "value * 2",
                Some("fn f(value: i32) {\n    let value2 = value * 2;\n    g(value2)\n}"),
            ),
            (
                "fn f() {\n    let x = 1;\n}",
                "1",
                Some("fn f() {\n    let value = 1;\n    let x = value;\n}"),
            ),
            // Whole statements.
            ("fn f() {\n    g();\n}", "g()", None),
            ("fn f() {\n    {}\n}", "{}", None),
        ] {
            let file = SourceFile::parse(code).tree();
            let start = code.find(expr).unwrap();
            let range = TextRange::at(TextSize::try_from(start).unwrap(), TextSize::of(expr));
            let results = node_at(&file, range)
                .and_then(|expr| introduce_local_edits(file.syntax(), &expr))
                .map(|edits| {
                    let mut text = code.to_owned();
                    for edit in edits.iter().rev() {
                        text.replace_range(std::ops::Range::<usize>::from(edit.range), &edit.text);
                    }
                    text
                });

            assert_eq!(results.as_deref(), expected, "code: {code}");
        }
    }

    fn node_at(file: &SourceFile, range: TextRange) -> Option<ast::Expr> {
        utils::node_at_range::<ast::Expr>(file.syntax(), range)
    }

    #[test]
    fn rename_annotation_covers_name() {
        let code = "fn f() {\n    g(1);\n}";
        let file = SourceFile::parse(code).tree();
        let range = TextRange::at(TextSize::from(15), TextSize::from(1));
        let edits = introduce_local_edits(file.syntax(), &node_at(&file, range).unwrap()).unwrap();

        assert_eq!(edits[0].text, "let value = 1;\n    ");
        assert_eq!(
            edits[0].annotations[0].range,
            TextRange::new(TextSize::from(4), TextSize::from(9))
        );
    }
}
