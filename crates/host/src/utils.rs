//! Syntax tree utilities.

use fixcheck::{CodeFixContext, DiagnosticDescriptor, RefactoringContext, TextRange};
use ra_ap_syntax::{ast, AstNode, SyntaxKind, SyntaxNode};

use crate::language::{ParsedFile, RustLanguage};

/// Returns the root name of the path (e.g. `std` for `std::fmt::Debug`).
pub fn path_root(path: &ast::Path) -> Option<ast::NameRef> {
    path.first_segment()?.name_ref()
}

/// Returns the smallest node of type `T` that covers the range.
pub fn covering_node<T: AstNode>(root: &SyntaxNode, range: TextRange) -> Option<T> {
    let element = root.covering_element(range);
    let node = match element {
        ra_ap_syntax::NodeOrToken::Node(node) => node,
        ra_ap_syntax::NodeOrToken::Token(token) => token.parent()?,
    };
    node.ancestors().find_map(T::cast)
}

/// Returns the node of type `T` whose range equals the range (if any).
pub fn node_at_range<T: AstNode>(root: &SyntaxNode, range: TextRange) -> Option<T> {
    covering_node::<T>(root, range).filter(|node| node.syntax().text_range() == range)
}

/// Returns the parsed document of a code fix context.
pub fn fix_file<'a>(context: &CodeFixContext<'a, RustLanguage>) -> anyhow::Result<&'a ParsedFile> {
    context
        .compilation()
        .file(context.document().id())
        .ok_or_else(|| anyhow::anyhow!("document {} was not compiled", context.document().id()))
}

/// Returns the parsed document of a refactoring context.
pub fn refactoring_file<'a>(
    context: &RefactoringContext<'a, RustLanguage>,
) -> anyhow::Result<&'a ParsedFile> {
    context
        .compilation()
        .file(context.document().id())
        .ok_or_else(|| anyhow::anyhow!("document {} was not compiled", context.document().id()))
}

/// Returns true if the diagnostic of the context was reported for the rule.
pub fn is_rule(context: &CodeFixContext<'_, RustLanguage>, descriptor: &DiagnosticDescriptor) -> bool {
    context.diagnostic().id() == descriptor.id
}

/// Returns the expression text, parenthesized if it isn't an atom
/// (so that it can be used as a method receiver or negated).
pub fn atom_text(expr: &ast::Expr) -> String {
    let text = expr.syntax().text().to_string();
    match expr {
        ast::Expr::PathExpr(_)
        | ast::Expr::Literal(_)
        | ast::Expr::ParenExpr(_)
        | ast::Expr::MethodCallExpr(_)
        | ast::Expr::CallExpr(_)
        | ast::Expr::FieldExpr(_)
        | ast::Expr::IndexExpr(_)
        | ast::Expr::MacroExpr(_)
        | ast::Expr::TupleExpr(_)
        | ast::Expr::ArrayExpr(_) => text,
        _ => format!("({text})"),
    }
}

/// Returns the indentation of the line that contains the node.
pub fn indent_of(node: &SyntaxNode) -> String {
    node.siblings_with_tokens(ra_ap_syntax::Direction::Prev)
        .skip(1)
        .find_map(|element| element.into_token())
        .filter(|token| token.kind() == SyntaxKind::WHITESPACE)
        .and_then(|token| {
            token
                .text()
                .rsplit_once('\n')
                .map(|(_, indent)| indent.to_owned())
        })
        .unwrap_or_default()
}

/// Returns true if the file declares or uses an identifier with the name.
pub fn has_identifier(root: &SyntaxNode, name: &str) -> bool {
    root.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .any(|token| token.kind() == SyntaxKind::IDENT && token.text() == name)
}
