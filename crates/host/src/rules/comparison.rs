//! Comparisons with `None` and boolean literals.

use std::sync::Arc;

use fixcheck::{
    AnalysisContext, Analyzer, CodeAction, CodeFixContext, CodeFixProvider, Diagnostic,
    DiagnosticDescriptor, TextEdit,
};
use ra_ap_syntax::{ast, AstNode};

use crate::descriptors::{COMPARISON_WITH_BOOL, COMPARISON_WITH_NONE};
use crate::language::{RustCompilation, RustLanguage};
use crate::utils;

/// Reports `x == None`/`x != None` (`FC0001`) and comparisons with boolean literals (`FC0002`).
#[derive(Debug, Default)]
pub struct ComparisonAnalyzer;

/// Rewrites comparisons reported by [`ComparisonAnalyzer`].
#[derive(Debug, Default)]
pub struct ComparisonFixProvider;

/// A comparison with a constant.
#[derive(Debug)]
enum Comparison {
    WithNone {
        operand: ast::Expr,
        negated: bool,
    },
    WithBool {
        operand: ast::Expr,
        value: bool,
        negated: bool,
        literal: String,
    },
}

impl Comparison {
    /// Parses `==`/`!=` comparisons with `None` or a boolean literal (on either side).
    fn parse(bin_expr: &ast::BinExpr) -> Option<Self> {
        let Some(ast::BinaryOp::CmpOp(ast::CmpOp::Eq { negated })) = bin_expr.op_kind() else {
            return None;
        };
        let (lhs, rhs) = (bin_expr.lhs()?, bin_expr.rhs()?);
        [(lhs.clone(), rhs.clone()), (rhs, lhs)]
            .into_iter()
            .find_map(|(constant, operand)| match constant {
                ast::Expr::PathExpr(path) if path.syntax().text() == "None" => {
                    Some(Self::WithNone { operand, negated })
                }
                ast::Expr::Literal(literal) => match literal.kind() {
                    ast::LiteralKind::Bool(value) => Some(Self::WithBool {
                        operand,
                        value,
                        negated,
                        literal: literal.syntax().text().to_string(),
                    }),
                    _ => None,
                },
                _ => None,
            })
    }

    fn descriptor(&self) -> &'static Arc<DiagnosticDescriptor> {
        match self {
            Self::WithNone { .. } => &COMPARISON_WITH_NONE,
            Self::WithBool { .. } => &COMPARISON_WITH_BOOL,
        }
    }

    /// Message argument of the diagnostic.
    fn argument(&self) -> String {
        match self {
            Self::WithNone { negated, .. } => none_method(*negated).to_owned(),
            Self::WithBool { literal, .. } => literal.clone(),
        }
    }

    /// Text that replaces the comparison.
    fn replacement(&self) -> String {
        match self {
            Self::WithNone { operand, negated } => {
                format!("{}.{}", utils::atom_text(operand), none_method(*negated))
            }
            Self::WithBool {
                operand,
                value,
                negated,
                ..
            } => {
                if value != negated {
                    operand.syntax().text().to_string()
                } else {
                    format!("!{}", utils::atom_text(operand))
                }
            }
        }
    }

    fn title(&self) -> String {
        match self {
            Self::WithNone { negated, .. } => format!("Use `{}`", none_method(*negated)),
            Self::WithBool { .. } => "Simplify boolean comparison".to_owned(),
        }
    }
}

fn none_method(negated: bool) -> &'static str {
    if negated {
        "is_some()"
    } else {
        "is_none()"
    }
}

impl Analyzer<RustLanguage> for ComparisonAnalyzer {
    fn supported_diagnostics(&self) -> Vec<Arc<DiagnosticDescriptor>> {
        vec![COMPARISON_WITH_NONE.clone(), COMPARISON_WITH_BOOL.clone()]
    }

    fn analyze(
        &self,
        compilation: &RustCompilation,
        context: &mut AnalysisContext<'_>,
    ) -> anyhow::Result<()> {
        for file in compilation.files() {
            for bin_expr in file.syntax().descendants().filter_map(ast::BinExpr::cast) {
                if context.is_cancelled() {
                    return Ok(());
                }
                if let Some(comparison) = Comparison::parse(&bin_expr) {
                    context.report(
                        Diagnostic::new(
                            comparison.descriptor().clone(),
                            file.document().location(bin_expr.syntax().text_range()),
                        )
                        .with_arguments([comparison.argument()]),
                    );
                }
            }
        }
        Ok(())
    }
}

impl CodeFixProvider<RustLanguage> for ComparisonFixProvider {
    fn fixable_diagnostic_ids(&self) -> Vec<String> {
        vec![
            COMPARISON_WITH_NONE.id.clone(),
            COMPARISON_WITH_BOOL.id.clone(),
        ]
    }

    fn register_code_fixes(
        &self,
        context: &mut CodeFixContext<'_, RustLanguage>,
    ) -> anyhow::Result<()> {
        let file = utils::fix_file(context)?;
        let Some(comparison) =
            utils::node_at_range::<ast::BinExpr>(file.syntax(), context.span())
                .as_ref()
                .and_then(Comparison::parse)
        else {
            return Ok(());
        };
        if !utils::is_rule(context, comparison.descriptor()) {
            return Ok(());
        }

        let action = CodeAction::document_edits(
            comparison.title(),
            Some(comparison.descriptor().id.as_str()),
            context.document(),
            vec![TextEdit::replace(comparison.replacement(), context.span())],
        );
        context.register_code_fix(action);
        Ok(())
    }
}
