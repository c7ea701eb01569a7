//! The expression analyzer: LHS-parse, RHS-parse, call lowering, and the
//! direct-use predicate.
//!
//! Each entry point walks the tagged `ast::Expr` enum with a single
//! recursive `match`, reducing an arbitrary subexpression down to its
//! def/use closure (or, for LHS-parse, a single named target) in one
//! pass.

use crate::ast::{BinOp, Expr, UnOp};
use crate::ir::{BasicExpr, CallExpr, Expression, VariableRef, VariableSet};
use crate::source::SourceResolver;

/// The def/use closure of a subexpression, before it is collapsed into a
/// canonical `Expression`. Not part of the public IR: an intermediate
/// value used only while walking the AST.
struct DefUse {
    defs: VariableSet,
    uses: VariableSet,
    direct_use: bool,
}

impl DefUse {
    fn empty() -> DefUse {
        DefUse {
            defs: VariableSet::new(),
            uses: VariableSet::new(),
            direct_use: false,
        }
    }

    fn single_use(var: VariableRef, direct_use: bool) -> DefUse {
        DefUse {
            defs: VariableSet::new(),
            uses: VariableSet::singleton(var),
            direct_use,
        }
    }

    /// If this closure is exactly one used variable and nothing defined,
    /// the sole used variable.
    fn sole_use(&self) -> Option<&VariableRef> {
        if self.defs.is_empty() {
            self.uses.single()
        } else {
            None
        }
    }
}

/// Walks expression subtrees and reduces them to canonical IR
/// expressions, collecting every call expression it encounters along the
/// way in post-order (operands before operators) for the function
/// lowerer to splice into the current block ahead of the statement that
/// consumes the top-level result.
pub struct ExpressionAnalyzer<'a> {
    resolver: &'a dyn SourceResolver,
    intermediates: Vec<Expression>,
}

impl<'a> ExpressionAnalyzer<'a> {
    pub fn new(resolver: &'a dyn SourceResolver) -> ExpressionAnalyzer<'a> {
        ExpressionAnalyzer {
            resolver,
            intermediates: Vec::new(),
        }
    }

    fn text(&self, expr: &Expr) -> String {
        self.text_of(expr.range())
    }

    /// Take the intermediate-expression buffer accumulated by the most
    /// recent `parse_rhs` call. The function lowerer splices these in,
    /// in order, immediately before the statement that consumes the
    /// top-level result.
    pub fn take_intermediates(&mut self) -> Vec<Expression> {
        std::mem::take(&mut self.intermediates)
    }

    /// Strips parentheses/implicit conversions. Succeeds on a direct
    /// variable reference or a recovery node; fails (returns `None`) for
    /// any other shape, signalling to the caller that the LHS is a
    /// complex l-value whose def/use must instead come from the RHS
    /// analysis.
    pub fn parse_lhs(&self, expr: &Expr) -> Option<VariableRef> {
        match expr.strip() {
            Expr::Variable { name, range } => Some(VariableRef::new(name.clone(), self.text_of(*range))),
            Expr::Recovery { range } => {
                let text = self.text_of(*range);
                Some(VariableRef::new(text.clone(), text))
            }
            _ => None,
        }
    }

    fn text_of(&self, range: crate::source::SourceRange) -> String {
        self.resolver.resolve(range).text
    }

    fn parse_callee(&self, expr: &Expr) -> Option<String> {
        match expr.strip() {
            Expr::Variable { name, .. } => Some(name.clone()),
            Expr::Recovery { range } => Some(self.text_of(*range)),
            _ => None,
        }
    }

    /// True iff every write/read along `expr` is compatible with "this
    /// expression is just a read of `target`".
    pub fn is_direct_use(&self, expr: &Expr, target: &str) -> bool {
        match expr.strip() {
            Expr::Variable { name, .. } => name == target,
            Expr::Recovery { range } => self.text_of(*range) == target,
            Expr::Binary { op: BinOp::Assign, .. } => true,
            Expr::Binary {
                op: BinOp::Compound, ..
            } => false,
            // A non-assignment binary operator is never a direct use, even
            // of a variable appearing on both sides.
            Expr::Binary { op: BinOp::Plain, .. } => false,
            Expr::Unary { op: UnOp::IncDec, .. } => true,
            // Likewise a non-increment/decrement unary operator (`-x`,
            // `!x`, `&x`, `*x`, ...) is never a direct use.
            Expr::Unary { op: UnOp::Plain, .. } => false,
            Expr::Literal { .. } => false,
            Expr::ArraySubscript { base, index, .. } => {
                self.is_direct_use(base, target) && self.is_direct_use(index, target)
            }
            Expr::Call { callee, args, .. } => {
                self.is_direct_use(callee, target) && args.iter().all(|a| self.is_direct_use(a, target))
            }
            Expr::Other { children, .. } => children.iter().all(|c| self.is_direct_use(c, target)),
            Expr::Paren(_) | Expr::ImplicitCast(_) => unreachable!("strip() removes these"),
        }
    }

    /// The core recursion producing a `DefUse` for an arbitrary
    /// expression. Appends any call expression encountered to the
    /// intermediate buffer in post-order.
    fn create_expression(&mut self, expr: &Expr) -> DefUse {
        match expr.strip() {
            Expr::Variable { name, range } => {
                let var = VariableRef::new(name.clone(), self.text_of(*range));
                DefUse::single_use(var, true)
            }
            Expr::Recovery { range } => {
                let text = self.text_of(*range);
                let var = VariableRef::new(text.clone(), text);
                DefUse::single_use(var, true)
            }
            Expr::ArraySubscript { base, index, .. } => {
                let mut base_du = self.create_expression(base);
                let index_du = self.create_expression(index);
                base_du.defs.extend(index_du.defs);
                base_du.uses.extend(index_du.uses);
                base_du.direct_use = false;
                base_du
            }
            Expr::Binary {
                op: BinOp::Assign,
                lhs,
                rhs,
                ..
            } => {
                let lhs_du = self.create_expression(lhs);
                let mut rhs_du = self.create_expression(rhs);
                match self.parse_lhs(lhs) {
                    Some(var) => rhs_du.defs.insert(var),
                    None => {
                        rhs_du.defs.extend(lhs_du.defs);
                        rhs_du.uses.extend(lhs_du.uses);
                    }
                }
                rhs_du
            }
            Expr::Binary {
                op: BinOp::Compound,
                lhs,
                rhs,
                ..
            } => {
                let mut lhs_du = self.create_expression(lhs);
                let rhs_du = self.create_expression(rhs);
                if let Some(var) = self.parse_lhs(lhs) {
                    lhs_du.defs.insert(var.clone());
                    lhs_du.uses.insert(var);
                }
                lhs_du.defs.extend(rhs_du.defs);
                lhs_du.uses.extend(rhs_du.uses);
                lhs_du.direct_use = false;
                lhs_du
            }
            Expr::Binary {
                op: BinOp::Plain,
                lhs,
                rhs,
                ..
            } => {
                let lhs_du = self.create_expression(lhs);
                let mut rhs_du = self.create_expression(rhs);
                rhs_du.defs.extend(lhs_du.defs);
                rhs_du.uses.extend(lhs_du.uses);
                rhs_du.direct_use = false;
                rhs_du
            }
            Expr::Unary {
                op: UnOp::IncDec,
                operand,
                ..
            } => self.create_expression(operand),
            Expr::Unary {
                op: UnOp::Plain,
                operand,
                ..
            } => {
                let mut du = self.create_expression(operand);
                du.direct_use = false;
                du
            }
            Expr::Call { callee, args, range } => self.create_call_expression(callee, args, *range),
            Expr::Literal { .. } => DefUse::empty(),
            Expr::Other { children, .. } => {
                let mut du = DefUse::empty();
                for child in children {
                    let child_du = self.create_expression(child);
                    du.defs.extend(child_du.defs);
                    du.uses.extend(child_du.uses);
                }
                du
            }
            Expr::Paren(_) | Expr::ImplicitCast(_) => unreachable!("strip() removes these"),
        }
    }

    /// Reduce one call argument to its canonical form: a bare variable
    /// when it is syntactically a direct use, an implicit return
    /// reference when it is exactly that, or a `Basic` expression
    /// otherwise.
    fn lower_argument(&mut self, arg: &Expr) -> Expression {
        let text = self.text(arg);
        let arg_du = self.create_expression(arg);
        if let Some(sole) = arg_du.sole_use() {
            if sole.is_implicit_return() {
                return Expression::Variable(sole.clone());
            }
            if self.is_direct_use(arg, &sole.name) {
                return Expression::Variable(VariableRef::new(sole.name.clone(), text));
            }
        }
        Expression::Basic(BasicExpr::new(arg_du.defs, arg_du.uses, false, text))
    }

    /// Lower a call expression: resolve its argument list, then its
    /// callee. An unresolvable callee abandons the call node (its
    /// arguments are preserved as independent intermediate expressions,
    /// but def/use does not flow through it).
    fn create_call_expression(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        range: crate::source::SourceRange,
    ) -> DefUse {
        let arg_exprs: Vec<Expression> = args.iter().map(|a| self.lower_argument(a)).collect();

        let callee_id = match self.parse_callee(callee) {
            Some(id) => id,
            None => {
                warn!(
                    "cannot resolve callee for call expression `{}`; dropping call node",
                    self.text_of(range)
                );
                self.intermediates.extend(arg_exprs);
                return DefUse::empty();
            }
        };

        let text = self.text_of(range);
        let call = CallExpr::new(callee_id.clone(), arg_exprs, text.clone());
        self.intermediates.push(Expression::Call(call));

        let implicit_ret = VariableRef::implicit_return(callee_id, text);
        DefUse::single_use(implicit_ret, true)
    }

    /// Analyze the top-level expression of an RHS, returning the
    /// canonical `Expression` the function lowerer should emit. Clears
    /// the intermediate buffer first; retrieve it afterwards with
    /// `take_intermediates`.
    pub fn parse_rhs(&mut self, expr: &Expr) -> Expression {
        self.intermediates.clear();
        let text = self.text(expr);
        let def_use = self.create_expression(expr);
        if let Some(sole) = def_use.sole_use() {
            if sole.is_implicit_return() {
                return Expression::Variable(sole.clone());
            }
            if self.is_direct_use(expr, &sole.name) {
                return Expression::Variable(VariableRef::new(sole.name.clone(), text));
            }
        }
        Expression::Basic(BasicExpr::new(def_use.defs, def_use.uses, def_use.direct_use, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ResolvedText, SourceLocation, SourceRange};

    /// A deterministic stub resolver: every range resolves to `src[begin..end]`
    /// of a fixed backing string, so tests can build AST fixtures without a
    /// real parser.
    struct StubResolver {
        src: &'static str,
    }

    impl SourceResolver for StubResolver {
        fn resolve(&self, range: SourceRange) -> ResolvedText {
            let text = self.src[range.begin as usize..range.end as usize].to_string();
            let loc = |offset: u32| SourceLocation {
                file: "test.c".to_string(),
                line: 1,
                column: offset + 1,
            };
            ResolvedText {
                text,
                begin: loc(range.begin),
                end: loc(range.end),
            }
        }
    }

    fn var(name: &str, range: (u32, u32)) -> Expr {
        Expr::Variable {
            name: name.to_string(),
            range: SourceRange::new(range.0, range.1),
        }
    }

    #[test]
    fn direct_variable_reference() {
        // src: "a"
        let resolver = StubResolver { src: "a" };
        let mut analyzer = ExpressionAnalyzer::new(&resolver);
        let expr = var("a", (0, 1));
        let result = analyzer.parse_rhs(&expr);
        assert_eq!(result, Expression::Variable(VariableRef::new("a", "a")));
        assert!(analyzer.take_intermediates().is_empty());
    }

    #[test]
    fn binary_expression_collapses_to_basic() {
        // src: "a + 1"
        let resolver = StubResolver { src: "a + 1" };
        let mut analyzer = ExpressionAnalyzer::new(&resolver);
        let expr = Expr::Binary {
            op: BinOp::Plain,
            lhs: Box::new(var("a", (0, 1))),
            rhs: Box::new(Expr::Literal {
                literal: crate::ast::Literal::Int,
                range: SourceRange::new(4, 5),
            }),
            range: SourceRange::new(0, 5),
        };
        let result = analyzer.parse_rhs(&expr);
        match result {
            Expression::Basic(b) => {
                assert_eq!(b.uses().len(), 1);
                assert!(b.uses().contains("a"));
                assert!(b.defines().is_empty());
                assert!(!b.is_direct_use());
                assert_eq!(b.text(), "a + 1");
            }
            other => panic!("expected Basic, got {:?}", other),
        }
    }

    #[test]
    fn assignment_defines_lhs() {
        // src: "a = 1"
        let resolver = StubResolver { src: "a = 1" };
        let mut analyzer = ExpressionAnalyzer::new(&resolver);
        let expr = Expr::Binary {
            op: BinOp::Assign,
            lhs: Box::new(var("a", (0, 1))),
            rhs: Box::new(Expr::Literal {
                literal: crate::ast::Literal::Int,
                range: SourceRange::new(4, 5),
            }),
            range: SourceRange::new(0, 5),
        };
        let result = analyzer.parse_rhs(&expr);
        match result {
            Expression::Basic(b) => {
                assert!(b.defines().contains("a"));
                assert!(b.uses().is_empty());
            }
            other => panic!("expected Basic, got {:?}", other),
        }
    }

    #[test]
    fn call_expression_produces_implicit_return_and_intermediate() {
        // src: "g()"
        let resolver = StubResolver { src: "g()" };
        let mut analyzer = ExpressionAnalyzer::new(&resolver);
        let expr = Expr::Call {
            callee: Box::new(var("g", (0, 1))),
            args: vec![],
            range: SourceRange::new(0, 3),
        };
        let result = analyzer.parse_rhs(&expr);
        match &result {
            Expression::Variable(v) => {
                assert!(v.is_implicit_return());
                assert_eq!(v.name, "__impl_ret_g");
            }
            other => panic!("expected implicit return variable, got {:?}", other),
        }
        let intermediates = analyzer.take_intermediates();
        assert_eq!(intermediates.len(), 1);
        match &intermediates[0] {
            Expression::Call(c) => assert_eq!(c.callee_id(), "g"),
            other => panic!("expected Call, got {:?}", other),
        }
    }

    #[test]
    fn call_argument_direct_use_collapses_to_variable() {
        // src: "f(a)"
        let resolver = StubResolver { src: "f(a)" };
        let mut analyzer = ExpressionAnalyzer::new(&resolver);
        let expr = Expr::Call {
            callee: Box::new(var("f", (0, 1))),
            args: vec![var("a", (2, 3))],
            range: SourceRange::new(0, 4),
        };
        analyzer.parse_rhs(&expr);
        let intermediates = analyzer.take_intermediates();
        match &intermediates[0] {
            Expression::Call(c) => match &c.args()[0] {
                Expression::Variable(v) => assert_eq!(v.name, "a"),
                other => panic!("expected direct-use Variable arg, got {:?}", other),
            },
            other => panic!("expected Call, got {:?}", other),
        }
    }

    #[test]
    fn unresolvable_callee_abandons_call_but_keeps_arguments() {
        // src: "(*fp)(a)" where `fp` dereference isn't a nameable callee shape
        let resolver = StubResolver { src: "(*fp)(a)" };
        let mut analyzer = ExpressionAnalyzer::new(&resolver);
        let unnameable_callee = Expr::Other {
            children: vec![var("fp", (2, 4))],
            range: SourceRange::new(0, 5),
        };
        let expr = Expr::Call {
            callee: Box::new(unnameable_callee),
            args: vec![var("a", (6, 7))],
            range: SourceRange::new(0, 8),
        };
        let result = analyzer.parse_rhs(&expr);
        assert_eq!(result, Expression::Basic(BasicExpr::new(
            crate::ir::VariableSet::new(),
            crate::ir::VariableSet::new(),
            false,
            "(*fp)(a)".to_string(),
        )));
        let intermediates = analyzer.take_intermediates();
        assert_eq!(intermediates.len(), 1);
        match &intermediates[0] {
            Expression::Variable(v) => assert_eq!(v.name, "a"),
            other => panic!("expected surviving argument, got {:?}", other),
        }
    }
}
