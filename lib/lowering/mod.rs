//! Builds an `ir::Function` from an `ast::FunctionDecl`.
//!
//! One CFG basic block is "current" at a time; statements are appended
//! to it as the AST is walked depth-first, and control-flow statements
//! fork, merge, or loop back by creating new blocks and wiring edges
//! with `ir::Function::connect`. `break`/`continue` resolve through a
//! stack of enclosing-loop targets; `goto`/labels resolve through a map
//! from label name to block, populated lazily so a forward goto can
//! create its target block before the label itself is visited.

mod expression;

use std::collections::HashMap;

use crate::ast::{self, Expr, Stmt};
use crate::error::Result;
use crate::ir::{
    Assignment, BasicExpr, Branch, BlockId, Expression, Function, Return, Statement, VariableRef, VariableSet,
};
use crate::source::{SourceRange, SourceResolver};

use self::expression::ExpressionAnalyzer;

/// The break/continue targets of one enclosing loop.
struct LoopTargets {
    break_target: BlockId,
    continue_target: BlockId,
}

/// Walks one function body, threading a "current block" cursor through
/// the recursion.
struct FunctionLowerer<'a> {
    resolver: &'a dyn SourceResolver,
    function: Function,
    current_block: Option<BlockId>,
    loop_stack: Vec<LoopTargets>,
    label_map: HashMap<String, BlockId>,
}

impl<'a> FunctionLowerer<'a> {
    fn current(&self) -> BlockId {
        self.current_block
            .expect("current block is set once the entry block is created and never cleared")
    }

    /// Create a new block. When `attach`, wire an edge from whatever
    /// block is current into it and make it current.
    fn new_block(&mut self, attach: bool, label: &str) -> BlockId {
        let id = self.function.push_block(label);
        if attach {
            if let Some(cur) = self.current_block {
                self.function.connect(cur, id);
            }
            self.current_block = Some(id);
        }
        id
    }

    /// Close off `block` with an unconditional branch to `target`, unless
    /// it is already terminated (e.g. the branch it ends in was a
    /// `return` or an explicit `break`/`continue`/`goto`).
    fn fall_through(&mut self, block: BlockId, target: BlockId, text: &str) -> Result<()> {
        if self.function.block(block).terminated() {
            return Ok(());
        }
        self.function
            .push_statement(block, Statement::Branch(Branch::new(vec![target], text.to_string())))?;
        self.function.connect(block, target);
        Ok(())
    }

    /// Parse `expr` as an RHS, splicing every intermediate call
    /// expression it produces into `block` ahead of the value, and
    /// return the canonical top-level `Expression`.
    fn parse_rhs_into(&mut self, block: BlockId, expr: &Expr) -> Result<Expression> {
        let mut analyzer = ExpressionAnalyzer::new(self.resolver);
        let value = analyzer.parse_rhs(expr);
        for intermediate in analyzer.take_intermediates() {
            self.function.push_statement(block, Statement::Expression(intermediate))?;
        }
        Ok(value)
    }

    fn text_of(&self, range: SourceRange) -> String {
        self.resolver.resolve(range).text
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Compound(stmts) => {
                for s in stmts {
                    self.lower_stmt(s)?;
                }
                Ok(())
            }
            Stmt::Decl(decls) => self.lower_decl(decls),
            Stmt::Expr(expr) => self.lower_expr_stmt(expr),
            Stmt::Return { value, range } => self.lower_return(value.as_ref(), *range),
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => self.lower_if(cond, then_branch, else_branch.as_deref()),
            Stmt::While { cond, body } => self.lower_while(cond, body),
            Stmt::DoWhile { body, cond } => self.lower_do_while(body, cond),
            Stmt::For {
                init,
                cond,
                inc,
                body,
            } => self.lower_for(init.as_deref(), cond, inc.as_deref(), body),
            Stmt::Break => self.lower_break(),
            Stmt::Continue => self.lower_continue(),
            Stmt::Label { name, body } => self.lower_label(name, body),
            Stmt::Goto { label } => self.lower_goto(label),
            Stmt::Switch { .. } => {
                warn!("switch statements are not lowered; no blocks or edges are emitted for this construct");
                Ok(())
            }
        }
    }

    fn lower_decl(&mut self, decls: &[ast::VarDecl]) -> Result<()> {
        for decl in decls {
            let init = match &decl.init {
                Some(init) => init,
                None => continue,
            };
            let block = self.current();
            let value = self.parse_rhs_into(block, init)?;
            let decl_text = self.text_of(decl.range);
            let target = VariableRef::new(decl.name.clone(), decl_text.clone());
            self.function
                .push_statement(block, Statement::Assignment(Assignment::new(target, value, decl_text)))?;
        }
        Ok(())
    }

    fn lower_expr_stmt(&mut self, expr: &Expr) -> Result<()> {
        let block = self.current();
        let value = self.parse_rhs_into(block, expr)?;
        self.function.push_statement(block, Statement::Expression(value))
    }

    fn lower_return(&mut self, value: Option<&Expr>, range: SourceRange) -> Result<()> {
        let block = self.current();
        let text = self.text_of(range);
        let ret_value = match value {
            Some(expr) => self.parse_rhs_into(block, expr)?,
            None => Expression::Basic(BasicExpr::new(VariableSet::new(), VariableSet::new(), false, text.clone())),
        };
        self.function.push_statement(block, Statement::Return(Return::new(ret_value, text)))
    }

    fn lower_if(&mut self, cond: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) -> Result<()> {
        let entry = self.current();
        let cond_text = self.text_of(cond.range());
        let cond_value = self.parse_rhs_into(entry, cond)?;
        self.function.push_statement(entry, Statement::Expression(cond_value))?;

        let then_blk = self.function.push_block("if.then");
        let else_blk = self.function.push_block("if.else");
        let merge_blk = self.function.push_block("if.end");
        self.function
            .push_statement(entry, Statement::Branch(Branch::new(vec![then_blk, else_blk], cond_text)))?;
        self.function.connect(entry, then_blk);
        self.function.connect(entry, else_blk);

        self.current_block = Some(then_blk);
        self.lower_stmt(then_branch)?;
        self.fall_through(self.current(), merge_blk, "end of if.then")?;

        self.current_block = Some(else_blk);
        if let Some(else_stmt) = else_branch {
            self.lower_stmt(else_stmt)?;
        }
        self.fall_through(self.current(), merge_blk, "end of if.else")?;

        self.current_block = Some(merge_blk);
        Ok(())
    }

    fn lower_while(&mut self, cond: &Expr, body: &Stmt) -> Result<()> {
        let cond_blk = self.new_block(true, "while.cond");
        let cond_text = self.text_of(cond.range());
        let cond_value = self.parse_rhs_into(cond_blk, cond)?;
        self.function.push_statement(cond_blk, Statement::Expression(cond_value))?;

        let body_blk = self.function.push_block("while.body");
        let merge_blk = self.function.push_block("while.end");
        self.function
            .push_statement(cond_blk, Statement::Branch(Branch::new(vec![body_blk, merge_blk], cond_text)))?;
        self.function.connect(cond_blk, body_blk);
        self.function.connect(cond_blk, merge_blk);

        self.loop_stack.push(LoopTargets {
            break_target: merge_blk,
            continue_target: cond_blk,
        });
        self.current_block = Some(body_blk);
        self.lower_stmt(body)?;
        self.fall_through(self.current(), cond_blk, "end of while.body")?;
        self.loop_stack.pop();

        self.current_block = Some(merge_blk);
        Ok(())
    }

    fn lower_do_while(&mut self, body: &Stmt, cond: &Expr) -> Result<()> {
        let body_blk = self.new_block(true, "do.body");
        let cond_blk = self.function.push_block("do.cond");
        let merge_blk = self.function.push_block("do.end");

        self.loop_stack.push(LoopTargets {
            break_target: merge_blk,
            continue_target: cond_blk,
        });
        self.current_block = Some(body_blk);
        self.lower_stmt(body)?;
        self.fall_through(self.current(), cond_blk, "end of do.body")?;
        self.loop_stack.pop();

        self.current_block = Some(cond_blk);
        let cond_text = self.text_of(cond.range());
        let cond_value = self.parse_rhs_into(cond_blk, cond)?;
        self.function.push_statement(cond_blk, Statement::Expression(cond_value))?;
        self.function
            .push_statement(cond_blk, Statement::Branch(Branch::new(vec![body_blk, merge_blk], cond_text)))?;
        self.function.connect(cond_blk, body_blk);
        self.function.connect(cond_blk, merge_blk);

        self.current_block = Some(merge_blk);
        Ok(())
    }

    /// Unlike `if`/`while`/`do`-`while`, the condition is never
    /// RHS-parsed into its own expression statement: only the
    /// condition's source text is attached to the loop's branch, with
    /// no def/use-annotated entry for it in `for.cond`.
    fn lower_for(&mut self, init: Option<&Stmt>, cond: &Expr, inc: Option<&Stmt>, body: &Stmt) -> Result<()> {
        if let Some(init_stmt) = init {
            self.lower_stmt(init_stmt)?;
        }

        let cond_blk = self.new_block(true, "for.cond");
        let body_blk = self.function.push_block("for.body");
        let inc_blk = self.function.push_block("for.inc");
        let merge_blk = self.function.push_block("for.end");
        let cond_text = self.text_of(cond.range());
        self.function
            .push_statement(cond_blk, Statement::Branch(Branch::new(vec![body_blk, merge_blk], cond_text)))?;
        self.function.connect(cond_blk, body_blk);
        self.function.connect(cond_blk, merge_blk);

        self.loop_stack.push(LoopTargets {
            break_target: merge_blk,
            continue_target: inc_blk,
        });
        self.current_block = Some(body_blk);
        self.lower_stmt(body)?;
        self.fall_through(self.current(), inc_blk, "end of for.body")?;

        self.current_block = Some(inc_blk);
        if let Some(inc_stmt) = inc {
            self.lower_stmt(inc_stmt)?;
        }
        self.fall_through(self.current(), cond_blk, "end of for.inc")?;
        self.loop_stack.pop();

        self.current_block = Some(merge_blk);
        Ok(())
    }

    fn lower_break(&mut self) -> Result<()> {
        let target = self
            .loop_stack
            .last()
            .ok_or_else(|| crate::error::ErrorKind::Fatal("`break` outside of a loop".to_string()))?
            .break_target;
        let cur = self.current();
        self.function
            .push_statement(cur, Statement::Branch(Branch::new(vec![target], "break".to_string())))?;
        self.function.connect(cur, target);
        Ok(())
    }

    fn lower_continue(&mut self) -> Result<()> {
        let target = self
            .loop_stack
            .last()
            .ok_or_else(|| crate::error::ErrorKind::Fatal("`continue` outside of a loop".to_string()))?
            .continue_target;
        let cur = self.current();
        self.function
            .push_statement(cur, Statement::Branch(Branch::new(vec![target], "continue".to_string())))?;
        self.function.connect(cur, target);
        Ok(())
    }

    /// Resolve (creating if this is the label's first mention, via a
    /// forward goto) the block for `name`, fall into it from whatever is
    /// current, and lower `body` inside it.
    fn lower_label(&mut self, name: &str, body: &Stmt) -> Result<()> {
        let label_blk = self.label_block(name);
        let cur = self.current();
        self.function.connect(cur, label_blk);
        self.current_block = Some(label_blk);
        self.lower_stmt(body)
    }

    fn lower_goto(&mut self, label: &str) -> Result<()> {
        let target = self.label_block(label);
        let cur = self.current();
        self.function
            .push_statement(cur, Statement::Branch(Branch::new(vec![target], "goto".to_string())))?;
        self.function.connect(cur, target);
        Ok(())
    }

    fn label_block(&mut self, name: &str) -> BlockId {
        if let Some(&id) = self.label_map.get(name) {
            return id;
        }
        let id = self.function.push_block(name);
        self.label_map.insert(name.to_string(), id);
        id
    }
}

/// Lower one top-level function definition into its control-flow graph.
pub fn lower_function(resolver: &dyn SourceResolver, decl: &ast::FunctionDecl) -> Result<Function> {
    let parameters = decl
        .params
        .iter()
        .map(|p| VariableRef::new(p.name.clone(), resolver.resolve(p.range).text))
        .collect();

    let mut lowerer = FunctionLowerer {
        resolver,
        function: Function::new(decl.name.clone(), parameters),
        current_block: None,
        loop_stack: Vec::new(),
        label_map: HashMap::new(),
    };
    lowerer.new_block(true, "entry");
    lowerer.lower_stmt(&decl.body)?;
    lowerer.function.normalize_labels();
    Ok(lowerer.function)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOp, Literal, ParamDecl, VarDecl};
    use crate::test_support::StubResolver;

    fn var(src: &StubResolver, name: &str) -> Expr {
        Expr::Variable {
            name: name.to_string(),
            range: src.range_of(name),
        }
    }

    fn lit(range: SourceRange) -> Expr {
        Expr::Literal {
            literal: Literal::Int,
            range,
        }
    }

    /// `int f(int a) { return a; }`
    #[test]
    fn simple_return() {
        let src = StubResolver::new("int f(int a) { return a; }");
        let decl = ast::FunctionDecl {
            name: "f".to_string(),
            params: vec![ParamDecl {
                name: "a".to_string(),
                range: src.range_of("int a"),
            }],
            body: Stmt::Compound(vec![Stmt::Return {
                value: Some(var(&src, "a")),
                range: src.range_of("return a"),
            }]),
        };
        let func = lower_function(&src, &decl).unwrap();
        func.validate().unwrap();
        assert_eq!(func.blocks().len(), 1);
        let entry = func.block(func.entry());
        assert_eq!(entry.statements().len(), 1);
        match &entry.statements()[0] {
            Statement::Return(r) => match r.value() {
                Expression::Variable(v) => assert_eq!(v.name, "a"),
                other => panic!("expected Variable, got {:?}", other),
            },
            other => panic!("expected Return, got {:?}", other),
        }
        assert!(entry.successors().is_empty());
    }

    /// `int f(int a) { int b = a + 1; return b; }`
    #[test]
    fn binary_expr_assignment() {
        let src = StubResolver::new("int f(int a) { int b = a + 1; return b; }");
        let decl = ast::FunctionDecl {
            name: "f".to_string(),
            params: vec![ParamDecl {
                name: "a".to_string(),
                range: src.range_of("int a"),
            }],
            body: Stmt::Compound(vec![
                Stmt::Decl(vec![VarDecl {
                    name: "b".to_string(),
                    range: src.range_of("b = a + 1"),
                    init: Some(Expr::Binary {
                        op: BinOp::Plain,
                        lhs: Box::new(var(&src, "a")),
                        rhs: Box::new(lit(src.range_of("1"))),
                        range: src.range_of("a + 1"),
                    }),
                }]),
                Stmt::Return {
                    value: Some(var(&src, "b")),
                    range: src.range_of("return b"),
                },
            ]),
        };
        let func = lower_function(&src, &decl).unwrap();
        func.validate().unwrap();
        let entry = func.block(func.entry());
        assert_eq!(entry.statements().len(), 2);
        match &entry.statements()[0] {
            Statement::Assignment(a) => {
                assert_eq!(a.target().name, "b");
                match a.value() {
                    Expression::Basic(b) => assert!(b.uses().contains("a")),
                    other => panic!("expected Basic, got {:?}", other),
                }
            }
            other => panic!("expected Assignment, got {:?}", other),
        }
        assert!(entry.statements()[1].is_terminator());
    }

    /// `int f(int a) { if (a) { a = 1; } return a; }`
    #[test]
    fn if_without_else() {
        let src = StubResolver::new("int f(int a) { if (a) { a = 1; } return a; }");
        let decl = ast::FunctionDecl {
            name: "f".to_string(),
            params: vec![ParamDecl {
                name: "a".to_string(),
                range: src.range_of("int a"),
            }],
            body: Stmt::Compound(vec![
                Stmt::If {
                    cond: var(&src, "a"),
                    then_branch: Box::new(Stmt::Compound(vec![Stmt::Expr(Expr::Binary {
                        op: BinOp::Assign,
                        lhs: Box::new(var(&src, "a")),
                        rhs: Box::new(lit(src.range_of("1"))),
                        range: src.range_of("a = 1"),
                    })])),
                    else_branch: None,
                },
                Stmt::Return {
                    value: Some(var(&src, "a")),
                    range: src.range_of("return a"),
                },
            ]),
        };
        let func = lower_function(&src, &decl).unwrap();
        func.validate().unwrap();
        // entry, if.then, if.else, if.end
        assert_eq!(func.blocks().len(), 4);
        let entry = func.block(func.entry());
        assert_eq!(entry.successors().len(), 2);
        let then_blk = func.block(entry.successors()[0]);
        assert_eq!(then_blk.statements().len(), 2);
        let else_blk = func.block(entry.successors()[1]);
        assert_eq!(else_blk.statements().len(), 1);
        assert!(else_blk.statements()[0].is_terminator());
        let merge_blk_id = then_blk.successors()[0];
        assert_eq!(else_blk.successors()[0], merge_blk_id);
        let merge_blk = func.block(merge_blk_id);
        assert!(merge_blk.statements()[0].is_terminator());
    }

    /// `int f(void) { while (g()) { break; } return 0; }`
    #[test]
    fn while_with_break_and_call() {
        let src = StubResolver::new("int f(void) { while (g()) { break; } return 0; }");
        let decl = ast::FunctionDecl {
            name: "f".to_string(),
            params: vec![],
            body: Stmt::Compound(vec![
                Stmt::While {
                    cond: Expr::Call {
                        callee: Box::new(var(&src, "g")),
                        args: vec![],
                        range: src.range_of("g()"),
                    },
                    body: Box::new(Stmt::Compound(vec![Stmt::Break])),
                },
                Stmt::Return {
                    value: Some(lit(src.range_of("0"))),
                    range: src.range_of("return 0"),
                },
            ]),
        };
        let func = lower_function(&src, &decl).unwrap();
        func.validate().unwrap();
        // entry, while.cond, while.body, while.end
        assert_eq!(func.blocks().len(), 4);
        let cond_blk = func.block(BlockId(1));
        // the spliced call intermediate, the condition's own bare-expression
        // entry (an implicit-return reference to that same call), then the branch
        assert_eq!(cond_blk.statements().len(), 3);
        match &cond_blk.statements()[0] {
            Statement::Expression(Expression::Call(c)) => assert_eq!(c.callee_id(), "g"),
            other => panic!("expected Call, got {:?}", other),
        }
        match &cond_blk.statements()[1] {
            Statement::Expression(Expression::Variable(v)) => assert!(v.is_implicit_return()),
            other => panic!("expected implicit-return Variable, got {:?}", other),
        }
        assert!(cond_blk.statements()[2].is_terminator());
        let body_blk = func.block(BlockId(2));
        assert_eq!(body_blk.successors(), &[BlockId(3)]);
    }

    /// `int f(int n) { for (; n; n) { continue; } return n; }`
    #[test]
    fn for_with_continue() {
        let src = StubResolver::new("int f(int n) { for (; n; n) { continue; } return n; }");
        let decl = ast::FunctionDecl {
            name: "f".to_string(),
            params: vec![ParamDecl {
                name: "n".to_string(),
                range: src.range_of("int n"),
            }],
            body: Stmt::Compound(vec![
                Stmt::For {
                    init: None,
                    cond: var(&src, "n"),
                    inc: None,
                    body: Box::new(Stmt::Compound(vec![Stmt::Continue])),
                },
                Stmt::Return {
                    value: Some(var(&src, "n")),
                    range: src.range_of("return n"),
                },
            ]),
        };
        let func = lower_function(&src, &decl).unwrap();
        func.validate().unwrap();
        // entry, for.cond, for.body, for.inc, for.end
        assert_eq!(func.blocks().len(), 5);
        let cond_blk = func.block(BlockId(1));
        assert_eq!(cond_blk.statements().len(), 1);
        assert!(matches!(cond_blk.statements()[0], Statement::Branch(_)));
        let body_blk = func.block(BlockId(2));
        let inc_blk_id = BlockId(3);
        assert_eq!(body_blk.successors(), &[inc_blk_id]);
    }

    /// `void f(void) { loop: goto loop; }`
    #[test]
    fn goto_to_self_label() {
        let src = StubResolver::new("void f(void) { loop: goto loop; }");
        let decl = ast::FunctionDecl {
            name: "f".to_string(),
            params: vec![],
            body: Stmt::Compound(vec![Stmt::Label {
                name: "loop".to_string(),
                body: Box::new(Stmt::Goto {
                    label: "loop".to_string(),
                }),
            }]),
        };
        let func = lower_function(&src, &decl).unwrap();
        func.validate().unwrap();
        // entry, loop
        assert_eq!(func.blocks().len(), 2);
        let loop_blk = func.block(BlockId(1));
        assert_eq!(loop_blk.predecessors(), &[BlockId(0), BlockId(1)]);
        assert_eq!(loop_blk.successors(), &[BlockId(1)]);
        assert!(loop_blk.label().ends_with("-loop"));
    }
}
