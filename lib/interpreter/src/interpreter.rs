use std::{
    cell::RefCell,
    io::{self, Stdout, Write},
    rc::Rc,
};

use errors::{Line, Location, Reporter, RloxError, RloxErrors};
use parser::{Expr, Parser, Program, Stmt};
use scanner::{Token, TokenData};

mod environment;
pub use environment::Environment;

mod function;
pub use function::{Callable, LoxFunction, NativeFunction};

mod native;
pub use native::NATIVES;

mod value;
pub use value::Value;
use value::Typed;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Operand must be a number.")]
    OperandMustBeNumber { operator: Token },
    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers { operator: Token },
    #[error("Operands must be two numbers or two strings.")]
    InvalidAddOperands { operator: Token },
    #[error("Undefined variable '{}'.", .name.lexeme())]
    UndefinedVariable { name: Token },
    #[error("Can only call functions and classes.")]
    NotCallable { closing_paren: Token },
    #[error("Expected {expected} arguments but got {got}.")]
    ArityMismatch { closing_paren: Token, expected: usize, got: usize },
    #[error("Stack overflow.")]
    StackOverflow { closing_paren: Token },
    #[error("Could not write output: {source}")]
    Output { keyword: Token, source: io::Error },
}

impl RuntimeError {
    /// The line of the token the error is attributed to.
    pub fn line(&self) -> Line {
        match self {
            RuntimeError::OperandMustBeNumber { operator }
            | RuntimeError::OperandsMustBeNumbers { operator }
            | RuntimeError::InvalidAddOperands { operator } => operator.line(),
            RuntimeError::UndefinedVariable { name } => name.line(),
            RuntimeError::NotCallable { closing_paren }
            | RuntimeError::ArityMismatch { closing_paren, .. }
            | RuntimeError::StackOverflow { closing_paren } => closing_paren.line(),
            RuntimeError::Output { keyword, .. } => keyword.line(),
        }
    }
}

impl From<&RuntimeError> for RloxError {
    fn from(error: &RuntimeError) -> Self {
        RloxError::new(error.line(), Location::Unspecified, error.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InterpretError {
    #[error("{0}")]
    SyntaxError(RloxErrors),
    #[error("{0}\n[line {line}]", line = .0.line())]
    RuntimeError(#[from] RuntimeError),
}

/// How a statement finished. `Return` unwinds up to the enclosing function call.
#[derive(Debug, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
}

type Result<T> = std::result::Result<T, RuntimeError>;

/// How many calls may be active at once before a call fails with a stack overflow.
pub const MAX_CALL_DEPTH: usize = 4096;

/// Tree-walking evaluator. Globals (and everything reachable from them) persist
/// across calls to [`Interpreter::run_source`], `print` output goes to `out`.
#[derive(Debug)]
pub struct Interpreter<W: Write> {
    globals: Rc<RefCell<Environment>>,
    out: W,
    call_depth: usize,
}

impl Default for Interpreter<Stdout> {
    fn default() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        let globals = Environment::global();
        for native in NATIVES {
            globals.borrow_mut().define(native.name, Value::Callable(Callable::Native(*native)));
        }
        Self { globals, out, call_depth: 0 }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Scans, parses and, only if both succeeded without errors, executes `source`.
    /// All diagnostics are also handed to `reporter`.
    pub fn run_source(
        &mut self,
        source: &str,
        reporter: &mut dyn Reporter,
    ) -> std::result::Result<(), InterpretError> {
        let (tokens, mut errors) = scanner::scan(source);
        let (program, parse_errors) = Parser::new(tokens).parse_partial();
        errors.extend(parse_errors.0);

        if !errors.is_empty() {
            for error in errors.iter() {
                reporter.error(error.clone());
            }
            return Err(InterpretError::SyntaxError(errors));
        }

        self.interpret(&program).map_err(|e| {
            reporter.runtime_error((&e).into());
            e.into()
        })
    }

    /// Executes the statements in order. The first runtime error stops the
    /// program, whatever ran before stays visible in the globals.
    pub fn interpret(&mut self, program: &Program) -> Result<()> {
        let globals = self.globals.clone();
        for stmt in &program.statements {
            if let Flow::Return(_) = self.execute(stmt, &globals)? {
                break;
            }
        }
        Ok(())
    }

    /// Runs `stmts` in `environment`, a fresh scope the caller created. The
    /// caller's own scope is untouched on every way out of here.
    pub(crate) fn execute_block(
        &mut self,
        stmts: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<Flow> {
        for stmt in stmts {
            if let Flow::Return(value) = self.execute(stmt, &environment)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn execute(&mut self, stmt: &Stmt, env: &Rc<RefCell<Environment>>) -> Result<Flow> {
        stack::ensure_sufficient_stack(|| self.execute_stmt(stmt, env))
    }

    fn execute_stmt(&mut self, stmt: &Stmt, env: &Rc<RefCell<Environment>>) -> Result<Flow> {
        log::trace!("Executing {}", stmt);
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr, env)?;
            }
            Stmt::Print { keyword, expr } => {
                let value = self.evaluate(expr, env)?;
                log::trace!("Printing {}", Typed(&value));
                writeln!(self.out, "{}", value)
                    .map_err(|source| RuntimeError::Output { keyword: keyword.clone(), source })?;
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(init) => self.evaluate(init, env)?,
                    None => Value::Nil,
                };
                env.borrow_mut().define(name.lexeme(), value);
            }
            Stmt::Block(stmts) => {
                return self.execute_block(stmts, Environment::enclosed(env.clone()));
            }
            Stmt::If { condition, then_branch, else_branch } => {
                if self.evaluate(condition, env)?.is_truthy() {
                    return self.execute(then_branch, env);
                } else if let Some(else_branch) = else_branch {
                    return self.execute(else_branch, env);
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition, env)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body, env)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }
            Stmt::For(for_loop) => {
                return self.execute(for_loop.lowered(), env);
            }
            Stmt::Function(declaration) => {
                let function = LoxFunction::new(declaration.clone(), env.clone());
                log::debug!("Defining {}", function);
                env.borrow_mut().define(
                    declaration.name.lexeme(),
                    Value::Callable(Callable::Function(Rc::new(function))),
                );
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(value) => self.evaluate(value, env)?,
                    None => Value::Nil,
                };
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn evaluate(&mut self, expr: &Expr, env: &Rc<RefCell<Environment>>) -> Result<Value> {
        stack::ensure_sufficient_stack(|| self.evaluate_expr(expr, env))
    }

    fn evaluate_expr(&mut self, expr: &Expr, env: &Rc<RefCell<Environment>>) -> Result<Value> {
        use Expr::*;
        match expr {
            Literal(literal) => Ok(literal.into()),

            Grouping(expr) => self.evaluate(expr, env),

            Unary { operator, right } => {
                let right = self.evaluate(right, env)?;
                match (&operator.data, right) {
                    (TokenData::Minus, Value::Number(n)) => Ok((-n).into()),
                    (TokenData::Minus, _) => {
                        Err(RuntimeError::OperandMustBeNumber { operator: operator.clone() })
                    }
                    (TokenData::Bang, v) => Ok((!v.is_truthy()).into()),
                    _ => unreachable!("Parser only produces '-' and '!' as unary operators"),
                }
            }

            Variable(name) => env.borrow().get(name),

            Assign { name, value } => {
                let value = self.evaluate(value, env)?;
                env.borrow_mut().assign(name, value.clone())?;
                Ok(value)
            }

            Logical { left, operator, right } => {
                let left = self.evaluate(left, env)?;
                let short_circuits = match operator.data {
                    TokenData::Or => left.is_truthy(),
                    TokenData::And => !left.is_truthy(),
                    _ => unreachable!("Parser only produces 'and' and 'or' as logical operators"),
                };
                if short_circuits {
                    Ok(left)
                } else {
                    self.evaluate(right, env)
                }
            }

            Binary { left, operator, right } => {
                let left = self.evaluate(left, env)?;
                let right = self.evaluate(right, env)?;
                binary(operator, left, right)
            }

            Call { callee, closing_paren, arguments } => {
                let callee = self.evaluate(callee, env)?;
                let Value::Callable(callable) = callee else {
                    return Err(RuntimeError::NotCallable { closing_paren: closing_paren.clone() });
                };

                let arguments = arguments
                    .iter()
                    .map(|argument| self.evaluate(argument, env))
                    .collect::<Result<Vec<_>>>()?;

                if arguments.len() != callable.arity() {
                    return Err(RuntimeError::ArityMismatch {
                        closing_paren: closing_paren.clone(),
                        expected: callable.arity(),
                        got: arguments.len(),
                    });
                }

                if self.call_depth >= MAX_CALL_DEPTH {
                    return Err(RuntimeError::StackOverflow {
                        closing_paren: closing_paren.clone(),
                    });
                }

                self.call_depth += 1;
                let result = callable.call(self, arguments);
                self.call_depth -= 1;
                result
            }
        }
    }
}

fn binary(operator: &Token, left: Value, right: Value) -> Result<Value> {
    use Value::{Number, Str};
    match (left, right, &operator.data) {
        (Number(l), Number(r), TokenData::Minus) => Ok((l - r).into()),
        (Number(l), Number(r), TokenData::Slash) => Ok((l / r).into()),
        (Number(l), Number(r), TokenData::Star) => Ok((l * r).into()),
        (Number(l), Number(r), TokenData::Plus) => Ok((l + r).into()),
        (Str(l), Str(r), TokenData::Plus) => Ok((l + &r).into()),

        (Number(l), Number(r), TokenData::Greater) => Ok((l > r).into()),
        (Number(l), Number(r), TokenData::GreaterEqual) => Ok((l >= r).into()),
        (Number(l), Number(r), TokenData::Less) => Ok((l < r).into()),
        (Number(l), Number(r), TokenData::LessEqual) => Ok((l <= r).into()),

        (l, r, TokenData::EqualEqual) => Ok((l == r).into()),
        (l, r, TokenData::BangEqual) => Ok((l != r).into()),

        (_, _, TokenData::Plus) => {
            Err(RuntimeError::InvalidAddOperands { operator: operator.clone() })
        }
        (
            _,
            _,
            TokenData::Minus
            | TokenData::Slash
            | TokenData::Star
            | TokenData::Greater
            | TokenData::GreaterEqual
            | TokenData::Less
            | TokenData::LessEqual,
        ) => Err(RuntimeError::OperandsMustBeNumbers { operator: operator.clone() }),

        _ => unreachable!("Parser never produces {:?} as a binary operator", operator.data),
    }
}

#[cfg(test)]
mod tests {
    use errors::ErrorLog;
    use pretty_assertions::assert_eq;

    use super::*;

    #[ctor::ctor]
    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// One interpreter fed with several sources, like an interactive session.
    #[derive(Default)]
    struct Session {
        interpreter: Interpreter<Vec<u8>>,
        log: ErrorLog,
    }

    impl Default for Interpreter<Vec<u8>> {
        fn default() -> Self {
            Self::new(Vec::new())
        }
    }

    impl Session {
        fn run(&mut self, source: &str) -> std::result::Result<(), InterpretError> {
            self.log.reset();
            self.interpreter.run_source(source, &mut self.log)
        }

        /// Takes everything printed so far.
        fn output(&mut self) -> String {
            String::from_utf8(std::mem::take(&mut self.interpreter.out)).unwrap()
        }
    }

    fn run_ok(source: &str) -> String {
        let mut session = Session::default();
        if let Err(e) = session.run(source) {
            panic!("Unexpected error: {}", e);
        }
        session.output()
    }

    fn run_err(source: &str) -> (String, String) {
        let mut session = Session::default();
        let err = session.run(source).unwrap_err();
        (session.output(), err.to_string())
    }

    #[test]
    fn number_formatting() {
        assert_eq!(run_ok("print 6.0; print 6.5; print 1 / 4; print -0.5 * 2;"), "6\n6.5\n0.25\n-1\n");
    }

    #[test]
    fn printing_values() {
        assert_eq!(
            run_ok("print \"str\"; print true; print nil; var a; print a; fun f() {} print f; print clock;"),
            "str\ntrue\nnil\nnil\n<fn f>\n<native fn>\n"
        );
    }

    #[test]
    fn arithmetic_and_comparison() {
        assert_eq!(
            run_ok("print 1 + 2 * 3; print (1 + 2) * 3; print 10 - 4 - 3; print 7 / 2; print 1 < 2; print 2 <= 2; print 3 > 4; print 3 >= 4;"),
            "7\n9\n3\n3.5\ntrue\ntrue\nfalse\nfalse\n"
        );
        assert_eq!(run_ok("print 1 / 0; print -1 / 0;"), "inf\n-inf\n");
    }

    #[test]
    fn strings() {
        assert_eq!(run_ok("print \"foo\" + \"bar\";"), "foobar\n");
        assert_eq!(run_ok("var s = \"a\nb\"; print s;"), "a\nb\n");
    }

    #[test]
    fn equality() {
        assert_eq!(
            run_ok("print nil == nil; print nil == false; print 1 == 1; print 1 == \"1\"; print \"a\" != \"a\"; print true == true;"),
            "true\nfalse\ntrue\nfalse\nfalse\ntrue\n"
        );
        assert_eq!(
            run_ok("fun f() {} fun g() {} print f == f; print f == g; print clock == clock;"),
            "true\nfalse\ntrue\n"
        );
    }

    #[test]
    fn truthiness() {
        assert_eq!(
            run_ok("print !nil; print !false; print !0; print !\"\"; print !clock; if (0) print \"zero is truthy\";"),
            "true\ntrue\nfalse\nfalse\nfalse\nzero is truthy\n"
        );
    }

    #[test]
    fn logical_operators_short_circuit() {
        assert_eq!(run_ok("print false and (1/0);"), "false\n");
        assert_eq!(run_ok("print true or (1/0);"), "true\n");
        assert_eq!(run_ok("print false and undefined;"), "false\n");
        assert_eq!(run_ok("print nil or \"default\";"), "default\n");
        assert_eq!(run_ok("print 1 and 2;"), "2\n");
        assert_eq!(run_ok("print \"\" or 3;"), "\n");
    }

    #[test]
    fn block_scoping() {
        assert_eq!(
            run_ok("var a = \"global\"; { var a = \"local\"; print a; } print a;"),
            "local\nglobal\n"
        );
        assert_eq!(
            run_ok("var a = 1; { a = 2; var a = 3; a = 4; print a; } print a;"),
            "4\n2\n"
        );
    }

    #[test]
    fn redefinition_overwrites() {
        assert_eq!(run_ok("var a = 1; var a; print a; var a = \"x\"; print a;"), "nil\nx\n");
    }

    #[test]
    fn assignment_is_an_expression() {
        assert_eq!(run_ok("var a; var b; a = b = 3; print a; print b; print a = 4;"), "3\n3\n4\n");
    }

    #[test]
    fn control_flow() {
        assert_eq!(
            run_ok("if (1 > 2) print \"then\"; else print \"else\"; var i = 0; while (i < 3) { print i; i = i + 1; }"),
            "else\n0\n1\n2\n"
        );
    }

    #[test]
    fn for_loop_variable_is_scoped_to_the_loop() {
        let mut session = Session::default();
        let err = session.run("for (var i = 0; i < 3; i = i + 1) print i;\nprint i;").unwrap_err();
        assert_eq!(session.output(), "0\n1\n2\n");
        assert_eq!(err.to_string(), "Undefined variable 'i'.\n[line 2]");
    }

    #[test]
    fn closures_capture_independent_scopes() {
        let source = r#"
            fun makeCounter() {
                var i = 0;
                fun inc() {
                    i = i + 1;
                    return i;
                }
                return inc;
            }
            var c = makeCounter();
            print c();
            print c();
            var d = makeCounter();
            print d();
            print c();
        "#;
        assert_eq!(run_ok(source), "1\n2\n1\n3\n");
    }

    #[test]
    fn closures_see_later_assignments() {
        let source = r#"
            var a = "before";
            fun show() { print a; }
            show();
            a = "after";
            show();
        "#;
        assert_eq!(run_ok(source), "before\nafter\n");
    }

    #[test]
    fn closure_scope_is_the_definition_site() {
        let source = r#"
            var x = "global";
            fun show() { print x; }
            {
                var x = "block";
                show();
            }
        "#;
        assert_eq!(run_ok(source), "global\n");
    }

    #[test]
    fn recursion() {
        let source = r#"
            fun fib(n) {
                if (n <= 1) return n;
                return fib(n - 2) + fib(n - 1);
            }
            print fib(15);
        "#;
        assert_eq!(run_ok(source), "610\n");
    }

    #[test]
    fn return_unwinds_to_the_call() {
        let source = r#"
            fun find() {
                for (var i = 0; ; i = i + 1) {
                    while (true) {
                        { if (i == 3) return i; }
                        i = i + 1;
                    }
                }
            }
            print find();
            fun loop() {
                var i = 0;
                while (true) {
                    i = i + 1;
                    if (i == 5) return "done";
                }
            }
            print loop();
        "#;
        assert_eq!(run_ok(source), "3\ndone\n");

        assert_eq!(run_ok("fun f() { return; } print f();"), "nil\n");
        assert_eq!(run_ok("fun f() { 1 + 1; } print f();"), "nil\n");
        assert_eq!(run_ok("fun f() { { { return \"deep\"; } } print \"unreachable\"; } print f();"), "deep\n");
    }

    #[test]
    fn arguments_are_evaluated_left_to_right() {
        let source = r#"
            fun show(x) { print x; return x; }
            fun add(a, b, c) { return a + b + c; }
            print add(show(1), show(2), show(3));
        "#;
        assert_eq!(run_ok(source), "1\n2\n3\n6\n");
    }

    #[test]
    fn functions_are_values() {
        let source = r#"
            fun twice(f, x) { return f(f(x)); }
            fun inc(x) { return x + 1; }
            var g = inc;
            print twice(g, 1);
            fun curry(a) { fun inner(b) { return a + b; } return inner; }
            print curry(1)(2);
            inc = "no longer a function";
            print inc;
        "#;
        assert_eq!(run_ok(source), "3\n3\nno longer a function\n");
    }

    #[test]
    fn clock_is_defined() {
        assert_eq!(run_ok("print clock() > 0; var t = clock(); print t <= clock();"), "true\ntrue\n");
    }

    #[test]
    fn arity_mismatch() {
        let (output, err) = run_err("print \"before\";\nfun f(a) {}\nf();\nprint \"after\";");
        assert_eq!(output, "before\n");
        assert_eq!(err, "Expected 1 arguments but got 0.\n[line 3]");

        let (_, err) = run_err("clock(1);");
        assert_eq!(err, "Expected 0 arguments but got 1.\n[line 1]");
    }

    #[test]
    fn deep_recursion_is_a_runtime_error() {
        let mut session = Session::default();
        session.run("fun depth(n) {\n  if (n == 0) return 0;\n  return depth(n - 1) + 1;\n}").unwrap();

        session.run("print depth(3000);").unwrap();
        assert_eq!(session.output(), "3000\n");

        let err = session.run("print \"before\";\nprint depth(5000);").unwrap_err();
        assert!(matches!(err, InterpretError::RuntimeError(RuntimeError::StackOverflow { .. })));
        assert_eq!(err.to_string(), "Stack overflow.\n[line 3]");
        assert_eq!(session.output(), "before\n");

        // Unwinding released every frame, the session goes on.
        session.run("print depth(10);").unwrap();
        assert_eq!(session.output(), "10\n");
        assert_eq!(session.interpreter.call_depth, 0);

        let (_, err) = run_err("fun forever() { forever(); }\nforever();");
        assert_eq!(err, "Stack overflow.\n[line 1]");
    }

    #[test]
    fn deeply_nested_source_is_a_syntax_error() {
        let mut session = Session::default();
        let source = format!("print {}1{};", "(".repeat(2000), ")".repeat(2000));
        let err = session.run(&source).unwrap_err();
        assert_eq!(err.to_string(), "[line 1] Error at '(': Too much nesting.");

        let source = format!("print {}1{};", "(".repeat(1000), ")".repeat(1000));
        session.run(&source).unwrap();
        assert_eq!(session.output(), "1\n");
    }

    #[test]
    fn calling_non_callables() {
        let (_, err) = run_err("\"str\"();");
        assert_eq!(err, "Can only call functions and classes.\n[line 1]");

        // The callee is checked before any argument runs.
        let mut session = Session::default();
        session.run("var calls = 0; fun count() { calls = calls + 1; }").unwrap();
        assert!(session.run("nil(count());").is_err());
        session.run("print calls;").unwrap();
        assert_eq!(session.output(), "0\n");
    }

    #[test]
    fn operand_errors() {
        assert_eq!(run_err("-\"a\";").1, "Operand must be a number.\n[line 1]");
        assert_eq!(run_err("1 < \"a\";").1, "Operands must be numbers.\n[line 1]");
        assert_eq!(run_err("nil * 2;").1, "Operands must be numbers.\n[line 1]");
        assert_eq!(run_err("1 + \"a\";").1, "Operands must be two numbers or two strings.\n[line 1]");
        assert_eq!(run_err("\n\"a\" + nil;").1, "Operands must be two numbers or two strings.\n[line 2]");
    }

    #[test]
    fn undefined_variables() {
        assert_eq!(run_err("print x;").1, "Undefined variable 'x'.\n[line 1]");
        assert_eq!(run_err("x = 1;").1, "Undefined variable 'x'.\n[line 1]");
        assert_eq!(run_err("{ x = 1; }").1, "Undefined variable 'x'.\n[line 1]");
    }

    #[test]
    fn runtime_errors_are_reported_and_partial_state_survives() {
        let mut session = Session::default();
        let err = session.run("var a = 1;\na = 2;\n-\"x\";\na = 3;").unwrap_err();
        assert!(matches!(err, InterpretError::RuntimeError(RuntimeError::OperandMustBeNumber { .. })));
        assert!(session.log.had_runtime_error());
        assert!(!session.log.had_error());
        assert_eq!(session.log.runtime_errors().to_string(), "[line 3] Error: Operand must be a number.");

        session.run("print a;").unwrap();
        assert_eq!(session.output(), "2\n");
    }

    #[test]
    fn scopes_are_restored_after_errors() {
        let mut session = Session::default();
        session.run("var x = \"global\";").unwrap();

        assert!(session.run("{ var x = \"block\"; var leaked = 1; -nil; }").is_err());
        assert!(session.run("fun f() { var x = \"local\"; -nil; } f();").is_err());

        session.run("print x;").unwrap();
        assert_eq!(session.output(), "global\n");
        assert_eq!(session.run("print leaked;").unwrap_err().to_string(), "Undefined variable 'leaked'.\n[line 1]");
    }

    #[test]
    fn globals_persist_across_runs() {
        let mut session = Session::default();
        session.run("var count = 0; fun bump() { count = count + 1; return count; }").unwrap();
        session.run("bump();").unwrap();
        session.run("print bump();").unwrap();
        assert_eq!(session.output(), "2\n");
    }

    #[test]
    fn syntax_errors_prevent_execution() {
        let mut session = Session::default();
        let err = session.run("print \"side effect\";\nprint ;\nvar 1;").unwrap_err();
        assert!(matches!(err, InterpretError::SyntaxError(_)));
        assert_eq!(
            err.to_string(),
            "[line 2] Error at ';': Expect expression.\n[line 3] Error at '1': Expect variable name."
        );
        assert_eq!(session.output(), "");
        assert!(session.log.had_error());
        assert_eq!(session.log.errors().len(), 2);

        let err = session.run("print \"ok\"; @").unwrap_err();
        assert_eq!(err.to_string(), "[line 1] Error: Unexpected character.");
        assert_eq!(session.output(), "");

        // The next line starts over.
        session.run("print \"ok\";").unwrap();
        assert_eq!(session.output(), "ok\n");
    }

    #[test]
    fn scan_and_parse_errors_are_reported_together() {
        let (_, err) = run_err("var a = \"unterminated;\n");
        assert_eq!(
            err,
            "[line 2] Error: Unterminated string.\n[line 2] Error at end: Expect expression."
        );
    }

    #[test]
    fn write_errors_become_runtime_errors() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut interpreter = Interpreter::new(Broken);
        let mut log = ErrorLog::new();
        let err = interpreter.run_source("\nprint 1;", &mut log).unwrap_err();
        assert!(matches!(err, InterpretError::RuntimeError(RuntimeError::Output { .. })));
        assert_eq!(err.to_string(), "Could not write output: closed\n[line 2]");
    }
}
