//! Single-pass semantic checker
//!
//! Walks the token stream once, left to right. At each position it looks at
//! the token itself and at up to two tokens before it and one after it, and
//! applies whichever of these rules match:
//!
//! - the first token must open a block or start a declaration
//! - a token after `+`/`-` is folded into the nearest variable before it
//! - a token after `=` is stored into the variable two positions back
//! - every other token is checked against what may precede it
//!
//! Values are tracked as the check goes, so a variable holds its final value
//! once the pass is done. Native calls are evaluated where they appear.

use std::collections::HashSet;
use std::ops::ControlFlow;

use super::report::CheckReport;
use super::symbols::SymbolTable;
use crate::common::Diagnostic;
use crate::frontend::lexer::{Token, TokenKind};
use crate::natives::{CallContext, CallError, NativeRegistry};
use crate::types::{Value, ValueType};

/// Result of evaluating one call expression
#[derive(Debug)]
enum CallOutcome {
    /// Already reported
    Failed,
    Void,
    Value(Value),
}

/// Semantic checker over one token stream
pub struct SemanticChecker<'a> {
    tokens: &'a [Token],
    natives: &'a NativeRegistry,
    symbols: SymbolTable,
    diagnostics: Vec<Diagnostic>,
    calls: CallContext,
    /// Positions of declared names whose declaration was refused
    rejected: HashSet<usize>,
    /// Positions of callees already evaluated inside a larger expression
    evaluated: HashSet<usize>,
    /// Tokens before this position belong to an abandoned call
    skip_until: usize,
    /// End of the last arithmetic operand and the target the next operator
    /// in the same chain folds into
    chain: Option<(usize, usize)>,
}

impl<'a> SemanticChecker<'a> {
    pub fn new(tokens: &'a [Token], natives: &'a NativeRegistry) -> Self {
        Self {
            tokens,
            natives,
            symbols: SymbolTable::new(),
            diagnostics: Vec::new(),
            calls: CallContext::new(),
            rejected: HashSet::new(),
            evaluated: HashSet::new(),
            skip_until: 0,
            chain: None,
        }
    }

    /// Run the pass and hand back everything it found
    pub fn check(mut self) -> CheckReport {
        for i in 0..self.tokens.len() {
            self.check_token(i);
        }

        log::debug!(
            "checked {} tokens: {} symbols, {} diagnostics, {} operations",
            self.tokens.len(),
            self.symbols.len(),
            self.diagnostics.len(),
            self.calls.operations().len()
        );

        CheckReport {
            diagnostics: self.diagnostics,
            symbols: self.symbols.into_symbols(),
            operations: self.calls.into_operations(),
        }
    }

    fn check_token(&mut self, i: usize) {
        if i < self.skip_until {
            return;
        }
        let current = self.token(i);

        let Some(prev) = self.before(i, 1) else {
            if current.kind != TokenKind::OpenScope && !current.is_type() {
                self.error(
                    current,
                    format!("Unexpected '{}' at start of the script found.", current.text),
                );
            }
            return;
        };

        if prev.kind.is_arithmetic() {
            self.check_arithmetic(i);
            return;
        }

        if prev.kind == TokenKind::Equals
            && i >= 2
            && self.check_assignment(i).is_break()
        {
            return;
        }

        self.check_grammar(i, prev);
    }

    // ---- Grammar ----

    fn check_grammar(&mut self, i: usize, prev: &'a Token) {
        let current = self.token(i);

        match current.kind {
            TokenKind::OpenScope | TokenKind::CloseScope => {
                if !prev.kind.ends_statement() {
                    self.error(current, format!("Finish the statement at line {} first.", prev.line));
                }
            }

            TokenKind::Semicolon => {
                let allowed = prev.kind.ends_statement()
                    || prev.is_value()
                    || prev.kind == TokenKind::CloseParen;
                if allowed {
                    return;
                }
                if prev.is_type() {
                    self.error(
                        current,
                        format!(
                            "Expected an equal sign followed by a value or variable on line {}",
                            prev.line
                        ),
                    );
                } else if prev.kind == TokenKind::Equals {
                    self.error(
                        current,
                        format!("Expected a value or variable after the equal sign on line {}", prev.line),
                    );
                }
            }

            TokenKind::Equals => {
                if !prev.is_value() {
                    self.error(current, format!("{} cannot be followed by an equal sign.", prev.text));
                }
            }

            TokenKind::TypeInt | TokenKind::TypeFloat | TokenKind::TypeString => {
                if !prev.kind.ends_statement() {
                    self.error(current, format!("{} cannot be followed by a type.", prev.text));
                }
            }

            TokenKind::Identifier | TokenKind::StringLiteral => {
                if prev.is_value() {
                    self.error(
                        current,
                        format!("'{}' cannot be followed by '{}'.", prev.text, current.text),
                    );
                    return;
                }

                if let Some(ty) = prev.kind.value_type() {
                    self.declare(i, ty);
                }

                if self.is_callee(i) && !self.evaluated.contains(&i) {
                    self.evaluate_call(i);
                }
            }

            TokenKind::PlusOp
            | TokenKind::MinusOp
            | TokenKind::OpenParen
            | TokenKind::CloseParen
            | TokenKind::Comma => {}
        }
    }

    fn declare(&mut self, i: usize, ty: ValueType) {
        let token = self.token(i);

        // Left out of `rejected` so an initializer is still reported as an
        // assignment to a constant
        if token.kind != TokenKind::Identifier || token.is_number() {
            self.error(token, format!("'{}' is not a valid variable name.", token.text));
            return;
        }

        match self.symbols.declare(&token.text, ty, token.scope) {
            Ok(_) => log::trace!("declared {} {} at {}", ty, token.text, token.scope),
            Err(message) => {
                self.rejected.insert(i);
                self.error(token, message);
            }
        }
    }

    // ---- Assignment ----

    fn check_assignment(&mut self, i: usize) -> ControlFlow<()> {
        let current = self.token(i);
        let target_token = self.token(i - 2);
        let target = self.assignment_target(i - 2, current);

        if self.is_callee(i) {
            let (outcome, _) = self.evaluate_call(i);
            if let Some(target) = target {
                self.assign_call_result(current, target, outcome);
            }
            return ControlFlow::Break(());
        }

        if !current.is_value() {
            // `;`, braces, `=` and type keywords are left to the grammar rules
            if matches!(
                current.kind,
                TokenKind::OpenParen
                    | TokenKind::CloseParen
                    | TokenKind::Comma
                    | TokenKind::PlusOp
                    | TokenKind::MinusOp
            ) {
                self.error(current, unknown_source(current, target_token));
                return ControlFlow::Break(());
            }
            return ControlFlow::Continue(());
        }

        let (value, shown) = if let Some(number) = current.number() {
            (number, format!("'{}'", current.text))
        } else if let Some(contents) = current.string_contents() {
            (Value::String(contents.to_string()), format!("\"{}\"", contents))
        } else if let Some((visible, value)) = self.lookup(&current.text, target_token) {
            if !visible {
                self.error(current, not_accessible(&current.text));
                return ControlFlow::Break(());
            }
            (value, format!("'{}'", current.text))
        } else {
            self.error(current, unknown_source(current, target_token));
            return ControlFlow::Continue(());
        };

        let Some(target) = target else {
            return ControlFlow::Continue(());
        };
        self.store(current, target, value, || {
            format!("Cannot assign {} to '{}', the types differ.", shown, target)
        })
    }

    /// Name of the variable an assignment stores into, if it may be stored into
    fn assignment_target(&mut self, target: usize, at: &'a Token) -> Option<&'a str> {
        // The refused declaration has been reported already
        if self.rejected.contains(&target) {
            return None;
        }

        let token = self.token(target);
        let visible = self
            .symbols
            .find(&token.text)
            .map(|symbol| symbol.scope.is_visible_from(token.scope));

        match visible {
            Some(true) => Some(token.text.as_str()),
            Some(false) => {
                self.error(at, not_accessible(&token.text));
                None
            }
            None => {
                let message = if token.is_number() {
                    format!("Cannot assign to a value constant ({}).", token.text)
                } else if token.kind == TokenKind::StringLiteral {
                    format!("Cannot assign to a string literal ({}).", token.text)
                } else {
                    format!("Cannot assign to '{}', that variable does not exist.", token.text)
                };
                self.error(at, message);
                None
            }
        }
    }

    fn assign_call_result(&mut self, callee: &'a Token, target: &str, outcome: CallOutcome) {
        match outcome {
            CallOutcome::Failed => {}
            CallOutcome::Void => self.error(
                callee,
                format!(
                    "Cannot assign the result of '{}' to '{}', the function does not return a value.",
                    callee.text, target
                ),
            ),
            CallOutcome::Value(value) => {
                let _ = self.store(callee, target, value, || {
                    format!(
                        "Cannot assign the result of '{}' to '{}', the types differ.",
                        callee.text, target
                    )
                });
            }
        }
    }

    /// Store `value` into `target` if the types agree
    fn store(
        &mut self,
        at: &'a Token,
        target: &str,
        value: Value,
        mismatch: impl FnOnce() -> String,
    ) -> ControlFlow<()> {
        let Some(symbol) = self.symbols.find_mut(target) else {
            return ControlFlow::Continue(());
        };

        if symbol.ty() != value.ty() {
            self.error(at, mismatch());
            return ControlFlow::Break(());
        }

        log::trace!("line {}: {} = {}", at.line, target, value);
        symbol.assign(value);
        ControlFlow::Continue(())
    }

    // ---- Arithmetic ----

    fn check_arithmetic(&mut self, i: usize) {
        let op = self.token(i - 1);
        let current = self.token(i);

        // Nothing to fold into without a left operand
        let has_left = self
            .before(i, 2)
            .is_some_and(|t| t.is_value() || t.kind == TokenKind::CloseParen);
        if !has_left {
            return;
        }

        let Some((operand, end)) = self.arithmetic_operand(i, op) else {
            return;
        };

        let target = match self.chain {
            Some((last_end, target)) if last_end + 2 == i => Some(target),
            _ => self.accumulation_target(i),
        };
        let Some(target) = target else {
            return;
        };
        // A variable operand is itself the nearest candidate for the next
        // operator in the chain
        let next = if end == i && current.kind == TokenKind::Identifier && !current.is_number() {
            i
        } else {
            target
        };
        self.chain = Some((end, next));

        if self.rejected.contains(&target) {
            return;
        }
        let target_token = self.token(target);

        let accumulated = match self.lookup(&target_token.text, target_token) {
            Some((true, value)) => value,
            Some((false, _)) => {
                self.error(current, not_accessible(&target_token.text));
                return;
            }
            None => {
                self.error(
                    current,
                    format!(
                        "Cannot apply '{}' to '{}', that variable does not exist.",
                        op.text, target_token.text
                    ),
                );
                return;
            }
        };

        if accumulated.ty() != operand.ty() {
            self.error(
                current,
                format!(
                    "Cannot concatenate '{}' and '{}', the types differ.",
                    current.text, target_token.text
                ),
            );
            return;
        }

        let result = match (op.kind, accumulated, operand) {
            (TokenKind::PlusOp, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_add(b)),
            (TokenKind::PlusOp, Value::Float(a), Value::Float(b)) => Value::Float(a + b),
            (TokenKind::PlusOp, Value::String(a), Value::String(b)) => Value::String(a + &b),
            (TokenKind::MinusOp, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_sub(b)),
            (TokenKind::MinusOp, Value::Float(a), Value::Float(b)) => Value::Float(a - b),
            (TokenKind::MinusOp, Value::String(_), Value::String(_)) => {
                self.error(current, "The string type does not define the minus operator.");
                return;
            }
            _ => return,
        };

        log::trace!(
            "line {}: {} {} {} -> {}",
            current.line,
            target_token.text,
            op.text,
            current.text,
            result
        );
        // Arithmetic changes the value without counting as an assignment
        if let Some(symbol) = self.symbols.find_mut(&target_token.text) {
            symbol.value = result;
        }
    }

    /// Value of the token right after an arithmetic operator and the
    /// position of its last token
    fn arithmetic_operand(&mut self, i: usize, op: &'a Token) -> Option<(Value, usize)> {
        let current = self.token(i);

        if self.is_callee(i) {
            let (outcome, end) = self.evaluate_call(i);
            return match (outcome, end) {
                (CallOutcome::Value(value), Some(end)) => Some((value, end)),
                (CallOutcome::Void, _) => {
                    self.error(
                        current,
                        format!(
                            "Cannot use '{}' in an expression, the function does not return a value.",
                            current.text
                        ),
                    );
                    None
                }
                _ => None,
            };
        }

        if let Some(number) = current.number() {
            return Some((number, i));
        }
        if let Some(contents) = current.string_contents() {
            return Some((Value::String(contents.to_string()), i));
        }

        if current.kind != TokenKind::Identifier {
            self.error(current, format!("'{}' cannot be followed by '{}'.", op.text, current.text));
            return None;
        }

        match self.lookup(&current.text, current) {
            Some((true, value)) => Some((value, i)),
            Some((false, _)) => {
                self.error(current, not_accessible(&current.text));
                None
            }
            None => {
                self.error(
                    current,
                    format!(
                        "Cannot use '{}' in an expression, that variable does not exist.",
                        current.text
                    ),
                );
                None
            }
        }
    }

    /// Nearest variable before position `i` in the same statement
    ///
    /// Numeric constants, callees and everything between a call's parentheses
    /// are stepped over. An operand inside an argument list has no target.
    fn accumulation_target(&self, i: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut j = i;

        while j > 0 {
            j -= 1;
            let token = self.token(j);
            match token.kind {
                kind if kind.ends_statement() => return None,
                TokenKind::CloseParen => depth += 1,
                TokenKind::OpenParen if depth > 0 => depth -= 1,
                TokenKind::OpenParen | TokenKind::Comma if depth == 0 => return None,
                TokenKind::Identifier if depth == 0 && !token.is_number() && !self.is_callee(j) => {
                    return Some(j);
                }
                _ => {}
            }
        }
        None
    }

    // ---- Calls ----

    /// Evaluate the call whose callee sits at `callee`
    ///
    /// Returns the outcome and the position of the call's closing
    /// parenthesis, or `None` when the argument list is malformed.
    fn evaluate_call(&mut self, callee: usize) -> (CallOutcome, Option<usize>) {
        self.evaluated.insert(callee);

        let name = self.token(callee);
        let mut args = Vec::new();
        let mut complete = true;
        let mut j = callee + 2;

        let empty = self
            .tokens
            .get(j)
            .is_some_and(|t| t.kind == TokenKind::CloseParen);

        if !empty {
            loop {
                let Some(arg) = self.open_call_token(name, j) else {
                    return self.abandon_call(j);
                };

                if self.is_callee(j) {
                    let (outcome, end) = self.evaluate_call(j);
                    let Some(end) = end else {
                        return self.abandon_call(j);
                    };
                    match outcome {
                        CallOutcome::Value(value) => args.push(value),
                        CallOutcome::Void => {
                            self.error(
                                arg,
                                format!(
                                    "Cannot pass the result of '{}' to '{}', the function does not return a value.",
                                    arg.text, name.text
                                ),
                            );
                            complete = false;
                        }
                        CallOutcome::Failed => complete = false,
                    }
                    j = end + 1;
                } else if arg.is_value() {
                    match self.argument_value(name, arg) {
                        Some(value) => args.push(value),
                        None => complete = false,
                    }
                    j += 1;
                } else {
                    self.error(
                        name,
                        format!("Expected an argument in call to '{}', found '{}'.", name.text, arg.text),
                    );
                    return self.abandon_call(j);
                }

                let Some(separator) = self.open_call_token(name, j) else {
                    return self.abandon_call(j);
                };
                match separator.kind {
                    TokenKind::Comma => j += 1,
                    TokenKind::CloseParen => break,
                    _ => {
                        self.error(
                            name,
                            format!(
                                "Expected ',' or ')' in call to '{}', found '{}'.",
                                name.text, separator.text
                            ),
                        );
                        return self.abandon_call(j);
                    }
                }
            }
        }

        if !self.natives.exists(&name.text) {
            let error = CallError::Unknown {
                function: name.text.clone(),
            };
            self.error(name, error.to_string());
            return (CallOutcome::Failed, Some(j));
        }
        if !complete {
            return (CallOutcome::Failed, Some(j));
        }

        let natives = self.natives;
        let outcome = match natives.call(&name.text, &args, &mut self.calls) {
            Ok(Some(value)) => CallOutcome::Value(value),
            Ok(None) => CallOutcome::Void,
            Err(error) => {
                self.error(name, error.to_string());
                CallOutcome::Failed
            }
        };
        log::trace!("line {}: {}({} args) -> {:?}", name.line, name.text, args.len(), outcome);
        (outcome, Some(j))
    }

    /// Give up on a malformed argument list
    ///
    /// The rest of the statement is not checked again, so calls further
    /// along the list never run.
    fn abandon_call(&mut self, from: usize) -> (CallOutcome, Option<usize>) {
        let end = self
            .tokens
            .iter()
            .skip(from)
            .position(|t| t.kind.ends_statement())
            .map_or(self.tokens.len(), |k| from + k);
        self.skip_until = self.skip_until.max(end);
        (CallOutcome::Failed, None)
    }

    /// Token at `j` inside the parentheses of a call to `name`
    ///
    /// Running into the end of the statement or of the script means the
    /// closing parenthesis is missing.
    fn open_call_token(&mut self, name: &'a Token, j: usize) -> Option<&'a Token> {
        let tokens = self.tokens;
        match tokens.get(j) {
            Some(token) if !token.kind.ends_statement() => Some(token),
            _ => {
                self.error(name, format!("Missing ')' in call to '{}'.", name.text));
                None
            }
        }
    }

    fn argument_value(&mut self, callee: &'a Token, arg: &'a Token) -> Option<Value> {
        if let Some(number) = arg.number() {
            return Some(number);
        }
        if let Some(contents) = arg.string_contents() {
            return Some(Value::String(contents.to_string()));
        }

        match self.lookup(&arg.text, arg) {
            Some((true, value)) => Some(value),
            Some((false, _)) => {
                self.error(arg, not_accessible(&arg.text));
                None
            }
            None => {
                self.error(
                    arg,
                    format!("Cannot pass '{}' to '{}', '{}' does not exist.", arg.text, callee.text, arg.text),
                );
                None
            }
        }
    }

    // ---- Helpers ----

    fn token(&self, i: usize) -> &'a Token {
        let tokens = self.tokens;
        &tokens[i]
    }

    fn before(&self, i: usize, back: usize) -> Option<&'a Token> {
        let tokens = self.tokens;
        i.checked_sub(back).map(|j| &tokens[j])
    }

    /// Current value of `name` and whether it may be used at `site`
    fn lookup(&self, name: &str, site: &Token) -> Option<(bool, Value)> {
        self.symbols
            .find(name)
            .map(|symbol| (symbol.scope.is_visible_from(site.scope), symbol.value.clone()))
    }

    fn is_callee(&self, i: usize) -> bool {
        let token = self.token(i);
        token.kind == TokenKind::Identifier
            && !token.is_number()
            && self
                .tokens
                .get(i + 1)
                .is_some_and(|next| next.kind == TokenKind::OpenParen)
    }

    fn error(&mut self, at: &Token, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::new(at.line, at.span, message));
    }
}

fn unknown_source(source: &Token, target: &Token) -> String {
    format!(
        "Cannot assign '{}' to '{}', '{}' does not exist.",
        source.text, target.text, source.text
    )
}

fn not_accessible(name: &str) -> String {
    format!("Cannot access {}, that variable is declared on another level.", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Span;
    use crate::frontend::lexer::{ScopeCoord, tokenize};
    use crate::natives::{Operation, OperationId};
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> CheckReport {
        let natives = NativeRegistry::with_builtins().unwrap();
        SemanticChecker::new(&tokenize(source), &natives).check()
    }

    fn messages(report: &CheckReport) -> Vec<&str> {
        report.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    fn value(report: &CheckReport, name: &str) -> Value {
        report.symbol(name).unwrap().value.clone()
    }

    fn string(s: &str) -> Value {
        Value::String(s.to_string())
    }

    // ---- Declarations and assignment ----

    #[test]
    fn test_declaration_without_value() {
        let report = run("int x;");
        assert!(!report.has_errors());

        let x = report.symbol("x").unwrap();
        assert_eq!(x.value, Value::Int(0));
        assert!(!x.initialized);
    }

    #[test]
    fn test_declaration_with_value() {
        let report = run("int x = 5;\nfloat f = 2.5;\nstring s = \"hi there\";");
        assert_eq!(messages(&report), Vec::<&str>::new());

        assert_eq!(value(&report, "x"), Value::Int(5));
        assert_eq!(value(&report, "f"), Value::Float(2.5));
        assert_eq!(value(&report, "s"), string("hi there"));
        assert!(report.symbols.iter().all(|s| s.initialized));
    }

    #[test]
    fn test_later_assignment() {
        let report = run("int x;\nx = 7;");
        assert!(!report.has_errors());
        assert_eq!(value(&report, "x"), Value::Int(7));
    }

    #[test]
    fn test_redeclaration_reports_once() {
        let report = run("int x = 5;\nint x = 7;");
        assert_eq!(
            messages(&report),
            vec!["'x' already exists. Cannot re-declare a variable."]
        );
        assert_eq!(report.diagnostics[0].line, 2);
        assert_eq!(value(&report, "x"), Value::Int(5));
        assert_eq!(report.symbols.len(), 1);
    }

    #[test]
    fn test_redeclaration_in_another_block() {
        let report = run("{ int x = 1; } { float x = 2.0; }");
        assert_eq!(
            messages(&report),
            vec!["'x' already exists. Cannot re-declare a variable."]
        );
        assert_eq!(value(&report, "x"), Value::Int(1));
    }

    #[test]
    fn test_string_into_int() {
        let report = run("int x = \"abc\";");
        assert_eq!(
            messages(&report),
            vec!["Cannot assign \"abc\" to 'x', the types differ."]
        );
        assert!(!report.symbol("x").unwrap().initialized);
    }

    #[test]
    fn test_number_types_do_not_mix() {
        let report = run("float f = 5;\nint n = 2.5;");
        assert_eq!(
            messages(&report),
            vec![
                "Cannot assign '5' to 'f', the types differ.",
                "Cannot assign '2.5' to 'n', the types differ.",
            ]
        );
    }

    #[test]
    fn test_copy_variable() {
        let report = run("int a = 4;\nint b = a;");
        assert!(!report.has_errors());
        assert_eq!(value(&report, "b"), Value::Int(4));
    }

    #[test]
    fn test_copy_variable_of_other_type() {
        let report = run("int a = 4;\nfloat b = a;");
        assert_eq!(
            messages(&report),
            vec!["Cannot assign 'a' to 'b', the types differ."]
        );
    }

    #[test]
    fn test_assign_unknown_variable() {
        let report = run("int x = y;");
        assert_eq!(
            messages(&report),
            vec!["Cannot assign 'y' to 'x', 'y' does not exist."]
        );
    }

    #[test]
    fn test_assign_to_undeclared() {
        let report = run("int y;\nx = 5;");
        assert_eq!(
            messages(&report),
            vec!["Cannot assign to 'x', that variable does not exist."]
        );
    }

    #[test]
    fn test_assign_to_constant() {
        let report = run("int y;\n5 = 3;");
        assert_eq!(messages(&report), vec!["Cannot assign to a value constant (5)."]);
    }

    #[test]
    fn test_assign_to_string_literal() {
        let report = run("int y;\n\"a\" = 3;");
        assert_eq!(
            messages(&report),
            vec!["Cannot assign to a string literal (\"a\")."]
        );
    }

    #[test]
    fn test_invalid_variable_name() {
        let report = run("int 5 = 3;");
        assert_eq!(
            messages(&report),
            vec![
                "'5' is not a valid variable name.",
                "Cannot assign to a value constant (5).",
            ]
        );
        assert!(report.symbols.is_empty());
    }

    #[test]
    fn test_punctuation_after_equals() {
        let cases = [
            ("int x = (5);", "Cannot assign '(' to 'x', '(' does not exist."),
            ("int x = );", "Cannot assign ')' to 'x', ')' does not exist."),
            ("int x = , 5;", "Cannot assign ',' to 'x', ',' does not exist."),
            ("int x = + 5;", "Cannot assign '+' to 'x', '+' does not exist."),
        ];
        for (source, expected) in cases {
            let report = run(source);
            assert_eq!(messages(&report), vec![expected], "checking {:?}", source);
            assert!(!report.symbol("x").unwrap().initialized);
        }
    }

    #[test]
    fn test_leading_minus_leaves_target_alone() {
        let report = run("int x = - 5;");
        assert_eq!(
            messages(&report),
            vec!["Cannot assign '-' to 'x', '-' does not exist."]
        );
        let x = report.symbol("x").unwrap();
        assert_eq!(x.value, Value::Int(0));
        assert!(!x.initialized);
    }

    #[test]
    fn test_unknown_target_and_source() {
        let report = run("int a;\ny = z;");
        assert_eq!(
            messages(&report),
            vec![
                "Cannot assign to 'y', that variable does not exist.",
                "Cannot assign 'z' to 'y', 'z' does not exist.",
            ]
        );
        assert!(report.diagnostics.iter().all(|d| d.line == 2));
    }

    // ---- Scope access ----

    #[test]
    fn test_outer_variable_visible_in_block() {
        let report = run("int a = 1;\n{ int b = a; }");
        assert!(!report.has_errors());
        assert_eq!(value(&report, "b"), Value::Int(1));
        assert_eq!(report.symbol("b").unwrap().scope, ScopeCoord::new(1, 1));
    }

    #[test]
    fn test_sibling_block_not_visible() {
        let report = run("{\n int a = 1;\n}\n{\n int b = a;\n}");
        assert_eq!(
            messages(&report),
            vec!["Cannot access a, that variable is declared on another level."]
        );
        assert_eq!(report.diagnostics[0].line, 5);
        assert!(!report.symbol("b").unwrap().initialized);
    }

    #[test]
    fn test_assign_into_sibling_block() {
        let report = run("{ int a; } { a = 5; }");
        assert_eq!(
            messages(&report),
            vec!["Cannot access a, that variable is declared on another level."]
        );
        assert!(!report.symbol("a").unwrap().initialized);
    }

    // ---- Arithmetic ----

    #[test]
    fn test_int_arithmetic() {
        let report = run("int x = 5 + 3 - 2;");
        assert!(!report.has_errors());
        assert_eq!(value(&report, "x"), Value::Int(6));
    }

    #[test]
    fn test_float_arithmetic() {
        let report = run("float f = 1.5 + 2.25;");
        assert_eq!(value(&report, "f"), Value::Float(3.75));
    }

    #[test]
    fn test_string_concatenation() {
        let report = run("string s = \"ab\" + \"cd\";");
        assert!(!report.has_errors());
        assert_eq!(value(&report, "s"), string("abcd"));
    }

    #[test]
    fn test_string_minus() {
        let report = run("string s = \"ab\" - \"cd\";");
        assert_eq!(
            messages(&report),
            vec!["The string type does not define the minus operator."]
        );
        assert_eq!(value(&report, "s"), string("ab"));
    }

    #[test]
    fn test_arithmetic_type_mismatch() {
        let report = run("int x = 1 + 2.5;");
        assert_eq!(
            messages(&report),
            vec!["Cannot concatenate '2.5' and 'x', the types differ."]
        );
        assert_eq!(value(&report, "x"), Value::Int(1));
    }

    #[test]
    fn test_variable_operand() {
        let report = run("int a = 2;\nint b = 10 + a;");
        assert!(!report.has_errors());
        assert_eq!(value(&report, "b"), Value::Int(12));
    }

    #[test]
    fn test_increment_in_inner_block() {
        let report = run("int x = 5;\n{ x = x + 1; }");
        assert!(!report.has_errors());
        assert_eq!(value(&report, "x"), Value::Int(6));
    }

    #[test]
    fn test_long_chain() {
        let source = format!("int x = 0{};", " + 1".repeat(200));
        let report = run(&source);
        assert!(!report.has_errors());
        assert_eq!(value(&report, "x"), Value::Int(200));
    }

    #[test]
    fn test_chain_through_call() {
        let report = run("float f = 0.5 + squareroot(4.0) + 1.5 - 1.0;");
        assert!(!report.has_errors());
        assert_eq!(value(&report, "f"), Value::Float(3.0));
    }

    #[test]
    fn test_unknown_operand() {
        let report = run("int x = 1 + y;");
        assert_eq!(
            messages(&report),
            vec!["Cannot use 'y' in an expression, that variable does not exist."]
        );
    }

    #[test]
    fn test_arithmetic_on_undeclared_target() {
        let report = run("int y;\nz + 1;");
        assert_eq!(
            messages(&report),
            vec!["Cannot apply '+' to 'z', that variable does not exist."]
        );
    }

    // ---- Grammar ----

    #[test]
    fn test_unexpected_start() {
        let report = run("x = 5;");
        assert_eq!(
            report.diagnostics[0].message,
            "Unexpected 'x' at start of the script found."
        );
    }

    #[test]
    fn test_start_with_block_or_type() {
        assert!(!run("{ }").has_errors());
        assert!(!run("string s;").has_errors());
    }

    #[test]
    fn test_unfinished_statement_before_brace() {
        let report = run("{ int x }");
        assert_eq!(messages(&report), vec!["Finish the statement at line 1 first."]);
    }

    #[test]
    fn test_type_after_value() {
        let report = run("int x = 5 int y;");
        assert_eq!(messages(&report), vec!["5 cannot be followed by a type."]);
    }

    #[test]
    fn test_declaration_without_name() {
        let report = run("int;");
        assert_eq!(
            messages(&report),
            vec!["Expected an equal sign followed by a value or variable on line 1"]
        );
    }

    #[test]
    fn test_equals_without_value() {
        let report = run("int x =\n;");
        assert_eq!(
            messages(&report),
            vec!["Expected a value or variable after the equal sign on line 1"]
        );
        assert_eq!(report.diagnostics[0].line, 2);
    }

    #[test]
    fn test_value_after_value() {
        let report = run("int x;\nx y;");
        assert_eq!(messages(&report), vec!["'x' cannot be followed by 'y'."]);
    }

    #[test]
    fn test_equals_after_punctuation() {
        let report = run("int x;\n; = 5;");
        assert_eq!(report.diagnostics[0].message, "; cannot be followed by an equal sign.");
    }

    #[test]
    fn test_diagnostic_points_at_token() {
        let report = run("int x = \"abc\";");
        assert_eq!(report.diagnostics[0].span, Span::new(8, 13));
    }

    // ---- Calls ----

    #[test]
    fn test_squareroot() {
        let report = run("float r = squareroot(4.0);");
        assert_eq!(messages(&report), Vec::<&str>::new());
        assert_eq!(value(&report, "r"), Value::Float(2.0));
        assert!(report.symbol("r").unwrap().initialized);
    }

    #[test]
    fn test_power() {
        let report = run("float p = power(2.0, 3.0);");
        assert!(!report.has_errors());
        assert_eq!(value(&report, "p"), Value::Float(8.0));
    }

    #[test]
    fn test_call_arity() {
        let report = run("float r = squareroot(4.0, 1.0);");
        assert_eq!(
            messages(&report),
            vec!["squareroot expects 1 parameter(s), got 2."]
        );
        assert!(!report.symbol("r").unwrap().initialized);
    }

    #[test]
    fn test_call_parameter_type() {
        let report = run("float r = squareroot(4);");
        assert_eq!(
            messages(&report),
            vec!["Parameter 1 has a bad type (expected float, got int, in function call squareroot)"]
        );
    }

    #[test]
    fn test_unknown_function() {
        let report = run("int r = nothing(1);");
        assert_eq!(
            messages(&report),
            vec!["Could not call 'nothing', that function does not exist."]
        );
    }

    #[test]
    fn test_call_with_variables() {
        let report = run(
            "string s = \"hello world\";\nstring t = substring(s, 0, 5);\nint n = size(t);",
        );
        assert!(!report.has_errors());
        assert_eq!(value(&report, "t"), string("hello"));
        assert_eq!(value(&report, "n"), Value::Int(5));
    }

    #[test]
    fn test_nested_call() {
        let report = run("float r = squareroot(power(3.0, 2.0));");
        assert!(!report.has_errors());
        assert_eq!(value(&report, "r"), Value::Float(3.0));
    }

    #[test]
    fn test_call_result_in_arithmetic() {
        let report = run("float r = squareroot(4.0) + 1.0;");
        assert!(!report.has_errors());
        assert_eq!(value(&report, "r"), Value::Float(3.0));
    }

    #[test]
    fn test_call_statement_records_operation() {
        let report = run("{ messageBox(\"Title\", toString(1)); }");
        assert!(!report.has_errors());
        assert_eq!(
            report.operations,
            vec![Operation {
                id: OperationId::MessageBox,
                args: vec![string("Title"), string("1")],
            }]
        );
    }

    #[test]
    fn test_assign_void_result() {
        let report = run("string s = messageBox(\"a\", \"b\");");
        assert_eq!(
            messages(&report),
            vec!["Cannot assign the result of 'messageBox' to 's', the function does not return a value."]
        );
        assert_eq!(report.operations.len(), 1);
    }

    #[test]
    fn test_assign_result_of_other_type() {
        let report = run("int n = squareroot(4.0);");
        assert_eq!(
            messages(&report),
            vec!["Cannot assign the result of 'squareroot' to 'n', the types differ."]
        );
    }

    #[test]
    fn test_to_string_result() {
        let report = run("string s = toString(42);");
        assert_eq!(value(&report, "s"), string("42"));
    }

    #[test]
    fn test_missing_close_paren() {
        let report = run("float r = squareroot(4.0;");
        assert_eq!(messages(&report), vec!["Missing ')' in call to 'squareroot'."]);
    }

    #[test]
    fn test_bad_separator() {
        let report = run("float r = power(2.0 3.0);");
        assert_eq!(
            report.diagnostics[0].message,
            "Expected ',' or ')' in call to 'power', found '3.0'."
        );
    }

    #[test]
    fn test_unknown_argument() {
        let report = run("float r = squareroot(y);");
        assert_eq!(
            messages(&report),
            vec!["Cannot pass 'y' to 'squareroot', 'y' does not exist."]
        );
    }

    #[test]
    fn test_refused_declaration_skips_initializer() {
        let report = run("float r = 1.0;\nfloat r = squareroot(16.0);");
        assert_eq!(
            messages(&report),
            vec!["'r' already exists. Cannot re-declare a variable."]
        );
        assert_eq!(value(&report, "r"), Value::Float(1.0));
    }

    #[test]
    fn test_malformed_nested_call_reports_once() {
        let report = run("float r = squareroot(power(2.0;\nint x;");
        assert_eq!(messages(&report), vec!["Missing ')' in call to 'power'."]);
        assert!(report.symbol("x").is_some());
    }

    #[test]
    fn test_abandoned_call_runs_nothing_else() {
        let report = run("{ power(1.0 2.0, messageBox(\"a\", \"b\")); }\nint x = 1;");
        assert_eq!(
            messages(&report),
            vec!["Expected ',' or ')' in call to 'power', found '2.0'."]
        );
        assert!(report.operations.is_empty());
        assert_eq!(value(&report, "x"), Value::Int(1));
    }

    #[test]
    fn test_rejected_call_has_no_operation() {
        let report = run("{ messageBox(\"only one\"); }");
        assert_eq!(
            messages(&report),
            vec!["messageBox expects 2 parameter(s), got 1."]
        );
        assert!(report.operations.is_empty());
    }
}
