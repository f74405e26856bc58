use std::{
    cell::RefCell,
    collections::HashMap,
    fs,
    io::{self, BufRead, Write},
    rc::Rc,
};

use log::{debug, trace};

use crate::{
    builtin::Builtin,
    config::Config,
    environment::Environment,
    error::{EvalResult, RuntimeError, Signal},
    object::{Function, HashPair, Object},
};

/// Deepest chain of nested user function calls before evaluation gives up.
pub const MAX_CALL_DEPTH: usize = 10_000;

// If less than this much stack remains, evaluation continues on a new segment
const RED_ZONE: usize = 100 * 1024;
const STACK_PER_RECURSION: usize = 1024 * 1024;

use bigl_parser::{
    ast::{
        AssignOperator, BlockStatement, Expression, ForExpression, HashLiteral, IfExpression,
        Program, Statement, WhileExpression,
    },
    token::Token,
};

/// Objects every evaluation shares instead of allocating again.
#[derive(Clone)]
struct Constants {
    nil: Rc<Object>,
    truth: Rc<Object>,
    falsehood: Rc<Object>,
}

impl Constants {
    fn new() -> Self {
        Constants {
            nil: Rc::new(Object::Nil),
            truth: Rc::new(Object::Boolean(true)),
            falsehood: Rc::new(Object::Boolean(false)),
        }
    }
}

pub struct Evaluator {
    env: Rc<RefCell<Environment>>,
    config: Config,
    output: Rc<RefCell<dyn Write>>,
    input: Rc<RefCell<dyn BufRead>>,
    constants: Constants,
    call_depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::new_with_env(Rc::new(RefCell::new(Environment::new())))
    }

    pub fn new_with_env(env: Rc<RefCell<Environment>>) -> Self {
        Evaluator {
            env,
            config: Config::default(),
            output: Rc::new(RefCell::new(io::stdout())),
            input: Rc::new(RefCell::new(io::BufReader::new(io::stdin()))),
            constants: Constants::new(),
            call_depth: 0,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Send everything `print`/`println` write to `output`
    pub fn with_output(mut self, output: Rc<RefCell<dyn Write>>) -> Self {
        self.output = output;
        self
    }

    /// Read lines for `read` from `input`
    pub fn with_input(mut self, input: Rc<RefCell<dyn BufRead>>) -> Self {
        self.input = input;
        self
    }

    pub fn output(&self) -> Rc<RefCell<dyn Write>> {
        Rc::clone(&self.output)
    }

    pub fn input(&self) -> Rc<RefCell<dyn BufRead>> {
        Rc::clone(&self.input)
    }

    pub fn nil(&self) -> Rc<Object> {
        Rc::clone(&self.constants.nil)
    }

    pub fn boolean(&self, value: bool) -> Rc<Object> {
        if value {
            Rc::clone(&self.constants.truth)
        } else {
            Rc::clone(&self.constants.falsehood)
        }
    }

    /// Evaluate every statement of the program and produce the last value.
    ///
    /// A `return` at the top level ends the program with its value. Errors
    /// and `exit` come back as `Err`; no other signal escapes this function.
    pub fn eval(&mut self, prog: &Program) -> EvalResult {
        let mut result = self.nil();

        for stmt in &prog.statements {
            match self.eval_statement(stmt) {
                Ok(value) => result = value,
                // If a return value is found, immediately return and stop evaluating statements
                Err(Signal::Return(value)) => return Ok(value),
                Err(Signal::Break) => return Err(RuntimeError::BreakOutsideLoop.into()),
                Err(signal) => return Err(signal),
            }
        }

        Ok(result)
    }

    // Similar to eval (for programs) but lets every signal through
    fn eval_block_statement(&mut self, block: &BlockStatement) -> EvalResult {
        let mut result = self.nil();

        for stmt in &block.statements {
            result = self.eval_statement(stmt)?;
        }

        Ok(result)
    }

    fn eval_statement(&mut self, stmt: &Statement) -> EvalResult {
        trace!("eval {}", stmt);

        match stmt {
            Statement::Expression { expression } => self.eval_expression(expression),
            Statement::Let { name, value } => {
                let obj = self.eval_expression(value)?;

                if Builtin::lookup(name).is_some() {
                    return Err(RuntimeError::BuiltinShadowed(name.clone()).into());
                }

                self.env.borrow_mut().define(name, obj);
                Ok(self.nil())
            }
            Statement::Assign {
                target,
                operator,
                value,
            } => {
                self.eval_assignment(target, *operator, value)?;
                Ok(self.nil())
            }
            Statement::Return { value } => {
                let obj = match value {
                    Some(value) => self.eval_expression(value)?,
                    None => self.nil(),
                };
                Err(Signal::Return(obj))
            }
            Statement::Break => Err(Signal::Break),
        }
    }

    fn eval_expression(&mut self, expr: &Expression) -> EvalResult {
        // Nested expressions and calls recurse on the host stack
        stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, || {
            self.eval_expression_node(expr)
        })
    }

    fn eval_expression_node(&mut self, expr: &Expression) -> EvalResult {
        match expr {
            Expression::Integer(value) => Ok(Rc::new(Object::Integer(*value))),
            Expression::Float(value) => Ok(Rc::new(Object::Float(*value))),
            Expression::Boolean(value) => Ok(self.boolean(*value)),
            Expression::String(value) => Ok(Rc::new(Object::String(value.clone()))),
            Expression::Identifier(name) => self.eval_identifier_expression(name),
            Expression::Array(array) => {
                let elements = self.eval_expressions(&array.elements)?;
                Ok(Rc::new(Object::new_array(elements)))
            }
            Expression::Hash(hash) => self.eval_hash_literal(hash),

            Expression::Prefix(prefix) => {
                let right = self.eval_expression(&prefix.right)?;
                self.eval_prefix_expression(&prefix.operator, right)
            }
            Expression::Infix(infix) => {
                let left = self.eval_expression(&infix.left)?;
                let right = self.eval_expression(&infix.right)?;
                self.eval_infix_expression(&infix.operator, left, right)
            }
            Expression::Index(index) => {
                let left = self.eval_expression(&index.left)?;
                let index = self.eval_expression(&index.index)?;
                self.eval_index_expression(left, index)
            }
            Expression::If(if_exp) => self.eval_if_expression(if_exp),
            Expression::For(for_exp) => self.eval_for_expression(for_exp),
            Expression::While(while_exp) => self.eval_while_expression(while_exp),
            Expression::Function(func) => Ok(Rc::new(Object::Function(Function {
                parameters: func.parameters.clone(),
                body: Rc::clone(&func.body),
                env: Rc::clone(&self.env),
            }))),
            Expression::Call(call) => {
                let func = self.eval_expression(&call.function)?;
                let args = self.eval_expressions(&call.arguments)?;
                self.apply_function(func, args)
            }
        }
    }

    /// Evaluate left to right, stopping at the first signal.
    fn eval_expressions(&mut self, exprs: &[Expression]) -> EvalResult<Vec<Rc<Object>>> {
        exprs.iter().map(|expr| self.eval_expression(expr)).collect()
    }

    fn eval_identifier_expression(&self, name: &str) -> EvalResult {
        let value = self.env.borrow().get(name);

        match value {
            Some(value) => Ok(value),
            None => match Builtin::lookup(name) {
                Some(builtin) => Ok(Rc::new(Object::Builtin(builtin))),
                None => Err(RuntimeError::IdentifierNotFound(name.to_owned()).into()),
            },
        }
    }

    fn eval_hash_literal(&mut self, hash: &HashLiteral) -> EvalResult {
        let mut pairs = HashMap::new();

        for (key_expr, value_expr) in &hash.pairs {
            let key = self.eval_expression(key_expr)?;
            let hash_key = key
                .hash_key()
                .ok_or_else(|| RuntimeError::UnhashableKey(key.typename()))?;
            let value = self.eval_expression(value_expr)?;

            pairs.insert(hash_key, HashPair { key, value });
        }

        Ok(Rc::new(Object::Hash(RefCell::new(pairs))))
    }

    fn eval_prefix_expression(&self, operator: &Token, right: Rc<Object>) -> EvalResult {
        match (operator, right.as_ref()) {
            (Token::Bang, _) => Ok(self.boolean(!right.is_truthy())),
            (Token::Minus, Object::Integer(value)) => {
                Ok(Rc::new(Object::Integer(value.wrapping_neg())))
            }
            (Token::Minus, Object::Float(value)) => Ok(Rc::new(Object::Float(-value))),
            _ => Err(RuntimeError::UnknownPrefixOperator {
                operator: operator.clone(),
                right: right.typename(),
            }
            .into()),
        }
    }

    fn eval_infix_expression(
        &self,
        operator: &Token,
        left: Rc<Object>,
        right: Rc<Object>,
    ) -> EvalResult {
        match (left.as_ref(), right.as_ref()) {
            (Object::Integer(l), Object::Integer(r)) => {
                self.eval_integer_infix_expression(operator, *l, *r)
            }
            // Any float turns the whole operation into a float one
            (Object::Float(l), Object::Float(r)) => {
                self.eval_float_infix_expression(operator, *l, *r)
            }
            (Object::Float(l), Object::Integer(r)) => {
                self.eval_float_infix_expression(operator, *l, *r as f64)
            }
            (Object::Integer(l), Object::Float(r)) => {
                self.eval_float_infix_expression(operator, *l as f64, *r)
            }
            (Object::String(l), Object::String(r)) => {
                self.eval_string_infix_expression(operator, l, r)
            }
            (l, r) if l.typename() != r.typename() => Err(RuntimeError::TypeMismatch {
                operator: operator.clone(),
                left: l.typename(),
                right: r.typename(),
            }
            .into()),
            // Same kind, no dedicated table: only equality, by display form
            (l, r) => match operator {
                Token::EqualEqual => Ok(self.boolean(l.to_string() == r.to_string())),
                Token::BangEqual => Ok(self.boolean(l.to_string() != r.to_string())),
                _ => Err(RuntimeError::UnknownInfixOperator {
                    operator: operator.clone(),
                    left: l.typename(),
                    right: r.typename(),
                }
                .into()),
            },
        }
    }

    fn eval_integer_infix_expression(&self, operator: &Token, left: i64, right: i64) -> EvalResult {
        let result = match operator {
            Token::Plus => Object::Integer(left.wrapping_add(right)),
            Token::Minus => Object::Integer(left.wrapping_sub(right)),
            Token::Star => Object::Integer(left.wrapping_mul(right)),
            Token::Slash => {
                if right == 0 {
                    return Err(RuntimeError::DivisionByZero.into());
                }
                Object::Integer(left.wrapping_div(right))
            }
            Token::LessThan => return Ok(self.boolean(left < right)),
            Token::GreaterThan => return Ok(self.boolean(left > right)),
            Token::EqualEqual => return Ok(self.boolean(left == right)),
            Token::BangEqual => return Ok(self.boolean(left != right)),
            _ => {
                return Err(RuntimeError::UnknownInfixOperator {
                    operator: operator.clone(),
                    left: "integer",
                    right: "integer",
                }
                .into())
            }
        };

        Ok(Rc::new(result))
    }

    fn eval_float_infix_expression(&self, operator: &Token, left: f64, right: f64) -> EvalResult {
        let result = match operator {
            Token::Plus => Object::Float(left + right),
            Token::Minus => Object::Float(left - right),
            Token::Star => Object::Float(left * right),
            Token::Slash => Object::Float(left / right),
            Token::LessThan => return Ok(self.boolean(left < right)),
            Token::GreaterThan => return Ok(self.boolean(left > right)),
            Token::EqualEqual => return Ok(self.boolean(left == right)),
            Token::BangEqual => return Ok(self.boolean(left != right)),
            _ => {
                return Err(RuntimeError::UnknownInfixOperator {
                    operator: operator.clone(),
                    left: "float",
                    right: "float",
                }
                .into())
            }
        };

        Ok(Rc::new(result))
    }

    fn eval_string_infix_expression(&self, operator: &Token, left: &str, right: &str) -> EvalResult {
        match operator {
            Token::Plus => Ok(Rc::new(Object::String(format!("{}{}", left, right)))),
            Token::EqualEqual => Ok(self.boolean(left == right)),
            Token::BangEqual => Ok(self.boolean(left != right)),
            _ => Err(RuntimeError::UnknownInfixOperator {
                operator: operator.clone(),
                left: "string",
                right: "string",
            }
            .into()),
        }
    }

    fn eval_index_expression(&self, left: Rc<Object>, index: Rc<Object>) -> EvalResult {
        match left.as_ref() {
            Object::Array(elements) => match index.as_ref() {
                Object::Integer(i) => {
                    let element = usize::try_from(*i)
                        .ok()
                        .and_then(|i| elements.borrow().get(i).cloned());
                    // Out of bounds reads give null
                    Ok(element.unwrap_or_else(|| self.nil()))
                }
                other => Err(RuntimeError::InvalidIndexType(other.typename()).into()),
            },
            Object::Hash(pairs) => {
                let key = index
                    .hash_key()
                    .ok_or_else(|| RuntimeError::UnhashableKey(index.typename()))?;
                let value = pairs.borrow().get(&key).map(|pair| Rc::clone(&pair.value));
                Ok(value.unwrap_or_else(|| self.nil()))
            }
            other => Err(RuntimeError::IndexNotSupported(other.typename()).into()),
        }
    }

    fn eval_if_expression(&mut self, if_exp: &IfExpression) -> EvalResult {
        let condition = self.eval_expression(&if_exp.condition)?;

        if condition.is_truthy() {
            self.eval_block_statement(&if_exp.consequence)
        } else if let Some(alternative) = &if_exp.alternative {
            self.eval_block_statement(alternative)
        } else {
            Ok(self.nil())
        }
    }

    fn eval_while_expression(&mut self, while_exp: &WhileExpression) -> EvalResult {
        let loop_env = Environment::new_enclosed(Rc::clone(&self.env));

        self.eval_in_env(loop_env, |evaluator| {
            loop {
                let condition = evaluator.eval_expression(&while_exp.condition)?;
                match condition.as_ref() {
                    Object::Boolean(true) => {}
                    Object::Boolean(false) => break,
                    other => {
                        return Err(RuntimeError::ExpectedBooleanCondition(other.typename()).into())
                    }
                }

                match evaluator.eval_block_statement(&while_exp.body) {
                    Ok(_) => {}
                    Err(Signal::Break) => break,
                    Err(signal) => return Err(signal),
                }
            }

            Ok(evaluator.nil())
        })
    }

    fn eval_for_expression(&mut self, for_exp: &ForExpression) -> EvalResult {
        let iterable = self.eval_expression(&for_exp.iterable)?;

        // Arrays are iterated as they were when the loop started
        let items: Box<dyn Iterator<Item = Rc<Object>>> = match iterable.as_ref() {
            Object::Array(elements) => Box::new(elements.borrow().clone().into_iter()),
            Object::Range(range) => Box::new(range.iter().map(|i| Rc::new(Object::Integer(i)))),
            other => return Err(RuntimeError::NotIterable(other.typename()).into()),
        };

        // One frame for the whole loop, so closures made in the body share the variable
        let loop_env = Environment::new_enclosed(Rc::clone(&self.env));

        self.eval_in_env(loop_env, |evaluator| {
            for item in items {
                evaluator.env.borrow_mut().define(&for_exp.variable, item);

                match evaluator.eval_block_statement(&for_exp.body) {
                    Ok(_) => {}
                    Err(Signal::Break) => break,
                    Err(signal) => return Err(signal),
                }
            }

            Ok(evaluator.nil())
        })
    }

    fn eval_assignment(
        &mut self,
        target: &Expression,
        operator: AssignOperator,
        value: &Expression,
    ) -> EvalResult<()> {
        match target {
            Expression::Identifier(name) => match operator.infix_token() {
                // A plain assignment to a new name binds it in the current frame
                None => {
                    let value = self.eval_expression(value)?;
                    if !self.env.borrow().contains(name) && Builtin::lookup(name).is_some() {
                        return Err(RuntimeError::BuiltinShadowed(name.clone()).into());
                    }

                    self.env.borrow_mut().set(name, value);
                    Ok(())
                }
                Some(token) => {
                    if !self.env.borrow().contains(name) {
                        return Err(RuntimeError::IdentifierNotFound(name.clone()).into());
                    }

                    let value = self.eval_expression(value)?;
                    let current = self.eval_identifier_expression(name)?;
                    let value = self.eval_compound(&token, &current, value)?;

                    self.env.borrow_mut().assign(name, value)?;
                    Ok(())
                }
            },
            Expression::Index(index) => {
                let collection = self.eval_expression(&index.left)?;
                let key = self.eval_expression(&index.index)?;
                let value = self.eval_expression(value)?;

                self.assign_index(&collection, key, operator, value)
            }
            _ => Err(RuntimeError::InvalidAssignmentTarget(target.to_string()).into()),
        }
    }

    /// Write through to an array element or a hash slot.
    fn assign_index(
        &self,
        collection: &Object,
        index: Rc<Object>,
        operator: AssignOperator,
        value: Rc<Object>,
    ) -> EvalResult<()> {
        match collection {
            Object::Array(elements) => {
                let position = match index.as_ref() {
                    Object::Integer(i) => *i,
                    other => return Err(RuntimeError::InvalidIndexType(other.typename()).into()),
                };

                let length = elements.borrow().len();
                let slot = usize::try_from(position)
                    .ok()
                    .filter(|&slot| slot < length)
                    .ok_or(RuntimeError::IndexOutOfBounds {
                        index: position,
                        length,
                    })?;

                let value = match operator.infix_token() {
                    None => value,
                    Some(token) => {
                        let current = Rc::clone(&elements.borrow()[slot]);
                        self.eval_compound(&token, &current, value)?
                    }
                };

                elements.borrow_mut()[slot] = value;
                Ok(())
            }
            Object::Hash(pairs) => {
                let key = index
                    .hash_key()
                    .ok_or_else(|| RuntimeError::UnhashableKey(index.typename()))?;

                let value = match operator.infix_token() {
                    None => value,
                    Some(token) => {
                        let current = pairs.borrow().get(&key).map(|pair| Rc::clone(&pair.value));
                        let current = current
                            .ok_or_else(|| RuntimeError::KeyNotFound(index.to_code_string()))?;
                        self.eval_compound(&token, &current, value)?
                    }
                };

                let mut pairs = pairs.borrow_mut();
                match pairs.get_mut(&key) {
                    // The slot keeps the key it was created with
                    Some(pair) => pair.value = value,
                    None => {
                        pairs.insert(key, HashPair { key: index, value });
                    }
                }
                Ok(())
            }
            other => Err(RuntimeError::IndexNotSupported(other.typename()).into()),
        }
    }

    /// `+= -= *= /=` only work on integers.
    fn eval_compound(&self, operator: &Token, current: &Object, value: Rc<Object>) -> EvalResult {
        match (current, value.as_ref()) {
            (Object::Integer(l), Object::Integer(r)) => {
                self.eval_integer_infix_expression(operator, *l, *r)
            }
            (l, r) => Err(RuntimeError::TypeMismatch {
                operator: operator.clone(),
                left: l.typename(),
                right: r.typename(),
            }
            .into()),
        }
    }

    /// Run `f` with `env` as the current environment, then restore the previous one.
    fn eval_in_env<T>(
        &mut self,
        env: Environment,
        f: impl FnOnce(&mut Self) -> EvalResult<T>,
    ) -> EvalResult<T> {
        // Remember current environment (when exiting)
        let current_env = std::mem::replace(&mut self.env, Rc::new(RefCell::new(env)));

        let result = f(self);

        self.env = current_env;

        result
    }

    pub fn apply_function(&mut self, func: Rc<Object>, args: Vec<Rc<Object>>) -> EvalResult {
        match func.as_ref() {
            Object::Function(func) => {
                // Check that number of args & params matches
                if args.len() != func.parameters.len() {
                    return Err(RuntimeError::BadArity {
                        expected: func.parameters.len(),
                        got: args.len(),
                    }
                    .into());
                }

                if self.call_depth >= MAX_CALL_DEPTH {
                    return Err(RuntimeError::RecursionLimit(MAX_CALL_DEPTH).into());
                }

                // Create a new scoped environment for function
                let mut scoped_env = Environment::new_enclosed(Rc::clone(&func.env));

                // Add arguments as variables in function's environment
                for (name, obj) in func.parameters.iter().zip(args) {
                    scoped_env.define(name, obj);
                }

                debug!(
                    "call fn({}) at depth {}",
                    func.parameters.join(", "),
                    scoped_env.depth()
                );

                // Actually evaluate the function
                self.call_depth += 1;
                let result = self.eval_in_env(scoped_env, |evaluator| {
                    evaluator.eval_block_statement(&func.body)
                });
                self.call_depth -= 1;

                match result {
                    Err(Signal::Return(value)) => Ok(value),
                    Err(Signal::Break) => Err(RuntimeError::BreakOutsideLoop.into()),
                    other => other,
                }
            }
            // Builtins handle themselves
            Object::Builtin(builtin) => builtin.apply(self, args),
            other => Err(RuntimeError::NotAFunction(other.typename()).into()),
        }
    }

    /// Evaluate the module at `path` and merge its bindings into the current environment.
    pub fn include(&mut self, path: &str) -> EvalResult {
        let module = self.load_module(path)?;

        self.env.borrow_mut().merge(&module.borrow());

        Ok(self.nil())
    }

    /// Evaluate the module at `path` in a fresh root environment and return that environment.
    ///
    /// The module shares this evaluator's configuration, output and input.
    /// An error or `exit` inside the module is passed on to the caller.
    pub fn load_module(&mut self, path: &str) -> EvalResult<Rc<RefCell<Environment>>> {
        let resolved = self.config.resolve(path);
        debug!("include {}", resolved.display());

        let include_failed = |reason: String| RuntimeError::IncludeFailed {
            path: resolved.display().to_string(),
            reason,
        };

        let source = fs::read_to_string(&resolved).map_err(|err| include_failed(err.to_string()))?;
        let program = crate::parse(&source).map_err(|errors| {
            include_failed(
                errors
                    .iter()
                    .map(|error| error.to_string())
                    .collect::<Vec<String>>()
                    .join("; "),
            )
        })?;

        let env = Rc::new(RefCell::new(Environment::new_module(path)));
        let mut module = Evaluator {
            env: Rc::clone(&env),
            config: self.config.clone(),
            output: self.output(),
            input: self.input(),
            constants: self.constants.clone(),
            call_depth: self.call_depth,
        };
        module.eval(&program)?;

        Ok(env)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, fs, io::Write, path::PathBuf, rc::Rc};

    use pretty_assertions::assert_eq;

    use crate::{
        builtin::Builtin,
        config::Config,
        environment::MODULE_NAME_KEY,
        error::{EvalResult, RuntimeError, Signal},
        evaluator::{Evaluator, MAX_CALL_DEPTH},
        object::Object,
    };

    use bigl_parser::token::Token;

    /// Collects everything the evaluator prints.
    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn eval_integer_expression() {
        let tests = vec![
            ("5", 5),
            ("10", 10),
            ("-5", -5),
            ("-10", -10),
            ("5 + 5 + 5 + 5 - 10", 10),
            ("2 * 2 * 2 * 2 * 2", 32),
            ("-50 + 100 + -50", 0),
            ("5 * 2 + 10", 20),
            ("5 + 2 * 10", 25),
            ("20 + 2 * -10", 0),
            ("50 / 2 * 2 + 10", 60),
            ("2 * (5 + 10)", 30),
            ("3 * 3 * 3 + 10", 37),
            ("3 * (3 * 3) + 10", 37),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
            ("7 / 2", 3),
            ("-7 / 2", -3),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_integer_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_float_expression() {
        let tests = vec![
            ("5.5", 5.5),
            ("-2.5", -2.5),
            ("1.5 + 1.5", 3.0),
            ("1 + 0.5", 1.5),
            ("0.5 * 4", 2.0),
            ("7 / 2.0", 3.5),
            ("1.0 / 0", f64::INFINITY),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_float_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_boolean_expression() {
        let tests = vec![
            ("true", true),
            ("false", false),
            ("1 < 2", true),
            ("1 > 2", false),
            ("1 == 1", true),
            ("1 != 1", false),
            ("1 == 1.0", true),
            ("1.5 > 1", true),
            ("true == true", true),
            ("true != false", true),
            ("(1 < 2) == true", true),
            ("(1 > 2) == false", true),
            ("\"a\" == \"a\"", true),
            ("\"a\" != \"b\"", true),
            ("[1, 2] == [1, 2]", true),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_boolean_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_booleans_are_shared() {
        let mut evaluator = Evaluator::new();
        let first = run(&mut evaluator, "1 < 2").unwrap();
        let second = run(&mut evaluator, "true").unwrap();

        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn eval_string_expression() {
        test_string_object(evaluate("\"Hello World!\""), "Hello World!");
        test_string_object(evaluate("\"Hello\" + \" \" + \"World!\""), "Hello World!");
    }

    #[test]
    fn eval_bang_operator() {
        let tests = vec![
            ("!true", false),
            ("!false", true),
            ("!5", false),
            ("!0", false),
            ("!!true", true),
            ("!!5", true),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_boolean_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_if_else_expression() {
        let tests = vec![
            ("if (true) { 10 }", Some(10)),
            ("if (false) { 10 }", None),
            ("if (1) { 10 }", Some(10)),
            ("if (0) { 10 } else { 20 }", Some(10)),
            ("if (1 < 2) { 10 }", Some(10)),
            ("if (1 > 2) { 10 }", None),
            ("if (1 > 2) { 10 } else { 20 }", Some(20)),
            ("if (1 < 2) { 10 } else { 20 }", Some(10)),
            ("let x = if (true) { 1 }; if (x) { 5 }", Some(5)),
        ];

        for (input, expected) in tests {
            let evaluated = evaluate(input);
            match expected {
                Some(value) => test_integer_object(evaluated, value),
                None => test_null_object(evaluated),
            }
        }

        test_string_object(evaluate("if (0) { \"t\" } else { \"f\" }"), "t");
    }

    #[test]
    fn eval_return_statements() {
        let tests = vec![
            ("return 10;", 10),
            ("return 10; 9;", 10),
            ("return 2 * 5; 9;", 10),
            ("9; return 2 * 5; 9;", 10),
            (
                "
                if (10 > 1) {
                  if (10 > 1) {
                    return 10;
                  }
                  return 1;
                }
                ",
                10,
            ),
            ("let f = fn(x) { return x; x + 10; }; f(10);", 10),
            (
                "let f = fn(x) { let result = x + 10; return result; return 10; }; f(10);",
                20,
            ),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_integer_object(evaluated, expected_value);
        }

        test_null_object(evaluate("let f = fn() { return; 5 }; f()"));
    }

    #[test]
    fn eval_let_statements() {
        let tests = vec![
            ("let a = 5; a;", 5),
            ("let a = 5 * 5; a;", 25),
            ("let a = 5; let b = a; b;", 5),
            ("let a = 5; let b = a; let c = a + b + 5; c;", 15),
            ("let a = 5; let a = a + 1; a", 6),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_integer_object(evaluated, expected_value);
        }

        test_null_object(evaluate("let a = 5;"));
    }

    #[test]
    fn eval_assignment_statements() {
        let tests = vec![
            ("let a = 1; a = 2; a", 2),
            ("let a = 1; a += 2; a", 3),
            ("let a = 5; a -= 7; a", -2),
            ("let a = 3; a *= 4; a", 12),
            ("let a = 7; a /= 2; a", 3),
            // Assignment reaches the frame holding the binding
            ("let a = 1; let f = fn() { a = 10; }; f(); a", 10),
            ("let xs = [1, 2, 3]; xs[1] = 20; xs[1]", 20),
            ("let xs = [1, 2, 3]; xs[2] += 5; xs[2]", 8),
            ("let h = {\"a\": 1}; h[\"a\"] *= 3; h[\"a\"]", 3),
            ("let h = {}; h[\"new\"] = 7; h[\"new\"]", 7),
            ("let h = {}; h[1.0] = 2; h[1]", 2),
            // A plain assignment to an unbound name creates it
            ("b = 4; b", 4),
            ("let f = fn() { fresh = 1; fresh + 1 }; f()", 2),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_integer_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_assignment_to_new_name_binds_locally() {
        test_error_object(
            evaluate_result("let f = fn() { fresh = 1; }; f(); fresh"),
            RuntimeError::IdentifierNotFound("fresh".to_owned()),
        );
        // An existing outer binding is updated in place instead
        test_integer_object(evaluate("let a = 0; let f = fn() { a = 5; }; f(); a"), 5);
    }

    #[test]
    fn eval_hash_slot_keeps_its_key() {
        let tests = vec![
            ("let h = {}; h[2] = 1; h[2.0] += 4; h", "{2: 5}"),
            ("let h = {}; h[2] = 1; h[2.0] = 9; h", "{2: 9}"),
            ("let h = {2.0: 1}; h[2] = 3; h", "{2.0: 3}"),
        ];

        for (input, expected) in tests {
            assert_eq!(evaluate(input).to_code_string(), expected, "input: {}", input);
        }
    }

    #[test]
    fn eval_self_containing_collections() {
        let tests = vec![
            ("let a = [1]; a[0] = a; a", "[[...]]"),
            ("let a = [1, 2]; a[1] = a; [a]", "[[1, [...]]]"),
            ("let h = {}; h[\"me\"] = h; h", "{\"me\": {...}}"),
            ("let a = [1]; let h = {\"a\": a}; a[0] = h; h", "{\"a\": [{...}]}"),
        ];

        for (input, expected) in tests {
            assert_eq!(evaluate(input).to_code_string(), expected, "input: {}", input);
        }

        test_boolean_object(evaluate("let a = [1]; a[0] = a; a == a"), true);

        let (output, result) = evaluate_with_output("let a = [1]; a[0] = a; println(a);");
        assert!(result.is_ok());
        assert_eq!(output, "[[...]]\n");
    }

    #[test]
    fn eval_arrays_are_shared() {
        let input = "
        let xs = [1, 2, 3];
        let ys = xs;
        let set = fn(arr) { arr[0] = 100; };
        set(ys);
        xs[0]";

        test_integer_object(evaluate(input), 100);
    }

    #[test]
    fn eval_array_literals() {
        let evaluated = evaluate("[1, 2 * 2, 3 + 3]");

        match evaluated.as_ref() {
            Object::Array(elements) => {
                let elements = elements.borrow();
                assert_eq!(elements.len(), 3);
                test_integer_object(Rc::clone(&elements[0]), 1);
                test_integer_object(Rc::clone(&elements[1]), 4);
                test_integer_object(Rc::clone(&elements[2]), 6);
            }
            _ => panic!("expected array object but got {:?}", evaluated),
        }
    }

    #[test]
    fn eval_array_index_expression() {
        let tests = vec![
            ("[1, 2, 3][0]", Some(1)),
            ("[1, 2, 3][1]", Some(2)),
            ("[1, 2, 3][2]", Some(3)),
            ("let i = 0; [1][i];", Some(1)),
            ("[1, 2, 3][1 + 1];", Some(3)),
            ("let myArray = [1, 2, 3]; myArray[2];", Some(3)),
            (
                "let myArray = [1, 2, 3]; myArray[0] + myArray[1] + myArray[2];",
                Some(6),
            ),
            ("[1, 2, 3][3]", None),
            ("[1, 2, 3][-1]", None),
        ];

        for (input, expected) in tests {
            let evaluated = evaluate(input);
            match expected {
                Some(value) => test_integer_object(evaluated, value),
                None => test_null_object(evaluated),
            }
        }
    }

    #[test]
    fn eval_hash_literals() {
        let input = "
        let two = \"two\";
        let h = {
            \"one\": 10 - 9,
            two: 1 + 1,
            \"thr\" + \"ee\": 6 / 2,
            4: 4,
            true: 5,
            false: 6
        };
        [h[\"one\"], h[\"two\"], h[\"three\"], h[4], h[true], h[false], h[4.0]]";

        assert_eq!(evaluate(input).to_string(), "[1, 2, 3, 4, 5, 6, 4]");
    }

    #[test]
    fn eval_hash_index_expression() {
        let tests = vec![
            ("{\"foo\": 5}[\"foo\"]", Some(5)),
            ("{\"foo\": 5}[\"bar\"]", None),
            ("let key = \"foo\"; {\"foo\": 5}[key]", Some(5)),
            ("{}[\"foo\"]", None),
            ("{5: 5}[5]", Some(5)),
            ("{true: 5}[true]", Some(5)),
            ("{false: 5}[false]", Some(5)),
        ];

        for (input, expected) in tests {
            let evaluated = evaluate(input);
            match expected {
                Some(value) => test_integer_object(evaluated, value),
                None => test_null_object(evaluated),
            }
        }
    }

    #[test]
    fn eval_function_expression() {
        let evaluated = evaluate("fn(x) { x + 2; }");

        match evaluated.as_ref() {
            Object::Function(func) => {
                assert_eq!(func.parameters, vec!["x".to_owned()]);
                assert_eq!(func.body.to_string(), "{ (x + 2) }");
            }
            _ => panic!("expected function object but got {:?}", evaluated),
        }
    }

    #[test]
    fn eval_call_expression() {
        let tests = vec![
            ("let identity = fn(x) { x; }; identity(5);", 5),
            ("let identity = fn(x) { return x; }; identity(5);", 5),
            ("let double = fn(x) { x * 2; }; double(5);", 10),
            ("let add = fn(x, y) { x + y; }; add(5, 5);", 10),
            ("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));", 20),
            ("fn(x) { x; }(5)", 5),
            (
                "let fib = fn(n) { if (n < 2) { return n; } fib(n - 1) + fib(n - 2) }; fib(15)",
                610,
            ),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_integer_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_closures() {
        let tests = vec![
            (
                "let newAdder = fn(x) { fn(y) { x + y } }; let addTwo = newAdder(2); addTwo(3);",
                5,
            ),
            (
                "
                let counter = fn() { let count = 0; fn() { count += 1; count } };
                let next = counter();
                next();
                next()",
                2,
            ),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_integer_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_blocks_do_not_scope() {
        test_integer_object(evaluate("if (true) { let inner = 3; } inner"), 3);
    }

    #[test]
    fn eval_for_loops() {
        let tests = vec![
            ("let total = 0; for (x in [1, 2, 3]) { total += x; } total", 6),
            ("let total = 0; for (i in range(0, 5)) { total += i; } total", 10),
            ("let total = 0; for (i in range(3, 1)) { total += 1; } total", 0),
            (
                "let total = 0; for (i in range(0, 10)) { if (i == 3) { break; } total += 1; } total",
                3,
            ),
            // The loop sees the array as it was when it started
            (
                "let xs = [1, 2]; let n = 0; for (x in xs) { xs = push(xs, x); n += 1; } n",
                2,
            ),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_integer_object(evaluated, expected_value);
        }

        test_null_object(evaluate("for (i in range(0, 2)) { i }"));
    }

    #[test]
    fn eval_loop_variable_lives_in_loop_frame() {
        test_error_object(
            evaluate_result("for (i in range(0, 3)) { } i"),
            RuntimeError::IdentifierNotFound("i".to_owned()),
        );

        // One frame per loop: every closure sees the last value
        let input = "
        let fs = [];
        for (i in range(0, 3)) { fs = push(fs, fn() { i }); }
        [fs[0](), fs[1](), fs[2]()]";
        assert_eq!(evaluate(input).to_string(), "[2, 2, 2]");
    }

    #[test]
    fn eval_loop_body_signals_leave_the_loop() {
        let input = "
        let f = fn() {
            for (i in range(0, 5)) { if (i == 2) { return i; } }
            99
        };
        f()";
        test_integer_object(evaluate(input), 2);

        let input = "
        let f = fn() {
            let i = 0;
            while (true) { i += 1; if (i == 4) { return i * 10; } }
        };
        f()";
        test_integer_object(evaluate(input), 40);

        // An error stops the loop before later iterations run
        let (output, result) = evaluate_with_output(
            "for (i in range(0, 5)) { println(i); if (i == 1) { i + true; } }",
        );
        assert_eq!(output, "0\n1\n");
        test_error_object(
            result,
            RuntimeError::TypeMismatch {
                operator: Token::Plus,
                left: "integer",
                right: "boolean",
            },
        );
    }

    #[test]
    fn eval_deep_recursion() {
        let input = "
        let sum = fn(n) { if (n == 0) { return 0; } n + sum(n - 1) };
        sum(5000)";
        test_integer_object(evaluate(input), 12_502_500);
    }

    #[test]
    fn eval_call_depth_is_limited() {
        test_error_object(
            evaluate_result("let f = fn(n) { f(n + 1) }; f(0)"),
            RuntimeError::RecursionLimit(MAX_CALL_DEPTH),
        );

        // The depth unwinds, so the same evaluator can keep calling
        let mut evaluator = Evaluator::new();
        let result = run(&mut evaluator, "let f = fn(n) { f(n + 1) }; f(0)");
        assert!(matches!(result, Err(Signal::Error(RuntimeError::RecursionLimit(_)))));
        test_integer_object(run(&mut evaluator, "let g = fn(x) { x * 2 }; g(21)").unwrap(), 42);
    }

    #[test]
    fn eval_for_prints_in_order() {
        let (output, result) = evaluate_with_output("for (i in range(0,3)) { println(i); }");

        assert!(result.is_ok());
        assert_eq!(output, "0\n1\n2\n");
    }

    #[test]
    fn eval_while_loops() {
        let tests = vec![
            ("let i = 0; while (i < 5) { i += 1; } i", 5),
            (
                "let i = 0; while (true) { i += 1; if (i == 7) { break; } } i",
                7,
            ),
            ("let i = 10; while (i < 5) { i += 1; } i", 10),
            // break leaves the innermost loop only
            (
                "let n = 0; for (i in range(0, 3)) { while (true) { break; } n += 1; } n",
                3,
            ),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_integer_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_builtin_functions() {
        let tests: Vec<(&str, &str)> = vec![
            ("len(\"\")", "0"),
            ("len(\"hello\")", "5"),
            ("len(\"héllo\")", "5"),
            ("len([1, 2, 3])", "3"),
            ("len({\"a\": 1})", "1"),
            ("first([1, 2, 3])", "1"),
            ("first([])", "null"),
            ("last([1, 2, 3])", "3"),
            ("last([])", "null"),
            ("rest([1, 2, 3])", "[2, 3]"),
            ("rest([])", "null"),
            ("push([1], 2)", "[1, 2]"),
            ("toInt(\" 42 \")", "42"),
            ("toInt(3.9)", "3"),
            ("toInt(true)", "1"),
            ("toFloat(2)", "2.0"),
            ("toFloat(\"1.25\")", "1.25"),
            ("toStr(12) + \"!\"", "12!"),
            ("toStr(1.5)", "1.5"),
            ("isDigit(\"123\")", "true"),
            ("isDigit(\"12a\")", "false"),
            ("isDigit(5)", "true"),
            ("type(1)", "integer"),
            ("type(\"s\")", "string"),
            ("type(range(0, 1))", "range"),
            ("type(len)", "builtin"),
            ("range(1, 4)", "range(1, 4)"),
        ];

        for (input, expected) in tests {
            let evaluated = evaluate(input);
            assert_eq!(evaluated.to_string(), expected, "for input '{}'", input);
        }
    }

    #[test]
    fn eval_push_copies() {
        let input = "let a = [1]; let b = push(a, 2); [len(a), len(b)]";

        assert_eq!(evaluate(input).to_string(), "[1, 2]");
    }

    #[test]
    fn eval_print_builtins() {
        let (output, result) =
            evaluate_with_output("print(\"a\"); print(1); println(\"b\"); println([1, \"c\"])");

        test_null_object(result.unwrap());
        assert_eq!(output, "a1b\n[1, \"c\"]\n");
    }

    #[test]
    fn eval_read_builtin() {
        let output = SharedBuffer::default();
        let input = std::io::Cursor::new(b"first line\r\nsecond\n".to_vec());
        let mut evaluator = Evaluator::new()
            .with_output(Rc::new(RefCell::new(output.clone())))
            .with_input(Rc::new(RefCell::new(input)));

        let result = run(&mut evaluator, "[read(\"> \"), read(), read()]").unwrap();

        assert_eq!(result.to_string(), "[\"first line\", \"second\", \"\"]");
        assert_eq!(output.contents(), "> ");
    }

    #[test]
    fn eval_exit_signal() {
        let tests = vec![
            ("exit()", 0),
            ("exit(3); 5", 3),
            ("let f = fn() { exit(4); }; f(); 1", 4),
            ("for (i in range(0, 10)) { if (i == 2) { exit(i); } }", 2),
        ];

        for (input, expected_code) in tests {
            assert_eq!(
                evaluate_result(input),
                Err(Signal::Exit(expected_code)),
                "for input '{}'",
                input
            );
        }
    }

    #[test]
    fn eval_include() {
        let dir = temp_dir("include");
        fs::write(
            dir.join("lib.bigl"),
            "let square = fn(x) { x * x }; let answer = 42;",
        )
        .unwrap();
        fs::write(dir.join("extra.bigl"), "let extra = 7;").unwrap();
        fs::write(dir.join("broken.bigl"), "let = ;").unwrap();
        fs::write(dir.join("failing.bigl"), "let y = 1 + true;").unwrap();
        fs::write(dir.join("quits.bigl"), "println(\"bye\"); exit(9);").unwrap();

        let output = SharedBuffer::default();
        let mut evaluator = Evaluator::new_with_env(Rc::new(RefCell::new(
            crate::environment::Environment::new_module("_main"),
        )))
        .with_config(Config {
            module_path: Some(dir.clone()),
        })
        .with_output(Rc::new(RefCell::new(output.clone())));

        let result = run(&mut evaluator, "include(\"lib.bigl\"); square(answer)");
        test_integer_object(result.unwrap(), 1764);

        // The including module keeps its own name
        let name = run(&mut evaluator, MODULE_NAME_KEY).unwrap();
        assert_eq!(name.to_string(), "_main");

        // Included into the current scope, not the root
        let result = run(
            &mut evaluator,
            "let load = fn() { include(\"extra.bigl\"); extra }; load()",
        );
        test_integer_object(result.unwrap(), 7);
        assert_eq!(
            run(&mut evaluator, "extra"),
            Err(Signal::Error(RuntimeError::IdentifierNotFound(
                "extra".to_owned()
            )))
        );

        assert!(matches!(
            run(&mut evaluator, "include(\"broken.bigl\")"),
            Err(Signal::Error(RuntimeError::IncludeFailed { .. }))
        ));
        assert_eq!(
            run(&mut evaluator, "include(\"failing.bigl\")"),
            Err(Signal::Error(RuntimeError::TypeMismatch {
                operator: Token::Plus,
                left: "integer",
                right: "boolean",
            }))
        );
        assert!(matches!(
            run(&mut evaluator, "include(\"missing.bigl\")"),
            Err(Signal::Error(RuntimeError::IncludeFailed { .. }))
        ));
        assert_eq!(
            run(&mut evaluator, "include(\"quits.bigl\")"),
            Err(Signal::Exit(9))
        );
        assert_eq!(output.contents(), "bye\n");

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn error_handling() {
        let tests = vec![
            (
                "5 + true;",
                RuntimeError::TypeMismatch {
                    operator: Token::Plus,
                    left: "integer",
                    right: "boolean",
                },
            ),
            (
                "5 + true; 5;",
                RuntimeError::TypeMismatch {
                    operator: Token::Plus,
                    left: "integer",
                    right: "boolean",
                },
            ),
            (
                "-true",
                RuntimeError::UnknownPrefixOperator {
                    operator: Token::Minus,
                    right: "boolean",
                },
            ),
            (
                "true + false;",
                RuntimeError::UnknownInfixOperator {
                    operator: Token::Plus,
                    left: "boolean",
                    right: "boolean",
                },
            ),
            (
                "\"hello\" - \"world\";",
                RuntimeError::UnknownInfixOperator {
                    operator: Token::Minus,
                    left: "string",
                    right: "string",
                },
            ),
            (
                "5; true + false; 5",
                RuntimeError::UnknownInfixOperator {
                    operator: Token::Plus,
                    left: "boolean",
                    right: "boolean",
                },
            ),
            (
                "
                if (10 > 1) {
                  if (10 > 1) {
                    return true + false;
                  }
                  return 1;
                }
                ",
                RuntimeError::UnknownInfixOperator {
                    operator: Token::Plus,
                    left: "boolean",
                    right: "boolean",
                },
            ),
            ("foobar", RuntimeError::IdentifierNotFound("foobar".into())),
            ("x += 1", RuntimeError::IdentifierNotFound("x".into())),
            ("len = 1", RuntimeError::BuiltinShadowed("len".into())),
            ("10 / 0", RuntimeError::DivisionByZero),
            ("let x = 10; x /= 0", RuntimeError::DivisionByZero),
            ("while (1) { }", RuntimeError::ExpectedBooleanCondition("integer")),
            ("for (x in 5) { }", RuntimeError::NotIterable("integer")),
            ("5(1)", RuntimeError::NotAFunction("integer")),
            (
                "fn(x) { x }(1, 2)",
                RuntimeError::BadArity {
                    expected: 1,
                    got: 2,
                },
            ),
            (
                "len(1)",
                RuntimeError::InvalidArgumentType {
                    builtin: "len",
                    typename: "integer",
                },
            ),
            (
                "len(\"a\", \"b\")",
                RuntimeError::BadArity {
                    expected: 1,
                    got: 2,
                },
            ),
            ("toInt(\"abc\")", RuntimeError::InvalidNumber("abc".into())),
            ("1[0]", RuntimeError::IndexNotSupported("integer")),
            ("[1][true]", RuntimeError::InvalidIndexType("boolean")),
            ("{}[[1]]", RuntimeError::UnhashableKey("array")),
            ("{[1]: 2}", RuntimeError::UnhashableKey("array")),
            (
                "let xs = [1]; xs[1] = 2",
                RuntimeError::IndexOutOfBounds {
                    index: 1,
                    length: 1,
                },
            ),
            (
                "let xs = [1]; xs[-1] = 2",
                RuntimeError::IndexOutOfBounds {
                    index: -1,
                    length: 1,
                },
            ),
            (
                "let h = {}; h[\"a\"] += 1",
                RuntimeError::KeyNotFound("\"a\"".into()),
            ),
            (
                "let s = \"a\"; s += \"b\"",
                RuntimeError::TypeMismatch {
                    operator: Token::Plus,
                    left: "string",
                    right: "string",
                },
            ),
            ("let len = 1;", RuntimeError::BuiltinShadowed("len".into())),
            ("break;", RuntimeError::BreakOutsideLoop),
            ("let f = fn() { break; }; for (i in [1]) { f() }", RuntimeError::BreakOutsideLoop),
        ];

        for (input, expected_error) in tests {
            test_error_object(evaluate_result(input), expected_error)
        }
    }

    #[test]
    fn error_messages() {
        let tests = vec![
            ("1 + \"a\"", "type mismatch: integer + string"),
            ("-\"a\"", "unknown operator: -string"),
            ("true * true", "unknown operator: boolean * boolean"),
            ("missing", "identifier not found: missing"),
            (
                "fn(a, b) { a }(1)",
                "wrong number of arguments: want=2, got=1",
            ),
            ("let print = 2", "print is a builtin function"),
        ];

        for (input, expected) in tests {
            match evaluate_result(input) {
                Err(Signal::Error(err)) => assert_eq!(err.to_string(), expected),
                other => panic!("expected error for '{}' but got {:?}", input, other),
            }
        }
    }

    #[test]
    fn builtins_resolve_after_environment() {
        assert_eq!(
            evaluate("len").as_ref(),
            &Object::Builtin(Builtin::Len)
        );
        // A parameter may use a builtin's name
        test_integer_object(evaluate("let f = fn(len) { len + 1 }; f(1)"), 2);
    }

    fn run(evaluator: &mut Evaluator, input: &str) -> EvalResult {
        match crate::parse(input) {
            Ok(prog) => evaluator.eval(&prog),
            Err(errors) => {
                println!("parser had {} errors", errors.len());
                for error in errors {
                    println!("parser error: {}", error);
                }
                panic!("parser errors for '{}'", input)
            }
        }
    }

    fn evaluate_result(input: &str) -> EvalResult {
        run(&mut Evaluator::new(), input)
    }

    fn evaluate(input: &str) -> Rc<Object> {
        match evaluate_result(input) {
            Ok(obj) => obj,
            Err(signal) => panic!("evaluating '{}' failed with {:?}", input, signal),
        }
    }

    fn evaluate_with_output(input: &str) -> (String, EvalResult) {
        let output = SharedBuffer::default();
        let mut evaluator =
            Evaluator::new().with_output(Rc::new(RefCell::new(output.clone())));
        let result = run(&mut evaluator, input);

        (output.contents(), result)
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bigl-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn test_integer_object(obj: Rc<Object>, expected_value: i64) {
        match *obj {
            Object::Integer(value) => {
                if value != expected_value {
                    panic!(
                        "expected integer object with value {} but got {:?}",
                        expected_value, obj
                    )
                }
            }
            _ => panic!("expected integer object but got {:?}", obj),
        }
    }

    fn test_float_object(obj: Rc<Object>, expected_value: f64) {
        match *obj {
            Object::Float(value) => {
                if value != expected_value {
                    panic!(
                        "expected float object with value {} but got {:?}",
                        expected_value, obj
                    )
                }
            }
            _ => panic!("expected float object but got {:?}", obj),
        }
    }

    fn test_boolean_object(obj: Rc<Object>, expected_value: bool) {
        match *obj {
            Object::Boolean(value) => {
                if value != expected_value {
                    panic!(
                        "expected boolean object with value {} but got {:?}",
                        expected_value, obj
                    )
                }
            }
            _ => panic!("expected boolean object but got {:?}", obj),
        }
    }

    fn test_string_object(obj: Rc<Object>, expected_value: &str) {
        match obj.as_ref() {
            Object::String(value) => {
                if value != expected_value {
                    panic!(
                        "expected string object with value {} but got {:?}",
                        expected_value, obj
                    )
                }
            }
            _ => panic!("expected string object but got {:?}", obj),
        }
    }

    fn test_null_object(obj: Rc<Object>) {
        match *obj {
            Object::Nil => {}
            _ => panic!("expected null object but got {:?}", obj),
        }
    }

    fn test_error_object(result: EvalResult, expected_error: RuntimeError) {
        match result {
            Err(Signal::Error(err)) => {
                if err != expected_error {
                    panic!(
                        "expected error to be \"{:?}\" but got \"{:?}\"",
                        expected_error, err
                    )
                }
            }
            other => panic!("expected error but got {:?}", other),
        }
    }
}
