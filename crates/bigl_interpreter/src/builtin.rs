use std::{fmt::Display, io::Write, rc::Rc};

use crate::{
    error::{EvalResult, RuntimeError, Signal},
    evaluator::Evaluator,
    object::{Object, Range},
};

/// Functions provided by the interpreter itself. They are found by name
/// whenever an identifier is not bound in the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Len,
    Print,
    Println,
    Read,
    ToInt,
    ToFloat,
    ToStr,
    IsDigit,
    Type,
    First,
    Last,
    Rest,
    Push,
    Range,
    Exit,
    Include,
}

const BUILTINS: [Builtin; 16] = [
    Builtin::Len,
    Builtin::Print,
    Builtin::Println,
    Builtin::Read,
    Builtin::ToInt,
    Builtin::ToFloat,
    Builtin::ToStr,
    Builtin::IsDigit,
    Builtin::Type,
    Builtin::First,
    Builtin::Last,
    Builtin::Rest,
    Builtin::Push,
    Builtin::Range,
    Builtin::Exit,
    Builtin::Include,
];

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        BUILTINS.iter().copied().find(|builtin| builtin.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::Print => "print",
            Builtin::Println => "println",
            Builtin::Read => "read",
            Builtin::ToInt => "toInt",
            Builtin::ToFloat => "toFloat",
            Builtin::ToStr => "toStr",
            Builtin::IsDigit => "isDigit",
            Builtin::Type => "type",
            Builtin::First => "first",
            Builtin::Last => "last",
            Builtin::Rest => "rest",
            Builtin::Push => "push",
            Builtin::Range => "range",
            Builtin::Exit => "exit",
            Builtin::Include => "include",
        }
    }

    pub fn apply(&self, evaluator: &mut Evaluator, args: Vec<Rc<Object>>) -> EvalResult {
        match self {
            Builtin::Len => {
                let arg = self.single_arg(&args)?;
                let length = match arg.as_ref() {
                    Object::String(value) => value.chars().count(),
                    Object::Array(elements) => elements.borrow().len(),
                    Object::Hash(pairs) => pairs.borrow().len(),
                    other => return Err(self.invalid_argument(other)),
                };
                Ok(Rc::new(Object::Integer(length as i64)))
            }
            Builtin::Print | Builtin::Println => {
                let arg = self.single_arg(&args)?;
                let output = evaluator.output();
                let mut output = output.borrow_mut();

                if *self == Builtin::Println {
                    writeln!(output, "{}", arg).map_err(RuntimeError::from)?;
                } else {
                    write!(output, "{}", arg).map_err(RuntimeError::from)?;
                    output.flush().map_err(RuntimeError::from)?;
                }
                Ok(evaluator.nil())
            }
            Builtin::Read => {
                self.check_arity_between(&args, 0, 1)?;
                if let Some(prompt) = args.first() {
                    let output = evaluator.output();
                    let mut output = output.borrow_mut();
                    write!(output, "{}", prompt).map_err(RuntimeError::from)?;
                    output.flush().map_err(RuntimeError::from)?;
                }

                let mut line = String::new();
                evaluator
                    .input()
                    .borrow_mut()
                    .read_line(&mut line)
                    .map_err(RuntimeError::from)?;

                let trimmed = line.trim_end_matches(&['\r', '\n'][..]).len();
                line.truncate(trimmed);
                Ok(Rc::new(Object::String(line)))
            }
            Builtin::ToInt => {
                let arg = self.single_arg(&args)?;
                let value = match arg.as_ref() {
                    Object::Integer(value) => *value,
                    Object::Float(value) => *value as i64,
                    Object::Boolean(value) => i64::from(*value),
                    Object::String(value) => value
                        .trim()
                        .parse::<i64>()
                        .map_err(|_| RuntimeError::InvalidNumber(value.clone()))?,
                    other => return Err(self.invalid_argument(other)),
                };
                Ok(Rc::new(Object::Integer(value)))
            }
            Builtin::ToFloat => {
                let arg = self.single_arg(&args)?;
                let value = match arg.as_ref() {
                    Object::Integer(value) => *value as f64,
                    Object::Float(value) => *value,
                    Object::String(value) => value
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| RuntimeError::InvalidNumber(value.clone()))?,
                    other => return Err(self.invalid_argument(other)),
                };
                Ok(Rc::new(Object::Float(value)))
            }
            Builtin::ToStr => {
                let arg = self.single_arg(&args)?;
                match arg.as_ref() {
                    Object::String(_) => Ok(Rc::clone(arg)),
                    Object::Integer(_) | Object::Float(_) | Object::Boolean(_) | Object::Nil => {
                        Ok(Rc::new(Object::String(arg.to_string())))
                    }
                    other => Err(self.invalid_argument(other)),
                }
            }
            Builtin::IsDigit => {
                let arg = self.single_arg(&args)?;
                let is_digit = match arg.as_ref() {
                    Object::Integer(_) => true,
                    Object::String(value) => value.parse::<i64>().is_ok(),
                    _ => false,
                };
                Ok(evaluator.boolean(is_digit))
            }
            Builtin::Type => {
                let arg = self.single_arg(&args)?;
                Ok(Rc::new(Object::String(arg.typename().to_owned())))
            }
            Builtin::First | Builtin::Last => {
                let arg = self.single_arg(&args)?;
                match arg.as_ref() {
                    Object::Array(elements) => {
                        let elements = elements.borrow();
                        let element = if *self == Builtin::First {
                            elements.first()
                        } else {
                            elements.last()
                        };
                        Ok(element.cloned().unwrap_or_else(|| evaluator.nil()))
                    }
                    other => Err(self.invalid_argument(other)),
                }
            }
            Builtin::Rest => {
                let arg = self.single_arg(&args)?;
                match arg.as_ref() {
                    Object::Array(elements) => {
                        let elements = elements.borrow();
                        if elements.is_empty() {
                            Ok(evaluator.nil())
                        } else {
                            Ok(Rc::new(Object::new_array(elements[1..].to_vec())))
                        }
                    }
                    other => Err(self.invalid_argument(other)),
                }
            }
            Builtin::Push => {
                self.check_arity(&args, 2)?;
                match args[0].as_ref() {
                    Object::Array(elements) => {
                        let mut copy = elements.borrow().clone();
                        copy.push(Rc::clone(&args[1]));
                        Ok(Rc::new(Object::new_array(copy)))
                    }
                    other => Err(self.invalid_argument(other)),
                }
            }
            Builtin::Range => {
                self.check_arity(&args, 2)?;
                match (args[0].as_ref(), args[1].as_ref()) {
                    (Object::Integer(start), Object::Integer(end)) => {
                        Ok(Rc::new(Object::Range(Range {
                            start: *start,
                            end: *end,
                        })))
                    }
                    (Object::Integer(_), other) | (other, _) => Err(self.invalid_argument(other)),
                }
            }
            Builtin::Exit => {
                self.check_arity_between(&args, 0, 1)?;
                match args.first().map(|arg| arg.as_ref()) {
                    None => Err(Signal::Exit(0)),
                    Some(Object::Integer(code)) => Err(Signal::Exit(*code)),
                    Some(other) => Err(self.invalid_argument(other)),
                }
            }
            Builtin::Include => {
                let arg = self.single_arg(&args)?;
                match arg.as_ref() {
                    Object::String(path) => evaluator.include(path),
                    other => Err(self.invalid_argument(other)),
                }
            }
        }
    }

    fn check_arity(&self, args: &[Rc<Object>], expected: usize) -> Result<(), RuntimeError> {
        self.check_arity_between(args, expected, expected)
    }

    fn check_arity_between(
        &self,
        args: &[Rc<Object>],
        min: usize,
        max: usize,
    ) -> Result<(), RuntimeError> {
        let got = args.len();
        if got < min {
            Err(RuntimeError::BadArity { expected: min, got })
        } else if got > max {
            Err(RuntimeError::BadArity { expected: max, got })
        } else {
            Ok(())
        }
    }

    fn single_arg<'a>(&self, args: &'a [Rc<Object>]) -> Result<&'a Rc<Object>, RuntimeError> {
        self.check_arity(args, 1)?;
        Ok(&args[0])
    }

    fn invalid_argument(&self, arg: &Object) -> Signal {
        RuntimeError::InvalidArgumentType {
            builtin: self.name(),
            typename: arg.typename(),
        }
        .into()
    }
}

impl Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "builtin function {}", self.name())
    }
}
