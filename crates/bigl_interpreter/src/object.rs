use std::{cell::RefCell, collections::HashMap, fmt::Display, rc::Rc};

use crate::{builtin::Builtin, environment::Environment};

use bigl_parser::ast::BlockStatement;

#[derive(Debug, PartialEq)]
pub enum Object {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Nil,
    /// Arrays are shared: every holder of the `Rc` sees writes made through any other.
    Array(RefCell<Vec<Rc<Object>>>),
    Hash(RefCell<HashMap<HashKey, HashPair>>),
    Function(Function),
    Builtin(Builtin),
    Range(Range),
}

impl Object {
    pub fn typename(&self) -> &'static str {
        use Object::*;

        match self {
            Integer(_) => "integer",
            Float(_) => "float",
            Boolean(_) => "boolean",
            String(_) => "string",
            Nil => "null",
            Array(_) => "array",
            Hash(_) => "hash",
            Function(_) => "function",
            Builtin(_) => "builtin",
            Range(_) => "range",
        }
    }

    pub fn new_array(elements: Vec<Rc<Object>>) -> Object {
        Object::Array(RefCell::new(elements))
    }

    /// Everything is true except `false` and `null`.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Nil)
    }

    /// The key this value is stored under in a hash, if it can be one.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Object::Integer(value) => Some(HashKey::Integer(*value)),
            Object::Float(value) => Some(HashKey::from_float(*value)),
            Object::Boolean(value) => Some(HashKey::Boolean(*value)),
            Object::String(value) => Some(HashKey::String(value.clone())),
            _ => None,
        }
    }

    /// Converts the given value to a string (in the format of a code object).
    ///
    /// Use this anywhere a programmer expects to see the code-version of an object (e.g. in the REPL).
    /// # Examples
    /// ```rust
    /// use bigl_interpreter::object::Object;
    ///
    /// let obj = Object::String("hello world".to_string());
    ///
    /// assert_eq!(obj.to_code_string(), "\"hello world\"");
    /// ```
    pub fn to_code_string(&self) -> String {
        use Object::*;

        match self {
            String(value) => format!("\"{}\"", value),
            value => value.to_string(),
        }
    }

    /// Write the display form, quoting strings when `quoted` is set.
    ///
    /// `open` holds the collections currently being written. A collection
    /// reached again through itself is written as `[...]` or `{...}`.
    fn write_to(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        open: &mut Vec<*const Object>,
        quoted: bool,
    ) -> std::fmt::Result {
        use Object::*;

        let ptr = self as *const Object;
        match self {
            Integer(value) => write!(f, "{}", value),
            Float(value) => write!(f, "{}", ryu::Buffer::new().format(*value)),
            Boolean(value) => write!(f, "{}", value),
            String(value) if quoted => write!(f, "\"{}\"", value),
            String(value) => write!(f, "{}", value),
            Nil => write!(f, "null"),
            Array(_) if open.contains(&ptr) => write!(f, "[...]"),
            Array(elements) => {
                open.push(ptr);
                write!(f, "[")?;
                for (i, element) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    element.write_to(f, open, true)?;
                }
                open.pop();
                write!(f, "]")
            }
            Hash(_) if open.contains(&ptr) => write!(f, "{{...}}"),
            Hash(pairs) => {
                let pairs = pairs.borrow();
                let mut keys: Vec<&HashKey> = pairs.keys().collect();
                keys.sort();

                open.push(ptr);
                write!(f, "{{")?;
                for (i, pair) in keys.into_iter().filter_map(|key| pairs.get(key)).enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    pair.key.write_to(f, open, true)?;
                    write!(f, ": ")?;
                    pair.value.write_to(f, open, true)?;
                }
                open.pop();
                write!(f, "}}")
            }
            Function(func) => write!(f, "{}", func),
            Builtin(builtin) => write!(f, "{}", builtin),
            Range(range) => write!(f, "{}", range),
        }
    }
}

impl Display for Object {
    /// toString() form at runtime
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_to(f, &mut Vec::new(), false)
    }
}

/// Hashable projection of a value. Values that compare equal with `==` map
/// to the same key, so integral floats share the key of the matching integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashKey {
    Boolean(bool),
    Integer(i64),
    /// Bit pattern of a non-integral float
    Float(u64),
    String(String),
}

impl HashKey {
    fn from_float(value: f64) -> HashKey {
        // -0.0 lands here too and becomes Integer(0)
        if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
            HashKey::Integer(value as i64)
        } else {
            HashKey::Float(value.to_bits())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    /// The original key, kept for display
    pub key: Rc<Object>,
    pub value: Rc<Object>,
}

pub struct Function {
    pub parameters: Vec<String>,
    pub body: Rc<BlockStatement>,
    pub env: Rc<RefCell<Environment>>,
}

impl std::fmt::Debug for Function {
    // The captured environment may contain this very function
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish()
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fn({}) {}", self.parameters.join(", "), self.body)
    }
}

impl PartialEq for Function {
    /// Functions are only equal to themselves.
    fn eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.body, &other.body) && Rc::ptr_eq(&self.env, &other.env)
    }
}

/// Half-open integer range `[start, end)`, produced lazily when iterated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: i64,
    pub end: i64,
}

impl Range {
    pub fn iter(&self) -> std::ops::Range<i64> {
        self.start..self.end
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "range({}, {})", self.start, self.end)
    }
}
