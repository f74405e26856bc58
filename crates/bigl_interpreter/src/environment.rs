use std::{cell::RefCell, collections::HashMap, rc::Rc};

use log::debug;

use crate::error::RuntimeError;
use crate::object::Object;

/// Name under which every root environment records the unit it was created for.
pub const MODULE_NAME_KEY: &str = "_name";

#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Rc<Object>>,
    outer: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            store: HashMap::new(),
            outer: None,
        }
    }

    /// Create a root environment tagged with the given module name
    pub fn new_module(name: &str) -> Self {
        let mut env = Environment::new();
        env.define(MODULE_NAME_KEY, Rc::new(Object::String(name.to_owned())));
        env
    }

    /// Create a new environment that is enclosed by a given outer environment
    pub fn new_enclosed(outer: Rc<RefCell<Environment>>) -> Self {
        Environment {
            store: HashMap::new(),
            outer: Some(outer),
        }
    }

    pub fn get(&self, name: &str) -> Option<Rc<Object>> {
        match self.store.get(name) {
            Some(obj) => Some(Rc::clone(obj)),
            // If not found in this environment, look for it in the outer environment
            None => match self.outer {
                Some(ref outer) => outer.borrow().get(name),
                None => None,
            },
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.contains_key(name)
            || self
                .outer
                .as_ref()
                .map_or(false, |outer| outer.borrow().contains(name))
    }

    /// Bind `name` in this frame, shadowing any outer binding
    pub fn define(&mut self, name: &str, value: Rc<Object>) {
        debug!("define {} = {} (depth {})", name, value.to_code_string(), self.depth());
        self.store.insert(name.to_owned(), value);
    }

    /// Overwrite the nearest binding of `name`, or bind it here if there is none
    pub fn set(&mut self, name: &str, value: Rc<Object>) {
        if !self.store.contains_key(name) {
            if let Some(outer) = &self.outer {
                if outer.borrow().contains(name) {
                    outer.borrow_mut().set(name, value);
                    return;
                }
            }
        }

        self.define(name, value);
    }

    /// Overwrite the nearest binding of `name`, which must exist
    pub fn assign(&mut self, name: &str, value: Rc<Object>) -> Result<(), RuntimeError> {
        if self.store.contains_key(name) {
            debug!("assign {} = {}", name, value.to_code_string());
            self.store.insert(name.to_owned(), value);
            Ok(())
        } else {
            match self.outer {
                Some(ref outer) => outer.borrow_mut().assign(name, value),
                None => Err(RuntimeError::IdentifierNotFound(name.to_owned())),
            }
        }
    }

    /// Copy every binding of `other`'s own frame into this one, except its module name
    pub fn merge(&mut self, other: &Environment) {
        for (name, value) in &other.store {
            if name == MODULE_NAME_KEY {
                continue;
            }
            self.define(name, Rc::clone(value));
        }
    }

    pub fn depth(&self) -> usize {
        match &self.outer {
            // Recursively add the depth
            Some(parent_env) => 1 + parent_env.borrow().depth(),
            None => 1,
        }
    }
}
