use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::function::Function;
use crate::interpreter::Interpreter;
use crate::object::Object;
use crate::token::Token;

/// A class value: its own methods plus an optional link to the superclass
/// whose methods it falls back to. Method lookup walks this chain once and
/// stops at the first match, so an override in a subclass always shadows
/// the same name further up.
pub struct Class {
    pub name: String,
    pub methods: HashMap<String, Rc<Function>>,
    pub superclass: Option<Rc<RefCell<Class>>>,
}

impl Class {
    pub fn new(name: String, methods: HashMap<String, Rc<Function>>, superclass: Option<Rc<RefCell<Class>>>) -> Self {
        Class { name, methods, superclass }
    }

    pub fn get_method(&self, name: &str) -> Option<Rc<Function>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Rc::clone(method));
        }

        self.superclass.as_ref().and_then(|superclass| superclass.borrow().get_method(name))
    }

    pub fn arity(&self) -> usize {
        self.get_method("init").map_or(0, |init| init.arity())
    }

    /// Constructs an instance of `class`, running its `init` method (if
    /// any) with `arguments` and returning the bound `this`. Takes the
    /// `Rc` handle directly rather than borrowing a `Class` in isolation,
    /// since the new `Instance` needs to share it.
    pub fn instantiate(
        class: &Rc<RefCell<Class>>,
        interpreter: &mut Interpreter<'_>,
        arguments: Vec<Object>,
    ) -> Result<Object, RuntimeError> {
        let instance = Rc::new(RefCell::new(Instance::new(Rc::clone(class))));

        if let Some(initializer) = class.borrow().get_method("init") {
            let bound = initializer.bind(Object::from(Rc::clone(&instance)));
            bound.call(interpreter, arguments)?;
        }

        Ok(Object::from(instance))
    }
}

impl Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A class instance: a back-reference to its class plus the fields set on
/// it so far. Methods are never stored as fields; `get` checks `fields`
/// first and only falls back to the method chain.
pub struct Instance {
    pub class: Rc<RefCell<Class>>,
    pub fields: HashMap<String, Object>,
}

impl Instance {
    pub fn new(class: Rc<RefCell<Class>>) -> Self {
        Instance { class, fields: HashMap::new() }
    }

    pub fn get(&self, name: &Token, this: &Rc<RefCell<Instance>>) -> Result<Object, RuntimeError> {
        if let Some(field) = self.fields.get(&name.lexeme) {
            return Ok(field.clone());
        }

        if let Some(method) = self.class.borrow().get_method(&name.lexeme) {
            return Ok(Object::from(method.bind(Object::from(Rc::clone(this)))));
        }

        Err(RuntimeError::new(name.clone(), format!("Undefined property '{}'.", name.lexeme)))
    }

    pub fn set(&mut self, name: &Token, value: Object) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<instance {}>", self.class.borrow().name)
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} instance", self.class.borrow().name)
    }
}
