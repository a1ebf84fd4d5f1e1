//! Backing variables referenced by field-bound properties.

use indexmap::IndexMap;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum VarStorage {
    /// Private state of the generated class
    Impl,
    /// Exposed to the code that uses the generated class
    Interface,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Var {
    pub name: String,
    pub ty: String,
    pub init: String,
    pub storage: VarStorage,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct VarTable {
    vars: IndexMap<String, Var>,
}

impl VarTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a new variable named `<hint><n>` with the first free `n`
    /// and returns its name.
    pub fn create_var(&mut self, ty: &str, init: &str, storage: VarStorage, hint: &str) -> String {
        let mut n = 1;
        let name = loop {
            let candidate = format!("{}{}", hint, n);
            if !self.vars.contains_key(&candidate) {
                break candidate;
            }
            n += 1;
        };
        log::debug!("declaring {} {} = {:?}", ty, name, init);
        self.vars.insert(
            name.clone(),
            Var {
                name: name.clone(),
                ty: ty.to_string(),
                init: init.to_string(),
                storage,
            },
        );
        name
    }

    pub fn get(&self, name: &str) -> Option<&Var> {
        self.vars.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Var> {
        self.vars.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Variables in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Var> {
        self.vars.values()
    }
}
