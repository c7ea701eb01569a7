//! `V` in the data model: a reference to a named variable.
//!
//! A `VariableRef` has two subtypes, distinguished by `callee`: a plain
//! variable (`callee` is `None`), or an implicit return reference
//! (`callee` is `Some(callee_id)`), denoting "the value returned by this
//! call site" as the distinct logical variable `__impl_ret_<callee>`.

use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct VariableRef {
    pub name: String,
    pub text: String,
    pub callee: Option<String>,
}

impl VariableRef {
    /// A plain variable reference.
    pub fn new<S: Into<String>, T: Into<String>>(name: S, text: T) -> VariableRef {
        VariableRef {
            name: name.into(),
            text: text.into(),
            callee: None,
        }
    }

    /// The implicit return reference for a call to `callee`.
    pub fn implicit_return<C: Into<String>, T: Into<String>>(callee: C, text: T) -> VariableRef {
        let callee = callee.into();
        let name = Self::implicit_return_name(&callee);
        VariableRef {
            name,
            text: text.into(),
            callee: Some(callee),
        }
    }

    pub fn implicit_return_name(callee: &str) -> String {
        format!("__impl_ret_{}", callee)
    }

    pub fn is_implicit_return(&self) -> bool {
        self.callee.is_some()
    }
}

impl fmt::Display for VariableRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
