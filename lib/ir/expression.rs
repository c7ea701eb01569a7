//! IR expressions: the variable reference, implicit-return reference,
//! basic expression, and call expression variants of the data model.

use std::fmt;

use indexmap::IndexMap;

use crate::ir::variable::VariableRef;

/// A set of `VariableRef`s, unique by `name`, iterated in insertion
/// order. Backs `BasicExpr::defs`/`uses` (data model invariant: "Within a
/// single Basic expression, no two elements of `defs` share a `name`;
/// likewise for `uses`").
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct VariableSet(IndexMap<String, VariableRef>);

impl VariableSet {
    pub fn new() -> VariableSet {
        VariableSet(IndexMap::new())
    }

    pub fn singleton(var: VariableRef) -> VariableSet {
        let mut set = VariableSet::new();
        set.insert(var);
        set
    }

    /// Insert `var`, keeping whichever `VariableRef` for this name was
    /// inserted first.
    pub fn insert(&mut self, var: VariableRef) {
        self.0.entry(var.name.clone()).or_insert(var);
    }

    pub fn extend(&mut self, other: VariableSet) {
        for (_, var) in other.0 {
            self.insert(var);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableRef> {
        self.0.values()
    }

    /// The sole element of a singleton set.
    pub fn single(&self) -> Option<&VariableRef> {
        if self.0.len() == 1 {
            self.0.values().next()
        } else {
            None
        }
    }
}

/// `B` in the data model: the def/use closure of an arbitrary
/// subexpression.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BasicExpr {
    defs: VariableSet,
    uses: VariableSet,
    direct_use: bool,
    text: String,
}

impl BasicExpr {
    pub fn new(defs: VariableSet, uses: VariableSet, direct_use: bool, text: String) -> BasicExpr {
        BasicExpr {
            defs,
            uses,
            direct_use,
            text,
        }
    }

    pub fn defines(&self) -> &VariableSet {
        &self.defs
    }

    pub fn uses(&self) -> &VariableSet {
        &self.uses
    }

    pub fn is_direct_use(&self) -> bool {
        self.direct_use
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// `C` in the data model: a call expression, with argument nodes already
/// reduced to canonical form (a variable, an implicit return, or a
/// nested basic expression).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    callee_id: String,
    args: Vec<Expression>,
    text: String,
}

impl CallExpr {
    pub fn new(callee_id: String, args: Vec<Expression>, text: String) -> CallExpr {
        CallExpr {
            callee_id,
            args,
            text,
        }
    }

    pub fn callee_id(&self) -> &str {
        &self.callee_id
    }

    pub fn args(&self) -> &[Expression] {
        &self.args
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A canonical IR expression: produced by the expression analyzer, and
/// also the variant used for bare-expression statements and call
/// arguments.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// A plain variable reference, or (when `VariableRef::is_implicit_return`)
    /// an implicit return reference.
    Variable(VariableRef),
    Basic(BasicExpr),
    Call(CallExpr),
}

impl Expression {
    pub fn text(&self) -> &str {
        match self {
            Expression::Variable(v) => &v.text,
            Expression::Basic(b) => &b.text,
            Expression::Call(c) => &c.text,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Variable(v) => write!(f, "{}", v),
            Expression::Basic(b) => write!(f, "{}", b.text()),
            Expression::Call(c) => write!(f, "{}", c.text()),
        }
    }
}
