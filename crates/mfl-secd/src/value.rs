//! Runtime values and environment frames.

use std::fmt;
use std::rc::Rc;

use crate::instr::Instr;

/// One environment frame. Frames are immutable once built and shared by
/// every closure created while they were current.
#[derive(Debug)]
pub struct Frame {
    pub slots: Vec<Value>,
    pub parent: Option<Rc<Frame>>,
}

impl Frame {
    pub fn root() -> Rc<Frame> {
        Rc::new(Frame {
            slots: Vec::new(),
            parent: None,
        })
    }

    /// The frame `depth` levels out from this one.
    pub fn ancestor(self: &Rc<Frame>, depth: usize) -> Option<&Rc<Frame>> {
        let mut frame = self;
        for _ in 0..depth {
            frame = frame.parent.as_ref()?;
        }
        Some(frame)
    }

    /// Number of frames in the chain, this one included.
    pub fn chain_len(&self) -> usize {
        1 + self.parent.as_ref().map_or(0, |p| p.chain_len())
    }
}

#[derive(Clone)]
pub struct Closure {
    pub code: Rc<[Instr]>,
    pub env: Rc<Frame>,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("code_len", &self.code.len())
            .field("frames", &self.env.chain_len())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Closure(Closure),
    /// Argument list built by `NIL`/`CONS`.
    List(Vec<Value>),
}

impl Value {
    /// Short description used in faults.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Bool(_) => "boolean",
            Value::Closure(_) => "closure",
            Value::List(_) => "list",
        }
    }
}

/// Closures compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Closure(a), Value::Closure(b)) => {
                Rc::ptr_eq(&a.code, &b.code) && Rc::ptr_eq(&a.env, &b.env)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Closure(_) => write!(f, "<closure>"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}
