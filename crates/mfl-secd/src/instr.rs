//! The SECD instruction set.

use std::fmt;
use std::rc::Rc;

use mfl_parser::BinOp;

/// A literal loaded by `LDC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Const {
    Int(i64),
    Bool(bool),
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Const::Int(n) => write!(f, "{n}"),
            Const::Bool(true) => write!(f, "True"),
            Const::Bool(false) => write!(f, "False"),
        }
    }
}

/// Primitive binary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl ArithOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            ArithOp::Add => "ADD",
            ArithOp::Sub => "SUB",
            ArithOp::Mul => "MUL",
            ArithOp::Div => "DIV",
            ArithOp::Rem => "REM",
            ArithOp::Eq => "EQ",
            ArithOp::Ne => "NE",
            ArithOp::Lt => "LT",
            ArithOp::Le => "LE",
            ArithOp::Gt => "GT",
            ArithOp::Ge => "GE",
            ArithOp::And => "AND",
            ArithOp::Or => "OR",
        }
    }
}

impl From<BinOp> for ArithOp {
    fn from(op: BinOp) -> Self {
        match op {
            BinOp::Add => ArithOp::Add,
            BinOp::Sub => ArithOp::Sub,
            BinOp::Mul => ArithOp::Mul,
            BinOp::Div => ArithOp::Div,
            BinOp::Rem => ArithOp::Rem,
            BinOp::Eq => ArithOp::Eq,
            BinOp::NotEq => ArithOp::Ne,
            BinOp::Lt => ArithOp::Lt,
            BinOp::LtEq => ArithOp::Le,
            BinOp::Gt => ArithOp::Gt,
            BinOp::GtEq => ArithOp::Ge,
            BinOp::And => ArithOp::And,
            BinOp::Or => ArithOp::Or,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    /// `LDC c`: push a literal.
    LoadConst(Const),
    /// `LD (d,i)`: push slot `index` of the frame `depth` levels out.
    LoadVar { depth: usize, index: usize },
    /// `LDF [...]`: push a closure over the current environment.
    LoadClosure(Rc<[Instr]>),
    /// `AP`: pop a closure and an argument list, call.
    Apply,
    /// `RTN`: return the top of stack to the caller saved on the dump.
    Return,
    /// `LET n`: pop a value into slot `n` of the current frame.
    BindLet(usize),
    /// `ENDLET`: drop the last slot of the current frame.
    EndLet,
    Arithmetic(ArithOp),
    /// `NOT`: boolean negation.
    Not,
    /// `NIL`: push an empty argument list.
    ListNil,
    /// `CONS`: pop a value and a list, push the value prepended.
    ListCons,
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::LoadConst(c) => write!(f, "LDC {c}"),
            Instr::LoadVar { depth, index } => write!(f, "LD ({depth},{index})"),
            Instr::LoadClosure(body) => {
                write!(f, "LDF [")?;
                for (i, instr) in body.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{instr}")?;
                }
                write!(f, "]")
            }
            Instr::Apply => write!(f, "AP"),
            Instr::Return => write!(f, "RTN"),
            Instr::BindLet(slot) => write!(f, "LET {slot}"),
            Instr::EndLet => write!(f, "ENDLET"),
            Instr::Arithmetic(op) => write!(f, "{}", op.mnemonic()),
            Instr::Not => write!(f, "NOT"),
            Instr::ListNil => write!(f, "NIL"),
            Instr::ListCons => write!(f, "CONS"),
        }
    }
}

/// A compiled top-level program.
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    instrs: Rc<[Instr]>,
}

impl Code {
    pub fn new(instrs: Vec<Instr>) -> Self {
        Code {
            instrs: instrs.into(),
        }
    }

    pub fn instrs(&self) -> &[Instr] {
        &self.instrs
    }

    pub(crate) fn shared(&self) -> Rc<[Instr]> {
        Rc::clone(&self.instrs)
    }

    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }
}

/// One instruction per line; closure bodies are listed inline.
impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instr) in self.instrs.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{instr}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonics() {
        assert_eq!(Instr::LoadConst(Const::Int(21)).to_string(), "LDC 21");
        assert_eq!(Instr::LoadConst(Const::Bool(false)).to_string(), "LDC False");
        assert_eq!(Instr::LoadVar { depth: 0, index: 1 }.to_string(), "LD (0,1)");
        assert_eq!(Instr::BindLet(2).to_string(), "LET 2");
        assert_eq!(Instr::Arithmetic(ArithOp::Le).to_string(), "LE");
    }

    #[test]
    fn closure_bodies_list_inline() {
        let body: Rc<[Instr]> = vec![
            Instr::LoadVar { depth: 0, index: 0 },
            Instr::Return,
        ]
        .into();
        assert_eq!(Instr::LoadClosure(body).to_string(), "LDF [LD (0,0), RTN]");
    }

    #[test]
    fn binop_mapping() {
        assert_eq!(ArithOp::from(BinOp::NotEq), ArithOp::Ne);
        assert_eq!(ArithOp::from(BinOp::Or), ArithOp::Or);
    }
}
