//! Runtime faults raised by the SECD machine.
//!
//! Most of these cannot happen for code compiled from a well-typed program;
//! the machine still checks for them instead of reading out of bounds.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeFault {
    /// An instruction needed more operands than the stack held.
    StackUnderflow { instr: String },
    /// An operand had the wrong shape, e.g. applying an integer.
    UnexpectedValue { expected: &'static str, found: String },
    /// `LD (d,i)` named a frame or slot that does not exist.
    BadAddress { depth: usize, index: usize },
    /// `LET n` ran against a frame that does not have `n` slots, or `ENDLET`
    /// found an empty frame.
    FrameSlotMismatch { expected: usize, found: usize },
    /// `RTN` with nothing saved on the dump.
    DumpUnderflow,
    /// A closure body ran off its end without `RTN`.
    ControlExhausted,
    /// The program finished with more than one value on the stack.
    LeftoverStack { count: usize },
    DivisionByZero,
    /// Integer arithmetic left the `i64` range.
    Overflow { op: &'static str },
    /// The configured step budget ran out.
    StepLimitExceeded { limit: u64 },
}

impl fmt::Display for RuntimeFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeFault::StackUnderflow { instr } => {
                write!(f, "stack underflow executing `{instr}`")
            }
            RuntimeFault::UnexpectedValue { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            RuntimeFault::BadAddress { depth, index } => {
                write!(f, "no environment slot at ({depth},{index})")
            }
            RuntimeFault::FrameSlotMismatch { expected, found } => {
                write!(f, "frame has {found} slots, expected {expected}")
            }
            RuntimeFault::DumpUnderflow => write!(f, "return with an empty dump"),
            RuntimeFault::ControlExhausted => {
                write!(f, "closure body ended without a return")
            }
            RuntimeFault::LeftoverStack { count } => {
                write!(f, "program ended with {count} values on the stack")
            }
            RuntimeFault::DivisionByZero => write!(f, "division by zero"),
            RuntimeFault::Overflow { op } => write!(f, "integer overflow in `{op}`"),
            RuntimeFault::StepLimitExceeded { limit } => {
                write!(f, "step limit of {limit} exceeded")
            }
        }
    }
}

impl std::error::Error for RuntimeFault {}
