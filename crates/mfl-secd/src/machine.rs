//! The SECD interpreter loop.
//!
//! State is the classic quadruple: a value Stack, the current Environment
//! (a chain of immutable frames), the Control (the instruction slice being
//! executed plus a program counter) and a Dump of saved states to return
//! to. The machine runs until the top-level control is exhausted and then
//! expects exactly one value on the stack.

use std::rc::Rc;

use tracing::trace;

use crate::error::RuntimeFault;
use crate::instr::{ArithOp, Code, Const, Instr};
use crate::value::{Closure, Frame, Value};

/// Limits for a machine run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineConfig {
    /// Maximum number of instructions to execute; `None` is unbounded.
    pub max_steps: Option<u64>,
}

/// A saved caller state.
struct DumpEntry {
    stack: Vec<Value>,
    env: Rc<Frame>,
    control: Rc<[Instr]>,
    pc: usize,
}

pub struct Machine {
    config: MachineConfig,
    stack: Vec<Value>,
    env: Rc<Frame>,
    control: Rc<[Instr]>,
    pc: usize,
    dump: Vec<DumpEntry>,
    steps: u64,
}

impl Machine {
    pub fn new(config: MachineConfig) -> Self {
        Machine {
            config,
            stack: Vec::new(),
            env: Frame::root(),
            control: Rc::from(Vec::new()),
            pc: 0,
            dump: Vec::new(),
            steps: 0,
        }
    }

    /// Instructions executed by the last run.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Execute `code` from a fresh initial state: empty stack and dump and a
    /// single empty top-level frame.
    pub fn run(&mut self, code: &Code) -> Result<Value, RuntimeFault> {
        self.stack.clear();
        self.dump.clear();
        self.env = Frame::root();
        self.control = code.shared();
        self.pc = 0;
        self.steps = 0;

        loop {
            let Some(instr) = self.control.get(self.pc).cloned() else {
                if self.dump.is_empty() {
                    break;
                }
                return Err(RuntimeFault::ControlExhausted);
            };
            self.pc += 1;
            self.steps += 1;
            if let Some(limit) = self.config.max_steps {
                if self.steps > limit {
                    return Err(RuntimeFault::StepLimitExceeded { limit });
                }
            }
            trace!(step = self.steps, %instr, depth = self.dump.len(), "exec");
            self.step(&instr)?;
        }

        match self.stack.len() {
            1 => self.pop(&Instr::Return),
            0 => Err(RuntimeFault::StackUnderflow {
                instr: "end of program".to_string(),
            }),
            count => Err(RuntimeFault::LeftoverStack { count }),
        }
    }

    fn step(&mut self, instr: &Instr) -> Result<(), RuntimeFault> {
        match instr {
            Instr::LoadConst(c) => {
                let value = match c {
                    Const::Int(n) => Value::Int(*n),
                    Const::Bool(b) => Value::Bool(*b),
                };
                self.stack.push(value);
            }
            Instr::LoadVar { depth, index } => {
                let bad = RuntimeFault::BadAddress {
                    depth: *depth,
                    index: *index,
                };
                let frame = self.env.ancestor(*depth).ok_or_else(|| bad.clone())?;
                let value = frame.slots.get(*index).ok_or(bad)?.clone();
                self.stack.push(value);
            }
            Instr::LoadClosure(body) => {
                self.stack.push(Value::Closure(Closure {
                    code: Rc::clone(body),
                    env: Rc::clone(&self.env),
                }));
            }
            Instr::Apply => {
                let closure = match self.pop(instr)? {
                    Value::Closure(closure) => closure,
                    other => return Err(unexpected("closure", &other)),
                };
                let args = match self.pop(instr)? {
                    Value::List(args) => args,
                    other => return Err(unexpected("argument list", &other)),
                };
                let frame = Rc::new(Frame {
                    slots: args,
                    parent: Some(closure.env),
                });
                self.dump.push(DumpEntry {
                    stack: std::mem::take(&mut self.stack),
                    env: std::mem::replace(&mut self.env, frame),
                    control: std::mem::replace(&mut self.control, closure.code),
                    pc: self.pc,
                });
                self.pc = 0;
            }
            Instr::Return => {
                let result = self.pop(instr)?;
                let saved = self.dump.pop().ok_or(RuntimeFault::DumpUnderflow)?;
                self.stack = saved.stack;
                self.env = saved.env;
                self.control = saved.control;
                self.pc = saved.pc;
                self.stack.push(result);
            }
            Instr::BindLet(slot) => {
                let value = self.pop(instr)?;
                let found = self.env.slots.len();
                if found != *slot {
                    return Err(RuntimeFault::FrameSlotMismatch {
                        expected: *slot,
                        found,
                    });
                }
                let mut slots = self.env.slots.clone();
                slots.push(value);
                self.env = Rc::new(Frame {
                    slots,
                    parent: self.env.parent.clone(),
                });
            }
            Instr::EndLet => {
                let mut slots = self.env.slots.clone();
                if slots.pop().is_none() {
                    return Err(RuntimeFault::FrameSlotMismatch {
                        expected: 1,
                        found: 0,
                    });
                }
                self.env = Rc::new(Frame {
                    slots,
                    parent: self.env.parent.clone(),
                });
            }
            Instr::Arithmetic(op) => {
                let rhs = self.pop(instr)?;
                let lhs = self.pop(instr)?;
                let value = arithmetic(*op, lhs, rhs)?;
                self.stack.push(value);
            }
            Instr::Not => match self.pop(instr)? {
                Value::Bool(b) => self.stack.push(Value::Bool(!b)),
                other => return Err(unexpected("boolean", &other)),
            },
            Instr::ListNil => self.stack.push(Value::List(Vec::new())),
            Instr::ListCons => {
                let head = self.pop(instr)?;
                let mut list = match self.pop(instr)? {
                    Value::List(items) => items,
                    other => return Err(unexpected("list", &other)),
                };
                list.insert(0, head);
                self.stack.push(Value::List(list));
            }
        }
        Ok(())
    }

    fn pop(&mut self, instr: &Instr) -> Result<Value, RuntimeFault> {
        self.stack.pop().ok_or_else(|| RuntimeFault::StackUnderflow {
            instr: instr.to_string(),
        })
    }
}

impl Default for Machine {
    fn default() -> Self {
        Machine::new(MachineConfig::default())
    }
}

fn unexpected(expected: &'static str, found: &Value) -> RuntimeFault {
    RuntimeFault::UnexpectedValue {
        expected,
        found: format!("{} `{found}`", found.kind()),
    }
}

fn arithmetic(op: ArithOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeFault> {
    match op {
        ArithOp::And | ArithOp::Or => {
            let (Value::Bool(a), Value::Bool(b)) = (&lhs, &rhs) else {
                let culprit = if matches!(lhs, Value::Bool(_)) { &rhs } else { &lhs };
                return Err(unexpected("boolean", culprit));
            };
            Ok(Value::Bool(if op == ArithOp::And { *a && *b } else { *a || *b }))
        }
        _ => {
            let (Value::Int(a), Value::Int(b)) = (&lhs, &rhs) else {
                let culprit = if matches!(lhs, Value::Int(_)) { &rhs } else { &lhs };
                return Err(unexpected("integer", culprit));
            };
            integer_op(op, *a, *b)
        }
    }
}

fn integer_op(op: ArithOp, a: i64, b: i64) -> Result<Value, RuntimeFault> {
    let overflow = || RuntimeFault::Overflow { op: op.mnemonic() };
    let value = match op {
        ArithOp::Add => Value::Int(a.checked_add(b).ok_or_else(overflow)?),
        ArithOp::Sub => Value::Int(a.checked_sub(b).ok_or_else(overflow)?),
        ArithOp::Mul => Value::Int(a.checked_mul(b).ok_or_else(overflow)?),
        ArithOp::Div | ArithOp::Rem if b == 0 => return Err(RuntimeFault::DivisionByZero),
        // Truncating, matching Erlang `div` and `rem`.
        ArithOp::Div => Value::Int(a.checked_div(b).ok_or_else(overflow)?),
        ArithOp::Rem => Value::Int(a.checked_rem(b).ok_or_else(overflow)?),
        ArithOp::Eq => Value::Bool(a == b),
        ArithOp::Ne => Value::Bool(a != b),
        ArithOp::Lt => Value::Bool(a < b),
        ArithOp::Le => Value::Bool(a <= b),
        ArithOp::Gt => Value::Bool(a > b),
        ArithOp::Ge => Value::Bool(a >= b),
        ArithOp::And | ArithOp::Or => unreachable!("boolean ops are handled by the caller"),
    };
    Ok(value)
}

/// Run `code` on a fresh machine with default limits.
pub fn run(code: &Code) -> Result<Value, RuntimeFault> {
    Machine::default().run(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ldc(n: i64) -> Instr {
        Instr::LoadConst(Const::Int(n))
    }

    #[test]
    fn constant_program() {
        let code = Code::new(vec![ldc(7)]);
        assert_eq!(run(&code), Ok(Value::Int(7)));
    }

    #[test]
    fn arithmetic_order_is_lhs_then_rhs() {
        let code = Code::new(vec![ldc(10), ldc(3), Instr::Arithmetic(ArithOp::Sub)]);
        assert_eq!(run(&code), Ok(Value::Int(7)));
    }

    #[test]
    fn division_truncates_toward_zero() {
        assert_eq!(integer_op(ArithOp::Div, -7, 2), Ok(Value::Int(-3)));
        assert_eq!(integer_op(ArithOp::Rem, -7, 2), Ok(Value::Int(-1)));
    }

    #[test]
    fn division_by_zero_faults() {
        let code = Code::new(vec![ldc(1), ldc(0), Instr::Arithmetic(ArithOp::Div)]);
        assert_eq!(run(&code), Err(RuntimeFault::DivisionByZero));
    }

    #[test]
    fn overflow_faults() {
        let code = Code::new(vec![ldc(i64::MAX), ldc(1), Instr::Arithmetic(ArithOp::Add)]);
        assert_eq!(run(&code), Err(RuntimeFault::Overflow { op: "ADD" }));
        assert_eq!(
            integer_op(ArithOp::Div, i64::MIN, -1),
            Err(RuntimeFault::Overflow { op: "DIV" })
        );
    }

    #[test]
    fn stack_underflow_is_reported() {
        let code = Code::new(vec![ldc(1), Instr::Arithmetic(ArithOp::Add)]);
        assert_eq!(
            run(&code),
            Err(RuntimeFault::StackUnderflow {
                instr: "ADD".to_string()
            })
        );
    }

    #[test]
    fn bad_address_is_reported() {
        let code = Code::new(vec![Instr::LoadVar { depth: 0, index: 0 }]);
        assert_eq!(run(&code), Err(RuntimeFault::BadAddress { depth: 0, index: 0 }));
        let code = Code::new(vec![Instr::LoadVar { depth: 3, index: 0 }]);
        assert_eq!(run(&code), Err(RuntimeFault::BadAddress { depth: 3, index: 0 }));
    }

    #[test]
    fn return_without_dump() {
        let code = Code::new(vec![ldc(1), Instr::Return]);
        assert_eq!(run(&code), Err(RuntimeFault::DumpUnderflow));
    }

    #[test]
    fn leftover_stack() {
        let code = Code::new(vec![ldc(1), ldc(2)]);
        assert_eq!(run(&code), Err(RuntimeFault::LeftoverStack { count: 2 }));
    }

    #[test]
    fn applying_a_non_closure() {
        let code = Code::new(vec![Instr::ListNil, ldc(1), Instr::ListCons, ldc(2), Instr::Apply]);
        assert_eq!(
            run(&code),
            Err(RuntimeFault::UnexpectedValue {
                expected: "closure",
                found: "integer `2`".to_string()
            })
        );
    }

    #[test]
    fn closure_body_without_return() {
        let body: Rc<[Instr]> = vec![Instr::LoadVar { depth: 0, index: 0 }].into();
        let code = Code::new(vec![
            Instr::ListNil,
            ldc(1),
            Instr::ListCons,
            Instr::LoadClosure(body),
            Instr::Apply,
        ]);
        assert_eq!(run(&code), Err(RuntimeFault::ControlExhausted));
    }

    #[test]
    fn bind_let_checks_slot() {
        let code = Code::new(vec![ldc(1), Instr::BindLet(1)]);
        assert_eq!(
            run(&code),
            Err(RuntimeFault::FrameSlotMismatch {
                expected: 1,
                found: 0
            })
        );
    }

    #[test]
    fn step_limit() {
        let mut machine = Machine::new(MachineConfig { max_steps: Some(2) });
        let code = Code::new(vec![ldc(1), ldc(2), Instr::Arithmetic(ArithOp::Add)]);
        assert_eq!(machine.run(&code), Err(RuntimeFault::StepLimitExceeded { limit: 2 }));
        let mut machine = Machine::new(MachineConfig { max_steps: Some(3) });
        assert_eq!(machine.run(&code), Ok(Value::Int(3)));
        assert_eq!(machine.steps(), 3);
    }
}
