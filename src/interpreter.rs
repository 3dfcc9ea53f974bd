//! The stack machine: opcode execution and top-level spend validation

use crate::conditional::ConditionalStack;
use crate::crypto;
use crate::error::{Result, ScriptError};
use crate::number::{cast_to_bool, ScriptNum};
use crate::opcode::Opcode;
use crate::script::{Operation, PaymentType, Script};
use crate::sighash::check_signature;
use crate::types::{ByteString, Transaction};

/// Canonical boolean stack values pushed by comparison opcodes.
fn stack_true() -> ByteString {
    vec![1]
}

fn stack_false() -> ByteString {
    ByteString::new()
}

/// Transient execution state for running scripts against one transaction
/// input.
///
/// A [`Script`] stays immutable; all mutation happens on the interpreter's
/// stacks. The main stack deliberately survives across runs, so the output
/// script (and a pay-to-script-hash redeem script) can consume what the
/// input script produced. The alternate stack, the conditional stack, and
/// the code-separator cursor reset on every run.
#[derive(Debug, Default)]
pub struct Interpreter {
    stack: Vec<ByteString>,
    alt_stack: Vec<ByteString>,
    conditionals: ConditionalStack,
    code_separator: usize,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pre-populated main stack.
    pub fn with_stack(stack: Vec<ByteString>) -> Self {
        Interpreter {
            stack,
            ..Self::default()
        }
    }

    pub fn stack(&self) -> &[ByteString] {
        &self.stack
    }

    pub fn into_stack(self) -> Vec<ByteString> {
        self.stack
    }

    /// Execute every operation of `script` in order. The conditional stack
    /// must be balanced when the end of the script is reached.
    pub fn run(&mut self, script: &Script, tx: &Transaction, input_index: usize) -> Result<()> {
        self.alt_stack.clear();
        self.conditionals.clear();
        self.code_separator = 0;
        for (position, operation) in script.operations().iter().enumerate() {
            self.step(script, position, operation, tx, input_index)?;
        }
        if !self.conditionals.is_closed() {
            return Err(ScriptError::UnbalancedConditional);
        }
        Ok(())
    }

    fn step(
        &mut self,
        script: &Script,
        position: usize,
        operation: &Operation,
        tx: &Transaction,
        input_index: usize,
    ) -> Result<()> {
        // Inside a dead branch only the branch opcodes are interpreted;
        // everything else, disabled opcodes included, is skipped.
        if self.conditionals.has_failed_branches() && !operation.opcode.is_conditional() {
            return Ok(());
        }
        if operation.opcode.is_disabled() {
            return Err(ScriptError::DisabledOpcode);
        }
        match operation.opcode {
            Opcode::Zero => {
                self.stack.push(ByteString::new());
                Ok(())
            }
            Opcode::Special | Opcode::PushData1 | Opcode::PushData2 | Opcode::PushData4 => {
                self.stack.push(operation.data.clone());
                Ok(())
            }
            Opcode::CodeSeparator => {
                self.code_separator = position;
                Ok(())
            }
            opcode => self.execute(opcode, script, tx, input_index),
        }
    }

    fn execute(
        &mut self,
        opcode: Opcode,
        script: &Script,
        tx: &Transaction,
        input_index: usize,
    ) -> Result<()> {
        match opcode {
            Opcode::Negative1 => {
                self.push_number(-1);
                Ok(())
            }
            Opcode::Op1 => self.op_push_small(1),
            Opcode::Op2 => self.op_push_small(2),
            Opcode::Op3 => self.op_push_small(3),
            Opcode::Op4 => self.op_push_small(4),
            Opcode::Op5 => self.op_push_small(5),
            Opcode::Op6 => self.op_push_small(6),
            Opcode::Op7 => self.op_push_small(7),
            Opcode::Op8 => self.op_push_small(8),
            Opcode::Op9 => self.op_push_small(9),
            Opcode::Op10 => self.op_push_small(10),
            Opcode::Op11 => self.op_push_small(11),
            Opcode::Op12 => self.op_push_small(12),
            Opcode::Op13 => self.op_push_small(13),
            Opcode::Op14 => self.op_push_small(14),
            Opcode::Op15 => self.op_push_small(15),
            Opcode::Op16 => self.op_push_small(16),
            Opcode::Nop
            | Opcode::Nop1
            | Opcode::Nop2
            | Opcode::Nop3
            | Opcode::Nop4
            | Opcode::Nop5
            | Opcode::Nop6
            | Opcode::Nop7
            | Opcode::Nop8
            | Opcode::Nop9
            | Opcode::Nop10 => Ok(()),
            Opcode::If => self.op_if(),
            Opcode::NotIf => self.op_notif(),
            Opcode::Else => self.op_else(),
            Opcode::EndIf => self.op_endif(),
            Opcode::Verify => self.op_verify(),
            Opcode::ToAltStack => self.op_toaltstack(),
            Opcode::FromAltStack => self.op_fromaltstack(),
            Opcode::IfDup => self.op_ifdup(),
            Opcode::Depth => self.op_depth(),
            Opcode::Drop => self.op_drop(),
            Opcode::Dup => self.op_dup(),
            Opcode::Nip => self.op_nip(),
            Opcode::Over => self.op_over(),
            Opcode::Pick => self.pick_or_roll(false),
            Opcode::Roll => self.pick_or_roll(true),
            Opcode::Size => self.op_size(),
            Opcode::Not => self.op_not(),
            Opcode::BoolOr => self.op_boolor(),
            Opcode::Min => self.op_min(),
            Opcode::Add => self.op_add(),
            Opcode::GreaterThanOrEqual => self.op_greaterthanorequal(),
            Opcode::Sha256 => self.op_sha256(),
            Opcode::Hash160 => self.op_hash160(),
            Opcode::Equal => self.op_equal(),
            Opcode::EqualVerify => self.op_equalverify(),
            Opcode::CheckSig => self.op_checksig(script, tx, input_index),
            Opcode::CheckSigVerify => self.op_checksigverify(script, tx, input_index),
            Opcode::CheckMultisig => self.op_checkmultisig(script, tx, input_index),
            Opcode::CheckMultisigVerify => self.op_checkmultisigverify(script, tx, input_index),
            Opcode::Reserved
            | Opcode::Ver
            | Opcode::VerIf
            | Opcode::VerNotIf
            | Opcode::Reserved1
            | Opcode::Reserved2
            | Opcode::RawData
            | Opcode::Unknown(_)
            | Opcode::Cat
            | Opcode::Substr
            | Opcode::Left
            | Opcode::Right
            | Opcode::Invert
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::Mul2
            | Opcode::Div2
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Mod
            | Opcode::LShift
            | Opcode::RShift => Err(ScriptError::DisabledOpcode),
            Opcode::Zero
            | Opcode::Special
            | Opcode::PushData1
            | Opcode::PushData2
            | Opcode::PushData4
            | Opcode::CodeSeparator => {
                debug_assert!(false, "push opcodes are routed before dispatch");
                Ok(())
            }
        }
    }

    fn pop(&mut self) -> Result<ByteString> {
        self.stack.pop().ok_or(ScriptError::StackUnderflow)
    }

    fn pop_number(&mut self) -> Result<ScriptNum> {
        let bytes = self.pop()?;
        ScriptNum::from_bytes(&bytes)
    }

    /// The two operands of a binary numeric opcode: `a` is the former
    /// stack top, `b` the item beneath it.
    fn pop_operands(&mut self) -> Result<(ScriptNum, ScriptNum)> {
        if self.stack.len() < 2 {
            return Err(ScriptError::StackUnderflow);
        }
        let a = self.pop_number()?;
        let b = self.pop_number()?;
        Ok((a, b))
    }

    fn push_number(&mut self, value: i64) {
        self.stack.push(ScriptNum::new(value).to_bytes());
    }

    fn push_bool(&mut self, value: bool) {
        self.stack
            .push(if value { stack_true() } else { stack_false() });
    }

    fn op_push_small(&mut self, value: i64) -> Result<()> {
        self.push_number(value);
        Ok(())
    }

    fn op_if(&mut self) -> Result<()> {
        // In a dead branch the frame still opens, as false, and the main
        // stack is left alone.
        let mut value = false;
        if !self.conditionals.has_failed_branches() {
            let top = self.pop()?;
            value = cast_to_bool(&top);
        }
        self.conditionals.open(value);
        Ok(())
    }

    fn op_notif(&mut self) -> Result<()> {
        self.op_if()?;
        self.conditionals.toggle_top();
        Ok(())
    }

    fn op_else(&mut self) -> Result<()> {
        if self.conditionals.is_closed() {
            return Err(ScriptError::UnbalancedConditional);
        }
        self.conditionals.toggle_top();
        Ok(())
    }

    fn op_endif(&mut self) -> Result<()> {
        if self.conditionals.is_closed() {
            return Err(ScriptError::UnbalancedConditional);
        }
        self.conditionals.close();
        Ok(())
    }

    fn op_verify(&mut self) -> Result<()> {
        let top = self.stack.last().ok_or(ScriptError::StackUnderflow)?;
        if !cast_to_bool(top) {
            // The failing value stays on the stack.
            return Err(ScriptError::VerifyFailed);
        }
        self.stack.pop();
        Ok(())
    }

    fn op_toaltstack(&mut self) -> Result<()> {
        let item = self.pop()?;
        self.alt_stack.push(item);
        Ok(())
    }

    fn op_fromaltstack(&mut self) -> Result<()> {
        let item = self.alt_stack.pop().ok_or(ScriptError::StackUnderflow)?;
        self.stack.push(item);
        Ok(())
    }

    fn op_ifdup(&mut self) -> Result<()> {
        let top = self.stack.last().ok_or(ScriptError::StackUnderflow)?;
        if cast_to_bool(top) {
            self.stack.push(top.clone());
        }
        Ok(())
    }

    fn op_depth(&mut self) -> Result<()> {
        let depth = self.stack.len() as i64;
        self.push_number(depth);
        Ok(())
    }

    fn op_drop(&mut self) -> Result<()> {
        self.pop()?;
        Ok(())
    }

    fn op_dup(&mut self) -> Result<()> {
        let top = self
            .stack
            .last()
            .cloned()
            .ok_or(ScriptError::StackUnderflow)?;
        self.stack.push(top);
        Ok(())
    }

    fn op_nip(&mut self) -> Result<()> {
        if self.stack.len() < 2 {
            return Err(ScriptError::StackUnderflow);
        }
        self.stack.remove(self.stack.len() - 2);
        Ok(())
    }

    fn op_over(&mut self) -> Result<()> {
        if self.stack.len() < 2 {
            return Err(ScriptError::StackUnderflow);
        }
        let item = self.stack[self.stack.len() - 2].clone();
        self.stack.push(item);
        Ok(())
    }

    fn pick_or_roll(&mut self, remove: bool) -> Result<()> {
        if self.stack.len() < 2 {
            return Err(ScriptError::StackUnderflow);
        }
        let depth = self.pop_number()?.value();
        if depth < 0 || depth as usize >= self.stack.len() {
            return Err(ScriptError::StackUnderflow);
        }
        let index = self.stack.len() - 1 - depth as usize;
        let item = if remove {
            self.stack.remove(index)
        } else {
            self.stack[index].clone()
        };
        self.stack.push(item);
        Ok(())
    }

    fn op_size(&mut self) -> Result<()> {
        let length = self.stack.last().ok_or(ScriptError::StackUnderflow)?.len();
        self.push_number(length as i64);
        Ok(())
    }

    fn op_not(&mut self) -> Result<()> {
        let value = self.pop_number()?;
        self.push_bool(value.value() == 0);
        Ok(())
    }

    fn op_boolor(&mut self) -> Result<()> {
        let (a, b) = self.pop_operands()?;
        self.push_bool(a.value() != 0 || b.value() != 0);
        Ok(())
    }

    fn op_min(&mut self) -> Result<()> {
        let (a, b) = self.pop_operands()?;
        self.push_number(a.value().min(b.value()));
        Ok(())
    }

    fn op_add(&mut self) -> Result<()> {
        let (a, b) = self.pop_operands()?;
        self.push_number(a.value() + b.value());
        Ok(())
    }

    /// The comparison reads bottom-to-top: with `a` popped first, the
    /// pushed result is `b >= a`.
    fn op_greaterthanorequal(&mut self) -> Result<()> {
        let (a, b) = self.pop_operands()?;
        self.push_bool(b.value() >= a.value());
        Ok(())
    }

    fn op_sha256(&mut self) -> Result<()> {
        let data = self.pop()?;
        self.stack.push(crypto::sha256(&data).to_vec());
        Ok(())
    }

    fn op_hash160(&mut self) -> Result<()> {
        let data = self.pop()?;
        self.stack.push(crypto::hash160(&data).to_vec());
        Ok(())
    }

    fn op_equal(&mut self) -> Result<()> {
        if self.stack.len() < 2 {
            return Err(ScriptError::StackUnderflow);
        }
        let a = self.pop()?;
        let b = self.pop()?;
        self.push_bool(a == b);
        Ok(())
    }

    fn op_equalverify(&mut self) -> Result<()> {
        if self.stack.len() < 2 {
            return Err(ScriptError::StackUnderflow);
        }
        let a = self.pop()?;
        let b = self.pop()?;
        if a == b {
            Ok(())
        } else {
            Err(ScriptError::VerifyFailed)
        }
    }

    /// Operations from the last executed CODESEPARATOR onward, minus any
    /// push whose bytes equal one of the signatures under check and minus
    /// the separators themselves. This subset is what the signature
    /// actually signs.
    fn script_code(&self, script: &Script, signatures: &[ByteString]) -> Script {
        let mut code = Script::new();
        for operation in &script.operations()[self.code_separator..] {
            if operation.opcode == Opcode::CodeSeparator {
                continue;
            }
            if signatures.contains(&operation.data) {
                continue;
            }
            code.push_operation(operation.clone());
        }
        code
    }

    fn check_signature_operation(
        &mut self,
        script: &Script,
        tx: &Transaction,
        input_index: usize,
    ) -> Result<bool> {
        if self.stack.len() < 2 {
            return Err(ScriptError::StackUnderflow);
        }
        let pubkey = self.pop()?;
        let signature = self.pop()?;
        let code = self.script_code(script, std::slice::from_ref(&signature));
        Ok(check_signature(&signature, &pubkey, &code, tx, input_index))
    }

    fn op_checksig(&mut self, script: &Script, tx: &Transaction, input_index: usize) -> Result<()> {
        let verified = self.check_signature_operation(script, tx, input_index)?;
        self.push_bool(verified);
        Ok(())
    }

    fn op_checksigverify(
        &mut self,
        script: &Script,
        tx: &Transaction,
        input_index: usize,
    ) -> Result<()> {
        if self.check_signature_operation(script, tx, input_index)? {
            Ok(())
        } else {
            Err(ScriptError::SignatureCheckFailed)
        }
    }

    /// Pop a counted group: a small number on top, then that many items.
    fn read_section(&mut self) -> Result<Vec<ByteString>> {
        let count = self.pop_number()?.value();
        if count < 0 || count as usize > self.stack.len() {
            return Err(ScriptError::StackUnderflow);
        }
        let mut section = Vec::with_capacity(count as usize);
        for _ in 0..count {
            section.push(self.pop()?);
        }
        Ok(section)
    }

    fn check_multisig_operation(
        &mut self,
        script: &Script,
        tx: &Transaction,
        input_index: usize,
    ) -> Result<bool> {
        let pubkeys = self.read_section()?;
        let signatures = self.read_section()?;
        let code = self.script_code(script, &signatures);

        // Signatures must appear in key order: each one scans forward from
        // the key after the previous match, and running out of keys fails
        // the whole check. Keys may be skipped, signatures may not.
        let mut next_key = 0;
        for signature in &signatures {
            let mut matched = None;
            for (offset, pubkey) in pubkeys[next_key..].iter().enumerate() {
                if check_signature(signature, pubkey, &code, tx, input_index) {
                    matched = Some(next_key + offset);
                    break;
                }
            }
            match matched {
                Some(index) => next_key = index + 1,
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    fn op_checkmultisig(
        &mut self,
        script: &Script,
        tx: &Transaction,
        input_index: usize,
    ) -> Result<()> {
        let verified = self.check_multisig_operation(script, tx, input_index)?;
        self.push_bool(verified);
        Ok(())
    }

    fn op_checkmultisigverify(
        &mut self,
        script: &Script,
        tx: &Transaction,
        input_index: usize,
    ) -> Result<()> {
        if self.check_multisig_operation(script, tx, input_index)? {
            Ok(())
        } else {
            Err(ScriptError::SignatureCheckFailed)
        }
    }
}

/// Validate one transaction input, reporting the failure category.
///
/// The input script runs on an empty stack, the output script on the stack
/// the input script left behind, and the run is accepted when the final
/// stack is non-empty with a true top. When `p2sh_enabled` is set and the
/// output script has the script-hash shape, the input script must be
/// push-only and its top stack item is re-parsed and run as the redeem
/// script over the remaining items.
pub fn try_evaluate(
    input_script: &Script,
    output_script: &Script,
    tx: &Transaction,
    input_index: usize,
    p2sh_enabled: bool,
) -> Result<()> {
    let mut input_run = Interpreter::new();
    input_run.run(input_script, tx, input_index)?;
    let input_stack = input_run.into_stack();

    let mut output_run = Interpreter::with_stack(input_stack.clone());
    output_run.run(output_script, tx, input_index)?;
    match output_run.stack().last() {
        Some(top) if cast_to_bool(top) => {}
        _ => return Err(ScriptError::VerifyFailed),
    }

    if p2sh_enabled && output_script.classify() == PaymentType::ScriptHash {
        if !input_script.is_push_only() {
            return Err(ScriptError::NonPushInput);
        }
        // The redeem script and its arguments come from the stack the
        // input script left, not the one the output script left.
        let mut redeem_stack = input_stack;
        let serialized = redeem_stack.pop().ok_or(ScriptError::StackUnderflow)?;
        let redeem_script = Script::parse(&serialized);

        let mut redeem_run = Interpreter::with_stack(redeem_stack);
        redeem_run.run(&redeem_script, tx, input_index)?;
        match redeem_run.stack().last() {
            Some(top) if cast_to_bool(top) => {}
            _ => return Err(ScriptError::VerifyFailed),
        }
    }

    Ok(())
}

/// Accept-or-reject wrapper around [`try_evaluate`]: the single outcome
/// exposed to spend validation.
pub fn evaluate(
    input_script: &Script,
    output_script: &Script,
    tx: &Transaction,
    input_index: usize,
    p2sh_enabled: bool,
) -> bool {
    try_evaluate(input_script, output_script, tx, input_index, p2sh_enabled).is_ok()
}
