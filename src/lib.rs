//! # txscript
//!
//! Stack-based interpreter for Bitcoin transaction scripts.
//!
//! Spending a previous output means satisfying the predicate attached to
//! it: the spender's input script and the output's locking script execute
//! in sequence against shared stacks, and the spend is accepted when the
//! final stack top reads true. Pay-to-script-hash outputs add a third,
//! recursive run of the redeem script carried by the input.
//!
//! The crate splits the machine into an immutable [`Script`] (a parsed
//! operation list) and a transient [`Interpreter`] owning the stacks and
//! branch state, with [`evaluate`] orchestrating the runs for one
//! transaction input.
//!
//! ```rust
//! use txscript::{evaluate, Opcode, Operation, Script};
//! use txscript::types::{OutPoint, Transaction, TransactionInput, TransactionOutput};
//!
//! let tx = Transaction {
//!     version: 1,
//!     inputs: vec![TransactionInput {
//!         prevout: OutPoint { hash: [0; 32], index: 0 },
//!         script_sig: Vec::new(),
//!         sequence: 0xffff_ffff,
//!     }],
//!     outputs: vec![TransactionOutput { value: 50_000, script_pubkey: Vec::new() }],
//!     lock_time: 0,
//! };
//!
//! // An anyone-can-spend output: the locking script just pushes true.
//! let input_script = Script::new();
//! let output_script = Script::from_operations(vec![Operation::new(Opcode::Op1)]);
//! assert!(evaluate(&input_script, &output_script, &tx, 0, true));
//! ```

pub mod conditional;
pub mod crypto;
pub mod error;
pub mod interpreter;
pub mod number;
pub mod opcode;
pub mod script;
pub mod serialization;
pub mod sighash;
pub mod types;

pub use error::{Result, ScriptError};
pub use interpreter::{evaluate, try_evaluate, Interpreter};
pub use number::{cast_to_bool, ScriptNum};
pub use opcode::Opcode;
pub use script::{Operation, PaymentType, Script};
pub use sighash::{check_signature, signature_hash, SighashType};
