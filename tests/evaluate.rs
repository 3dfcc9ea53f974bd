//! End-to-end spend validation scenarios with real ECDSA keys.

use secp256k1::{Message, Secp256k1, SecretKey};
use txscript::crypto::hash160;
use txscript::types::{OutPoint, Transaction, TransactionInput, TransactionOutput};
use txscript::{
    evaluate, signature_hash, try_evaluate, Opcode, Operation, Script, ScriptError, SighashType,
};

struct Keypair {
    secret: SecretKey,
    public: Vec<u8>,
}

fn keypair(seed: u8) -> Keypair {
    let secp = Secp256k1::new();
    let secret = SecretKey::from_slice(&[seed; 32]).expect("seed in curve order");
    let public = secret.public_key(&secp).serialize().to_vec();
    Keypair { secret, public }
}

fn spend_context() -> Transaction {
    Transaction {
        version: 1,
        inputs: vec![TransactionInput {
            prevout: OutPoint {
                hash: [0xaa; 32],
                index: 0,
            },
            script_sig: Vec::new(),
            sequence: 0xffff_ffff,
        }],
        outputs: vec![TransactionOutput {
            value: 4_900_000_000,
            script_pubkey: Vec::new(),
        }],
        lock_time: 0,
    }
}

/// Sign the message a CHECKSIG against `script_code` will reconstruct,
/// returning DER bytes with the hash-type byte appended.
fn sign(
    key: &Keypair,
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    hash_type: SighashType,
) -> Vec<u8> {
    let secp = Secp256k1::new();
    let hash = signature_hash(tx, input_index, script_code, hash_type);
    let message = Message::from_digest_slice(&hash).expect("32-byte digest");
    let mut signature = secp
        .sign_ecdsa(&message, &key.secret)
        .serialize_der()
        .to_vec();
    signature.push(hash_type.0);
    signature
}

fn push_script(items: &[&[u8]]) -> Script {
    let mut script = Script::new();
    for item in items {
        script.push_data(item);
    }
    script
}

fn pay_to_pubkey(public: &[u8]) -> Script {
    let mut script = Script::new();
    script.push_data(public);
    script.push_operation(Operation::new(Opcode::CheckSig));
    script
}

fn pay_to_pubkey_hash(public: &[u8]) -> Script {
    let mut script = Script::new();
    script.push_operation(Operation::new(Opcode::Dup));
    script.push_operation(Operation::new(Opcode::Hash160));
    script.push_data(&hash160(public));
    script.push_operation(Operation::new(Opcode::EqualVerify));
    script.push_operation(Operation::new(Opcode::CheckSig));
    script
}

fn pay_to_script_hash(redeem: &Script) -> Script {
    let mut script = Script::new();
    script.push_operation(Operation::new(Opcode::Hash160));
    script.push_data(&hash160(&redeem.to_bytes()));
    script.push_operation(Operation::new(Opcode::Equal));
    script
}

#[test]
fn p2pk_accepts_a_valid_signature() {
    let key = keypair(0x11);
    let tx = spend_context();
    let output_script = pay_to_pubkey(&key.public);
    let signature = sign(&key, &tx, 0, &output_script, SighashType::ALL);
    let input_script = push_script(&[&signature]);

    assert!(evaluate(&input_script, &output_script, &tx, 0, true));
}

#[test]
fn p2pk_rejects_a_foreign_signature() {
    let key = keypair(0x11);
    let intruder = keypair(0x22);
    let tx = spend_context();
    let output_script = pay_to_pubkey(&key.public);
    let signature = sign(&intruder, &tx, 0, &output_script, SighashType::ALL);
    let input_script = push_script(&[&signature]);

    // CHECKSIG pushes false rather than aborting, so the reject surfaces
    // as a false final top.
    assert_eq!(
        try_evaluate(&input_script, &output_script, &tx, 0, true),
        Err(ScriptError::VerifyFailed)
    );
}

#[test]
fn p2pkh_accepts_the_matching_key() {
    let key = keypair(0x11);
    let tx = spend_context();
    let output_script = pay_to_pubkey_hash(&key.public);
    let signature = sign(&key, &tx, 0, &output_script, SighashType::ALL);
    let input_script = push_script(&[&signature, &key.public]);

    assert!(evaluate(&input_script, &output_script, &tx, 0, true));
}

#[test]
fn p2pkh_rejects_a_substituted_key_at_the_hash_check() {
    let key = keypair(0x11);
    let intruder = keypair(0x22);
    let tx = spend_context();
    let output_script = pay_to_pubkey_hash(&key.public);
    let signature = sign(&intruder, &tx, 0, &output_script, SighashType::ALL);
    let input_script = push_script(&[&signature, &intruder.public]);

    assert_eq!(
        try_evaluate(&input_script, &output_script, &tx, 0, true),
        Err(ScriptError::VerifyFailed)
    );
}

#[test]
fn if_else_selects_the_branch_by_input() {
    let tx = spend_context();
    let output_script = Script::from_operations(vec![
        Operation::new(Opcode::If),
        Operation::with_data(Opcode::Special, vec![0x01]),
        Operation::new(Opcode::Else),
        Operation::with_data(Opcode::Special, vec![0x00]),
        Operation::new(Opcode::EndIf),
    ]);

    let truthy_input = push_script(&[&[0x01]]);
    assert!(evaluate(&truthy_input, &output_script, &tx, 0, true));

    let falsy_input = push_script(&[&[]]);
    assert!(!evaluate(&falsy_input, &output_script, &tx, 0, true));
}

#[test]
fn oversized_numeric_operand_rejects_the_spend() {
    let tx = spend_context();
    let mut output_script = Script::new();
    output_script.push_data(&[0x01, 0x00, 0x00, 0x00, 0x00]);
    output_script.push_data(&[0x01]);
    output_script.push_operation(Operation::new(Opcode::Add));

    assert_eq!(
        try_evaluate(&Script::new(), &output_script, &tx, 0, true),
        Err(ScriptError::NumericOverflow)
    );
}

#[test]
fn p2sh_runs_the_redeem_script_when_enabled() {
    let key = keypair(0x11);
    let tx = spend_context();
    let redeem = pay_to_pubkey(&key.public);
    let output_script = pay_to_script_hash(&redeem);
    let signature = sign(&key, &tx, 0, &redeem, SighashType::ALL);
    let input_script = push_script(&[&signature, &redeem.to_bytes()]);

    assert!(evaluate(&input_script, &output_script, &tx, 0, true));

    // A bad inner signature passes the hash surface but fails the
    // recursive run.
    let garbage_input = push_script(&[&[0xde, 0xad], &redeem.to_bytes()]);
    assert!(!evaluate(&garbage_input, &output_script, &tx, 0, true));
}

#[test]
fn p2sh_surface_only_when_disabled() {
    let key = keypair(0x11);
    let tx = spend_context();
    let redeem = pay_to_pubkey(&key.public);
    let output_script = pay_to_script_hash(&redeem);

    // With the recursive rule off, any argument satisfies the output as
    // long as the committed hash matches.
    let garbage_input = push_script(&[&[0xde, 0xad], &redeem.to_bytes()]);
    assert!(evaluate(&garbage_input, &output_script, &tx, 0, false));
}

#[test]
fn p2sh_rejects_a_non_push_input_script() {
    let key = keypair(0x11);
    let tx = spend_context();
    let redeem = pay_to_pubkey(&key.public);
    let output_script = pay_to_script_hash(&redeem);

    let mut input_script = Script::new();
    input_script.push_data(&sign(&key, &tx, 0, &redeem, SighashType::ALL));
    input_script.push_data(&redeem.to_bytes());
    input_script.push_operation(Operation::new(Opcode::Dup));
    input_script.push_operation(Operation::new(Opcode::Drop));

    assert_eq!(
        try_evaluate(&input_script, &output_script, &tx, 0, true),
        Err(ScriptError::NonPushInput)
    );
    // The same script is fine while the rule is off.
    assert!(evaluate(&input_script, &output_script, &tx, 0, false));
}

#[test]
fn codeseparator_position_changes_the_signed_message() {
    let key = keypair(0x11);
    let tx = spend_context();

    let mut early = Script::new();
    early.push_operation(Operation::new(Opcode::CodeSeparator));
    early.push_data(&key.public);
    early.push_operation(Operation::new(Opcode::CheckSig));

    let mut late = Script::new();
    late.push_data(&key.public);
    late.push_operation(Operation::new(Opcode::CodeSeparator));
    late.push_operation(Operation::new(Opcode::CheckSig));

    // The separator excludes everything before it from the signed subset.
    let early_code = Script::from_operations(early.operations()[1..].to_vec());
    let late_code = Script::from_operations(late.operations()[2..].to_vec());
    assert_ne!(
        signature_hash(&tx, 0, &early_code, SighashType::ALL),
        signature_hash(&tx, 0, &late_code, SighashType::ALL)
    );

    let early_signature = sign(&key, &tx, 0, &early_code, SighashType::ALL);
    let late_signature = sign(&key, &tx, 0, &late_code, SighashType::ALL);

    assert!(evaluate(&push_script(&[&early_signature]), &early, &tx, 0, true));
    assert!(evaluate(&push_script(&[&late_signature]), &late, &tx, 0, true));
    assert!(!evaluate(&push_script(&[&early_signature]), &late, &tx, 0, true));
    assert!(!evaluate(&push_script(&[&late_signature]), &early, &tx, 0, true));
}

fn two_of_three_output(keys: &[&Keypair; 3]) -> Script {
    let mut script = Script::new();
    script.push_operation(Operation::new(Opcode::Op2));
    for key in keys {
        script.push_data(&key.public);
    }
    script.push_operation(Operation::new(Opcode::Op3));
    script.push_operation(Operation::new(Opcode::CheckMultisig));
    script
}

#[test]
fn multisig_accepts_signatures_in_key_order() {
    let (k1, k2, k3) = (keypair(0x11), keypair(0x22), keypair(0x33));
    let tx = spend_context();
    let output_script = two_of_three_output(&[&k1, &k2, &k3]);

    let sig1 = sign(&k1, &tx, 0, &output_script, SighashType::ALL);
    let sig3 = sign(&k3, &tx, 0, &output_script, SighashType::ALL);
    let input_script = push_script(&[&sig1, &sig3]);

    assert!(evaluate(&input_script, &output_script, &tx, 0, true));
}

#[test]
fn multisig_rejects_signatures_out_of_key_order() {
    let (k1, k2, k3) = (keypair(0x11), keypair(0x22), keypair(0x33));
    let tx = spend_context();
    let output_script = two_of_three_output(&[&k1, &k2, &k3]);

    let sig1 = sign(&k1, &tx, 0, &output_script, SighashType::ALL);
    let sig3 = sign(&k3, &tx, 0, &output_script, SighashType::ALL);
    let input_script = push_script(&[&sig3, &sig1]);

    assert_eq!(
        try_evaluate(&input_script, &output_script, &tx, 0, true),
        Err(ScriptError::VerifyFailed)
    );
}

#[test]
fn multisig_verify_variant_fails_the_script_directly() {
    let key = keypair(0x11);
    let tx = spend_context();
    let mut output_script = Script::new();
    output_script.push_operation(Operation::new(Opcode::Op1));
    output_script.push_data(&key.public);
    output_script.push_operation(Operation::new(Opcode::Op1));
    output_script.push_operation(Operation::new(Opcode::CheckMultisigVerify));
    output_script.push_operation(Operation::new(Opcode::Op1));

    let garbage_input = push_script(&[&[0xde, 0xad, 0xbe, 0xef]]);
    assert_eq!(
        try_evaluate(&garbage_input, &output_script, &tx, 0, true),
        Err(ScriptError::SignatureCheckFailed)
    );
}

#[test]
fn sighash_none_leaves_outputs_unsigned() {
    let key = keypair(0x11);
    let mut tx = spend_context();
    let output_script = pay_to_pubkey(&key.public);
    let signature = sign(&key, &tx, 0, &output_script, SighashType::NONE);
    let input_script = push_script(&[&signature]);

    // Rewriting the outputs after signing does not invalidate the spend.
    tx.outputs[0].value = 1;
    tx.outputs.push(TransactionOutput {
        value: 2,
        script_pubkey: vec![0x51],
    });
    assert!(evaluate(&input_script, &output_script, &tx, 0, true));
}

#[test]
fn sighash_all_commits_to_outputs() {
    let key = keypair(0x11);
    let mut tx = spend_context();
    let output_script = pay_to_pubkey(&key.public);
    let signature = sign(&key, &tx, 0, &output_script, SighashType::ALL);
    let input_script = push_script(&[&signature]);

    tx.outputs[0].value = 1;
    assert!(!evaluate(&input_script, &output_script, &tx, 0, true));
}

#[test]
fn single_without_a_paired_output_fails_the_check_but_not_the_script() {
    let key = keypair(0x11);
    let mut tx = spend_context();
    tx.inputs.push(tx.inputs[0].clone());
    let output_script = pay_to_pubkey(&key.public);
    let signature = sign(&key, &tx, 1, &output_script, SighashType::SINGLE);
    let input_script = push_script(&[&signature]);

    // Input 1 has no paired output: the sentinel hash makes CHECKSIG push
    // false, and the run ends on a false top instead of a signature error.
    assert_eq!(
        try_evaluate(&input_script, &output_script, &tx, 1, true),
        Err(ScriptError::VerifyFailed)
    );
}
