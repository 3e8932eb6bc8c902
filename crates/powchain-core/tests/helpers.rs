use powchain_core::Blockchain;
use serde_json::{json, Value};

pub fn transfer_payload(from: &str, to: &str, amount: u64) -> Vec<u8> {
    serde_json::to_vec(&json!({ "from": from, "to": to, "amount": amount }))
        .expect("Failed to encode transfer")
}

pub fn mined_chain(difficulty: usize, payloads: &[Vec<u8>]) -> Blockchain {
    let mut chain = Blockchain::new(difficulty);
    for payload in payloads {
        chain
            .mine_block(payload.clone())
            .expect("Failed to mine block");
    }
    chain
}

/// Round-trip the chain through JSON, overwriting `field` of block `index` on the way.
pub fn tamper(chain: &Blockchain, index: usize, field: &str, value: Value) -> Blockchain {
    let mut raw = serde_json::to_value(chain).expect("Failed to export chain");
    raw["blocks"][index][field] = value;
    serde_json::from_value(raw).expect("Failed to import tampered chain")
}
