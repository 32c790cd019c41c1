//! Fixed transaction previews for transactional intents

use crate::backend::WALLET_ADDRESS;
use crate::session::state::{PendingTransaction, TxParameter};
use chrono::{DateTime, Utc};

const ROUTER_ADDRESS: &str = "0x742d35Cc6C3F3f6a9C6bB7F7B8e6F8Df2E4F8B1A";
const COLLECTION_ADDRESS: &str = "0x9C8f4B7F6B5A3C2D1E0F9A8B7C6D5E4F3A2B1C0D";
const STAKING_ADDRESS: &str = "0x5A0b54D5dc17e0AadC383d2db43B0a0D3E029c4c";

/// Swap deadline offset in seconds
const SWAP_DEADLINE_SECS: i64 = 1200;

pub fn swap(now: DateTime<Utc>) -> PendingTransaction {
    PendingTransaction {
        function_name: "swapExactTokensForTokens".to_string(),
        contract_address: ROUTER_ADDRESS.to_string(),
        parameters: vec![
            // 100 USDC, 6 decimals
            TxParameter::new("amountIn", "100000000"),
            TxParameter::new("amountOutMin", "0.098234567"),
            TxParameter::new("path", "['0xA0b86a33E6441...', '0xC02aaA39b223...']"),
            TxParameter::new("to", WALLET_ADDRESS),
            TxParameter::new("deadline", (now.timestamp() + SWAP_DEADLINE_SECS).to_string()),
        ],
        estimated_gas: "180,000 gas (~$12.50)".to_string(),
    }
}

pub fn mint(_now: DateTime<Utc>) -> PendingTransaction {
    PendingTransaction {
        function_name: "mintNFT".to_string(),
        contract_address: COLLECTION_ADDRESS.to_string(),
        parameters: vec![
            TxParameter::new("to", WALLET_ADDRESS),
            TxParameter::new("tokenURI", "ipfs://QmYourNFTMetadataHash"),
            TxParameter::new("quantity", "1"),
        ],
        estimated_gas: "85,000 gas (~$5.80)".to_string(),
    }
}

pub fn delegate(_now: DateTime<Utc>) -> PendingTransaction {
    PendingTransaction {
        function_name: "delegate".to_string(),
        contract_address: STAKING_ADDRESS.to_string(),
        parameters: vec![
            TxParameter::new("validator", "abc123"),
            // 50 tokens, 18 decimals
            TxParameter::new("amount", "50000000000000000000"),
            TxParameter::new("delegator", WALLET_ADDRESS),
        ],
        estimated_gas: "95,000 gas (~$6.40)".to_string(),
    }
}
