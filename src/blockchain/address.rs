// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Program-derived and associated token account addresses.

use sha2::{Digest, Sha256};

use super::types::{Pubkey, ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID};

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";
const MAX_SEED_LEN: usize = 32;
const MAX_SEEDS: usize = 16;

/// Derive an address from seeds with a specific bump, or `None` when the hash
/// lands on the curve (and is therefore not a valid PDA).
pub fn create_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Option<Pubkey> {
    if seeds.len() > MAX_SEEDS || seeds.iter().any(|s| s.len() > MAX_SEED_LEN) {
        return None;
    }

    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);

    let candidate = Pubkey::new_from_array(hasher.finalize().into());
    if candidate.is_on_curve() {
        None
    } else {
        Some(candidate)
    }
}

/// Find the canonical program address: the first bump, counting down from
/// 255, whose derived address is off-curve.
pub fn find_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Option<(Pubkey, u8)> {
    // The bump is appended as an extra seed.
    if seeds.len() >= MAX_SEEDS {
        return None;
    }

    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut with_bump: Vec<&[u8]> = seeds.to_vec();
        with_bump.push(&bump_seed);
        if let Some(address) = create_program_address(&with_bump, program_id) {
            return Some((address, bump));
        }
    }
    None
}

/// Associated token account holding `mint` for `owner`.
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    associated_token_address_with_bump(owner, mint).0
}

fn associated_token_address_with_bump(owner: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    let seeds: [&[u8]; 3] = [owner.as_bytes(), TOKEN_PROGRAM_ID.as_bytes(), mint.as_bytes()];
    // Of 256 bumps, roughly half hash off-curve; exhausting all of them does
    // not happen for 32-byte seeds.
    find_program_address(&seeds, &ASSOCIATED_TOKEN_PROGRAM_ID)
        .unwrap_or((Pubkey::default(), 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::{USDC_MINT_DEVNET, USDC_MINT_MAINNET};

    fn key(s: &str) -> Pubkey {
        s.parse().unwrap()
    }

    #[test]
    fn wallet_addresses_are_on_curve() {
        assert!(key("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM").is_on_curve());
        assert!(key("HN7cABqLq46Es1jh92dQQisAq662SmxELLLsHHe4YWrH").is_on_curve());
    }

    #[test]
    fn derives_devnet_usdc_account() {
        let owner = key("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM");
        let (ata, bump) = associated_token_address_with_bump(&owner, &USDC_MINT_DEVNET);
        assert_eq!(ata.to_string(), "HwpBSwuyVKJi7d9kqqNexc54MS9i4BEDKDVDLeUVjZm8");
        assert_eq!(bump, 253);
        assert!(!ata.is_on_curve());
    }

    #[test]
    fn derives_mainnet_usdc_account() {
        let owner = key("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM");
        assert_eq!(
            associated_token_address(&owner, &USDC_MINT_MAINNET).to_string(),
            "FGETo8T8wMcN2wCjav8VK6eh3dLk63evNDPxzLSJra8B"
        );

        let other = key("HN7cABqLq46Es1jh92dQQisAq662SmxELLLsHHe4YWrH");
        assert_eq!(
            associated_token_address(&other, &USDC_MINT_DEVNET).to_string(),
            "3tXGywXEuiXLJnqTzw8LBFsExXXgDdgBdHnH98rKyHRf"
        );
    }

    #[test]
    fn create_program_address_rejects_oversized_seeds() {
        let long = [0u8; 33];
        assert!(create_program_address(&[&long], &TOKEN_PROGRAM_ID).is_none());
    }
}
