use lazy_static::lazy_static;
use num_bigint::BigUint;
use rust_decimal::Decimal;

/// Swap fee, applied as `amount * numerator / denominator` at each fee stage.
pub const SWAP_FEE_NUMERATOR: u32 = 996;
pub const SWAP_FEE_DENOMINATOR: u32 = 1_000;

/// Slippage tolerances, in whole percent.
pub const DEFAULT_SLIPPAGE: u32 = 5;
pub const MIN_SLIPPAGE: u32 = 1;
pub const SAFE_MODE_MAX_SLIPPAGE: u32 = 25;
pub const UNRESTRICTED_MAX_SLIPPAGE: u32 = 100;

/// Receipt polling defaults. The initial delay absorbs indexing lag between
/// submission and the first time a node can serve the receipt.
pub const CONFIRM_INITIAL_DELAY_MS: u64 = 5_000;
pub const CONFIRM_POLL_INTERVAL_MS: u64 = 3_000;
pub const CONFIRM_MAX_RETRIES: u32 = 10;

// Router function selectors (first four bytes of the keccak-256 hash of the
// canonical signature).
pub const SELECTOR_SWAP_EXACT_TOKENS_FOR_TOKENS: [u8; 4] = [0x38, 0xed, 0x17, 0x39];
pub const SELECTOR_SWAP_TOKENS_FOR_EXACT_TOKENS: [u8; 4] = [0x88, 0x03, 0xdb, 0xee];
pub const SELECTOR_ADD_LIQUIDITY: [u8; 4] = [0xe8, 0xe3, 0x37, 0x00];
pub const SELECTOR_REMOVE_LIQUIDITY: [u8; 4] = [0xba, 0xa2, 0xab, 0xde];

/// Per-stage swap fee as a human-facing percentage.
pub fn swap_fee_percent() -> Decimal {
    Decimal::from(SWAP_FEE_DENOMINATOR - SWAP_FEE_NUMERATOR) / Decimal::from(SWAP_FEE_DENOMINATOR)
        * Decimal::from(100u32)
}

lazy_static! {
    pub(crate) static ref FEE_NUMERATOR: BigUint = BigUint::from(SWAP_FEE_NUMERATOR);
    pub(crate) static ref FEE_DENOMINATOR: BigUint = BigUint::from(SWAP_FEE_DENOMINATOR);
    pub(crate) static ref HUNDRED: BigUint = BigUint::from(100u32);
}
