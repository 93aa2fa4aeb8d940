//! Canonical pair identity and reserve snapshots.

use std::fmt;

use ethers_core::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// Canonically ordered asset pair.
///
/// `PairKey::new(a, b)` and `PairKey::new(b, a)` are the same key: the
/// lower address always sits in the `token0` slot. This matches the sort a
/// V2 factory applies when assigning token0/token1, so reserves read from a
/// pair contract line up with the key without reshuffling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairKey {
    token0: Address,
    token1: Address,
}

impl PairKey {
    pub fn new(a: Address, b: Address) -> Self {
        if a <= b {
            Self { token0: a, token1: b }
        } else {
            Self { token0: b, token1: a }
        }
    }

    pub fn token0(&self) -> Address {
        self.token0
    }

    pub fn token1(&self) -> Address {
        self.token1
    }

    /// Whether `token` is one of the pair's two assets.
    pub fn contains(&self, token: Address) -> bool {
        token == self.token0 || token == self.token1
    }

    /// The pair member opposite `token`, if `token` belongs to the pair.
    pub fn counterpart(&self, token: Address) -> Option<Address> {
        if token == self.token0 {
            Some(self.token1)
        } else if token == self.token1 {
            Some(self.token0)
        } else {
            None
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.token0, self.token1)
    }
}

/// Reserve snapshot bound to its pair.
///
/// Reserves are stored in canonical token0/token1 order. Callers that care
/// about a swap direction ask for [`oriented`](Self::oriented) reserves
/// instead of guessing which side is which.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairReserves {
    pair: PairKey,
    reserve0: U256,
    reserve1: U256,
}

impl PairReserves {
    pub fn new(pair: PairKey, reserve0: U256, reserve1: U256) -> Self {
        Self { pair, reserve0, reserve1 }
    }

    /// A pair holding no liquidity. Valid but degenerate: there is no price
    /// ratio until the first deposit establishes one.
    pub fn empty(pair: PairKey) -> Self {
        Self { pair, reserve0: U256::zero(), reserve1: U256::zero() }
    }

    pub fn pair(&self) -> PairKey {
        self.pair
    }

    pub fn reserve0(&self) -> U256 {
        self.reserve0
    }

    pub fn reserve1(&self) -> U256 {
        self.reserve1
    }

    pub fn is_empty(&self) -> bool {
        self.reserve0.is_zero() && self.reserve1.is_zero()
    }

    /// Reserve of a specific pair member.
    pub fn of(&self, token: Address) -> Option<U256> {
        if token == self.pair.token0() {
            Some(self.reserve0)
        } else if token == self.pair.token1() {
            Some(self.reserve1)
        } else {
            None
        }
    }

    /// `(reserve_in, reserve_out)` for a swap selling `token_in`.
    pub fn oriented(&self, token_in: Address) -> Option<(U256, U256)> {
        if token_in == self.pair.token0() {
            Some((self.reserve0, self.reserve1))
        } else if token_in == self.pair.token1() {
            Some((self.reserve1, self.reserve0))
        } else {
            None
        }
    }
}
