//! End-to-end and adversarial test suite for Drip.
//!
//! The integration tests in `tests/` drive a [`Minter`](drip_minter::Minter)
//! over the in-memory ledger and a hand-moved clock, the way a host chain
//! would call it block by block.

pub mod helpers;
