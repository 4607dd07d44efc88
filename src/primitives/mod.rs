//! Encrypted values the pipeline operates on
//!
//! Currently those are:
//! * additive ElGamal ciphertexts on BN254 G1
//! * fixed-length ciphertext vectors
//! * deterministic ciphertexts and grouping keys
//! * a discrete logarithm table for small plaintexts
//!
pub mod deterministic;
pub mod dlog;
pub mod elgamal;
pub mod vector;
