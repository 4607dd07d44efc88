//! colagg is a library for privacy preserving survey aggregation.
//!
//! Clients encrypt their answers under the collective key of an authority
//! made of several servers. The servers group and sum the answers while they
//! stay encrypted and hand the final groups to a querier, re-encrypted under
//! the querier's key.
//!
//! The crate contains
//! * additive ElGamal on the BN254 curve and ciphertext vectors ([`primitives`])
//! * deterministic switching, key switching and tree transport ([`protocols`])
//! * the per node survey store and a round driver ([`survey`])
//!
//! Every data type can be serialized with serde (feature `serde`, default)
//! or borsh (feature `borsh`). The two features are exclusive, borsh builds
//! need `--no-default-features --features borsh`.
//!
//! # Examples
//!
//! ```
//! use colagg::config::SurveyConfig;
//! use colagg::primitives::{elgamal::KeyPair, vector::CipherVector};
//! use colagg::protocols::collective::CollectiveAuthority;
//! use colagg::survey::{decrypt_deliverables, round::run_round, store::SurveyStore, ClientResponse};
//!
//! let authority = CollectiveAuthority::generate(3);
//! let querier = KeyPair::generate();
//! let config = SurveyConfig::default().with_dlog_bound(100);
//! let mut nodes = vec![SurveyStore::new("node-0"), SurveyStore::new("node-1")];
//! for node in nodes.iter_mut() {
//!     let grouping = CipherVector::encrypt(&authority.public(), &[1]).unwrap();
//!     let answer = CipherVector::encrypt(&authority.public(), &[1, 7]).unwrap();
//!     node.insert_client_response(ClientResponse::new(grouping, answer)).unwrap();
//! }
//! let deliverables = run_round(&mut nodes, &authority, &querier.public, &config).unwrap();
//! let results = decrypt_deliverables(&deliverables, &querier, &config.dlog_table()).unwrap();
//! assert_eq!(results, vec![(vec![1], vec![2, 14])]);
//! ```
#[cfg(all(feature = "serde", feature = "borsh"))]
compile_error!("features `serde` and `borsh` are mutually exclusive, build with `--no-default-features --features borsh`");

pub mod config;
pub mod error;
pub mod primitives;
pub mod protocols;
pub mod survey;
pub mod utils;

pub use error::{ColaggError, Phase, RoundError};
