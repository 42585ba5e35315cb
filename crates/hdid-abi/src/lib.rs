//! hdid Contract Interface
//!
//! Loads the registry contract's ABI once and encodes/decodes calls against
//! it:
//! - `schema`: closed table of function descriptors built at load time
//! - `token`: typed ABI values
//! - `codec`: Solidity ABI head/tail encoding
//! - `interface`: `encode`/`decode` by function name

pub mod codec;
pub mod error;
pub mod interface;
pub mod schema;
pub mod token;

pub use error::AbiError;
pub use interface::{ContractInterface, EncodedCall, QueryOutcome};
pub use schema::{ContractSchema, FunctionDescriptor, Param, ParamType, StateMutability};
pub use token::Token;
