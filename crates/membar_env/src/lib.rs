//! Membar Environment
//!
//! Platform memory probing used to build usage snapshots:
//! - Process resident set size
//! - Physical memory total/available
//! - Address-space ceiling for 32-bit processes

pub mod memory;

pub use memory::{
    available_physical_bytes, process_resident_bytes, total_physical_bytes, AddressSpace,
};
