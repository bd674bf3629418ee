//! sea-orm entities for the BEOS API tables.
//!
//! Enum-valued columns (`role`, `blood_type`, `urgency`, `status`) are stored
//! as `TEXT` using the wire spelling of the corresponding `beos-domain` enum.

pub mod blood_banks;
pub mod blood_batches;
pub mod blood_inventory;
pub mod blood_requests;
pub mod donors;
pub mod hospitals;
pub mod users;
