use enzymes::Enzymes;
use lazy_static::lazy_static;

pub mod annotation;
pub mod base_modification;
pub mod double_strand;
pub mod engine;
pub mod enzymes;
pub mod error;
pub mod iupac_code;
pub mod methylation_sites;
pub mod nucleic_acid;
pub mod primer_search;
pub mod restriction_enzyme;
pub mod sequence_io;
pub mod sequence_map;
pub mod single_strand;

pub use double_strand::{DoubleStrandSequence, StrandInput};
pub use error::{NucError, Result};
pub use nucsim_protocol;
pub use single_strand::{SingleStrandSequence, StrandOwnership};

lazy_static! {
    // Restriction enzymes, built in or from data/enzymes.json
    pub static ref ENZYMES: Enzymes = Enzymes::active();
}

/// Fresh identifier for strands, double strands and their children.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
