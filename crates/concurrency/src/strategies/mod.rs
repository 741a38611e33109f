mod c2pl;
mod no_cc;
mod occ;

pub use c2pl::C2pl;
pub use no_cc::NoCc;
pub use occ::Occ;
