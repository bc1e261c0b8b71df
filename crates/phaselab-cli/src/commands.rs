pub mod degree;
pub mod fit;
pub mod svet;
