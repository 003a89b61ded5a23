pub mod fasta;
pub mod sequence;
