// Pipeline processing: document parsing, extraction, scoring and valuation

pub mod parser;
pub mod normalize;
pub mod quality_gate;
pub mod valuation;
