// Adapters layer: concrete display surfaces for the streamed text.

pub mod output;
