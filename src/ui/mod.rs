pub mod charts;
pub mod environment;
pub mod growth;
pub mod overview;
pub mod panels;
