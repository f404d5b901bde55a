pub mod action;
pub mod element;
pub mod graph;
pub mod page;
