pub mod page_analyzer;
