pub mod term_tree;
