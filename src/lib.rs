pub mod sgf_parser;
