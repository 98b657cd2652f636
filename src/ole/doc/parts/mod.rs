/// Internal parts for parsing DOC file structures.
///
/// This module contains parsers for the binary structures used in
/// legacy Word documents:
/// - FIB (File Information Block)
/// - Piece table (CLX / PlcPcd)
/// - Text assembly from pieces
/// - Control-character cleanup
pub mod control;
pub mod fib;
pub mod piece_table;
pub mod text;
