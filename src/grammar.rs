//! Extended XYZ Format Reference
//!
//! This module documents the extended XYZ text format as implemented by this
//! library.
//!
//! # Overview
//!
//! An extended XYZ stream is a sequence of blocks. Each block is:
//!
//! ```text
//! 2
//! Lattice="5.44 0 0 0 5.44 0 0 0 5.44" Properties=species:S:1:pos:R:3 energy=-10.2 pbc="T T T"
//! Si 0.00000000 0.00000000 0.00000000
//! Si 1.36000000 1.36000000 1.36000000
//! ```
//!
//! - line 1: the number of data rows `N`
//! - line 2: the comment line, a whitespace-separated list of `key=value` pairs
//! - `N` data rows laid out by the `Properties` schema
//!
//! # Comment Line
//!
//! ## Pairs
//!
//! Keys and values are separated by `=`, with optional whitespace on either
//! side (`bob = 2` is one pair). Pairs are separated by whitespace. Keys are
//! strings, bare or quoted.
//!
//! ## Primitives
//!
//! | Type | Syntax | Example |
//! |------|--------|---------|
//! | Integer | `[+-]?(0\|[1-9][0-9]*)` | `step=12` |
//! | Float | decimal, optional `e`/`E`/`d`/`D` exponent | `energy=-1.5e-3` |
//! | Bool | `T F true false True False TRUE FALSE` | `converged=T` |
//! | String | bare, or quoted with `"..."`, `{...}`, `[...]` | `config_type=bulk` |
//!
//! Other capitalisations such as `TRuE` are strings, not bools. Integers
//! outside the 64-bit range are read as floats.
//!
//! ## Strings
//!
//! A **bare** string is a run of characters other than whitespace and
//! `= " , [ ] { } \`. A backslash escapes the next character, whatever it is:
//! `a\ b` is `a b`.
//!
//! **Quoted** strings may use any of three delimiters. Only the style's own
//! delimiter is significant inside it; the other quote characters are literal.
//! Inside a quoted string `\n` is a newline and any other `\X` is `X`. An
//! unescaped `{` inside `{...}` or `[` inside `[...]` ends the match.
//!
//! ## Arrays
//!
//! | Form | Syntax | Element types |
//! |------|--------|---------------|
//! | Modern 1-D | `[1, 2, 3]` | any |
//! | Nested 2-D | `[[1, 2], [3, 4]]` or `[[1,2] [3,4]]` | any |
//! | Legacy, double-quoted | `"1 2 3"` | int, float, bool |
//! | Legacy, braced | `{1 2 3}` | any |
//!
//! Legacy arrays are whitespace separated. A double-quoted legacy array must
//! promote to a single type; otherwise the value is read as a quoted string.
//!
//! ## Resolution Order
//!
//! Values are resolved by **first match**, never longest match:
//!
//! 1. under a `Properties` key (any case): the schema sub-grammar, or an error
//! 2. nested 2-D array
//! 3. legacy 1-D array
//! 4. modern 1-D array
//! 5. integer, then float, then bool
//! 6. string
//!
//! An alternative counts only if it ends at whitespace or end of line. So
//! `1.5` is a float (the integer `1` is abandoned), `Tx` is a string, and
//! `{1 2 3}` is an array of integers.
//!
//! # Type Promotion
//!
//! | Elements | Result |
//! |----------|--------|
//! | all integers | integer array |
//! | integers and floats | float array |
//! | all bools | bool array |
//! | anything else | string array of each element's literal text |
//!
//! ```text
//! a=[1, 2.5]       # [1.0, 2.5]
//! b=[1, T]         # ["1", "T"]
//! c=[1, "2"]       # ["1", "2"]   quoted elements are strings
//! ```
//!
//! # Post-Parse Rules
//!
//! - A single-element legacy array is the scalar: `a="5"` is `5`.
//! - A nine-element legacy array, except under `Lattice`, is a 3x3 matrix
//!   filled column by column: `"1 2 3 4 5 6 7 8 9"` has first row `[1, 4, 7]`.
//! - Every row of a 2-D array must have the same length.
//! - `Lattice` (any case) must be numeric with shape (3, 3), (3,) or (9,).
//!   Three values are the diagonal; nine values fill the rows in order.
//! - `Lattice` and `Properties` may each appear once, compared ignoring case.
//!
//! # Properties
//!
//! ```text
//! Properties=species:S:1:pos:R:3:forces:R:3:Z:I:1
//! ```
//!
//! `name:type:columns` triples joined by `:`. Names are identifiers; types are
//! `R` (float), `I` (integer), `S` (string) and `L` (logical); column counts
//! are positive. A block without `Properties` uses `species:S:1:pos:R:3`.
//!
//! Each data row is matched as a whole against a pattern with one cell per
//! column, cells separated by whitespace. Logical cells starting with `T` or
//! `t` are true.
//!
//! # Writing
//!
//! | Value | Output |
//! |-------|--------|
//! | integer | `12` |
//! | float | shortest text that reads back exactly, always with `.` or exponent: `2.0`, `1e300` |
//! | bool | `T`, `F` |
//! | string | bare when safe, otherwise `"..."` with `\"`, `\\`, `\n` |
//! | array | `[a, b, c]` |
//! | matrix | `[[a, b], [c, d]]` |
//! | `Lattice` | 3x3 matrix |
//!
//! A string is quoted when it is empty, contains whitespace or a reserved
//! character, or would read back as a number or bool. At the top level, a
//! quoted string that would read back as a legacy array (`"1 2 3"`) also has
//! its first character escaped: `"\1 2 3"`.
//!
//! Pairs are written in insertion order, then `Lattice`, then `Properties`.
//! Empty arrays and non-finite floats cannot be written.
//!
//! Data rows use printf-style formats per type, by default `%16.8f` (R),
//! `%8d` (I), `%s` (S) and `%.1s` (L, applied to `True`/`False`), with cells
//! joined by a single space.

// This module contains only documentation; no implementation code
