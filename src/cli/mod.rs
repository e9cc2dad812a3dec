// Command-line surface of the `lilyponddist` binary.
pub mod cmd_enums;
